use serde::{Deserialize, Serialize};

use super::patient::PatientRef;

/// The set of patients a batched fetch covers, split by identity kind
/// because each kind is matched on its own column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientSet {
    pub registered: Vec<String>,
    pub unregistered: Vec<String>,
}

impl PatientSet {
    pub fn single(patient: &PatientRef) -> Self {
        let mut set = Self::default();
        set.push(patient);
        set
    }

    pub fn registered(ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            registered: ids.into_iter().collect(),
            unregistered: Vec::new(),
        }
    }

    pub fn push(&mut self, patient: &PatientRef) {
        match patient {
            PatientRef::Registered(id) => self.registered.push(id.clone()),
            PatientRef::Unregistered(id) => self.unregistered.push(id.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty() && self.unregistered.is_empty()
    }
}

/// Row visibility applied inside the store query, before any merge
/// or aggregation sees the rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Every row for the covered patients.
    All,
    /// Only rows authored by this clinician.
    OwnedBy(String),
    /// Rows authored by the clinician, plus every row of the listed
    /// (registered) patients, for whom a full-access grant is active.
    OwnedByOrGranted {
        clinician_id: String,
        granted: Vec<String>,
    },
}

/// Filter for the clinician-owned record fetchers
/// (appointments, consultations, prescriptions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    pub patients: PatientSet,
    pub visibility: Visibility,
}

impl RecordFilter {
    pub fn new(patients: PatientSet, visibility: Visibility) -> Self {
        Self {
            patients,
            visibility,
        }
    }
}

/// Roster query for list mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientListQuery {
    pub page: u32,
    pub per_page: u32,
    pub search: Option<String>,
    pub organization_id: Option<String>,
    pub include_summary: bool,
}

impl PatientListQuery {
    /// 1-based page offset in rows.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}
