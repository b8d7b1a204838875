use serde::{Deserialize, Serialize};

/// Patient identity. Registered and unregistered patients live in
/// different stores and are cross-referenced by different columns on
/// every clinical table, so callers must never assume a uniform key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PatientRef {
    Registered(String),
    Unregistered(String),
}

impl PatientRef {
    pub fn id(&self) -> &str {
        match self {
            Self::Registered(id) | Self::Unregistered(id) => id,
        }
    }

    pub fn is_unregistered(&self) -> bool {
        matches!(self, Self::Unregistered(_))
    }

    /// Column that references this patient on clinical tables.
    pub fn key_column(&self) -> &'static str {
        match self {
            Self::Registered(_) => "patient_id",
            Self::Unregistered(_) => "unregistered_patient_id",
        }
    }
}

/// A row of the registered-patient roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRow {
    pub id: String,
    pub full_name: String,
    pub birth_date: Option<String>,
    pub phone: Option<String>,
    pub organization_id: Option<String>,
    pub created_at: Option<String>,
}

/// One roster page as returned by the store, before summaries.
#[derive(Debug, Clone, Default)]
pub struct PatientRosterPage {
    pub rows: Vec<PatientRow>,
    pub total: u64,
}
