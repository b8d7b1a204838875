use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::authorization::AccessTier;
use crate::db::DatabaseError;
use crate::models::{PatientRef, PatientRow};

// ═══════════════════════════════════════════════════════════
// Request context
// ═══════════════════════════════════════════════════════════

/// Explicit per-request caller context. Nothing about the caller is read
/// from ambient state; `now` is carried so grant expiry is evaluated
/// against a single instant for the whole request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub clinician_id: String,
    pub now: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(clinician_id: impl Into<String>) -> Self {
        Self {
            clinician_id: clinician_id.into(),
            now: Utc::now(),
        }
    }

    pub fn at(clinician_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            clinician_id: clinician_id.into(),
            now,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Timeline entities
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterKind {
    AppointmentOnly,
    ConsultationOnly,
    Merged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingSnapshot {
    pub amount: f64,
    pub currency: String,
    pub payment_status: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// One reconciled clinical visit.
///
/// `id` is the appointment id when an appointment backs the encounter,
/// otherwise the consultation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub id: String,
    pub kind: EncounterKind,
    pub appointment_id: Option<String>,
    pub consultation_id: Option<String>,
    pub patient: PatientRef,
    pub doctor: DoctorRef,
    pub organization_id: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub status: String,
    pub reason: Option<String>,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub billing: Option<BillingSnapshot>,
    pub duration_minutes: u32,
}

impl Encounter {
    /// First present of scheduled, started, created.
    pub fn effective_date(&self) -> Option<DateTime<Utc>> {
        self.scheduled_at.or(self.started_at).or(self.created_at)
    }

    /// Whether a consultation backs this encounter.
    pub fn has_consultation(&self) -> bool {
        matches!(self.kind, EncounterKind::ConsultationOnly | EncounterKind::Merged)
    }
}

/// A display-ready prescription line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationLine {
    pub name: String,
    pub dose: Option<String>,
    pub instructions: Option<String>,
    pub quantity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionView {
    pub id: String,
    pub doctor: DoctorRef,
    pub consultation_id: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub status: String,
    pub notes: Option<String>,
    pub medications: Vec<MedicationLine>,
}

impl PrescriptionView {
    pub fn effective_date(&self) -> Option<DateTime<Utc>> {
        self.issued_at.or(self.created_at)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabResultView {
    pub id: String,
    pub test_name: String,
    pub lab_name: Option<String>,
    pub result: Option<serde_json::Value>,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    pub comment: Option<String>,
    pub status: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// Per-patient counters, computed fresh for every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateCounters {
    pub consultations_count: u32,
    pub prescriptions_count: u32,
    pub lab_results_count: u32,
    pub last_consultation_at: Option<DateTime<Utc>>,
    pub last_prescription_at: Option<DateTime<Utc>>,
    pub last_lab_result_at: Option<DateTime<Utc>>,
    pub last_activity_at: Option<DateTime<Utc>>,
}

/// Single-patient projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientHistory {
    pub patient: PatientRef,
    pub access: AccessTier,
    pub summary: AggregateCounters,
    #[serde(rename = "consultations")]
    pub encounters: Vec<Encounter>,
    pub prescriptions: Vec<PrescriptionView>,
    pub lab_results: Vec<LabResultView>,
}

/// A roster row with its optional counters. `summary` is absent when not
/// requested and when the caller has no access to the patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(flatten)]
    pub patient: PatientRow,
    pub access: AccessTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<AggregateCounters>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientListPage {
    pub data: Vec<RosterEntry>,
    pub meta: PageMeta,
}

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

/// Which collaborator a fetch went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    PatientDirectory,
    AccessGrants,
    Ownership,
    Appointments,
    Consultations,
    Prescriptions,
    LabResults,
    Billing,
    DoctorDirectory,
    PatientRoster,
    Queue,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PatientDirectory => "patient_directory",
            Self::AccessGrants => "access_grants",
            Self::Ownership => "ownership",
            Self::Appointments => "appointments",
            Self::Consultations => "consultations",
            Self::Prescriptions => "prescriptions",
            Self::LabResults => "lab_results",
            Self::Billing => "billing",
            Self::DoctorDirectory => "doctor_directory",
            Self::PatientRoster => "patient_roster",
            Self::Queue => "queue",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Access denied: clinician {clinician_id} may not view patient {patient_id}")]
    AccessDenied {
        clinician_id: String,
        patient_id: String,
    },
    #[error("Upstream fetch failed ({source_kind}): {reason}")]
    UpstreamFetch {
        source_kind: SourceKind,
        reason: String,
    },
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl HistoryError {
    pub fn upstream(source_kind: SourceKind, err: DatabaseError) -> Self {
        Self::UpstreamFetch {
            source_kind,
            reason: err.to_string(),
        }
    }
}
