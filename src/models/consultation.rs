use serde::{Deserialize, Serialize};

use super::patient::PatientRef;

/// A free-form consultation record. `appointment_id` is an optional
/// cross-reference that may point at an appointment the caller cannot
/// see, or at one that no longer exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationRow {
    pub id: String,
    pub appointment_id: Option<String>,
    pub patient: PatientRef,
    pub doctor_id: String,
    pub organization_id: Option<String>,
    pub date: Option<String>,
    pub chief_complaint: Option<String>,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
}
