use serde::{Deserialize, Serialize};

use super::patient::PatientRef;

/// A scheduled appointment as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRow {
    pub id: String,
    pub patient: PatientRef,
    pub doctor_id: String,
    pub organization_id: Option<String>,
    pub scheduled_at: Option<String>,
    /// Raw column value; the store does not constrain its sign.
    pub duration_minutes: Option<i64>,
    pub status: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub created_at: Option<String>,
}
