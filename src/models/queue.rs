use serde::{Deserialize, Serialize};

use super::patient::PatientRef;

/// A daily queue entry written at arrival (reception check-in or walk-in).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntryRow {
    pub id: String,
    pub patient: PatientRef,
    pub doctor_id: String,
    pub appointment_id: Option<String>,
    pub queue_date: String,
    pub arrived_at: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
}
