use serde::{Deserialize, Serialize};

use super::patient::PatientRef;

/// A lab result row. `result` holds a semi-structured payload: usually a
/// JSON object with loosely named keys, sometimes a bare scalar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabResultRow {
    pub id: String,
    pub patient: PatientRef,
    pub requested_by: Option<String>,
    pub test_name: String,
    pub lab_name: Option<String>,
    pub result: Option<String>,
    pub status: Option<String>,
    pub reported_at: Option<String>,
    pub created_at: Option<String>,
}
