use serde::{Deserialize, Serialize};

use super::patient::PatientRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionRow {
    pub id: String,
    pub patient: PatientRef,
    pub doctor_id: String,
    pub consultation_id: Option<String>,
    pub issued_at: Option<String>,
    pub valid_until: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<String>,
    pub items: Vec<PrescriptionItemRow>,
}

/// A medication line on a prescription. Every descriptive column is
/// optional; display strings are synthesized from whichever are filled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrescriptionItemRow {
    pub id: String,
    pub prescription_id: String,
    pub medication_name: String,
    pub dosage: Option<String>,
    pub form: Option<String>,
    pub frequency: Option<String>,
    pub duration: Option<String>,
    pub quantity: Option<String>,
    pub instructions: Option<String>,
}
