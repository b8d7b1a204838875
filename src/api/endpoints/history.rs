//! Patient history endpoint.
//!
//! - `GET /api/patients/:id/history` — merged encounter timeline,
//!   prescriptions, lab results and counters for one patient

use axum::extract::{Path, State};
use axum::Extension;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ClinicianContext};
use crate::history::{self, PatientHistory};

/// `GET /api/patients/:id/history`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(clinician): Extension<ClinicianContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientHistory>, ApiError> {
    let request = clinician.request();
    let history = history::get_patient_history(ctx.core.source(), &request, &patient_id).await?;
    Ok(Json(history))
}
