use std::sync::Arc;

use crate::models::PatientRef;

use super::fetch::run_fetch;
use super::source::ClinicSource;
use super::types::{HistoryError, SourceKind};

/// Resolve a raw patient id to its identity kind. Every downstream fetch
/// branches on the result.
pub(crate) async fn normalize_patient(
    source: &Arc<dyn ClinicSource>,
    raw_id: &str,
) -> Result<PatientRef, HistoryError> {
    let id = raw_id.trim();
    if id.is_empty() {
        return Err(HistoryError::InvalidRequest("patient id is empty".into()));
    }

    let owned = id.to_string();
    let patient = run_fetch(source, SourceKind::PatientDirectory, move |s| {
        s.resolve_patient_kind(&owned)
    })
    .await?;

    tracing::debug!(
        patient_id = id,
        unregistered = patient.is_unregistered(),
        "Patient identity resolved"
    );
    Ok(patient)
}
