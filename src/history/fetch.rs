//! Concurrent fan-out over the source fetchers.
//!
//! `ClinicSource` calls are blocking, so each one runs on the blocking
//! pool. Required fetches are joined with `try_join!` (first failure
//! aborts the request); enrichment fetches are joined with `join!` and
//! degrade to `None`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::db::DatabaseError;
use crate::models::*;

use super::source::ClinicSource;
use super::types::{HistoryError, SourceKind};

/// Run one required fetch on the blocking pool.
pub(crate) async fn run_fetch<T, F>(
    source: &Arc<dyn ClinicSource>,
    kind: SourceKind,
    fetch: F,
) -> Result<T, HistoryError>
where
    T: Send + 'static,
    F: FnOnce(&dyn ClinicSource) -> Result<T, DatabaseError> + Send + 'static,
{
    let source = Arc::clone(source);
    let started = Instant::now();

    let outcome = tokio::task::spawn_blocking(move || fetch(source.as_ref()))
        .await
        .map_err(|e| HistoryError::UpstreamFetch {
            source_kind: kind,
            reason: format!("fetch task failed: {e}"),
        })?;

    match outcome {
        Ok(value) => {
            tracing::debug!(
                source = %kind,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Fetch complete"
            );
            Ok(value)
        }
        Err(e) => {
            tracing::warn!(source = %kind, error = %e, "Fetch failed");
            Err(HistoryError::upstream(kind, e))
        }
    }
}

/// Run one enrichment fetch. Failure is logged and reported as `None`.
pub(crate) async fn run_optional_fetch<T, F>(
    source: &Arc<dyn ClinicSource>,
    kind: SourceKind,
    fetch: F,
) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn ClinicSource) -> Result<T, DatabaseError> + Send + 'static,
{
    match run_fetch(source, kind, fetch).await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(source = %kind, error = %e, "Enrichment degraded");
            None
        }
    }
}

/// Rows of the four required sources, already visibility-scoped.
#[derive(Debug, Default)]
pub(crate) struct ClinicalRows {
    pub appointments: Vec<AppointmentRow>,
    pub consultations: Vec<ConsultationRow>,
    pub prescriptions: Vec<PrescriptionRow>,
    pub lab_results: Vec<LabResultRow>,
}

/// Phase 1: the required fetches, issued concurrently.
///
/// Lab results are scoped by patient only; `filter` governs the three
/// clinician-owned sources.
pub(crate) async fn fetch_clinical_rows(
    source: &Arc<dyn ClinicSource>,
    filter: RecordFilter,
    lab_patients: PatientSet,
) -> Result<ClinicalRows, HistoryError> {
    let appointment_filter = filter.clone();
    let consultation_filter = filter.clone();
    let prescription_filter = filter;

    let (appointments, consultations, prescriptions, lab_results) = tokio::try_join!(
        run_fetch(source, SourceKind::Appointments, move |s| {
            s.fetch_appointments(&appointment_filter)
        }),
        run_fetch(source, SourceKind::Consultations, move |s| {
            s.fetch_consultations(&consultation_filter)
        }),
        run_fetch(source, SourceKind::Prescriptions, move |s| {
            s.fetch_prescriptions(&prescription_filter)
        }),
        run_fetch(source, SourceKind::LabResults, move |s| {
            s.fetch_lab_results(&lab_patients)
        }),
    )?;

    Ok(ClinicalRows {
        appointments,
        consultations,
        prescriptions,
        lab_results,
    })
}

/// Phase 2 results. `None` means the fetch failed and the fields it
/// feeds degrade.
#[derive(Debug, Default)]
pub(crate) struct Enrichment {
    pub billing: Option<Vec<BillingRow>>,
    pub doctor_names: Option<HashMap<String, String>>,
}

/// Phase 2: billing and doctor names, keyed by ids gathered in phase 1.
/// Empty id sets skip the call.
pub(crate) async fn fetch_enrichment(
    source: &Arc<dyn ClinicSource>,
    appointment_ids: Vec<String>,
    doctor_ids: Vec<String>,
) -> Enrichment {
    let billing = async {
        if appointment_ids.is_empty() {
            return Some(Vec::new());
        }
        run_optional_fetch(source, SourceKind::Billing, move |s| {
            s.fetch_billing(&appointment_ids)
        })
        .await
    };
    let doctor_names = async {
        if doctor_ids.is_empty() {
            return Some(HashMap::new());
        }
        run_optional_fetch(source, SourceKind::DoctorDirectory, move |s| {
            s.resolve_doctor_names(&doctor_ids)
        })
        .await
    };

    let (billing, doctor_names) = tokio::join!(billing, doctor_names);
    Enrichment {
        billing,
        doctor_names,
    }
}
