//! Patient history projection: one deduplicated, ordered clinical
//! timeline per patient, merged from appointments and consultations and
//! enriched with billing, prescriptions and lab results.
//!
//! Flow: identity → access scope → phase-1 fetches (scoped) → reconcile →
//! phase-2 enrichment → order → counters. No stage writes to the store.

pub mod aggregates;
pub(crate) mod dedup;
pub mod enrich;
pub(crate) mod fetch;
mod identity;
pub mod order;
pub mod reconcile;
pub mod roster;
mod source;
mod types;

pub use roster::list_patients;
pub use source::*;
pub use types::*;

use std::sync::Arc;

use crate::authorization::resolve_access_scope;
use crate::models::{PatientSet, RecordFilter};

/// Build the full history of one patient as seen by `ctx.clinician_id`.
///
/// Denied access is an explicit `AccessDenied`, never an empty timeline.
/// A failing required fetch aborts the whole projection; billing and
/// doctor-name failures only blank the fields they feed.
pub async fn get_patient_history(
    source: &Arc<dyn ClinicSource>,
    ctx: &RequestContext,
    patient_id: &str,
) -> Result<PatientHistory, HistoryError> {
    let patient = identity::normalize_patient(source, patient_id).await?;
    let decision = resolve_access_scope(source, ctx, &patient).await?;
    let Some(visibility) = decision.scope.visibility() else {
        return Err(HistoryError::AccessDenied {
            clinician_id: ctx.clinician_id.clone(),
            patient_id: patient.id().to_string(),
        });
    };

    let patients = PatientSet::single(&patient);
    let rows = fetch::fetch_clinical_rows(
        source,
        RecordFilter::new(patients.clone(), visibility),
        patients,
    )
    .await?;

    let appointment_ids = rows.appointments.iter().map(|a| a.id.clone()).collect();
    let extra = fetch::fetch_enrichment(source, appointment_ids, enrich::doctor_ids(&rows)).await;
    let names = extra.doctor_names.as_ref();
    let billing = extra.billing.map(enrich::billing_index);

    let mut encounters = reconcile::reconcile(rows.appointments, rows.consultations, &decision.scope);
    enrich::attach_billing(&mut encounters, billing.as_ref());
    enrich::apply_doctor_names(&mut encounters, names);

    let mut prescriptions: Vec<_> = rows
        .prescriptions
        .iter()
        .map(|p| enrich::prescription_view(p, names))
        .collect();
    let mut lab_results: Vec<_> = rows.lab_results.iter().map(enrich::lab_result_view).collect();

    order::order_encounters(&mut encounters);
    order::order_prescriptions(&mut prescriptions);
    order::order_lab_results(&mut lab_results);

    let summary = aggregates::summarize(&encounters, &prescriptions, &lab_results);

    tracing::info!(
        clinician_id = %ctx.clinician_id,
        patient_id = patient.id(),
        tier = ?decision.scope.tier(),
        encounters = encounters.len(),
        prescriptions = prescriptions.len(),
        lab_results = lab_results.len(),
        "Patient history projected"
    );

    Ok(PatientHistory {
        patient,
        access: decision.scope.tier(),
        summary,
        encounters,
        prescriptions,
        lab_results,
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────
