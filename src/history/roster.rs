//! List mode: a paginated patient roster with optional per-patient
//! counters, computed with a constant number of batched fetches per page.

use std::collections::HashMap;
use std::sync::Arc;

use crate::authorization::{resolve_page_access, AccessScope};
use crate::config;
use crate::models::*;

use super::aggregates::summarize;
use super::enrich::{lab_result_view, prescription_view};
use super::fetch::{fetch_clinical_rows, run_fetch, ClinicalRows};
use super::reconcile::reconcile;
use super::source::ClinicSource;
use super::types::*;

/// Clamp paging to `page >= 1` and `1..=MAX_PER_PAGE`.
pub fn normalize_list_query(mut query: PatientListQuery) -> PatientListQuery {
    query.page = query.page.max(1);
    query.per_page = match query.per_page {
        0 => config::DEFAULT_PER_PAGE,
        n => n.min(config::MAX_PER_PAGE),
    };
    query.search = query
        .search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    query.organization_id = query
        .organization_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    query
}

pub async fn list_patients(
    source: &Arc<dyn ClinicSource>,
    ctx: &RequestContext,
    query: PatientListQuery,
) -> Result<PatientListPage, HistoryError> {
    let query = normalize_list_query(query);
    let include_summary = query.include_summary;
    let meta_query = query.clone();

    let roster = run_fetch(source, SourceKind::PatientRoster, move |s| {
        s.list_patients(&meta_query)
    })
    .await?;

    let page_ids: Vec<String> = roster.rows.iter().map(|r| r.id.clone()).collect();
    let access = resolve_page_access(source, ctx, &page_ids).await?;

    let mut summaries = if include_summary {
        let visible = access.visible_ids(&page_ids);
        if visible.is_empty() {
            HashMap::new()
        } else {
            let patients = PatientSet::registered(visible);
            let filter = RecordFilter::new(patients.clone(), access.visibility());
            let rows = fetch_clinical_rows(source, filter, patients).await?;
            summarize_by_patient(rows, |id| access.decision_for(id).scope)
        }
    } else {
        HashMap::new()
    };

    let data = roster
        .rows
        .into_iter()
        .map(|patient| {
            let decision = access.decision_for(&patient.id);
            let summary = if include_summary && decision.allowed() {
                Some(summaries.remove(&patient.id).unwrap_or_default())
            } else {
                None
            };
            RosterEntry {
                patient,
                access: decision.scope.tier(),
                summary,
            }
        })
        .collect();

    tracing::info!(
        clinician_id = %ctx.clinician_id,
        page = query.page,
        per_page = query.per_page,
        total = roster.total,
        include_summary,
        "Patient roster page built"
    );

    Ok(PatientListPage {
        data,
        meta: PageMeta {
            page: query.page,
            per_page: query.per_page,
            total: roster.total,
        },
    })
}

#[derive(Default)]
struct PatientBucket {
    appointments: Vec<AppointmentRow>,
    consultations: Vec<ConsultationRow>,
    prescriptions: Vec<PrescriptionView>,
    lab_results: Vec<LabResultView>,
}

/// Group batched rows by patient in one pass, then run each bucket
/// through the same reconcile and summarize steps as single-patient mode.
fn summarize_by_patient(
    rows: ClinicalRows,
    scope_for: impl Fn(&str) -> AccessScope,
) -> HashMap<String, AggregateCounters> {
    let mut buckets: HashMap<String, PatientBucket> = HashMap::new();

    for row in rows.appointments {
        buckets.entry(row.patient.id().to_string()).or_default().appointments.push(row);
    }
    for row in rows.consultations {
        buckets.entry(row.patient.id().to_string()).or_default().consultations.push(row);
    }
    for row in &rows.prescriptions {
        buckets
            .entry(row.patient.id().to_string())
            .or_default()
            .prescriptions
            .push(prescription_view(row, None));
    }
    for row in &rows.lab_results {
        buckets
            .entry(row.patient.id().to_string())
            .or_default()
            .lab_results
            .push(lab_result_view(row));
    }

    buckets
        .into_iter()
        .map(|(patient_id, bucket)| {
            let scope = scope_for(&patient_id);
            let encounters = reconcile(bucket.appointments, bucket.consultations, &scope);
            let counters = summarize(&encounters, &bucket.prescriptions, &bucket.lab_results);
            (patient_id, counters)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_is_clamped() {
        let q = normalize_list_query(PatientListQuery {
            page: 0,
            per_page: 10_000,
            search: Some("  ".into()),
            ..Default::default()
        });
        assert_eq!(q.page, 1);
        assert_eq!(q.per_page, config::MAX_PER_PAGE);
        assert_eq!(q.search, None);

        let defaulted = normalize_list_query(PatientListQuery::default());
        assert_eq!(defaulted.per_page, config::DEFAULT_PER_PAGE);
    }
}
