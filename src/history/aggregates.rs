use chrono::{DateTime, Utc};

use super::types::*;

/// Rolling maximum: `next` replaces `current` only when strictly later.
pub fn update_last(
    current: Option<DateTime<Utc>>,
    next: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    match (current, next) {
        (None, next) => next,
        (Some(c), Some(n)) if n > c => Some(n),
        (current, _) => current,
    }
}

/// Counters over one patient's scoped, reconciled records.
///
/// Both single-patient and list mode call this on the same inputs, so
/// the two modes cannot disagree.
pub fn summarize(
    encounters: &[Encounter],
    prescriptions: &[PrescriptionView],
    lab_results: &[LabResultView],
) -> AggregateCounters {
    let mut counters = AggregateCounters::default();

    for encounter in encounters.iter().filter(|e| e.has_consultation()) {
        counters.consultations_count += 1;
        let at = encounter.started_at.or_else(|| encounter.effective_date());
        counters.last_consultation_at = update_last(counters.last_consultation_at, at);
    }
    for prescription in prescriptions {
        counters.prescriptions_count += 1;
        counters.last_prescription_at =
            update_last(counters.last_prescription_at, prescription.effective_date());
    }
    for lab in lab_results {
        counters.lab_results_count += 1;
        counters.last_lab_result_at = update_last(counters.last_lab_result_at, lab.date);
    }

    counters.last_activity_at = [
        counters.last_consultation_at,
        counters.last_prescription_at,
        counters.last_lab_result_at,
    ]
    .into_iter()
    .fold(None, update_last);

    counters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorization::AccessScope;
    use crate::db::repository::seed::{appointment_row, consultation_row};
    use crate::history::reconcile::reconcile;
    use crate::models::PatientRef;
    use crate::timestamp::parse_timestamp;

    fn at(s: &str) -> Option<DateTime<Utc>> {
        parse_timestamp(s)
    }

    #[test]
    fn update_last_keeps_maximum() {
        assert_eq!(update_last(None, at("2026-01-01")), at("2026-01-01"));
        assert_eq!(update_last(at("2026-02-01"), at("2026-01-01")), at("2026-02-01"));
        assert_eq!(update_last(at("2026-01-01"), at("2026-02-01")), at("2026-02-01"));
        assert_eq!(update_last(at("2026-01-01"), None), at("2026-01-01"));
        assert_eq!(update_last(None, None), None);
    }

    #[test]
    fn counts_only_consultation_backed_encounters() {
        let p = PatientRef::Registered("p1".into());
        let mut linked = consultation_row("C1", &p, "d1");
        linked.appointment_id = Some("A2".into());
        linked.date = Some("2026-04-02 10:00:00".into());
        let mut standalone = consultation_row("C2", &p, "d1");
        standalone.date = Some("2026-04-05 10:00:00".into());

        let encounters = reconcile(
            vec![appointment_row("A1", &p, "d1"), appointment_row("A2", &p, "d1")],
            vec![linked, standalone],
            &AccessScope::FullAccess,
        );
        let counters = summarize(&encounters, &[], &[]);

        assert_eq!(counters.consultations_count, 2);
        assert_eq!(counters.last_consultation_at, at("2026-04-05 10:00:00"));
        assert_eq!(counters.last_activity_at, counters.last_consultation_at);
    }

    #[test]
    fn last_activity_spans_all_sources() {
        let lab = LabResultView {
            id: "l1".into(),
            test_name: "TSH".into(),
            lab_name: None,
            result: None,
            unit: None,
            reference_range: None,
            comment: None,
            status: None,
            date: at("2026-06-01"),
        };
        let counters = summarize(&[], &[], &[lab]);
        assert_eq!(counters.lab_results_count, 1);
        assert_eq!(counters.last_activity_at, at("2026-06-01"));
        assert_eq!(counters.last_consultation_at, None);
    }
}
