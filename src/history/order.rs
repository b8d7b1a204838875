use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::types::{Encounter, LabResultView, PrescriptionView};

/// Most recent first; missing dates after every dated entry.
pub fn compare_recent_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// `sort_by` is stable: equal keys keep reconciler output order.

pub fn order_encounters(encounters: &mut [Encounter]) {
    encounters.sort_by(|a, b| compare_recent_first(a.effective_date(), b.effective_date()));
}

pub fn order_prescriptions(prescriptions: &mut [PrescriptionView]) {
    prescriptions.sort_by(|a, b| compare_recent_first(a.effective_date(), b.effective_date()));
}

pub fn order_lab_results(labs: &mut [LabResultView]) {
    labs.sort_by(|a, b| compare_recent_first(a.date, b.date));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorization::AccessScope;
    use crate::db::repository::seed::appointment_row;
    use crate::history::reconcile::reconcile;
    use crate::models::PatientRef;

    fn encounters(dates: &[(&str, Option<&str>)]) -> Vec<Encounter> {
        let p = PatientRef::Registered("p1".into());
        let rows = dates
            .iter()
            .map(|(id, at)| {
                let mut row = appointment_row(id, &p, "d1");
                row.scheduled_at = at.map(str::to_string);
                row
            })
            .collect();
        reconcile(rows, Vec::new(), &AccessScope::FullAccess)
    }

    fn ids(list: &[Encounter]) -> Vec<&str> {
        list.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn newest_first() {
        let mut list = encounters(&[
            ("a", Some("2026-01-01 09:00:00")),
            ("b", Some("2026-03-01 09:00:00")),
            ("c", Some("2026-02-01 09:00:00")),
        ]);
        order_encounters(&mut list);
        assert_eq!(ids(&list), vec!["b", "c", "a"]);
    }

    #[test]
    fn invalid_and_missing_dates_sort_last_stably() {
        let mut list = encounters(&[
            ("bad", Some("not-a-date")),
            ("ok", Some("2026-01-01 09:00:00")),
            ("none", None),
        ]);
        order_encounters(&mut list);
        assert_eq!(ids(&list), vec!["ok", "bad", "none"]);
        assert!(list[1].effective_date().is_none());
    }

    #[test]
    fn falls_back_to_created_at() {
        let p = PatientRef::Registered("p1".into());
        let mut older = appointment_row("older", &p, "d1");
        older.created_at = Some("2025-12-01 08:00:00".into());
        let mut newer = appointment_row("newer", &p, "d1");
        newer.scheduled_at = Some("2026-01-01 08:00:00".into());
        let mut list = reconcile(vec![older, newer], Vec::new(), &AccessScope::FullAccess);
        order_encounters(&mut list);
        assert_eq!(ids(&list), vec!["newer", "older"]);
    }

    #[test]
    fn compare_is_total_on_options() {
        let t = chrono::Utc::now();
        assert_eq!(compare_recent_first(Some(t), None), Ordering::Less);
        assert_eq!(compare_recent_first(None, None), Ordering::Equal);
    }
}
