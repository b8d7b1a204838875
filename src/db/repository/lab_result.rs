use rusqlite::Connection;

use crate::db::DatabaseError;
use crate::models::{LabResultRow, PatientSet};

use super::query::{patient_ref, ScopedQuery};

/// Lab results for a set of patients. Labs are scoped by patient only;
/// there is no owning-clinician filter on this source.
pub fn fetch_lab_results(
    conn: &Connection,
    patients: &PatientSet,
) -> Result<Vec<LabResultRow>, DatabaseError> {
    if patients.is_empty() {
        return Ok(Vec::new());
    }

    let query = ScopedQuery::new().patients("l", patients);
    let sql = format!(
        "SELECT l.id, l.patient_id, l.unregistered_patient_id, l.requested_by,
                l.test_name, l.lab_name, l.result, l.status, l.reported_at, l.created_at
         FROM lab_results l
         WHERE 1=1{}
         ORDER BY l.id",
        query.sql_suffix()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(query.param_refs().as_slice(), |row| {
        Ok(LabResultRow {
            id: row.get("id")?,
            patient: patient_ref(row)?,
            requested_by: row.get("requested_by")?,
            test_name: row.get("test_name")?,
            lab_name: row.get("lab_name")?,
            result: row.get("result")?,
            status: row.get("status")?,
            reported_at: row.get("reported_at")?,
            created_at: row.get("created_at")?,
        })
    })?;

    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::seed;
    use crate::models::PatientRef;

    #[test]
    fn fetches_by_both_identity_kinds() {
        let conn = open_memory_database().unwrap();
        seed::patient(&conn, "p1", "Ana");
        seed::unregistered_patient(&conn, "u1", "Walk-in");
        seed::lab_result(&conn, "l1", &PatientRef::Registered("p1".into()), "Glicose", Some(r#"{"value": 5.4}"#), None);
        seed::lab_result(&conn, "l2", &PatientRef::Unregistered("u1".into()), "Hemograma", Some("Normal"), None);

        let mut set = PatientSet::default();
        set.push(&PatientRef::Registered("p1".into()));
        set.push(&PatientRef::Unregistered("u1".into()));
        let rows = fetch_lab_results(&conn, &set).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].patient, PatientRef::Unregistered("u1".into()));
        assert_eq!(rows[1].result.as_deref(), Some("Normal"));
    }
}
