use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::{PatientListQuery, PatientRef, PatientRosterPage, PatientRow};

use super::query::ScopedQuery;

/// Registered if the id exists in the registered-patient store,
/// unregistered otherwise.
pub fn resolve_patient_kind(conn: &Connection, patient_id: &str) -> Result<PatientRef, DatabaseError> {
    let registered: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM patients WHERE id = ?1)",
        params![patient_id],
        |row| row.get(0),
    )?;

    Ok(if registered {
        PatientRef::Registered(patient_id.to_string())
    } else {
        PatientRef::Unregistered(patient_id.to_string())
    })
}

/// One page of the registered-patient roster plus the unpaged total.
pub fn list_patients(
    conn: &Connection,
    query: &PatientListQuery,
) -> Result<PatientRosterPage, DatabaseError> {
    let mut filter = ScopedQuery::new();
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        filter = filter.contains("p.full_name", search);
    }
    if let Some(org) = query.organization_id.as_deref() {
        filter = filter.eq("p.organization_id", org.to_string());
    }

    let count_sql = format!(
        "SELECT COUNT(*) FROM patients p WHERE 1=1{}",
        filter.sql_suffix()
    );
    let total: i64 = conn.query_row(&count_sql, filter.param_refs().as_slice(), |row| row.get(0))?;

    let limit_idx = filter.next_index();
    let page_sql = format!(
        "SELECT p.id, p.full_name, p.birth_date, p.phone, p.organization_id, p.created_at
         FROM patients p
         WHERE 1=1{}
         ORDER BY p.full_name COLLATE NOCASE, p.id
         LIMIT ?{} OFFSET ?{}",
        filter.sql_suffix(),
        limit_idx,
        limit_idx + 1
    );

    let limit = i64::from(query.per_page);
    let offset = i64::try_from(query.offset()).unwrap_or(i64::MAX);
    let mut bound = filter.param_refs();
    bound.push(&limit);
    bound.push(&offset);

    let mut stmt = conn.prepare(&page_sql)?;
    let rows = stmt.query_map(bound.as_slice(), |row| {
        Ok(PatientRow {
            id: row.get("id")?,
            full_name: row.get("full_name")?,
            birth_date: row.get("birth_date")?,
            phone: row.get("phone")?,
            organization_id: row.get("organization_id")?,
            created_at: row.get("created_at")?,
        })
    })?;

    Ok(PatientRosterPage {
        rows: rows.collect::<Result<Vec<_>, _>>()?,
        total: u64::try_from(total).unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::seed;

    #[test]
    fn resolves_registered_and_unregistered() {
        let conn = open_memory_database().unwrap();
        seed::patient(&conn, "p1", "Ana");
        seed::unregistered_patient(&conn, "u1", "Walk-in");

        assert_eq!(resolve_patient_kind(&conn, "p1").unwrap(), PatientRef::Registered("p1".into()));
        assert_eq!(resolve_patient_kind(&conn, "u1").unwrap(), PatientRef::Unregistered("u1".into()));
    }

    #[test]
    fn roster_pages_and_counts() {
        let conn = open_memory_database().unwrap();
        for (id, name) in [("p1", "Carla"), ("p2", "ana"), ("p3", "Bruno"), ("p4", "Daniel")] {
            seed::patient(&conn, id, name);
        }

        let query = PatientListQuery { page: 2, per_page: 2, ..Default::default() };
        let page = list_patients(&conn, &query).unwrap();
        assert_eq!(page.total, 4);
        let names: Vec<_> = page.rows.iter().map(|p| p.full_name.as_str()).collect();
        assert_eq!(names, vec!["Carla", "Daniel"]);
    }

    #[test]
    fn roster_search_is_case_insensitive() {
        let conn = open_memory_database().unwrap();
        seed::patient(&conn, "p1", "Maria Silva");
        seed::patient(&conn, "p2", "João Souza");
        seed::patient_in_org(&conn, "p3", "Mariana Costa", "org-2");

        let query = PatientListQuery {
            page: 1,
            per_page: 10,
            search: Some("MARIA".into()),
            ..Default::default()
        };
        let page = list_patients(&conn, &query).unwrap();
        assert_eq!(page.total, 2);

        let scoped = PatientListQuery {
            organization_id: Some("org-2".into()),
            ..query
        };
        let page = list_patients(&conn, &scoped).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.rows[0].id, "p3");
    }
}
