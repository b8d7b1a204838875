use std::collections::HashMap;

use rusqlite::Connection;

use crate::db::DatabaseError;

use super::query::ScopedQuery;

/// Batch-resolve doctor display names. Unknown ids are simply absent.
pub fn resolve_doctor_names(
    conn: &Connection,
    doctor_ids: &[String],
) -> Result<HashMap<String, String>, DatabaseError> {
    if doctor_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let query = ScopedQuery::new().in_list("d.id", doctor_ids);
    let sql = format!(
        "SELECT d.id, d.full_name FROM doctors d WHERE 1=1{}",
        query.sql_suffix()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(query.param_refs().as_slice(), |row| {
        Ok((row.get::<_, String>("id")?, row.get::<_, String>("full_name")?))
    })?;

    rows.collect::<Result<HashMap<_, _>, _>>().map_err(DatabaseError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::seed;

    #[test]
    fn resolves_known_ids_only() {
        let conn = open_memory_database().unwrap();
        seed::doctor(&conn, "d1", "Dra. Souza");
        seed::doctor(&conn, "d2", "Dr. Lima");

        let names = resolve_doctor_names(&conn, &["d1".to_string(), "ghost".to_string()]).unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names["d1"], "Dra. Souza");
    }
}
