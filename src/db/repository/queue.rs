use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::DatabaseError;
use crate::models::QueueEntryRow;

use super::query::{patient_ref, ScopedQuery};

/// All queue entries written for a clinician on a given day.
pub fn fetch_queue_entries(
    conn: &Connection,
    day: NaiveDate,
    doctor_id: &str,
) -> Result<Vec<QueueEntryRow>, DatabaseError> {
    let query = ScopedQuery::new()
        .eq("q.queue_date", day.format("%Y-%m-%d").to_string())
        .eq("q.doctor_id", doctor_id.to_string());
    let sql = format!(
        "SELECT q.id, q.patient_id, q.unregistered_patient_id, q.doctor_id,
                q.appointment_id, q.queue_date, q.arrived_at, q.status, q.created_at
         FROM queue_entries q
         WHERE 1=1{}
         ORDER BY q.id",
        query.sql_suffix()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(query.param_refs().as_slice(), |row| {
        Ok(QueueEntryRow {
            id: row.get("id")?,
            patient: patient_ref(row)?,
            doctor_id: row.get("doctor_id")?,
            appointment_id: row.get("appointment_id")?,
            queue_date: row.get("queue_date")?,
            arrived_at: row.get("arrived_at")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
        })
    })?;

    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}
