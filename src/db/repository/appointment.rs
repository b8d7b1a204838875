use rusqlite::Connection;

use crate::db::DatabaseError;
use crate::models::{AppointmentRow, RecordFilter};

use super::query::{patient_ref, ScopedQuery};

/// Appointments for the filter's patients, restricted by visibility.
pub fn fetch_appointments(
    conn: &Connection,
    filter: &RecordFilter,
) -> Result<Vec<AppointmentRow>, DatabaseError> {
    if filter.patients.is_empty() {
        return Ok(Vec::new());
    }

    let query = ScopedQuery::new()
        .patients("a", &filter.patients)
        .visibility("a", "doctor_id", &filter.visibility);
    let sql = format!(
        "SELECT a.id, a.patient_id, a.unregistered_patient_id, a.doctor_id,
                a.organization_id, a.scheduled_at, a.duration_minutes, a.status,
                a.reason, a.notes, a.location, a.created_at
         FROM appointments a
         WHERE 1=1{}
         ORDER BY a.id",
        query.sql_suffix()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(query.param_refs().as_slice(), |row| {
        Ok(AppointmentRow {
            id: row.get("id")?,
            patient: patient_ref(row)?,
            doctor_id: row.get("doctor_id")?,
            organization_id: row.get("organization_id")?,
            scheduled_at: row.get("scheduled_at")?,
            duration_minutes: row.get("duration_minutes")?,
            status: row.get("status")?,
            reason: row.get("reason")?,
            notes: row.get("notes")?,
            location: row.get("location")?,
            created_at: row.get("created_at")?,
        })
    })?;

    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}
