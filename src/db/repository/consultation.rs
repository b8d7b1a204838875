use rusqlite::Connection;

use crate::db::DatabaseError;
use crate::models::{ConsultationRow, RecordFilter};

use super::query::{patient_ref, ScopedQuery};

/// Consultations for the filter's patients, restricted by visibility.
pub fn fetch_consultations(
    conn: &Connection,
    filter: &RecordFilter,
) -> Result<Vec<ConsultationRow>, DatabaseError> {
    if filter.patients.is_empty() {
        return Ok(Vec::new());
    }

    let query = ScopedQuery::new()
        .patients("c", &filter.patients)
        .visibility("c", "doctor_id", &filter.visibility);
    let sql = format!(
        "SELECT c.id, c.appointment_id, c.patient_id, c.unregistered_patient_id,
                c.doctor_id, c.organization_id, c.date, c.chief_complaint,
                c.diagnosis, c.notes, c.status, c.created_at
         FROM consultations c
         WHERE 1=1{}
         ORDER BY c.id",
        query.sql_suffix()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(query.param_refs().as_slice(), |row| {
        Ok(ConsultationRow {
            id: row.get("id")?,
            appointment_id: row.get("appointment_id")?,
            patient: patient_ref(row)?,
            doctor_id: row.get("doctor_id")?,
            organization_id: row.get("organization_id")?,
            date: row.get("date")?,
            chief_complaint: row.get("chief_complaint")?,
            diagnosis: row.get("diagnosis")?,
            notes: row.get("notes")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
        })
    })?;

    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}
