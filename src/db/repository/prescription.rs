use std::collections::HashMap;

use rusqlite::Connection;

use crate::db::DatabaseError;
use crate::models::{PrescriptionItemRow, PrescriptionRow, RecordFilter};

use super::query::{patient_ref, ScopedQuery};

/// Prescriptions with their line items nested.
///
/// Two statements regardless of how many patients or prescriptions are
/// covered: one for headers, one `IN` query for all their items.
pub fn fetch_prescriptions(
    conn: &Connection,
    filter: &RecordFilter,
) -> Result<Vec<PrescriptionRow>, DatabaseError> {
    if filter.patients.is_empty() {
        return Ok(Vec::new());
    }

    let query = ScopedQuery::new()
        .patients("p", &filter.patients)
        .visibility("p", "doctor_id", &filter.visibility);
    let sql = format!(
        "SELECT p.id, p.patient_id, p.unregistered_patient_id, p.doctor_id,
                p.consultation_id, p.issued_at, p.valid_until, p.status,
                p.notes, p.created_at
         FROM prescriptions p
         WHERE 1=1{}
         ORDER BY p.id",
        query.sql_suffix()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(query.param_refs().as_slice(), |row| {
        Ok(PrescriptionRow {
            id: row.get("id")?,
            patient: patient_ref(row)?,
            doctor_id: row.get("doctor_id")?,
            consultation_id: row.get("consultation_id")?,
            issued_at: row.get("issued_at")?,
            valid_until: row.get("valid_until")?,
            status: row.get("status")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            items: Vec::new(),
        })
    })?;
    let mut prescriptions = rows.collect::<Result<Vec<_>, _>>()?;

    let ids: Vec<String> = prescriptions.iter().map(|p| p.id.clone()).collect();
    let mut items = fetch_items(conn, &ids)?;
    for prescription in &mut prescriptions {
        prescription.items = items.remove(&prescription.id).unwrap_or_default();
    }

    Ok(prescriptions)
}

fn fetch_items(
    conn: &Connection,
    prescription_ids: &[String],
) -> Result<HashMap<String, Vec<PrescriptionItemRow>>, DatabaseError> {
    let mut grouped: HashMap<String, Vec<PrescriptionItemRow>> = HashMap::new();
    if prescription_ids.is_empty() {
        return Ok(grouped);
    }

    let query = ScopedQuery::new().in_list("i.prescription_id", prescription_ids);
    let sql = format!(
        "SELECT i.id, i.prescription_id, i.medication_name, i.dosage, i.form,
                i.frequency, i.duration, i.quantity, i.instructions
         FROM prescription_items i
         WHERE 1=1{}
         ORDER BY i.prescription_id, i.position, i.id",
        query.sql_suffix()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(query.param_refs().as_slice(), |row| {
        Ok(PrescriptionItemRow {
            id: row.get("id")?,
            prescription_id: row.get("prescription_id")?,
            medication_name: row.get("medication_name")?,
            dosage: row.get("dosage")?,
            form: row.get("form")?,
            frequency: row.get("frequency")?,
            duration: row.get("duration")?,
            quantity: row.get("quantity")?,
            instructions: row.get("instructions")?,
        })
    })?;

    for item in rows {
        let item = item?;
        grouped.entry(item.prescription_id.clone()).or_default().push(item);
    }
    Ok(grouped)
}
