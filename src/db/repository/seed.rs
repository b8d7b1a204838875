//! Test fixtures: minimal inserts for every store table.

use rusqlite::{params, Connection};

use crate::models::{AppointmentRow, ConsultationRow, PatientRef};

fn patient_columns(patient: &PatientRef) -> (Option<&str>, Option<&str>) {
    match patient {
        PatientRef::Registered(id) => (Some(id.as_str()), None),
        PatientRef::Unregistered(id) => (None, Some(id.as_str())),
    }
}

pub fn doctor(conn: &Connection, id: &str, name: &str) {
    conn.execute(
        "INSERT INTO doctors (id, full_name) VALUES (?1, ?2)",
        params![id, name],
    )
    .unwrap();
}

pub fn patient(conn: &Connection, id: &str, name: &str) {
    conn.execute(
        "INSERT INTO patients (id, full_name) VALUES (?1, ?2)",
        params![id, name],
    )
    .unwrap();
}

pub fn patient_in_org(conn: &Connection, id: &str, name: &str, organization_id: &str) {
    conn.execute(
        "INSERT INTO patients (id, full_name, organization_id) VALUES (?1, ?2, ?3)",
        params![id, name, organization_id],
    )
    .unwrap();
}

pub fn unregistered_patient(conn: &Connection, id: &str, name: &str) {
    conn.execute(
        "INSERT INTO unregistered_patients (id, full_name) VALUES (?1, ?2)",
        params![id, name],
    )
    .unwrap();
}

pub fn appointment_row(id: &str, patient: &PatientRef, doctor_id: &str) -> AppointmentRow {
    AppointmentRow {
        id: id.to_string(),
        patient: patient.clone(),
        doctor_id: doctor_id.to_string(),
        organization_id: None,
        scheduled_at: None,
        duration_minutes: None,
        status: None,
        reason: None,
        notes: None,
        location: None,
        created_at: None,
    }
}

pub fn insert_appointment(conn: &Connection, a: &AppointmentRow) {
    let (registered, unregistered) = patient_columns(&a.patient);
    conn.execute(
        "INSERT INTO appointments (id, patient_id, unregistered_patient_id, doctor_id,
         organization_id, scheduled_at, duration_minutes, status, reason, notes, location, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            a.id,
            registered,
            unregistered,
            a.doctor_id,
            a.organization_id,
            a.scheduled_at,
            a.duration_minutes,
            a.status,
            a.reason,
            a.notes,
            a.location,
            a.created_at,
        ],
    )
    .unwrap();
}

pub fn appointment(
    conn: &Connection,
    id: &str,
    patient: &PatientRef,
    doctor_id: &str,
    scheduled_at: Option<&str>,
) {
    let mut row = appointment_row(id, patient, doctor_id);
    row.scheduled_at = scheduled_at.map(str::to_string);
    insert_appointment(conn, &row);
}

pub fn consultation_row(id: &str, patient: &PatientRef, doctor_id: &str) -> ConsultationRow {
    ConsultationRow {
        id: id.to_string(),
        appointment_id: None,
        patient: patient.clone(),
        doctor_id: doctor_id.to_string(),
        organization_id: None,
        date: None,
        chief_complaint: None,
        diagnosis: None,
        notes: None,
        status: None,
        created_at: None,
    }
}

pub fn insert_consultation(conn: &Connection, c: &ConsultationRow) {
    let (registered, unregistered) = patient_columns(&c.patient);
    conn.execute(
        "INSERT INTO consultations (id, appointment_id, patient_id, unregistered_patient_id,
         doctor_id, organization_id, date, chief_complaint, diagnosis, notes, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            c.id,
            c.appointment_id,
            registered,
            unregistered,
            c.doctor_id,
            c.organization_id,
            c.date,
            c.chief_complaint,
            c.diagnosis,
            c.notes,
            c.status,
            c.created_at,
        ],
    )
    .unwrap();
}

pub fn consultation(
    conn: &Connection,
    id: &str,
    patient: &PatientRef,
    doctor_id: &str,
    appointment_id: Option<&str>,
    diagnosis: Option<&str>,
) {
    let mut row = consultation_row(id, patient, doctor_id);
    row.appointment_id = appointment_id.map(str::to_string);
    row.diagnosis = diagnosis.map(str::to_string);
    insert_consultation(conn, &row);
}

/// Prescription with one item per medication name, in order.
pub fn prescription(
    conn: &Connection,
    id: &str,
    patient: &PatientRef,
    doctor_id: &str,
    medications: &[&str],
) {
    let (registered, unregistered) = patient_columns(patient);
    conn.execute(
        "INSERT INTO prescriptions (id, patient_id, unregistered_patient_id, doctor_id, issued_at)
         VALUES (?1, ?2, ?3, ?4, '2026-01-15')",
        params![id, registered, unregistered, doctor_id],
    )
    .unwrap();
    for (pos, name) in medications.iter().enumerate() {
        conn.execute(
            "INSERT INTO prescription_items (id, prescription_id, medication_name, position)
             VALUES (?1, ?2, ?3, ?4)",
            params![format!("{id}-item-{pos}"), id, name, pos as i64],
        )
        .unwrap();
    }
}

pub fn lab_result(
    conn: &Connection,
    id: &str,
    patient: &PatientRef,
    test_name: &str,
    result: Option<&str>,
    reported_at: Option<&str>,
) {
    let (registered, unregistered) = patient_columns(patient);
    conn.execute(
        "INSERT INTO lab_results (id, patient_id, unregistered_patient_id, test_name, result, reported_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![id, registered, unregistered, test_name, result, reported_at],
    )
    .unwrap();
}

pub fn billing(conn: &Connection, id: &str, appointment_id: &str, amount: f64, payment_status: Option<&str>) {
    conn.execute(
        "INSERT INTO billing (id, appointment_id, amount, payment_status) VALUES (?1, ?2, ?3, ?4)",
        params![id, appointment_id, amount, payment_status],
    )
    .unwrap();
}

pub fn grant(
    conn: &Connection,
    id: &str,
    clinician_id: &str,
    patient_id: &str,
    verified: bool,
    expires_at: &str,
    revoked: bool,
) {
    conn.execute(
        "INSERT INTO full_access_grants (id, clinician_id, patient_id, verified_at, expires_at, revoked_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id,
            clinician_id,
            patient_id,
            verified.then_some("2026-10-19T11:00:00Z"),
            expires_at,
            revoked.then_some("2026-10-19T11:30:00Z"),
        ],
    )
    .unwrap();
}

pub fn queue_entry(
    conn: &Connection,
    id: &str,
    patient: &PatientRef,
    doctor_id: &str,
    appointment_id: Option<&str>,
    queue_date: &str,
    arrived_at: Option<&str>,
) {
    let (registered, unregistered) = patient_columns(patient);
    conn.execute(
        "INSERT INTO queue_entries (id, patient_id, unregistered_patient_id, doctor_id,
         appointment_id, queue_date, arrived_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![id, registered, unregistered, doctor_id, appointment_id, queue_date, arrived_at],
    )
    .unwrap();
}
