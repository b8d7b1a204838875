use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::PatientRef;
use crate::timestamp::parse_timestamp;

use super::query::ScopedQuery;

/// A grant counts only once verified, while not revoked, and strictly
/// before its expiry. An unparseable expiry never counts.
fn grant_is_live(expires_at: &str, now: DateTime<Utc>) -> bool {
    parse_timestamp(expires_at).is_some_and(|exp| exp > now)
}

/// Whether a verified, unexpired, unrevoked full-access grant exists
/// for (clinician, patient).
pub fn has_full_access_grant(
    conn: &Connection,
    clinician_id: &str,
    patient_id: &str,
    now: DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT expires_at FROM full_access_grants
         WHERE clinician_id = ?1 AND patient_id = ?2
           AND verified_at IS NOT NULL AND revoked_at IS NULL",
    )?;
    let expiries = stmt.query_map(params![clinician_id, patient_id], |row| row.get::<_, String>(0))?;

    for expires_at in expiries {
        if grant_is_live(&expires_at?, now) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Batched grant check: the subset of `patient_ids` with a live grant.
pub fn granted_patients(
    conn: &Connection,
    clinician_id: &str,
    patient_ids: &[String],
    now: DateTime<Utc>,
) -> Result<HashSet<String>, DatabaseError> {
    if patient_ids.is_empty() {
        return Ok(HashSet::new());
    }

    let query = ScopedQuery::new()
        .eq("g.clinician_id", clinician_id.to_string())
        .in_list("g.patient_id", patient_ids);
    let sql = format!(
        "SELECT g.patient_id, g.expires_at FROM full_access_grants g
         WHERE g.verified_at IS NOT NULL AND g.revoked_at IS NULL{}",
        query.sql_suffix()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(query.param_refs().as_slice(), |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut granted = HashSet::new();
    for row in rows {
        let (patient_id, expires_at) = row?;
        if grant_is_live(&expires_at, now) {
            granted.insert(patient_id);
        }
    }
    Ok(granted)
}

/// Whether the clinician authored at least one appointment or
/// consultation for this patient.
pub fn clinician_owns_encounter(
    conn: &Connection,
    clinician_id: &str,
    patient: &PatientRef,
) -> Result<bool, DatabaseError> {
    let column = patient.key_column();
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM appointments WHERE doctor_id = ?1 AND {column} = ?2)
             OR EXISTS(SELECT 1 FROM consultations WHERE doctor_id = ?1 AND {column} = ?2)"
    );
    let owns: bool = conn.query_row(&sql, params![clinician_id, patient.id()], |row| row.get(0))?;
    Ok(owns)
}

/// Batched ownership check over registered patients.
pub fn owned_patients(
    conn: &Connection,
    clinician_id: &str,
    patient_ids: &[String],
) -> Result<HashSet<String>, DatabaseError> {
    if patient_ids.is_empty() {
        return Ok(HashSet::new());
    }

    // Placeholders are shared by both halves of the UNION.
    let query = ScopedQuery::new()
        .eq("doctor_id", clinician_id.to_string())
        .in_list("patient_id", patient_ids);
    let suffix = query.sql_suffix();
    let sql = format!(
        "SELECT patient_id FROM appointments WHERE 1=1{suffix}
         UNION
         SELECT patient_id FROM consultations WHERE 1=1{suffix}"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(query.param_refs().as_slice(), |row| row.get::<_, String>(0))?;
    rows.collect::<Result<HashSet<_>, _>>().map_err(DatabaseError::from)
}
