//! Source fetchers: the narrow, read-only query surface the engine
//! consumes. `SqliteSource` is the production implementation.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;

use crate::db::{self, DatabaseError};
use crate::models::*;

/// Read-only access to every store the engine draws from.
///
/// Calls are synchronous and may block; the engine runs each one on the
/// blocking pool. Every list operation takes the full id set for the
/// request so implementations can answer with one batched query.
pub trait ClinicSource: Send + Sync {
    fn resolve_patient_kind(&self, patient_id: &str) -> Result<PatientRef, DatabaseError>;

    fn has_full_access_grant(
        &self,
        clinician_id: &str,
        patient_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DatabaseError>;

    fn clinician_owns_encounter(
        &self,
        clinician_id: &str,
        patient: &PatientRef,
    ) -> Result<bool, DatabaseError>;

    fn granted_patients(
        &self,
        clinician_id: &str,
        patient_ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<HashSet<String>, DatabaseError>;

    fn owned_patients(
        &self,
        clinician_id: &str,
        patient_ids: &[String],
    ) -> Result<HashSet<String>, DatabaseError>;

    fn fetch_appointments(&self, filter: &RecordFilter) -> Result<Vec<AppointmentRow>, DatabaseError>;

    fn fetch_consultations(&self, filter: &RecordFilter) -> Result<Vec<ConsultationRow>, DatabaseError>;

    fn fetch_prescriptions(&self, filter: &RecordFilter) -> Result<Vec<PrescriptionRow>, DatabaseError>;

    fn fetch_lab_results(&self, patients: &PatientSet) -> Result<Vec<LabResultRow>, DatabaseError>;

    fn fetch_billing(&self, appointment_ids: &[String]) -> Result<Vec<BillingRow>, DatabaseError>;

    fn resolve_doctor_names(
        &self,
        doctor_ids: &[String],
    ) -> Result<HashMap<String, String>, DatabaseError>;

    fn list_patients(&self, query: &PatientListQuery) -> Result<PatientRosterPage, DatabaseError>;

    fn fetch_queue_entries(
        &self,
        day: NaiveDate,
        doctor_id: &str,
    ) -> Result<Vec<QueueEntryRow>, DatabaseError>;
}

/// SQLite-backed source. Opens one connection per call so concurrent
/// fetches read in parallel instead of queueing on a shared handle.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
}

impl SqliteSource {
    /// Open (creating if needed) the database and bring the schema current.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Unavailable(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        let conn = db::open_database(path)?;
        drop(conn);
        tracing::info!(path = %path.display(), "Clinic store opened");
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    fn connect(&self) -> Result<Connection, DatabaseError> {
        db::open_connection(&self.path)
    }
}

impl ClinicSource for SqliteSource {
    fn resolve_patient_kind(&self, patient_id: &str) -> Result<PatientRef, DatabaseError> {
        db::resolve_patient_kind(&self.connect()?, patient_id)
    }

    fn has_full_access_grant(
        &self,
        clinician_id: &str,
        patient_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        db::has_full_access_grant(&self.connect()?, clinician_id, patient_id, now)
    }

    fn clinician_owns_encounter(
        &self,
        clinician_id: &str,
        patient: &PatientRef,
    ) -> Result<bool, DatabaseError> {
        db::clinician_owns_encounter(&self.connect()?, clinician_id, patient)
    }

    fn granted_patients(
        &self,
        clinician_id: &str,
        patient_ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<HashSet<String>, DatabaseError> {
        db::granted_patients(&self.connect()?, clinician_id, patient_ids, now)
    }

    fn owned_patients(
        &self,
        clinician_id: &str,
        patient_ids: &[String],
    ) -> Result<HashSet<String>, DatabaseError> {
        db::owned_patients(&self.connect()?, clinician_id, patient_ids)
    }

    fn fetch_appointments(&self, filter: &RecordFilter) -> Result<Vec<AppointmentRow>, DatabaseError> {
        db::fetch_appointments(&self.connect()?, filter)
    }

    fn fetch_consultations(&self, filter: &RecordFilter) -> Result<Vec<ConsultationRow>, DatabaseError> {
        db::fetch_consultations(&self.connect()?, filter)
    }

    fn fetch_prescriptions(&self, filter: &RecordFilter) -> Result<Vec<PrescriptionRow>, DatabaseError> {
        db::fetch_prescriptions(&self.connect()?, filter)
    }

    fn fetch_lab_results(&self, patients: &PatientSet) -> Result<Vec<LabResultRow>, DatabaseError> {
        db::fetch_lab_results(&self.connect()?, patients)
    }

    fn fetch_billing(&self, appointment_ids: &[String]) -> Result<Vec<BillingRow>, DatabaseError> {
        db::fetch_billing(&self.connect()?, appointment_ids)
    }

    fn resolve_doctor_names(
        &self,
        doctor_ids: &[String],
    ) -> Result<HashMap<String, String>, DatabaseError> {
        db::resolve_doctor_names(&self.connect()?, doctor_ids)
    }

    fn list_patients(&self, query: &PatientListQuery) -> Result<PatientRosterPage, DatabaseError> {
        db::list_patients(&self.connect()?, query)
    }

    fn fetch_queue_entries(
        &self,
        day: NaiveDate,
        doctor_id: &str,
    ) -> Result<Vec<QueueEntryRow>, DatabaseError> {
        db::fetch_queue_entries(&self.connect()?, day, doctor_id)
    }
}
