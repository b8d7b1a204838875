//! Enricher: billing snapshots, doctor names, prescription display lines
//! and lab payload extraction.

use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value};

use crate::config;
use crate::models::*;
use crate::timestamp::{parse_optional, parse_timestamp};

use super::fetch::ClinicalRows;
use super::types::*;

/// Trimmed, non-empty text or `None`.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Owned variant of `present`.
pub(crate) fn present_owned(value: &Option<String>) -> Option<String> {
    present(value).map(str::to_string)
}

// ── Billing ────────────────────────────────────────────────────────────────

/// `appointment_id → snapshot`. Rows arrive ordered by creation within an
/// appointment, so the latest billing row wins.
pub fn billing_index(rows: Vec<BillingRow>) -> HashMap<String, BillingSnapshot> {
    rows.into_iter()
        .map(|row| {
            let snapshot = BillingSnapshot {
                amount: row.amount,
                currency: row.currency,
                payment_status: present_owned(&row.payment_status),
                paid_at: parse_optional(row.paid_at.as_deref()),
            };
            (row.appointment_id, snapshot)
        })
        .collect()
}

/// Attach billing to appointment-backed encounters. With no index (the
/// billing fetch failed) every snapshot stays `None`.
pub fn attach_billing(
    encounters: &mut [Encounter],
    index: Option<&HashMap<String, BillingSnapshot>>,
) {
    let Some(index) = index else {
        return;
    };
    for encounter in encounters.iter_mut() {
        encounter.billing = encounter
            .appointment_id
            .as_ref()
            .and_then(|id| index.get(id))
            .cloned();
    }
}

// ── Doctors ────────────────────────────────────────────────────────────────

/// Distinct clinician ids across the owned sources, sorted.
pub(crate) fn doctor_ids(rows: &ClinicalRows) -> Vec<String> {
    let ids: BTreeSet<&str> = rows
        .appointments
        .iter()
        .map(|a| a.doctor_id.as_str())
        .chain(rows.consultations.iter().map(|c| c.doctor_id.as_str()))
        .chain(rows.prescriptions.iter().map(|p| p.doctor_id.as_str()))
        .collect();
    ids.into_iter().map(str::to_string).collect()
}

pub fn doctor_ref(doctor_id: &str, names: Option<&HashMap<String, String>>) -> DoctorRef {
    let name = names
        .and_then(|n| n.get(doctor_id))
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .unwrap_or(config::UNKNOWN_DOCTOR_NAME);
    DoctorRef {
        id: doctor_id.to_string(),
        name: name.to_string(),
    }
}

pub fn apply_doctor_names(encounters: &mut [Encounter], names: Option<&HashMap<String, String>>) {
    for encounter in encounters.iter_mut() {
        encounter.doctor = doctor_ref(&encounter.doctor.id, names);
    }
}

// ── Prescriptions ──────────────────────────────────────────────────────────

/// `"dosage (form)"`, or whichever of the two is filled.
pub fn display_dose(item: &PrescriptionItemRow) -> Option<String> {
    match (present(&item.dosage), present(&item.form)) {
        (Some(dosage), Some(form)) => Some(format!("{dosage} ({form})")),
        (Some(dosage), None) => Some(dosage.to_string()),
        (None, Some(form)) => Some(form.to_string()),
        (None, None) => None,
    }
}

/// Explicit instructions, else `"frequency por duration"`, else whichever
/// of the two is filled.
pub fn display_instructions(item: &PrescriptionItemRow) -> Option<String> {
    if let Some(explicit) = present(&item.instructions) {
        return Some(explicit.to_string());
    }
    match (present(&item.frequency), present(&item.duration)) {
        (Some(frequency), Some(duration)) => Some(format!("{frequency} por {duration}")),
        (Some(frequency), None) => Some(frequency.to_string()),
        (None, Some(duration)) => Some(duration.to_string()),
        (None, None) => None,
    }
}

pub fn medication_line(item: &PrescriptionItemRow) -> MedicationLine {
    MedicationLine {
        name: item.medication_name.trim().to_string(),
        dose: display_dose(item),
        instructions: display_instructions(item),
        quantity: present_owned(&item.quantity),
    }
}

pub fn prescription_view(
    row: &PrescriptionRow,
    names: Option<&HashMap<String, String>>,
) -> PrescriptionView {
    PrescriptionView {
        id: row.id.clone(),
        doctor: doctor_ref(&row.doctor_id, names),
        consultation_id: row.consultation_id.clone(),
        issued_at: parse_optional(row.issued_at.as_deref()),
        valid_until: parse_optional(row.valid_until.as_deref()),
        created_at: parse_optional(row.created_at.as_deref()),
        status: present_owned(&row.status)
            .unwrap_or_else(|| config::DEFAULT_PRESCRIPTION_STATUS.to_string()),
        notes: present_owned(&row.notes),
        medications: row.items.iter().map(medication_line).collect(),
    }
}

// ── Lab results ────────────────────────────────────────────────────────────

const VALUE_KEYS: &[&str] = &["value", "result"];
const UNIT_KEYS: &[&str] = &["unit", "units"];
const REFERENCE_RANGE_KEYS: &[&str] = &["referenceRange", "reference_range"];
const COMMENT_KEYS: &[&str] = &["comment", "comments"];
const STATUS_KEYS: &[&str] = &["status"];

/// A lab `result` column, interpreted once.
#[derive(Debug, Clone, PartialEq)]
pub enum LabPayload {
    Empty,
    Scalar(Value),
    Object(Map<String, Value>),
}

impl LabPayload {
    /// JSON objects keep their keys; any other JSON value is a scalar; text
    /// that is not JSON at all is a string scalar.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(text) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::Empty;
        };
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Self::Object(map),
            Ok(Value::Null) => Self::Empty,
            Ok(other) => Self::Scalar(other),
            Err(_) => Self::Scalar(Value::String(text.to_string())),
        }
    }
}

/// First non-null value under any of `keys`, in order.
fn lookup<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null())
}

fn lookup_text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match lookup(map, keys)? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

pub fn lab_result_view(row: &LabResultRow) -> LabResultView {
    let mut view = LabResultView {
        id: row.id.clone(),
        test_name: row.test_name.trim().to_string(),
        lab_name: present_owned(&row.lab_name),
        result: None,
        unit: None,
        reference_range: None,
        comment: None,
        status: present_owned(&row.status),
        date: row
            .reported_at
            .as_deref()
            .and_then(parse_timestamp)
            .or_else(|| parse_optional(row.created_at.as_deref())),
    };

    match LabPayload::parse(row.result.as_deref()) {
        LabPayload::Empty => {}
        LabPayload::Scalar(value) => view.result = Some(value),
        LabPayload::Object(map) => {
            view.unit = lookup_text(&map, UNIT_KEYS);
            view.reference_range = lookup_text(&map, REFERENCE_RANGE_KEYS);
            view.comment = lookup_text(&map, COMMENT_KEYS);
            if let Some(status) = lookup_text(&map, STATUS_KEYS) {
                view.status = Some(status);
            }
            // No recognised value key: keep the whole object rather than drop it.
            view.result = match lookup(&map, VALUE_KEYS) {
                Some(value) => Some(value.clone()),
                None => Some(Value::Object(map)),
            };
        }
    }
    view
}
