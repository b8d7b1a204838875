//! Reconciler: merges appointment and consultation rows into one
//! deduplicated set of encounters.
//!
//! The merge key is the consultation's optional `appointment_id`. A
//! consultation merges into an appointment only when that appointment is
//! in the visible set and the caller's scope allows borrowing from it;
//! otherwise it stands alone and exposes no appointment id.

use std::collections::{HashMap, HashSet};

use crate::authorization::AccessScope;
use crate::config;
use crate::models::{AppointmentRow, ConsultationRow};
use crate::timestamp::parse_optional;

use super::dedup::resolve_duplicates;
use super::enrich::{present, present_owned};
use super::types::*;

pub fn reconcile(
    appointments: Vec<AppointmentRow>,
    consultations: Vec<ConsultationRow>,
    scope: &AccessScope,
) -> Vec<Encounter> {
    let visible: HashMap<&str, &AppointmentRow> =
        appointments.iter().map(|a| (a.id.as_str(), a)).collect();

    // Link key only when merging is allowed; everything else is unkeyed.
    let link_key = |c: &ConsultationRow| -> Option<String> {
        let appointment_id = present(&c.appointment_id)?;
        let appointment = visible.get(appointment_id)?;
        scope
            .may_merge_with(&appointment.doctor_id)
            .then(|| appointment_id.to_string())
    };
    let resolved = resolve_duplicates(consultations, link_key, newer_consultation);

    for loser in &resolved.displaced {
        tracing::warn!(
            target: "data_quality",
            consultation_id = %loser.id,
            appointment_id = loser.appointment_id.as_deref().unwrap_or_default(),
            "Duplicate consultation link; older consultation shown standalone"
        );
    }

    let mut linked: HashMap<String, ConsultationRow> = resolved.winners.into_iter().collect();
    let mut encounters = Vec::with_capacity(appointments.len() + resolved.unkeyed.len());

    for appointment in &appointments {
        let encounter = match linked.remove(&appointment.id) {
            Some(consultation) => merged(appointment, consultation),
            None => appointment_only(appointment),
        };
        encounters.push(encounter);
    }
    encounters.extend(
        resolved
            .unkeyed
            .into_iter()
            .chain(resolved.displaced)
            .map(consultation_only),
    );

    check_unique_appointments(&encounters);
    encounters
}

/// Latest `created_at` wins, a missing date counting as oldest. Ties go to
/// the greater id.
fn newer_consultation(candidate: &ConsultationRow, incumbent: &ConsultationRow) -> bool {
    let a = parse_optional(candidate.created_at.as_deref());
    let b = parse_optional(incumbent.created_at.as_deref());
    (a, &candidate.id) > (b, &incumbent.id)
}

fn doctor(id: &str) -> DoctorRef {
    DoctorRef {
        id: id.to_string(),
        name: config::UNKNOWN_DOCTOR_NAME.to_string(),
    }
}

fn duration(appointment: &AppointmentRow) -> u32 {
    appointment
        .duration_minutes
        .and_then(|m| u32::try_from(m).ok())
        .filter(|m| *m > 0)
        .unwrap_or(config::DEFAULT_DURATION_MINUTES)
}

fn merged(appointment: &AppointmentRow, consultation: ConsultationRow) -> Encounter {
    Encounter {
        id: appointment.id.clone(),
        kind: EncounterKind::Merged,
        appointment_id: Some(appointment.id.clone()),
        consultation_id: Some(consultation.id.clone()),
        patient: appointment.patient.clone(),
        doctor: doctor(&consultation.doctor_id),
        organization_id: present_owned(&appointment.organization_id)
            .or_else(|| present_owned(&consultation.organization_id)),
        scheduled_at: parse_optional(appointment.scheduled_at.as_deref()),
        started_at: parse_optional(consultation.date.as_deref()),
        created_at: parse_optional(appointment.created_at.as_deref())
            .or_else(|| parse_optional(consultation.created_at.as_deref())),
        status: present_owned(&appointment.status)
            .or_else(|| present_owned(&consultation.status))
            .unwrap_or_else(|| config::DEFAULT_CONSULTATION_STATUS.to_string()),
        reason: present_owned(&consultation.chief_complaint)
            .or_else(|| present_owned(&appointment.reason)),
        diagnosis: present_owned(&consultation.diagnosis),
        notes: present_owned(&consultation.notes).or_else(|| present_owned(&appointment.notes)),
        location: present_owned(&appointment.location),
        billing: None,
        duration_minutes: duration(appointment),
    }
}

fn appointment_only(appointment: &AppointmentRow) -> Encounter {
    Encounter {
        id: appointment.id.clone(),
        kind: EncounterKind::AppointmentOnly,
        appointment_id: Some(appointment.id.clone()),
        consultation_id: None,
        patient: appointment.patient.clone(),
        doctor: doctor(&appointment.doctor_id),
        organization_id: present_owned(&appointment.organization_id),
        scheduled_at: parse_optional(appointment.scheduled_at.as_deref()),
        started_at: None,
        created_at: parse_optional(appointment.created_at.as_deref()),
        status: present_owned(&appointment.status)
            .unwrap_or_else(|| config::DEFAULT_APPOINTMENT_STATUS.to_string()),
        reason: present_owned(&appointment.reason),
        diagnosis: None,
        notes: present_owned(&appointment.notes),
        location: present_owned(&appointment.location),
        billing: None,
        duration_minutes: duration(appointment),
    }
}

fn consultation_only(consultation: ConsultationRow) -> Encounter {
    Encounter {
        id: consultation.id.clone(),
        kind: EncounterKind::ConsultationOnly,
        appointment_id: None,
        consultation_id: Some(consultation.id.clone()),
        patient: consultation.patient.clone(),
        doctor: doctor(&consultation.doctor_id),
        organization_id: present_owned(&consultation.organization_id),
        scheduled_at: None,
        started_at: parse_optional(consultation.date.as_deref()),
        created_at: parse_optional(consultation.created_at.as_deref()),
        status: present_owned(&consultation.status)
            .unwrap_or_else(|| config::DEFAULT_CONSULTATION_STATUS.to_string()),
        reason: present_owned(&consultation.chief_complaint),
        diagnosis: present_owned(&consultation.diagnosis),
        notes: present_owned(&consultation.notes),
        location: None,
        billing: None,
        duration_minutes: config::DEFAULT_DURATION_MINUTES,
    }
}

/// No two encounters may share a non-null appointment id.
fn check_unique_appointments(encounters: &[Encounter]) {
    let mut seen = HashSet::new();
    let duplicates: Vec<&str> = encounters
        .iter()
        .filter_map(|e| e.appointment_id.as_deref())
        .filter(|id| !seen.insert(*id))
        .collect();
    if !duplicates.is_empty() {
        tracing::error!(?duplicates, "Reconciler produced duplicate appointments");
    }
    debug_assert!(duplicates.is_empty(), "duplicate appointment ids: {duplicates:?}");
}
