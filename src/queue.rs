//! Daily queue projection.
//!
//! Reception check-ins and walk-ins are written independently, so one
//! arrival can appear several times for the same day. Entries that share
//! an appointment (or, when unlinked, the same patient) collapse to the
//! earliest arrival; later duplicates are logged as data-quality signals.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::history::dedup::resolve_duplicates;
use crate::history::enrich::present_owned;
use crate::history::fetch::run_fetch;
use crate::history::{ClinicSource, HistoryError, RequestContext, SourceKind};
use crate::models::{PatientRef, QueueEntryRow};
use crate::timestamp::parse_optional;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: String,
    pub patient: PatientRef,
    pub doctor_id: String,
    pub appointment_id: Option<String>,
    pub arrived_at: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ArrivalKey {
    Appointment(String),
    Patient(PatientRef),
}

fn arrival_key(entry: &QueueEntry) -> Option<ArrivalKey> {
    Some(match &entry.appointment_id {
        Some(id) => ArrivalKey::Appointment(id.clone()),
        None => ArrivalKey::Patient(entry.patient.clone()),
    })
}

/// Earlier arrival wins, a missing arrival counting as latest. Ties go to
/// the smaller id.
fn earlier_arrival(candidate: &QueueEntry, incumbent: &QueueEntry) -> bool {
    match arrival_order(candidate.arrived_at, incumbent.arrived_at) {
        Ordering::Equal => candidate.id < incumbent.id,
        order => order.is_lt(),
    }
}

/// Ascending, missing arrivals after every dated one.
fn arrival_order(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn entry_from_row(row: QueueEntryRow) -> QueueEntry {
    QueueEntry {
        appointment_id: present_owned(&row.appointment_id),
        arrived_at: parse_optional(row.arrived_at.as_deref())
            .or_else(|| parse_optional(row.created_at.as_deref())),
        status: present_owned(&row.status),
        id: row.id,
        patient: row.patient,
        doctor_id: row.doctor_id,
    }
}

/// Deduplicate one day's entries; output is ordered by arrival, earliest
/// first, with undated entries last.
pub fn project_daily_queue(rows: Vec<QueueEntryRow>) -> Vec<QueueEntry> {
    let resolved = resolve_duplicates(
        rows.into_iter().map(entry_from_row),
        arrival_key,
        earlier_arrival,
    );

    for dup in &resolved.displaced {
        tracing::warn!(
            target: "data_quality",
            queue_entry_id = %dup.id,
            patient_id = dup.patient.id(),
            "Duplicate queue arrival dropped"
        );
    }

    let mut queue: Vec<QueueEntry> = resolved
        .winners
        .into_iter()
        .map(|(_, entry)| entry)
        .chain(resolved.unkeyed)
        .collect();
    queue.sort_by(|a, b| arrival_order(a.arrived_at, b.arrived_at));
    queue
}

/// The caller's own queue for `day`.
pub async fn daily_queue(
    source: &Arc<dyn ClinicSource>,
    ctx: &RequestContext,
    day: NaiveDate,
) -> Result<Vec<QueueEntry>, HistoryError> {
    let doctor_id = ctx.clinician_id.clone();
    let rows = run_fetch(source, SourceKind::Queue, move |s| {
        s.fetch_queue_entries(day, &doctor_id)
    })
    .await?;

    let raw = rows.len();
    let queue = project_daily_queue(rows);
    tracing::info!(
        clinician_id = %ctx.clinician_id,
        %day,
        raw,
        deduplicated = queue.len(),
        "Daily queue projected"
    );
    Ok(queue)
}
