//! Access scope resolution for clinician → patient history reads.
//!
//! Cascade, checked in order:
//! 1. Valid full-access grant → FULL ACCESS
//! 2. Clinician authored an appointment or consultation → OWNED ONLY
//! 3. Default → DENY
//!
//! The scope is computed per request and never cached: grants are
//! time-boxed. A failed grant lookup counts as "no grant" (fail closed).

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::history::fetch::run_fetch;
use crate::history::{ClinicSource, HistoryError, RequestContext, SourceKind};
use crate::models::{PatientRef, Visibility};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Visibility tier the caller holds over one patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessScope {
    NoAccess,
    /// Only encounters authored by this clinician.
    OwnedOnly { clinician_id: String },
    FullAccess,
}

impl AccessScope {
    pub fn tier(&self) -> AccessTier {
        match self {
            Self::NoAccess => AccessTier::NoAccess,
            Self::OwnedOnly { .. } => AccessTier::OwnedOnly,
            Self::FullAccess => AccessTier::FullAccess,
        }
    }

    /// Store-side row visibility, or `None` when nothing may be read.
    pub fn visibility(&self) -> Option<Visibility> {
        match self {
            Self::NoAccess => None,
            Self::OwnedOnly { clinician_id } => Some(Visibility::OwnedBy(clinician_id.clone())),
            Self::FullAccess => Some(Visibility::All),
        }
    }

    /// Whether a consultation may take schedule and billing data from an
    /// appointment owned by `appointment_doctor_id`.
    pub fn may_merge_with(&self, appointment_doctor_id: &str) -> bool {
        match self {
            Self::NoAccess => false,
            Self::OwnedOnly { clinician_id } => clinician_id == appointment_doctor_id,
            Self::FullAccess => true,
        }
    }
}

/// Serializable form of `AccessScope`, without the clinician id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTier {
    NoAccess,
    OwnedOnly,
    FullAccess,
}

/// Why access was granted (or denied), for the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessReason {
    FullAccessGrant,
    OwnsEncounter,
    Denied,
}

/// Result of an authorization check.
#[derive(Debug, Clone)]
pub struct AccessDecision {
    pub scope: AccessScope,
    pub reason: AccessReason,
}

impl AccessDecision {
    pub fn allowed(&self) -> bool {
        self.reason != AccessReason::Denied
    }
}

/// Apply the cascade to already-fetched facts.
pub fn decide(clinician_id: &str, has_valid_grant: bool, owns_encounter: bool) -> AccessDecision {
    if has_valid_grant {
        AccessDecision {
            scope: AccessScope::FullAccess,
            reason: AccessReason::FullAccessGrant,
        }
    } else if owns_encounter {
        AccessDecision {
            scope: AccessScope::OwnedOnly {
                clinician_id: clinician_id.to_string(),
            },
            reason: AccessReason::OwnsEncounter,
        }
    } else {
        AccessDecision {
            scope: AccessScope::NoAccess,
            reason: AccessReason::Denied,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Single patient
// ═══════════════════════════════════════════════════════════

/// Resolve the caller's scope over one patient.
///
/// Grants are issued against registered patients only, so unregistered
/// patients go straight to the ownership check.
pub async fn resolve_access_scope(
    source: &Arc<dyn ClinicSource>,
    ctx: &RequestContext,
    patient: &PatientRef,
) -> Result<AccessDecision, HistoryError> {
    let has_grant = match patient {
        PatientRef::Registered(patient_id) => {
            let (clinician, patient_id, now) =
                (ctx.clinician_id.clone(), patient_id.clone(), ctx.now);
            match run_fetch(source, SourceKind::AccessGrants, move |s| {
                s.has_full_access_grant(&clinician, &patient_id, now)
            })
            .await
            {
                Ok(valid) => valid,
                Err(e) => {
                    tracing::warn!(
                        clinician_id = %ctx.clinician_id,
                        patient_id = patient.id(),
                        error = %e,
                        "Grant check failed; treating as no grant"
                    );
                    false
                }
            }
        }
        PatientRef::Unregistered(_) => false,
    };

    let owns = if has_grant {
        false
    } else {
        let (clinician, target) = (ctx.clinician_id.clone(), patient.clone());
        run_fetch(source, SourceKind::Ownership, move |s| {
            s.clinician_owns_encounter(&clinician, &target)
        })
        .await?
    };

    let decision = decide(&ctx.clinician_id, has_grant, owns);
    tracing::info!(
        clinician_id = %ctx.clinician_id,
        patient_id = patient.id(),
        tier = ?decision.scope.tier(),
        reason = ?decision.reason,
        "Access scope resolved"
    );
    Ok(decision)
}

// ═══════════════════════════════════════════════════════════
// Page of patients
// ═══════════════════════════════════════════════════════════

/// Scopes for every patient on a roster page, from two batched lookups.
#[derive(Debug, Clone)]
pub struct PageAccess {
    clinician_id: String,
    granted: HashSet<String>,
    owned: HashSet<String>,
}

impl PageAccess {
    pub fn new(clinician_id: impl Into<String>, granted: HashSet<String>, owned: HashSet<String>) -> Self {
        Self {
            clinician_id: clinician_id.into(),
            granted,
            owned,
        }
    }

    pub fn decision_for(&self, patient_id: &str) -> AccessDecision {
        decide(
            &self.clinician_id,
            self.granted.contains(patient_id),
            self.owned.contains(patient_id),
        )
    }

    /// Ids from `page_ids` the caller may see, in page order.
    pub fn visible_ids(&self, page_ids: &[String]) -> Vec<String> {
        page_ids
            .iter()
            .filter(|id| self.granted.contains(*id) || self.owned.contains(*id))
            .cloned()
            .collect()
    }

    /// One store-side filter covering every visible patient on the page.
    pub fn visibility(&self) -> Visibility {
        let mut granted: Vec<String> = self.granted.iter().cloned().collect();
        granted.sort();
        Visibility::OwnedByOrGranted {
            clinician_id: self.clinician_id.clone(),
            granted,
        }
    }
}

pub async fn resolve_page_access(
    source: &Arc<dyn ClinicSource>,
    ctx: &RequestContext,
    patient_ids: &[String],
) -> Result<PageAccess, HistoryError> {
    if patient_ids.is_empty() {
        return Ok(PageAccess::new(ctx.clinician_id.clone(), HashSet::new(), HashSet::new()));
    }

    let (clinician, ids, now) = (ctx.clinician_id.clone(), patient_ids.to_vec(), ctx.now);
    let granted = run_fetch(source, SourceKind::AccessGrants, move |s| {
        s.granted_patients(&clinician, &ids, now)
    })
    .await
    .unwrap_or_else(|e| {
        tracing::warn!(
            clinician_id = %ctx.clinician_id,
            error = %e,
            "Batched grant check failed; treating page as ungranted"
        );
        HashSet::new()
    });

    let (clinician, ids) = (ctx.clinician_id.clone(), patient_ids.to_vec());
    let owned = run_fetch(source, SourceKind::Ownership, move |s| {
        s.owned_patients(&clinician, &ids)
    })
    .await?;

    Ok(PageAccess::new(ctx.clinician_id.clone(), granted, owned))
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::seed;
    use crate::history::SqliteSource;
    use chrono::{TimeZone, Utc};

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn setup() -> (tempfile::TempDir, Arc<dyn ClinicSource>, rusqlite::Connection) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinic.db");
        let source = SqliteSource::open(&path).unwrap();
        let conn = crate::db::open_connection(&path).unwrap();
        (dir, Arc::new(source), conn)
    }

    #[test]
    fn decide_follows_cascade() {
        assert_eq!(decide("d1", true, true).scope, AccessScope::FullAccess);
        assert_eq!(
            decide("d1", false, true).scope,
            AccessScope::OwnedOnly {
                clinician_id: "d1".into()
            }
        );
        let denied = decide("d1", false, false);
        assert_eq!(denied.scope, AccessScope::NoAccess);
        assert!(!denied.allowed());
    }

    #[test]
    fn owned_scope_merges_only_own_appointments() {
        let scope = AccessScope::OwnedOnly {
            clinician_id: "d1".into(),
        };
        assert!(scope.may_merge_with("d1"));
        assert!(!scope.may_merge_with("d2"));
        assert!(AccessScope::FullAccess.may_merge_with("d2"));
        assert!(!AccessScope::NoAccess.may_merge_with("d1"));
        assert_eq!(AccessScope::NoAccess.visibility(), None);
    }

    #[tokio::test]
    async fn valid_grant_gives_full_access() {
        let (_dir, source, conn) = setup();
        seed::patient(&conn, "p1", "Ana");
        seed::grant(&conn, "g1", "d1", "p1", true, "2026-10-19T13:00:00Z", false);

        let ctx = RequestContext::at("d1", now());
        let patient = PatientRef::Registered("p1".into());
        let decision = resolve_access_scope(&source, &ctx, &patient).await.unwrap();
        assert_eq!(decision.scope, AccessScope::FullAccess);
        assert_eq!(decision.reason, AccessReason::FullAccessGrant);
    }

    #[tokio::test]
    async fn expired_unverified_or_revoked_grants_do_not_count() {
        let (_dir, source, conn) = setup();
        seed::patient(&conn, "p1", "Ana");
        seed::grant(&conn, "g1", "d1", "p1", true, "2026-10-19T11:59:59Z", false);
        seed::grant(&conn, "g2", "d1", "p1", false, "2026-10-19T13:00:00Z", false);
        seed::grant(&conn, "g3", "d1", "p1", true, "2026-10-19T13:00:00Z", true);

        let ctx = RequestContext::at("d1", now());
        let patient = PatientRef::Registered("p1".into());
        let decision = resolve_access_scope(&source, &ctx, &patient).await.unwrap();
        assert_eq!(decision.scope, AccessScope::NoAccess);
    }

    #[tokio::test]
    async fn ownership_gives_owned_only() {
        let (_dir, source, conn) = setup();
        seed::unregistered_patient(&conn, "u1", "Walk-in");
        let patient = PatientRef::Unregistered("u1".into());
        seed::consultation(&conn, "c1", &patient, "d1", None, None);

        let ctx = RequestContext::at("d1", now());
        let decision = resolve_access_scope(&source, &ctx, &patient).await.unwrap();
        assert_eq!(decision.reason, AccessReason::OwnsEncounter);

        let other = RequestContext::at("d2", now());
        let denied = resolve_access_scope(&source, &other, &patient).await.unwrap();
        assert_eq!(denied.scope, AccessScope::NoAccess);
    }

    #[tokio::test]
    async fn page_access_batches_grants_and_ownership() {
        let (_dir, source, conn) = setup();
        for id in ["p1", "p2", "p3"] {
            seed::patient(&conn, id, id);
        }
        seed::grant(&conn, "g1", "d1", "p1", true, "2026-12-01T00:00:00Z", false);
        seed::appointment(&conn, "a2", &PatientRef::Registered("p2".into()), "d1", None);

        let ids: Vec<String> = ["p1", "p2", "p3"].iter().map(|s| s.to_string()).collect();
        let ctx = RequestContext::at("d1", now());
        let page = resolve_page_access(&source, &ctx, &ids).await.unwrap();

        assert_eq!(page.decision_for("p1").scope, AccessScope::FullAccess);
        assert_eq!(page.decision_for("p2").scope.tier(), AccessTier::OwnedOnly);
        assert_eq!(page.decision_for("p3").scope, AccessScope::NoAccess);
        assert_eq!(page.visible_ids(&ids), vec!["p1", "p2"]);
    }
}
