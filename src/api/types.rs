//! Shared types for the HTTP layer.

use std::sync::Arc;

use crate::core_state::CoreState;
use crate::history::RequestContext;

/// Header carrying the caller's clinician id, set by the upstream
/// authentication gateway.
pub const CLINICIAN_HEADER: &str = "X-Clinician-Id";

/// Longest clinician id accepted from the header.
pub const MAX_CLINICIAN_ID_LEN: usize = 128;

// ═══════════════════════════════════════════════════════════
// API context — shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

// ═══════════════════════════════════════════════════════════
// Clinician context — injected by the clinician middleware
// ═══════════════════════════════════════════════════════════

/// Identified caller, injected into request extensions.
#[derive(Debug, Clone)]
pub struct ClinicianContext {
    pub clinician_id: String,
}

impl ClinicianContext {
    /// Per-request engine context, stamped with the current time.
    pub fn request(&self) -> RequestContext {
        RequestContext::new(self.clinician_id.clone())
    }
}

/// Validate a raw header value as a clinician id.
pub fn parse_clinician_id(raw: &str) -> Option<String> {
    let id = raw.trim();
    let valid = !id.is_empty()
        && id.len() <= MAX_CLINICIAN_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    valid.then(|| id.to_string())
}
