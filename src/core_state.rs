//! Service-wide shared state.
//!
//! `CoreState` is built once at startup, wrapped in `Arc`, and shared by
//! every request. It holds the clinic source and a bounded in-memory
//! audit buffer; there is no per-request or per-clinician state here.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::history::ClinicSource;

/// Entries kept in the audit buffer; older entries are dropped first.
const AUDIT_BUFFER_CAPACITY: usize = 500;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    source: Arc<dyn ClinicSource>,
    audit: AuditLogger,
    started_at: Instant,
}

impl CoreState {
    pub fn new(source: Arc<dyn ClinicSource>) -> Self {
        Self {
            source,
            audit: AuditLogger::new(),
            started_at: Instant::now(),
        }
    }

    /// Source handed to the history engine.
    pub fn source(&self) -> &Arc<dyn ClinicSource> {
        &self.source
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Record a served request.
    pub fn log_access(&self, entry: AuditEntry) {
        self.audit.log(entry);
    }

    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit.entries()
    }
}

// ═══════════════════════════════════════════════════════════
// Audit logging
// ═══════════════════════════════════════════════════════════

/// A single audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
    /// `None` when the request was rejected before identification.
    pub clinician_id: Option<String>,
    pub action: String,
    pub status: u16,
    pub latency_ms: u64,
}

/// Bounded ring of recent access events. Every entry is also emitted on
/// the `audit` tracing target.
pub struct AuditLogger {
    buffer: Mutex<VecDeque<AuditEntry>>,
}

impl AuditLogger {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(AUDIT_BUFFER_CAPACITY)),
        }
    }

    pub fn log(&self, entry: AuditEntry) {
        tracing::info!(
            target: "audit",
            request_id = %entry.request_id,
            clinician_id = entry.clinician_id.as_deref().unwrap_or("-"),
            action = %entry.action,
            status = entry.status,
            latency_ms = entry.latency_ms,
            "Request served"
        );
        match self.buffer.lock() {
            Ok(mut buf) => {
                if buf.len() == AUDIT_BUFFER_CAPACITY {
                    buf.pop_front();
                }
                buf.push_back(entry);
            }
            Err(_) => tracing::warn!("Audit buffer lock poisoned; entry kept in log only"),
        }
    }

    /// Get all buffered entries, oldest first.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.buffer
            .lock()
            .map(|buf| buf.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.lock().map(|buf| buf.len()).unwrap_or(0)
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> AuditEntry {
        AuditEntry {
            timestamp: Utc::now(),
            request_id: format!("req-{n}"),
            clinician_id: Some("d1".into()),
            action: "GET /api/health".into(),
            status: 200,
            latency_ms: 1,
        }
    }

    #[test]
    fn audit_buffer_keeps_order() {
        let logger = AuditLogger::new();
        logger.log(entry(1));
        logger.log(entry(2));
        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].request_id, "req-1");
    }

    #[test]
    fn audit_buffer_is_bounded() {
        let logger = AuditLogger::new();
        for n in 0..AUDIT_BUFFER_CAPACITY + 5 {
            logger.log(entry(n));
        }
        assert_eq!(logger.buffer_len(), AUDIT_BUFFER_CAPACITY);
        assert_eq!(logger.entries()[0].request_id, "req-5");
    }
}
