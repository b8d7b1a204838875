//! Audit logging middleware.
//!
//! Logs every API request with request id, clinician id, method, path,
//! response status and latency. Runs outermost (inside the context
//! extension) so rejected requests are recorded too.

use std::time::Instant;

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::api::types::{parse_clinician_id, ApiContext, CLINICIAN_HEADER};
use crate::core_state::AuditEntry;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Log API access for the audit trail and tag the response with a
/// request id.
pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let request_id = Uuid::new_v4().to_string();

    let ctx = req.extensions().get::<ApiContext>().cloned();
    let clinician_id = req
        .headers()
        .get(CLINICIAN_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_clinician_id);

    let mut response = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, val);
    }

    if let Some(ctx) = ctx {
        ctx.core.log_access(AuditEntry {
            timestamp: chrono::Utc::now(),
            request_id,
            clinician_id,
            action: format!("{method} {path}"),
            status: response.status().as_u16(),
            latency_ms: started.elapsed().as_millis() as u64,
        });
    }

    response
}
