//! Caller identification middleware.
//!
//! Authentication happens upstream; this layer only requires the
//! `X-Clinician-Id` header and injects `ClinicianContext` into request
//! extensions for downstream handlers.

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{parse_clinician_id, ClinicianContext, CLINICIAN_HEADER};

/// Reject requests without a usable clinician id.
pub async fn require_clinician(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_clinician_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_clinician_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let clinician_id = req
        .headers()
        .get(CLINICIAN_HEADER)
        .and_then(|v: &HeaderValue| v.to_str().ok())
        .and_then(parse_clinician_id)
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(ClinicianContext { clinician_id });

    Ok(next.run(req).await)
}
