//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::history::{HistoryError, SourceKind};

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    /// Failing collaborator, for upstream errors only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceKind>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Access denied: {0}")]
    AccessDenied(String),
    #[error("Upstream fetch failed ({source_kind}): {reason}")]
    UpstreamFetch {
        source_kind: SourceKind,
        reason: String,
    },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut source = None;
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
            ),
            ApiError::AccessDenied(detail) => (
                StatusCode::FORBIDDEN,
                "ACCESS_DENIED",
                detail.clone(),
            ),
            ApiError::UpstreamFetch {
                source_kind,
                reason,
            } => {
                tracing::error!(source = %source_kind, reason, "Upstream fetch failed");
                source = Some(*source_kind);
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_FETCH_FAILED",
                    format!("Could not read {source_kind}"),
                )
            }
            ApiError::NotFound(detail) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                detail.clone(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                detail.clone(),
            ),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                source,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<HistoryError> for ApiError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::AccessDenied { patient_id, .. } => {
                ApiError::AccessDenied(format!("No access to patient {patient_id}"))
            }
            HistoryError::UpstreamFetch {
                source_kind,
                reason,
            } => ApiError::UpstreamFetch {
                source_kind,
                reason,
            },
            HistoryError::InvalidRequest(detail) => ApiError::BadRequest(detail),
        }
    }
}
