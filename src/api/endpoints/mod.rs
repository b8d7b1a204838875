//! API endpoint handlers.
//!
//! Handlers are thin: they extract the caller and parameters, then hand
//! off to the engine in `crate::history` and `crate::queue`.

pub mod health;
pub mod history;
pub mod patients;
pub mod queue;

use axum::http::Uri;

use crate::api::error::ApiError;

/// JSON 404 for unknown routes.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
