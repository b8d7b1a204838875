//! Daily queue endpoint.
//!
//! - `GET /api/queue?date=YYYY-MM-DD` — the caller's deduplicated arrival
//!   queue; `date` defaults to today (UTC)

use axum::extract::{Query, State};
use axum::Extension;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ClinicianContext};
use crate::queue::{self, QueueEntry};

#[derive(Debug, Deserialize)]
pub struct QueueParams {
    pub date: Option<String>,
}

#[derive(Serialize)]
pub struct QueueResponse {
    pub date: NaiveDate,
    pub entries: Vec<QueueEntry>,
}

fn parse_day(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(today),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| ApiError::BadRequest(format!("Invalid date '{s}', expected YYYY-MM-DD"))),
    }
}

/// `GET /api/queue`
pub async fn daily(
    State(ctx): State<ApiContext>,
    Extension(clinician): Extension<ClinicianContext>,
    Query(params): Query<QueueParams>,
) -> Result<Json<QueueResponse>, ApiError> {
    let request = clinician.request();
    let date = parse_day(params.date.as_deref(), request.now.date_naive())?;
    let entries = queue::daily_queue(ctx.core.source(), &request, date).await?;
    Ok(Json(QueueResponse { date, entries }))
}
