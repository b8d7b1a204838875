//! Patient roster endpoint.
//!
//! - `GET /api/patients` — paginated roster with per-row access tier and
//!   optional counters

use axum::extract::{Query, State};
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ClinicianContext};
use crate::history::{self, PatientListPage};
use crate::models::PatientListQuery;

#[derive(Debug, Default, Deserialize)]
pub struct PatientListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub organization_id: Option<String>,
    pub include_summary: Option<bool>,
}

impl From<PatientListParams> for PatientListQuery {
    fn from(params: PatientListParams) -> Self {
        PatientListQuery {
            page: params.page.unwrap_or(1),
            per_page: params.per_page.unwrap_or(0),
            search: params.search,
            organization_id: params.organization_id,
            include_summary: params.include_summary.unwrap_or(false),
        }
    }
}

/// `GET /api/patients`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(clinician): Extension<ClinicianContext>,
    Query(params): Query<PatientListParams>,
) -> Result<Json<PatientListPage>, ApiError> {
    let request = clinician.request();
    let page = history::list_patients(ctx.core.source(), &request, params.into()).await?;
    Ok(Json(page))
}
