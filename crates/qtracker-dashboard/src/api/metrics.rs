//! Fleet metrics endpoint.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};

use super::jobs::fetch_job_records;
use crate::dto::{FleetMetrics, JobListParams};
use crate::error::ApiError;
use crate::mapper::fleet_metrics;
use crate::state::AppState;

/// GET /api/metrics - KPIs over the same listing `/api/jobs` returns.
pub async fn get_metrics(
    State(state): State<Arc<AppState>>,
    Query(params): Query<JobListParams>,
) -> Result<Json<FleetMetrics>, ApiError> {
    let records = fetch_job_records(&state, &params).await?;
    Ok(Json(fleet_metrics(&records)))
}
