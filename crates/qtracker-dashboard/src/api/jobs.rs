//! Job listing endpoint.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use futures::{FutureExt, StreamExt, stream};
use qtracker_hal::JobQuery;

use crate::dto::{JobListParams, JobRecord};
use crate::error::ApiError;
use crate::mapper::job_to_record;
use crate::state::AppState;

/// GET /api/jobs - Recent jobs, newest first unless `descending=false`.
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<JobListParams>,
) -> Result<Json<Vec<JobRecord>>, ApiError> {
    Ok(Json(fetch_job_records(&state, &params).await?))
}

/// Jobs mapped at the same time. Each one may issue its own upstream
/// requests, so this caps the per-listing fan-out.
pub const MAX_CONCURRENT_JOBS: usize = 8;

/// List jobs upstream and map each one, in listing order. Only the listing
/// call can fail.
pub(crate) async fn fetch_job_records(
    state: &AppState,
    params: &JobListParams,
) -> Result<Vec<JobRecord>, ApiError> {
    let service = state.service()?;

    let query = JobQuery {
        limit: params.limit,
        descending: params.descending,
    };
    let jobs = service.jobs(query).await.map_err(|e| {
        tracing::error!(error = %e, "Error listing jobs");
        ApiError::from(e)
    })?;

    let records = stream::iter(jobs)
        .map(|job| async move { job_to_record(job.as_ref()).await })
        .buffered(MAX_CONCURRENT_JOBS)
        .collect::<Vec<_>>()
        .boxed()
        .await;

    Ok(records)
}
