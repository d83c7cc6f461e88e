//! Backend listing endpoint.

use std::sync::Arc;

use axum::{Json, extract::State};
use qtracker_hal::BackendFilter;

use crate::dto::BackendRecord;
use crate::error::ApiError;
use crate::mapper::backends_to_records;
use crate::state::AppState;

/// GET /api/backends - Physical devices with at least five qubits.
pub async fn list_backends(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BackendRecord>>, ApiError> {
    let service = state.service()?;

    let backends = service
        .backends(BackendFilter::default())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Error listing backends");
            ApiError::from(e)
        })?;

    Ok(Json(backends_to_records(&backends).await))
}
