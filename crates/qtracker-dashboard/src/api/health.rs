//! Health check endpoint.

use axum::Json;

use crate::dto::HealthResponse;

/// GET / - Liveness, independent of the upstream connection.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}
