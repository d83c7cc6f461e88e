//! Error types for the dashboard API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use qtracker_hal::HalError;

/// Message returned while no upstream connection exists.
pub const SERVICE_UNAVAILABLE: &str = "IBM Quantum service is not available.";

/// API error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Startup could not connect to the upstream service.
    #[error("IBM Quantum service is not available.")]
    ServiceUnavailable,

    /// The upstream listing call failed.
    #[error("{0}")]
    Upstream(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "detail": SERVICE_UNAVAILABLE })),
            )
                .into_response(),
            ApiError::Upstream(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": { "error": message } })),
            )
                .into_response(),
        }
    }
}

impl From<HalError> for ApiError {
    fn from(e: HalError) -> Self {
        ApiError::Upstream(e.to_string())
    }
}
