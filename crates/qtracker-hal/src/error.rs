//! Error types for the HAL crate.

use thiserror::Error;

/// Errors that can occur while talking to an upstream quantum service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// The upstream service cannot be reached or refused the request.
    #[error("Service not available: {0}")]
    ServiceUnavailable(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The upstream object does not expose the requested field.
    #[error("Field not available: {0}")]
    FieldUnavailable(String),

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Upstream payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic upstream error.
    #[error("Upstream error: {0}")]
    Upstream(String),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
