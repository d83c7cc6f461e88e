//! Error types for the IBM Quantum adapter.

use thiserror::Error;

/// Result type for IBM operations.
pub type IbmResult<T> = Result<T, IbmError>;

/// Errors that can occur when using IBM Quantum.
#[derive(Debug, Error)]
pub enum IbmError {
    /// Missing API token.
    #[error("IBM Quantum API token not found. Set QTRACKER_IBM_TOKEN.")]
    MissingToken,

    /// Invalid API token.
    #[error("Invalid IBM Quantum API token")]
    InvalidToken,

    /// IAM token exchange failed.
    #[error("IAM token exchange failed: {0}")]
    IamTokenExchange(String),

    /// Missing service CRN.
    #[error("A service CRN (QTRACKER_IBM_INSTANCE) is required on the ibm_cloud channel")]
    MissingServiceCrn,

    /// Unknown channel identifier.
    #[error("Unknown IBM channel: {0} (expected ibm_cloud or ibm_quantum)")]
    UnknownChannel(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error.
    #[error("IBM Quantum API error: {message}")]
    ApiError {
        /// Error code from API.
        code: Option<String>,
        /// Error message.
        message: String,
    },

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Backend not available.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Result payload carries nothing that decodes to counts.
    #[error("Cannot decode result: {0}")]
    ResultDecode(String),

    /// Invalid parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl From<IbmError> for qtracker_hal::HalError {
    fn from(e: IbmError) -> Self {
        match e {
            IbmError::MissingToken
            | IbmError::InvalidToken
            | IbmError::IamTokenExchange(_)
            | IbmError::MissingServiceCrn => {
                qtracker_hal::HalError::AuthenticationFailed(e.to_string())
            }
            IbmError::UnknownChannel(_) | IbmError::InvalidParameter(_) => {
                qtracker_hal::HalError::Configuration(e.to_string())
            }
            IbmError::HttpError(_) => qtracker_hal::HalError::ServiceUnavailable(e.to_string()),
            IbmError::JobNotFound(id) => qtracker_hal::HalError::JobNotFound(id),
            IbmError::ResultDecode(msg) => qtracker_hal::HalError::Decode(msg),
            _ => qtracker_hal::HalError::Upstream(e.to_string()),
        }
    }
}
