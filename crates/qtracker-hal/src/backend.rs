//! Backend handle types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HalResult;

/// Live status of a compute backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStatus {
    /// Whether the backend accepts work.
    pub operational: bool,
    /// Number of jobs waiting in the backend queue.
    pub pending_jobs: u32,
    /// Free-form status message.
    #[serde(default)]
    pub status_msg: Option<String>,
}

impl BackendStatus {
    /// An operational backend with the given queue depth.
    pub fn online(pending_jobs: u32) -> Self {
        Self {
            operational: true,
            pending_jobs,
            status_msg: None,
        }
    }

    /// A backend that is down for the given reason.
    pub fn offline(reason: impl Into<String>) -> Self {
        Self {
            operational: false,
            pending_jobs: 0,
            status_msg: Some(reason.into()),
        }
    }
}

/// View of one upstream compute backend.
///
/// Static properties come from the listing call and are infallible. The
/// live status needs its own round trip and can fail per backend.
#[async_trait]
pub trait BackendHandle: Send + Sync {
    /// Backend name (e.g. `"ibm_torino"`).
    fn name(&self) -> &str;

    /// Whether this is a simulator rather than a physical device.
    fn is_simulator(&self) -> bool;

    /// Number of qubits.
    fn num_qubits(&self) -> u32;

    /// Error-rate estimate, when the provider exposes one.
    fn error_rate(&self) -> Option<f64> {
        None
    }

    /// Fetch the current operational status and queue depth.
    async fn status(&self) -> HalResult<BackendStatus>;
}
