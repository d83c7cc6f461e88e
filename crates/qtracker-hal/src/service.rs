//! The upstream service trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::backend::BackendHandle;
use crate::error::HalResult;
use crate::job::JobHandle;

/// Parameters for listing jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobQuery {
    /// Maximum number of jobs to return.
    pub limit: usize,
    /// Newest first when `true`.
    pub descending: bool,
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            descending: true,
        }
    }
}

/// Parameters for listing backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendFilter {
    /// Only return backends with at least this many qubits.
    pub min_num_qubits: u32,
}

impl Default for BackendFilter {
    fn default() -> Self {
        Self { min_num_qubits: 5 }
    }
}

impl BackendFilter {
    /// Whether a backend with `num_qubits` passes the filter.
    pub fn accepts(&self, num_qubits: u32) -> bool {
        num_qubits >= self.min_num_qubits
    }
}

/// A connected upstream quantum service.
///
/// One instance is created at startup and shared read-only by every request.
#[async_trait]
pub trait QuantumService: Send + Sync {
    /// Channel identifier this service was connected through.
    fn channel(&self) -> &str;

    /// List jobs, bounded and ordered by creation time.
    async fn jobs(&self, query: JobQuery) -> HalResult<Vec<Box<dyn JobHandle>>>;

    /// List backends passing `filter`.
    async fn backends(&self, filter: BackendFilter) -> HalResult<Vec<Box<dyn BackendHandle>>>;
}
