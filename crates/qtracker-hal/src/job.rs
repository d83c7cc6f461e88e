//! Job handle types.
//!
//! A [`JobHandle`] is the view of one upstream job. Every accessor is
//! fallible and every field is optional: upstream providers report jobs in
//! inconsistent shapes, and a caller must be able to read whatever subset is
//! present without one missing field aborting the rest.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HalResult;

/// A status value as reported upstream, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatusValue {
    /// An enumeration member reported by name (e.g. `JobStatus.DONE`).
    Named {
        /// Member name.
        name: String,
    },
    /// A plain status string (e.g. `"Completed"`).
    Text(String),
    /// Anything else the provider sent.
    Other(serde_json::Value),
}

impl StatusValue {
    /// Create a status value from an enumeration member name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named { name: name.into() }
    }

    /// Create a status value from a plain string.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Whether the value carries no information at all.
    ///
    /// Empty strings, `null`, `false`, zero, and empty collections count as
    /// empty. An enumeration member is never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Named { .. } => false,
            Self::Text(text) => text.is_empty(),
            Self::Other(value) => match value {
                serde_json::Value::Null => true,
                serde_json::Value::Bool(b) => !b,
                serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
                serde_json::Value::String(s) => s.is_empty(),
                serde_json::Value::Array(a) => a.is_empty(),
                serde_json::Value::Object(o) => o.is_empty(),
            },
        }
    }
}

impl From<&str> for StatusValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for StatusValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Per-step timestamps of a job, keyed by uppercase step name
/// (`"CREATED"`, `"RUNNING"`, `"COMPLETED"`, `"FINISHED"`, ...).
pub type StepTimestamps = BTreeMap<String, DateTime<Utc>>;

/// Device usage reported for a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobUsage {
    /// Seconds of quantum device time consumed.
    pub qpu_seconds: Option<f64>,
}

/// Measurement counts (bitstring -> count).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts(BTreeMap<String, u64>);

impl Counts {
    /// Create an empty set of counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.0.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Count for a bitstring, if observed.
    pub fn get(&self, bitstring: &str) -> Option<u64> {
        self.0.get(bitstring).copied()
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no outcome was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of shots across all outcomes.
    pub fn total_shots(&self) -> u64 {
        self.0.values().sum()
    }

    /// Iterate over `(bitstring, count)` pairs in bitstring order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.0.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (bitstring, count) in iter {
            counts.insert(bitstring, count);
        }
        counts
    }
}

impl IntoIterator for Counts {
    type Item = (String, u64);
    type IntoIter = std::collections::btree_map::IntoIter<String, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The result object of a finished job.
pub trait ResultHandle: Send + Sync {
    /// Extract measurement counts from the result payload.
    fn counts(&self) -> HalResult<Counts>;
}

/// View of one upstream job.
///
/// Implementations are produced by a provider's translation layer right
/// after the listing call. Accessors that need further I/O (metrics,
/// results) may fetch lazily.
#[async_trait]
pub trait JobHandle: Send + Sync {
    /// Upstream job identifier.
    async fn job_id(&self) -> HalResult<Option<String>>;

    /// Name of the backend the job ran (or is queued) on.
    async fn backend(&self) -> HalResult<Option<String>>;

    /// Raw upstream status.
    async fn status(&self) -> HalResult<Option<StatusValue>>;

    /// Creation time, in whatever offset the provider reports.
    async fn creation_date(&self) -> HalResult<Option<DateTime<FixedOffset>>>;

    /// Timestamps of the individual lifecycle steps.
    async fn time_per_step(&self) -> HalResult<Option<StepTimestamps>>;

    /// Wall-clock seconds the job took.
    async fn time_taken(&self) -> HalResult<Option<f64>>;

    /// Device usage sub-object.
    async fn usage(&self) -> HalResult<Option<JobUsage>>;

    /// Failure reason, if the provider reports one.
    async fn error_message(&self) -> HalResult<Option<String>>;

    /// Result object, if the job has one.
    async fn result(&self) -> HalResult<Option<Box<dyn ResultHandle>>>;
}
