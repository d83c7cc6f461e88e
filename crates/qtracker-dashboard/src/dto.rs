//! Data transfer objects for the dashboard API.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use qtracker_hal::Counts;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

// ============================================================================
// Status
// ============================================================================

/// The six statuses every upstream status is normalized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CanonicalStatus {
    Queued,
    Running,
    Completed,
    Error,
    Cancelled,
    Unknown,
}

impl CanonicalStatus {
    pub const ALL: [CanonicalStatus; 6] = [
        CanonicalStatus::Queued,
        CanonicalStatus::Running,
        CanonicalStatus::Completed,
        CanonicalStatus::Error,
        CanonicalStatus::Cancelled,
        CanonicalStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalStatus::Queued => "QUEUED",
            CanonicalStatus::Running => "RUNNING",
            CanonicalStatus::Completed => "COMPLETED",
            CanonicalStatus::Error => "ERROR",
            CanonicalStatus::Cancelled => "CANCELLED",
            CanonicalStatus::Unknown => "UNKNOWN",
        }
    }

    /// Queued or running.
    pub fn is_live(&self) -> bool {
        matches!(self, CanonicalStatus::Queued | CanonicalStatus::Running)
    }
}

impl fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Job DTOs
// ============================================================================

/// One job as returned by `GET /api/jobs`.
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub id: Option<String>,
    pub status: CanonicalStatus,
    pub backend: String,
    #[serde(serialize_with = "serialize_opt_timestamp")]
    pub submitted: Option<DateTime<Utc>>,
    pub elapsed_time: f64,
    pub user: String,
    pub qpu_seconds: f64,
    pub logs: String,
    pub results: JobResults,
    pub status_history: Vec<StatusTransition>,
}

/// Measurement outcome of a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobResults {
    /// Bitstring to count; empty when the job has no result yet.
    Counts(Counts),
    /// A result exists but its counts could not be extracted.
    Unparsed { info: String },
}

impl JobResults {
    pub fn unparsed() -> Self {
        JobResults::Unparsed {
            info: "Could not parse results.".to_string(),
        }
    }
}

impl Default for JobResults {
    fn default() -> Self {
        JobResults::Counts(Counts::new())
    }
}

/// One entry of a job's status history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusTransition {
    pub status: CanonicalStatus,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl StatusTransition {
    pub fn new(status: CanonicalStatus, timestamp: DateTime<Utc>) -> Self {
        Self { status, timestamp }
    }
}

/// Query parameters for listing jobs.
#[derive(Debug, Clone, Deserialize)]
pub struct JobListParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(
        default = "default_descending",
        deserialize_with = "deserialize_lenient_bool"
    )]
    pub descending: bool,
}

impl Default for JobListParams {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            descending: default_descending(),
        }
    }
}

fn default_limit() -> usize {
    50
}

fn default_descending() -> bool {
    true
}

/// Accept the usual query-string spellings of a boolean, in any case:
/// `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`, `t`/`f`, `y`/`n`.
fn deserialize_lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(d)?;
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Ok(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Ok(false),
        _ => Err(de::Error::invalid_value(
            de::Unexpected::Str(&raw),
            &"a boolean such as true, false, 1, 0, yes or no",
        )),
    }
}

// ============================================================================
// Backend DTOs
// ============================================================================

/// Whether a device accepts jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendState {
    Active,
    Inactive,
}

impl From<bool> for BackendState {
    fn from(operational: bool) -> Self {
        if operational {
            BackendState::Active
        } else {
            BackendState::Inactive
        }
    }
}

/// One device as returned by `GET /api/backends`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendRecord {
    pub name: String,
    pub status: BackendState,
    pub qubit_count: u32,
    pub queue_depth: u32,
    pub error_rate: f64,
}

// ============================================================================
// Health & metrics
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "Quantum Tracker API is running".to_string(),
        }
    }
}

/// Aggregate KPIs over a job listing.
#[derive(Debug, Clone, Serialize)]
pub struct FleetMetrics {
    pub total_jobs: usize,
    /// Queued plus running.
    pub live_jobs: usize,
    /// Mean seconds from QUEUED to RUNNING.
    pub avg_wait_time: f64,
    /// Completed share of finished jobs, in percent.
    pub success_rate: f64,
    pub status_counts: FxHashMap<CanonicalStatus, usize>,
}

// ============================================================================
// Timestamp rendering
// ============================================================================

// RFC 3339 with an explicit "+00:00" offset. Fractions, when present,
// always carry six digits.
fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_timestamp(ts))
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    let precision = if ts.nanosecond() == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };
    ts.to_rfc3339_opts(precision, false)
}

fn serialize_opt_timestamp<S: Serializer>(
    ts: &Option<DateTime<Utc>>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match ts {
        Some(ts) => serialize_timestamp(ts, s),
        None => s.serialize_none(),
    }
}
