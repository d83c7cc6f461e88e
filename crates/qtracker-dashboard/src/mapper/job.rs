//! Job record assembly.

use chrono::{DateTime, Utc};
use qtracker_hal::{JobHandle, StepTimestamps};

use super::accessor::{safe_call, safe_call_opt};
use super::status::normalize_status;
use crate::dto::{CanonicalStatus, JobRecord, JobResults, StatusTransition};

/// Backend label when the job does not name one.
pub const UNKNOWN_BACKEND: &str = "Unknown";

/// User label on every record; no identity source is wired up.
pub const PLACEHOLDER_USER: &str = "Alice";

/// Build the record for one job. Never fails: every field falls back to a
/// default when the upstream read fails.
pub async fn job_to_record(job: &dyn JobHandle) -> JobRecord {
    let backend = safe_call_opt(job.backend())
        .await
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_BACKEND.to_string());

    let status = match job.status().await {
        Ok(status) => normalize_status(status.as_ref()),
        Err(e) => {
            tracing::warn!(error = %e, "Could not read job status");
            CanonicalStatus::Error
        }
    };

    let submitted = safe_call_opt(job.creation_date())
        .await
        .map(|created| created.with_timezone(&Utc));
    let steps = safe_call(job.time_per_step(), StepTimestamps::new()).await;
    let status_history = status_history(status, submitted, &steps);

    let elapsed_time = safe_call(job.time_taken(), 0.0).await;
    let qpu_seconds = safe_call_opt(job.usage())
        .await
        .and_then(|usage| usage.qpu_seconds)
        .unwrap_or(0.0);

    let error_message = safe_call_opt(job.error_message())
        .await
        .filter(|message| !message.is_empty());
    let logs = match (&error_message, status) {
        (None, CanonicalStatus::Completed) => "Job executed successfully.".to_string(),
        (Some(message), _) => format!("Error: {message}"),
        (None, status) => format!("Job status: {status}"),
    };

    let results = match safe_call_opt(job.result()).await {
        Some(result) => match result.counts() {
            Ok(counts) => JobResults::Counts(counts),
            Err(e) => {
                tracing::warn!(error = %e, "Could not extract counts");
                JobResults::unparsed()
            }
        },
        None => JobResults::default(),
    };

    JobRecord {
        id: safe_call_opt(job.job_id()).await,
        status,
        backend,
        submitted,
        elapsed_time,
        user: PLACEHOLDER_USER.to_string(),
        qpu_seconds,
        logs,
        results,
        status_history,
    }
}

/// Transitions in fixed order: submission, RUNNING step, COMPLETED step,
/// then the final status at FINISHED unless the job is still live.
fn status_history(
    status: CanonicalStatus,
    submitted: Option<DateTime<Utc>>,
    steps: &StepTimestamps,
) -> Vec<StatusTransition> {
    let mut history = Vec::with_capacity(4);

    if let Some(ts) = submitted {
        history.push(StatusTransition::new(CanonicalStatus::Queued, ts));
    }
    if let Some(&ts) = steps.get("RUNNING") {
        history.push(StatusTransition::new(CanonicalStatus::Running, ts));
    }
    if let Some(&ts) = steps.get("COMPLETED") {
        history.push(StatusTransition::new(CanonicalStatus::Completed, ts));
    }
    if let Some(&ts) = steps.get("FINISHED").filter(|_| !status.is_live()) {
        history.push(StatusTransition::new(status, ts));
    }

    history
}
