//! Fleet KPIs over mapped job records.

use rustc_hash::FxHashMap;

use crate::dto::{CanonicalStatus, FleetMetrics, JobRecord};

/// Aggregate `records` into fleet KPIs.
pub fn fleet_metrics(records: &[JobRecord]) -> FleetMetrics {
    let mut status_counts: FxHashMap<CanonicalStatus, usize> = FxHashMap::default();
    for record in records {
        *status_counts.entry(record.status).or_insert(0) += 1;
    }
    let count = |status: CanonicalStatus| status_counts.get(&status).copied().unwrap_or(0);

    let live_jobs = count(CanonicalStatus::Queued) + count(CanonicalStatus::Running);

    let waits: Vec<f64> = records.iter().filter_map(wait_seconds).collect();
    let avg_wait_time = if waits.is_empty() {
        0.0
    } else {
        waits.iter().sum::<f64>() / waits.len() as f64
    };

    let completed = count(CanonicalStatus::Completed);
    let finished = completed + count(CanonicalStatus::Error);
    let success_rate = if finished == 0 {
        0.0
    } else {
        completed as f64 / finished as f64 * 100.0
    };

    FleetMetrics {
        total_jobs: records.len(),
        live_jobs,
        avg_wait_time,
        success_rate,
        status_counts,
    }
}

/// Seconds between the QUEUED and RUNNING history entries.
fn wait_seconds(record: &JobRecord) -> Option<f64> {
    let at = |status: CanonicalStatus| {
        record
            .status_history
            .iter()
            .find(|t| t.status == status)
            .map(|t| t.timestamp)
    };
    let queued = at(CanonicalStatus::Queued)?;
    let running = at(CanonicalStatus::Running)?;
    Some((running - queued).num_milliseconds() as f64 / 1000.0)
}
