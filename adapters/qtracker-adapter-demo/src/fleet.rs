//! Demo service, jobs and backends.

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Utc};

use qtracker_hal::{
    BackendFilter, BackendHandle, BackendStatus, Counts, HalError, HalResult, JobHandle, JobQuery,
    JobUsage, QuantumService, ResultHandle, StatusValue, StepTimestamps,
};

/// A job held in memory. Every field is optional, as it is upstream.
#[derive(Debug, Clone, Default)]
pub struct DemoJob {
    pub id: Option<String>,
    pub backend: Option<String>,
    pub status: Option<StatusValue>,
    pub created: Option<DateTime<FixedOffset>>,
    pub steps: Option<StepTimestamps>,
    pub time_taken: Option<f64>,
    pub qpu_seconds: Option<f64>,
    pub error_message: Option<String>,
    pub counts: Option<Counts>,
}

impl DemoJob {
    /// A job with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn on(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    pub fn with_status(mut self, status: StatusValue) -> Self {
        self.status = Some(status);
        self
    }

    pub fn created_at(mut self, created: DateTime<FixedOffset>) -> Self {
        self.created = Some(created);
        self
    }

    /// Record a lifecycle step; `step` is stored uppercase.
    pub fn with_step(mut self, step: &str, at: DateTime<Utc>) -> Self {
        self.steps
            .get_or_insert_with(StepTimestamps::new)
            .insert(step.to_uppercase(), at);
        self
    }

    pub fn with_time_taken(mut self, seconds: f64) -> Self {
        self.time_taken = Some(seconds);
        self
    }

    pub fn with_qpu_seconds(mut self, seconds: f64) -> Self {
        self.qpu_seconds = Some(seconds);
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_counts(mut self, counts: Counts) -> Self {
        self.counts = Some(counts);
        self
    }
}

struct DemoResult(Counts);

impl ResultHandle for DemoResult {
    fn counts(&self) -> HalResult<Counts> {
        Ok(self.0.clone())
    }
}

#[async_trait]
impl JobHandle for DemoJob {
    async fn job_id(&self) -> HalResult<Option<String>> {
        Ok(self.id.clone())
    }

    async fn backend(&self) -> HalResult<Option<String>> {
        Ok(self.backend.clone())
    }

    async fn status(&self) -> HalResult<Option<StatusValue>> {
        Ok(self.status.clone())
    }

    async fn creation_date(&self) -> HalResult<Option<DateTime<FixedOffset>>> {
        Ok(self.created)
    }

    async fn time_per_step(&self) -> HalResult<Option<StepTimestamps>> {
        Ok(self.steps.clone())
    }

    async fn time_taken(&self) -> HalResult<Option<f64>> {
        Ok(self.time_taken)
    }

    async fn usage(&self) -> HalResult<Option<JobUsage>> {
        Ok(Some(JobUsage {
            qpu_seconds: self.qpu_seconds,
        }))
    }

    async fn error_message(&self) -> HalResult<Option<String>> {
        Ok(self.error_message.clone())
    }

    async fn result(&self) -> HalResult<Option<Box<dyn ResultHandle>>> {
        Ok(self
            .counts
            .clone()
            .map(|c| Box::new(DemoResult(c)) as Box<dyn ResultHandle>))
    }
}

/// A backend held in memory.
///
/// `status` is what [`BackendHandle::status`] returns; an `Err` models a
/// backend whose status endpoint cannot be reached.
#[derive(Debug, Clone)]
pub struct DemoBackend {
    pub name: String,
    pub num_qubits: u32,
    pub simulator: bool,
    pub error_rate: Option<f64>,
    pub status: Result<BackendStatus, String>,
}

impl DemoBackend {
    /// An operational device with an empty queue.
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            simulator: false,
            error_rate: None,
            status: Ok(BackendStatus::online(0)),
        }
    }

    pub fn simulator(mut self) -> Self {
        self.simulator = true;
        self
    }

    pub fn with_queue(mut self, pending_jobs: u32) -> Self {
        self.status = Ok(BackendStatus::online(pending_jobs));
        self
    }

    pub fn with_error_rate(mut self, error_rate: f64) -> Self {
        self.error_rate = Some(error_rate);
        self
    }

    /// Mark the device as down for `reason`.
    pub fn offline(mut self, reason: impl Into<String>) -> Self {
        self.status = Ok(BackendStatus::offline(reason));
        self
    }

    /// Make every status call fail with `reason`.
    pub fn unreachable(mut self, reason: impl Into<String>) -> Self {
        self.status = Err(reason.into());
        self
    }
}

#[async_trait]
impl BackendHandle for DemoBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_simulator(&self) -> bool {
        self.simulator
    }

    fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    fn error_rate(&self) -> Option<f64> {
        self.error_rate
    }

    async fn status(&self) -> HalResult<BackendStatus> {
        self.status
            .clone()
            .map_err(|reason| HalError::ServiceUnavailable(format!("{}: {reason}", self.name)))
    }
}

/// In-memory quantum service.
#[derive(Debug, Clone, Default)]
pub struct DemoService {
    jobs: Vec<DemoJob>,
    backends: Vec<DemoBackend>,
}

impl DemoService {
    /// The standard demo fleet, with job timestamps relative to `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_fleet(demo_jobs(now), demo_backends())
    }

    /// A service over an explicit fleet.
    pub fn with_fleet(jobs: Vec<DemoJob>, backends: Vec<DemoBackend>) -> Self {
        Self { jobs, backends }
    }
}

#[async_trait]
impl QuantumService for DemoService {
    fn channel(&self) -> &str {
        "demo"
    }

    async fn jobs(&self, query: JobQuery) -> HalResult<Vec<Box<dyn JobHandle>>> {
        let mut jobs = self.jobs.clone();
        // Jobs without a creation date sort last in either direction.
        jobs.sort_by(|a, b| match (a.created, b.created) {
            (Some(a), Some(b)) if query.descending => b.cmp(&a),
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        jobs.truncate(query.limit);

        tracing::debug!(count = jobs.len(), "listed demo jobs");
        Ok(jobs
            .into_iter()
            .map(|j| Box::new(j) as Box<dyn JobHandle>)
            .collect())
    }

    async fn backends(&self, filter: BackendFilter) -> HalResult<Vec<Box<dyn BackendHandle>>> {
        Ok(self
            .backends
            .iter()
            .filter(|b| filter.accepts(b.num_qubits))
            .cloned()
            .map(|b| Box::new(b) as Box<dyn BackendHandle>)
            .collect())
    }
}

fn demo_backends() -> Vec<DemoBackend> {
    vec![
        DemoBackend::new("ibm_brisbane", 127)
            .with_queue(6)
            .with_error_rate(0.012),
        DemoBackend::new("ibm_kyoto", 127)
            .with_queue(3)
            .with_error_rate(0.015),
        DemoBackend::new("ibm_osaka", 127)
            .with_queue(8)
            .with_error_rate(0.011),
        DemoBackend::new("ibmq_kolkata", 27)
            .offline("maintenance")
            .with_error_rate(0.025),
        DemoBackend::new("ibmq_mumbai", 27)
            .with_queue(2)
            .with_error_rate(0.021),
        DemoBackend::new("ibmq_auckland", 27).with_error_rate(0.033),
        DemoBackend::new("ibmq_qasm_simulator", 32).simulator(),
    ]
}

fn demo_jobs(now: DateTime<Utc>) -> Vec<DemoJob> {
    let at = |minutes_ago: i64| now - Duration::minutes(minutes_ago);

    vec![
        // Long queue, then a short run.
        DemoJob::new("cdemo_long_queue")
            .on("ibm_brisbane")
            .with_status(StatusValue::named("DONE"))
            .created_at(at(120).fixed_offset())
            .with_step("created", at(120))
            .with_step("running", at(5))
            .with_step("completed", at(3))
            .with_step("finished", at(3))
            .with_time_taken(120.0)
            .with_qpu_seconds(18.5)
            .with_counts([("000", 512), ("111", 488)].into_iter().collect()),
        DemoJob::new("cdemo_bell")
            .on("ibm_osaka")
            .with_status(StatusValue::text("Completed"))
            .created_at(at(45).fixed_offset())
            .with_step("running", at(40))
            .with_step("completed", at(39))
            .with_step("finished", at(39))
            .with_time_taken(62.5)
            .with_qpu_seconds(4.2)
            .with_counts([("00", 2011), ("11", 2085)].into_iter().collect()),
        DemoJob::new("cdemo_running")
            .on("ibm_kyoto")
            .with_status(StatusValue::text("Running"))
            .created_at(at(30).fixed_offset())
            .with_step("running", at(10)),
        DemoJob::new("cdemo_queued")
            .on("ibm_osaka")
            .with_status(StatusValue::text("Queued"))
            .created_at(at(4).fixed_offset()),
        DemoJob::new("cdemo_failed")
            .on("ibmq_mumbai")
            .with_status(StatusValue::text("Failed"))
            .created_at(at(70).fixed_offset())
            .with_step("running", at(60))
            .with_step("finished", at(58))
            .with_time_taken(95.0)
            .with_error("Qubit calibration failed."),
        DemoJob::new("cdemo_cancelled")
            .on("ibm_brisbane")
            .with_status(StatusValue::named("CANCELED"))
            .created_at(at(200).fixed_offset())
            .with_step("finished", at(190)),
    ]
}
