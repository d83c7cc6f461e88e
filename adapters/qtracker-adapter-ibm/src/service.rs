//! IBM Quantum implementation of the tracker's service traits.
//!
//! This is the translation layer: REST payloads from [`crate::api`] are
//! wrapped into [`JobHandle`] / [`BackendHandle`] values right after the
//! listing call, so nothing past this module sees IBM's JSON shapes.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use tokio::sync::OnceCell;

use qtracker_hal::{
    BackendFilter, BackendHandle, BackendStatus, Counts, HalError, HalResult, JobHandle, JobQuery,
    JobUsage, QuantumService, ResultHandle, StatusValue, StepTimestamps,
};

use crate::api::{
    BackendConfigResponse, BackendListing, IbmClient, JobEntry, JobMetricsResponse,
    JobResultResponse, LEGACY_ENDPOINT, LegacyBackendInfo,
};
use crate::counts::results_to_counts;
use crate::error::{IbmError, IbmResult};

/// How the service authenticates and which API it talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IbmChannel {
    /// IBM Cloud: API key exchanged at IAM, instance is a service CRN.
    Cloud,
    /// Legacy IBM Quantum: direct bearer token, instance is hub/group/project.
    Legacy,
}

impl IbmChannel {
    /// The channel identifier as used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            IbmChannel::Cloud => "ibm_cloud",
            IbmChannel::Legacy => "ibm_quantum",
        }
    }
}

impl FromStr for IbmChannel {
    type Err = IbmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ibm_cloud" => Ok(IbmChannel::Cloud),
            "ibm_quantum" => Ok(IbmChannel::Legacy),
            other => Err(IbmError::UnknownChannel(other.to_string())),
        }
    }
}

/// A connected IBM Quantum service.
#[derive(Debug)]
pub struct IbmService {
    client: Arc<IbmClient>,
    channel: IbmChannel,
}

impl IbmService {
    /// Connect to IBM Quantum through `channel`.
    ///
    /// On the Cloud channel this performs the IAM key exchange, so bad
    /// credentials fail here rather than on the first request.
    pub async fn connect(channel: IbmChannel, token: &str, instance: &str) -> IbmResult<Self> {
        let client = match channel {
            IbmChannel::Cloud => IbmClient::connect(token, instance).await?,
            IbmChannel::Legacy => IbmClient::new(LEGACY_ENDPOINT, token)?.with_instance(instance),
        };

        Ok(Self::from_client(client, channel))
    }

    /// Wrap an already configured client.
    pub fn from_client(client: IbmClient, channel: IbmChannel) -> Self {
        Self {
            client: Arc::new(client),
            channel,
        }
    }
}

#[async_trait]
impl QuantumService for IbmService {
    fn channel(&self) -> &str {
        self.channel.as_str()
    }

    async fn jobs(&self, query: JobQuery) -> HalResult<Vec<Box<dyn JobHandle>>> {
        let entries = self.client.list_jobs(query).await?;
        tracing::debug!(count = entries.len(), "listed IBM jobs");

        Ok(entries
            .into_iter()
            .map(|entry| Box::new(IbmJob::new(self.client.clone(), entry)) as Box<dyn JobHandle>)
            .collect())
    }

    async fn backends(&self, filter: BackendFilter) -> HalResult<Vec<Box<dyn BackendHandle>>> {
        let mut out: Vec<Box<dyn BackendHandle>> = Vec::new();

        match self.client.list_backends().await? {
            BackendListing::Names(names) => {
                for name in names {
                    match self.client.get_backend_configuration(&name).await {
                        Ok(config) if filter.accepts(config.n_qubits) => {
                            out.push(Box::new(IbmBackend::from_config(
                                self.client.clone(),
                                config,
                            )));
                        }
                        Ok(_) => {}
                        Err(e) => tracing::warn!("skipping backend {name}: {e}"),
                    }
                }
            }
            BackendListing::Records(records) => {
                out.extend(
                    records
                        .into_iter()
                        .filter(|info| filter.accepts(info.num_qubits))
                        .map(|info| {
                            Box::new(IbmBackend::from_legacy(self.client.clone(), info))
                                as Box<dyn BackendHandle>
                        }),
                );
            }
        }

        Ok(out)
    }
}

// ============================================================================
// Jobs
// ============================================================================

/// One IBM job. Metrics are fetched on first use and shared by the
/// accessors that need them.
struct IbmJob {
    client: Arc<IbmClient>,
    entry: JobEntry,
    metrics: OnceCell<Result<JobMetricsResponse, String>>,
}

impl IbmJob {
    fn new(client: Arc<IbmClient>, entry: JobEntry) -> Self {
        Self {
            client,
            entry,
            metrics: OnceCell::new(),
        }
    }

    fn id(&self) -> HalResult<&str> {
        self.entry
            .id
            .as_deref()
            .ok_or_else(|| HalError::FieldUnavailable("job id".to_string()))
    }

    async fn metrics(&self) -> HalResult<&JobMetricsResponse> {
        let id = self.id()?;
        self.metrics
            .get_or_init(|| async {
                self.client
                    .get_job_metrics(id)
                    .await
                    .map_err(|e| e.to_string())
            })
            .await
            .as_ref()
            .map_err(|msg| HalError::Upstream(msg.clone()))
    }
}

fn parse_timestamp(raw: &str) -> HalResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .map_err(|e| HalError::Decode(format!("invalid timestamp {raw:?}: {e}")))
}

#[async_trait]
impl JobHandle for IbmJob {
    async fn job_id(&self) -> HalResult<Option<String>> {
        Ok(self.entry.id.clone())
    }

    async fn backend(&self) -> HalResult<Option<String>> {
        Ok(self.entry.backend.clone())
    }

    async fn status(&self) -> HalResult<Option<StatusValue>> {
        Ok(self.entry.status_text().map(StatusValue::text))
    }

    async fn creation_date(&self) -> HalResult<Option<DateTime<FixedOffset>>> {
        self.entry
            .created
            .as_deref()
            .map(parse_timestamp)
            .transpose()
    }

    async fn time_per_step(&self) -> HalResult<Option<StepTimestamps>> {
        let metrics = self.metrics().await?;
        let steps: StepTimestamps = metrics
            .timestamps
            .iter()
            .filter_map(|(step, raw)| {
                let ts = parse_timestamp(raw.as_deref()?).ok()?;
                Some((step.to_uppercase(), ts.with_timezone(&Utc)))
            })
            .collect();
        Ok(Some(steps))
    }

    async fn time_taken(&self) -> HalResult<Option<f64>> {
        let metrics = self.metrics().await?;
        Ok(metrics.bss.as_ref().and_then(|b| b.seconds))
    }

    async fn usage(&self) -> HalResult<Option<JobUsage>> {
        let metrics = self.metrics().await?;
        Ok(metrics.usage.as_ref().map(|u| JobUsage {
            qpu_seconds: u.quantum_seconds,
        }))
    }

    async fn error_message(&self) -> HalResult<Option<String>> {
        Ok(self.entry.error_message())
    }

    async fn result(&self) -> HalResult<Option<Box<dyn ResultHandle>>> {
        if !self.entry.is_completed() {
            return Ok(None);
        }
        let results = self.client.get_job_results(self.id()?).await?;
        Ok(Some(Box::new(IbmJobResult(results))))
    }
}

/// Result payload of a completed IBM job.
struct IbmJobResult(JobResultResponse);

impl ResultHandle for IbmJobResult {
    fn counts(&self) -> HalResult<Counts> {
        Ok(results_to_counts(&self.0)?)
    }
}

// ============================================================================
// Backends
// ============================================================================

/// One IBM backend. On the legacy API the status arrives with the listing;
/// on the Cloud API it is fetched per call.
struct IbmBackend {
    client: Arc<IbmClient>,
    name: String,
    num_qubits: u32,
    simulator: bool,
    listed_status: Option<BackendStatus>,
}

impl IbmBackend {
    fn from_config(client: Arc<IbmClient>, config: BackendConfigResponse) -> Self {
        Self {
            client,
            name: config.backend_name,
            num_qubits: config.n_qubits,
            simulator: config.simulator.unwrap_or(false),
            listed_status: None,
        }
    }

    fn from_legacy(client: Arc<IbmClient>, info: LegacyBackendInfo) -> Self {
        Self {
            client,
            listed_status: Some(BackendStatus {
                operational: info.status.operational,
                pending_jobs: info.status.pending_jobs.unwrap_or(0),
                status_msg: info.status.status_msg,
            }),
            name: info.name,
            num_qubits: info.num_qubits,
            simulator: info.simulator,
        }
    }
}

#[async_trait]
impl BackendHandle for IbmBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_simulator(&self) -> bool {
        self.simulator
    }

    fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    async fn status(&self) -> HalResult<BackendStatus> {
        if let Some(status) = &self.listed_status {
            return Ok(status.clone());
        }

        let s = self.client.get_backend_status(&self.name).await?;
        Ok(BackendStatus {
            operational: s.state,
            pending_jobs: u32::try_from(s.length_queue).unwrap_or(u32::MAX),
            status_msg: (!s.message.is_empty()).then_some(s.message),
        })
    }
}
