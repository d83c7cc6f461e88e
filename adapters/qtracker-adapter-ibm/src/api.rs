//! IBM Quantum Platform API client.
//!
//! This module implements the read side of the IBM Quantum REST API:
//! - Authentication via IAM token exchange (API key flow)
//! - Listing jobs, and fetching per-job metrics and results
//! - Listing backends, their configuration and their live status
//!
//! Supports both the IBM Cloud API (`quantum.cloud.ibm.com/api`) and the
//! legacy endpoint (`api.quantum-computing.ibm.com`).

// Response structs mirror the API contract; not every field is read yet.
#![allow(dead_code)]

use reqwest::{Client, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;

use qtracker_hal::JobQuery;

use crate::error::{IbmError, IbmResult};

/// Default IBM Quantum Cloud API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://quantum.cloud.ibm.com/api";

/// Legacy IBM Quantum API endpoint.
pub const LEGACY_ENDPOINT: &str = "https://api.quantum-computing.ibm.com";

/// IBM Cloud IAM token endpoint.
const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";

/// IBM API version header value.
const IBM_API_VERSION: &str = "2026-02-01";

/// User-Agent sent with requests (Cloudflare blocks the default reqwest UA).
const USER_AGENT: &str = concat!("qtracker/", env!("CARGO_PKG_VERSION"));

/// IBM Quantum API client.
pub struct IbmClient {
    /// HTTP client.
    client: Client,
    /// API endpoint URL.
    endpoint: String,
    /// Bearer token (either from IAM exchange or direct).
    token: String,
    /// Selected instance (hub/group/project), legacy mode only.
    instance: Option<String>,
    /// Whether using the Cloud API (vs legacy).
    cloud_api: bool,
}

impl fmt::Debug for IbmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .field("instance", &self.instance)
            .field("cloud_api", &self.cloud_api)
            .finish()
    }
}

/// IAM token response from `iam.cloud.ibm.com`.
#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

fn default_headers(bearer: &str) -> IbmResult<header::HeaderMap> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {bearer}"))
            .map_err(|_| IbmError::InvalidToken)?,
    );
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );
    Ok(headers)
}

fn build_client(headers: header::HeaderMap) -> IbmResult<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(std::time::Duration::from_secs(60))
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()?)
}

impl IbmClient {
    /// Create a client using the legacy direct-token mode.
    ///
    /// This does not touch the network. For the IBM Cloud API, use
    /// [`IbmClient::connect`] instead.
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> IbmResult<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(IbmError::MissingToken);
        }

        let client = build_client(default_headers(&token)?)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token,
            instance: None,
            cloud_api: false,
        })
    }

    /// Create a client using the IBM Cloud API key flow.
    ///
    /// Exchanges the API key for an IAM bearer token and configures the
    /// Service-CRN header required by `quantum.cloud.ibm.com/api`.
    pub async fn connect(api_key: &str, service_crn: &str) -> IbmResult<Self> {
        Self::connect_with_endpoints(api_key, service_crn, IAM_TOKEN_URL, DEFAULT_ENDPOINT).await
    }

    /// Same as [`IbmClient::connect`] against explicit IAM and API endpoints.
    pub async fn connect_with_endpoints(
        api_key: &str,
        service_crn: &str,
        iam_url: &str,
        endpoint: &str,
    ) -> IbmResult<Self> {
        if api_key.is_empty() {
            return Err(IbmError::MissingToken);
        }
        if service_crn.is_empty() {
            return Err(IbmError::MissingServiceCrn);
        }

        let iam_client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;

        let iam_response = iam_client
            .post(iam_url)
            .form(&[
                ("grant_type", "urn:ibm:params:oauth:grant-type:apikey"),
                ("apikey", api_key),
            ])
            .send()
            .await
            .map_err(|e| IbmError::IamTokenExchange(e.to_string()))?;

        if !iam_response.status().is_success() {
            let status = iam_response.status();
            let body = iam_response
                .text()
                .await
                .unwrap_or_else(|_| "no body".to_string());
            return Err(IbmError::IamTokenExchange(format!(
                "IAM returned {status}: {body}"
            )));
        }

        let iam_token: IamTokenResponse = iam_response.json().await.map_err(|e| {
            IbmError::IamTokenExchange(format!("failed to parse IAM response: {e}"))
        })?;

        let bearer_token = iam_token.access_token;

        let mut headers = default_headers(&bearer_token)?;
        // Service-CRN header, required on every request to the Cloud API
        headers.insert(
            header::HeaderName::from_static("service-crn"),
            header::HeaderValue::from_str(service_crn)
                .map_err(|_| IbmError::InvalidParameter("invalid Service-CRN value".into()))?,
        );
        headers.insert(
            header::HeaderName::from_static("ibm-api-version"),
            header::HeaderValue::from_static(IBM_API_VERSION),
        );

        Ok(Self {
            client: build_client(headers)?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: bearer_token,
            instance: None,
            cloud_api: true,
        })
    }

    /// Set the instance (hub/group/project) used to scope listings (legacy mode).
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        let instance = instance.into();
        self.instance = (!instance.is_empty()).then_some(instance);
        self
    }

    /// Whether this client uses the Cloud API.
    pub fn is_cloud_api(&self) -> bool {
        self.cloud_api
    }

    /// The configured API endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// GET `url` and decode the JSON body, mapping error statuses.
    ///
    /// A 404 is reported through `not_found` so callers can name the missing
    /// resource.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        not_found: impl FnOnce() -> IbmError,
    ) -> IbmResult<T> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(not_found());
            }
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "no body".to_string());
            return Err(match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(error) if !error.message.is_empty() => IbmError::ApiError {
                    code: error.code,
                    message: error.message,
                },
                _ => IbmError::ApiError {
                    code: Some(status.as_u16().to_string()),
                    message: format!("{url} returned {status}: {body}"),
                },
            });
        }

        response.json().await.map_err(IbmError::from)
    }

    /// List jobs, newest first when `query.descending` is set.
    pub async fn list_jobs(&self, query: JobQuery) -> IbmResult<Vec<JobEntry>> {
        let url = format!("{}/v1/jobs", self.endpoint);
        let sort = if query.descending { "DESC" } else { "ASC" };

        let mut params = vec![
            ("limit", query.limit.to_string()),
            ("sort", sort.to_string()),
            ("exclude_params", "true".to_string()),
        ];
        if let Some(instance) = &self.instance {
            params.push(("provider", instance.clone()));
        }

        let jobs: JobsResponse = self
            .get_json(&url, &params, || IbmError::ApiError {
                code: Some("404".to_string()),
                message: format!("job listing not found at {url}"),
            })
            .await?;
        Ok(jobs.jobs)
    }

    /// Get timing and usage metrics for a job.
    pub async fn get_job_metrics(&self, job_id: &str) -> IbmResult<JobMetricsResponse> {
        let url = format!("{}/v1/jobs/{}/metrics", self.endpoint, job_id);
        self.get_json(&url, &[], || IbmError::JobNotFound(job_id.to_string()))
            .await
    }

    /// Get job results.
    pub async fn get_job_results(&self, job_id: &str) -> IbmResult<JobResultResponse> {
        let url = format!("{}/v1/jobs/{}/results", self.endpoint, job_id);
        self.get_json(&url, &[], || IbmError::JobNotFound(job_id.to_string()))
            .await
    }

    /// List backend names.
    ///
    /// The legacy API returns full backend records in one call; those are
    /// returned alongside so the caller can skip per-backend lookups.
    pub async fn list_backends(&self) -> IbmResult<BackendListing> {
        let url = format!("{}/v1/backends", self.endpoint);
        let not_found = || IbmError::BackendUnavailable("backend listing".to_string());

        if self.cloud_api {
            let devices: DevicesResponse = self.get_json(&url, &[], not_found).await?;
            Ok(BackendListing::Names(
                devices.devices.into_iter().map(|d| d.name).collect(),
            ))
        } else {
            let backends: LegacyBackendsResponse = self.get_json(&url, &[], not_found).await?;
            Ok(BackendListing::Records(backends.backends))
        }
    }

    /// Fetch a backend's static configuration (Cloud API).
    pub async fn get_backend_configuration(&self, name: &str) -> IbmResult<BackendConfigResponse> {
        let url = format!("{}/v1/backends/{}/configuration", self.endpoint, name);
        self.get_json(&url, &[], || IbmError::BackendUnavailable(name.to_string()))
            .await
    }

    /// Fetch a backend's live status (Cloud API).
    pub async fn get_backend_status(&self, name: &str) -> IbmResult<BackendStatusResponse> {
        let url = format!("{}/v1/backends/{}/status", self.endpoint, name);
        self.get_json(&url, &[], || IbmError::BackendUnavailable(name.to_string()))
            .await
    }
}

// ============================================================================
// Response types
// ============================================================================

/// API error response.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    /// Error code.
    #[serde(default)]
    code: Option<String>,
    /// Error message.
    #[serde(default)]
    message: String,
}

/// Job listing response (`{"jobs": [...], "count": n}`).
#[derive(Debug, Deserialize)]
struct JobsResponse {
    #[serde(default)]
    jobs: Vec<JobEntry>,
    #[serde(default)]
    count: Option<u64>,
}

/// One job as returned by the listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct JobEntry {
    /// Job ID.
    #[serde(default)]
    pub id: Option<String>,
    /// Backend name.
    #[serde(default)]
    pub backend: Option<String>,
    /// Top-level status (mixed case on the Cloud API).
    #[serde(default)]
    pub status: Option<String>,
    /// State object with reason (Cloud API).
    #[serde(default)]
    pub state: Option<JobState>,
    /// Creation time (RFC 3339).
    #[serde(default)]
    pub created: Option<String>,
    /// Error information (legacy API).
    #[serde(default)]
    pub error: Option<JobError>,
    /// Owning user.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Job state with reason (Cloud API).
#[derive(Debug, Clone, Deserialize)]
pub struct JobState {
    /// Status string.
    #[serde(default)]
    pub status: String,
    /// Reason for failure.
    #[serde(default)]
    pub reason: Option<String>,
    /// Reason code.
    #[serde(default)]
    pub reason_code: Option<u32>,
}

/// Job error information (legacy API).
#[derive(Debug, Clone, Deserialize)]
pub struct JobError {
    /// Error code.
    #[serde(default)]
    pub code: Option<String>,
    /// Error message.
    pub message: String,
}

impl JobEntry {
    /// The most specific status string the entry carries.
    pub fn status_text(&self) -> Option<&str> {
        self.state
            .as_ref()
            .map(|s| s.status.as_str())
            .filter(|s| !s.is_empty())
            .or(self.status.as_deref())
    }

    /// Whether the job finished successfully.
    pub fn is_completed(&self) -> bool {
        self.status_text()
            .is_some_and(|s| s.eq_ignore_ascii_case("COMPLETED") || s.eq_ignore_ascii_case("DONE"))
    }

    /// Whether the job failed.
    pub fn is_failed(&self) -> bool {
        self.status_text()
            .is_some_and(|s| s.eq_ignore_ascii_case("FAILED") || s.eq_ignore_ascii_case("ERROR"))
    }

    /// The failure reason, reported only for failed jobs.
    pub fn error_message(&self) -> Option<String> {
        if !self.is_failed() {
            return None;
        }
        // Cloud API state.reason first, then legacy error.message
        if let Some(reason) = self.state.as_ref().and_then(|s| s.reason.clone()) {
            return Some(reason);
        }
        self.error.as_ref().map(|e| e.message.clone())
    }
}

/// Job metrics response from `/jobs/{id}/metrics`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobMetricsResponse {
    /// Lifecycle timestamps keyed by step (`created`, `running`, `finished`, ...).
    #[serde(default)]
    pub timestamps: HashMap<String, Option<String>>,
    /// Billing/system seconds.
    #[serde(default)]
    pub bss: Option<BssMetrics>,
    /// Device usage.
    #[serde(default)]
    pub usage: Option<UsageMetrics>,
}

/// Billed system seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct BssMetrics {
    /// Total seconds.
    #[serde(default)]
    pub seconds: Option<f64>,
}

/// Device usage metrics.
#[derive(Debug, Clone, Deserialize)]
pub struct UsageMetrics {
    /// Quantum device seconds.
    #[serde(default)]
    pub quantum_seconds: Option<f64>,
    /// Total seconds.
    #[serde(default)]
    pub seconds: Option<f64>,
}

/// Cloud API device list response (`{"devices": [...]}`).
#[derive(Debug, Deserialize)]
struct DevicesResponse {
    devices: Vec<DeviceEntry>,
}

/// A device entry in the Cloud API listing.
#[derive(Debug, Deserialize)]
struct DeviceEntry {
    /// Device name (e.g. "ibm_torino").
    name: String,
}

/// Legacy API backend list response (`{"backends": [...]}`).
#[derive(Debug, Deserialize)]
struct LegacyBackendsResponse {
    backends: Vec<LegacyBackendInfo>,
}

/// Result of [`IbmClient::list_backends`].
#[derive(Debug)]
pub enum BackendListing {
    /// Cloud API: names only, configuration fetched per backend.
    Names(Vec<String>),
    /// Legacy API: complete records.
    Records(Vec<LegacyBackendInfo>),
}

/// Backend configuration from `/backends/{name}/configuration`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfigResponse {
    /// Backend name.
    pub backend_name: String,
    /// Number of qubits.
    pub n_qubits: u32,
    /// Basis gates.
    #[serde(default)]
    pub basis_gates: Vec<String>,
    /// Whether this is a simulator.
    #[serde(default)]
    pub simulator: Option<bool>,
    /// Maximum number of shots.
    #[serde(default)]
    pub max_shots: Option<u32>,
}

/// Backend status from `/backends/{name}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendStatusResponse {
    /// Whether the backend is operational.
    pub state: bool,
    /// Status string (e.g., "active").
    #[serde(default)]
    pub status: String,
    /// Status message.
    #[serde(default)]
    pub message: String,
    /// Queue length.
    #[serde(default)]
    pub length_queue: u64,
}

/// Backend record from the legacy listing.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyBackendInfo {
    /// Backend name.
    pub name: String,
    /// Number of qubits.
    pub num_qubits: u32,
    /// Backend status.
    pub status: LegacyBackendStatus,
    /// Whether this is a simulator.
    #[serde(default)]
    pub simulator: bool,
}

/// Backend status embedded in the legacy listing.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyBackendStatus {
    /// Whether the backend is operational.
    pub operational: bool,
    /// Status message.
    #[serde(default)]
    pub status_msg: Option<String>,
    /// Number of pending jobs.
    #[serde(default)]
    pub pending_jobs: Option<u32>,
}

/// Job result response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobResultResponse {
    /// Job ID (absent in V2 results).
    #[serde(default)]
    pub id: Option<String>,
    /// Results from the sampler primitive, one per PUB.
    #[serde(default)]
    pub results: Vec<SamplerResult>,
}

/// Sampler result for one circuit.
#[derive(Debug, Clone, Deserialize)]
pub struct SamplerResult {
    /// V2 Sampler data: classical register name -> sample data.
    #[serde(default)]
    pub data: Option<HashMap<String, ClassicalRegisterData>>,
    /// Quasi-probability distribution (bitstring -> probability), V1 only.
    #[serde(default)]
    pub quasi_dists: Option<Vec<HashMap<String, f64>>>,
    /// Measurement counts (bitstring -> count), V1 only.
    #[serde(default)]
    pub counts: Option<HashMap<String, u64>>,
    /// Metadata.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Classical register data from V2 Sampler results.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassicalRegisterData {
    /// Raw measurement samples as hex strings (e.g., `["0x0", "0x2", ...]`).
    pub samples: Vec<String>,
    /// Register width, when reported.
    #[serde(default)]
    pub num_bits: Option<usize>,
}
