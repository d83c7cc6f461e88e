//! Integration tests for the Quantum Tracker API.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use qtracker_adapter_demo::{DemoBackend, DemoJob, DemoService};
use qtracker_dashboard::api::jobs::MAX_CONCURRENT_JOBS;
use qtracker_dashboard::{AppState, DashboardConfig, create_router};
use qtracker_hal::{
    BackendFilter, BackendHandle, HalError, HalResult, JobHandle, JobQuery, JobUsage,
    QuantumService, ResultHandle, StatusValue, StepTimestamps,
};
use serde_json::{Value, json};

// ============================================================================
// Test helpers
// ============================================================================

fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
}

fn test_server(service: Option<Arc<dyn QuantumService>>) -> TestServer {
    let config = DashboardConfig::default();
    let state = match service {
        Some(service) => AppState::with_service(config, service),
        None => AppState::disconnected(config),
    };
    TestServer::new(create_router(Arc::new(state))).expect("test server")
}

fn demo_server() -> TestServer {
    test_server(Some(Arc::new(DemoService::new(reference_time()))))
}

/// A service whose listings always fail.
struct BrokenService;

#[async_trait]
impl QuantumService for BrokenService {
    fn channel(&self) -> &str {
        "broken"
    }

    async fn jobs(&self, _query: JobQuery) -> HalResult<Vec<Box<dyn JobHandle>>> {
        Err(HalError::Upstream("rate limit exceeded".into()))
    }

    async fn backends(&self, _filter: BackendFilter) -> HalResult<Vec<Box<dyn BackendHandle>>> {
        Err(HalError::ServiceUnavailable("connection reset".into()))
    }
}

/// A job whose status call fails while everything else works.
struct StatuslessJob;

#[async_trait]
impl JobHandle for StatuslessJob {
    async fn job_id(&self) -> HalResult<Option<String>> {
        Ok(Some("cstatusless".into()))
    }
    async fn backend(&self) -> HalResult<Option<String>> {
        Ok(Some("ibm_kyoto".into()))
    }
    async fn status(&self) -> HalResult<Option<StatusValue>> {
        Err(HalError::ServiceUnavailable("status endpoint timed out".into()))
    }
    async fn creation_date(&self) -> HalResult<Option<DateTime<FixedOffset>>> {
        Ok(Some(reference_time().fixed_offset()))
    }
    async fn time_per_step(&self) -> HalResult<Option<StepTimestamps>> {
        Ok(None)
    }
    async fn time_taken(&self) -> HalResult<Option<f64>> {
        Ok(None)
    }
    async fn usage(&self) -> HalResult<Option<JobUsage>> {
        Ok(None)
    }
    async fn error_message(&self) -> HalResult<Option<String>> {
        Ok(None)
    }
    async fn result(&self) -> HalResult<Option<Box<dyn ResultHandle>>> {
        Ok(None)
    }
}

struct StatuslessService;

#[async_trait]
impl QuantumService for StatuslessService {
    fn channel(&self) -> &str {
        "statusless"
    }

    async fn jobs(&self, _query: JobQuery) -> HalResult<Vec<Box<dyn JobHandle>>> {
        Ok(vec![Box::new(StatuslessJob)])
    }

    async fn backends(&self, _filter: BackendFilter) -> HalResult<Vec<Box<dyn BackendHandle>>> {
        Ok(vec![])
    }
}

/// Tracks how many slow per-job reads are running at once.
#[derive(Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

/// A job whose step timings take a while to arrive.
struct SlowJob {
    id: String,
    gauge: Arc<InFlight>,
}

#[async_trait]
impl JobHandle for SlowJob {
    async fn job_id(&self) -> HalResult<Option<String>> {
        Ok(Some(self.id.clone()))
    }
    async fn backend(&self) -> HalResult<Option<String>> {
        Ok(Some("ibm_brisbane".into()))
    }
    async fn status(&self) -> HalResult<Option<StatusValue>> {
        Ok(Some(StatusValue::text("Completed")))
    }
    async fn creation_date(&self) -> HalResult<Option<DateTime<FixedOffset>>> {
        Ok(None)
    }
    async fn time_per_step(&self) -> HalResult<Option<StepTimestamps>> {
        let now = self.gauge.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.gauge.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.gauge.current.fetch_sub(1, Ordering::SeqCst);
        Ok(None)
    }
    async fn time_taken(&self) -> HalResult<Option<f64>> {
        Ok(None)
    }
    async fn usage(&self) -> HalResult<Option<JobUsage>> {
        Ok(None)
    }
    async fn error_message(&self) -> HalResult<Option<String>> {
        Ok(None)
    }
    async fn result(&self) -> HalResult<Option<Box<dyn ResultHandle>>> {
        Ok(None)
    }
}

/// Returns as many slow jobs as the query asks for.
struct SlowService {
    gauge: Arc<InFlight>,
}

#[async_trait]
impl QuantumService for SlowService {
    fn channel(&self) -> &str {
        "slow"
    }

    async fn jobs(&self, query: JobQuery) -> HalResult<Vec<Box<dyn JobHandle>>> {
        Ok((0..query.limit)
            .map(|i| {
                Box::new(SlowJob {
                    id: format!("cslow{i:04}"),
                    gauge: self.gauge.clone(),
                }) as Box<dyn JobHandle>
            })
            .collect())
    }

    async fn backends(&self, _filter: BackendFilter) -> HalResult<Vec<Box<dyn BackendHandle>>> {
        Ok(vec![])
    }
}

// ============================================================================
// Health endpoint
// ============================================================================

#[tokio::test]
async fn test_root_returns_running_message() {
    let server = test_server(None);
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_json(&json!({"status": "Quantum Tracker API is running"}));
}

// ============================================================================
// No service connection
// ============================================================================

#[tokio::test]
async fn test_data_endpoints_unavailable_without_service() {
    let server = test_server(None);

    for path in ["/api/jobs", "/api/backends", "/api/metrics"] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        response.assert_json(&json!({"detail": "IBM Quantum service is not available."}));
    }
}

// ============================================================================
// Jobs
// ============================================================================

#[tokio::test]
async fn test_list_jobs_newest_first() {
    let server = demo_server();
    let response = server.get("/api/jobs").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let jobs = body.as_array().unwrap();
    assert_eq!(jobs.len(), 6);
    assert_eq!(jobs[0]["id"], "cdemo_queued");
    assert_eq!(jobs[0]["status"], "QUEUED");
    assert_eq!(jobs[0]["user"], "Alice");
    assert_eq!(jobs[5]["id"], "cdemo_cancelled");
    assert_eq!(jobs[5]["status"], "CANCELLED");
}

#[tokio::test]
async fn test_list_jobs_limit_and_ascending() {
    let server = demo_server();
    let response = server
        .get("/api/jobs")
        .add_query_param("limit", 2)
        .add_query_param("descending", false)
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["cdemo_cancelled", "cdemo_long_queue"]);
}

#[tokio::test]
async fn test_descending_accepts_numeric_flag() {
    let server = demo_server();
    let response = server
        .get("/api/jobs")
        .add_query_param("limit", 1)
        .add_query_param("descending", "0")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body[0]["id"], "cdemo_cancelled");
}

#[tokio::test]
async fn test_completed_job_record_shape() {
    let server = demo_server();
    let body: Value = server.get("/api/jobs").await.json();
    let job = body
        .as_array()
        .unwrap()
        .iter()
        .find(|j| j["id"] == "cdemo_long_queue")
        .unwrap();

    assert_eq!(job["status"], "COMPLETED");
    assert_eq!(job["backend"], "ibm_brisbane");
    assert_eq!(job["submitted"], "2025-05-01T10:00:00+00:00");
    assert_eq!(job["elapsed_time"], 120.0);
    assert_eq!(job["qpu_seconds"], 18.5);
    assert_eq!(job["logs"], "Job executed successfully.");
    assert_eq!(job["results"], json!({"000": 512, "111": 488}));
    assert_eq!(
        job["status_history"],
        json!([
            {"status": "QUEUED", "timestamp": "2025-05-01T10:00:00+00:00"},
            {"status": "RUNNING", "timestamp": "2025-05-01T11:55:00+00:00"},
            {"status": "COMPLETED", "timestamp": "2025-05-01T11:57:00+00:00"},
            {"status": "COMPLETED", "timestamp": "2025-05-01T11:57:00+00:00"},
        ])
    );
}

#[tokio::test]
async fn test_failed_job_reports_error_message() {
    let server = demo_server();
    let body: Value = server.get("/api/jobs").await.json();
    let job = body
        .as_array()
        .unwrap()
        .iter()
        .find(|j| j["id"] == "cdemo_failed")
        .unwrap();

    assert_eq!(job["status"], "ERROR");
    assert_eq!(job["logs"], "Error: Qubit calibration failed.");
    assert_eq!(job["results"], json!({}));
    assert_eq!(job["status_history"][2]["status"], "ERROR");
}

#[tokio::test]
async fn test_job_with_failing_status_still_listed() {
    let server = test_server(Some(Arc::new(StatuslessService)));
    let response = server.get("/api/jobs").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body[0]["id"], "cstatusless");
    assert_eq!(body[0]["status"], "ERROR");
    assert_eq!(body[0]["backend"], "ibm_kyoto");
    assert_eq!(body[0]["elapsed_time"], 0.0);
    assert_eq!(body[0]["logs"], "Job status: ERROR");
    assert_eq!(
        body[0]["status_history"],
        json!([{"status": "QUEUED", "timestamp": "2025-05-01T12:00:00+00:00"}])
    );
}

#[tokio::test]
async fn test_large_listing_bounds_upstream_concurrency() {
    let gauge = Arc::new(InFlight::default());
    let server = test_server(Some(Arc::new(SlowService {
        gauge: gauge.clone(),
    })));

    let response = server.get("/api/jobs").add_query_param("limit", 64).await;
    response.assert_status_ok();

    let body: Value = response.json();
    let jobs = body.as_array().unwrap();
    assert_eq!(jobs.len(), 64);
    assert_eq!(jobs[0]["id"], "cslow0000");
    assert_eq!(jobs[63]["id"], "cslow0063");

    let peak = gauge.peak.load(Ordering::SeqCst);
    assert!(peak > 1, "jobs should still be mapped concurrently");
    assert!(
        peak <= MAX_CONCURRENT_JOBS,
        "{peak} per-job reads in flight, cap is {MAX_CONCURRENT_JOBS}"
    );
    assert_eq!(gauge.current.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_job_listing_failure_returns_500() {
    let server = test_server(Some(Arc::new(BrokenService)));
    let response = server.get("/api/jobs").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json();
    let message = body["detail"]["error"].as_str().unwrap();
    assert!(message.contains("rate limit exceeded"));
}

#[tokio::test]
async fn test_invalid_limit_is_client_error() {
    let server = demo_server();
    let response = server.get("/api/jobs").add_query_param("limit", "many").await;
    assert!(response.status_code().is_client_error());
}

// ============================================================================
// Backends
// ============================================================================

#[tokio::test]
async fn test_list_backends_skips_simulator() {
    let server = demo_server();
    let response = server.get("/api/backends").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let backends = body.as_array().unwrap();
    assert_eq!(backends.len(), 6);
    assert!(backends.iter().all(|b| b["name"] != "ibmq_qasm_simulator"));

    let kolkata = backends.iter().find(|b| b["name"] == "ibmq_kolkata").unwrap();
    assert_eq!(
        *kolkata,
        json!({
            "name": "ibmq_kolkata",
            "status": "inactive",
            "qubit_count": 27,
            "queue_depth": 0,
            "error_rate": 0.025,
        })
    );
}

#[tokio::test]
async fn test_failing_backend_is_omitted() {
    let service = DemoService::with_fleet(
        vec![],
        vec![
            DemoBackend::new("ibm_brisbane", 127).with_queue(6),
            DemoBackend::new("ibm_fez", 156).unreachable("status timed out"),
            DemoBackend::new("ibm_torino", 133),
        ],
    );
    let server = test_server(Some(Arc::new(service)));
    let response = server.get("/api/backends").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["ibm_brisbane", "ibm_torino"]);
    assert_eq!(body[1]["error_rate"], 0.01);
}

#[tokio::test]
async fn test_backend_listing_failure_returns_500() {
    let server = test_server(Some(Arc::new(BrokenService)));
    let response = server.get("/api/backends").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json();
    assert!(
        body["detail"]["error"]
            .as_str()
            .unwrap()
            .contains("connection reset")
    );
}

// ============================================================================
// Metrics
// ============================================================================

#[tokio::test]
async fn test_fleet_metrics_over_demo_jobs() {
    let server = demo_server();
    let response = server.get("/api/metrics").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["total_jobs"], 6);
    assert_eq!(body["live_jobs"], 2);
    assert_eq!(body["avg_wait_time"], 2250.0);
    let success = body["success_rate"].as_f64().unwrap();
    assert!((success - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(body["status_counts"]["COMPLETED"], 2);
    assert_eq!(body["status_counts"]["CANCELLED"], 1);
}

#[tokio::test]
async fn test_fleet_metrics_empty_fleet() {
    let service = DemoService::with_fleet(vec![DemoJob::default()], vec![]);
    let server = test_server(Some(Arc::new(service)));
    let body: Value = server.get("/api/metrics").await.json();

    assert_eq!(body["total_jobs"], 1);
    assert_eq!(body["success_rate"], 0.0);
    assert_eq!(body["avg_wait_time"], 0.0);
    assert_eq!(body["status_counts"]["UNKNOWN"], 1);
}

#[tokio::test]
async fn test_metrics_listing_failure_returns_500() {
    let server = test_server(Some(Arc::new(BrokenService)));
    server
        .get("/api/metrics")
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}
