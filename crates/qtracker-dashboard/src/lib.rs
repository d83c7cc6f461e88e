//! Quantum Tracker dashboard - read-only HTTP API over IBM Quantum.
//!
//! Lists recent jobs and available devices from an upstream
//! [`QuantumService`](qtracker_hal::QuantumService), reshaped into stable
//! JSON records for a monitoring front end:
//!
//! - `GET /` - liveness
//! - `GET /api/jobs?limit&descending` - job records
//! - `GET /api/backends` - device records
//! - `GET /api/metrics?limit&descending` - fleet KPIs
//!
//! The upstream connection is made once at startup. If it fails the server
//! still starts and the data endpoints answer 503.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use qtracker_dashboard::{AppState, DashboardConfig, connect_service, create_router};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = DashboardConfig::load(None)?;
//!     let state = match connect_service(&config).await {
//!         Some(service) => AppState::with_service(config.clone(), service),
//!         None => AppState::disconnected(config.clone()),
//!     };
//!
//!     let app = create_router(Arc::new(state));
//!     let listener = tokio::net::TcpListener::bind(config.bind_address()?).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod dto;
pub mod error;
pub mod mapper;
pub mod server;
pub mod state;
pub mod telemetry;

pub use config::{ConfigError, DashboardConfig};
pub use dto::{
    BackendRecord, BackendState, CanonicalStatus, FleetMetrics, HealthResponse, JobListParams,
    JobRecord, JobResults, StatusTransition,
};
pub use error::ApiError;
pub use server::create_router;
pub use state::{AppState, connect_service};
