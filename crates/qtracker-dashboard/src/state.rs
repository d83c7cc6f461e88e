//! Application state for the dashboard server.

use std::sync::Arc;

use chrono::Utc;
use qtracker_adapter_demo::DemoService;
use qtracker_adapter_ibm::{IbmChannel, IbmService};
use qtracker_hal::QuantumService;

use crate::config::DashboardConfig;
use crate::error::ApiError;

/// Shared application state.
///
/// The service handle is created once at startup and never replaced. When
/// the connection failed it stays `None` and data endpoints answer 503.
pub struct AppState {
    /// Upstream quantum service, if connected.
    pub service: Option<Arc<dyn QuantumService>>,
    /// Dashboard configuration.
    pub config: DashboardConfig,
}

impl AppState {
    /// State without an upstream connection.
    pub fn disconnected(config: DashboardConfig) -> Self {
        Self {
            service: None,
            config,
        }
    }

    /// State around a connected service.
    pub fn with_service(config: DashboardConfig, service: Arc<dyn QuantumService>) -> Self {
        Self {
            service: Some(service),
            config,
        }
    }

    /// The connected service, or [`ApiError::ServiceUnavailable`].
    pub fn service(&self) -> Result<&dyn QuantumService, ApiError> {
        self.service.as_deref().ok_or(ApiError::ServiceUnavailable)
    }
}

/// Connect to the configured upstream service.
///
/// Never fails: a connection error is logged and yields `None`, so the
/// server can still start and report 503.
pub async fn connect_service(config: &DashboardConfig) -> Option<Arc<dyn QuantumService>> {
    if config.is_demo() {
        tracing::info!("Using in-memory demo fleet");
        return Some(Arc::new(DemoService::new(Utc::now())));
    }

    let channel: IbmChannel = match config.service.channel.parse() {
        Ok(channel) => channel,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to IBM Quantum");
            return None;
        }
    };

    let token = config.service.token.as_deref().unwrap_or_default();
    let instance = config.service.instance.as_deref().unwrap_or_default();

    match IbmService::connect(channel, token, instance).await {
        Ok(service) => {
            tracing::info!(channel = channel.as_str(), "Connected to IBM Quantum");
            Some(Arc::new(service))
        }
        Err(e) => {
            tracing::error!(
                channel = channel.as_str(),
                error = %e,
                "Failed to connect to IBM Quantum"
            );
            None
        }
    }
}
