//! Quantum Tracker dashboard binary entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use qtracker_dashboard::{AppState, DashboardConfig, connect_service, create_router, telemetry};

#[derive(Parser)]
#[command(name = "qtracker-dashboard")]
#[command(version, about = "Read-only HTTP API for IBM Quantum jobs and backends")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "QTRACKER_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on (overrides config and QTRACKER_BIND)
    #[arg(short, long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind.to_string();
    }

    telemetry::init_tracing(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;
    tracing::debug!(?config, "Loaded configuration");

    let bind_addr = config.bind_address()?;

    let state = match connect_service(&config).await {
        Some(service) => AppState::with_service(config, service),
        None => AppState::disconnected(config),
    };

    let app = create_router(Arc::new(state));

    tracing::info!("Starting Quantum Tracker API at http://{}", bind_addr);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutting down"),
        Err(e) => {
            // Without a signal handler, serve until killed.
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
