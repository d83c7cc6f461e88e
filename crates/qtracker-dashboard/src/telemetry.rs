//! Logging setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::LoggingConfig;

/// Directives used when neither `RUST_LOG` nor a level is configured.
pub const DEFAULT_FILTER: &str = "qtracker_dashboard=info,tower_http=info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable console output (for development).
    Console,
    /// JSON structured logging (for production).
    Json,
}

impl LogFormat {
    fn parse(format: &str) -> Self {
        match format {
            "json" => LogFormat::Json,
            _ => LogFormat::Console,
        }
    }
}

/// Build the filter: `RUST_LOG` wins, then the configured level applied to
/// this crate and the HTTP trace layer.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| {
            EnvFilter::try_new(format!(
                "qtracker_dashboard={level},qtracker_adapter_ibm={level},tower_http={level}"
            ))
        })
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let fmt_layer = match LogFormat::parse(&config.format) {
        LogFormat::Console => fmt::layer().with_target(true).boxed(),
        LogFormat::Json => fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(fmt_layer)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("console"), LogFormat::Console);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Console);
    }
}
