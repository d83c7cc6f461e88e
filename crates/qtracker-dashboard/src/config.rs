//! Configuration management for the Quantum Tracker dashboard.
//!
//! Sources, lowest to highest precedence:
//! 1. Default values
//! 2. Configuration file (YAML)
//! 3. `.env` file
//! 4. Environment variables (with `QTRACKER_` prefix)
//! 5. Command-line flags (applied by the binary)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;

/// Channel that selects the in-memory demo fleet instead of IBM Quantum.
pub const DEMO_CHANNEL: &str = "demo";

const CHANNELS: [&str; 3] = ["ibm_cloud", "ibm_quantum", DEMO_CHANNEL];

/// Complete dashboard configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream quantum service credentials
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8000")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Upstream service settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Channel: "ibm_cloud", "ibm_quantum" or "demo"
    #[serde(default = "default_channel")]
    pub channel: String,

    /// API key (ibm_cloud) or bearer token (ibm_quantum)
    #[serde(default)]
    pub token: Option<String>,

    /// Service CRN (ibm_cloud) or hub/group/project (ibm_quantum)
    #[serde(default)]
    pub instance: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            token: None,
            instance: None,
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("channel", &self.channel)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("instance", &self.instance.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "console" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_channel() -> String {
    "ibm_cloud".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "console".to_string()
}

impl DashboardConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.as_ref().display())))?;

        Self::from_yaml(&contents)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: DashboardConfig = serde_yaml_ng::from_str(contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an optional file, then `.env`, then the
    /// process environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        // A missing .env file is not an error
        dotenvy::dotenv().ok();

        config = config.merge_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override fields with the variables `lookup` finds.
    ///
    /// Absent variables leave the corresponding fields unchanged; empty
    /// credentials count as absent.
    pub fn merge_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("QTRACKER_BIND") {
            self.server.bind_address = v;
        }

        if let Some(v) = lookup("QTRACKER_IBM_CHANNEL") {
            self.service.channel = v;
        }
        if let Some(v) = lookup("QTRACKER_IBM_TOKEN").filter(|v| !v.is_empty()) {
            self.service.token = Some(v);
        }
        if let Some(v) = lookup("QTRACKER_IBM_INSTANCE").filter(|v| !v.is_empty()) {
            self.service.instance = Some(v);
        }

        if let Some(v) = lookup("QTRACKER_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("QTRACKER_LOG_FORMAT") {
            self.logging.format = v;
        }

        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_address()?;

        if !CHANNELS.contains(&self.service.channel.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Unknown channel: {} (expected one of {})",
                self.service.channel,
                CHANNELS.join(", ")
            )));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {other}"
                )));
            }
        }

        match self.logging.format.as_str() {
            "console" | "json" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {other}"
                )));
            }
        }

        Ok(())
    }

    /// Get the parsed bind address.
    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind_address.parse().map_err(|_| {
            ConfigError::ValidationError(format!(
                "Invalid bind address: {}",
                self.server.bind_address
            ))
        })
    }

    /// True when the demo fleet should stand in for IBM Quantum.
    pub fn is_demo(&self) -> bool {
        self.service.channel == DEMO_CHANNEL
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.server.bind_address, "127.0.0.1:8000");
        assert_eq!(config.service.channel, "ibm_cloud");
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial_sections_use_defaults() {
        let config = DashboardConfig::from_yaml(
            "service:\n  channel: ibm_quantum\n  token: abc\nlogging:\n  format: json\n",
        )
        .unwrap();
        assert_eq!(config.service.channel, "ibm_quantum");
        assert_eq!(config.service.token.as_deref(), Some("abc"));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.server.bind_address, "127.0.0.1:8000");
    }

    #[test]
    fn test_yaml_rejects_unknown_channel() {
        let err = DashboardConfig::from_yaml("service:\n  channel: braket\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let config = DashboardConfig::from_yaml("server:\n  bind_address: 0.0.0.0:9000\n")
            .unwrap()
            .merge_env(env(&[
                ("QTRACKER_BIND", "0.0.0.0:8080"),
                ("QTRACKER_IBM_TOKEN", "secret"),
                ("QTRACKER_IBM_INSTANCE", ""),
                ("QTRACKER_IBM_CHANNEL", "demo"),
            ]));

        assert_eq!(config.bind_address().unwrap().port(), 8080);
        assert_eq!(config.service.token.as_deref(), Some("secret"));
        assert!(config.service.instance.is_none());
        assert!(config.is_demo());
    }

    #[test]
    fn test_validate_invalid_values() {
        let mut config = DashboardConfig::default();
        config.server.bind_address = "localhost".to_string();
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let mut config = DashboardConfig::default();
        config.service.token = Some("super-secret-key".to_string());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret-key"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
