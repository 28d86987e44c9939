//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use super::capabilities::CapabilityConfig;
use super::transport::TransportConfig;
use super::validation::ValidationError;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Invalid(Vec<ValidationError>),
}

/// Harness configuration, constructed once per run.
///
/// ```toml
/// [target]
/// hostname = "127.0.0.1"
/// port = 6667
///
/// [transport]
/// read_timeout_ms = 1000
/// show_io = true
///
/// [capabilities]
/// sasl_mechanisms = ["PLAIN"]
/// capabilities = ["message-tags", "server-time"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Where the software under test listens.
    pub target: TargetConfig,
    /// Mock peer settings.
    #[serde(default)]
    pub transport: TransportConfig,
    /// What the software under test supports.
    #[serde(default)]
    pub capabilities: CapabilityConfig,
}

impl Config {
    /// Build a configuration for a target with default settings.
    pub fn new(target: TargetConfig) -> Self {
        Self {
            target,
            transport: TransportConfig::default(),
            capabilities: CapabilityConfig::default(),
        }
    }

    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(s)?;
        super::validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

/// The endpoint a controller started the software under test on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TargetConfig {
    /// Hostname or IP address.
    pub hostname: String,
    /// TCP port.
    pub port: u16,
}

impl TargetConfig {
    /// Create a target from a `(hostname, port)` pair.
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
        }
    }
}

impl std::fmt::Display for TargetConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.hostname.contains(':') {
            write!(f, "[{}]:{}", self.hostname, self.port)
        } else {
            write!(f, "{}:{}", self.hostname, self.port)
        }
    }
}
