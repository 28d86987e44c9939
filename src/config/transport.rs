//! Mock peer transport configuration.

use serde::Deserialize;
use std::time::Duration;

use super::defaults::default_read_timeout_ms;

/// Settings applied to every [`SyncTransport`](crate::transport::SyncTransport).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransportConfig {
    /// How long a single read attempt waits before polling again.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Log every line sent and received at `info` instead of `debug`.
    #[serde(default)]
    pub show_io: bool,
}

impl TransportConfig {
    /// The per-attempt read timeout.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Override the per-attempt read timeout.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: default_read_timeout_ms(),
            show_io: false,
        }
    }
}
