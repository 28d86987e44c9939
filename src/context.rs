//! Per-run test context.

use tracing::debug;

use crate::config::Config;
use crate::error::TransportError;
use crate::transport::SyncTransport;

/// What a test gets handed: the run's configuration and a way to open
/// clients against the software under test.
#[derive(Debug, Clone)]
pub struct TestContext {
    config: Config,
}

impl TestContext {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open a new simulated client named `name`.
    pub async fn connect(&self, name: &str) -> Result<SyncTransport, TransportError> {
        debug!(client = %name, addr = %self.config.target, "opening client");
        SyncTransport::connect(name, &self.config.target, &self.config.transport).await
    }

    pub fn supports_sasl(&self, mechanism: &str) -> bool {
        self.config.capabilities.supports_sasl(mechanism)
    }

    pub fn supports_capability(&self, capability: &str) -> bool {
        self.config.capabilities.supports_capability(capability)
    }
}
