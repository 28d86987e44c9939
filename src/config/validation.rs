//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("target.hostname is required")]
    MissingHostname,
    #[error("target.port must be non-zero")]
    InvalidPort,
    #[error("transport.read_timeout_ms must be non-zero")]
    ZeroReadTimeout,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.target.hostname.is_empty() {
        errors.push(ValidationError::MissingHostname);
    }
    if config.target.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }

    // A zero timeout turns the collection loop into a hot spin
    if config.transport.read_timeout_ms == 0 {
        errors.push(ValidationError::ZeroReadTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
