//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: The root [`Config`] and the peer endpoint ([`TargetConfig`])
//! - [`transport`]: Mock peer timing and I/O echo ([`TransportConfig`])
//! - [`capabilities`]: Static software metadata ([`CapabilityConfig`])
//! - [`validation`]: Startup checks

mod capabilities;
mod defaults;
mod transport;
mod types;
mod validation;

pub use capabilities::CapabilityConfig;
pub use transport::TransportConfig;
pub use types::{Config, ConfigError, TargetConfig};
pub use validation::{ValidationError, validate};
