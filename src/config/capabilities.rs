//! Static capability metadata for the software under test.
//!
//! The harness never interprets these lists itself; tests consult them to
//! decide whether a behavior applies and feed them into match patterns.

use serde::Deserialize;

/// What the software under test claims to support.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CapabilityConfig {
    /// SASL mechanisms (e.g. `PLAIN`, `SCRAM-SHA-256`).
    #[serde(default)]
    pub sasl_mechanisms: Vec<String>,
    /// IRCv3 capabilities (e.g. `message-tags`, `draft/chathistory`).
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl CapabilityConfig {
    /// Whether a SASL mechanism is supported. Mechanism names are
    /// case-insensitive.
    pub fn supports_sasl(&self, mechanism: &str) -> bool {
        self.sasl_mechanisms
            .iter()
            .any(|m| m.eq_ignore_ascii_case(mechanism))
    }

    /// Whether a capability is supported.
    pub fn supports_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}
