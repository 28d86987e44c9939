//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

/// Per-attempt read timeout for the mock peer, in milliseconds.
pub fn default_read_timeout_ms() -> u64 {
    1000
}
