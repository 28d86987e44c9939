//! Core of an IRC conformance harness.
//!
//! Tests drive the software under test through [`SyncTransport`]s, one per
//! simulated client, and assert on what comes back with the [`matcher`] and
//! [`history`] modules. The wire codec lives in the `slirc-wire` crate and
//! is re-exported here.
//!
//! ```no_run
//! use slirc_irctest::{Config, TestContext, TargetConfig};
//! use slirc_irctest::matcher::{MessagePattern, assert_matches};
//!
//! # async fn run() -> slirc_irctest::Result<()> {
//! let ctx = TestContext::new(Config::new(TargetConfig::new("127.0.0.1", 6667)));
//! let mut client = ctx.connect("client1").await?;
//! client.send_line("NICK foo").await?;
//! client.send_line("USER foo 0 * :Foo").await?;
//! let welcome = client
//!     .get_one_unsynchronized(|m| m.numeric() == Some(1))
//!     .await?;
//! assert_matches(&welcome, MessagePattern::new().params_prefix(["foo"]), "welcome")?;
//! client.disconnect().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod history;
pub mod matcher;
pub mod telemetry;
pub mod transport;

pub use config::{CapabilityConfig, Config, ConfigError, TargetConfig, TransportConfig};
pub use context::TestContext;
pub use error::{AssertionFailure, Error, HistoryError, Result, TransportError};
pub use history::{HistoryRecord, reduce_batch};
pub use transport::SyncTransport;

pub use slirc_wire::{
    EncodeError, Message, ParseError, PrefixParts, Tag, escape_tag_value, unescape_tag_value,
};
