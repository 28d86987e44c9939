//! Unified error handling for the conformance harness.
//!
//! Every error kind propagates to the calling test unchanged; nothing in
//! the harness retries. Whether an error is a failure of the software under
//! test, an expected skip, or a harness bug is the test's decision.

use slirc_wire::{EncodeError, ParseError};
use thiserror::Error;

use crate::config::ConfigError;

// ============================================================================
// Transport Errors (mock peer I/O)
// ============================================================================

/// Errors raised by a [`SyncTransport`](crate::transport::SyncTransport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer closed the socket (zero-length read or failed write).
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// A synchronized collection completed without any message.
    #[error("no message received before the synchronization point")]
    NoMessage,

    /// A received line could not be decoded.
    #[error("unparseable line from peer {line:?}: {source}")]
    Parse {
        line: String,
        #[source]
        source: ParseError,
    },

    /// The peer answered the synchronization PING with ERR_NOTREGISTERED;
    /// the caller should collect with `synchronize = false` before
    /// registration completes.
    #[error("peer refused synchronization PING: {reply}")]
    SyncRejected { reply: String },

    /// An outbound message cannot be serialized faithfully.
    #[error("refusing to send message: {0}")]
    Encode(#[from] EncodeError),

    /// Connecting or reading failed for a reason other than a closed peer.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConnectionClosed => "connection_closed",
            Self::NoMessage => "no_message",
            Self::Parse { .. } => "parse_error",
            Self::SyncRejected { .. } => "sync_rejected",
            Self::Encode(_) => "encode_error",
            Self::Io(_) => "io_error",
        }
    }
}

// ============================================================================
// Assertion Errors (matcher)
// ============================================================================

/// A failed [`assert_matches`](crate::matcher::assert_matches).
///
/// Carries the path to the first mismatching field along with the whole
/// expected pattern and actual value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "{context}: mismatch at {path}: expected {expected}, got {actual}\n  expected: {full_expected}\n  actual:   {full_actual}"
)]
pub struct AssertionFailure {
    /// Caller-supplied description of what was being checked.
    pub context: String,
    /// Path to the mismatching field, e.g. `params[1]` or `tags.msgid`.
    pub path: String,
    /// The pattern at `path`.
    pub expected: String,
    /// The value at `path`, or `<absent>`.
    pub actual: String,
    /// The complete pattern.
    pub full_expected: String,
    /// The complete actual value.
    pub full_actual: String,
}

// ============================================================================
// History Errors (record reduction)
// ============================================================================

/// Errors reducing a message to a [`HistoryRecord`](crate::history::HistoryRecord).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("{command} has {got} parameters, history records need a target and a text")]
    TooFewParams { command: String, got: usize },
}

// ============================================================================
// Top-level
// ============================================================================

/// Any error the harness core can return.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Assertion(#[from] AssertionFailure),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("invalid pattern regex: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type defaulting to the harness [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
