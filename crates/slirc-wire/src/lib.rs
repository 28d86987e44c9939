//! # slirc-wire
//!
//! The IRC wire format as seen by a conformance harness: one line in, one
//! [`Message`] out, and back again.
//!
//! Unlike a full protocol library, commands are not decoded into typed
//! variants. A [`Message`] keeps the command token and its parameters as
//! plain strings so that tests can assert on exactly what a peer sent,
//! including replies the harness has never heard of.
//!
//! ## Quick Start
//!
//! ```rust
//! use slirc_wire::Message;
//!
//! let raw = "@time=2023-01-01T12:00:00.000Z :nick!user@host PRIVMSG #channel :Hello there\r\n";
//! let message: Message = raw.parse().expect("valid IRC line");
//!
//! assert_eq!(message.command, "PRIVMSG");
//! assert_eq!(message.params, ["#channel", "Hello there"]);
//! assert_eq!(message.server_time(), Some("2023-01-01T12:00:00.000Z"));
//! assert_eq!(message.to_string(), raw);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod message;
pub mod prefix;

pub use self::error::{EncodeError, ParseError};
pub use self::message::tags::{escape_tag_value, unescape_tag_value};
pub use self::message::{Message, Tag};
pub use self::prefix::PrefixParts;
