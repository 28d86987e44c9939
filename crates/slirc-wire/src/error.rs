//! Error types for the wire codec.
//!
//! [`ParseError`] covers lines that cannot be decoded; [`EncodeError`] covers
//! hand-built [`Message`](crate::Message) values that cannot be written back
//! to the wire without changing their meaning.

use thiserror::Error;

/// Errors encountered when parsing an IRC line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The line was empty once its line ending was removed.
    #[error("empty message")]
    EmptyMessage,

    /// No command token followed the tags and prefix.
    #[error("missing command in {line:?}")]
    MissingCommand {
        /// The offending line, without its line ending.
        line: String,
    },

    /// The prefix after `:` was empty.
    #[error("invalid prefix: {0:?}")]
    InvalidPrefix(String),

    /// A tag had no name (`@=value`, `@a;;b`, `@+`).
    #[error("tag with empty key in {section:?}")]
    EmptyTagKey {
        /// The raw tags section, without the leading `@`.
        section: String,
    },

    /// A tag value ended with a lone backslash.
    #[error("unterminated escape in tag value {value:?}")]
    UnterminatedEscape {
        /// The raw (still escaped) tag value.
        value: String,
    },

    /// NUL, CR or LF inside the line body.
    #[error("illegal character {byte:#04x} at position {position}")]
    IllegalCharacter {
        /// The offending byte.
        byte: u8,
        /// Byte offset into the line.
        position: usize,
    },

    /// The raw bytes were not valid UTF-8.
    #[error("invalid UTF-8 at byte {byte_pos}")]
    InvalidUtf8 {
        /// Byte position where validation failed.
        byte_pos: usize,
    },
}

/// Errors encountered when serializing a hand-built message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// The command is empty, contains a space or starts with `:`/`@`.
    #[error("invalid command: {0:?}")]
    InvalidCommand(String),

    /// The prefix is empty or contains a space.
    #[error("invalid prefix: {0:?}")]
    InvalidPrefix(String),

    /// The tag key is empty or contains a reserved character.
    #[error("invalid tag key: {0:?}")]
    InvalidTagKey(String),

    /// A non-final parameter would not survive a re-parse.
    #[error("parameter {index} cannot be sent as a middle parameter: {param:?}")]
    InvalidMiddleParam {
        /// Position of the parameter.
        index: usize,
        /// The parameter text.
        param: String,
    },

    /// A parameter contains NUL, CR or LF.
    #[error("parameter {index} contains an illegal control character")]
    IllegalCharacter {
        /// Position of the parameter.
        index: usize,
    },
}
