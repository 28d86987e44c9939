//! Structural assertions on received messages.
//!
//! A [`Pattern`] describes what a value must look like using literals,
//! wildcards, full-match regexes and open or closed collections. Messages
//! are matched through their [`message_value`] form; [`MessagePattern`]
//! builds patterns over it field by field.

mod message;
mod pattern;

use serde_json::Value;
use slirc_wire::Message;

use crate::error::AssertionFailure;
use crate::history::HistoryRecord;

pub use message::{MessagePattern, message_value};
pub use pattern::{FullRegex, Pattern};

/// Values that can be matched against a [`Pattern`].
pub trait Matchable {
    fn to_value(&self) -> Value;
}

impl Matchable for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl Matchable for Message {
    fn to_value(&self) -> Value {
        message_value(self)
    }
}

impl Matchable for HistoryRecord {
    fn to_value(&self) -> Value {
        self.to_json()
    }
}

impl Matchable for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl Matchable for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

/// Whether `actual` matches `pattern`.
pub fn matches<A>(actual: &A, pattern: impl Into<Pattern>) -> bool
where
    A: Matchable + ?Sized,
{
    let value = actual.to_value();
    pattern::check(Some(&value), &pattern.into(), "").is_none()
}

/// Check `actual` against `pattern`, describing the first mismatch.
///
/// `context` says what was being checked and leads the failure message.
pub fn assert_matches<A>(
    actual: &A,
    pattern: impl Into<Pattern>,
    context: &str,
) -> Result<(), AssertionFailure>
where
    A: Matchable + ?Sized,
{
    let value = actual.to_value();
    let pattern = pattern.into();
    match pattern::check(Some(&value), &pattern, "") {
        None => Ok(()),
        Some(mismatch) => Err(AssertionFailure {
            context: context.to_string(),
            path: mismatch.path,
            expected: mismatch.expected,
            actual: mismatch.actual,
            full_expected: pattern.to_string(),
            full_actual: pattern::describe(Some(&value)),
        }),
    }
}
