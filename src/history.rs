//! Canonical history records.
//!
//! The same logical message can reach a client through several paths: live
//! delivery, CHATHISTORY replay, bouncer playback. Reducing each copy to a
//! [`HistoryRecord`] drops the tags that legitimately differ between paths
//! (`batch`, `label`, vendor tags) so the copies compare equal.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use slirc_wire::Message;

use crate::error::HistoryError;

/// `(time, msgid, target, text)` of a PRIVMSG or NOTICE.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HistoryRecord {
    /// The `time` tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// The `msgid` tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msgid: Option<String>,
    pub target: String,
    pub text: String,
}

impl HistoryRecord {
    /// Reduce a message with at least a target and a text parameter.
    ///
    /// TAGMSG carries no text and should not be reduced this way.
    pub fn reduce(message: &Message) -> Result<Self, HistoryError> {
        let [target, .., text] = message.params.as_slice() else {
            return Err(HistoryError::TooFewParams {
                command: message.command.clone(),
                got: message.params.len(),
            });
        };

        Ok(Self {
            time: message.server_time().map(str::to_string),
            msgid: message.msgid().map(str::to_string),
            target: target.clone(),
            text: text.clone(),
        })
    }

    /// The `time` tag parsed as RFC 3339, if present and well formed.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let time = self.time.as_deref()?;
        DateTime::parse_from_rfc3339(time)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub(crate) fn to_json(&self) -> Value {
        let optional = |v: &Option<String>| v.clone().map_or(Value::Null, Value::String);
        let mut object = serde_json::Map::new();
        object.insert("time".into(), optional(&self.time));
        object.insert("msgid".into(), optional(&self.msgid));
        object.insert("target".into(), Value::String(self.target.clone()));
        object.insert("text".into(), Value::String(self.text.clone()));
        Value::Object(object)
    }
}

impl TryFrom<&Message> for HistoryRecord {
    type Error = HistoryError;

    fn try_from(message: &Message) -> Result<Self, Self::Error> {
        Self::reduce(message)
    }
}

/// Reduce the PRIVMSG and NOTICE lines of a playback.
///
/// `BATCH` framing and any other commands are skipped.
pub fn reduce_batch(messages: &[Message]) -> Result<Vec<HistoryRecord>, HistoryError> {
    messages
        .iter()
        .filter(|m| m.is_command("PRIVMSG") || m.is_command("NOTICE"))
        .map(HistoryRecord::reduce)
        .collect()
}
