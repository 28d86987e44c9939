use super::tags::has_empty_tag_name;
use crate::error::EncodeError;
use crate::prefix::PrefixParts;

/// An owned IRC message.
///
/// Holds one decoded protocol line: optional IRCv3 tags, an optional
/// prefix/source, the command token (alphabetic or a three-digit numeric)
/// and the parameter list. The trailing parameter is stored like any other;
/// whether it needs a `:` is decided again on serialization.
///
/// Equality treats tags as a mapping: two messages with the same tags in a
/// different order are equal.
///
/// # Example
///
/// ```
/// use slirc_wire::Message;
///
/// let msg: Message = ":nick!user@host PRIVMSG #channel :Hello!".parse().unwrap();
/// assert_eq!(msg.source_nick(), Some("nick"));
///
/// let msg = Message::new("TOPIC").with_params(["#chan", ""]);
/// assert_eq!(msg.to_string(), "TOPIC #chan :\r\n");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Message {
    /// IRCv3 message tags (e.g., `time`, `msgid`), keys unique.
    pub tags: Vec<Tag>,
    /// Message prefix/source without the leading `:`.
    pub prefix: Option<String>,
    /// The command name or three-digit numeric, case preserved.
    pub command: String,
    /// Command parameters, trailing parameter last.
    pub params: Vec<String>,
}

/// An IRCv3 message tag.
///
/// The value is optional; `None` is a valueless tag (`@draft/bot`).
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Tag(
    /// Tag key (e.g., `time`, `+draft/reply`, `example.com/foo`).
    pub String,
    /// Unescaped tag value.
    pub Option<String>,
);

impl Tag {
    /// Create a new tag with a key and optional value.
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Tag(key.into(), value)
    }

    /// The tag key.
    pub fn key(&self) -> &str {
        &self.0
    }

    /// The tag value, if any.
    pub fn value(&self) -> Option<&str> {
        self.1.as_deref()
    }
}

impl Message {
    /// Create a message with the given command and nothing else.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Message {
            tags: Vec::new(),
            prefix: None,
            command: command.into(),
            params: Vec::new(),
        }
    }

    /// Replace the parameter list.
    #[must_use]
    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Append one parameter.
    #[must_use]
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }

    /// Set the prefix/source of this message.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Add a tag, replacing the value of an existing tag with the same key.
    #[must_use]
    pub fn with_tag<K, V>(mut self, key: K, value: Option<V>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_tag(key, value.map(Into::into));
        self
    }

    /// Insert or replace a tag in place, keeping keys unique.
    pub fn set_tag(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match self.tags.iter_mut().find(|Tag(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.tags.push(Tag(key, value)),
        }
    }

    /// Get the tag entry for a key, if present.
    pub fn tag(&self, key: &str) -> Option<&Tag> {
        self.tags.iter().find(|Tag(k, _)| k == key)
    }

    /// Whether a tag is present, with or without a value.
    pub fn has_tag(&self, key: &str) -> bool {
        self.tag(key).is_some()
    }

    /// Get the value of an IRCv3 tag by key.
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tag(key).and_then(Tag::value)
    }

    /// Get the server-time tag value.
    pub fn server_time(&self) -> Option<&str> {
        self.tag_value("time")
    }

    /// Get the message ID tag.
    pub fn msgid(&self) -> Option<&str> {
        self.tag_value("msgid")
    }

    /// Get the labeled-response label tag.
    pub fn label(&self) -> Option<&str> {
        self.tag_value("label")
    }

    /// The numeric reply code, if the command is exactly three ASCII digits.
    pub fn numeric(&self) -> Option<u16> {
        let cmd = self.command.as_bytes();
        if cmd.len() == 3 && cmd.iter().all(u8::is_ascii_digit) {
            self.command.parse().ok()
        } else {
            None
        }
    }

    /// Compare the command token ignoring ASCII case.
    pub fn is_command(&self, command: &str) -> bool {
        self.command.eq_ignore_ascii_case(command)
    }

    /// The prefix split into nick/user/host.
    pub fn prefix_parts(&self) -> Option<PrefixParts<'_>> {
        self.prefix.as_deref().map(PrefixParts::parse)
    }

    /// Get the nickname from the message prefix, if present.
    pub fn source_nick(&self) -> Option<&str> {
        self.prefix_parts().and_then(|p| p.nick)
    }

    /// Check that this message can be serialized and parsed back unchanged.
    pub fn validate(&self) -> Result<(), EncodeError> {
        for Tag(key, _) in &self.tags {
            if has_empty_tag_name(key)
                || key
                    .chars()
                    .any(|c| matches!(c, ' ' | ';' | '=' | '\r' | '\n' | '\0'))
            {
                return Err(EncodeError::InvalidTagKey(key.clone()));
            }
        }

        if let Some(prefix) = &self.prefix {
            if prefix.is_empty() || prefix.chars().any(is_forbidden_in_token) {
                return Err(EncodeError::InvalidPrefix(prefix.clone()));
            }
        }

        if self.command.is_empty()
            || self.command.starts_with([':', '@'])
            || self.command.chars().any(is_forbidden_in_token)
        {
            return Err(EncodeError::InvalidCommand(self.command.clone()));
        }

        let last = self.params.len().saturating_sub(1);
        for (index, param) in self.params.iter().enumerate() {
            if param.contains(['\r', '\n', '\0']) {
                return Err(EncodeError::IllegalCharacter { index });
            }
            if index < last && (param.is_empty() || param.contains(' ') || param.starts_with(':'))
            {
                return Err(EncodeError::InvalidMiddleParam {
                    index,
                    param: param.clone(),
                });
            }
        }

        Ok(())
    }

    /// Serialize to a wire line after [`validate`](Self::validate).
    ///
    /// `Display` writes the same line without validation.
    pub fn encode(&self) -> Result<String, EncodeError> {
        self.validate()?;
        Ok(self.to_string())
    }
}

fn is_forbidden_in_token(c: char) -> bool {
    matches!(c, ' ' | '\r' | '\n' | '\0')
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.command == other.command
            && self.prefix == other.prefix
            && self.params == other.params
            && self.tags.len() == other.tags.len()
            && self
                .tags
                .iter()
                .all(|Tag(k, v)| other.tag(k).is_some_and(|t| t.1 == *v))
    }
}

impl Eq for Message {}
