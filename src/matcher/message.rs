//! Message-shaped patterns.

use serde_json::{Map, Value};
use slirc_wire::Message;

use super::pattern::Pattern;

/// The structured form of a [`Message`] that patterns are matched against.
///
/// ```json
/// {
///   "tags": {"time": "2021-01-01T00:00:00.000Z", "bot": null},
///   "prefix": "nick!user@host",
///   "source": {"nick": "nick", "user": "user", "host": "host"},
///   "command": "PRIVMSG",
///   "params": ["#chan", "hello there"]
/// }
/// ```
///
/// `prefix` and `source` are omitted when the message has no prefix.
pub fn message_value(message: &Message) -> Value {
    let mut object = Map::new();

    let tags: Map<String, Value> = message
        .tags
        .iter()
        .map(|tag| {
            let value = tag.value().map_or(Value::Null, |v| Value::String(v.to_string()));
            (tag.key().to_string(), value)
        })
        .collect();
    object.insert("tags".into(), Value::Object(tags));

    if let Some(parts) = message.prefix_parts() {
        object.insert("prefix".into(), Value::String(parts.raw.to_string()));
        let part = |p: Option<&str>| p.map_or(Value::Null, |s| Value::String(s.to_string()));
        let mut source = Map::new();
        source.insert("nick".into(), part(parts.nick));
        source.insert("user".into(), part(parts.user));
        source.insert("host".into(), part(parts.host));
        object.insert("source".into(), Value::Object(source));
    }

    object.insert("command".into(), Value::String(message.command.clone()));
    object.insert(
        "params".into(),
        Value::Array(message.params.iter().cloned().map(Value::String).collect()),
    );

    Value::Object(object)
}

/// Builder for a pattern over [`message_value`].
///
/// Every field left unset matches anything.
///
/// ```
/// use slirc_irctest::matcher::{MessagePattern, Pattern, matches};
/// use slirc_irctest::Message;
///
/// let msg = Message::parse(":nick!u@h PRIVMSG #chan :hello there").unwrap();
/// let pattern = MessagePattern::new()
///     .command("PRIVMSG")
///     .nick("nick")
///     .params(["#chan", "hello there"]);
/// assert!(matches(&msg, pattern));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessagePattern {
    command: Option<Pattern>,
    params: Option<Pattern>,
    prefix: Option<Pattern>,
    nick: Option<Pattern>,
    user: Option<Pattern>,
    host: Option<Pattern>,
    tags: Option<Pattern>,
}

impl MessagePattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command(mut self, command: impl Into<Pattern>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Exactly these parameters.
    pub fn params<I, P>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        self.params = Some(Pattern::list(params));
        self
    }

    /// Parameters starting with these.
    pub fn params_prefix<I, P>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        self.params = Some(Pattern::list_prefix(params));
        self
    }

    /// Any list pattern for the parameters, e.g. [`Pattern::list_remainder`].
    pub fn params_pattern(mut self, pattern: Pattern) -> Self {
        self.params = Some(pattern);
        self
    }

    /// The whole prefix.
    pub fn prefix(mut self, prefix: impl Into<Pattern>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn nick(mut self, nick: impl Into<Pattern>) -> Self {
        self.nick = Some(nick.into());
        self
    }

    pub fn user(mut self, user: impl Into<Pattern>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Host part of the prefix, or the server name.
    pub fn host(mut self, host: impl Into<Pattern>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// At least these tags; others are allowed.
    pub fn tags<I, K, P>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<Pattern>,
    {
        self.tags = Some(Pattern::partial_map(tags));
        self
    }

    /// Exactly these tags.
    pub fn tags_exact<I, K, P>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<Pattern>,
    {
        self.tags = Some(Pattern::map(tags));
        self
    }
}

impl From<MessagePattern> for Pattern {
    fn from(pattern: MessagePattern) -> Self {
        let source: Vec<(&str, Pattern)> = [
            ("nick", pattern.nick),
            ("user", pattern.user),
            ("host", pattern.host),
        ]
        .into_iter()
        .filter_map(|(key, p)| p.map(|p| (key, p)))
        .filter(|(_, p)| !matches!(p, Pattern::Wildcard))
        .collect();

        let mut fields: Vec<(&str, Pattern)> = [
            ("tags", pattern.tags),
            ("prefix", pattern.prefix),
            ("command", pattern.command),
            ("params", pattern.params),
        ]
        .into_iter()
        .filter_map(|(key, p)| p.map(|p| (key, p)))
        .collect();

        if !source.is_empty() {
            fields.push(("source", Pattern::partial_map(source)));
        }
        Pattern::partial_map(fields)
    }
}

/// Pattern for this exact command and parameter list. The prefix and tags,
/// when present, must be there too; other tags are allowed.
impl From<&Message> for MessagePattern {
    fn from(message: &Message) -> Self {
        let mut pattern = MessagePattern::new()
            .command(message.command.as_str())
            .params(&message.params);
        if let Some(prefix) = &message.prefix {
            pattern = pattern.prefix(prefix);
        }
        if !message.tags.is_empty() {
            pattern = pattern.tags(message.tags.iter().map(|tag| {
                let value = tag.value().map_or(Value::Null, |v| Value::String(v.to_string()));
                (tag.key().to_string(), Pattern::Literal(value))
            }));
        }
        pattern
    }
}

impl From<&Message> for Pattern {
    fn from(message: &Message) -> Self {
        MessagePattern::from(message).into()
    }
}
