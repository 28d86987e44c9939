//! IRC message prefix decomposition.
//!
//! An IRC message prefix identifies the origin of a message. It can be either
//! a server name or a user's `nick!user@host` mask, where the user and host
//! parts are optional.
//!
//! # Reference
//! - RFC 2812 Section 2.3.1: Message format

/// A borrowed view of a prefix split into its components.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixParts<'a> {
    /// Nickname; `None` for a server name.
    pub nick: Option<&'a str>,
    /// Username (ident).
    pub user: Option<&'a str>,
    /// Hostname, or the server name itself.
    pub host: Option<&'a str>,
    /// Original raw prefix string.
    pub raw: &'a str,
}

impl<'a> PrefixParts<'a> {
    /// Parse a prefix string into components without allocation.
    pub fn parse(s: &'a str) -> Self {
        let non_empty = |part: &'a str| if part.is_empty() { None } else { Some(part) };

        if let Some(at_pos) = s.find('@') {
            let before = &s[..at_pos];
            let host = &s[at_pos + 1..];

            let (nick, user) = match before.find('!') {
                Some(bang) => (non_empty(&before[..bang]), non_empty(&before[bang + 1..])),
                None => (non_empty(before), None),
            };

            Self {
                nick,
                user,
                host: Some(host),
                raw: s,
            }
        } else if let Some(bang) = s.find('!') {
            Self {
                nick: non_empty(&s[..bang]),
                user: non_empty(&s[bang + 1..]),
                host: None,
                raw: s,
            }
        } else if s.contains('.') {
            Self {
                nick: None,
                user: None,
                host: Some(s),
                raw: s,
            }
        } else {
            Self {
                nick: non_empty(s),
                user: None,
                host: None,
                raw: s,
            }
        }
    }

    /// Check if this prefix looks like a server name.
    pub fn is_server(&self) -> bool {
        self.nick.is_none() && self.user.is_none() && self.host.is_some()
    }
}
