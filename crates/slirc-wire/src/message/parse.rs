//! Message parsing implementation.
//!
//! The line is split into its tags, prefix and command sections with nom;
//! parameters are then tokenized by hand because the trailing parameter
//! swallows the rest of the line.

use std::str::FromStr;

use nom::{
    bytes::complete::{take_till, take_till1, take_while},
    character::complete::char,
    combinator::opt,
    sequence::preceded,
    IResult,
};
use smallvec::SmallVec;

use super::tags::{has_empty_tag_name, unescape_tag_value};
use super::types::{Message, Tag};
use crate::error::ParseError;

/// A line split into borrowed sections, before any validation.
#[derive(Debug, Clone, PartialEq)]
struct RawSections<'a> {
    tags: Option<&'a str>,
    prefix: Option<&'a str>,
    command: &'a str,
    params: SmallVec<[&'a str; 15]>,
}

fn spaces(input: &str) -> IResult<&str, &str> {
    take_while(|c| c == ' ')(input)
}

/// IRCv3 tags: the part after `@` and before the first space.
fn tags_section(input: &str) -> IResult<&str, &str> {
    preceded(char('@'), take_till(|c| c == ' '))(input)
}

/// Prefix: the part after `:` and before the first space.
fn prefix_section(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_till(|c| c == ' '))(input)
}

/// Command: fails when nothing follows the tags and prefix.
fn command_token(input: &str) -> IResult<&str, &str> {
    take_till1(|c| c == ' ')(input)
}

/// Split parameters on runs of spaces until a token starting with `:`,
/// which takes the remainder of the line verbatim.
fn split_params(input: &str) -> SmallVec<[&str; 15]> {
    let mut params: SmallVec<[&str; 15]> = SmallVec::new();
    let mut rest = input;

    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }

        if let Some(trailing) = rest.strip_prefix(':') {
            params.push(trailing);
            break;
        }

        let end = rest.find(' ').unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    params
}

fn split_sections(input: &str) -> IResult<&str, RawSections<'_>> {
    let (input, tags) = opt(tags_section)(input)?;
    let (input, _) = spaces(input)?;
    let (input, prefix) = opt(prefix_section)(input)?;
    let (input, _) = spaces(input)?;
    let (input, command) = command_token(input)?;
    let params = split_params(input);

    Ok((
        "",
        RawSections {
            tags,
            prefix,
            command,
            params,
        },
    ))
}

/// Parse the tags section (without `@`) into unique tags.
///
/// A key repeated later in the section replaces the earlier value.
fn parse_tags(section: &str) -> Result<Vec<Tag>, ParseError> {
    let mut tags: Vec<Tag> = Vec::new();

    for raw in section.split(';') {
        let (key, value) = match raw.split_once('=') {
            Some((key, value)) => (key, Some(unescape_tag_value(value)?)),
            None => (raw, None),
        };

        if has_empty_tag_name(key) {
            return Err(ParseError::EmptyTagKey {
                section: section.to_owned(),
            });
        }

        match tags.iter_mut().find(|Tag(k, _)| k == key) {
            Some(existing) => existing.1 = value,
            None => tags.push(Tag(key.to_owned(), value)),
        }
    }

    Ok(tags)
}

fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .unwrap_or(line)
}

impl Message {
    /// Parse one line, with or without its trailing `\r\n`.
    pub fn parse(line: &str) -> Result<Message, ParseError> {
        let line = strip_line_ending(line);
        if line.is_empty() {
            return Err(ParseError::EmptyMessage);
        }

        if let Some(position) = line.bytes().position(|b| matches!(b, b'\r' | b'\n' | 0)) {
            return Err(ParseError::IllegalCharacter {
                byte: line.as_bytes()[position],
                position,
            });
        }

        let (_, sections) = split_sections(line).map_err(|_| ParseError::MissingCommand {
            line: line.to_owned(),
        })?;

        let tags = match sections.tags {
            Some(section) => parse_tags(section)?,
            None => Vec::new(),
        };

        let prefix = match sections.prefix {
            Some("") => return Err(ParseError::InvalidPrefix(String::new())),
            Some(prefix) => Some(prefix.to_owned()),
            None => None,
        };

        if sections.command.starts_with([':', '@']) {
            return Err(ParseError::MissingCommand {
                line: line.to_owned(),
            });
        }

        Ok(Message {
            tags,
            prefix,
            command: sections.command.to_owned(),
            params: sections.params.iter().map(|p| (*p).to_owned()).collect(),
        })
    }

    /// Parse one line of raw bytes, which must be UTF-8.
    pub fn parse_bytes(raw: &[u8]) -> Result<Message, ParseError> {
        let line = std::str::from_utf8(raw).map_err(|e| ParseError::InvalidUtf8 {
            byte_pos: e.valid_up_to(),
        })?;
        Message::parse(line)
    }
}

impl FromStr for Message {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        Message::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tagged_privmsg() {
        let msg: Message =
            "@time=2021-01-01T00:00:00.000Z;msgid=abc :nick!u@h PRIVMSG #chan :hello there\r\n"
                .parse()
                .unwrap();

        assert_eq!(
            msg.tags,
            vec![
                Tag::new("time", Some("2021-01-01T00:00:00.000Z".to_string())),
                Tag::new("msgid", Some("abc".to_string())),
            ]
        );
        assert_eq!(msg.prefix.as_deref(), Some("nick!u@h"));
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params, ["#chan", "hello there"]);
    }

    #[test]
    fn test_parse_simple_ping() {
        let msg: Message = "PING :server\r\n".parse().unwrap();
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.params, ["server"]);
        assert!(msg.prefix.is_none());
        assert!(msg.tags.is_empty());
    }

    #[test]
    fn test_parse_without_line_ending() {
        let msg = Message::parse("USER guest 0 * :Real Name").unwrap();
        assert_eq!(msg.params, ["guest", "0", "*", "Real Name"]);

        let msg = Message::parse("JOIN #chan\n").unwrap();
        assert_eq!(msg.params, ["#chan"]);
    }

    #[test]
    fn test_parse_numeric() {
        let msg = Message::parse(":server 353 nick = #chan :nick other\r\n").unwrap();
        assert_eq!(msg.command, "353");
        assert_eq!(msg.numeric(), Some(353));
        assert_eq!(msg.params, ["nick", "=", "#chan", "nick other"]);
    }

    #[test]
    fn test_parse_preserves_command_case() {
        let msg = Message::parse("privmsg #chan hi").unwrap();
        assert_eq!(msg.command, "privmsg");
    }

    #[test]
    fn test_parse_collapses_repeated_spaces() {
        let msg = Message::parse("MODE  #chan   +o  nick ").unwrap();
        assert_eq!(msg.params, ["#chan", "+o", "nick"]);
    }

    #[test]
    fn test_parse_trailing_keeps_spaces_and_colons() {
        let msg = Message::parse("MODE #chan +k : ").unwrap();
        assert_eq!(msg.params, ["#chan", "+k", " "]);

        let msg = Message::parse("PRIVMSG #chan ::-) hi").unwrap();
        assert_eq!(msg.params, ["#chan", ":-) hi"]);
    }

    #[test]
    fn test_parse_empty_trailing() {
        let msg = Message::parse("TOPIC #chan :\r\n").unwrap();
        assert_eq!(msg.params, ["#chan", ""]);
    }

    #[test]
    fn test_parse_escaped_tags() {
        let msg = Message::parse("@key=value\\swith\\:escapes;flag PING x").unwrap();
        assert_eq!(msg.tag_value("key"), Some("value with;escapes"));
        assert!(msg.has_tag("flag"));
        assert_eq!(msg.tag_value("flag"), None);
    }

    #[test]
    fn test_parse_client_and_vendor_tags() {
        let msg = Message::parse("@+draft/reply=abc;example.com/x=1 TAGMSG #chan").unwrap();
        assert_eq!(msg.tag_value("+draft/reply"), Some("abc"));
        assert_eq!(msg.tag_value("example.com/x"), Some("1"));
    }

    #[test]
    fn test_parse_empty_tag_value() {
        let msg = Message::parse("@a= PING x").unwrap();
        assert_eq!(msg.tag("a"), Some(&Tag::new("a", Some(String::new()))));
    }

    #[test]
    fn test_parse_duplicate_tag_keeps_last() {
        let msg = Message::parse("@a=1;b;a=2 PING x").unwrap();
        assert_eq!(msg.tags.len(), 2);
        assert_eq!(msg.tag_value("a"), Some("2"));
        assert_eq!(msg.tags[0].key(), "a");
    }

    #[test]
    fn test_parse_server_prefix() {
        let msg = Message::parse(":irc.example.com NOTICE * :hi").unwrap();
        assert_eq!(msg.prefix.as_deref(), Some("irc.example.com"));
        assert_eq!(msg.source_nick(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Message::parse(""), Err(ParseError::EmptyMessage));
        assert_eq!(Message::parse("\r\n"), Err(ParseError::EmptyMessage));
        assert!(matches!(
            Message::parse("   "),
            Err(ParseError::MissingCommand { .. })
        ));
        assert!(matches!(
            Message::parse("@time=x"),
            Err(ParseError::MissingCommand { .. })
        ));
        assert!(matches!(
            Message::parse(":nick!u@h"),
            Err(ParseError::MissingCommand { .. })
        ));
        assert!(matches!(
            Message::parse(":nick :trailing only"),
            Err(ParseError::MissingCommand { .. })
        ));
        assert_eq!(
            Message::parse(": PING x"),
            Err(ParseError::InvalidPrefix(String::new()))
        );
    }

    #[test]
    fn test_parse_nothing_after_sections_is_missing_command() {
        for line in ["@a=b", "@a=b   ", ":nick ", "@a=b :nick   "] {
            assert_eq!(
                Message::parse(line),
                Err(ParseError::MissingCommand {
                    line: line.to_owned()
                }),
                "{line:?}"
            );
        }
    }

    #[test]
    fn test_parse_malformed_tags() {
        assert!(matches!(
            Message::parse("@=value PING x"),
            Err(ParseError::EmptyTagKey { .. })
        ));
        assert!(matches!(
            Message::parse("@a=1;;b=2 PING x"),
            Err(ParseError::EmptyTagKey { .. })
        ));
        assert!(matches!(
            Message::parse("@ PING x"),
            Err(ParseError::EmptyTagKey { .. })
        ));
        assert!(matches!(
            Message::parse("@a=oops\\ PING x"),
            Err(ParseError::UnterminatedEscape { .. })
        ));
    }

    #[test]
    fn test_parse_illegal_characters() {
        assert_eq!(
            Message::parse("PRIVMSG #ch\0an :hi\r\n"),
            Err(ParseError::IllegalCharacter {
                byte: 0,
                position: 11
            })
        );
        assert!(matches!(
            Message::parse("PRIVMSG #chan hi\r\nQUIT\r\n"),
            Err(ParseError::IllegalCharacter { byte: b'\r', .. })
        ));
    }

    #[test]
    fn test_parse_bytes_invalid_utf8() {
        assert_eq!(
            Message::parse_bytes(b"PRIVMSG #chan :\xff\xfe\r\n"),
            Err(ParseError::InvalidUtf8 { byte_pos: 15 })
        );
        assert!(Message::parse_bytes(b"PING x\r\n").is_ok());
    }
}
