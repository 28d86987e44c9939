//! Pattern values and the recursive matching walk.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde_json::Value;

/// A regex that must match the whole string, not a substring.
#[derive(Debug, Clone)]
pub struct FullRegex {
    source: String,
    regex: Regex,
}

impl FullRegex {
    /// Compile `source` anchored at both ends.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written, without anchors.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// What a value must look like.
///
/// Compared against [`serde_json::Value`]s; a [`Message`](slirc_wire::Message)
/// is converted with [`message_value`](super::message_value) first. Absence
/// (a missing map key or list slot) only matches [`Pattern::Wildcard`].
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Equal to this value.
    Literal(Value),
    /// Anything, including absence.
    Wildcard,
    /// A string fully matching the regex.
    Regex(FullRegex),
    /// A string that does not fully match the regex.
    NotRegex(FullRegex),
    /// A map containing every `required` key with a matching value. Unless
    /// `open`, no other keys are allowed.
    PartialMap {
        required: BTreeMap<String, Pattern>,
        open: bool,
    },
    /// A list matching `items` position by position. Unless `open`, the
    /// lengths must be equal.
    PartialList { items: Vec<Pattern>, open: bool },
    /// A list starting with `items`, whose remaining elements each match
    /// `remainder`, with at least `min_remaining` of them.
    ListRemainder {
        items: Vec<Pattern>,
        remainder: Box<Pattern>,
        min_remaining: usize,
    },
}

impl Pattern {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    pub fn regex(source: &str) -> Result<Self, regex::Error> {
        FullRegex::new(source).map(Self::Regex)
    }

    pub fn not_regex(source: &str) -> Result<Self, regex::Error> {
        FullRegex::new(source).map(Self::NotRegex)
    }

    /// A map with exactly these keys.
    pub fn map<I, K, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<Pattern>,
    {
        Self::PartialMap {
            required: collect_entries(entries),
            open: false,
        }
    }

    /// A map with at least these keys.
    pub fn partial_map<I, K, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<Pattern>,
    {
        Self::PartialMap {
            required: collect_entries(entries),
            open: true,
        }
    }

    /// A list of exactly these items.
    pub fn list<I, P>(items: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        Self::PartialList {
            items: items.into_iter().map(Into::into).collect(),
            open: false,
        }
    }

    /// A list starting with these items.
    pub fn list_prefix<I, P>(items: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        Self::PartialList {
            items: items.into_iter().map(Into::into).collect(),
            open: true,
        }
    }

    /// A list starting with `items` followed by at least `min_remaining`
    /// elements matching `remainder`.
    pub fn list_remainder<I, P>(items: I, remainder: impl Into<Pattern>, min_remaining: usize) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        Self::ListRemainder {
            items: items.into_iter().map(Into::into).collect(),
            remainder: Box::new(remainder.into()),
            min_remaining,
        }
    }
}

fn collect_entries<I, K, P>(entries: I) -> BTreeMap<String, Pattern>
where
    I: IntoIterator<Item = (K, P)>,
    K: Into<String>,
    P: Into<Pattern>,
{
    entries
        .into_iter()
        .map(|(k, p)| (k.into(), p.into()))
        .collect()
}

impl From<Value> for Pattern {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl From<&str> for Pattern {
    fn from(value: &str) -> Self {
        Self::Literal(Value::String(value.to_string()))
    }
}

impl From<String> for Pattern {
    fn from(value: String) -> Self {
        Self::Literal(Value::String(value))
    }
}

impl From<&String> for Pattern {
    fn from(value: &String) -> Self {
        Self::from(value.as_str())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value}"),
            Self::Wildcard => f.write_str("<any>"),
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
            Self::NotRegex(re) => write!(f, "!/{}/", re.as_str()),
            Self::PartialMap { required, open } => {
                f.write_str("{")?;
                for (i, (key, pattern)) in required.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: {pattern}")?;
                }
                if *open {
                    f.write_str(if required.is_empty() { ".." } else { ", .." })?;
                }
                f.write_str("}")
            }
            Self::PartialList { items, open } => {
                write_items(f, items)?;
                if *open {
                    f.write_str(if items.is_empty() { ".." } else { ", .." })?;
                }
                f.write_str("]")
            }
            Self::ListRemainder {
                items,
                remainder,
                min_remaining,
            } => {
                write_items(f, items)?;
                if !items.is_empty() {
                    f.write_str(", ")?;
                }
                write!(f, "{remainder}... (at least {min_remaining})]")
            }
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Pattern]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// The first place a value departs from its pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Mismatch {
    pub path: String,
    pub expected: String,
    pub actual: String,
}

impl Mismatch {
    fn new(path: &str, expected: impl fmt::Display, actual: Option<&Value>) -> Self {
        Self {
            path: display_path(path),
            expected: expected.to_string(),
            actual: describe(actual),
        }
    }
}

pub(crate) fn describe(value: Option<&Value>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "<absent>".to_string(),
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}

fn key_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn index_path(path: &str, index: usize) -> String {
    format!("{path}[{index}]")
}

/// Walk `pattern` against `actual`, returning the first mismatch.
pub(crate) fn check(actual: Option<&Value>, pattern: &Pattern, path: &str) -> Option<Mismatch> {
    match pattern {
        Pattern::Wildcard => None,
        Pattern::Literal(expected) => match actual {
            Some(value) if value == expected => None,
            _ => Some(Mismatch::new(path, pattern, actual)),
        },
        Pattern::Regex(re) => match actual {
            Some(Value::String(s)) if re.is_match(s) => None,
            _ => Some(Mismatch::new(path, pattern, actual)),
        },
        Pattern::NotRegex(re) => match actual {
            Some(Value::String(s)) if !re.is_match(s) => None,
            _ => Some(Mismatch::new(path, pattern, actual)),
        },
        Pattern::PartialMap { required, open } => {
            let Some(Value::Object(map)) = actual else {
                return Some(Mismatch::new(path, pattern, actual));
            };
            for (key, sub) in required {
                if let Some(mismatch) = check(map.get(key), sub, &key_path(path, key)) {
                    return Some(mismatch);
                }
            }
            if !open {
                if let Some((key, value)) = map.iter().find(|(k, _)| !required.contains_key(*k)) {
                    return Some(Mismatch::new(&key_path(path, key), "<absent>", Some(value)));
                }
            }
            None
        }
        Pattern::PartialList { items, open } => {
            let Some(Value::Array(list)) = actual else {
                return Some(Mismatch::new(path, pattern, actual));
            };
            if let Some(mismatch) = check_items(list, items, path) {
                return Some(mismatch);
            }
            if !open && list.len() != items.len() {
                return Some(Mismatch::new(
                    path,
                    format!("{} items {pattern}", items.len()),
                    actual,
                ));
            }
            None
        }
        Pattern::ListRemainder {
            items,
            remainder,
            min_remaining,
        } => {
            let Some(Value::Array(list)) = actual else {
                return Some(Mismatch::new(path, pattern, actual));
            };
            if let Some(mismatch) = check_items(list, items, path) {
                return Some(mismatch);
            }
            let rest = list.get(items.len()..).unwrap_or_default();
            for (offset, value) in rest.iter().enumerate() {
                let here = index_path(path, items.len() + offset);
                if let Some(mismatch) = check(Some(value), remainder, &here) {
                    return Some(mismatch);
                }
            }
            if rest.len() < *min_remaining {
                return Some(Mismatch::new(path, pattern, actual));
            }
            None
        }
    }
}

fn check_items(list: &[Value], items: &[Pattern], path: &str) -> Option<Mismatch> {
    items
        .iter()
        .enumerate()
        .find_map(|(i, item)| check(list.get(i), item, &index_path(path, i)))
}
