use std::fmt::{self, Display, Formatter, Write};

use super::tags::escape_tag_value;
use super::types::Message;

/// Check if a string needs colon-prefixing as a trailing IRC argument.
pub(crate) fn needs_colon_prefix(s: &str) -> bool {
    s.is_empty() || s.contains(' ') || s.starts_with(':')
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.tags.is_empty() {
            f.write_char('@')?;

            for (i, tag) in self.tags.iter().enumerate() {
                if i > 0 {
                    f.write_char(';')?;
                }

                f.write_str(&tag.0)?;

                if let Some(ref value) = tag.1 {
                    f.write_char('=')?;
                    escape_tag_value(f, value)?;
                }
            }

            f.write_char(' ')?;
        }

        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }

        f.write_str(&self.command)?;

        if let Some((last, middle)) = self.params.split_last() {
            for param in middle {
                write!(f, " {}", param)?;
            }
            f.write_char(' ')?;
            if needs_colon_prefix(last) {
                f.write_char(':')?;
            }
            f.write_str(last)?;
        }

        f.write_str("\r\n")
    }
}
