//! IRC message types, parsing and serialization.

mod parse;
mod serialize;
/// IRCv3 tag escaping.
pub mod tags;
mod types;

pub use self::types::{Message, Tag};
