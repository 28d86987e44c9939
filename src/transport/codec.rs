//! CRLF line codec for tokio.

use std::io;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

/// Splits the peer's byte stream into `\r\n`-terminated lines.
///
/// Decoded lines come back as raw bytes without their terminator; turning
/// them into messages is left to the caller so undecodable lines can still
/// be reported verbatim.
#[derive(Debug, Default)]
pub(crate) struct LineCodec {
    /// Index of next byte to check for a line ending
    next_index: usize,
}

impl LineCodec {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

/// Whether `buf` holds at least one complete line.
pub(crate) fn has_complete_line(buf: &[u8]) -> bool {
    buf.windows(2).any(|w| w == b"\r\n")
}

impl Decoder for LineCodec {
    type Item = BytesMut;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> io::Result<Option<BytesMut>> {
        // Back up one byte in case the previous scan ended between \r and \n
        let start = self.next_index.saturating_sub(1).min(src.len());
        match src[start..].windows(2).position(|w| w == b"\r\n") {
            Some(offset) => {
                let end = start + offset;
                let mut line = src.split_to(end + 2);
                line.truncate(end);
                self.next_index = 0;
                Ok(Some(line))
            }
            None => {
                self.next_index = src.len();
                Ok(None)
            }
        }
    }

    /// A partial line at end of stream is dropped; the stream just ends.
    fn decode_eof(&mut self, src: &mut BytesMut) -> io::Result<Option<BytesMut>> {
        match self.decode(src)? {
            Some(line) => Ok(Some(line)),
            None => {
                src.clear();
                self.next_index = 0;
                Ok(None)
            }
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = io::Error;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> io::Result<()> {
        let text = line.strip_suffix("\r\n").unwrap_or(&line);
        dst.reserve(text.len() + 2);
        dst.extend_from_slice(text.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}
