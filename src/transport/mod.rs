//! Synchronized mock peer.
//!
//! A [`SyncTransport`] owns one stream and turns whatever the software under
//! test sends back into deterministic batches. A synchronizing collect sends
//! `PING <token>` and gathers every line up to the matching `PONG`; the
//! `PONG` marks the point where the peer has processed everything sent
//! before it.
//!
//! Reads are bounded by [`TransportConfig::read_timeout`]. A synchronizing
//! collect keeps polling until its `PONG` arrives, so a wedged peer makes it
//! wait indefinitely; the test runner owns the overall deadline.

mod codec;

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use futures_util::{SinkExt, StreamExt};
use slirc_wire::Message;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tracing::{Instrument, debug, info, trace};

use crate::config::{TargetConfig, TransportConfig};
use crate::error::TransportError;
use crate::telemetry::spans;

use codec::{LineCodec, has_complete_line};

/// ERR_NOTREGISTERED
const ERR_NOTREGISTERED: &str = "451";

type Result<T, E = TransportError> = std::result::Result<T, E>;

/// One line received from the peer, decoded when possible.
struct Incoming {
    line: String,
    message: Option<Message>,
}

/// A mock IRC peer over a single stream.
///
/// Generic over the stream so tests can drive it through an in-memory
/// [`tokio::io::duplex`] pipe; [`SyncTransport::connect`] opens TCP.
pub struct SyncTransport<S = TcpStream> {
    name: String,
    framed: Framed<S, LineCodec>,
    inbox: VecDeque<Message>,
    read_timeout: Duration,
    show_io: bool,
    clock: Instant,
    sync_count: u64,
}

impl<S> fmt::Debug for SyncTransport<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncTransport")
            .field("name", &self.name)
            .field("queued", &self.inbox.len())
            .field("read_timeout", &self.read_timeout)
            .field("show_io", &self.show_io)
            .finish_non_exhaustive()
    }
}

impl SyncTransport<TcpStream> {
    /// Connect to the software under test.
    pub async fn connect(
        name: impl Into<String>,
        target: &TargetConfig,
        config: &TransportConfig,
    ) -> Result<Self> {
        let name = name.into();
        let stream = TcpStream::connect((target.hostname.as_str(), target.port)).await?;
        stream.set_nodelay(true)?;
        info!(client = %name, addr = %target, "connected");
        Ok(Self::new(name, stream, config))
    }
}

impl<S> SyncTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already connected stream.
    pub fn new(name: impl Into<String>, stream: S, config: &TransportConfig) -> Self {
        Self {
            name: name.into(),
            framed: Framed::new(stream, LineCodec::new()),
            inbox: VecDeque::new(),
            read_timeout: config.read_timeout(),
            show_io: config.show_io,
            clock: Instant::now(),
            sync_count: 0,
        }
    }

    /// The name this transport logs under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write one line, appending `\r\n` when missing.
    ///
    /// Any write failure means the peer is gone and is reported as
    /// [`TransportError::ConnectionClosed`].
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        let text = line.strip_suffix("\r\n").unwrap_or(line);
        self.log_io("->", text);

        self.framed.send(text.to_owned()).await.map_err(|e| {
            debug!(client = %self.name, error = %e, "write failed");
            TransportError::ConnectionClosed
        })
    }

    /// Serialize and send a message.
    pub async fn send_message(&mut self, message: &Message) -> Result<()> {
        let line = message.encode()?;
        self.send_line(&line).await
    }

    /// Collect decoded messages.
    ///
    /// With `synchronize`, sends a `PING` and returns every message received
    /// before the matching `PONG`, failing with [`TransportError::NoMessage`]
    /// when there were none and `require_at_least_one` is set. Without it,
    /// returns as soon as a read produced complete lines, or an empty batch
    /// when the peer is idle and nothing was required.
    ///
    /// Messages left queued by [`get_one`](Self::get_one) come first. They
    /// count toward `require_at_least_one`, and they stay queued when the
    /// collect fails.
    pub async fn collect(
        &mut self,
        synchronize: bool,
        require_at_least_one: bool,
    ) -> Result<Vec<Message>> {
        let queued = !self.inbox.is_empty();
        let require = require_at_least_one && !queued;

        let span = spans::client(&self.name);
        let incoming = self
            .collect_incoming(synchronize, require, queued, false)
            .instrument(span)
            .await?;

        let mut messages: Vec<Message> = self.inbox.drain(..).collect();
        messages.extend(incoming.into_iter().filter_map(|i| i.message));
        Ok(messages)
    }

    /// Like [`collect`](Self::collect), but returns the lines undecoded.
    ///
    /// Lines that fail to parse are returned as-is instead of failing.
    pub async fn collect_raw(
        &mut self,
        synchronize: bool,
        require_at_least_one: bool,
    ) -> Result<Vec<String>> {
        let span = spans::client(&self.name);
        let incoming = self
            .collect_incoming(synchronize, require_at_least_one, false, true)
            .instrument(span)
            .await?;
        Ok(incoming.into_iter().map(|i| i.line).collect())
    }

    /// Next message accepted by `filter`, synchronizing to refill.
    ///
    /// Rejected messages are discarded. Fails with
    /// [`TransportError::NoMessage`] when a refill produces nothing.
    pub async fn get_one<F>(&mut self, filter: F) -> Result<Message>
    where
        F: FnMut(&Message) -> bool,
    {
        self.next_matching(true, filter).await
    }

    /// Next message accepted by `filter`, refilling without a `PING`.
    ///
    /// For use before registration, when the peer answers `PING` with
    /// ERR_NOTREGISTERED. Waits until the peer sends something.
    pub async fn get_one_unsynchronized<F>(&mut self, filter: F) -> Result<Message>
    where
        F: FnMut(&Message) -> bool,
    {
        self.next_matching(false, filter).await
    }

    /// Close the stream, dropping any buffered state.
    pub async fn disconnect(mut self) {
        if let Err(e) = SinkExt::<String>::close(&mut self.framed).await {
            debug!(client = %self.name, error = %e, "shutdown failed");
        }
        debug!(
            client = %self.name,
            queued = self.inbox.len(),
            "disconnected"
        );
    }

    async fn next_matching<F>(&mut self, synchronize: bool, mut filter: F) -> Result<Message>
    where
        F: FnMut(&Message) -> bool,
    {
        loop {
            while let Some(message) = self.inbox.pop_front() {
                if filter(&message) {
                    return Ok(message);
                }
            }
            let batch = self.collect(synchronize, true).await?;
            if batch.is_empty() {
                return Err(TransportError::NoMessage);
            }
            self.inbox.extend(batch);
        }
    }

    /// Lines up to the sync marker, or up to the first read that produced
    /// lines when not synchronizing. `queued` means the caller already holds
    /// messages, so an unsynchronized collect never waits for more.
    async fn collect_incoming(
        &mut self,
        synchronize: bool,
        require_at_least_one: bool,
        queued: bool,
        raw: bool,
    ) -> Result<Vec<Incoming>> {
        let token = if synchronize {
            let token = self.next_token();
            self.send_line(&format!("PING {token}")).await?;
            Some(token)
        } else {
            None
        };

        let mut collected = Vec::new();
        loop {
            if token.is_none()
                && (queued || !collected.is_empty())
                && !has_complete_line(self.framed.read_buffer())
            {
                return Ok(collected);
            }

            let bytes = match timeout(self.read_timeout, self.framed.next()).await {
                Ok(Some(Ok(bytes))) => bytes,
                Ok(None) => return Err(TransportError::ConnectionClosed),
                Ok(Some(Err(e))) if is_disconnect(&e) => {
                    debug!(client = %self.name, error = %e, "read failed");
                    self.framed.read_buffer_mut().clear();
                    return Err(TransportError::ConnectionClosed);
                }
                Ok(Some(Err(e))) => return Err(e.into()),
                Err(_elapsed) => {
                    if token.is_none()
                        && !require_at_least_one
                        && self.framed.read_buffer().is_empty()
                    {
                        return Ok(collected);
                    }
                    trace!(client = %self.name, "waiting");
                    continue;
                }
            };

            let incoming = self.decode(bytes, raw)?;
            if let (Some(token), Some(message)) = (&token, &incoming.message) {
                if is_sync_marker(message, token) {
                    if require_at_least_one && collected.is_empty() {
                        return Err(TransportError::NoMessage);
                    }
                    return Ok(collected);
                }
                if is_ping_rejection(message) {
                    return Err(TransportError::SyncRejected {
                        reply: incoming.line,
                    });
                }
            }
            collected.push(incoming);
        }
    }

    fn decode(&self, bytes: BytesMut, raw: bool) -> Result<Incoming> {
        let line = String::from_utf8_lossy(&bytes).into_owned();
        self.log_io("<-", &line);

        match Message::parse_bytes(&bytes) {
            Ok(message) => Ok(Incoming {
                line,
                message: Some(message),
            }),
            Err(_) if raw => Ok(Incoming {
                line,
                message: None,
            }),
            Err(source) => Err(TransportError::Parse { line, source }),
        }
    }

    /// A token no earlier collect on this transport has used.
    fn next_token(&mut self) -> String {
        self.sync_count += 1;
        let elapsed = self.clock.elapsed();
        format!(
            "sync{}.{:09}.{}",
            elapsed.as_secs(),
            elapsed.subsec_nanos(),
            self.sync_count
        )
    }

    fn log_io(&self, direction: &str, line: &str) {
        if self.show_io {
            info!(client = %self.name, "{direction} {line}");
        } else {
            debug!(client = %self.name, "{direction} {line}");
        }
    }
}

/// `PONG <token>` or `PONG <server> <token>`.
fn is_sync_marker(message: &Message, token: &str) -> bool {
    message.is_command("PONG") && message.params.last().is_some_and(|p| p == token)
}

/// `451 <nick> PING :You have not registered`
fn is_ping_rejection(message: &Message) -> bool {
    message.command == ERR_NOTREGISTERED
        && message
            .params
            .get(1)
            .is_some_and(|p| p.eq_ignore_ascii_case("PING"))
}

fn is_disconnect(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
    )
}
