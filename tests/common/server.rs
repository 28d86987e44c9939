//! Scripted IRC server for integration tests.
//!
//! Speaks just enough of the protocol to exercise the harness: registration,
//! PING/PONG (refused before registration), JOIN with NAMES, PRIVMSG/NOTICE
//! relay with `time` and `msgid` tags, `CHATHISTORY LATEST` playback in a
//! batch, and QUIT.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use slirc_irctest::{Config, Message, TargetConfig, TransportConfig};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

const SERVER_NAME: &str = "mock.server";

#[derive(Default)]
struct Shared {
    clients: HashMap<u64, ClientEntry>,
    history: HashMap<String, Vec<Message>>,
    next_id: u64,
}

struct ClientEntry {
    nick: Option<String>,
    user: bool,
    registered: bool,
    channels: HashSet<String>,
    tx: mpsc::UnboundedSender<String>,
}

impl ClientEntry {
    fn nick(&self) -> &str {
        self.nick.as_deref().unwrap_or("*")
    }

    fn mask(&self) -> String {
        format!("{0}!{0}@127.0.0.1", self.nick())
    }

    fn send(&self, message: Message) {
        let _ = self.tx.send(message.to_string());
    }
}

/// A running scripted server, stopped on drop.
pub struct MockServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl MockServer {
    /// Bind an ephemeral port on 127.0.0.1 and start accepting.
    pub async fn spawn() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shared = Arc::new(Mutex::new(Shared::default()));

        let handle = tokio::spawn(async move {
            let mut next_conn = 0u64;
            while let Ok((stream, _)) = listener.accept().await {
                next_conn += 1;
                tokio::spawn(handle_connection(next_conn, stream, Arc::clone(&shared)));
            }
        });

        Ok(Self { addr, handle })
    }

    pub fn target(&self) -> TargetConfig {
        TargetConfig::new(self.addr.ip().to_string(), self.addr.port())
    }

    /// Harness configuration pointing at this server, with a short read
    /// timeout.
    pub fn config(&self) -> Config {
        let mut config = Config::new(self.target());
        config.transport = TransportConfig::default().with_read_timeout(Duration::from_millis(100));
        config.capabilities.capabilities = vec!["message-tags".into(), "server-time".into()];
        config
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_connection(id: u64, stream: TcpStream, shared: Arc<Mutex<Shared>>) {
    let (read_half, mut write_half) = stream.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    shared.lock().await.clients.insert(
        id,
        ClientEntry {
            nick: None,
            user: false,
            registered: false,
            channels: HashSet::new(),
            tx,
        },
    );

    let writer = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if write_half.write_all(line.as_bytes()).await.is_err() {
                break;
            }
        }
        let _ = write_half.shutdown().await;
    });

    let mut lines = BufReader::new(read_half).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let Ok(message) = Message::parse(&line) else {
            continue;
        };
        let mut state = shared.lock().await;
        if !handle_message(id, &message, &mut state) {
            break;
        }
    }

    // Dropping the entry drops its sender, which ends the writer task.
    shared.lock().await.clients.remove(&id);
    let _ = writer.await;
}

fn server_message(command: &str) -> Message {
    Message::new(command).with_prefix(SERVER_NAME)
}

/// Returns false when the connection should close.
fn handle_message(id: u64, message: &Message, state: &mut Shared) -> bool {
    let Some(client) = state.clients.get_mut(&id) else {
        return false;
    };
    let command = message.command.to_ascii_uppercase();

    match command.as_str() {
        "NICK" => {
            client.nick = message.params.first().cloned();
            maybe_welcome(client);
        }
        "USER" => {
            client.user = true;
            maybe_welcome(client);
        }
        "PING" => {
            let token = message.params.first().cloned().unwrap_or_default();
            if client.registered {
                client.send(server_message("PONG").with_params([SERVER_NAME.to_string(), token]));
            } else {
                client.send(server_message("451").with_params(["*", "PING", "You have not registered"]));
            }
        }
        "JOIN" => {
            let Some(channel) = message.params.first().cloned() else {
                return true;
            };
            client.channels.insert(channel.clone());
            let join = Message::new("JOIN")
                .with_prefix(client.mask())
                .with_param(channel.clone());

            let members: Vec<String> = state
                .clients
                .values()
                .filter(|c| c.channels.contains(&channel))
                .map(|c| c.nick().to_string())
                .collect();
            for member in state.clients.values().filter(|c| c.channels.contains(&channel)) {
                member.send(join.clone());
            }

            if let Some(client) = state.clients.get(&id) {
                let nick = client.nick().to_string();
                client.send(server_message("353").with_params([
                    nick.clone(),
                    "=".to_string(),
                    channel.clone(),
                    members.join(" "),
                ]));
                client.send(server_message("366").with_params([
                    nick,
                    channel,
                    "End of /NAMES list".to_string(),
                ]));
            }
        }
        "PRIVMSG" | "NOTICE" => {
            let [target, text] = message.params.as_slice() else {
                return true;
            };
            state.next_id += 1;
            let Some(client) = state.clients.get(&id) else {
                return false;
            };
            let relayed = Message::new(command.as_str())
                .with_tag(
                    "time",
                    Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
                )
                .with_tag("msgid", Some(format!("mock{}", state.next_id)))
                .with_prefix(client.mask())
                .with_params([target.clone(), text.clone()]);

            for (other_id, other) in &state.clients {
                if *other_id != id && other.channels.contains(target) {
                    other.send(relayed.clone());
                }
            }
            state
                .history
                .entry(target.clone())
                .or_default()
                .push(relayed);
        }
        "CHATHISTORY" => {
            let (Some(target), Some(limit)) = (message.params.get(1), message.params.get(3)) else {
                return true;
            };
            let limit: usize = limit.parse().unwrap_or(0);
            let stored = state.history.get(target).map(Vec::as_slice).unwrap_or_default();
            let latest = &stored[stored.len().saturating_sub(limit)..];

            let open = server_message("BATCH").with_params(["+hist", "chathistory", target.as_str()]);
            client.send(open);
            for line in latest {
                let mut replayed = Message::new(line.command.as_str())
                    .with_tag("batch", Some("hist"))
                    .with_params(line.params.iter().cloned());
                for tag in &line.tags {
                    replayed.set_tag(tag.key(), tag.value().map(str::to_string));
                }
                if let Some(prefix) = &line.prefix {
                    replayed = replayed.with_prefix(prefix.as_str());
                }
                client.send(replayed);
            }
            client.send(server_message("BATCH").with_param("-hist"));
        }
        "QUIT" => {
            client.send(Message::new("ERROR").with_param("Closing link"));
            return false;
        }
        _ => {
            let nick = client.nick().to_string();
            client.send(server_message("421").with_params([
                nick,
                message.command.clone(),
                "Unknown command".to_string(),
            ]));
        }
    }
    true
}

fn maybe_welcome(client: &mut ClientEntry) {
    if client.registered || !client.user || client.nick.is_none() {
        return;
    }
    client.registered = true;
    let nick = client.nick().to_string();
    client.send(server_message("001").with_params([
        nick.clone(),
        format!("Welcome to the mock network {nick}"),
    ]));
    client.send(server_message("376").with_params([nick, "End of /MOTD command.".to_string()]));
}
