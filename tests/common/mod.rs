//! Integration test common infrastructure.
//!
//! Provides a scripted IRC server to point harness clients at, and helpers
//! for the registration dance every test starts with.

pub mod server;

#[allow(unused_imports)]
pub use server::MockServer;

use slirc_irctest::{SyncTransport, TestContext};

/// Connect and register `nick`, returning once the welcome burst is drained.
#[allow(dead_code)]
pub async fn registered_client(ctx: &TestContext, nick: &str) -> anyhow::Result<SyncTransport> {
    let mut client = ctx.connect(nick).await?;
    client.send_line(&format!("NICK {nick}")).await?;
    client.send_line(&format!("USER {nick} 0 * :{nick}")).await?;
    client
        .get_one_unsynchronized(|m| m.numeric() == Some(376))
        .await?;
    Ok(client)
}
