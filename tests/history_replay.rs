//! Live delivery and CHATHISTORY playback reduce to the same records.

mod common;

use common::{MockServer, registered_client};
use slirc_irctest::matcher::{Pattern, assert_matches};
use slirc_irctest::{HistoryRecord, TestContext, reduce_batch};

#[tokio::test]
async fn test_playback_matches_live_delivery() -> anyhow::Result<()> {
    let server = MockServer::spawn().await?;
    let ctx = TestContext::new(server.config());
    let mut alice = registered_client(&ctx, "alice").await?;
    let mut bob = registered_client(&ctx, "bob").await?;

    for client in [&mut alice, &mut bob] {
        client.send_line("JOIN #chan").await?;
        client.collect(true, true).await?;
    }
    alice.collect(true, false).await?;

    alice.send_line("PRIVMSG #chan :first").await?;
    alice.send_line("NOTICE #chan :second one").await?;
    alice.collect(true, false).await?;

    let live = bob.collect(true, true).await?;
    let live_records = live
        .iter()
        .map(HistoryRecord::reduce)
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(live_records.len(), 2);

    bob.send_line("CHATHISTORY LATEST #chan * 10").await?;
    let playback = bob.collect(true, true).await?;
    assert!(playback.first().is_some_and(|m| m.is_command("BATCH")));
    assert!(playback.iter().skip(1).take(2).all(|m| m.tag_value("batch") == Some("hist")));

    let replayed = reduce_batch(&playback)?;
    assert_eq!(replayed, live_records);

    assert_matches(
        &replayed[1],
        Pattern::partial_map([
            ("target", Pattern::from("#chan")),
            ("text", Pattern::from("second one")),
            ("msgid", Pattern::regex("mock[0-9]+")?),
        ]),
        "replayed NOTICE",
    )?;
    assert!(replayed[0].timestamp().is_some());

    alice.disconnect().await;
    bob.disconnect().await;
    Ok(())
}
