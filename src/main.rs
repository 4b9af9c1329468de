//! DevChat client command line.
//!
//! - `classify`: read a message body from stdin and print how the client
//!   would present it, as JSON
//! - `demo`: run a session against an in-process store and print the
//!   resulting timeline

use anyhow::{bail, Context};
use chrono::{Local, Utc};
use serde_json::json;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use devchat_client::app::ChatSession;
use devchat_client::config::{load_settings, Settings};
use devchat_client::content::{analyze_content, extract_blocks};
use devchat_client::logging;
use devchat_client::models::{ChannelId, Message, MessageId, Profile, UserId};
use devchat_client::store::InMemoryStore;
use devchat_client::view::{
    author_name, date_divider_label, message_time_label, reply_count_label, shows_author,
    CodeBlockView, MessageBody,
};

/// How long the demo waits for any single backend round trip
const DEMO_WAIT: Duration = Duration::from_secs(5);

const USAGE: &str = "usage: devchat-client <classify|demo>";

fn main() -> anyhow::Result<()> {
    let loaded = load_settings();
    let settings = loaded.as_ref().cloned().unwrap_or_default();
    logging::init(&settings.log_filter);
    if let Err(e) = &loaded {
        warn!(error = %e, "using default settings");
    }

    let command = std::env::args().nth(1);
    match command.as_deref() {
        Some("classify") => classify(),
        Some("demo") => demo(&settings),
        Some(other) => bail!("unknown command `{}`\n{}", other, USAGE),
        None => bail!(USAGE),
    }
}

fn classify() -> anyhow::Result<()> {
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .context("failed to read message from stdin")?;

    let output = json!({
        "analysis": analyze_content(&content),
        "blocks": extract_blocks(&content),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn demo(settings: &Settings) -> anyhow::Result<()> {
    let store = Arc::new(InMemoryStore::new());
    let channel = ChannelId::new();
    let me = UserId::new();
    let teammate = UserId::new();
    store.add_profile(Profile {
        id: me,
        username: "you".into(),
        avatar_url: None,
        status: "online".into(),
    });
    store.add_profile(Profile {
        id: teammate,
        username: "sam".into(),
        avatar_url: None,
        status: "away".into(),
    });
    let now = Utc::now();
    store.seed([
        seeded(channel, teammate, "morning! deploy went out", now - chrono::Duration::days(1)),
        seeded(
            channel,
            teammate,
            "```sql\nSELECT id FROM builds WHERE status = 'failed';\n```",
            now - chrono::Duration::minutes(5),
        ),
    ]);

    let mut session = ChatSession::start(store, me, settings);
    session.select_channel(channel);
    let loaded = session.pump_until(DEMO_WAIT, |s| {
        s.timeline.as_ref().is_some_and(|t| !t.is_loading() && t.profiles.len() == 1)
    });
    if !loaded {
        bail!("timed out loading history");
    }

    session
        .send_message("TypeError: Cannot read property 'id' of undefined\n    at render (app.js:10:5)")
        .context("demo message was rejected")?;
    if !session.pump_until(DEMO_WAIT, |s| s.thread.is_some()) {
        bail!("timed out waiting for the sent message");
    }
    if let Some(id) = session.take_thread_signal() {
        info!(message = %id, "thread opened automatically");
    }
    session.pump_until(Duration::from_millis(200), |_| false);

    print_timeline(&session);
    for notice in &session.state.notices {
        println!("! {}: {}", notice.title, notice.detail);
    }
    session.shutdown();
    Ok(())
}

fn seeded(channel_id: ChannelId, user_id: UserId, content: &str, at: chrono::DateTime<Utc>) -> Message {
    Message {
        id: MessageId::new(),
        channel_id,
        user_id,
        content: content.into(),
        parent_id: None,
        reply_count: 0,
        created_at: at,
        updated_at: at,
    }
}

fn print_timeline(session: &ChatSession) {
    let Some(timeline) = session.state.timeline.as_ref() else {
        return;
    };
    let today = Local::now().date_naive();
    for group in timeline.day_groups(&Local) {
        println!("── {} ──", date_divider_label(group.date, today));
        let mut previous = None;
        for message in &group.messages {
            if shows_author(previous, message) {
                let local = message.created_at.with_timezone(&Local).naive_local();
                println!(
                    "{}  {}",
                    author_name(timeline.profiles.get(&message.user_id)),
                    message_time_label(local, today)
                );
            }
            print_body(&message.content);
            previous = Some(*message);
        }
    }
    if let Some(thread) = session.state.thread.as_ref() {
        println!(
            "[thread on {}: {}]",
            thread.parent_id(),
            reply_count_label(thread.reply_count())
        );
    }
}

fn print_body(content: &str) {
    match MessageBody::from_content(content) {
        MessageBody::Plain(text) => println!("    {}", text),
        MessageBody::Blocks(blocks) => {
            for block in &blocks {
                match CodeBlockView::from_block(block) {
                    Some(view) => {
                        println!("    [{} · {}]", view.language, view.line_label());
                        for line in view.code.lines() {
                            println!("    | {}", line);
                        }
                    }
                    None => println!("    {}", block.text),
                }
            }
        }
    }
}
