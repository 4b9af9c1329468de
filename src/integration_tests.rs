//! Integration tests for devchat-client
//!
//! These tests drive full workflows through `ChatSession`: a real backend
//! thread, the in-memory store and the UI-side state together.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::app::ChatSession;
use crate::config::Settings;
use crate::error::ValidationError;
use crate::models::{ChannelId, Message, MessageId, NewMessage, Profile, UserId};
use crate::state::ClientState;
use crate::store::{InMemoryStore, MessageStore};

const WAIT: Duration = Duration::from_secs(5);

const STACK_TRACE: &str = "TypeError: Cannot read property 'name' of undefined\n    at render (app.js:12:7)";

fn settings(page_size: usize) -> Settings {
    Settings {
        page_size,
        ..Settings::default()
    }
}

fn seeded(channel_id: ChannelId, minutes_ago: i64, content: &str) -> Message {
    let at = Utc::now() - chrono::Duration::minutes(minutes_ago);
    Message {
        id: MessageId::new(),
        channel_id,
        user_id: UserId::new(),
        content: content.into(),
        parent_id: None,
        reply_count: 0,
        created_at: at,
        updated_at: at,
    }
}

fn page_settled(state: &ClientState) -> bool {
    state.timeline.as_ref().is_some_and(|t| !t.is_loading())
}

fn contents(state: &ClientState) -> Vec<String> {
    state
        .timeline
        .as_ref()
        .map(|t| t.messages().map(|m| m.content.clone()).collect())
        .unwrap_or_default()
}

fn timeline_len(state: &ClientState) -> usize {
    state.timeline.as_ref().map_or(0, |t| t.len())
}

/// Write as another user would, bypassing the session.
fn write_from_elsewhere(store: &InMemoryStore, channel_id: ChannelId, content: &str) -> Message {
    store
        .send_message(NewMessage {
            channel_id,
            user_id: UserId::new(),
            content: content.into(),
            parent_id: None,
        })
        .unwrap()
}

#[test]
fn test_empty_channel_then_live_insert() {
    let store = Arc::new(InMemoryStore::new());
    let channel = ChannelId::new();
    let mut session = ChatSession::start(store.clone(), UserId::new(), &settings(50));

    session.select_channel(channel);
    assert!(session.pump_until(WAIT, page_settled));
    let timeline = session.state.timeline.as_ref().unwrap();
    assert!(timeline.is_empty());
    assert!(!timeline.has_more());
    assert!(!session.load_older(), "nothing left to load");

    write_from_elsewhere(&store, channel, "first!");
    assert!(session.pump_until(WAIT, |s| timeline_len(s) == 1));
    assert_eq!(contents(&session.state), vec!["first!"]);
}

#[test]
fn test_paging_prepends_older_history() {
    let store = Arc::new(InMemoryStore::new());
    let channel = ChannelId::new();
    store.seed((1..=5).rev().map(|n| seeded(channel, n, &format!("m{}", 6 - n))));
    let mut session = ChatSession::start(store, UserId::new(), &settings(2));

    session.select_channel(channel);
    assert!(session.pump_until(WAIT, page_settled));
    assert_eq!(contents(&session.state), vec!["m4", "m5"]);
    assert!(session.state.timeline.as_ref().unwrap().has_more());

    assert!(session.load_older());
    // a second request while one is in flight is refused
    assert!(!session.load_older());
    assert!(session.pump_until(WAIT, page_settled));
    assert_eq!(contents(&session.state), vec!["m2", "m3", "m4", "m5"]);

    assert!(session.load_older());
    assert!(session.pump_until(WAIT, page_settled));
    assert_eq!(contents(&session.state), vec!["m1", "m2", "m3", "m4", "m5"]);
    assert!(!session.state.timeline.as_ref().unwrap().has_more());
}

#[test]
fn test_profiles_are_resolved_for_authors() {
    let store = Arc::new(InMemoryStore::new());
    let channel = ChannelId::new();
    let message = seeded(channel, 1, "hello");
    store.add_profile(Profile {
        id: message.user_id,
        username: "grace".into(),
        avatar_url: None,
        status: "online".into(),
    });
    store.seed([message.clone()]);
    let mut session = ChatSession::start(store, UserId::new(), &settings(50));

    session.select_channel(channel);
    assert!(session.pump_until(WAIT, |s| {
        s.timeline.as_ref().is_some_and(|t| !t.profiles.is_empty())
    }));
    let timeline = session.state.timeline.as_ref().unwrap();
    assert_eq!(timeline.profiles.get(&message.user_id).unwrap().username, "grace");
}

#[test]
fn test_sending_a_stack_trace_opens_its_thread() {
    let store = Arc::new(InMemoryStore::new());
    let channel = ChannelId::new();
    let mut session = ChatSession::start(store, UserId::new(), &settings(50));
    session.select_channel(channel);
    assert!(session.pump_until(WAIT, page_settled));

    session.send_message(STACK_TRACE).unwrap();
    assert!(session.pump_until(WAIT, |s| s.thread.is_some() && timeline_len(s) == 1));

    let opened = session.take_thread_signal().expect("thread signal");
    assert_eq!(session.take_thread_signal(), None);
    let thread = session.state.thread.as_ref().unwrap();
    assert_eq!(thread.parent_id(), opened);
    assert_eq!(thread.reply_count(), 0);
    assert!(!thread.is_loading());
    assert_eq!(session.state.timeline.as_ref().unwrap().message(opened).unwrap().content, STACK_TRACE);
}

#[test]
fn test_send_slower_than_request_timeout_still_opens_thread() {
    let store = Arc::new(InMemoryStore::new());
    let channel = ChannelId::new();
    let settings = Settings {
        request_timeout_secs: 1,
        ..settings(50)
    };
    let mut session = ChatSession::start(store.clone(), UserId::new(), &settings);
    session.select_channel(channel);
    assert!(session.pump_until(WAIT, page_settled));

    store.set_latency(Duration::from_millis(1500));
    session.send_message(STACK_TRACE).unwrap();
    assert!(session.pump_until(WAIT, |s| s.thread.is_some() && timeline_len(s) == 1));

    assert!(session.state.notices.is_empty(), "{:?}", session.state.notices);
    assert!(session.take_thread_signal().is_some());
    assert_eq!(store.message_count(), 1);
}

#[test]
fn test_sending_small_talk_leaves_thread_closed() {
    let store = Arc::new(InMemoryStore::new());
    let channel = ChannelId::new();
    let mut session = ChatSession::start(store, UserId::new(), &settings(50));
    session.select_channel(channel);
    assert!(session.pump_until(WAIT, page_settled));

    session.send_message("  lunch at noon?  ").unwrap();
    assert!(session.pump_until(WAIT, |s| timeline_len(s) == 1));
    assert_eq!(contents(&session.state), vec!["lunch at noon?"]);
    assert!(session.state.thread.is_none());
    assert_eq!(session.take_thread_signal(), None);
}

#[test]
fn test_rapid_sends_keep_arrival_order() {
    let store = Arc::new(InMemoryStore::new());
    let channel = ChannelId::new();
    let mut session = ChatSession::start(store.clone(), UserId::new(), &settings(50));
    session.select_channel(channel);
    assert!(session.pump_until(WAIT, page_settled));

    write_from_elsewhere(&store, channel, "one");
    write_from_elsewhere(&store, channel, "two");
    assert!(session.pump_until(WAIT, |s| timeline_len(s) == 2));
    assert_eq!(contents(&session.state), vec!["one", "two"]);
}

#[test]
fn test_switching_channels_discards_stale_page() {
    let store = Arc::new(InMemoryStore::new());
    let first = ChannelId::new();
    let second = ChannelId::new();
    store.seed([seeded(first, 2, "in first"), seeded(second, 1, "in second")]);
    store.set_latency(Duration::from_millis(100));
    let mut session = ChatSession::start(store, UserId::new(), &settings(50));

    session.select_channel(first);
    session.select_channel(second);
    assert!(session.pump_until(WAIT, page_settled));
    // the first channel's page arrives too, and must be ignored
    session.pump_until(Duration::from_millis(300), |_| false);

    assert_eq!(session.state.active_channel(), Some(second));
    assert_eq!(contents(&session.state), vec!["in second"]);
}

#[test]
fn test_inserts_for_other_channels_are_ignored() {
    let store = Arc::new(InMemoryStore::new());
    let channel = ChannelId::new();
    let mut session = ChatSession::start(store.clone(), UserId::new(), &settings(50));
    session.select_channel(channel);
    assert!(session.pump_until(WAIT, page_settled));

    write_from_elsewhere(&store, ChannelId::new(), "elsewhere");
    write_from_elsewhere(&store, channel, "here");
    assert!(session.pump_until(WAIT, |s| timeline_len(s) == 1));
    session.pump_until(Duration::from_millis(100), |_| false);
    assert_eq!(contents(&session.state), vec!["here"]);
}

#[test]
fn test_reply_arrives_in_open_thread() {
    let store = Arc::new(InMemoryStore::new());
    let channel = ChannelId::new();
    let parent = seeded(channel, 5, "who owns the build?");
    store.seed([parent.clone()]);
    let mut session = ChatSession::start(store, UserId::new(), &settings(50));
    session.select_channel(channel);
    assert!(session.pump_until(WAIT, page_settled));

    assert!(session.open_thread(parent.id));
    assert!(session.pump_until(WAIT, |s| s.thread.as_ref().is_some_and(|t| !t.is_loading())));
    assert_eq!(session.state.thread.as_ref().unwrap().reply_count(), 0);

    session.send_reply("me").unwrap();
    assert!(session.pump_until(WAIT, |s| {
        s.thread.as_ref().is_some_and(|t| t.reply_count() == 1)
    }));
    let thread = session.state.thread.as_ref().unwrap();
    assert_eq!(thread.replies()[0].content, "me");
    assert_eq!(thread.replies()[0].parent_id, Some(parent.id));
    // replies never show up in the channel timeline
    assert_eq!(contents(&session.state), vec!["who owns the build?"]);
}

#[test]
fn test_rejected_input_sends_nothing() {
    let store = Arc::new(InMemoryStore::new());
    let mut session = ChatSession::start(store.clone(), UserId::new(), &settings(50));

    assert_eq!(session.send_message("hi"), Err(ValidationError::NoChannel));
    session.select_channel(ChannelId::new());
    assert_eq!(session.send_message("   \n "), Err(ValidationError::Empty));
    assert_eq!(session.send_reply("hi"), Err(ValidationError::NoThread));

    session.pump_until(Duration::from_millis(100), |_| false);
    assert_eq!(store.message_count(), 0);
}

#[test]
fn test_store_outage_surfaces_notice() {
    let store = Arc::new(InMemoryStore::new());
    store.set_unavailable(Some("offline".into()));
    let mut session = ChatSession::start(store.clone(), UserId::new(), &settings(50));

    session.select_channel(ChannelId::new());
    assert!(session.pump_until(WAIT, |s| !s.notices.is_empty()));
    assert_eq!(session.state.notices[0].title, "Error loading messages");
    assert!(page_settled(&session.state));

    // retry once the store is back
    store.set_unavailable(None);
    assert!(session.load_older());
    assert!(session.pump_until(WAIT, page_settled));
    assert!(!session.state.timeline.as_ref().unwrap().has_more());
}

#[test]
fn test_requests_after_shutdown_fail_locally() {
    let store = Arc::new(InMemoryStore::new());
    let mut session = ChatSession::start(store, UserId::new(), &settings(50));
    session.shutdown();
    assert!(!session.state.backend_running);

    session.select_channel(ChannelId::new());
    assert!(page_settled(&session.state));
    assert_eq!(session.state.notices.len(), 1);
    assert_eq!(session.state.notices[0].title, "Error loading messages");
}
