//! Boundary to the persistence and realtime service.
//!
//! The client never owns durable state; it queries a `MessageStore` and
//! listens to its insert notifications. `InMemoryStore` is a complete local
//! implementation used by the demo binary and the tests.

use chrono::Utc;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use crate::error::StoreError;
use crate::models::{ChannelId, Message, MessageId, NewMessage, Profile, UserId};

/// Queries, writes and realtime notifications offered by the chat service.
///
/// Calls may block; the backend runs them off its event loop.
pub trait MessageStore: Send + Sync {
    /// Top-level messages of a channel, newest first.
    fn fetch_top_level_page(
        &self,
        channel_id: ChannelId,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<Message>, StoreError>;

    /// All replies to `parent_id`, oldest first.
    fn fetch_replies(&self, parent_id: MessageId) -> Result<Vec<Message>, StoreError>;

    fn fetch_profiles(&self, user_ids: &[UserId]) -> Result<HashMap<UserId, Profile>, StoreError>;

    /// Write a message exactly as drafted and return the stored row.
    fn send_message(&self, draft: NewMessage) -> Result<Message, StoreError>;

    /// Receive every message inserted from now on, in any channel.
    fn subscribe(&self) -> Receiver<Message>;
}

#[derive(Default)]
struct Inner {
    /// Insertion order
    messages: Vec<Message>,
    profiles: HashMap<UserId, Profile>,
    subscribers: Vec<Sender<Message>>,
    unavailable: Option<String>,
    latency: Duration,
}

/// Process-local message store with realtime fan-out
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load existing history without notifying subscribers.
    pub fn seed(&self, messages: impl IntoIterator<Item = Message>) {
        self.lock().messages.extend(messages);
    }

    pub fn add_profile(&self, profile: Profile) {
        self.lock().profiles.insert(profile.id, profile);
    }

    /// Make every call fail with `StoreError::Unavailable` until cleared.
    pub fn set_unavailable(&self, reason: Option<String>) {
        self.lock().unavailable = reason;
    }

    /// Delay applied to every query.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    pub fn message_count(&self) -> usize {
        self.lock().messages.len()
    }

    /// Check availability and sleep for the configured latency without
    /// holding the lock.
    fn enter(&self) -> Result<(), StoreError> {
        let latency = {
            let inner = self.lock();
            if let Some(reason) = &inner.unavailable {
                return Err(StoreError::Unavailable(reason.clone()));
            }
            inner.latency
        };
        if !latency.is_zero() {
            thread::sleep(latency);
        }
        Ok(())
    }
}

impl MessageStore for InMemoryStore {
    fn fetch_top_level_page(
        &self,
        channel_id: ChannelId,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<Message>, StoreError> {
        self.enter()?;
        let inner = self.lock();
        let mut rows: Vec<(usize, &Message)> = inner
            .messages
            .iter()
            .enumerate()
            .filter(|(_, m)| m.channel_id == channel_id && m.is_top_level())
            .collect();
        rows.sort_by(|(ia, a), (ib, b)| (b.created_at, ib).cmp(&(a.created_at, ia)));
        Ok(rows
            .into_iter()
            .skip(offset)
            .take(page_size)
            .map(|(_, m)| m.clone())
            .collect())
    }

    fn fetch_replies(&self, parent_id: MessageId) -> Result<Vec<Message>, StoreError> {
        self.enter()?;
        let inner = self.lock();
        let mut replies: Vec<Message> = inner
            .messages
            .iter()
            .filter(|m| m.is_reply_to(parent_id))
            .cloned()
            .collect();
        replies.sort_by_key(|m| m.created_at);
        Ok(replies)
    }

    fn fetch_profiles(&self, user_ids: &[UserId]) -> Result<HashMap<UserId, Profile>, StoreError> {
        self.enter()?;
        let inner = self.lock();
        Ok(user_ids
            .iter()
            .filter_map(|id| inner.profiles.get(id).map(|p| (*id, p.clone())))
            .collect())
    }

    fn send_message(&self, draft: NewMessage) -> Result<Message, StoreError> {
        self.enter()?;
        let mut inner = self.lock();

        if let Some(parent_id) = draft.parent_id {
            let parent = inner
                .messages
                .iter_mut()
                .find(|m| m.id == parent_id)
                .ok_or(StoreError::NotFound)?;
            if !parent.is_top_level() {
                return Err(StoreError::Rejected(
                    "replies cannot have replies".to_string(),
                ));
            }
            if parent.channel_id != draft.channel_id {
                return Err(StoreError::Rejected(
                    "reply must be in the parent's channel".to_string(),
                ));
            }
            parent.reply_count += 1;
        }

        let now = Utc::now();
        let message = Message {
            id: MessageId::new(),
            channel_id: draft.channel_id,
            user_id: draft.user_id,
            content: draft.content,
            parent_id: draft.parent_id,
            reply_count: 0,
            created_at: now,
            updated_at: now,
        };
        inner.messages.push(message.clone());
        inner
            .subscribers
            .retain(|tx| tx.send(message.clone()).is_ok());
        Ok(message)
    }

    fn subscribe(&self) -> Receiver<Message> {
        let (tx, rx) = unbounded();
        self.lock().subscribers.push(tx);
        rx
    }
}
