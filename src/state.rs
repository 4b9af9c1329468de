//! Core client state, separated from any UI toolkit.
//!
//! `ClientState` holds everything a chat window shows for the active
//! channel: the timeline, the open thread, pending notices and the
//! auto-open signal. Its methods return the backend actions they need
//! instead of sending them, so every decision is testable without threads.

use std::time::Instant;
use tracing::{debug, info};

use crate::content::should_open_thread;
use crate::error::ValidationError;
use crate::models::{ChannelId, Message, MessageId, NewMessage, UserId};
use crate::protocol::{BackendAction, RequestId};
use crate::thread::ThreadState;
use crate::timeline::TimelineState;
use crate::validation::{prepare_message, DEFAULT_MAX_MESSAGE_LEN};

/// A user-visible, dismissable error or status line
#[derive(Debug, Clone)]
pub struct Notice {
    pub title: String,
    pub detail: String,
    pub created: Instant,
}

/// Core application state for the chat client.
#[derive(Debug)]
pub struct ClientState {
    /// The signed-in user; author of everything sent from here.
    pub user_id: UserId,

    /// Whether the backend loop is still running.
    pub backend_running: bool,

    /// Timeline of the active channel, if one is selected.
    pub timeline: Option<TimelineState>,

    /// The open thread panel, if any.
    pub thread: Option<ThreadState>,

    /// Error toasts with creation time (auto-expire).
    pub notices: Vec<Notice>,

    page_size: usize,
    max_message_len: usize,
    next_request: u64,
    thread_signal: Option<MessageId>,
}

impl ClientState {
    /// Create a new ClientState with no channel selected.
    pub fn new(user_id: UserId, page_size: usize) -> Self {
        Self {
            user_id,
            backend_running: true,
            timeline: None,
            thread: None,
            notices: Vec::new(),
            page_size,
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            next_request: 0,
            thread_signal: None,
        }
    }

    pub fn with_max_message_len(mut self, max_len: usize) -> Self {
        self.max_message_len = max_len;
        self
    }

    pub(crate) fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    pub fn active_channel(&self) -> Option<ChannelId> {
        self.timeline.as_ref().map(|t| t.channel_id())
    }

    /// Switch to `channel_id`, dropping all state of the previous channel
    /// and its thread, and request the newest page.
    pub fn select_channel(&mut self, channel_id: ChannelId) -> Option<BackendAction> {
        info!(channel = %channel_id, "switching channel");
        self.thread = None;
        self.timeline = Some(TimelineState::new(channel_id, self.page_size));
        self.load_older()
    }

    pub fn leave_channel(&mut self) {
        self.thread = None;
        self.timeline = None;
    }

    /// Request the next older page, unless one is in flight or history is
    /// exhausted.
    pub fn load_older(&mut self) -> Option<BackendAction> {
        let id = self.next_request_id();
        let request = self.timeline.as_mut()?.begin_load_older(id)?;
        Some(BackendAction::FetchPage(request))
    }

    /// Open the thread panel for a top-level message and request its
    /// replies. Replies cannot be opened as threads.
    pub fn open_thread(&mut self, parent: Message) -> Option<BackendAction> {
        if !parent.is_top_level() {
            debug!(message = %parent.id, "refusing to open a thread on a reply");
            return None;
        }
        let id = self.next_request_id();
        let (thread, request) = ThreadState::open(parent, id);
        self.thread = Some(thread);
        Some(BackendAction::FetchReplies(request))
    }

    /// Open the thread of a message currently in the timeline.
    pub fn open_thread_by_id(&mut self, message_id: MessageId) -> Option<BackendAction> {
        let parent = self.timeline.as_ref()?.message(message_id)?.clone();
        self.open_thread(parent)
    }

    pub fn close_thread(&mut self) {
        self.thread = None;
    }

    /// Build the send action for composer text in the active channel.
    ///
    /// The text is trimmed and validated; nothing is added to the timeline
    /// until the store's realtime insert comes back.
    pub fn compose_message(&mut self, text: &str) -> Result<BackendAction, ValidationError> {
        let channel_id = self.active_channel().ok_or(ValidationError::NoChannel)?;
        let content = prepare_message(text, self.max_message_len)?;
        let draft = NewMessage {
            channel_id,
            user_id: self.user_id,
            content,
            parent_id: None,
        };
        Ok(BackendAction::SendMessage {
            request: self.next_request_id(),
            draft,
        })
    }

    /// Build the send action for a reply in the open thread.
    pub fn compose_reply(&mut self, text: &str) -> Result<BackendAction, ValidationError> {
        let content = prepare_message(text, self.max_message_len)?;
        let draft = self
            .thread
            .as_ref()
            .ok_or(ValidationError::NoThread)?
            .draft_reply(self.user_id, content);
        Ok(BackendAction::SendMessage {
            request: self.next_request_id(),
            draft,
        })
    }

    /// Record a successful top-level send and decide whether its thread
    /// opens right away.
    ///
    /// Returns `true` when the thread panel was opened on `message`. The
    /// decision is also kept as a one-shot signal for `take_thread_signal`.
    pub fn complete_send(&mut self, message: Message) -> bool {
        if self.active_channel() != Some(message.channel_id) || !should_open_thread(&message) {
            return false;
        }
        info!(message = %message.id, "auto-opening thread");
        self.thread_signal = Some(message.id);
        self.thread = Some(ThreadState::open_fresh(message));
        true
    }

    /// The message whose thread was auto-opened since the last call.
    pub fn take_thread_signal(&mut self) -> Option<MessageId> {
        self.thread_signal.take()
    }

    pub fn notify(&mut self, title: impl Into<String>, detail: impl Into<String>) {
        self.notices.push(Notice {
            title: title.into(),
            detail: detail.into(),
            created: Instant::now(),
        });
    }

    /// Purge notices older than the given duration.
    pub fn purge_old_notices(&mut self, max_age_secs: u64) {
        self.notices
            .retain(|n| n.created.elapsed().as_secs() < max_age_secs);
    }
}
