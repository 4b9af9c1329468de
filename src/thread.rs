//! Reply list of the one open thread.

use std::collections::HashSet;
use tracing::debug;

use crate::models::{Message, MessageId, NewMessage, UserId};
use crate::protocol::RequestId;

/// Replies the thread panel is waiting for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepliesRequest {
    pub id: RequestId,
    pub parent_id: MessageId,
}

/// A parent message and its replies, oldest first.
///
/// Replies are never paginated. Sending a reply does not touch this state;
/// the reply shows up once the realtime insert arrives.
#[derive(Debug)]
pub struct ThreadState {
    parent: Message,
    replies: Vec<Message>,
    ids: HashSet<MessageId>,
    pending: Option<RequestId>,
}

impl ThreadState {
    /// Open a thread and return the request that loads its replies.
    pub fn open(parent: Message, id: RequestId) -> (Self, RepliesRequest) {
        let request = RepliesRequest {
            id,
            parent_id: parent.id,
        };
        let state = Self {
            parent,
            replies: Vec::new(),
            ids: HashSet::new(),
            pending: Some(id),
        };
        (state, request)
    }

    /// Open a thread for a message that was just written and cannot have
    /// replies yet.
    pub fn open_fresh(parent: Message) -> Self {
        Self {
            parent,
            replies: Vec::new(),
            ids: HashSet::new(),
            pending: None,
        }
    }

    pub fn parent(&self) -> &Message {
        &self.parent
    }

    pub fn parent_id(&self) -> MessageId {
        self.parent.id
    }

    pub fn replies(&self) -> &[Message] {
        &self.replies
    }

    pub fn reply_count(&self) -> usize {
        self.replies.len()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_current(&self, request: &RepliesRequest) -> bool {
        request.parent_id == self.parent.id && self.pending == Some(request.id)
    }

    /// Merge the loaded replies with any that arrived live in the meantime.
    ///
    /// Returns `None` for a result this thread no longer waits for.
    pub fn apply_replies(&mut self, request: &RepliesRequest, loaded: Vec<Message>) -> Option<usize> {
        if !self.is_current(request) {
            debug!(request = %request.id, "ignoring stale thread replies");
            return None;
        }
        self.pending = None;

        let mut added = 0;
        for reply in loaded {
            if reply.is_reply_to(self.parent.id) && self.ids.insert(reply.id) {
                self.replies.push(reply);
                added += 1;
            }
        }
        self.replies.sort_by_key(|r| r.created_at);
        Some(added)
    }

    pub fn fail_replies(&mut self, request: &RepliesRequest) -> bool {
        if !self.is_current(request) {
            return false;
        }
        self.pending = None;
        true
    }

    /// Append a live reply to the open parent.
    pub fn apply_insert(&mut self, reply: Message) -> bool {
        if !reply.is_reply_to(self.parent.id) {
            return false;
        }
        if !self.ids.insert(reply.id) {
            debug!(message = %reply.id, "dropping duplicate live reply");
            return false;
        }
        self.replies.push(reply);
        true
    }

    /// Draft of a reply in the parent's channel.
    pub fn draft_reply(&self, user_id: UserId, content: String) -> NewMessage {
        NewMessage {
            channel_id: self.parent.channel_id,
            user_id,
            content,
            parent_id: Some(self.parent.id),
        }
    }
}
