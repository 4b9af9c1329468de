use std::collections::HashMap;
use std::fmt;

use crate::error::SyncError;
use crate::models::{Message, NewMessage, Profile, UserId};
use crate::thread::RepliesRequest;
use crate::timeline::{PageRequest, ProfileRequest};

/// Tag attached to every outstanding request so a late result can be matched
/// against the state that asked for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Actions sent from the UI to the Backend
#[derive(Debug, Clone)]
pub enum BackendAction {
    /// Load one page of top-level history, newest first
    FetchPage(PageRequest),
    /// Load every reply of a thread, oldest first
    FetchReplies(RepliesRequest),
    /// Resolve author profiles
    FetchProfiles(ProfileRequest),
    /// Write a new message or reply
    SendMessage { request: RequestId, draft: NewMessage },
    /// Stop the backend loop
    Shutdown,
}

/// Events sent from the Backend to the UI
#[derive(Debug, Clone)]
pub enum GuiEvent {
    /// A history page finished (successfully or not)
    PageLoaded {
        request: PageRequest,
        result: Result<Vec<Message>, SyncError>,
    },
    /// A thread's replies finished loading
    RepliesLoaded {
        request: RepliesRequest,
        result: Result<Vec<Message>, SyncError>,
    },
    /// An author lookup finished
    ProfilesLoaded {
        request: ProfileRequest,
        result: Result<HashMap<UserId, Profile>, SyncError>,
    },
    /// The store accepted (or refused) a write
    MessageSent {
        request: RequestId,
        draft: NewMessage,
        result: Result<Message, SyncError>,
    },
    /// Realtime notification of a new row, any channel
    MessageInserted(Message),
    /// Backend-level failure not tied to a request
    Error(String),
    /// The backend loop exited
    Stopped,
}
