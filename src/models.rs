//! Rows exchanged with the message store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_type!(
    /// Identity of a message row
    MessageId
);
id_type!(
    /// Identity of a channel
    ChannelId
);
id_type!(
    /// Identity of a user profile
    UserId
);

/// A chat message as stored by the backend.
///
/// `parent_id == None` marks a top-level message shown in the channel
/// timeline; anything else is a thread reply. Threads are one level deep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub user_id: UserId,
    /// Raw author-supplied text
    pub content: String,
    pub parent_id: Option<MessageId>,
    /// Number of direct replies, maintained by the server
    #[serde(default)]
    pub reply_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_reply_to(&self, parent: MessageId) -> bool {
        self.parent_id == Some(parent)
    }
}

/// Public profile of a chat user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub status: String,
}

impl Profile {
    /// Single uppercase letter shown in place of an avatar image
    pub fn initial(&self) -> char {
        self.username
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('?')
    }
}

/// A message that has not been written yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub channel_id: ChannelId,
    pub user_id: UserId,
    pub content: String,
    pub parent_id: Option<MessageId>,
}
