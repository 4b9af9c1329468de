//! Paginated, live view of a channel's top-level messages.

use chrono::{NaiveDate, TimeZone};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

use crate::models::{ChannelId, Message, MessageId, Profile, UserId};
use crate::protocol::RequestId;

/// Messages fetched per history page
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// A history page the timeline is waiting for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub id: RequestId,
    pub channel_id: ChannelId,
    /// Number of top-level messages already held, newest first
    pub offset: usize,
    pub page_size: usize,
}

/// Consecutive messages sharing a calendar date
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup<'a> {
    pub date: NaiveDate,
    pub messages: Vec<&'a Message>,
}

/// An author lookup the timeline is waiting for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRequest {
    pub id: RequestId,
    pub channel_id: ChannelId,
    pub user_ids: Vec<UserId>,
}

/// Resolved author profiles keyed by user id, plus lookups in flight
#[derive(Debug, Default, Clone)]
pub struct ProfileCache {
    profiles: HashMap<UserId, Profile>,
    pending: HashSet<UserId>,
    lookups: HashSet<RequestId>,
}

impl ProfileCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &UserId) -> Option<&Profile> {
        self.profiles.get(user_id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn is_pending(&self, user_id: &UserId) -> bool {
        self.pending.contains(user_id)
    }

    /// Unique ids from `user_ids` that are neither cached nor being looked
    /// up, in first-seen order.
    pub fn missing(&self, user_ids: impl IntoIterator<Item = UserId>) -> Vec<UserId> {
        let mut seen = HashSet::new();
        user_ids
            .into_iter()
            .filter(|id| {
                !self.profiles.contains_key(id) && !self.pending.contains(id) && seen.insert(*id)
            })
            .collect()
    }

    pub fn extend(&mut self, profiles: HashMap<UserId, Profile>) {
        self.profiles.extend(profiles);
    }

    fn begin(&mut self, id: RequestId, user_ids: &[UserId]) {
        self.lookups.insert(id);
        self.pending.extend(user_ids.iter().copied());
    }

    /// Settle a lookup this cache started. Unknown requests are ignored.
    fn finish(&mut self, request: &ProfileRequest, profiles: Option<HashMap<UserId, Profile>>) -> bool {
        if !self.lookups.remove(&request.id) {
            return false;
        }
        for id in &request.user_ids {
            self.pending.remove(id);
        }
        if let Some(profiles) = profiles {
            self.extend(profiles);
        }
        true
    }
}

/// Top-level messages of the active channel, oldest first.
///
/// History pages only ever go to the front and live inserts only ever go
/// to the back. Every message is held at most once.
#[derive(Debug)]
pub struct TimelineState {
    channel_id: ChannelId,
    messages: VecDeque<Message>,
    ids: HashSet<MessageId>,
    page_size: usize,
    has_more: bool,
    pending: Option<RequestId>,
    /// Authors of the messages shown in this channel
    pub profiles: ProfileCache,
}

impl TimelineState {
    pub fn new(channel_id: ChannelId, page_size: usize) -> Self {
        Self {
            channel_id,
            messages: VecDeque::new(),
            ids: HashSet::new(),
            page_size: page_size.max(1),
            has_more: true,
            pending: None,
            profiles: ProfileCache::new(),
        }
    }

    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> + '_ {
        self.messages.iter()
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Start loading the next older page.
    ///
    /// Returns `None` while a page is already in flight or once history is
    /// exhausted.
    pub fn begin_load_older(&mut self, id: RequestId) -> Option<PageRequest> {
        if self.pending.is_some() || !self.has_more {
            return None;
        }
        self.pending = Some(id);
        Some(PageRequest {
            id,
            channel_id: self.channel_id,
            offset: self.messages.len(),
            page_size: self.page_size,
        })
    }

    /// Whether `request` is the page this timeline is currently waiting for.
    pub fn is_current(&self, request: &PageRequest) -> bool {
        request.channel_id == self.channel_id && self.pending == Some(request.id)
    }

    /// Prepend a page returned newest first.
    ///
    /// Returns the number of messages added, or `None` if the page belongs
    /// to a request this timeline no longer waits for.
    pub fn apply_page(&mut self, request: &PageRequest, page: Vec<Message>) -> Option<usize> {
        if !self.is_current(request) {
            debug!(request = %request.id, "ignoring stale history page");
            return None;
        }
        self.pending = None;
        self.has_more = page.len() >= request.page_size;

        let mut added = 0;
        for message in page {
            if message.channel_id != self.channel_id || !message.is_top_level() {
                continue;
            }
            if self.ids.insert(message.id) {
                self.messages.push_front(message);
                added += 1;
            }
        }
        Some(added)
    }

    /// Release the in-flight page after a failure.
    ///
    /// Messages and `has_more` stay as they were so the load can be retried.
    pub fn fail_page(&mut self, request: &PageRequest) -> bool {
        if !self.is_current(request) {
            return false;
        }
        self.pending = None;
        true
    }

    /// Append a live top-level message in arrival order.
    ///
    /// Replies, other channels and already-held messages are ignored.
    pub fn apply_insert(&mut self, message: Message) -> bool {
        if message.channel_id != self.channel_id || !message.is_top_level() {
            return false;
        }
        if !self.ids.insert(message.id) {
            debug!(message = %message.id, "dropping duplicate live message");
            return false;
        }
        self.messages.push_back(message);
        true
    }

    /// Start a lookup for the authors that are neither cached nor already
    /// requested. Returns `None` when there is nothing to fetch.
    pub fn begin_profile_lookup(
        &mut self,
        id: RequestId,
        authors: impl IntoIterator<Item = UserId>,
    ) -> Option<ProfileRequest> {
        let user_ids = self.profiles.missing(authors);
        if user_ids.is_empty() {
            return None;
        }
        self.profiles.begin(id, &user_ids);
        Some(ProfileRequest {
            id,
            channel_id: self.channel_id,
            user_ids,
        })
    }

    /// Merge a finished lookup. Returns `false` for a lookup started by
    /// another channel or an earlier visit to this one.
    pub fn apply_profiles(&mut self, request: &ProfileRequest, profiles: HashMap<UserId, Profile>) -> bool {
        if request.channel_id != self.channel_id {
            debug!(request = %request.id, "ignoring profiles for another channel");
            return false;
        }
        self.profiles.finish(request, Some(profiles))
    }

    /// Release a failed lookup so its authors can be requested again.
    pub fn fail_profiles(&mut self, request: &ProfileRequest) -> bool {
        request.channel_id == self.channel_id && self.profiles.finish(request, None)
    }

    /// Partition messages into runs sharing a calendar date in `tz`.
    pub fn day_groups<Tz: TimeZone>(&self, tz: &Tz) -> Vec<DayGroup<'_>> {
        let mut groups: Vec<DayGroup<'_>> = Vec::new();
        for message in &self.messages {
            let date = message.created_at.with_timezone(tz).date_naive();
            match groups.last_mut() {
                Some(group) if group.date == date => group.messages.push(message),
                _ => groups.push(DayGroup {
                    date,
                    messages: vec![message],
                }),
            }
        }
        groups
    }
}
