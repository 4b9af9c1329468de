//! Event pumping and user commands for ChatSession

use crossbeam_channel::RecvTimeoutError;
use std::time::{Duration, Instant};

use super::ChatSession;
use crate::error::ValidationError;
use crate::events::process_events;
use crate::models::{ChannelId, MessageId};
use crate::state::ClientState;

impl ChatSession {
    /// Apply every pending backend event and send the follow-up requests.
    ///
    /// Call once per UI frame. Returns whether anything was processed.
    pub fn pump(&mut self) -> bool {
        let actions = process_events(&self.event_rx, &mut self.state);
        let busy = !actions.is_empty();
        for action in actions {
            self.dispatch(action);
        }
        self.state.purge_old_notices(self.notice_ttl.as_secs());
        busy
    }

    /// Block until `done` holds for the state or `timeout` passes, applying
    /// events as they arrive. Returns the final value of `done`.
    pub fn pump_until<F>(&mut self, timeout: Duration, mut done: F) -> bool
    where
        F: FnMut(&ClientState) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if done(&self.state) {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.event_rx.recv_timeout(remaining) {
                Ok(event) => {
                    if let Some(action) = self.state.handle_event(event) {
                        self.dispatch(action);
                    }
                    self.pump();
                }
                Err(RecvTimeoutError::Timeout) => return done(&self.state),
                Err(RecvTimeoutError::Disconnected) => {
                    self.state.backend_running = false;
                    return done(&self.state);
                }
            }
        }
    }

    /// Show `channel_id` and start loading its newest page.
    pub fn select_channel(&mut self, channel_id: ChannelId) {
        if let Some(action) = self.state.select_channel(channel_id) {
            self.dispatch(action);
        }
    }

    /// Request the next older page. Returns `false` when a page is already
    /// loading, history is exhausted, or no channel is selected.
    pub fn load_older(&mut self) -> bool {
        match self.state.load_older() {
            Some(action) => {
                self.dispatch(action);
                true
            }
            None => false,
        }
    }

    /// Open the thread panel for a timeline message and load its replies.
    pub fn open_thread(&mut self, message_id: MessageId) -> bool {
        match self.state.open_thread_by_id(message_id) {
            Some(action) => {
                self.dispatch(action);
                true
            }
            None => false,
        }
    }

    pub fn close_thread(&mut self) {
        self.state.close_thread();
    }

    /// Send composer text to the active channel.
    pub fn send_message(&mut self, text: &str) -> Result<(), ValidationError> {
        let action = self.state.compose_message(text)?;
        self.dispatch(action);
        Ok(())
    }

    /// Send composer text as a reply in the open thread.
    pub fn send_reply(&mut self, text: &str) -> Result<(), ValidationError> {
        let action = self.state.compose_reply(text)?;
        self.dispatch(action);
        Ok(())
    }

    /// The message whose thread opened automatically after sending, if any.
    pub fn take_thread_signal(&mut self) -> Option<MessageId> {
        self.state.take_thread_signal()
    }
}
