//! Backend event processing (history pages, replies, profiles, sends and
//! realtime inserts).

use crossbeam_channel::Receiver;
use tracing::{debug, warn};

use crate::models::UserId;
use crate::protocol::{BackendAction, GuiEvent};
use crate::state::ClientState;

/// Process all pending events from the backend.
///
/// Returns the follow-up actions (profile lookups) the caller must send.
pub fn process_events(event_rx: &Receiver<GuiEvent>, state: &mut ClientState) -> Vec<BackendAction> {
    let mut actions = Vec::new();
    // Drain all pending events from the backend
    while let Ok(event) = event_rx.try_recv() {
        actions.extend(state.handle_event(event));
    }
    actions
}

impl ClientState {
    /// Apply one backend event.
    ///
    /// Results for a channel or thread that is no longer active are dropped.
    pub fn handle_event(&mut self, event: GuiEvent) -> Option<BackendAction> {
        match event {
            GuiEvent::PageLoaded { request, result } => {
                let timeline = match self.timeline.as_mut() {
                    Some(t) if t.is_current(&request) => t,
                    _ => {
                        debug!(request = %request.id, "dropping page for inactive channel");
                        return None;
                    }
                };
                match result {
                    Ok(page) => {
                        let authors: Vec<UserId> = page.iter().map(|m| m.user_id).collect();
                        timeline.apply_page(&request, page);
                        self.request_profiles(authors)
                    }
                    Err(e) => {
                        timeline.fail_page(&request);
                        self.notify("Error loading messages", e.to_string());
                        None
                    }
                }
            }

            GuiEvent::RepliesLoaded { request, result } => {
                let thread = match self.thread.as_mut() {
                    Some(t) if t.is_current(&request) => t,
                    _ => {
                        debug!(request = %request.id, "dropping replies for closed thread");
                        return None;
                    }
                };
                match result {
                    Ok(replies) => {
                        let authors: Vec<UserId> = replies.iter().map(|m| m.user_id).collect();
                        thread.apply_replies(&request, replies);
                        self.request_profiles(authors)
                    }
                    Err(e) => {
                        thread.fail_replies(&request);
                        self.notify("Error loading replies", e.to_string());
                        None
                    }
                }
            }

            GuiEvent::ProfilesLoaded { request, result } => {
                let Some(timeline) = self.timeline.as_mut() else {
                    return None;
                };
                match result {
                    Ok(profiles) => {
                        timeline.apply_profiles(&request, profiles);
                    }
                    // Missing names fall back to "Unknown"; not worth a toast
                    Err(e) => {
                        warn!(request = %request.id, error = %e, "profile lookup failed");
                        timeline.fail_profiles(&request);
                    }
                }
                None
            }

            GuiEvent::MessageSent {
                request,
                draft,
                result,
            } => {
                match result {
                    Ok(message) => {
                        debug!(request = %request, message = %message.id, "message stored");
                        if message.is_top_level() {
                            self.complete_send(message);
                        }
                    }
                    Err(e) => {
                        let title = if draft.parent_id.is_some() {
                            "Error sending reply"
                        } else {
                            "Error sending message"
                        };
                        self.notify(title, e.to_string());
                    }
                }
                None
            }

            GuiEvent::MessageInserted(message) => {
                let author = message.user_id;
                let applied = if message.is_top_level() {
                    self.timeline
                        .as_mut()
                        .is_some_and(|t| t.apply_insert(message))
                } else {
                    self.thread
                        .as_mut()
                        .is_some_and(|t| t.apply_insert(message))
                };
                if applied {
                    self.request_profiles([author])
                } else {
                    None
                }
            }

            GuiEvent::Error(msg) => {
                self.notify("Error", msg);
                None
            }

            GuiEvent::Stopped => {
                self.backend_running = false;
                None
            }
        }
    }

    /// Lookup action for the authors neither cached nor already requested.
    fn request_profiles(&mut self, authors: impl IntoIterator<Item = UserId>) -> Option<BackendAction> {
        let id = self.next_request_id();
        let request = self.timeline.as_mut()?.begin_profile_lookup(id, authors)?;
        Some(BackendAction::FetchProfiles(request))
    }
}
