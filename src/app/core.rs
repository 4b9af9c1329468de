//! Core ChatSession struct definition and initialization

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{info, warn};

use crate::backend::run_backend;
use crate::config::Settings;
use crate::error::SyncError;
use crate::models::UserId;
use crate::protocol::{BackendAction, GuiEvent};
use crate::state::ClientState;
use crate::store::MessageStore;

/// One signed-in user's view of the chat service.
///
/// Owns the UI-side state and the backend thread that talks to the store.
/// Dropping the session stops the backend.
pub struct ChatSession {
    // Core state (timeline, thread, notices)
    pub state: ClientState,

    // Channels for backend communication
    pub(super) action_tx: Sender<BackendAction>,
    pub(super) event_rx: Receiver<GuiEvent>,

    pub(super) notice_ttl: Duration,
    backend: Option<JoinHandle<()>>,
}

impl ChatSession {
    /// Spawn the backend thread for `store` and return a session with no
    /// channel selected.
    pub fn start(store: Arc<dyn MessageStore>, user_id: UserId, settings: &Settings) -> Self {
        let (action_tx, action_rx) = unbounded::<BackendAction>();
        let (event_tx, event_rx) = unbounded::<GuiEvent>();

        // Start the backend thread with its own Tokio runtime
        let request_timeout = settings.request_timeout();
        let backend = thread::spawn(move || {
            run_backend(store, action_rx, event_tx, request_timeout);
        });
        info!(user = %user_id, "session started");

        let state = ClientState::new(user_id, settings.page_size())
            .with_max_message_len(settings.max_message_len);

        Self {
            state,
            action_tx,
            event_rx,
            notice_ttl: Duration::from_secs(settings.notice_ttl_secs),
            backend: Some(backend),
        }
    }

    /// Hand an action to the backend.
    ///
    /// When the backend is gone the request is failed locally, so loading
    /// flags are released and the user sees a notice.
    pub(super) fn dispatch(&mut self, action: BackendAction) {
        if let Err(err) = self.action_tx.send(action) {
            warn!("backend is gone; failing request locally");
            self.state.backend_running = false;
            if let Some(event) = failed_event(err.into_inner()) {
                let _ = self.state.handle_event(event);
            }
        }
    }

    /// Stop the backend and wait for its thread to exit.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.backend.take() else {
            return;
        };
        let _ = self.action_tx.send(BackendAction::Shutdown);
        if handle.join().is_err() {
            warn!("backend thread panicked");
        }
        // Pick up the final Stopped event
        while let Ok(event) = self.event_rx.try_recv() {
            let _ = self.state.handle_event(event);
        }
        self.state.backend_running = false;
        info!("session stopped");
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The completion event a request would have produced had the backend
/// been reachable.
fn failed_event(action: BackendAction) -> Option<GuiEvent> {
    let err = SyncError::BackendGone;
    match action {
        BackendAction::FetchPage(request) => Some(GuiEvent::PageLoaded {
            request,
            result: Err(err),
        }),
        BackendAction::FetchReplies(request) => Some(GuiEvent::RepliesLoaded {
            request,
            result: Err(err),
        }),
        BackendAction::SendMessage { request, draft } => Some(GuiEvent::MessageSent {
            request,
            draft,
            result: Err(err),
        }),
        BackendAction::FetchProfiles(request) => Some(GuiEvent::ProfilesLoaded {
            request,
            result: Err(err),
        }),
        BackendAction::Shutdown => None,
    }
}
