//! Execution of UI actions against the message store.
//!
//! Every action that carries a request produces exactly one completion
//! event, success or not, so the UI can always clear its loading state.

use crossbeam_channel::Sender;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{StoreError, SyncError};
use crate::protocol::{BackendAction, GuiEvent};
use crate::store::MessageStore;

/// Run a blocking store call on the blocking pool.
///
/// With a `limit`, the wait is abandoned after that long; the call itself
/// keeps running, so only reads are bounded.
async fn call_store<T, F>(
    store: Arc<dyn MessageStore>,
    limit: Option<Duration>,
    f: F,
) -> Result<T, SyncError>
where
    T: Send + 'static,
    F: FnOnce(&dyn MessageStore) -> Result<T, StoreError> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(move || f(store.as_ref()));
    let joined = match limit {
        Some(limit) => match timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => return Err(SyncError::Timeout(limit)),
        },
        None => task.await,
    };
    match joined {
        Ok(result) => result.map_err(SyncError::from),
        Err(join_err) => Err(SyncError::Worker(join_err.to_string())),
    }
}

/// Handle one action from the UI and report the outcome on `event_tx`.
pub async fn handle_backend_action(
    action: BackendAction,
    store: Arc<dyn MessageStore>,
    event_tx: Sender<GuiEvent>,
    limit: Duration,
) {
    match action {
        BackendAction::FetchPage(request) => {
            let (channel_id, offset, page_size) =
                (request.channel_id, request.offset, request.page_size);
            let result = call_store(store, Some(limit), move |s| {
                s.fetch_top_level_page(channel_id, offset, page_size)
            })
            .await;
            match &result {
                Ok(page) => debug!(request = %request.id, count = page.len(), "history page loaded"),
                Err(e) => warn!(request = %request.id, error = %e, "history page failed"),
            }
            let _ = event_tx.send(GuiEvent::PageLoaded { request, result });
        }

        BackendAction::FetchReplies(request) => {
            let parent_id = request.parent_id;
            let result = call_store(store, Some(limit), move |s| s.fetch_replies(parent_id)).await;
            if let Err(e) = &result {
                warn!(request = %request.id, error = %e, "thread replies failed");
            }
            let _ = event_tx.send(GuiEvent::RepliesLoaded { request, result });
        }

        BackendAction::FetchProfiles(request) => {
            let user_ids = request.user_ids.clone();
            let result =
                call_store(store, Some(limit), move |s| s.fetch_profiles(&user_ids)).await;
            if let Err(e) = &result {
                warn!(request = %request.id, error = %e, "profile lookup failed");
            }
            let _ = event_tx.send(GuiEvent::ProfilesLoaded { request, result });
        }

        BackendAction::SendMessage { request, draft } => {
            let outgoing = draft.clone();
            // Writes are never abandoned mid-flight
            let result = call_store(store, None, move |s| s.send_message(outgoing)).await;
            if let Err(e) = &result {
                warn!(request = %request, error = %e, "send failed");
            }
            let _ = event_tx.send(GuiEvent::MessageSent {
                request,
                draft,
                result,
            });
        }

        // The main loop consumes shutdown before dispatching
        BackendAction::Shutdown => {}
    }
}
