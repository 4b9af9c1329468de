//! Backend main event loop.

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use super::handlers;
use crate::protocol::{BackendAction, GuiEvent};
use crate::store::MessageStore;

/// How often the loop checks for new actions and inserts
const POLL_INTERVAL: Duration = Duration::from_millis(10);
/// Grace period for in-flight store calls when the loop stops
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Run the backend event loop on a tokio runtime.
///
/// Actions are dispatched concurrently, so a slow history page never holds
/// back realtime inserts. Returns after `BackendAction::Shutdown` or once
/// the UI side of `action_rx` is dropped.
pub fn run_backend(
    store: Arc<dyn MessageStore>,
    action_rx: Receiver<BackendAction>,
    event_tx: Sender<GuiEvent>,
    request_timeout: Duration,
) {
    // Create a Tokio runtime for this thread
    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            let _ = event_tx.send(GuiEvent::Error(format!(
                "Failed to create Tokio runtime: {}",
                e
            )));
            return;
        }
    };

    let loop_tx = event_tx.clone();
    rt.block_on(async move {
        let inserts = store.subscribe();
        info!("backend started");

        'outer: loop {
            // Check for actions from the UI (non-blocking)
            loop {
                match action_rx.try_recv() {
                    Ok(BackendAction::Shutdown) => break 'outer,
                    Ok(action) => {
                        tokio::spawn(handlers::handle_backend_action(
                            action,
                            store.clone(),
                            loop_tx.clone(),
                            request_timeout,
                        ));
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => break 'outer,
                }
            }

            // Forward realtime inserts in the order the store produced them
            while let Ok(message) = inserts.try_recv() {
                debug!(message = %message.id, channel = %message.channel_id, "realtime insert");
                if loop_tx.send(GuiEvent::MessageInserted(message)).is_err() {
                    break 'outer;
                }
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    });

    rt.shutdown_timeout(SHUTDOWN_GRACE);
    info!("backend stopped");
    let _ = event_tx.send(GuiEvent::Stopped);
}
