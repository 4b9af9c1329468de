/// Backend submodules for store access and realtime forwarding
///
/// - `handlers`: runs one action against the store and reports the outcome
/// - `main_loop`: tokio event loop draining UI actions and store inserts
mod handlers;
mod main_loop;

// Re-export the main backend entry point
pub use main_loop::run_backend;
