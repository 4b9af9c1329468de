//! Session orchestration for a chat window.
//!
//! - `core`: `ChatSession` struct, backend startup and shutdown
//! - `events`: event pumping and user commands

pub mod core;
pub mod events;

// Re-export ChatSession for public API
pub use core::ChatSession;
