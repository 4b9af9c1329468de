//! DevChat client library.
//!
//! Content classification, channel timelines and threads for a team chat
//! client, plus the backend that keeps them in sync with the message store.

pub mod app;
pub mod backend;
pub mod config;
pub mod content;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod protocol;
pub mod state;
pub mod store;
pub mod thread;
pub mod timeline;
pub mod validation;
pub mod view;

#[cfg(test)]
mod integration_tests;
