//! Error types shared by the store, backend and UI state.

use std::time::Duration;
use thiserror::Error;

/// Failures reported by the message store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("record not found")]
    NotFound,
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Why a backend request did not produce a result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("backend is not running")]
    BackendGone,
    #[error("backend worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the config directory")]
    NoConfigDir,
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("message cannot be empty")]
    Empty,
    #[error("message too long ({len} > {max} characters)")]
    TooLong { len: usize, max: usize },
    #[error("no channel selected")]
    NoChannel,
    #[error("no thread is open")]
    NoThread,
}
