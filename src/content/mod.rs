//! Message content detection: code, error output, language and threading.
//!
//! - `patterns`: static signature tables
//! - `analysis`: per-message classification and the auto-thread decision
//! - `blocks`: splitting a body into plain and code segments

pub mod analysis;
pub mod blocks;
pub mod patterns;

/// Language tag used when a block or error has no recognisable language
pub const PLAIN_LANGUAGE: &str = "text";

pub use analysis::{analyze_content, line_count, should_open_thread, ContentAnalysis};
pub use blocks::{extract_blocks, is_plain_text, ContentBlock};
