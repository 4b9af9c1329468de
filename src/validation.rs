//! Composer input rules

use crate::error::ValidationError;

/// Default upper bound on message length, in characters
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 4000;

/// Trim what the user typed; the result is what gets sent.
pub fn normalize_message(msg: &str) -> &str {
    msg.trim()
}

/// Validates composer text before it is sent
pub fn validate_message(msg: &str, max_len: usize) -> Result<(), ValidationError> {
    if msg.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    let len = msg.chars().count();
    if len > max_len {
        return Err(ValidationError::TooLong { len, max: max_len });
    }

    Ok(())
}

/// Normalize and validate in one step.
pub fn prepare_message(msg: &str, max_len: usize) -> Result<String, ValidationError> {
    let text = normalize_message(msg);
    validate_message(text, max_len)?;
    Ok(text.to_string())
}
