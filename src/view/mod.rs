//! Toolkit-independent display rules: how message bodies, dividers and
//! code blocks are presented.

pub mod code_block;
pub mod format;

pub use code_block::{highlight_language, CodeBlockView};
pub use format::{author_name, date_divider_label, message_time_label, reply_count_label, shows_author};

use crate::content::{extract_blocks, is_plain_text, ContentBlock};

/// A message body ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// Shown verbatim as one run of text
    Plain(String),
    Blocks(Vec<ContentBlock>),
}

impl MessageBody {
    pub fn from_content(content: &str) -> Self {
        let blocks = extract_blocks(content);
        if is_plain_text(&blocks) {
            Self::Plain(content.to_string())
        } else {
            Self::Blocks(blocks)
        }
    }
}
