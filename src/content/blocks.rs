//! Splits a message body into plain-text and code segments for display.

use serde::Serialize;

use super::analysis::analyze_content;
use super::patterns::FENCED_BLOCK_RE;
use super::PLAIN_LANGUAGE;

/// One display segment of a message body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    pub text: String,
    pub language: Option<String>,
    pub is_code_block: bool,
}

impl ContentBlock {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
            is_code_block: false,
        }
    }

    pub fn code(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: Some(language.into()),
            is_code_block: true,
        }
    }
}

/// Split `content` into ordered blocks.
///
/// Fenced regions become code blocks tagged with their fence language (or
/// the plain marker). Text around them becomes plain blocks, trimmed, with
/// empty spans dropped. Without any complete fence the whole message is one
/// block, code if the classifier sees code or an error. Never fails; an
/// unterminated fence just leaves the message unfenced.
pub fn extract_blocks(content: &str) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    let mut last_end = 0;
    let mut found_fence = false;

    for caps in FENCED_BLOCK_RE.captures_iter(content) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        found_fence = true;

        push_plain(&mut blocks, &content[last_end..whole.start()]);

        let body = caps.get(2).map_or("", |m| m.as_str()).trim();
        let language = caps.get(1).map_or(PLAIN_LANGUAGE, |m| m.as_str());
        blocks.push(ContentBlock::code(body, language));

        last_end = whole.end();
    }

    if found_fence {
        push_plain(&mut blocks, &content[last_end..]);
        return blocks;
    }

    let analysis = analyze_content(content);
    let text = content.trim();
    if analysis.has_code || analysis.is_error {
        let language = analysis.language.as_deref().unwrap_or(PLAIN_LANGUAGE);
        vec![ContentBlock::code(text, language)]
    } else {
        vec![ContentBlock::plain(text)]
    }
}

/// True when the message renders as a single run of plain text.
pub fn is_plain_text(blocks: &[ContentBlock]) -> bool {
    matches!(blocks, [only] if !only.is_code_block)
}

fn push_plain(blocks: &mut Vec<ContentBlock>, span: &str) {
    let text = span.trim();
    if !text.is_empty() {
        blocks.push(ContentBlock::plain(text));
    }
}
