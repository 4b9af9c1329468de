//! Presentation rules for code blocks.

use crate::content::{line_count, ContentBlock, PLAIN_LANGUAGE};

/// Blocks longer than this can be collapsed
const COLLAPSIBLE_LINES: usize = 10;
/// Blocks longer than this start collapsed
const AUTO_COLLAPSE_LINES: usize = 20;
/// The collapse toggle only appears past this many lines
const TOGGLE_MIN_LINES: usize = 5;

/// Highlighter grammar for a language tag; unknown tags fall back to bash.
pub fn highlight_language(language: &str) -> &'static str {
    match language.to_lowercase().as_str() {
        "typescript" | "ts" => "tsx",
        "javascript" | "js" => "jsx",
        "python" | "py" => "python",
        "bash" | "shell" | "sh" => "bash",
        "json" => "json",
        "html" | "xml" => "markup",
        "css" | "scss" => "css",
        "sql" => "sql",
        "java" => "java",
        "cpp" => "cpp",
        "c" => "c",
        _ => "bash",
    }
}

/// Everything the UI needs to draw one code block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockView<'a> {
    pub code: &'a str,
    /// Lowercased tag shown in the block header
    pub language: String,
    pub highlight: &'static str,
    pub line_count: usize,
    pub is_collapsible: bool,
    pub default_collapsed: bool,
}

impl<'a> CodeBlockView<'a> {
    pub fn new(code: &'a str, language: Option<&str>) -> Self {
        let language = language.unwrap_or(PLAIN_LANGUAGE).to_lowercase();
        let lines = line_count(code);
        Self {
            code,
            highlight: highlight_language(&language),
            language,
            line_count: lines,
            is_collapsible: lines > COLLAPSIBLE_LINES,
            default_collapsed: lines > AUTO_COLLAPSE_LINES,
        }
    }

    /// `None` for plain-text blocks.
    pub fn from_block(block: &'a ContentBlock) -> Option<Self> {
        block
            .is_code_block
            .then(|| Self::new(&block.text, block.language.as_deref()))
    }

    pub fn shows_collapse_toggle(&self) -> bool {
        self.is_collapsible && self.line_count > TOGGLE_MIN_LINES
    }

    pub fn line_label(&self) -> String {
        if self.line_count == 1 {
            "1 line".to_string()
        } else {
            format!("{} lines", self.line_count)
        }
    }

    pub fn expand_hint(&self) -> String {
        format!("Click to expand {} lines...", self.line_count)
    }
}
