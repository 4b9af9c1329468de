//! Message content classification and the auto-threading decision.

use serde::Serialize;

use super::patterns;
use super::PLAIN_LANGUAGE;
use crate::models::Message;

/// More lines than this makes a message "long"
const LONG_CONTENT_LINES: usize = 5;
/// More characters than this makes a message "long"
const LONG_CONTENT_CHARS: usize = 500;
/// More lines than this always goes to a thread
const THREAD_LINE_LIMIT: usize = 10;

/// What a message body looks like, derived from its text alone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    pub has_code: bool,
    pub language: Option<String>,
    pub is_error: bool,
    pub is_long_content: bool,
    pub should_thread: bool,
}

/// Number of newline-delimited lines; an empty string has one line.
pub fn line_count(content: &str) -> usize {
    content.matches('\n').count() + 1
}

/// Classify a message body.
///
/// Pure and deterministic: the result depends on `content` only.
pub fn analyze_content(content: &str) -> ContentAnalysis {
    let lines = line_count(content);
    let is_long_content = lines > LONG_CONTENT_LINES || content.chars().count() > LONG_CONTENT_CHARS;

    let has_code = patterns::looks_like_code(content);
    let is_error = patterns::looks_like_error(content);

    let mut language = match patterns::fence_language(content) {
        Some(tag) => Some(tag.to_string()),
        None => patterns::detect_language(content),
    };
    if is_error && language.is_none() {
        language = Some(PLAIN_LANGUAGE.to_string());
    }

    let should_thread = (has_code && is_long_content) || is_error || lines > THREAD_LINE_LIMIT;

    ContentAnalysis {
        has_code,
        language,
        is_error,
        is_long_content,
        should_thread,
    }
}

/// Whether a freshly sent message should open its thread right away.
///
/// Only top-level messages qualify; replies already live in a thread.
pub fn should_open_thread(message: &Message) -> bool {
    message.is_top_level() && analyze_content(&message.content).should_thread
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChannelId, MessageId, UserId};
    use chrono::Utc;

    fn message(content: &str, parent_id: Option<MessageId>) -> Message {
        let now = Utc::now();
        Message {
            id: MessageId::new(),
            channel_id: ChannelId::new(),
            user_id: UserId::new(),
            content: content.into(),
            parent_id,
            reply_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_content() {
        let analysis = analyze_content("");
        assert_eq!(
            analysis,
            ContentAnalysis {
                has_code: false,
                language: None,
                is_error: false,
                is_long_content: false,
                should_thread: false,
            }
        );
    }

    #[test]
    fn test_fenced_python() {
        let analysis = analyze_content("```python\nprint(1)\n```");
        assert!(analysis.has_code);
        assert_eq!(analysis.language.as_deref(), Some("python"));
        assert!(!analysis.is_error);
        assert!(!analysis.should_thread);
    }

    #[test]
    fn test_stack_trace_threads() {
        let analysis = analyze_content("TypeError: x is not a function\n at foo (a.js:1:1)");
        assert!(analysis.is_error);
        assert!(analysis.should_thread);
        assert_eq!(analysis.language.as_deref(), Some(PLAIN_LANGUAGE));
    }

    #[test]
    fn test_many_plain_lines_thread() {
        let content = (1..=12)
            .map(|i| format!("hello there number {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let analysis = analyze_content(&content);
        assert!(!analysis.has_code);
        assert!(!analysis.is_error);
        assert_eq!(analysis.language, None);
        assert!(analysis.is_long_content);
        assert!(analysis.should_thread);
    }

    #[test]
    fn test_short_code_stays_inline() {
        let analysis = analyze_content("let x = 1");
        assert!(analysis.has_code);
        assert_eq!(analysis.language.as_deref(), Some("javascript"));
        assert!(!analysis.is_long_content);
        assert!(!analysis.should_thread);
    }

    #[test]
    fn test_long_code_threads() {
        let content = "def main():\n    a = 1\n    b = 2\n    c = 3\n    d = 4\n    return a";
        let analysis = analyze_content(content);
        assert!(analysis.has_code);
        assert!(analysis.is_long_content);
        assert!(analysis.should_thread);
        assert_eq!(analysis.language.as_deref(), Some("python"));
    }

    #[test]
    fn test_long_single_line_is_long_content() {
        let analysis = analyze_content(&"a".repeat(501));
        assert!(analysis.is_long_content);
        assert!(!analysis.should_thread);
    }

    #[test]
    fn test_plain_language_only_for_errors() {
        assert_eq!(analyze_content("nice work").language, None);
        assert_eq!(
            analyze_content("build failed").language.as_deref(),
            Some(PLAIN_LANGUAGE)
        );
    }

    #[test]
    fn test_deterministic() {
        let samples = [
            "",
            "hello",
            "```rust\nfn main() {}\n```",
            "Traceback (most recent call last):\n  File \"a.py\"",
            "```a\nx\n``````b\ny\n```",
            "``````",
            "```sh\nls\n```\nthen ```py\nprint(1)",
            "```rust```",
            "héllo 👋\n```py\nprint('ünï')\n```\nfin ✓",
            "SELECT * FROM naïve_table;",
        ];
        let first: Vec<ContentAnalysis> = samples.iter().map(|s| analyze_content(s)).collect();
        // a second pass in reverse order must not see leftovers of the first
        let mut second: Vec<ContentAnalysis> =
            samples.iter().rev().map(|s| analyze_content(s)).collect();
        second.reverse();
        assert_eq!(first, second);
    }

    #[test]
    fn test_should_open_thread() {
        let trace = "Error: boom\n    at run (main.js:3:7)";
        assert!(should_open_thread(&message(trace, None)));
        assert!(!should_open_thread(&message("hi", None)));
        assert!(!should_open_thread(&message(trace, Some(MessageId::new()))));
    }

    #[test]
    fn test_line_count() {
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("a\nb"), 2);
        assert_eq!(line_count("a\n"), 2);
    }
}
