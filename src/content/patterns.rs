//! Signature tables used to recognise code, error output and languages.
//!
//! All matching goes through the `regex` crate, which runs in time linear in
//! the input, so arbitrarily large message bodies cannot trigger runaway
//! backtracking.

use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};

/// Markers that suggest a message contains source code.
const CODE_PATTERNS: &[&str] = &[
    // fenced block
    r"(?s)```.*```",
    r"(?m)^(import|export|const|let|var|function|class|interface|type)\s",
    r"(?m)^\s*(def|class|import|from|if|else|elif|for|while|try|except)\s",
    r"(?m)^\s*(<\?php|namespace|use\s+[\w\\]+;)",
    r"(?m)^\s*(package|import\s+java|public\s+class)",
    r#"(?m)^\s*#include\s*[<"]"#,
    r"(?m)^\s*@(Component|Injectable|Entity|Controller)",
    // JSON-ish object and array shapes
    r"(?s)\{.*:.*\}",
    r"(?s)\[\s*\{.*\}\s*\]",
    r"(?im)^\s*(SELECT|INSERT|UPDATE|DELETE|CREATE|DROP|ALTER)[ \t]+\S",
    r"=>",
    r"\(\)\s*\{",
    r"(?m)^\s*//",
    r"(?m)^\s*#",
];

/// Markers that suggest a message is an error report, log excerpt or trace.
const ERROR_PATTERNS: &[&str] = &[
    r"(?i)Error:|Exception:|Traceback|FATAL|WARN|ERROR",
    // at handler (server.js:10:5)
    r"at\s+[\w.$]+\s*\(.*:\d+:\d+\)",
    r"(?m)^\s+at\s+",
    r"(?i)\[error\]|\[warn\]|\[fatal\]",
    r"(?i)npm\s+ERR!|yarn\s+error",
    r"TypeError|ReferenceError|SyntaxError|RangeError",
    r"(?i)failed|failure|crashed",
];

/// How a language rule produces its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageTag {
    /// Use the first capture group of the match
    Captured,
    Fixed(&'static str),
}

/// Ordered language rules. The first rule that matches decides the tag, so
/// the order below is part of the output contract.
///
/// Rules anchor at the start of the whole message, not at each line.
const LANGUAGE_PATTERNS: &[(&str, LanguageTag)] = &[
    (r"```(\w+)", LanguageTag::Captured),
    (r#"^\s*import\s+.*\s+from\s+['"]"#, LanguageTag::Fixed("typescript")),
    (r"^\s*import\s+React", LanguageTag::Fixed("tsx")),
    (r"^\s*(const|let|var)\s+\w+\s*=", LanguageTag::Fixed("javascript")),
    (r"^\s*function\s+\w+\s*\(", LanguageTag::Fixed("javascript")),
    (r"^\s*def\s+\w+\s*\(", LanguageTag::Fixed("python")),
    (r"^\s*class\s+\w+\s*(\(|:)", LanguageTag::Fixed("python")),
    (r"^\s*<\?php", LanguageTag::Fixed("php")),
    (r"^\s*package\s+\w+;", LanguageTag::Fixed("java")),
    (r#"^\s*#include\s*[<"]"#, LanguageTag::Fixed("cpp")),
    (r"(?i)^\s*(CREATE\s+TABLE|SELECT\s+)", LanguageTag::Fixed("sql")),
    (r#"(?s)^\s*\{.*"\w+"\s*:"#, LanguageTag::Fixed("json")),
    (r"^\s*<\w+[^>]*>", LanguageTag::Fixed("html")),
    (r"^\s*\.\w+\s*\{", LanguageTag::Fixed("css")),
    (r"^\s*@\w+\s*\{", LanguageTag::Fixed("css")),
    (r"(?i)^\s*(\$\s+|#.*bash)", LanguageTag::Fixed("bash")),
];

static CODE_SIGNATURES: Lazy<RegexSet> =
    Lazy::new(|| RegexSet::new(CODE_PATTERNS).expect("code signature patterns are valid"));

static ERROR_SIGNATURES: Lazy<RegexSet> =
    Lazy::new(|| RegexSet::new(ERROR_PATTERNS).expect("error signature patterns are valid"));

static LANGUAGE_SIGNATURES: Lazy<Vec<(Regex, LanguageTag)>> = Lazy::new(|| {
    LANGUAGE_PATTERNS
        .iter()
        .map(|(pattern, tag)| {
            (
                Regex::new(pattern).expect("language signature pattern is valid"),
                *tag,
            )
        })
        .collect()
});

/// Opening fence with its optional language tag.
static FENCE_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(\w+)").expect("fence tag regex pattern is valid"));

/// A complete fenced region: tag in group 1, body in group 2.
pub(crate) static FENCED_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(\w+)?\n?(.*?)```").expect("fenced block regex pattern is valid")
});

/// True if any code signature matches.
pub fn looks_like_code(text: &str) -> bool {
    CODE_SIGNATURES.is_match(text)
}

/// True if any error signature matches.
pub fn looks_like_error(text: &str) -> bool {
    ERROR_SIGNATURES.is_match(text)
}

/// Language tag written after the first opening fence, if any.
pub fn fence_language(text: &str) -> Option<&str> {
    FENCE_TAG_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Walk the language table in priority order and return the first tag.
pub fn detect_language(text: &str) -> Option<String> {
    LANGUAGE_SIGNATURES.iter().find_map(|(re, tag)| match tag {
        LanguageTag::Captured => re
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()),
        LanguageTag::Fixed(name) => re.is_match(text).then(|| (*name).to_string()),
    })
}
