//! Whitespace cleanup applied to extracted text before it is returned.

use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_LINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("blank line pattern is valid"));

static INLINE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("inline whitespace pattern is valid"));

/// Collapse 3+ newlines to a paragraph break, squeeze spaces and tabs to a single space, and trim
/// the ends. Applying it twice gives the same result as applying it once.
pub fn normalize(text: &str) -> String {
    let text = BLANK_LINE_RUNS.replace_all(text, "\n\n");
    let text = INLINE_WHITESPACE.replace_all(&text, " ");
    text.trim_matches(is_trimmed).to_string()
}

/// Characters stripped from the ends: Unicode white space plus the byte order mark, but not NEL
/// (U+0085), matching `String.prototype.trim` in JavaScript clients.
fn is_trimmed(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}
