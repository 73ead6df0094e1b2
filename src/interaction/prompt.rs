//! Prompt Grammar
//!
//! An installer awaiting input prints `"<label> > "` and blocks without a
//! line break. A line is a prompt when it ends with space, `>`, space; its
//! label is the first run of alphanumeric/space characters, trimmed.

use once_cell::sync::Lazy;
use regex::Regex;

/// Character that ends a prompt
pub const PROMPT_TERMINATOR: char = '>';

static PROMPT_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r" > $").expect("hardcoded regex"));

static PROMPT_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{Alphabetic}\p{N}\s]+").expect("hardcoded regex"));

/// Last line of a chunk, the candidate prompt text
///
/// Trailing line breaks are ignored, so `"done\n"` yields `"done"`.
pub fn candidate_line(chunk: &str) -> &str {
    chunk
        .trim_end_matches('\n')
        .rsplit('\n')
        .next()
        .unwrap_or_default()
}

/// Whether `line` looks like `<label> > `
pub fn is_prompt_line(line: &str) -> bool {
    PROMPT_LINE.is_match(line)
}

/// Extract the trimmed label of a prompt line
///
/// Returns an empty string when the line has no alphanumeric/space run.
pub fn extract_label(line: &str) -> &str {
    PROMPT_LABEL
        .find(line)
        .map(|m| m.as_str().trim())
        .unwrap_or_default()
}

/// A prompt detected at the end of a chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt<'a> {
    /// The full candidate line, e.g. `"Enter license key > "`
    pub line: &'a str,
    /// The label used to look up the answer, e.g. `"Enter license key"`
    pub label: &'a str,
}

impl<'a> Prompt<'a> {
    /// Detect a prompt at the end of `chunk`
    pub fn detect(chunk: &'a str) -> Option<Self> {
        let line = candidate_line(chunk);
        if !is_prompt_line(line) {
            return None;
        }

        Some(Self {
            line,
            label: extract_label(line),
        })
    }
}
