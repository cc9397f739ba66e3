//! Request Builder — turns raw caller text into the analysis prompt.
//!
//! Pure and synchronous: no I/O, no shared mutable state. The same text with the
//! same template version and limit always produces the same prompt.

use serde::Serialize;
use thiserror::Error;

use crate::analysis::prompts::{
    ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM, TEMPLATE_VERSION, TRUNCATION_MARKER,
};

/// Default maximum article length, in characters, before truncation.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 8_000;

/// Raised for input that cannot be analyzed at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid input: {0}")]
pub struct InvalidInputError(pub String);

/// A fully-built analysis request, ready for the LLM client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub system: &'static str,
    pub user: String,
    pub template_version: &'static str,
    /// Normalized article as embedded in `user`, including the marker if clipped.
    pub article: String,
    pub truncated: bool,
}

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    max_input_chars: usize,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INPUT_CHARS)
    }
}

impl RequestBuilder {
    pub fn new(max_input_chars: usize) -> Self {
        Self {
            max_input_chars: max_input_chars.max(1),
        }
    }

    pub fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }

    /// Builds the prompt for `text`.
    ///
    /// Fails only when the text is empty or whitespace-only.
    pub fn build(&self, text: &str) -> Result<Prompt, InvalidInputError> {
        let normalized = normalize_whitespace(text);
        if normalized.is_empty() {
            return Err(InvalidInputError(
                "text cannot be empty or whitespace-only".to_string(),
            ));
        }

        let (article, truncated) = match clip_chars(&normalized, self.max_input_chars) {
            Some(clipped) => (format!("{clipped}{TRUNCATION_MARKER}"), true),
            None => (normalized, false),
        };

        Ok(Prompt {
            system: ANALYSIS_SYSTEM,
            user: ANALYSIS_PROMPT_TEMPLATE.replace("{text}", &article),
            template_version: TEMPLATE_VERSION,
            article,
            truncated,
        })
    }
}

/// Unifies line endings, collapses intra-line whitespace runs to one space,
/// trims every line and keeps at most one blank line between paragraphs.
fn normalize_whitespace(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(unified.len());
    let mut pending_blank = false;

    for line in unified.split('\n') {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            pending_blank = true;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if pending_blank { "\n\n" } else { "\n" });
        }
        pending_blank = false;
        out.push_str(&line);
    }

    out
}

/// Returns the first `max` chars (trailing whitespace trimmed) when `text` is longer.
fn clip_chars(text: &str, max: usize) -> Option<&str> {
    text.char_indices()
        .nth(max)
        .map(|(idx, _)| text[..idx].trim_end())
}
