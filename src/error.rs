//! Structured error types for the layout and hit-testing core.
//!
//! Two variants cover the real failure sources: JSON parsing of a document
//! snapshot, and a table nesting depth beyond the configured bound. Every
//! other malformed input degrades to a defined fallback instead of failing
//! (empty row lists yield empty sequences, zero metrics yield zero-sized
//! rectangles, stale position contexts reset to the default).

use thiserror::Error;

/// The unified error type returned by public API functions.
#[derive(Debug, Error)]
pub enum EngineError {
    /// JSON input failed to parse as a valid document snapshot.
    #[error("Failed to parse document: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// Table nesting exceeded the configured bound. Layout fails fast here
    /// rather than silently truncating a pathological document.
    #[error("Table nesting too deep: depth {depth} exceeds the bound of {max}")]
    NestingTooDeep { depth: usize, max: usize },
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {hint}")
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the document schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input — is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        EngineError::Parse { source: e, hint }
    }
}
