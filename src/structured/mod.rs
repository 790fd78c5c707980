//! JSON output helpers.
//!
//! - [`extract_json`]: pull a JSON value out of model text (raw, fenced or embedded)
//! - [`json_schema_from_type`]: parameter schemas from Rust argument structs
//! - [`SchemaValidator`]: check model-supplied arguments before running a tool
//!
//! ```
//! use glm_cookbook::structured::extract_json;
//!
//! let reply = "Here you go:\n```json\n{\"name\": \"Alice\", \"age\": 30}\n```";
//! let value = extract_json(reply).unwrap();
//! assert_eq!(value["age"], 30);
//! ```

pub mod schema;

pub use schema::{json_schema_from_type, SchemaValidator};

use crate::{Error, ErrorContext, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static FENCED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json|JSON)?\s*([\s\S]*?)\s*```").expect("fence pattern"));

/// Parse a JSON value from model output.
///
/// Tries, in order: the whole text, the first fenced code block, then the
/// outermost `{...}` and `[...]` spans.
pub fn extract_json(text: &str) -> Result<serde_json::Value> {
    let trimmed = text.trim();
    if let Ok(v) = serde_json::from_str(trimmed) {
        return Ok(v);
    }

    if let Some(inner) = FENCED.captures(trimmed).and_then(|c| c.get(1)) {
        if let Ok(v) = serde_json::from_str(inner.as_str()) {
            return Ok(v);
        }
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (trimmed.find(open), trimmed.rfind(close)) {
            if start < end {
                if let Ok(v) = serde_json::from_str(&trimmed[start..=end]) {
                    return Ok(v);
                }
            }
        }
    }

    Err(Error::validation_with_context(
        "model output does not contain valid JSON",
        ErrorContext::new()
            .with_details(trimmed.chars().take(200).collect::<String>())
            .with_source("structured"),
    ))
}
