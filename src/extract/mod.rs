//! Lenient JSON extraction from LLM output.
//!
//! Agent responses are "almost JSON": valid payloads wrapped in prose,
//! markdown code fences, or carrying trailing commas. [`parse_lenient`]
//! recovers a [`serde_json::Value`] from such text, or fails with
//! [`ParseError`] when nothing JSON-like is present.
//!
//! The extractor performs exactly one parse pass. A payload that parses to a
//! JSON *string* is returned as `Value::String`; deciding whether that string
//! is itself encoded JSON (double-stringified manager output) is the caller's
//! job. This keeps adversarial inputs from driving unbounded unwrap loops.

use regex::Regex;
use serde_json::Value;

use crate::error::ParseError;

/// Parse text that is expected to contain JSON, tolerating common LLM
/// wrapping artifacts.
pub fn parse_lenient(text: &str) -> Result<Value, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    let cleaned = cleanup(trimmed);
    let candidate = match clip_to_structure(&cleaned) {
        Some(c) => c,
        None => return Err(ParseError::NoStructure),
    };
    let candidate = strip_trailing_commas(candidate);

    serde_json::from_str::<Value>(&candidate).map_err(|e| ParseError::Malformed(e.to_string()))
}

/// Remove markdown code fences, keeping the fenced body when one exists.
fn cleanup(text: &str) -> String {
    let fence = Regex::new(r"(?s)```[a-zA-Z]*\s*(.*?)\s*```").unwrap();
    if let Some(caps) = fence.captures(text) {
        return caps[1].to_string();
    }
    // Unterminated fence: drop the opening marker line only.
    let open = Regex::new(r"```[a-zA-Z]*\s*").unwrap();
    open.replace_all(text, "").into_owned()
}

/// Clip to the outermost `{...}` or `[...]` span, discarding surrounding prose.
fn clip_to_structure(text: &str) -> Option<&str> {
    let open_obj = text.find('{');
    let open_arr = text.find('[');
    let (start, close) = match (open_obj, open_arr) {
        (Some(o), Some(a)) if a < o => (a, ']'),
        (Some(o), _) => (o, '}'),
        (None, Some(a)) => (a, ']'),
        (None, None) => return None,
    };
    let end = text.rfind(close)?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

fn strip_trailing_commas(text: &str) -> String {
    let trailing = Regex::new(r",\s*([}\]])").unwrap();
    trailing.replace_all(text, "$1").into_owned()
}
