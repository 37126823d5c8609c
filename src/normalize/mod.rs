//! Agent-response normalization.
//!
//! Agents return payloads in a handful of shapes: manager envelopes with
//! `status`/`result`, bare domain objects, message-only wrappers, nested
//! `response` envelopes, or plain text. [`normalize`] deterministically maps
//! any parsed value into the canonical [`NormalizedEnvelope`].
//!
//! `normalize` is total: it never fails, and always yields an envelope whose
//! `result` is an object. Classification happens up front via
//! [`classify`]/[`ResponseShape`]; the mapping then switches exhaustively on
//! the shape.

pub mod envelope;
pub mod shape;

pub use envelope::{extract_text, NormalizedEnvelope, ResponseStatus};
pub use shape::{classify, ResponseShape};

use serde_json::{Map, Value};

use crate::domain::has_domain_keys;

/// Field names probed, in order, when deriving a message from a wrapped
/// result object.
const RESULT_MESSAGE_PROBES: &[&str] =
    &["text", "message", "response", "answer", "summary", "content"];

/// Normalize any parsed agent payload into the canonical envelope.
pub fn normalize(parsed: Value) -> NormalizedEnvelope {
    match classify(&parsed) {
        ResponseShape::Empty => NormalizedEnvelope::error("Empty response from agent"),
        ResponseShape::Text => {
            let text = parsed.as_str().unwrap_or_default().to_string();
            let mut result = Map::new();
            result.insert("text".to_string(), Value::String(text.clone()));
            NormalizedEnvelope {
                status: ResponseStatus::Success,
                result,
                message: Some(text),
                metadata: None,
            }
        }
        ResponseShape::Scalar => {
            let text = scalar_to_string(&parsed);
            let mut result = Map::new();
            result.insert("value".to_string(), parsed);
            NormalizedEnvelope {
                status: ResponseStatus::Success,
                result,
                message: Some(text),
                metadata: None,
            }
        }
        // Arrays have no canonical wrapper key; box them so the envelope
        // invariant (result is always an object) holds.
        ResponseShape::List => {
            let mut result = Map::new();
            result.insert("value".to_string(), parsed);
            NormalizedEnvelope::success(result)
        }
        // Highest-priority object shape: the object IS the payload.
        // Unwrapping message/result here would silently discard data.
        ResponseShape::DomainObject => {
            let map = into_object(parsed);
            NormalizedEnvelope::success(map)
        }
        ResponseShape::StatusAndResult => {
            let mut map = into_object(parsed);
            let status = status_from_field(map.get("status"));
            let result = map.remove("result").unwrap_or(Value::Null);
            NormalizedEnvelope {
                status,
                result: value_into_result(result),
                message: map.remove("message").and_then(value_into_message),
                metadata: map.remove("metadata").filter(|m| !m.is_null()),
            }
        }
        ResponseShape::StatusOnly => {
            let mut map = into_object(parsed);
            let status = status_from_field(map.get("status"));
            map.remove("status");
            let message = map.remove("message").and_then(value_into_message);
            let metadata = map.remove("metadata").filter(|m| !m.is_null());
            NormalizedEnvelope {
                status,
                result: map,
                message,
                metadata,
            }
        }
        ResponseShape::ResultWrapper => {
            let mut map = into_object(parsed);
            let result = map.remove("result").unwrap_or(Value::Null);
            let metadata = map.remove("metadata").filter(|m| !m.is_null());

            // Same precedence as the top-level domain check: a result that
            // owns domain keys is returned directly, with no message probe.
            if has_domain_keys(&result) {
                return NormalizedEnvelope {
                    status: ResponseStatus::Success,
                    result: into_object(result),
                    message: None,
                    metadata,
                };
            }

            let message = derive_wrapped_message(map.remove("message"), &result);
            NormalizedEnvelope {
                status: ResponseStatus::Success,
                result: value_into_result(result),
                message,
                metadata,
            }
        }
        ResponseShape::MessageOnly => {
            let mut map = into_object(parsed);
            let message = map
                .remove("message")
                .and_then(value_into_message)
                .unwrap_or_default();
            let mut result = Map::new();
            result.insert("text".to_string(), Value::String(message.clone()));
            NormalizedEnvelope {
                status: ResponseStatus::Success,
                result,
                message: Some(message),
                metadata: None,
            }
        }
        ResponseShape::ResponseWrapper => {
            let mut map = into_object(parsed);
            let inner = map.remove("response").unwrap_or(Value::Null);
            normalize(inner)
        }
        ResponseShape::Opaque => NormalizedEnvelope::success(into_object(parsed)),
    }
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Coerce an arbitrary `result` field value into the envelope's object form.
fn value_into_result(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        Value::String(s) => {
            let mut map = Map::new();
            map.insert("text".to_string(), Value::String(s));
            map
        }
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

fn value_into_message(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

/// Only the literal string `"error"` maps to an error status; anything else
/// (other strings, numbers, null) is success.
fn status_from_field(value: Option<&Value>) -> ResponseStatus {
    match value.and_then(Value::as_str) {
        Some("error") => ResponseStatus::Error,
        _ => ResponseStatus::Success,
    }
}

/// Message for a `{result: ...}` wrapper: an explicit `message` field wins,
/// then a string-valued result, then the first non-null probe field inside
/// an object result. A non-string winner yields no message.
fn derive_wrapped_message(explicit: Option<Value>, result: &Value) -> Option<String> {
    let candidate = match explicit.filter(|m| !m.is_null()) {
        Some(m) => Some(m),
        None => match result {
            Value::String(s) => Some(Value::String(s.clone())),
            Value::Object(map) => RESULT_MESSAGE_PROBES
                .iter()
                .find_map(|k| map.get(*k).filter(|v| !v.is_null()).cloned()),
            _ => None,
        },
    };
    candidate.and_then(value_into_message)
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
