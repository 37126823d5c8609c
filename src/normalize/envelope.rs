use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome status of a normalized agent response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// The canonical envelope every agent response is normalized into.
///
/// Invariant: `result` is always a JSON object. An empty object means "no
/// recoverable payload", never `null` or a bare primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEnvelope {
    pub status: ResponseStatus,
    pub result: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl NormalizedEnvelope {
    pub fn success(result: Map<String, Value>) -> Self {
        Self {
            status: ResponseStatus::Success,
            result,
            message: None,
            metadata: None,
        }
    }

    /// Error envelope with an empty result, carrying only a message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            result: Map::new(),
            message: Some(message.into()),
            metadata: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    /// The `result` object as a `Value`, for locator traversal.
    pub fn result_value(&self) -> Value {
        Value::Object(self.result.clone())
    }
}

/// Best human-readable text for an envelope, probing the conventional
/// message-bearing fields in a fixed order. Empty string when none match.
pub fn extract_text(envelope: &NormalizedEnvelope) -> String {
    if let Some(msg) = &envelope.message {
        if !msg.is_empty() {
            return msg.clone();
        }
    }
    const PROBES: &[&str] = &[
        "text", "message", "response", "answer", "answer_text", "summary", "content",
    ];
    for key in PROBES {
        if let Some(s) = envelope.result.get(*key).and_then(Value::as_str) {
            if !s.is_empty() {
                return s.to_string();
            }
        }
    }
    String::new()
}
