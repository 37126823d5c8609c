use serde_json::Value;

use crate::domain::has_domain_keys;

/// Structural classification of a parsed agent payload.
///
/// Every incoming value falls into exactly one shape; the normalizer
/// switches exhaustively on this enum instead of probing keys ad hoc.
/// Order matters and mirrors the normalization priority rules: the
/// domain-object check outranks every wrapper shape so that an object
/// carrying both real data and `status`/`result` keys is never unwrapped
/// into just its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `null` — nothing came back.
    Empty,
    /// A bare string payload.
    Text,
    /// A non-string primitive (number or bool).
    Scalar,
    /// A top-level JSON array.
    List,
    /// Object directly owning a reserved domain key. Highest-priority
    /// object shape.
    DomainObject,
    /// Object with both `status` and `result` keys.
    StatusAndResult,
    /// Object with `status` but no `result`.
    StatusOnly,
    /// Object with `result` but no `status`.
    ResultWrapper,
    /// Object whose only recognized key is a string `message`.
    MessageOnly,
    /// Object with a `response` key and none of the shapes above.
    ResponseWrapper,
    /// Any other object.
    Opaque,
}

/// Classify a parsed value. First matching rule wins.
pub fn classify(value: &Value) -> ResponseShape {
    let map = match value {
        Value::Null => return ResponseShape::Empty,
        Value::String(_) => return ResponseShape::Text,
        Value::Bool(_) | Value::Number(_) => return ResponseShape::Scalar,
        Value::Array(_) => return ResponseShape::List,
        Value::Object(map) => map,
    };

    if has_domain_keys(value) {
        return ResponseShape::DomainObject;
    }
    let has_status = map.contains_key("status");
    let has_result = map.contains_key("result");
    match (has_status, has_result) {
        (true, true) => ResponseShape::StatusAndResult,
        (true, false) => ResponseShape::StatusOnly,
        (false, true) => ResponseShape::ResultWrapper,
        (false, false) => {
            if map.get("message").map(Value::is_string).unwrap_or(false) {
                ResponseShape::MessageOnly
            } else if map.contains_key("response") {
                ResponseShape::ResponseWrapper
            } else {
                ResponseShape::Opaque
            }
        }
    }
}
