//! Depth-bounded search for domain payloads inside wrapper objects.
//!
//! Manager agents nest real payloads under varying envelope keys, sometimes
//! as stringified JSON. [`locate`] walks a bounded worklist over the known
//! unwrap aliases and returns the first sub-object that directly owns a
//! target key. [`parse_agent_result`] layers the full salvage chain over a
//! call response, ending in an explicit logged raw-data fallback.

use serde_json::Value;

use crate::client::AgentCallResponse;
use crate::domain::has_target_keys;
use crate::extract::parse_lenient;

/// Nodes deeper than this are not examined.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Envelope keys worth descending into, in priority order.
pub const UNWRAP_ALIASES: &[&str] = &["result", "response", "data", "output", "content"];

/// Find the first object owning a non-null target key, searching `root` and
/// the subtrees under the unwrap aliases. Object-valued aliases are explored
/// before stringified ones at each node; traversal is depth-first in alias
/// order. Nodes past `max_depth` are skipped, which bounds work on deeply
/// nested or adversarial payloads.
pub fn locate(root: &Value, max_depth: usize) -> Option<Value> {
    let mut stack: Vec<(Value, usize)> = vec![(root.clone(), 0)];

    while let Some((node, depth)) = stack.pop() {
        if depth > max_depth {
            continue;
        }
        let map = match node.as_object() {
            Some(m) => m,
            None => continue,
        };
        if has_target_keys(&node) {
            return Some(node);
        }

        let mut children: Vec<Value> = Vec::new();
        for key in UNWRAP_ALIASES {
            if let Some(child) = map.get(*key) {
                if child.is_object() {
                    children.push(child.clone());
                }
            }
        }
        // Second pass: aliases holding stringified JSON.
        for key in UNWRAP_ALIASES {
            if let Some(Value::String(s)) = map.get(*key) {
                if s.contains('{') {
                    if let Ok(parsed) = parse_lenient(s) {
                        if parsed.is_object() {
                            children.push(parsed);
                        }
                    }
                }
            }
        }
        for child in children.into_iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    None
}

/// Recover the domain payload from a call response.
///
/// Tiers, first hit wins:
/// 1. locate inside the normalized `result`;
/// 2. locate over the whole envelope (manager agents sometimes skip `result`);
/// 3. lenient-parse `raw_response` and locate;
/// 4. strict-parse `raw_response`; a string there is double-stringified
///    manager output, so parse once more and locate.
///
/// Final tier: a non-empty `result` with no target keys is returned as-is so
/// downstream code always receives something to degrade gracefully on; that
/// path is logged, never silent.
pub fn parse_agent_result(result: &AgentCallResponse) -> Option<Value> {
    if !result.success {
        tracing::warn!(
            error = result.error.as_deref().unwrap_or(""),
            "agent call failed; nothing to parse"
        );
        return None;
    }

    let data = result.response.result_value();
    if let Some(found) = locate(&data, DEFAULT_MAX_DEPTH) {
        return Some(found);
    }

    if let Ok(envelope) = serde_json::to_value(&result.response) {
        if let Some(found) = locate(&envelope, DEFAULT_MAX_DEPTH) {
            return Some(found);
        }
    }

    if let Some(raw) = &result.raw_response {
        if let Ok(parsed) = parse_lenient(raw) {
            if parsed.is_object() {
                if let Some(found) = locate(&parsed, DEFAULT_MAX_DEPTH) {
                    return Some(found);
                }
            }
        }

        if let Ok(first_pass) = serde_json::from_str::<Value>(raw) {
            let candidate = match first_pass {
                Value::String(s) => parse_lenient(&s).ok(),
                other @ Value::Object(_) => Some(other),
                _ => None,
            };
            if let Some(candidate) = candidate {
                if let Some(found) = locate(&candidate, DEFAULT_MAX_DEPTH) {
                    return Some(found);
                }
            }
        }
    }

    if !result.response.result.is_empty() {
        tracing::warn!(
            keys = ?result.response.result.keys().collect::<Vec<_>>(),
            "data found but no target keys; returning raw result"
        );
        return Some(data);
    }

    tracing::warn!("no parseable data found in agent response");
    None
}
