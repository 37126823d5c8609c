use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A discovered prospect company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub hq_location: String,
    #[serde(default)]
    pub estimated_size: String,
    #[serde(default)]
    pub relevance_score: f64,
    #[serde(default)]
    pub relevance_reasoning: String,
    #[serde(default)]
    pub website: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_segment: Option<String>,
}

impl Company {
    /// Lenient mapper for agent-produced company objects. Agents vary field
    /// names (`name` vs `company_name`, `relevance_reasoning` vs
    /// `mention_context`, `source_segment` vs `search_segment`).
    pub fn from_value(v: &Value) -> Self {
        let str_field = |keys: &[&str]| -> String {
            keys.iter()
                .find_map(|k| v.get(*k).and_then(Value::as_str))
                .unwrap_or("")
                .to_string()
        };
        Self {
            name: str_field(&["name", "company_name"]),
            industry: str_field(&["industry"]),
            hq_location: str_field(&["hq_location"]),
            estimated_size: str_field(&["estimated_size"]),
            relevance_score: v
                .get("relevance_score")
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            relevance_reasoning: str_field(&["relevance_reasoning", "mention_context"]),
            website: str_field(&["website"]),
            source_segment: v
                .get("source_segment")
                .or_else(|| v.get("search_segment"))
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    /// A salvaged record built from a bare name mention in researcher
    /// findings; every other field is unknown.
    pub fn from_mention(name: &str, source: &str, segment: Option<String>) -> Self {
        Self {
            name: name.trim().to_string(),
            industry: String::new(),
            hq_location: String::new(),
            estimated_size: String::new(),
            relevance_score: 5.0,
            relevance_reasoning: format!("Mentioned in: {source}"),
            website: String::new(),
            source_segment: segment,
        }
    }
}

/// One segment of a discovery search strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentStrategy {
    pub segment_name: String,
    #[serde(default)]
    pub target_count: i64,
    #[serde(default)]
    pub actual_count: i64,
}

impl SegmentStrategy {
    pub fn from_value(v: &Value) -> Self {
        Self {
            segment_name: v
                .get("segment_name")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            target_count: v.get("target_count").and_then(Value::as_i64).unwrap_or(0),
            actual_count: v.get("actual_count").and_then(Value::as_i64).unwrap_or(0),
        }
    }
}
