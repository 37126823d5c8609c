use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Revenue figure with provenance. `figure` defaults to `"N/A"` when the
/// financial sub-agent failed or reported nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revenue {
    pub figure: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub source: String,
}

impl Default for Revenue {
    fn default() -> Self {
        Self {
            figure: "N/A".to_string(),
            year: String::new(),
            source: String::new(),
        }
    }
}

impl Revenue {
    pub fn from_value(v: &Value) -> Self {
        Self {
            figure: string_or(v, "figure", "N/A"),
            year: string_or(v, "year", ""),
            source: string_or(v, "source", ""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub sales_relevance: String,
}

impl NewsItem {
    pub fn from_value(v: &Value) -> Self {
        Self {
            date: string_or(v, "date", ""),
            headline: string_or(v, "headline", ""),
            summary: string_or(v, "summary", ""),
            sales_relevance: string_or(v, "sales_relevance", ""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CSuiteChange {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub new_role: String,
    #[serde(default)]
    pub previous_role: String,
    #[serde(default)]
    pub date: String,
}

impl CSuiteChange {
    pub fn from_value(v: &Value) -> Self {
        Self {
            name: string_or(v, "name", ""),
            new_role: string_or(v, "new_role", ""),
            previous_role: string_or(v, "previous_role", ""),
            date: string_or(v, "date", ""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthIndicator {
    #[serde(rename = "type", default)]
    pub indicator_type: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub implications: String,
}

impl GrowthIndicator {
    pub fn from_value(v: &Value) -> Self {
        Self {
            indicator_type: string_or(v, "type", ""),
            detail: string_or(v, "detail", ""),
            implications: string_or(v, "implications", ""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompetitiveIntel {
    #[serde(default)]
    pub vendors: Vec<String>,
    #[serde(default)]
    pub partners: Vec<String>,
    #[serde(default)]
    pub competitors: Vec<String>,
}

impl CompetitiveIntel {
    pub fn from_value(v: &Value) -> Self {
        Self {
            vendors: string_list(v, "vendors"),
            partners: string_list(v, "partners"),
            competitors: string_list(v, "competitors"),
        }
    }
}

/// One row of a strategic dialogue matrix: a concrete challenge tied to a
/// verifiable trigger event, with a consultative conversation opener.
/// Used for both the risk/insurance and the HR/workforce matrices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueChallenge {
    #[serde(default)]
    pub challenge: String,
    #[serde(default)]
    pub trigger_event: String,
    #[serde(default)]
    pub urgency: String,
    #[serde(default)]
    pub relevant_service: String,
    /// Always empty by contract: sub-agents must not name service providers.
    #[serde(default)]
    pub service_provider: String,
    #[serde(default)]
    pub conversation_opener: String,
}

impl DialogueChallenge {
    pub fn from_value(v: &Value) -> Self {
        Self {
            challenge: string_or(v, "challenge", ""),
            trigger_event: string_or(v, "trigger_event", ""),
            urgency: string_or(v, "urgency", ""),
            relevant_service: string_or(v, "relevant_service", ""),
            service_provider: String::new(),
            conversation_opener: string_or(v, "conversation_opener", ""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesNugget {
    #[serde(default)]
    pub nugget: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub talking_point: String,
}

impl SalesNugget {
    pub fn from_value(v: &Value) -> Self {
        Self {
            nugget: string_or(v, "nugget", ""),
            category: string_or(v, "category", ""),
            source: string_or(v, "source", ""),
            talking_point: string_or(v, "talking_point", ""),
        }
    }
}

/// The composite record produced by merging the four enrichment sub-agent
/// payloads for one company. Every field has a defined empty default so the
/// shape is complete even when some sub-agents failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCompany {
    pub company_name: String,
    #[serde(default)]
    pub revenue: Revenue,
    #[serde(default)]
    pub recent_news: Vec<NewsItem>,
    #[serde(default)]
    pub csuite_changes: Vec<CSuiteChange>,
    #[serde(default)]
    pub growth_indicators: Vec<GrowthIndicator>,
    #[serde(default)]
    pub competitive_intel: CompetitiveIntel,
    #[serde(default)]
    pub risk_insurance_challenges: Vec<DialogueChallenge>,
    #[serde(default)]
    pub hr_workforce_challenges: Vec<DialogueChallenge>,
    #[serde(default)]
    pub key_sales_nuggets: Vec<SalesNugget>,
}

impl EnrichedCompany {
    /// An all-defaults record for `name`; merge fills in what the sub-agents
    /// returned.
    pub fn empty(name: &str) -> Self {
        Self {
            company_name: name.to_string(),
            revenue: Revenue::default(),
            recent_news: Vec::new(),
            csuite_changes: Vec::new(),
            growth_indicators: Vec::new(),
            competitive_intel: CompetitiveIntel::default(),
            risk_insurance_challenges: Vec::new(),
            hr_workforce_challenges: Vec::new(),
            key_sales_nuggets: Vec::new(),
        }
    }
}

fn string_or(v: &Value, key: &str, default: &str) -> String {
    v.get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

fn string_list(v: &Value, key: &str) -> Vec<String> {
    v.get(key)
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Map an array field of `v` through a per-item mapper; missing or
/// non-array fields yield an empty vec.
pub fn map_array<T>(v: &Value, key: &str, f: impl Fn(&Value) -> T) -> Vec<T> {
    v.get(key)
        .and_then(Value::as_array)
        .map(|arr| arr.iter().map(&f).collect())
        .unwrap_or_default()
}
