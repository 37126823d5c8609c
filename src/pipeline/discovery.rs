use std::collections::HashSet;

use serde_json::{json, Value};

use crate::client::{AgentCallResponse, AgentCaller, CallOptions};
use crate::domain::{deduplicate_companies, Campaign, Company, SegmentStrategy};
use crate::error::{AgentError, AgentResult};
use crate::locate::parse_agent_result;

use super::roster::AgentRoster;

/// Researcher findings longer than this are clipped before being handed to
/// the extractor in a single message.
const MAX_FINDINGS_CHARS: usize = 50_000;

/// Result of a discovery run.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOutcome {
    pub companies: Vec<Company>,
    pub segmentation: Vec<SegmentStrategy>,
    pub search_summary: String,
    pub duplicates_removed: u64,
    /// True when the manager produced nothing and the direct
    /// researcher-then-extractor pipeline filled in.
    pub used_fallback: bool,
}

/// Run the manager-orchestrated discovery pipeline for a campaign, falling
/// back to direct researcher + extractor calls when the manager returns no
/// companies.
pub async fn run_discovery(
    caller: &dyn AgentCaller,
    roster: &AgentRoster,
    campaign: &Campaign,
) -> AgentResult<DiscoveryOutcome> {
    let message = manager_message(campaign);
    let result = caller
        .call(&message, &roster.discovery_manager, CallOptions::default())
        .await;

    if !result.success {
        return Err(AgentError::TaskFailed(failure_text(
            &result,
            "Agent returned an error. Please try again.",
        )));
    }

    let parsed = parse_agent_result(&result).ok_or_else(|| {
        AgentError::NoDomainData(
            "Failed to parse discovery results. The agent may have returned an unexpected format."
                .to_string(),
        )
    })?;

    let raw_companies = recover_companies(&parsed, &result);
    let companies: Vec<Company> = raw_companies
        .iter()
        .map(Company::from_value)
        .filter(|c| !c.name.trim().is_empty())
        .collect();

    if companies.is_empty() {
        tracing::warn!(
            parsed_keys = ?parsed.as_object().map(|m| m.keys().collect::<Vec<_>>()),
            "manager returned no companies; falling back to direct pipeline"
        );
        let fallback = run_direct_pipeline(caller, roster, campaign).await;
        match fallback {
            Ok(companies) if !companies.is_empty() => {
                let found = companies.len();
                return Ok(DiscoveryOutcome {
                    companies,
                    segmentation: vec![SegmentStrategy {
                        segment_name: "Direct Pipeline Fallback".to_string(),
                        target_count: campaign.target_count() as i64,
                        actual_count: found as i64,
                    }],
                    search_summary: format!(
                        "Found {found} companies via direct Research + Extract pipeline (fallback mode)."
                    ),
                    duplicates_removed: 0,
                    used_fallback: true,
                });
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!("fallback pipeline also failed: {e}");
            }
        }
        return Err(AgentError::NoDomainData(
            "Discovery completed but no companies were found. Try a more specific directive or retry."
                .to_string(),
        ));
    }

    tracing::info!(count = companies.len(), "discovery extracted companies");

    let segmentation = parsed
        .get("segmentation_strategy")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().map(SegmentStrategy::from_value).collect())
        .unwrap_or_default();
    let duplicates_removed = parsed
        .get("duplicates_removed")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let search_summary = parsed
        .get("search_summary")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    Ok(DiscoveryOutcome {
        companies,
        segmentation,
        search_summary,
        duplicates_removed,
        used_fallback: false,
    })
}

/// Direct researcher-then-extractor pipeline, bypassing the manager.
/// Extractor failure salvages bare company mentions from the researcher's
/// findings instead of failing the whole run.
pub async fn run_direct_pipeline(
    caller: &dyn AgentCaller,
    roster: &AgentRoster,
    campaign: &Campaign,
) -> AgentResult<Vec<Company>> {
    tracing::info!("starting direct researcher-extractor pipeline");

    let research_result = caller
        .call(
            &researcher_message(campaign),
            &roster.discovery_researcher,
            CallOptions::default(),
        )
        .await;
    if !research_result.success {
        return Err(AgentError::TaskFailed(format!(
            "Discovery Researcher failed: {}",
            failure_text(&research_result, "Unknown error")
        )));
    }
    let research_parsed = parse_agent_result(&research_result).ok_or_else(|| {
        AgentError::NoDomainData("Failed to parse Researcher results".to_string())
    })?;

    let findings_text = build_findings_text(&research_parsed, &research_result);
    if findings_text.trim().is_empty() {
        tracing::warn!("no findings text to extract from");
        return Ok(Vec::new());
    }

    let extract_result = caller
        .call(
            &extractor_message(campaign, &truncate_chars(&findings_text, MAX_FINDINGS_CHARS)),
            &roster.company_extractor,
            CallOptions::default(),
        )
        .await;

    if !extract_result.success {
        // Salvage what the researcher already named.
        if research_parsed
            .get("findings")
            .map(Value::is_array)
            .unwrap_or(false)
        {
            let salvaged = salvage_from_findings(&research_parsed);
            tracing::warn!(
                count = salvaged.len(),
                "extractor failed; salvaged companies from researcher findings"
            );
            return Ok(salvaged);
        }
        return Err(AgentError::TaskFailed(format!(
            "Company Name Extractor failed: {}",
            failure_text(&extract_result, "Unknown error")
        )));
    }

    let extract_parsed = parse_agent_result(&extract_result)
        .ok_or_else(|| AgentError::NoDomainData("Failed to parse Extractor results".to_string()))?;

    let raw = ["extracted_companies", "companies"]
        .iter()
        .find_map(|k| extract_parsed.get(*k).and_then(Value::as_array))
        .cloned()
        .unwrap_or_default();

    let companies: Vec<Company> = raw
        .iter()
        .map(Company::from_value)
        .filter(|c| !c.name.trim().is_empty())
        .collect();
    let total = companies.len();
    let (deduplicated, _) = deduplicate_companies(companies);
    tracing::info!(
        unique = deduplicated.len(),
        raw = raw.len(),
        valid = total,
        "direct pipeline complete"
    );
    Ok(deduplicated)
}

/// Company recovery over the manager payload, trying known shapes in order:
/// a `companies` array, an `extracted_companies` leak from the extractor,
/// bare mentions inside researcher `findings`, then a bounded nested search
/// of the whole call response.
fn recover_companies(parsed: &Value, result: &AgentCallResponse) -> Vec<Value> {
    if let Some(arr) = non_empty_array(parsed, "companies") {
        tracing::debug!(count = arr.len(), "companies in standard format");
        return arr;
    }
    if let Some(arr) = non_empty_array(parsed, "extracted_companies") {
        tracing::debug!(count = arr.len(), "companies via extracted_companies format");
        return arr;
    }
    if parsed
        .get("findings")
        .and_then(Value::as_array)
        .map(|a| !a.is_empty())
        .unwrap_or(false)
    {
        let salvaged = salvage_from_findings(parsed);
        if !salvaged.is_empty() {
            tracing::debug!(count = salvaged.len(), "companies from findings mentions");
            return salvaged
                .iter()
                .filter_map(|c| serde_json::to_value(c).ok())
                .collect();
        }
    }
    if let Ok(full) = serde_json::to_value(result) {
        let nested = search_nested_companies(&full, 0);
        if !nested.is_empty() {
            tracing::debug!(count = nested.len(), "companies via deep nested search");
            return nested;
        }
    }
    Vec::new()
}

fn non_empty_array(value: &Value, key: &str) -> Option<Vec<Value>> {
    value
        .get(key)
        .and_then(Value::as_array)
        .filter(|a| !a.is_empty())
        .cloned()
}

/// Bounded nested probe for a non-empty company array anywhere under the
/// common envelope keys. Distinct from the locator: this looks for the two
/// company list keys only.
fn search_nested_companies(value: &Value, depth: usize) -> Vec<Value> {
    if depth > 5 {
        return Vec::new();
    }
    let map = match value.as_object() {
        Some(m) => m,
        None => return Vec::new(),
    };
    for key in ["companies", "extracted_companies"] {
        if let Some(arr) = map.get(key).and_then(Value::as_array) {
            if !arr.is_empty() {
                return arr.clone();
            }
        }
    }
    for key in ["result", "response", "data", "output"] {
        if let Some(child) = map.get(key) {
            if child.is_object() {
                let found = search_nested_companies(child, depth + 1);
                if !found.is_empty() {
                    return found;
                }
            }
        }
    }
    Vec::new()
}

/// Bare-mention salvage: every unique name in `findings[].companies_mentioned`
/// becomes a minimal company record.
fn salvage_from_findings(parsed: &Value) -> Vec<Company> {
    let segment = parsed
        .get("segment_name")
        .and_then(Value::as_str)
        .map(str::to_string);
    let mut seen: HashSet<String> = HashSet::new();
    let mut salvaged = Vec::new();

    let findings = match parsed.get("findings").and_then(Value::as_array) {
        Some(f) => f,
        None => return salvaged,
    };
    for finding in findings {
        let source = finding
            .get("source_title")
            .and_then(Value::as_str)
            .unwrap_or("web search");
        if let Some(mentions) = finding.get("companies_mentioned").and_then(Value::as_array) {
            for name in mentions.iter().filter_map(Value::as_str) {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if seen.insert(trimmed.to_lowercase()) {
                    salvaged.push(Company::from_mention(trimmed, source, segment.clone()));
                }
            }
        }
    }
    salvaged
}

fn build_findings_text(parsed: &Value, result: &AgentCallResponse) -> String {
    if let Some(findings) = parsed.get("findings").and_then(Value::as_array) {
        return findings
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let title = f
                    .get("source_title")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Source {}", i + 1));
                let source_type = f.get("source_type").and_then(Value::as_str).unwrap_or("");
                let date = f.get("date_published").and_then(Value::as_str).unwrap_or("");
                let content = f.get("content").and_then(Value::as_str).unwrap_or("");
                let companies = f
                    .get("companies_mentioned")
                    .and_then(Value::as_array)
                    .map(|arr| {
                        arr.iter()
                            .filter_map(Value::as_str)
                            .collect::<Vec<_>>()
                            .join(", ")
                    })
                    .unwrap_or_default();
                format!(
                    "--- SOURCE {}: {title} ({source_type}, {date}) ---\n{content}\nCompanies mentioned: {companies}",
                    i + 1
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");
    }
    if let Some(summary) = parsed.get("segment_summary").and_then(Value::as_str) {
        return summary.to_string();
    }
    result.raw_response.clone().unwrap_or_default()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let clipped: String = text.chars().take(max_chars).collect();
    format!("{clipped}\n\n[...truncated for length]")
}

fn manager_message(campaign: &Campaign) -> String {
    let target = campaign.target_count();
    let filters = json!({
        "geography": campaign.filters.geography,
        "sizeRange": campaign.filters.size_range,
        "industries": campaign.filters.industries,
    });
    format!(
        "Business directive: {directive}. Target company count: {target}. Filters: {filters}. \
         Use the full Research-then-Extract pipeline: 1) Segment this directive into 3-5 search \
         strategies, 2) For each segment, delegate to the Discovery Researcher to search the web, \
         3) Pass ALL findings to the Company Name Extractor to identify every company name from \
         articles and reports, 4) Deduplicate and consolidate into a final list of {target}+ \
         companies. Cast the widest net possible - extract companies from news articles, press \
         releases, industry reports, and market analyses.",
        directive = campaign.directive,
    )
}

fn researcher_message(campaign: &Campaign) -> String {
    let target = campaign.target_count();
    let mut message = format!("Search directive: {}.\n", campaign.directive);
    if let Some(geo) = &campaign.filters.geography {
        message.push_str(&format!("Geography focus: {geo}.\n"));
    }
    if !campaign.filters.industries.is_empty() {
        message.push_str(&format!(
            "Target industries: {}.\n",
            campaign.filters.industries.join(", ")
        ));
    }
    if let Some(size) = &campaign.filters.size_range {
        message.push_str(&format!("Company size range: {size}.\n"));
    }
    message.push_str(&format!(
        "\nSearch broadly across news articles, industry reports, press releases, market \
         analyses, funding announcements, and company directories. Find as many relevant \
         companies as possible (target: {target}+). For each source, list EVERY company name \
         mentioned - even companies mentioned in passing or as competitors, partners, or vendors."
    ));
    message
}

fn extractor_message(campaign: &Campaign, findings: &str) -> String {
    let mut message = format!(
        "Extract every company name from the following web research findings. This is for the \
         directive: \"{}\".\n",
        campaign.directive
    );
    if let Some(geo) = &campaign.filters.geography {
        message.push_str(&format!("Geography focus: {geo}.\n"));
    }
    if !campaign.filters.industries.is_empty() {
        message.push_str(&format!(
            "Target industries: {}.\n",
            campaign.filters.industries.join(", ")
        ));
    }
    message.push_str(&format!(
        "\nIMPORTANT: Extract EVERY company mentioned - even competitors, partners, vendors, or \
         companies mentioned in passing. For each company, provide industry, HQ location, \
         estimated size, and relevance score (1-10) based on the directive.\n\nRESEARCH \
         FINDINGS:\n{findings}"
    ));
    message
}

fn failure_text(result: &AgentCallResponse, default: &str) -> String {
    let text = result.error_message();
    if text.is_empty() {
        default.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::normalize::normalize;

    fn roster() -> AgentRoster {
        AgentRoster {
            discovery_manager: "manager".into(),
            discovery_researcher: "researcher".into(),
            company_extractor: "extractor".into(),
            contact_finder: "contacts".into(),
            enrichment: Default::default(),
        }
    }

    fn campaign() -> Campaign {
        let mut c = Campaign::new("c1", "Midwest push", "Find mid-size manufacturers");
        c.filters.geography = Some("US Midwest".into());
        c
    }

    /// Maps agent id to a canned payload (or failure).
    struct ScriptedCaller {
        manager: Option<Value>,
        researcher: Option<Value>,
        extractor: Option<Value>,
    }

    #[async_trait]
    impl AgentCaller for ScriptedCaller {
        async fn call(
            &self,
            _message: &str,
            agent_id: &str,
            _options: CallOptions,
        ) -> AgentCallResponse {
            let payload = match agent_id {
                "manager" => &self.manager,
                "researcher" => &self.researcher,
                "extractor" => &self.extractor,
                _ => &None,
            };
            match payload {
                Some(v) => AgentCallResponse::completed(normalize(v.clone())),
                None => AgentCallResponse::failure("agent exploded"),
            }
        }
    }

    #[tokio::test]
    async fn test_discovery_standard_companies_shape() {
        let caller = ScriptedCaller {
            manager: Some(json!({
                "companies": [
                    {"name": "Acme", "industry": "Manufacturing", "relevance_score": 8},
                    {"name": "", "industry": "dropped"}
                ],
                "search_summary": "Found via segments",
                "segmentation_strategy": [
                    {"segment_name": "s1", "target_count": 25, "actual_count": 12}
                ],
                "duplicates_removed": 3
            })),
            researcher: None,
            extractor: None,
        };
        let outcome = run_discovery(&caller, &roster(), &campaign()).await.unwrap();
        assert_eq!(outcome.companies.len(), 1);
        assert_eq!(outcome.companies[0].name, "Acme");
        assert_eq!(outcome.segmentation.len(), 1);
        assert_eq!(outcome.duplicates_removed, 3);
        assert!(!outcome.used_fallback);
    }

    #[tokio::test]
    async fn test_discovery_extractor_leak_shape() {
        let caller = ScriptedCaller {
            manager: Some(json!({
                "extracted_companies": [
                    {"name": "Globex", "mention_context": "named as competitor",
                     "search_segment": "seg-1"}
                ]
            })),
            researcher: None,
            extractor: None,
        };
        let outcome = run_discovery(&caller, &roster(), &campaign()).await.unwrap();
        assert_eq!(outcome.companies[0].name, "Globex");
        assert_eq!(outcome.companies[0].relevance_reasoning, "named as competitor");
        assert_eq!(outcome.companies[0].source_segment.as_deref(), Some("seg-1"));
    }

    #[tokio::test]
    async fn test_discovery_findings_mentions_shape() {
        let caller = ScriptedCaller {
            manager: Some(json!({
                "findings": [
                    {"source_title": "Industry roundup",
                     "companies_mentioned": ["Acme", "acme", "Globex", "  "]}
                ],
                "segment_name": "roundups"
            })),
            researcher: None,
            extractor: None,
        };
        let outcome = run_discovery(&caller, &roster(), &campaign()).await.unwrap();
        assert_eq!(outcome.companies.len(), 2);
        assert_eq!(outcome.companies[0].relevance_reasoning, "Mentioned in: Industry roundup");
        assert_eq!(outcome.companies[0].source_segment.as_deref(), Some("roundups"));
    }

    #[tokio::test]
    async fn test_discovery_falls_back_to_direct_pipeline() {
        let caller = ScriptedCaller {
            // Parseable but empty of companies.
            manager: Some(json!({"findings": []})),
            researcher: Some(json!({
                "findings": [
                    {"source_title": "news", "source_type": "article",
                     "content": "Acme expands", "companies_mentioned": ["Acme"]}
                ]
            })),
            extractor: Some(json!({
                "extracted_companies": [{"name": "Acme", "industry": "Manufacturing"}]
            })),
        };
        let outcome = run_discovery(&caller, &roster(), &campaign()).await.unwrap();
        assert!(outcome.used_fallback);
        assert_eq!(outcome.companies.len(), 1);
        assert_eq!(outcome.segmentation[0].segment_name, "Direct Pipeline Fallback");
    }

    #[tokio::test]
    async fn test_discovery_manager_failure_is_task_failed() {
        let caller = ScriptedCaller {
            manager: None,
            researcher: None,
            extractor: None,
        };
        let err = run_discovery(&caller, &roster(), &campaign()).await.unwrap_err();
        assert!(matches!(err, AgentError::TaskFailed(_)));
    }

    #[tokio::test]
    async fn test_direct_pipeline_salvages_on_extractor_failure() {
        let caller = ScriptedCaller {
            manager: None,
            researcher: Some(json!({
                "findings": [
                    {"source_title": "report", "content": "...",
                     "companies_mentioned": ["Initech", "Globex"]}
                ]
            })),
            extractor: None,
        };
        let companies = run_direct_pipeline(&caller, &roster(), &campaign())
            .await
            .unwrap();
        assert_eq!(companies.len(), 2);
        assert_eq!(companies[0].name, "Initech");
        assert_eq!(companies[0].relevance_score, 5.0);
    }

    #[tokio::test]
    async fn test_direct_pipeline_dedupes_extracted() {
        let caller = ScriptedCaller {
            manager: None,
            researcher: Some(json!({
                "findings": [{"source_title": "r", "content": "text", "companies_mentioned": []}]
            })),
            extractor: Some(json!({
                "extracted_companies": [
                    {"name": "Acme Inc", "industry": "Manufacturing"},
                    {"name": "Acme", "industry": ""}
                ]
            })),
        };
        let companies = run_direct_pipeline(&caller, &roster(), &campaign())
            .await
            .unwrap();
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].industry, "Manufacturing");
    }

    #[tokio::test]
    async fn test_direct_pipeline_empty_findings_is_empty() {
        let caller = ScriptedCaller {
            manager: None,
            researcher: Some(json!({"findings": []})),
            extractor: None,
        };
        let companies = run_direct_pipeline(&caller, &roster(), &campaign())
            .await
            .unwrap();
        assert!(companies.is_empty());
    }

    #[test]
    fn test_truncate_preserves_short_text() {
        assert_eq!(truncate_chars("short", 100), "short");
        let long = "x".repeat(120);
        let clipped = truncate_chars(&long, 100);
        assert!(clipped.ends_with("[...truncated for length]"));
        assert!(clipped.starts_with(&"x".repeat(100)));
    }

    #[test]
    fn test_search_nested_companies_bounded() {
        let mut v = json!({"companies": [{"name": "deep"}]});
        for _ in 0..8 {
            v = json!({"result": v});
        }
        assert!(search_nested_companies(&v, 0).is_empty());
    }
}
