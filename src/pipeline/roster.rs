use serde::{Deserialize, Serialize};

use crate::enrich::EnrichmentAgentIds;

/// Named agent ids for every pipeline stage. Deployments rebind these
/// without code changes (ids are opaque to the orchestration logic).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentRoster {
    /// Orchestrates the segmented research-then-extract discovery pipeline.
    pub discovery_manager: String,
    /// Web research across news, reports, and directories.
    pub discovery_researcher: String,
    /// Extracts and structures company names from research findings.
    pub company_extractor: String,
    /// Verified decision-maker contacts.
    pub contact_finder: String,
    /// The four enrichment workstreams, called directly in parallel.
    pub enrichment: EnrichmentAgentIds,
}
