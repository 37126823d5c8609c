//! Parallel fan-out enrichment.
//!
//! For each company, four specialized sub-agents are called concurrently
//! (financial/growth, news/leadership, competitive intel, risk/workforce) and
//! their payloads merged into one [`crate::domain::EnrichedCompany`]. Across
//! companies, a sliding window bounds how many fan-outs run at once.

pub mod coordinator;
pub mod merge;
pub mod prompts;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use coordinator::{EnrichmentCoordinator, DEFAULT_ENTITY_WINDOW};
pub use merge::merge_slots;
pub use prompts::{
    build_company_context, build_competitive_intel_prompt, build_financial_growth_prompt,
    build_news_leadership_prompt, build_risk_workforce_prompt,
};

/// Agent ids for the four enrichment workstreams. Bound per deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichmentAgentIds {
    pub financial_growth: String,
    pub news_leadership: String,
    pub competitive_intel: String,
    pub risk_workforce: String,
}

/// Settled state of one sub-agent slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    Ok,
    Error,
}

/// Terminal state of one entity's enrichment job: `Complete` when at least
/// one slot settled ok, `Failed` when all four errored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Complete,
    Failed,
}

/// Per-entity record of how the fan-out settled. Slot order: financial,
/// news, competitive, risk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentJob {
    pub company_name: String,
    pub slots: [SlotState; 4],
    pub state: JobState,
}

/// Cumulative progress snapshot, emitted after each entity settles so a
/// caller can render live progress without waiting for the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentProgress {
    pub current: usize,
    pub total: usize,
    pub completed: Vec<String>,
    pub in_flight: Vec<String>,
}

/// Outcome of one enrichment batch.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentReport {
    pub enriched: Vec<crate::domain::EnrichedCompany>,
    pub jobs: Vec<EnrichmentJob>,
    /// Names of entities whose four slots all failed.
    pub failed: Vec<String>,
    /// Sum of per-entity wall time, for throughput reporting.
    pub total_elapsed: Duration,
}
