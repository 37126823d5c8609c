//! # ProspectIQ Core — Agent-Response Normalization & Enrichment Orchestration
//!
//! `prospectiq` is the engine behind a prospecting dashboard that drives a
//! hosted LLM-agent service to discover companies, enrich them with business
//! intelligence, and find contacts. It owns the two hard problems:
//!
//! - **Normalization & reconciliation**: agents return arbitrarily-shaped,
//!   occasionally malformed JSON-like text (manager-wrapped, doubly
//!   stringified, nested under varying envelope keys). The lenient extractor,
//!   shape-classified normalizer, and depth-bounded locator deterministically
//!   recover a canonical domain payload or report an explicit "no data".
//! - **Fan-out coordination**: per-company enrichment runs 4 concurrent
//!   sub-agent calls behind a retry wrapper, merged into one composite record,
//!   with a sliding window bounding concurrency across companies and
//!   per-entity progress reporting.
//!
//! The dashboard UI, campaign CRUD, and persistence are external
//! collaborators: they call into this crate and render its output.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use prospectiq::client::{AgentServiceConfig, AgentTaskClient};
//! use prospectiq::domain::Campaign;
//! use prospectiq::enrich::EnrichmentCoordinator;
//! use prospectiq::pipeline::{run_discovery, AgentRoster};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Arc::new(AgentTaskClient::new(AgentServiceConfig::from_env()));
//!     let roster: AgentRoster =
//!         serde_json::from_str(&std::fs::read_to_string("roster.json").unwrap()).unwrap();
//!
//!     let campaign = Campaign::new("c1", "Midwest push", "Find mid-size manufacturers");
//!     let discovery = run_discovery(client.as_ref(), &roster, &campaign).await.unwrap();
//!
//!     let coordinator = EnrichmentCoordinator::new(client, roster.enrichment.clone());
//!     let report = coordinator
//!         .enrich_companies(&discovery.companies, &campaign)
//!         .await
//!         .unwrap();
//!     println!("enriched {} companies", report.enriched.len());
//! }
//! ```

pub mod api;
pub mod client;
pub mod domain;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod locate;
pub mod normalize;
pub mod pipeline;
pub mod retry;

pub use crate::api::{AgentProxy, PollRequest, SubmitRequest};
pub use crate::client::{
    AgentCallResponse, AgentCaller, AgentServiceConfig, AgentTaskClient, CallOptions, PollConfig,
    TaskStatus,
};
pub use crate::domain::{
    Campaign, CampaignFilters, CampaignStage, Company, CompanyContacts, EnrichedCompany,
};
pub use crate::enrich::{
    EnrichmentAgentIds, EnrichmentCoordinator, EnrichmentProgress, EnrichmentReport,
};
pub use crate::error::{AgentError, AgentResult, ParseError};
pub use crate::extract::parse_lenient;
pub use crate::locate::{locate, parse_agent_result};
pub use crate::normalize::{extract_text, normalize, NormalizedEnvelope, ResponseStatus};
pub use crate::pipeline::{run_contact_finder, run_discovery, AgentRoster};
pub use crate::retry::{call_with_retry, RetryPolicy};
