//! Campaign pipeline operations: discovery and contact finding.
//!
//! Each operation takes an [`crate::client::AgentCaller`], an
//! [`AgentRoster`], and campaign context, and returns plain outcome structs.
//! The enrichment stage lives in [`crate::enrich`].

pub mod contacts;
pub mod discovery;
pub mod roster;

pub use contacts::{run_contact_finder, ContactOutcome};
pub use discovery::{run_direct_pipeline, run_discovery, DiscoveryOutcome};
pub use roster::AgentRoster;
