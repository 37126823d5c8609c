//! Public API layer. Stable entry points for external consumers.
//!
//! The proxy surface mirrors the two-mode POST contract the UI collaborator
//! speaks (submit vs poll, discriminated by body fields) plus a GET health
//! check, expressed as plain async handlers over serde types rather than a
//! bound HTTP framework.

mod proxy;

pub use proxy::{
    AgentProxy, Health, PollBody, PollReply, PollRequest, SubmitBody, SubmitReply, SubmitRequest,
};
