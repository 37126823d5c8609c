//! Submit/poll client for the hosted agent task service.
//!
//! A unit of work is submitted as an asynchronous task, then observed by
//! polling until a terminal state, a wall-clock ceiling, or too many
//! consecutive transport failures. Completed payloads run through the
//! lenient-extraction and normalization pipeline before they reach callers.
//!
//! [`AgentCaller`] is the seam the orchestration layers depend on; tests
//! substitute mock callers the same way the engine substitutes providers.

pub mod config;
pub mod task_client;
pub mod types;

use async_trait::async_trait;

pub use config::{AgentServiceConfig, PollConfig};
pub use task_client::AgentTaskClient;
pub use types::{
    AgentCallResponse, ModuleOutputs, PollOutcome, SubmittedTask, TaskStatus,
};

/// Optional identifiers and attachments for one agent call.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub assets: Vec<String>,
}

/// One complete agent invocation: submit a task, poll to a terminal state,
/// normalize the payload. Total: failures come back encoded in the response.
#[async_trait]
pub trait AgentCaller: Send + Sync {
    async fn call(&self, message: &str, agent_id: &str, options: CallOptions) -> AgentCallResponse;
}
