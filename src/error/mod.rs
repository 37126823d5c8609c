//! Error types for the agent orchestration core.
//!
//! - [`ParseError`] — Lenient JSON extraction failures. These never escape past
//!   the extractor's caller; downstream stages see "no data" instead.
//! - [`AgentError`] — Transport, task, and payload errors raised by the
//!   submit/poll client and the orchestration operations.
//! - [`ErrorContext`] — Structured error metadata (code, retryability, severity).

pub mod agent_error;
pub mod error_context;

pub use agent_error::{AgentError, ParseError};
pub use error_context::{ErrorCode, ErrorContext, ErrorRetryability, ErrorSeverity};

/// Convenience alias for agent-operation results.
pub type AgentResult<T> = Result<T, AgentError>;
