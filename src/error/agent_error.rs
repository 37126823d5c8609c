use thiserror::Error;

use super::error_context::{ErrorCode, ErrorContext};

/// Lenient JSON extraction errors.
///
/// Raised only when no plausible JSON-like structure survives cleanup.
/// Callers convert this into an explicit "no data" signal; it never
/// propagates further up the pipeline.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty input")]
    Empty,

    #[error("no JSON structure found in input")]
    NoStructure,

    #[error("malformed JSON after cleanup: {0}")]
    Malformed(String),
}

/// Errors raised by the task client and orchestration operations.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Task submit rejected ({status}): {message}")]
    SubmitRejected { status: u16, message: String },

    #[error("Agent task failed: {0}")]
    TaskFailed(String),

    #[error("Task expired or not found")]
    TaskExpired,

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("No recognizable domain payload: {0}")]
    NoDomainData(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgentError {
    /// Structured classification used by the poll loop and retry layers.
    pub fn context(&self) -> ErrorContext {
        match self {
            AgentError::Transport(msg) => {
                ErrorContext::retryable(ErrorCode::NetworkError, msg.clone())
            }
            AgentError::SubmitRejected { status, message } => {
                let code = if *status >= 500 {
                    ErrorCode::HttpServerError
                } else {
                    ErrorCode::TaskSubmitRejected
                };
                ErrorContext::non_retryable(code, message.clone()).with_http_status(*status)
            }
            AgentError::TaskFailed(msg) => {
                ErrorContext::non_retryable(ErrorCode::TaskFailed, msg.clone())
            }
            AgentError::TaskExpired => {
                ErrorContext::non_retryable(ErrorCode::TaskExpired, self.to_string())
                    .with_http_status(404)
            }
            AgentError::Timeout(msg) => {
                ErrorContext::retryable(ErrorCode::Timeout, msg.clone())
            }
            AgentError::NoDomainData(msg) => {
                ErrorContext::non_retryable(ErrorCode::NoDomainData, msg.clone())
            }
            AgentError::Serialization(msg) => {
                ErrorContext::non_retryable(ErrorCode::SerializationError, msg.clone())
            }
            AgentError::Internal(msg) => {
                ErrorContext::non_retryable(ErrorCode::InternalError, msg.clone())
            }
        }
    }

    /// True when a retry of the same operation could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.context().retryability,
            super::error_context::ErrorRetryability::Retryable
        )
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AgentError::Timeout(e.to_string())
        } else {
            AgentError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(e: serde_json::Error) -> Self {
        AgentError::Serialization(e.to_string())
    }
}
