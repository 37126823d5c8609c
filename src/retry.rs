//! Bounded retry for agent calls that failed transiently.
//!
//! Classification is a local policy over the failure message; the wrapper
//! knows nothing about the service's idempotency guarantees. Callers must
//! ensure the wrapped operation is safe to repeat. Task submission is: each
//! attempt creates a fresh task rather than mutating shared state.

use std::time::Duration;

use crate::client::{AgentCallResponse, AgentCaller, CallOptions};

/// Substrings (case-insensitive) that mark a failure as transient.
const TRANSIENT_MARKERS: &[&str] = &["network", "timeout", "timed out", "no response", "connection"];

/// Retry tuning. Backoff is linear: `base_delay`, then `2 * base_delay`, ...
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(3),
        }
    }
}

/// True when the failure message suggests a retry could succeed.
pub fn is_transient_failure(message: &str) -> bool {
    let lower = message.to_lowercase();
    TRANSIENT_MARKERS.iter().any(|m| lower.contains(m))
}

/// Call an agent, retrying transient failures up to the policy's attempt
/// budget. Permanent failures and successes return immediately; the last
/// failure is returned once attempts are exhausted.
pub async fn call_with_retry(
    caller: &dyn AgentCaller,
    message: &str,
    agent_id: &str,
    options: CallOptions,
    policy: &RetryPolicy,
) -> AgentCallResponse {
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let result = caller.call(message, agent_id, options.clone()).await;
        if result.success {
            return result;
        }
        let failure = result.error_message();
        if !is_transient_failure(&failure) || attempt >= attempts {
            return result;
        }
        let delay = policy.base_delay * attempt;
        tracing::warn!(
            agent_id,
            attempt,
            "transient failure, retrying in {delay:?}: {failure}"
        );
        tokio::time::sleep(delay).await;
    }
}
