use std::time::Duration;

/// Poll-loop tuning. Defaults follow the hosted service's observed behavior:
/// short adaptive backoff, an 8-minute ceiling for manager/sub-agent chains,
/// and a bounded tolerance for consecutive transport failures.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay before the first poll; multiplied by `backoff_factor` each
    /// attempt.
    pub initial_interval: Duration,
    pub backoff_factor: f64,
    pub max_interval: Duration,
    /// Wall-clock ceiling for the whole poll loop.
    pub overall_timeout: Duration,
    /// Consecutive transport failures tolerated before the loop aborts.
    pub max_consecutive_transport_errors: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(300),
            backoff_factor: 1.5,
            max_interval: Duration::from_secs(5),
            overall_timeout: Duration::from_secs(8 * 60),
            max_consecutive_transport_errors: 5,
        }
    }
}

impl PollConfig {
    /// Backoff delay before poll attempt `attempt` (0-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let raw = self.initial_interval.as_millis() as f64 * self.backoff_factor.powi(attempt as i32);
        let capped = raw.min(self.max_interval.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }
}

/// Connection settings for the hosted agent task service.
#[derive(Debug, Clone)]
pub struct AgentServiceConfig {
    /// Service root; the client appends `/task` and `/task/{id}`.
    pub base_url: String,
    pub api_key: String,
    /// Submit calls tolerate long manager warm-up.
    pub submit_timeout: Duration,
    /// Individual poll requests are short.
    pub poll_request_timeout: Duration,
    pub poll: PollConfig,
}

impl Default for AgentServiceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            submit_timeout: Duration::from_secs(120),
            poll_request_timeout: Duration::from_secs(30),
            poll: PollConfig::default(),
        }
    }
}

impl AgentServiceConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Read `AGENT_API_URL` / `AGENT_API_KEY` from the environment.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("AGENT_API_URL").unwrap_or_default(),
            api_key: std::env::var("AGENT_API_KEY").unwrap_or_default(),
            ..Self::default()
        }
    }

    /// True when an API key is present; the health surface reports this.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn submit_url(&self) -> String {
        format!("{}/task", self.base_url.trim_end_matches('/'))
    }

    pub fn poll_url(&self, task_id: &str) -> String {
        format!("{}/task/{}", self.base_url.trim_end_matches('/'), task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_backoff_grows_and_caps() {
        let poll = PollConfig::default();
        assert_eq!(poll.delay_for_attempt(0), Duration::from_millis(300));
        assert_eq!(poll.delay_for_attempt(1), Duration::from_millis(450));
        assert_eq!(poll.delay_for_attempt(2), Duration::from_millis(675));
        // Far attempts clamp at the max interval.
        assert_eq!(poll.delay_for_attempt(20), Duration::from_secs(5));
    }

    #[test]
    fn test_urls_tolerate_trailing_slash() {
        let cfg = AgentServiceConfig::new("https://agents.example.com/v3/", "k");
        assert_eq!(cfg.submit_url(), "https://agents.example.com/v3/task");
        assert_eq!(
            cfg.poll_url("t-1"),
            "https://agents.example.com/v3/task/t-1"
        );
    }

    #[test]
    fn test_configured_requires_api_key() {
        assert!(!AgentServiceConfig::default().is_configured());
        assert!(AgentServiceConfig::new("", "key").is_configured());
    }
}
