use serde_json::{json, Value};
use tokio::time::Instant;
use uuid::Uuid;

use async_trait::async_trait;

use crate::error::{AgentError, AgentResult};
use crate::extract::parse_lenient;
use crate::normalize::normalize;

use super::config::AgentServiceConfig;
use super::types::{
    AgentCallResponse, ModuleOutputs, PollOutcome, SubmittedTask, TaskStatus,
};
use super::{AgentCaller, CallOptions};

/// HTTP client for the agent task service.
pub struct AgentTaskClient {
    config: AgentServiceConfig,
    http: reqwest::Client,
}

impl AgentTaskClient {
    pub fn new(config: AgentServiceConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &AgentServiceConfig {
        &self.config
    }

    /// Submit a task. Non-2xx responses surface immediately as
    /// [`AgentError::SubmitRejected`]; retry is the caller's concern.
    pub async fn submit(
        &self,
        message: &str,
        agent_id: &str,
        options: &CallOptions,
    ) -> AgentResult<SubmittedTask> {
        let user_id = options
            .user_id
            .clone()
            .unwrap_or_else(|| format!("user-{}", Uuid::new_v4()));
        let session_id = options
            .session_id
            .clone()
            .unwrap_or_else(|| generated_session_id(agent_id));

        let mut payload = json!({
            "message": message,
            "id": agent_id,
            "user_id": &user_id,
            "session_id": &session_id,
        });
        if !options.assets.is_empty() {
            payload["assets"] = json!(options.assets);
        }

        let res = self
            .http
            .post(self.config.submit_url())
            .header("x-api-key", &self.config.api_key)
            .json(&payload)
            .timeout(self.config.submit_timeout)
            .send()
            .await?;

        let status = res.status().as_u16();
        let text = res.text().await?;

        if !(200..300).contains(&status) {
            return Err(AgentError::SubmitRejected {
                status,
                message: extract_error_message(&text, status),
            });
        }

        let body: Value = serde_json::from_str(&text)?;
        let task_id = body
            .get("task_id")
            .and_then(Value::as_str)
            .ok_or_else(|| AgentError::TaskFailed("No task_id in response".to_string()))?
            .to_string();

        Ok(SubmittedTask {
            task_id,
            agent_id: agent_id.to_string(),
            user_id,
            session_id,
            submitted_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// One poll observation. Transport failures and 502/503/504 come back as
    /// transient errors for the loop's consecutive-error counter; everything
    /// else is a terminal observation.
    pub async fn poll_once(&self, task_id: &str) -> AgentResult<PollOutcome> {
        let res = self
            .http
            .get(self.config.poll_url(task_id))
            .header("accept", "application/json")
            .header("x-api-key", &self.config.api_key)
            .timeout(self.config.poll_request_timeout)
            .send()
            .await?;

        let status = res.status().as_u16();

        if status == 404 {
            let raw = res.text().await.unwrap_or_default();
            let expired = AgentError::TaskExpired;
            let response = AgentCallResponse::failure(expired.to_string())
                .with_status(TaskStatus::Failed)
                .with_raw_response(raw);
            return Ok(PollOutcome::Terminal {
                http_status: 404,
                response,
            });
        }

        if (502..=504).contains(&status) {
            return Err(AgentError::Transport(format!(
                "Poll failed with status {status}"
            )));
        }

        let text = res.text().await?;

        if !(200..300).contains(&status) {
            let response = AgentCallResponse::failure(format!("Poll failed with status {status}"))
                .with_status(TaskStatus::Failed)
                .with_raw_response(text);
            return Ok(PollOutcome::Terminal {
                http_status: status,
                response,
            });
        }

        let task: Value = serde_json::from_str(&text)?;
        match task.get("status").and_then(Value::as_str) {
            Some("processing") => Ok(PollOutcome::Processing),
            Some("failed") => {
                let message = task
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("Agent task failed")
                    .to_string();
                let response = AgentCallResponse::failure(message).with_status(TaskStatus::Failed);
                Ok(PollOutcome::Terminal {
                    http_status: 500,
                    response,
                })
            }
            // Anything else carries a payload; run the completion pipeline.
            _ => Ok(PollOutcome::Terminal {
                http_status: 200,
                response: build_completion_response(
                    task.get("response").cloned().unwrap_or(Value::Null),
                ),
            }),
        }
    }

    /// Submit and poll to a terminal state. Total: every failure mode maps to
    /// an `AgentCallResponse` with `success: false`.
    pub async fn call_task(
        &self,
        message: &str,
        agent_id: &str,
        options: CallOptions,
    ) -> AgentCallResponse {
        let submitted = match self.submit(message, agent_id, &options).await {
            Ok(t) => t,
            Err(e) => return AgentCallResponse::failure(e.to_string()),
        };

        let poll = &self.config.poll;
        let start = Instant::now();
        let mut attempt: u32 = 0;
        let mut consecutive: u32 = 0;

        while start.elapsed() < poll.overall_timeout {
            tokio::time::sleep(poll.delay_for_attempt(attempt)).await;
            attempt += 1;

            match self.poll_once(&submitted.task_id).await {
                Err(e) if e.is_transient() => {
                    consecutive += 1;
                    tracing::warn!(
                        task_id = %submitted.task_id,
                        consecutive,
                        "transient poll failure: {e}"
                    );
                    if consecutive >= poll.max_consecutive_transport_errors {
                        break;
                    }
                }
                Err(e) => {
                    return attach_ids(AgentCallResponse::failure(e.to_string()), &submitted);
                }
                Ok(PollOutcome::Processing) => {
                    consecutive = 0;
                }
                Ok(PollOutcome::Terminal { response, .. }) => {
                    return attach_ids(response, &submitted);
                }
            }
        }

        let (message, error) = if consecutive >= poll.max_consecutive_transport_errors {
            (
                "Lost connection to the server after multiple retries. Please check your connection and try again.",
                "Connection lost after repeated poll failures",
            )
        } else {
            (
                "Agent task timed out after 8 minutes. The agent may still be processing. Please try again.",
                "Agent task timed out",
            )
        };
        let mut response = AgentCallResponse::failure(message);
        response.error = Some(error.to_string());
        attach_ids(response, &submitted)
    }
}

#[async_trait]
impl AgentCaller for AgentTaskClient {
    async fn call(&self, message: &str, agent_id: &str, options: CallOptions) -> AgentCallResponse {
        self.call_task(message, agent_id, options).await
    }
}

fn generated_session_id(agent_id: &str) -> String {
    let uuid = Uuid::new_v4().to_string();
    format!("{}-{}", agent_id, &uuid[..12])
}

fn attach_ids(mut response: AgentCallResponse, task: &SubmittedTask) -> AgentCallResponse {
    response.agent_id = Some(task.agent_id.clone());
    response.user_id = Some(task.user_id.clone());
    response.session_id = Some(task.session_id.clone());
    response
}

/// Probe an error body for a human-usable message: strict JSON first
/// (`detail`/`error`/`message`), then the lenient parser, then a generic
/// status line.
fn extract_error_message(body: &str, status: u16) -> String {
    let fallback = format!("Task submit failed with status {status}");
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "error", "message"] {
            if let Some(msg) = v.get(key).and_then(Value::as_str) {
                return msg.to_string();
            }
        }
        return fallback;
    }
    if let Ok(v) = parse_lenient(body) {
        for key in ["error", "message"] {
            if let Some(msg) = v.get(key).and_then(Value::as_str) {
                return msg.to_string();
            }
        }
    }
    fallback
}

/// Completion pipeline: lift a manager envelope when present, lenient-parse
/// stringified payloads (with one extra pass for double-stringified manager
/// output), then normalize.
fn build_completion_response(task_response: Value) -> AgentCallResponse {
    let raw_text = serde_json::to_string(&task_response).unwrap_or_default();

    let mut module_outputs: Option<ModuleOutputs> = None;
    let mut inner = task_response.clone();
    if let Some(map) = task_response.as_object() {
        if map.contains_key("response") {
            module_outputs = map
                .get("module_outputs")
                .and_then(|v| serde_json::from_value(v.clone()).ok());
            inner = map.get("response").cloned().unwrap_or(Value::Null);
        }
    }

    let parsed = match &inner {
        // Extraction failure leaves the prose itself as the payload.
        Value::String(s) => parse_lenient(s).unwrap_or_else(|_| Value::String(s.clone())),
        other => other.clone(),
    };

    // A string at this point is double-stringified manager output; one more
    // single-pass parse, never a loop.
    let parsed = match parsed {
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(v) => v,
            Err(_) => parse_lenient(&s).unwrap_or(Value::String(s)),
        },
        other => other,
    };

    // A `{success: false, data: null}` husk recovered from text is noise;
    // normalize the pre-parse payload instead.
    let is_husk = parsed
        .as_object()
        .map(|m| {
            m.get("success") == Some(&Value::Bool(false))
                && m.get("data").map(Value::is_null).unwrap_or(false)
        })
        .unwrap_or(false);
    let to_normalize = if is_husk { inner } else { parsed };

    let normalized = normalize(to_normalize);
    tracing::debug!(
        result_keys = ?normalized.result.keys().take(10).collect::<Vec<_>>(),
        "task completed and normalized"
    );

    let mut response = AgentCallResponse::completed(normalized).with_raw_response(raw_text);
    response.module_outputs = module_outputs;
    response.timestamp = Some(chrono::Utc::now().to_rfc3339());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use mockito::Server;

    use crate::client::config::PollConfig;
    use crate::normalize::ResponseStatus;

    fn fast_config(base_url: String) -> AgentServiceConfig {
        AgentServiceConfig {
            base_url,
            api_key: "test-key".into(),
            submit_timeout: Duration::from_secs(5),
            poll_request_timeout: Duration::from_secs(5),
            poll: PollConfig {
                initial_interval: Duration::from_millis(1),
                backoff_factor: 1.0,
                max_interval: Duration::from_millis(5),
                overall_timeout: Duration::from_secs(5),
                max_consecutive_transport_errors: 3,
            },
        }
    }

    async fn submit_mock(server: &mut Server) -> mockito::Mock {
        server
            .mock("POST", "/task")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"task_id": "t-1"}"#)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_submit_returns_task_and_generated_ids() {
        let mut server = Server::new_async().await;
        let mock = submit_mock(&mut server).await;

        let client = AgentTaskClient::new(fast_config(server.url()));
        let task = client
            .submit("find companies", "agent-1", &CallOptions::default())
            .await
            .unwrap();
        assert_eq!(task.task_id, "t-1");
        assert!(task.user_id.starts_with("user-"));
        assert!(task.session_id.starts_with("agent-1-"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_rejected_probes_detail_field() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/task")
            .with_status(422)
            .with_body(r#"{"detail": "agent not found"}"#)
            .create_async().await;

        let client = AgentTaskClient::new(fast_config(server.url()));
        let err = client
            .submit("hi", "missing-agent", &CallOptions::default())
            .await
            .unwrap_err();
        match err {
            AgentError::SubmitRejected { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "agent not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_submit_rejected_lenient_error_body() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/task")
            .with_status(500)
            .with_body("Internal failure: {\"error\": \"upstream exploded\",}")
            .create_async().await;

        let client = AgentTaskClient::new(fast_config(server.url()));
        let err = client
            .submit("hi", "a", &CallOptions::default())
            .await
            .unwrap_err();
        match err {
            AgentError::SubmitRejected { message, .. } => {
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_poll_404_is_terminal_expired() {
        let mut server = Server::new_async().await;
        server.mock("GET", "/task/t-1").with_status(404).create_async().await;

        let client = AgentTaskClient::new(fast_config(server.url()));
        match client.poll_once("t-1").await.unwrap() {
            PollOutcome::Terminal {
                http_status,
                response,
            } => {
                assert_eq!(http_status, 404);
                assert!(!response.success);
                assert_eq!(response.error.as_deref(), Some("Task expired or not found"));
                assert_eq!(response.status, Some(TaskStatus::Failed));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_poll_503_is_transient() {
        let mut server = Server::new_async().await;
        server.mock("GET", "/task/t-1").with_status(503).create_async().await;

        let client = AgentTaskClient::new(fast_config(server.url()));
        let err = client.poll_once("t-1").await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_poll_failed_task_passes_error_through() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/task/t-1")
            .with_status(200)
            .with_body(r#"{"status": "failed", "error": "agent exceeded budget"}"#)
            .create_async().await;

        let client = AgentTaskClient::new(fast_config(server.url()));
        match client.poll_once("t-1").await.unwrap() {
            PollOutcome::Terminal { response, .. } => {
                assert_eq!(response.error.as_deref(), Some("agent exceeded budget"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_call_polls_until_completed() {
        let mut server = Server::new_async().await;
        submit_mock(&mut server).await;
        server
            .mock("GET", "/task/t-1")
            .with_status(200)
            .with_body(r#"{"status": "completed", "response": {"companies": [{"name": "Acme"}]}}"#)
            .create_async().await;

        let client = AgentTaskClient::new(fast_config(server.url()));
        let result = client
            .call_task("find", "agent-1", CallOptions::default())
            .await;
        assert!(result.success);
        assert_eq!(result.status, Some(TaskStatus::Completed));
        assert!(result.response.result.contains_key("companies"));
        assert_eq!(result.agent_id.as_deref(), Some("agent-1"));
    }

    #[tokio::test]
    async fn test_call_aborts_after_consecutive_transport_errors() {
        let mut server = Server::new_async().await;
        submit_mock(&mut server).await;
        server.mock("GET", "/task/t-1").with_status(502).create_async().await;

        let client = AgentTaskClient::new(fast_config(server.url()));
        let result = client
            .call_task("find", "agent-1", CallOptions::default())
            .await;
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Connection lost after repeated poll failures")
        );
    }

    #[tokio::test]
    async fn test_call_times_out_on_endless_processing() {
        let mut server = Server::new_async().await;
        submit_mock(&mut server).await;
        server
            .mock("GET", "/task/t-1")
            .with_status(200)
            .with_body(r#"{"status": "processing"}"#)
            .create_async().await;

        let mut config = fast_config(server.url());
        config.poll.overall_timeout = Duration::from_millis(30);
        let client = AgentTaskClient::new(config);
        let result = client
            .call_task("find", "agent-1", CallOptions::default())
            .await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Agent task timed out"));
    }

    #[tokio::test]
    async fn test_completion_unwraps_manager_envelope() {
        let task_response = json!({
            "response": r#"{"companies": [{"name": "Acme"}]}"#,
            "module_outputs": {
                "artifact_files": [
                    {"file_url": "https://files.example.com/x.xlsx",
                     "name": "contacts.xlsx", "format_type": "xlsx"}
                ]
            }
        });
        let result = build_completion_response(task_response);
        assert!(result.success);
        assert!(result.response.result.contains_key("companies"));
        let artifacts = result.module_outputs.unwrap().artifact_files;
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].name, "contacts.xlsx");
    }

    #[tokio::test]
    async fn test_completion_double_stringified_payload() {
        // The manager returned a string whose parse is itself a string.
        let payload = serde_json::to_string(r#"{"companies": [{"name": "Acme"}]}"#).unwrap();
        let result = build_completion_response(Value::String(payload));
        assert!(result.response.result.contains_key("companies"));
    }

    #[tokio::test]
    async fn test_completion_husk_falls_back_to_raw_payload() {
        let result =
            build_completion_response(Value::String(r#"{"success": false, "data": null}"#.into()));
        // The husk is discarded; the raw string payload is normalized instead.
        assert_eq!(result.response.status, ResponseStatus::Success);
        assert!(result.response.result.contains_key("text"));
    }

    #[tokio::test]
    async fn test_completion_plain_prose_payload() {
        let result = build_completion_response(Value::String("I found nothing useful.".into()));
        assert_eq!(
            result.response.message.as_deref(),
            Some("I found nothing useful.")
        );
    }
}
