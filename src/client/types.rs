use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ArtifactFile;
use crate::normalize::NormalizedEnvelope;

/// Reported status of an asynchronous agent task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Processing,
    Completed,
    Failed,
}

/// Handle returned by a successful task submission. Dropped client-side once
/// a terminal poll observation is consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedTask {
    pub task_id: String,
    pub agent_id: String,
    pub user_id: String,
    pub session_id: String,
    pub submitted_at: String,
}

/// Auxiliary outputs lifted from a manager task envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleOutputs {
    #[serde(default)]
    pub artifact_files: Vec<ArtifactFile>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// The uniform result of one agent call. Total: failures are encoded in
/// `success`/`error`, they are never thrown past this seam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCallResponse {
    pub success: bool,
    pub response: NormalizedEnvelope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_outputs: Option<ModuleOutputs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentCallResponse {
    /// Failure envelope: an error status, empty result, and the message in
    /// both the envelope and the `error` field.
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            response: NormalizedEnvelope::error(message.clone()),
            status: None,
            module_outputs: None,
            agent_id: None,
            user_id: None,
            session_id: None,
            timestamp: None,
            raw_response: None,
            error: Some(message),
        }
    }

    pub fn completed(response: NormalizedEnvelope) -> Self {
        Self {
            success: true,
            response,
            status: Some(TaskStatus::Completed),
            module_outputs: None,
            agent_id: None,
            user_id: None,
            session_id: None,
            timestamp: None,
            raw_response: None,
            error: None,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_raw_response(mut self, raw: impl Into<String>) -> Self {
        self.raw_response = Some(raw.into());
        self
    }

    /// Best error text: the `error` field, falling back to the envelope
    /// message.
    pub fn error_message(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.response.message.clone())
            .unwrap_or_default()
    }
}

/// One poll observation of a task.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// Still running; poll again later.
    Processing,
    /// Terminal: completed or failed. `http_status` is the upstream status
    /// hint for proxy surfaces.
    Terminal {
        http_status: u16,
        response: AgentCallResponse,
    },
}
