use serde::{Deserialize, Serialize};

use crate::client::{
    AgentCallResponse, AgentServiceConfig, AgentTaskClient, CallOptions, PollOutcome,
    SubmittedTask, TaskStatus,
};
use crate::error::AgentError;

/// Submit-mode request: a message for a named agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub message: String,
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<String>,
}

/// Poll-mode request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollRequest {
    pub task_id: String,
}

/// Liveness/config-presence report. Never reveals the key itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub configured: bool,
}

/// Submit reply body: either the task handle or the uniform failure envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SubmitBody {
    Accepted(SubmittedTask),
    Rejected(AgentCallResponse),
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitReply {
    /// HTTP status hint for whatever router mounts this surface.
    #[serde(skip)]
    pub http_status: u16,
    #[serde(flatten)]
    pub body: SubmitBody,
}

/// Poll reply body: still processing, or the uniform terminal envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PollBody {
    Processing { status: TaskStatus },
    Done(AgentCallResponse),
}

#[derive(Debug, Clone, Serialize)]
pub struct PollReply {
    #[serde(skip)]
    pub http_status: u16,
    #[serde(flatten)]
    pub body: PollBody,
}

/// Transport-agnostic proxy surface for the UI collaborator.
///
/// Both operations return uniform serde-serializable shapes plus an HTTP
/// status hint, so mounting them on any router is pure glue. The proxy holds
/// the API key; callers never see it.
pub struct AgentProxy {
    client: AgentTaskClient,
}

impl AgentProxy {
    pub fn new(config: AgentServiceConfig) -> Self {
        Self {
            client: AgentTaskClient::new(config),
        }
    }

    pub fn from_client(client: AgentTaskClient) -> Self {
        Self { client }
    }

    /// Liveness and config presence only.
    pub fn health(&self) -> Health {
        Health {
            status: "ok".to_string(),
            configured: self.client.config().is_configured(),
        }
    }

    /// Submit a task for an agent. One upstream call; no retry at this layer.
    pub async fn submit(&self, request: SubmitRequest) -> SubmitReply {
        if !self.client.config().is_configured() {
            return SubmitReply {
                http_status: 500,
                body: SubmitBody::Rejected(AgentCallResponse::failure(
                    "AGENT_API_KEY not configured on server",
                )),
            };
        }
        if request.message.is_empty() || request.agent_id.is_empty() {
            return SubmitReply {
                http_status: 400,
                body: SubmitBody::Rejected(AgentCallResponse::failure(
                    "message and agent_id are required",
                )),
            };
        }

        let options = CallOptions {
            user_id: request.user_id,
            session_id: request.session_id,
            assets: request.assets,
        };
        match self
            .client
            .submit(&request.message, &request.agent_id, &options)
            .await
        {
            Ok(task) => SubmitReply {
                http_status: 200,
                body: SubmitBody::Accepted(task),
            },
            Err(AgentError::SubmitRejected { status, message }) => SubmitReply {
                http_status: status,
                body: SubmitBody::Rejected(AgentCallResponse::failure(message)),
            },
            Err(AgentError::Timeout(_)) => SubmitReply {
                http_status: 504,
                body: SubmitBody::Rejected(AgentCallResponse::failure(
                    "Request to agent API timed out. The agent may still be processing. Please retry.",
                )),
            },
            Err(e) => SubmitReply {
                http_status: 500,
                body: SubmitBody::Rejected(AgentCallResponse::failure(e.to_string())),
            },
        }
    }

    /// One poll observation for a task id.
    pub async fn poll(&self, request: PollRequest) -> PollReply {
        if !self.client.config().is_configured() {
            return PollReply {
                http_status: 500,
                body: PollBody::Done(AgentCallResponse::failure(
                    "AGENT_API_KEY not configured on server",
                )),
            };
        }
        match self.client.poll_once(&request.task_id).await {
            Ok(PollOutcome::Processing) => PollReply {
                http_status: 200,
                body: PollBody::Processing {
                    status: TaskStatus::Processing,
                },
            },
            Ok(PollOutcome::Terminal {
                http_status,
                response,
            }) => PollReply {
                http_status,
                body: PollBody::Done(response),
            },
            Err(AgentError::Timeout(_)) => PollReply {
                http_status: 504,
                body: PollBody::Done(AgentCallResponse::failure(
                    "Request to agent API timed out. The agent may still be processing. Please retry.",
                )),
            },
            Err(e) => PollReply {
                http_status: 502,
                body: PollBody::Done(AgentCallResponse::failure(e.to_string())),
            },
        }
    }
}
