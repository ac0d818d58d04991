use async_trait::async_trait;
use moltbot_core::TurnError;
use thiserror::Error;
use tracing::warn;

use crate::conversation::{Message, ToolInvocation};
use crate::tools::FunctionDeclaration;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("reasoning backend credentials are not configured")]
    MissingCredentials,
    #[error("reasoning backend request failed: {0}")]
    Http(String),
    #[error("reasoning backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("reasoning backend response could not be decoded: {0}")]
    Decode(String),
    #[error("reasoning backend returned no candidates")]
    EmptyResponse,
}

impl From<LlmError> for TurnError {
    fn from(error: LlmError) -> Self {
        match error {
            LlmError::MissingCredentials => Self::Configuration(error.to_string()),
            other => Self::Backend(other.to_string()),
        }
    }
}

/// One model response: its text and any tool calls, in the order given.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BackendReply {
    pub text: String,
    pub tool_calls: Vec<ToolInvocation>,
}

impl BackendReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), tool_calls: Vec::new() }
    }

    pub fn tool_call(invocation: ToolInvocation) -> Self {
        Self { text: String::new(), tool_calls: vec![invocation] }
    }

    /// Keeps only the first tool call; any others are logged and dropped.
    pub fn into_decision(self) -> ModelDecision {
        let mut calls = self.tool_calls.into_iter();
        let Some(invocation) = calls.next() else {
            return ModelDecision::NoToolNeeded(self.text);
        };

        let dropped = calls.map(|call| call.name).collect::<Vec<_>>();
        if !dropped.is_empty() {
            warn!(
                event_name = "agent.turn.extra_tool_calls_dropped",
                honored = %invocation.name,
                dropped = ?dropped,
                "model requested more than one tool; only the first is executed"
            );
        }

        ModelDecision::ToolRequested { text: self.text, invocation }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModelDecision {
    NoToolNeeded(String),
    ToolRequested { text: String, invocation: ToolInvocation },
}

#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    async fn generate(
        &self,
        history: &[Message],
        catalog: &[FunctionDeclaration],
    ) -> Result<BackendReply, LlmError>;
}

#[cfg(test)]
mod tests {
    use moltbot_core::TurnError;
    use serde_json::Map;

    use super::{BackendReply, LlmError, ModelDecision};
    use crate::conversation::ToolInvocation;

    #[test]
    fn plain_reply_needs_no_tool() {
        let decision = BackendReply::text("hello").into_decision();
        assert_eq!(decision, ModelDecision::NoToolNeeded("hello".to_string()));
    }

    #[test]
    fn only_the_first_tool_call_is_honored() {
        let reply = BackendReply {
            text: "working on it".to_string(),
            tool_calls: vec![
                ToolInvocation::new("web_search", Map::new()),
                ToolInvocation::new("write_note", Map::new()),
            ],
        };

        match reply.into_decision() {
            ModelDecision::ToolRequested { text, invocation } => {
                assert_eq!(text, "working on it");
                assert_eq!(invocation.name, "web_search");
            }
            other => panic!("expected a tool request, got {other:?}"),
        }
    }

    #[test]
    fn missing_credentials_map_to_configuration_class() {
        assert_eq!(TurnError::from(LlmError::MissingCredentials).class(), "configuration");
        assert_eq!(TurnError::from(LlmError::EmptyResponse).class(), "backend");
        let status = LlmError::Status { status: 503, body: "overloaded".to_string() };
        assert_eq!(TurnError::from(status).class(), "backend");
    }
}
