use std::sync::Arc;

use moltbot_core::{TurnError, EMPTY_REPLY_FALLBACK};
use moltbot_render::{smart_reply, OutgoingMessage};
use tracing::{debug, info, warn};

use crate::conversation::{ConversationTurn, ToolInvocation};
use crate::llm::{ModelDecision, ReasoningBackend};
use crate::tools::{FunctionDeclaration, ToolRegistry};

/// Where a turn is between its three suspension points.
#[derive(Debug)]
enum TurnState {
    AwaitingModel,
    ExecutingTool { text: String, invocation: ToolInvocation },
    AwaitingFollowUp,
    Done(String),
    Failed(TurnError),
}

impl TurnState {
    fn label(&self) -> &'static str {
        match self {
            Self::AwaitingModel => "awaiting_model",
            Self::ExecutingTool { .. } => "executing_tool",
            Self::AwaitingFollowUp => "awaiting_follow_up",
            Self::Done(_) => "done",
            Self::Failed(_) => "failed",
        }
    }
}

/// Drives one user message through the backend and at most one tool call.
pub struct AgentRuntime {
    backend: Arc<dyn ReasoningBackend>,
    registry: Arc<ToolRegistry>,
    catalog: Vec<FunctionDeclaration>,
}

impl AgentRuntime {
    pub fn new(backend: Arc<dyn ReasoningBackend>, registry: Arc<ToolRegistry>) -> Self {
        let catalog = registry.catalog();
        Self { backend, registry, catalog }
    }

    /// Returns the reply text for `user_text`. Never fails: any backend or tool
    /// rejection collapses to the fixed apology.
    pub async fn respond(&self, user_text: &str, caller_id: Option<&str>) -> String {
        let user_text = user_text.trim();
        if user_text.is_empty() {
            return EMPTY_REPLY_FALLBACK.to_string();
        }

        let mut turn = ConversationTurn::start(user_text, caller_id);
        match self.run_turn(&mut turn).await {
            Ok(reply) => reply,
            Err(error) => {
                warn!(
                    event_name = "agent.turn.failed",
                    correlation_id = %turn.turn_id(),
                    caller_id = %turn.caller_label(),
                    error_class = error.class(),
                    error = %error,
                    "turn failed"
                );
                error.user_message().to_string()
            }
        }
    }

    /// Runs a turn and renders the result for a transport.
    pub async fn reply(&self, user_text: &str, caller_id: Option<&str>) -> OutgoingMessage {
        smart_reply(&self.respond(user_text, caller_id).await)
    }

    async fn run_turn(&self, turn: &mut ConversationTurn) -> Result<String, TurnError> {
        let mut state = TurnState::AwaitingModel;

        loop {
            debug!(
                event_name = "agent.turn.state",
                correlation_id = %turn.turn_id(),
                caller_id = %turn.caller_label(),
                state = state.label(),
                "turn state"
            );

            state = match state {
                TurnState::AwaitingModel => {
                    match self.backend.generate(turn.history(), &self.catalog).await {
                        Ok(reply) => self.decide(turn, reply.into_decision()),
                        Err(error) => TurnState::Failed(error.into()),
                    }
                }
                TurnState::ExecutingTool { text, invocation } => {
                    self.execute_tool(turn, text, invocation).await
                }
                TurnState::AwaitingFollowUp => {
                    match self.backend.generate(turn.history(), &self.catalog).await {
                        Ok(reply) => TurnState::Done(reply.text),
                        Err(error) => TurnState::Failed(error.into()),
                    }
                }
                TurnState::Done(text) => return Ok(text),
                TurnState::Failed(error) => return Err(error),
            };
        }
    }

    fn decide(&self, turn: &ConversationTurn, decision: ModelDecision) -> TurnState {
        match decision {
            ModelDecision::NoToolNeeded(text) => TurnState::Done(text),
            ModelDecision::ToolRequested { text, invocation } => {
                info!(
                    event_name = "agent.turn.tool_decided",
                    correlation_id = %turn.turn_id(),
                    caller_id = %turn.caller_label(),
                    tool = %invocation.name,
                    "tool decided"
                );

                if self.registry.lookup(&invocation.name).is_some() {
                    TurnState::ExecutingTool { text, invocation }
                } else {
                    warn!(
                        event_name = "agent.turn.unknown_tool",
                        correlation_id = %turn.turn_id(),
                        tool = %invocation.name,
                        "model requested an unregistered tool; using its text reply"
                    );
                    TurnState::Done(text)
                }
            }
        }
    }

    async fn execute_tool(
        &self,
        turn: &mut ConversationTurn,
        text: String,
        invocation: ToolInvocation,
    ) -> TurnState {
        let Some(executor) = self.registry.lookup(&invocation.name) else {
            return TurnState::Done(text);
        };

        match executor.execute(invocation.args_value()).await {
            Ok(result) => {
                debug!(
                    event_name = "agent.turn.tool_completed",
                    correlation_id = %turn.turn_id(),
                    tool = %invocation.name,
                    result_chars = result.chars().count(),
                    "tool completed"
                );
                turn.record_tool_round_trip(&text, invocation, result);
                TurnState::AwaitingFollowUp
            }
            Err(error) => TurnState::Failed(TurnError::ToolExecution {
                name: invocation.name,
                message: error.to_string(),
            }),
        }
    }
}
