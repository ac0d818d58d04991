use thiserror::Error;

/// Returned to the user whenever a turn fails, whatever the cause.
pub const APOLOGY_MESSAGE: &str =
    "⚠️ 接觸異常，思維鏈路中斷。請稍後重試。\n(Error: AI Service Unavailable)";

/// Sent instead of an empty reply.
pub const EMPTY_REPLY_FALLBACK: &str = "⚠️ (無回應)";

/// Failures that end a turn early. Unknown tool names are not represented here:
/// they degrade to the model's own text and never reach the caller as errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TurnError {
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("reasoning backend failure: {0}")]
    Backend(String),
    #[error("tool `{name}` failed: {message}")]
    ToolExecution { name: String, message: String },
}

impl TurnError {
    pub fn class(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Backend(_) => "backend",
            Self::ToolExecution { .. } => "tool_execution",
        }
    }

    /// The detail of every class collapses to the same apology.
    pub fn user_message(&self) -> &'static str {
        APOLOGY_MESSAGE
    }
}
