//! Agent runtime: one user message in, one reply out.
//!
//! This crate is the orchestration half of moltbot:
//! - Seeds each turn with a fixed preamble (`prompt`, `conversation`)
//! - Asks a pluggable reasoning backend for a reply (`llm`, `gemini`)
//! - Runs at most one requested tool from an immutable registry (`tools`, `builtin`)
//! - Decides at startup which built-ins are exposed (`guardrails`)
//!
//! # Turn flow
//!
//! 1. **Model call** - history plus tool catalog go to the backend
//! 2. **Decision** - no tool, or the first requested tool only
//! 3. **Tool execution** - unknown names degrade to the model's own text
//! 4. **Follow-up** - the tool result goes back and the model's answer is the reply
//!
//! Any backend failure or raised tool rejection ends the turn with the fixed
//! apology. `AgentRuntime::respond` never returns an error.

pub mod builtin;
pub mod conversation;
pub mod gemini;
pub mod guardrails;
pub mod llm;
pub mod prompt;
pub mod runtime;
pub mod tools;

pub use builtin::{default_registry, WatchList};
pub use gemini::GeminiBackend;
pub use guardrails::{PolicyDecision, ToolCapability, ToolPolicy};
pub use llm::{BackendReply, LlmError, ModelDecision, ReasoningBackend};
pub use runtime::AgentRuntime;
pub use tools::{FunctionDeclaration, Tool, ToolError, ToolExecutor, ToolRegistry};
