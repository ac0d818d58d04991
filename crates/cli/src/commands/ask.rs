use std::sync::Arc;

use moltbot_agent::{default_registry, AgentRuntime, GeminiBackend, ToolPolicy, WatchList};
use moltbot_core::config::{AppConfig, LoadOptions};
use moltbot_render::smart_reply;

use crate::commands::{CommandResult, FailureClass};

const COMMAND: &str = "ask";

/// Runs one full turn. Backend failures still exit 0: the reply is the apology.
pub fn run(text: &str, caller_id: Option<&str>, json_output: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                FailureClass::ConfigValidation,
                format!("configuration invalid: {error}"),
            );
        }
    };

    let backend = match GeminiBackend::from_config(&config.llm) {
        Ok(backend) => backend,
        Err(error) => {
            return CommandResult::failure(COMMAND, FailureClass::BackendSetup, error.to_string());
        }
    };

    let registry =
        match default_registry(&config, &ToolPolicy::from_config(&config), WatchList::new()) {
            Ok(registry) => registry,
            Err(error) => {
                return CommandResult::failure(
                    COMMAND,
                    FailureClass::ToolRegistry,
                    error.to_string(),
                );
            }
        };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                FailureClass::RuntimeInit,
                format!("failed to initialize async runtime: {error}"),
            );
        }
    };

    let agent = AgentRuntime::new(Arc::new(backend), Arc::new(registry));
    let reply = runtime.block_on(agent.respond(text, caller_id));

    if json_output {
        CommandResult::payload(COMMAND, &smart_reply(&reply))
    } else {
        CommandResult::text(reply)
    }
}
