//! Tools shipped with the assistant and the registry assembled from them.

mod git;
mod notes;
mod price_watch;
mod search;
mod shell;

use moltbot_core::AppConfig;
use tracing::info;

use crate::guardrails::{ToolCapability, ToolPolicy};
use crate::tools::{ToolError, ToolRegistry};

pub use git::GitPushTool;
pub use notes::{ReadNoteTool, SearchNotesTool, WriteNoteTool};
pub use price_watch::{PriceWatchTool, WatchList, WatchTarget, DEFAULT_PRICE_SELECTOR};
pub use search::{WebSearchTool, MISSING_KEY_NOTICE};
pub use shell::RunShellTool;

/// Registers every built-in the policy does not deny.
pub fn default_registry(
    config: &AppConfig,
    policy: &ToolPolicy,
    watch_list: WatchList,
) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();

    for capability in ToolCapability::ALL {
        let decision = policy.evaluate(capability);
        if let Some(reason_code) = decision.reason_code() {
            info!(
                event_name = "agent.registry.policy",
                tool = capability.tool_name(),
                reason_code,
                detail = decision.user_message().unwrap_or_default(),
                fallback_path = decision.fallback_path().unwrap_or_default(),
                registered = decision.registers_tool(),
                "tool policy applied"
            );
        }
        if !decision.registers_tool() {
            continue;
        }

        let tools = &config.tools;
        match capability {
            ToolCapability::PriceWatch => {
                registry.register(PriceWatchTool::new(watch_list.clone()))?
            }
            ToolCapability::WebSearch => registry.register(WebSearchTool::new(&config.search))?,
            ToolCapability::WriteNote => registry.register(WriteNoteTool::new(&tools.data_dir))?,
            ToolCapability::ReadNote => registry.register(ReadNoteTool::new(&tools.data_dir))?,
            ToolCapability::SearchNotes => {
                registry.register(SearchNotesTool::new(&tools.data_dir))?
            }
            ToolCapability::Shell => registry.register(RunShellTool::new(&tools.workspace_dir))?,
            ToolCapability::GitPush => registry.register(GitPushTool::new(&tools.workspace_dir))?,
        }
    }

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use moltbot_core::AppConfig;

    use super::{default_registry, WatchList};
    use crate::guardrails::ToolPolicy;

    #[test]
    fn default_config_registers_safe_tools_only() {
        let config = AppConfig::default();
        let policy = ToolPolicy::from_config(&config);
        let registry =
            default_registry(&config, &policy, WatchList::new()).expect("registry builds");

        assert_eq!(
            registry.names(),
            vec!["read_note", "search_notes", "search_price_history", "web_search", "write_note"]
        );
    }

    #[test]
    fn enabled_host_tools_are_registered() {
        let mut config = AppConfig::default();
        config.tools.shell_enabled = true;
        config.tools.git_push_enabled = true;

        let policy = ToolPolicy::from_config(&config);
        let registry =
            default_registry(&config, &policy, WatchList::new()).expect("registry builds");

        assert_eq!(registry.len(), 7);
        assert!(registry.lookup("run_shell").is_some());
        assert!(registry.lookup("git_push_remote").is_some());
    }
}
