use moltbot_core::AppConfig;

/// Built-in capabilities the policy decides on when the registry is assembled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolCapability {
    PriceWatch,
    WebSearch,
    WriteNote,
    ReadNote,
    SearchNotes,
    Shell,
    GitPush,
}

impl ToolCapability {
    pub const ALL: [Self; 7] = [
        Self::PriceWatch,
        Self::WebSearch,
        Self::WriteNote,
        Self::ReadNote,
        Self::SearchNotes,
        Self::Shell,
        Self::GitPush,
    ];

    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::PriceWatch => "search_price_history",
            Self::WebSearch => "web_search",
            Self::WriteNote => "write_note",
            Self::ReadNote => "read_note",
            Self::SearchNotes => "search_notes",
            Self::Shell => "run_shell",
            Self::GitPush => "git_push_remote",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Deny { reason_code: &'static str, user_message: String, fallback_path: &'static str },
    Degrade { reason_code: &'static str, user_message: String, fallback_path: &'static str },
}

impl PolicyDecision {
    /// Denied tools are left out of the registry; degraded ones stay registered.
    pub fn registers_tool(&self) -> bool {
        !matches!(self, Self::Deny { .. })
    }

    pub fn reason_code(&self) -> Option<&'static str> {
        match self {
            Self::Allow => None,
            Self::Deny { reason_code, .. } | Self::Degrade { reason_code, .. } => {
                Some(*reason_code)
            }
        }
    }

    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::Deny { user_message, .. } | Self::Degrade { user_message, .. } => {
                Some(user_message)
            }
        }
    }

    /// The configuration change that lifts the restriction.
    pub fn fallback_path(&self) -> Option<&'static str> {
        match self {
            Self::Allow => None,
            Self::Deny { fallback_path, .. } | Self::Degrade { fallback_path, .. } => {
                Some(*fallback_path)
            }
        }
    }
}

/// Host side effects stay off unless configuration turns them on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolPolicy {
    pub shell_enabled: bool,
    pub git_push_enabled: bool,
    pub live_search: bool,
}

impl ToolPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            shell_enabled: config.tools.shell_enabled,
            git_push_enabled: config.tools.git_push_enabled,
            live_search: config.search.has_credentials(),
        }
    }

    pub fn evaluate(&self, capability: ToolCapability) -> PolicyDecision {
        match capability {
            ToolCapability::Shell if self.shell_enabled => PolicyDecision::Allow,
            ToolCapability::Shell => PolicyDecision::Deny {
                reason_code: "shell_disabled",
                user_message: "Shell commands are disabled on this host.".to_string(),
                fallback_path: "set tools.shell_enabled = true",
            },
            ToolCapability::GitPush if self.git_push_enabled => PolicyDecision::Allow,
            ToolCapability::GitPush => PolicyDecision::Deny {
                reason_code: "git_push_disabled",
                user_message: "Pushing to remotes is disabled on this host.".to_string(),
                fallback_path: "set tools.git_push_enabled = true",
            },
            ToolCapability::WebSearch if self.live_search => PolicyDecision::Allow,
            ToolCapability::WebSearch => PolicyDecision::Degrade {
                reason_code: "search_credentials_missing",
                user_message: "Web search returns a setup hint until a search API key is set."
                    .to_string(),
                fallback_path: "set search.api_key or SERP_API_KEY",
            },
            ToolCapability::PriceWatch
            | ToolCapability::WriteNote
            | ToolCapability::ReadNote
            | ToolCapability::SearchNotes => PolicyDecision::Allow,
        }
    }

    /// Every capability the policy denies or degrades, in catalog order.
    pub fn restrictions(&self) -> Vec<(ToolCapability, PolicyDecision)> {
        ToolCapability::ALL
            .into_iter()
            .map(|capability| (capability, self.evaluate(capability)))
            .filter(|(_, decision)| *decision != PolicyDecision::Allow)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use moltbot_core::AppConfig;

    use super::{PolicyDecision, ToolCapability, ToolPolicy};

    #[test]
    fn default_policy_denies_host_side_effects() {
        let policy = ToolPolicy::default();

        for capability in [ToolCapability::Shell, ToolCapability::GitPush] {
            let decision = policy.evaluate(capability);
            assert!(!decision.registers_tool(), "{capability:?} should be denied");
        }
        assert_eq!(policy.evaluate(ToolCapability::WriteNote), PolicyDecision::Allow);
    }

    #[test]
    fn search_without_credentials_degrades() {
        let policy = ToolPolicy::default();
        let decision = policy.evaluate(ToolCapability::WebSearch);

        assert!(matches!(decision, PolicyDecision::Degrade { .. }));
        assert_eq!(decision.reason_code(), Some("search_credentials_missing"));
        assert!(decision.fallback_path().unwrap_or_default().contains("SERP_API_KEY"));
        assert!(decision.user_message().is_some());
        assert!(decision.registers_tool());
    }

    #[test]
    fn restrictions_list_denied_and_degraded_tools_with_remedies() {
        let restrictions = ToolPolicy::default().restrictions();
        let summary = restrictions
            .iter()
            .map(|(capability, decision)| {
                (capability.tool_name(), decision.registers_tool(), decision.fallback_path())
            })
            .collect::<Vec<_>>();

        assert_eq!(
            summary,
            vec![
                ("web_search", true, Some("set search.api_key or SERP_API_KEY")),
                ("run_shell", false, Some("set tools.shell_enabled = true")),
                ("git_push_remote", false, Some("set tools.git_push_enabled = true")),
            ]
        );
        assert_eq!(PolicyDecision::Allow.fallback_path(), None);
    }

    #[test]
    fn config_flags_enable_host_tools() {
        let mut config = AppConfig::default();
        config.tools.shell_enabled = true;
        config.tools.git_push_enabled = true;
        config.search.api_key = Some("serp-key".to_string().into());

        let policy = ToolPolicy::from_config(&config);
        for capability in ToolCapability::ALL {
            assert_eq!(policy.evaluate(capability), PolicyDecision::Allow);
        }
        assert!(policy.restrictions().is_empty());
    }
}
