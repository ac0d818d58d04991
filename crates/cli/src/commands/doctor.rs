use moltbot_agent::{default_registry, ToolPolicy, WatchList};
use moltbot_core::config::{AppConfig, LoadOptions};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Degraded,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            serde_json::json!({
                "overall_status": "fail",
                "summary": "doctor serialization failed",
                "error": error.to_string(),
            })
            .to_string()
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_backend_credentials(&config));
            checks.push(check_search_mode(&config));
            checks.push(check_tool_registry(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["backend_credentials", "search_mode", "tool_registry"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let any_fail = checks
        .iter()
        .any(|check| matches!(check.status, CheckStatus::Fail | CheckStatus::Skipped));
    let any_degraded = checks.iter().any(|check| check.status == CheckStatus::Degraded);
    let (overall_status, summary) = if any_fail {
        (CheckStatus::Fail, "doctor: one or more readiness checks failed")
    } else if any_degraded {
        (CheckStatus::Degraded, "doctor: ready with degraded capabilities")
    } else {
        (CheckStatus::Pass, "doctor: all readiness checks passed")
    };

    DoctorReport { overall_status, summary: summary.to_string(), checks }
}

fn check_backend_credentials(config: &AppConfig) -> DoctorCheck {
    if config.llm.has_credentials() {
        return DoctorCheck {
            name: "backend_credentials",
            status: CheckStatus::Pass,
            details: format!("api key configured for model `{}`", config.llm.model),
        };
    }

    DoctorCheck {
        name: "backend_credentials",
        status: CheckStatus::Fail,
        details: "no api key (set MOLTBOT_LLM_API_KEY or GEMINI_API_KEY); \
                  every turn will reply with the fallback apology"
            .to_string(),
    }
}

fn check_search_mode(config: &AppConfig) -> DoctorCheck {
    if config.search.has_credentials() {
        return DoctorCheck {
            name: "search_mode",
            status: CheckStatus::Pass,
            details: format!("live search via {}", config.search.base_url),
        };
    }

    DoctorCheck {
        name: "search_mode",
        status: CheckStatus::Degraded,
        details: "no search api key; web_search returns a setup hint".to_string(),
    }
}

fn check_tool_registry(config: &AppConfig) -> DoctorCheck {
    let policy = ToolPolicy::from_config(config);
    let registry = match default_registry(config, &policy, WatchList::new()) {
        Ok(registry) => registry,
        Err(error) => {
            return DoctorCheck {
                name: "tool_registry",
                status: CheckStatus::Fail,
                details: error.to_string(),
            };
        }
    };

    let mut details = format!("{} tools: {}", registry.len(), registry.names().join(", "));
    let restrictions = policy
        .restrictions()
        .into_iter()
        .map(|(capability, decision)| {
            let verdict = if decision.registers_tool() { "degraded" } else { "denied" };
            format!(
                "{} {verdict} ({})",
                capability.tool_name(),
                decision.fallback_path().unwrap_or("no remedy")
            )
        })
        .collect::<Vec<_>>();
    if !restrictions.is_empty() {
        details.push_str("; restricted: ");
        details.push_str(&restrictions.join(", "));
    }

    DoctorCheck { name: "tool_registry", status: CheckStatus::Pass, details }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Degraded => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
