use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use moltbot_core::config::{AppConfig, LoadOptions};
use secrecy::{ExposeSecret, SecretString};
use toml::Value;

struct ConfigFile {
    path: Option<PathBuf>,
    doc: Option<Value>,
}

impl ConfigFile {
    fn detect() -> Self {
        let path = detect_config_path();
        let doc = load_config_file_doc(path.as_deref());
        Self { path, doc }
    }

    fn line(&self, key_path: &str, value: &str, env_keys: &[&str]) -> String {
        format!("- {key_path} = {value} (source: {})", self.source(key_path, env_keys))
    }

    fn source(&self, key_path: &str, env_keys: &[&str]) -> String {
        if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = &self.doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .path
                    .as_deref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let file = ConfigFile::detect();
    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(file.line(
        "llm.api_key",
        &redact_secret(config.llm.api_key.as_ref()),
        &["MOLTBOT_LLM_API_KEY", "GEMINI_API_KEY"],
    ));
    lines.push(file.line("llm.base_url", &config.llm.base_url, &["MOLTBOT_LLM_BASE_URL"]));
    lines.push(file.line("llm.model", &config.llm.model, &["MOLTBOT_LLM_MODEL"]));
    lines.push(file.line(
        "llm.timeout_secs",
        &config.llm.timeout_secs.to_string(),
        &["MOLTBOT_LLM_TIMEOUT_SECS"],
    ));
    lines.push(file.line(
        "llm.max_retries",
        &config.llm.max_retries.to_string(),
        &["MOLTBOT_LLM_MAX_RETRIES"],
    ));

    lines.push(file.line(
        "search.api_key",
        &redact_secret(config.search.api_key.as_ref()),
        &["MOLTBOT_SEARCH_API_KEY", "SERP_API_KEY"],
    ));
    lines.push(file.line("search.base_url", &config.search.base_url, &["MOLTBOT_SEARCH_BASE_URL"]));
    lines.push(file.line(
        "search.result_limit",
        &config.search.result_limit.to_string(),
        &["MOLTBOT_SEARCH_RESULT_LIMIT"],
    ));

    lines.push(file.line(
        "tools.data_dir",
        &config.tools.data_dir.display().to_string(),
        &["MOLTBOT_TOOLS_DATA_DIR"],
    ));
    lines.push(file.line(
        "tools.workspace_dir",
        &config.tools.workspace_dir.display().to_string(),
        &["MOLTBOT_TOOLS_WORKSPACE_DIR"],
    ));
    lines.push(file.line(
        "tools.shell_enabled",
        &config.tools.shell_enabled.to_string(),
        &["MOLTBOT_TOOLS_SHELL_ENABLED"],
    ));
    lines.push(file.line(
        "tools.git_push_enabled",
        &config.tools.git_push_enabled.to_string(),
        &["MOLTBOT_TOOLS_GIT_PUSH_ENABLED"],
    ));

    lines.push(file.line(
        "logging.level",
        &config.logging.level,
        &["MOLTBOT_LOGGING_LEVEL", "MOLTBOT_LOG_LEVEL"],
    ));
    lines.push(file.line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        &["MOLTBOT_LOGGING_FORMAT", "MOLTBOT_LOG_FORMAT"],
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    ["moltbot.toml", "config/moltbot.toml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

/// Shows at most a four-character prefix of a configured key.
fn redact_secret(secret: Option<&SecretString>) -> String {
    let Some(secret) = secret else {
        return "<unset>".to_string();
    };

    let trimmed = secret.expose_secret().trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }
    if trimmed.chars().count() <= 8 {
        return "<redacted>".to_string();
    }

    let prefix = trimmed.chars().take(4).collect::<String>();
    format!("{prefix}***")
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::redact_secret;

    #[test]
    fn secrets_are_never_printed_in_full() {
        assert_eq!(redact_secret(None), "<unset>");

        let blank = SecretString::from("  ".to_string());
        assert_eq!(redact_secret(Some(&blank)), "<empty>");

        let short = SecretString::from("abc123".to_string());
        assert_eq!(redact_secret(Some(&short)), "<redacted>");

        let long = SecretString::from("AIzaSyExampleKey123".to_string());
        assert_eq!(redact_secret(Some(&long)), "AIza***");
    }
}
