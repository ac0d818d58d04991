use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::tools::{ParameterSchema, ParameterType, Tool, ToolError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitPushArgs {
    remote_url: String,
    message: String,
}

/// Commits everything in the workspace and pushes `main` to `origin`.
pub struct GitPushTool {
    workspace_dir: PathBuf,
}

impl GitPushTool {
    pub fn new(workspace_dir: impl Into<PathBuf>) -> Self {
        Self { workspace_dir: workspace_dir.into() }
    }

    async fn git(&self, args: &[&str]) -> Result<(), String> {
        debug!(event_name = "agent.tool.git.exec", args = ?args, "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workspace_dir)
            .output()
            .await
            .map_err(|error| format!("git {}: {error}", args.join(" ")))?;

        if output.status.success() {
            return Ok(());
        }
        Err(format!(
            "git {} ({}):\n{}",
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim_end()
        ))
    }

    async fn push(&self, remote_url: &str, message: &str) -> Result<(), String> {
        if self.git(&["remote", "add", "origin", remote_url]).await.is_err() {
            self.git(&["remote", "set-url", "origin", remote_url]).await?;
        }
        self.git(&["add", "."]).await?;
        self.git(&["commit", "-m", message]).await?;
        self.git(&["branch", "-M", "main"]).await?;
        self.git(&["push", "-u", "origin", "main"]).await
    }
}

#[async_trait]
impl Tool for GitPushTool {
    type Args = GitPushArgs;

    fn name(&self) -> &'static str {
        "git_push_remote"
    }

    fn description(&self) -> &'static str {
        "Push the current project code to a remote GitHub repository. Commits all changes first."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new()
            .required(
                "remoteUrl",
                ParameterType::String,
                "The GitHub repository URL (e.g., https://github.com/user/repo.git)",
            )
            .required("message", ParameterType::String, "Commit message")
    }

    async fn call(&self, args: GitPushArgs) -> Result<String, ToolError> {
        match self.push(&args.remote_url, &args.message).await {
            Ok(()) => {
                info!(
                    event_name = "agent.tool.git.pushed",
                    remote = %args.remote_url,
                    "workspace pushed"
                );
                Ok(format!("🚀 成功推送到 GitHub!\nRepo: {}", args.remote_url))
            }
            Err(detail) => Ok(format!(
                "❌ 推送失敗 (請確認您的電腦已有 GitHub 權限/SSH Key):\n{detail}"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::{GitPushArgs, GitPushTool};
    use crate::tools::Tool;

    #[tokio::test]
    async fn push_outside_a_repository_resolves_to_failure_string() {
        let temp = TempDir::new().expect("temp dir");
        let tool = GitPushTool::new(temp.path());

        let output = tool
            .call(GitPushArgs {
                remote_url: "https://example.invalid/repo.git".to_string(),
                message: "sync".to_string(),
            })
            .await
            .expect("never rejects");

        assert!(output.starts_with("❌ 推送失敗"), "unexpected output: {output}");
    }

    #[test]
    fn schema_uses_camel_case_argument_names() {
        let tool = GitPushTool::new(".");
        let schema = tool.parameters();
        assert_eq!(schema.required_names(), &["remoteUrl".to_string(), "message".to_string()]);
    }
}
