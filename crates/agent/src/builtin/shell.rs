use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::info;

use crate::tools::{ParameterSchema, ParameterType, Tool, ToolError};

#[derive(Debug, Deserialize)]
pub struct RunShellArgs {
    command: String,
}

/// Runs `sh -c <command>` in the configured workspace. Only registered when the
/// tool policy allows host side effects.
pub struct RunShellTool {
    workspace_dir: PathBuf,
}

impl RunShellTool {
    pub fn new(workspace_dir: impl Into<PathBuf>) -> Self {
        Self { workspace_dir: workspace_dir.into() }
    }
}

#[async_trait]
impl Tool for RunShellTool {
    type Args = RunShellArgs;

    fn name(&self) -> &'static str {
        "run_shell"
    }

    fn description(&self) -> &'static str {
        "Execute a shell command. CAUTION: This gives full control. Use for installing packages, running tests, or file operations."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new().required(
            "command",
            ParameterType::String,
            "The shell command to run (e.g., npm install lodash)",
        )
    }

    async fn call(&self, args: RunShellArgs) -> Result<String, ToolError> {
        info!(
            event_name = "agent.tool.shell.exec",
            command = %args.command,
            "executing shell command"
        );

        let output = match Command::new("sh")
            .arg("-c")
            .arg(&args.command)
            .current_dir(&self.workspace_dir)
            .output()
            .await
        {
            Ok(output) => output,
            Err(error) => return Ok(format!("❌ 指令失敗:\n{error}")),
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Ok(format!("❌ 指令失敗:\n{}\n{stderr}", output.status));
        }

        Ok(format!("💻 指令執行成功:\n{stdout}\n(Stderr: {stderr})"))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use tempfile::TempDir;

    use super::{RunShellArgs, RunShellTool};
    use crate::tools::Tool;

    fn args(command: &str) -> RunShellArgs {
        RunShellArgs { command: command.to_string() }
    }

    #[tokio::test]
    async fn successful_command_reports_stdout_and_stderr() {
        let temp = TempDir::new().expect("temp dir");
        let tool = RunShellTool::new(temp.path());

        let output = tool.call(args("echo hello; echo warn 1>&2")).await.expect("never rejects");
        assert_eq!(output, "💻 指令執行成功:\nhello\n\n(Stderr: warn\n)");
    }

    #[tokio::test]
    async fn command_runs_inside_workspace() {
        let temp = TempDir::new().expect("temp dir");
        std::fs::write(temp.path().join("marker.txt"), "here").expect("write marker");
        let tool = RunShellTool::new(temp.path());

        let output = tool.call(args("cat marker.txt")).await.expect("never rejects");
        assert!(output.contains("here"), "unexpected output: {output}");
    }

    #[tokio::test]
    async fn failing_command_resolves_to_failure_string() {
        let temp = TempDir::new().expect("temp dir");
        let tool = RunShellTool::new(temp.path());

        let output = tool.call(args("echo boom 1>&2; exit 3")).await.expect("never rejects");
        assert!(output.starts_with("❌ 指令失敗:"));
        assert!(output.contains("boom"));
    }
}
