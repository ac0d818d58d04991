pub mod ask;
pub mod config;
pub mod doctor;
pub mod render;

use serde::Serialize;
use serde_json::json;

/// What went wrong before a reply could be produced. Each class owns its exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    ConfigValidation,
    Input,
    BackendSetup,
    ToolRegistry,
    RuntimeInit,
    Serialization,
}

impl FailureClass {
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Serialization => 1,
            Self::ConfigValidation | Self::Input => 2,
            Self::BackendSetup | Self::ToolRegistry => 3,
            Self::RuntimeInit => 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

impl CommandResult {
    pub fn text(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    /// Pretty-prints a reply payload for `command`.
    pub fn payload(command: &'static str, payload: &impl Serialize) -> Self {
        match serde_json::to_string_pretty(payload) {
            Ok(output) => Self::text(output),
            Err(error) => Self::failure(command, FailureClass::Serialization, error.to_string()),
        }
    }

    pub fn failure(
        command: &'static str,
        error_class: FailureClass,
        message: impl Into<String>,
    ) -> Self {
        let output = json!({
            "command": command,
            "status": "error",
            "error_class": error_class,
            "message": message.into(),
        });
        Self { exit_code: error_class.exit_code(), output: output.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::{CommandResult, FailureClass};

    #[test]
    fn failure_carries_class_specific_exit_code() {
        let result = CommandResult::failure("ask", FailureClass::BackendSetup, "no client");
        assert_eq!(result.exit_code, 3);

        let payload: Value = serde_json::from_str(&result.output).expect("failure is JSON");
        assert_eq!(payload["error_class"], "backend_setup");
        assert_eq!(payload["message"], "no client");
    }

    #[test]
    fn payload_is_pretty_printed_with_success_exit_code() {
        let result = CommandResult::payload("render", &serde_json::json!({ "kind": "text" }));
        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains("\n"));
    }
}
