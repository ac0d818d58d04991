use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("tool `{0}` is already registered")]
    DuplicateName(String),
    #[error("tool execution rejected: {0}")]
    Execution(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParameterType {
    Object,
    String,
    Number,
    Integer,
    Boolean,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParameterField {
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub description: String,
}

/// OpenAPI-style object schema sent verbatim to the reasoning backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    kind: ParameterType,
    properties: BTreeMap<String, ParameterField>,
    required: Vec<String>,
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self { kind: ParameterType::Object, properties: BTreeMap::new(), required: Vec::new() }
    }
}

impl ParameterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(
        mut self,
        name: &str,
        kind: ParameterType,
        description: impl Into<String>,
    ) -> Self {
        self.required.push(name.to_string());
        self.optional(name, kind, description)
    }

    pub fn optional(
        mut self,
        name: &str,
        kind: ParameterType,
        description: impl Into<String>,
    ) -> Self {
        self.properties
            .insert(name.to_string(), ParameterField { kind, description: description.into() });
        self
    }

    pub fn required_names(&self) -> &[String] {
        &self.required
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
}

/// A capability the model may invoke, with typed arguments.
///
/// Built-in tools resolve every expected failure to a `❌` string. An `Err` is a
/// hard rejection and ends the turn.
#[async_trait]
pub trait Tool: Send + Sync {
    type Args: DeserializeOwned + Send + 'static;

    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn parameters(&self) -> ParameterSchema;

    async fn call(&self, args: Self::Args) -> Result<String, ToolError>;
}

/// Type-erased view of a [`Tool`] held by the registry.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    fn declaration(&self) -> FunctionDeclaration;
    async fn execute(&self, args: Value) -> Result<String, ToolError>;
}

struct TypedTool<T>(T);

#[async_trait]
impl<T> ToolExecutor for TypedTool<T>
where
    T: Tool + 'static,
{
    fn declaration(&self) -> FunctionDeclaration {
        FunctionDeclaration {
            name: self.0.name().to_string(),
            description: self.0.description().to_string(),
            parameters: self.0.parameters(),
        }
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let args = if args.is_null() { Value::Object(Default::default()) } else { args };
        match serde_json::from_value::<T::Args>(args) {
            Ok(args) => self.0.call(args).await,
            Err(error) => {
                warn!(
                    event_name = "agent.tool.invalid_arguments",
                    tool = self.0.name(),
                    error = %error,
                    "tool arguments did not match the declared schema"
                );
                Ok(format!("❌ 參數錯誤 ({}): {error}", self.0.name()))
            }
        }
    }
}

/// Immutable after startup; shared by `Arc` across concurrent turns.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn ToolExecutor>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&mut self, tool: T) -> Result<(), ToolError>
    where
        T: Tool + 'static,
    {
        self.register_executor(Box::new(TypedTool(tool)))
    }

    pub fn register_executor(&mut self, executor: Box<dyn ToolExecutor>) -> Result<(), ToolError> {
        let name = executor.declaration().name;
        if self.tools.contains_key(&name) {
            return Err(ToolError::DuplicateName(name));
        }
        self.tools.insert(name, executor);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn ToolExecutor> {
        self.tools.get(name).map(|executor| executor.as_ref())
    }

    /// Declarations of every registered tool, in name order.
    pub fn catalog(&self) -> Vec<FunctionDeclaration> {
        self.tools.values().map(|executor| executor.declaration()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;

    use super::{ParameterSchema, ParameterType, Tool, ToolError, ToolRegistry};

    struct Echo;

    #[derive(Deserialize)]
    struct EchoArgs {
        message: String,
        #[serde(default)]
        times: Option<u32>,
    }

    #[async_trait]
    impl Tool for Echo {
        type Args = EchoArgs;

        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Repeat the message."
        }

        fn parameters(&self) -> ParameterSchema {
            ParameterSchema::new()
                .required("message", ParameterType::String, "Text to repeat")
                .optional("times", ParameterType::Integer, "Repeat count")
        }

        async fn call(&self, args: EchoArgs) -> Result<String, ToolError> {
            Ok(args.message.repeat(args.times.unwrap_or(1) as usize))
        }
    }

    struct Reject;

    #[derive(Deserialize)]
    struct NoArgs {}

    #[async_trait]
    impl Tool for Reject {
        type Args = NoArgs;

        fn name(&self) -> &'static str {
            "reject"
        }

        fn description(&self) -> &'static str {
            "Always rejects."
        }

        fn parameters(&self) -> ParameterSchema {
            ParameterSchema::new()
        }

        async fn call(&self, _args: NoArgs) -> Result<String, ToolError> {
            Err(ToolError::Execution("quota exhausted".to_string()))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Reject).expect("first registration");
        registry.register(Echo).expect("first registration");
        registry
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = registry();
        let error = registry.register(Echo).expect_err("duplicate must fail");
        assert_eq!(error, ToolError::DuplicateName("echo".to_string()));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn catalog_is_sorted_and_serializes_as_object_schema() {
        let catalog = registry().catalog();
        let names = catalog.iter().map(|entry| entry.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["echo", "reject"]);

        let value = serde_json::to_value(&catalog[0]).expect("declaration serializes");
        assert_eq!(
            value,
            json!({
                "name": "echo",
                "description": "Repeat the message.",
                "parameters": {
                    "type": "OBJECT",
                    "properties": {
                        "message": {"type": "STRING", "description": "Text to repeat"},
                        "times": {"type": "INTEGER", "description": "Repeat count"}
                    },
                    "required": ["message"]
                }
            })
        );
    }

    #[tokio::test]
    async fn lookup_executes_with_decoded_arguments() {
        let registry = registry();
        let echo = registry.lookup("echo").expect("echo registered");
        let output = echo.execute(json!({"message": "ab", "times": 2})).await;
        assert_eq!(output, Ok("abab".to_string()));
        assert!(registry.lookup("missing").is_none());
    }

    #[tokio::test]
    async fn malformed_arguments_resolve_to_failure_string() {
        let registry = registry();
        let echo = registry.lookup("echo").expect("echo registered");

        let output = echo.execute(json!({"times": "many"})).await.expect("never a rejection");
        assert!(output.starts_with("❌"), "unexpected output: {output}");

        let output = echo.execute(serde_json::Value::Null).await.expect("never a rejection");
        assert!(output.starts_with("❌"));
    }

    #[tokio::test]
    async fn raised_rejections_surface_as_errors() {
        let registry = registry();
        let reject = registry.lookup("reject").expect("reject registered");
        let error = reject.execute(json!({})).await.expect_err("rejection expected");
        assert_eq!(error, ToolError::Execution("quota exhausted".to_string()));
    }
}
