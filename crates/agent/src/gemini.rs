//! Gemini `generateContent` adapter for [`ReasoningBackend`].
//!
//! Uses API-key authentication against the Google AI endpoint. HTTP 429 and 5xx
//! responses are retried with exponential backoff (1s, 2s, 4s, ...) up to the
//! configured retry budget; every other failure returns immediately.

use std::time::Duration;

use async_trait::async_trait;
use moltbot_core::config::LlmConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::conversation::{Message, Part, Role, ToolInvocation};
use crate::llm::{BackendReply, LlmError, ReasoningBackend};
use crate::tools::FunctionDeclaration;

const API_KEY_HEADER: &str = "x-goog-api-key";
const ERROR_BODY_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<GeminiToolConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool<'a> {
    function_declarations: &'a [FunctionDeclaration],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiToolConfig {
    function_calling_config: FunctionCallingConfig,
}

#[derive(Debug, Serialize)]
struct FunctionCallingConfig {
    mode: &'static str,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    function_call: Option<GeminiFunctionCall>,
    #[serde(default)]
    thought: Option<bool>,
    #[serde(default)]
    thought_signature: Option<String>,
}

pub struct GeminiBackend {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
    max_retries: u32,
}

impl GeminiBackend {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| LlmError::Http(error.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_retries: config.max_retries,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        self.api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .filter(|key| !key.trim().is_empty())
            .ok_or(LlmError::MissingCredentials)
    }
}

#[async_trait]
impl ReasoningBackend for GeminiBackend {
    async fn generate(
        &self,
        history: &[Message],
        catalog: &[FunctionDeclaration],
    ) -> Result<BackendReply, LlmError> {
        let api_key = self.api_key()?;
        let request = build_request(history, catalog);
        let url = self.endpoint();
        let mut attempt = 0u32;

        loop {
            debug!(
                event_name = "agent.backend.request",
                model = %self.model,
                messages = history.len(),
                attempt,
                "sending generateContent request"
            );

            let response = self
                .client
                .post(&url)
                .header(API_KEY_HEADER, api_key)
                .json(&request)
                .send()
                .await
                .map_err(|error| LlmError::Http(error.to_string()))?;

            let status = response.status();
            if is_retryable(status.as_u16()) && attempt < self.max_retries {
                let delay_secs = 1u64 << attempt;
                warn!(
                    event_name = "agent.backend.retry",
                    status = status.as_u16(),
                    delay_secs,
                    attempt = attempt + 1,
                    max_retries = self.max_retries,
                    "reasoning backend busy, retrying"
                );
                tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                attempt += 1;
                continue;
            }

            let body =
                response.text().await.map_err(|error| LlmError::Http(error.to_string()))?;
            if !status.is_success() {
                return Err(LlmError::Status {
                    status: status.as_u16(),
                    body: body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect(),
                });
            }

            return parse_response(&body);
        }
    }
}

fn is_retryable(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

fn build_request<'a>(
    history: &[Message],
    catalog: &'a [FunctionDeclaration],
) -> GeminiRequest<'a> {
    let contents = history.iter().map(to_content).collect();
    if catalog.is_empty() {
        return GeminiRequest { contents, tools: Vec::new(), tool_config: None };
    }

    GeminiRequest {
        contents,
        tools: vec![GeminiTool { function_declarations: catalog }],
        tool_config: Some(GeminiToolConfig {
            function_calling_config: FunctionCallingConfig { mode: "AUTO" },
        }),
    }
}

fn to_content(message: &Message) -> GeminiContent {
    let role = match message.role {
        Role::User => "user",
        Role::Model => "model",
    };
    let parts = message.parts.iter().map(to_part).collect();
    GeminiContent { role, parts }
}

fn to_part(part: &Part) -> GeminiPart {
    match part {
        Part::Text { text } => GeminiPart { text: Some(text.clone()), ..Default::default() },
        Part::ToolCall(invocation) => GeminiPart {
            function_call: Some(GeminiFunctionCall {
                name: invocation.name.clone(),
                args: invocation.args_value(),
            }),
            thought_signature: invocation.signature.clone(),
            ..Default::default()
        },
        Part::ToolResult { name, result } => GeminiPart {
            function_response: Some(GeminiFunctionResponse {
                name: name.clone(),
                response: json!({ "result": result }),
            }),
            ..Default::default()
        },
    }
}

fn parse_response(body: &str) -> Result<BackendReply, LlmError> {
    let response: GeminiResponse =
        serde_json::from_str(body).map_err(|error| LlmError::Decode(error.to_string()))?;

    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .ok_or(LlmError::EmptyResponse)?;

    let mut reply = BackendReply::default();
    for part in parts {
        if let Some(call) = part.function_call {
            let args = match call.args {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            reply.tool_calls.push(ToolInvocation {
                name: call.name,
                args,
                signature: part.thought_signature,
            });
            continue;
        }

        if part.thought.unwrap_or(false) {
            continue;
        }
        if let Some(text) = part.text {
            reply.text.push_str(&text);
        }
    }

    Ok(reply)
}
