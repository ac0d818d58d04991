use async_trait::async_trait;
use moltbot_core::config::SearchConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::tools::{ParameterSchema, ParameterType, Tool, ToolError};

pub const MISSING_KEY_NOTICE: &str =
    "⚠️ 請先在 .env 設定 SERP_API_KEY 才能啟用真實搜尋。\n(目前僅回傳模擬結果)";
const NO_RESULTS: &str = "沒有找到相關結果。";

#[derive(Debug, Deserialize)]
pub struct WebSearchArgs {
    query: String,
}

pub struct WebSearchTool {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    result_limit: usize,
}

impl WebSearchTool {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            result_limit: config.result_limit,
        }
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|key| key.expose_secret()).filter(|key| !key.trim().is_empty())
    }

    async fn fetch(&self, query: &str, api_key: &str) -> Result<Value, reqwest::Error> {
        self.client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("api_key", api_key),
                ("engine", "google"),
                ("gl", "tw"),
                ("hl", "zh-tw"),
            ])
            .send()
            .await?
            .json::<Value>()
            .await
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    type Args = WebSearchArgs;

    fn name(&self) -> &'static str {
        "web_search"
    }

    fn description(&self) -> &'static str {
        "Search the internet for real-time information. Use this for news, stock prices, or general knowledge queries."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new().required("query", ParameterType::String, "The search query")
    }

    async fn call(&self, args: WebSearchArgs) -> Result<String, ToolError> {
        let Some(api_key) = self.api_key() else {
            return Ok(MISSING_KEY_NOTICE.to_string());
        };

        info!(
            event_name = "agent.tool.web_search.request",
            query = %args.query,
            "searching the web"
        );

        let payload = match self.fetch(&args.query, api_key).await {
            Ok(payload) => payload,
            Err(error) => {
                warn!(
                    event_name = "agent.tool.web_search.failed",
                    error = %error,
                    "web search failed"
                );
                return Ok(format!("❌ 網路搜尋失敗: {error}"));
            }
        };

        Ok(format_results(&args.query, &payload, self.result_limit))
    }
}

/// Renders a SerpApi payload: the provider error, or the top organic results.
fn format_results(query: &str, payload: &Value, limit: usize) -> String {
    if let Some(error) = payload.get("error") {
        let message = error.as_str().map(str::to_string).unwrap_or_else(|| error.to_string());
        return format!("❌ Search API Error: {message}");
    }

    let entries = payload
        .get("organic_results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .take(limit)
                .enumerate()
                .map(|(index, result)| {
                    format!(
                        "{}. [{}]({})\n   {}",
                        index + 1,
                        field(result, "title"),
                        field(result, "link"),
                        field(result, "snippet")
                    )
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let body = if entries.is_empty() { NO_RESULTS.to_string() } else { entries.join("\n\n") };
    format!("🔍 搜尋結果 ({query})：\n\n{body}")
}

fn field<'a>(result: &'a Value, key: &str) -> &'a str {
    result.get(key).and_then(Value::as_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use moltbot_core::config::SearchConfig;
    use serde_json::json;

    use super::{format_results, WebSearchArgs, WebSearchTool, MISSING_KEY_NOTICE};
    use crate::tools::Tool;

    #[tokio::test]
    async fn missing_key_degrades_to_notice() {
        let config = SearchConfig {
            api_key: None,
            base_url: "http://127.0.0.1:9/search.json".to_string(),
            result_limit: 3,
        };
        let tool = WebSearchTool::new(&config);
        let output =
            tool.call(WebSearchArgs { query: "台積電".to_string() }).await.expect("never rejects");
        assert_eq!(output, MISSING_KEY_NOTICE);
    }

    #[test]
    fn top_results_are_numbered_and_limited() {
        let payload = json!({
            "organic_results": [
                {"title": "One", "link": "https://a.example", "snippet": "first"},
                {"title": "Two", "link": "https://b.example", "snippet": "second"},
                {"title": "Three", "link": "https://c.example", "snippet": "third"},
                {"title": "Four", "link": "https://d.example", "snippet": "fourth"}
            ]
        });

        let output = format_results("rust", &payload, 3);
        assert_eq!(
            output,
            "🔍 搜尋結果 (rust)：\n\n\
             1. [One](https://a.example)\n   first\n\n\
             2. [Two](https://b.example)\n   second\n\n\
             3. [Three](https://c.example)\n   third"
        );
    }

    #[test]
    fn provider_errors_and_empty_results_are_reported() {
        let output = format_results("x", &json!({"error": "Invalid API key."}), 3);
        assert_eq!(output, "❌ Search API Error: Invalid API key.");

        let output = format_results("x", &json!({"organic_results": []}), 3);
        assert_eq!(output, "🔍 搜尋結果 (x)：\n\n沒有找到相關結果。");

        let output = format_results("x", &json!({}), 3);
        assert!(output.ends_with("沒有找到相關結果。"));
    }
}
