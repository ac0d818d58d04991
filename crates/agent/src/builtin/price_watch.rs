use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::tools::{ParameterSchema, ParameterType, Tool, ToolError};

pub const DEFAULT_PRICE_SELECTOR: &str = "body";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchTarget {
    pub id: Uuid,
    pub product_name: String,
    pub url: String,
    pub price_selector: String,
    pub added_at: DateTime<Utc>,
}

/// In-memory list of products being watched, shared with whatever polls them.
#[derive(Clone, Debug, Default)]
pub struct WatchList {
    targets: Arc<Mutex<Vec<WatchTarget>>>,
}

impl WatchList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, product_name: &str, url: &str, price_selector: &str) -> WatchTarget {
        let target = WatchTarget {
            id: Uuid::new_v4(),
            product_name: product_name.to_string(),
            url: url.to_string(),
            price_selector: price_selector.to_string(),
            added_at: Utc::now(),
        };
        let mut targets = self.targets.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        targets.push(target.clone());
        target
    }

    pub fn snapshot(&self) -> Vec<WatchTarget> {
        self.targets.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.targets.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceWatchArgs {
    product_name: String,
    url: String,
    #[serde(default)]
    price_selector: Option<String>,
}

pub struct PriceWatchTool {
    watch_list: WatchList,
}

impl PriceWatchTool {
    pub fn new(watch_list: WatchList) -> Self {
        Self { watch_list }
    }
}

#[async_trait]
impl Tool for PriceWatchTool {
    type Args = PriceWatchArgs;

    fn name(&self) -> &'static str {
        "search_price_history"
    }

    fn description(&self) -> &'static str {
        "Track the price of a product URL. Use this when the user wants to monitor a price drop."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new()
            .required("productName", ParameterType::String, "Name of the product")
            .required("url", ParameterType::String, "The URL to monitor")
            .optional(
                "priceSelector",
                ParameterType::String,
                "CSS selector for the price (optional)",
            )
    }

    async fn call(&self, args: PriceWatchArgs) -> Result<String, ToolError> {
        let selector = args
            .price_selector
            .as_deref()
            .map(str::trim)
            .filter(|selector| !selector.is_empty())
            .unwrap_or(DEFAULT_PRICE_SELECTOR);
        let target = self.watch_list.add(&args.product_name, &args.url, selector);

        info!(
            event_name = "agent.tool.price_watch.added",
            target_id = %target.id,
            product = %target.product_name,
            selector = %target.price_selector,
            "price watch target added"
        );

        Ok(format!("✅ 已設好價格監測：{}\n我會每小時檢查一次，有降價就通知您。", args.product_name))
    }
}
