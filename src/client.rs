//! Shopee order-list REST client.
//!
//! Wraps the paged `get_order_list` endpoint. The payload model is
//! deliberately loose: every field the upstream has been seen to drop is an
//! `Option`, and missing values degrade to 0 / "N/A" instead of failing
//! the run.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::models::NominalPriceSource;
use crate::paginator::PageSource;

pub const DEFAULT_API_BASE: &str = "https://shopee.vn/api/v4";

/// `list_type=3` selects the completed-orders tab of the order list.
const ORDER_LIST_TYPE: u32 = 3;

/// A page fetch that did not produce usable data. Halts pagination;
/// whatever was fetched before it is kept.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("order list request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("order list endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Result of one page fetch: more orders, or the end of the list. A 2xx
/// page without the nested order list also counts as the end.
#[derive(Debug, Clone)]
pub enum OrderPage {
    Orders(Vec<Order>),
    End,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderListResponse {
    #[serde(default)]
    pub data: Option<OrderListData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderListData {
    #[serde(default)]
    pub details_list: Option<Vec<Order>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub info_card: Option<InfoCard>,
    #[serde(default)]
    pub shipping: Option<Shipping>,
}

/// Monetary amounts are fixed-point integers scaled by 1e5.
#[derive(Debug, Clone, Deserialize)]
pub struct InfoCard {
    #[serde(default, deserialize_with = "de_id_opt")]
    pub order_id: Option<String>,
    #[serde(default)]
    pub final_total: Option<i64>,
    #[serde(default)]
    pub subtotal: Option<i64>,
    #[serde(default)]
    pub order_list_cards: Option<Vec<OrderCard>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Shipping {
    #[serde(default)]
    pub tracking_info: Option<TrackingInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackingInfo {
    /// Purchase timestamp, epoch seconds.
    #[serde(default)]
    pub ctime: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderCard {
    #[serde(default)]
    pub product_info: Option<ProductInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductInfo {
    #[serde(default)]
    pub item_groups: Option<Vec<ItemGroup>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemGroup {
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub order_price: Option<i64>,
    #[serde(default)]
    pub price_before_discount: Option<i64>,
}

/// Order ids have shipped both as strings and as raw numbers. Accept both.
fn de_id_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

impl Order {
    pub fn order_id_display(&self) -> String {
        self.info_card
            .as_ref()
            .and_then(|c| c.order_id.clone())
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn purchase_ctime(&self) -> i64 {
        self.shipping
            .as_ref()
            .and_then(|s| s.tracking_info.as_ref())
            .and_then(|t| t.ctime)
            .unwrap_or(0)
    }

    pub fn final_total_scaled(&self) -> i64 {
        self.info_card
            .as_ref()
            .and_then(|c| c.final_total)
            .unwrap_or(0)
    }

    pub fn subtotal_scaled(&self) -> i64 {
        self.info_card
            .as_ref()
            .and_then(|c| c.subtotal)
            .unwrap_or(0)
    }
}

impl LineItem {
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| "N/A".to_string())
    }

    pub fn quantity(&self) -> i64 {
        self.amount.unwrap_or(0)
    }

    pub fn nominal_unit_scaled(&self, source: NominalPriceSource) -> i64 {
        let raw = match source {
            NominalPriceSource::OrderPrice => self.order_price,
            NominalPriceSource::PriceBeforeDiscount => self.price_before_discount,
        };
        raw.unwrap_or(0)
    }
}

pub struct OrderHistoryClient {
    client: Client,
    base_url: String,
}

impl OrderHistoryClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("shopee-ledger/0.1")
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_order_page(&self, offset: u32, limit: u32) -> Result<OrderPage, TransportError> {
        let url = format!("{}/order/get_order_list", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("list_type", ORDER_LIST_TYPE.to_string()),
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        let page: OrderListResponse = resp.json().await?;
        debug!(offset, limit, "order list page received");

        Ok(page_from_response(page))
    }
}

/// A 2xx response missing the nested `data.details_list` path, or carrying
/// it empty, signals end-of-data rather than an error.
fn page_from_response(resp: OrderListResponse) -> OrderPage {
    match resp.data.and_then(|d| d.details_list) {
        Some(orders) if !orders.is_empty() => OrderPage::Orders(orders),
        _ => OrderPage::End,
    }
}

#[async_trait]
impl PageSource for OrderHistoryClient {
    async fn fetch_page(&self, offset: u32, limit: u32) -> Result<OrderPage, TransportError> {
        self.fetch_order_page(offset, limit).await
    }
}
