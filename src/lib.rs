//! Shopee Order Ledger
//!
//! Fetches a buyer's paginated order history, folds order-level discounts
//! back into per-item prices, and renders a spreadsheet-ready CSV ledger
//! plus run totals.

pub mod aggregator;
pub mod client;
pub mod models;
pub mod paginator;
pub mod proration;
pub mod render;
