//! Walks fetched orders into ledger rows and running totals.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tracing::info;

use crate::client::Order;
use crate::models::{Config, NominalPriceSource};
use crate::paginator::{PageSource, Paginator};
use crate::proration::{self, ProratedLineItem};

/// Purchase timestamps below this are treated as absent; epoch seconds
/// before 2001 never occur in real order data.
const PLAUSIBLE_EPOCH_FLOOR: i64 = 1_000_000_000;

pub const GIFT_NOTE: &str = "Gift - 0 VND";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderTimestamp {
    Known(DateTime<Utc>),
    Unknown,
}

impl OrderTimestamp {
    pub fn from_epoch(secs: i64) -> Self {
        if secs < PLAUSIBLE_EPOCH_FLOOR {
            return OrderTimestamp::Unknown;
        }
        match Utc.timestamp_opt(secs, 0).single() {
            Some(dt) => OrderTimestamp::Known(dt),
            None => OrderTimestamp::Unknown,
        }
    }
}

/// One output row per line item.
#[derive(Debug, Clone)]
pub struct LedgerRow {
    pub timestamp: OrderTimestamp,
    pub order_id: String,
    pub item: ProratedLineItem,
    pub note: String,
}

/// Totals accumulated over one export run. Monetary sums are in display
/// units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningStats {
    pub orders: u64,
    pub items: u64,
    pub gift_items: u64,
    pub no_date_orders: u64,
    pub total_spent: f64,
    pub total_shipping: f64,
    pub total_nominal: f64,
    pub total_saved: f64,
}

impl RunningStats {
    pub fn paid_items(&self) -> u64 {
        self.items - self.gift_items
    }

    pub fn product_spend(&self) -> f64 {
        self.total_spent - self.total_shipping
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportOutcome {
    pub rows: Vec<LedgerRow>,
    pub stats: RunningStats,
}

/// Fold one order into the row list and the running totals. The shipping
/// fee is the gap between the charged total and the subtotal; both sides
/// count toward the totals whether or not any item gets prorated.
pub fn process_order(
    order: &Order,
    source: NominalPriceSource,
    rows: &mut Vec<LedgerRow>,
    stats: &mut RunningStats,
) {
    stats.orders += 1;

    let order_id = order.order_id_display();
    let timestamp = OrderTimestamp::from_epoch(order.purchase_ctime());
    if matches!(timestamp, OrderTimestamp::Unknown) {
        stats.no_date_orders += 1;
    }

    let final_total = proration::to_display_units(order.final_total_scaled());
    let subtotal = proration::to_display_units(order.subtotal_scaled());
    stats.total_spent += final_total;
    stats.total_shipping += final_total - subtotal;

    for item in proration::prorate_items(order, source) {
        stats.items += 1;
        if item.is_gift {
            stats.gift_items += 1;
        }
        stats.total_nominal += item.nominal_line;
        stats.total_saved += item.saved;

        let note = if item.is_gift {
            GIFT_NOTE.to_string()
        } else {
            String::new()
        };
        rows.push(LedgerRow {
            timestamp,
            order_id: order_id.clone(),
            item,
            note,
        });
    }
}

/// Drive the paginator to exhaustion and accumulate the full ledger. The
/// outcome is finalized only after the page sequence ends; a transport
/// failure mid-run leaves the rows and stats gathered so far intact.
pub async fn run_export<S: PageSource>(source: S, config: &Config) -> ExportOutcome {
    let mut paginator = Paginator::new(
        source,
        config.page_size,
        Duration::from_millis(config.inter_page_delay_ms),
    );
    let mut outcome = ExportOutcome::default();

    while let Some(orders) = paginator.next_page().await {
        for order in &orders {
            process_order(
                order,
                config.nominal_price_source,
                &mut outcome.rows,
                &mut outcome.stats,
            );
        }
        info!(
            orders = outcome.stats.orders,
            items = outcome.stats.items,
            gifts = outcome.stats.gift_items,
            "processed order page"
        );
    }

    outcome
}
