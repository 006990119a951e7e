//! End-to-end pipeline tests: scripted page source -> export run -> CSV.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::tempdir;

use shopee_ledger::aggregator::run_export;
use shopee_ledger::client::{
    InfoCard, ItemGroup, LineItem, Order, OrderCard, OrderPage, ProductInfo, Shipping,
    TrackingInfo, TransportError,
};
use shopee_ledger::models::{Config, NominalPriceSource, NumberStyle};
use shopee_ledger::paginator::PageSource;
use shopee_ledger::render::{render_csv, CSV_HEADER};

const EPS: f64 = 1e-6;

fn line_item(name: &str, price_scaled: i64, qty: i64) -> LineItem {
    LineItem {
        name: Some(name.to_string()),
        amount: Some(qty),
        order_price: Some(price_scaled),
        price_before_discount: Some(price_scaled),
    }
}

fn order(
    id: &str,
    ctime: i64,
    final_total_scaled: i64,
    subtotal_scaled: i64,
    items: Vec<LineItem>,
) -> Order {
    Order {
        info_card: Some(InfoCard {
            order_id: Some(id.to_string()),
            final_total: Some(final_total_scaled),
            subtotal: Some(subtotal_scaled),
            order_list_cards: Some(vec![OrderCard {
                product_info: Some(ProductInfo {
                    item_groups: Some(vec![ItemGroup { items: Some(items) }]),
                }),
            }]),
        }),
        shipping: Some(Shipping {
            tracking_info: Some(TrackingInfo { ctime: Some(ctime) }),
        }),
    }
}

fn fixture_orders() -> Vec<Order> {
    vec![
        // Discounted order: nominal 10000, subtotal 9000, shipping 500.
        order(
            "A1",
            1_700_000_000,
            950_000_000,
            900_000_000,
            vec![
                line_item("USB cable, 1m", 500_000_000, 1),
                line_item("USB hub", 500_000_000, 1),
            ],
        ),
        // All-gift order.
        order("A2", 1_700_100_000, 0, 0, vec![line_item("Sticker pack", 0, 1)]),
        // Dateless order, no discount: nominal 4000 == subtotal.
        order(
            "A3",
            0,
            450_000_000,
            400_000_000,
            vec![line_item("Mug", 200_000_000, 2)],
        ),
    ]
}

struct ScriptedSource {
    orders: Vec<Order>,
    fail_at_offset: Option<u32>,
    fetches: Arc<AtomicU32>,
}

impl ScriptedSource {
    fn new(orders: Vec<Order>) -> Self {
        Self {
            orders,
            fail_at_offset: None,
            fetches: Arc::new(AtomicU32::new(0)),
        }
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn fetch_page(&self, offset: u32, limit: u32) -> Result<OrderPage, TransportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_at_offset == Some(offset) {
            return Err(TransportError::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "maintenance".to_string(),
            });
        }
        let start = offset as usize;
        if start >= self.orders.len() {
            return Ok(OrderPage::End);
        }
        let end = (start + limit as usize).min(self.orders.len());
        Ok(OrderPage::Orders(self.orders[start..end].to_vec()))
    }
}

fn test_config(page_size: u32) -> Config {
    Config {
        api_base: "http://localhost".to_string(),
        page_size,
        inter_page_delay_ms: 0,
        nominal_price_source: NominalPriceSource::OrderPrice,
        number_style: NumberStyle::QuotedThousands,
        output_path: None,
    }
}

#[tokio::test]
async fn full_run_accumulates_rows_and_stats() {
    let source = ScriptedSource::new(fixture_orders());
    let fetches = source.fetches.clone();
    let outcome = run_export(source, &test_config(2)).await;

    // A page of two, a page of one, then the terminating empty page.
    assert_eq!(fetches.load(Ordering::SeqCst), 3);

    let stats = &outcome.stats;
    assert_eq!(stats.orders, 3);
    assert_eq!(stats.items, 4);
    assert_eq!(stats.gift_items, 1);
    assert_eq!(stats.no_date_orders, 1);
    assert!((stats.total_spent - 14_000.0).abs() < EPS);
    assert!((stats.total_shipping - 1_000.0).abs() < EPS);
    assert!((stats.total_nominal - 14_000.0).abs() < EPS);
    assert!((stats.total_saved - 1_000.0).abs() < EPS);

    // Row order follows fetch order.
    let ids: Vec<&str> = outcome.rows.iter().map(|r| r.order_id.as_str()).collect();
    assert_eq!(ids, ["A1", "A1", "A2", "A3"]);
}

#[tokio::test]
async fn effective_totals_reconstruct_each_subtotal() {
    let source = ScriptedSource::new(fixture_orders());
    let outcome = run_export(source, &test_config(20)).await;

    let subtotals = [("A1", 9_000.0), ("A2", 0.0), ("A3", 4_000.0)];
    for (id, subtotal) in subtotals {
        let effective: f64 = outcome
            .rows
            .iter()
            .filter(|r| r.order_id == id)
            .map(|r| r.item.effective_line)
            .sum();
        assert!(
            (effective - subtotal).abs() < EPS,
            "order {id}: effective {effective} vs subtotal {subtotal}"
        );
    }
}

#[tokio::test]
async fn transport_failure_preserves_partial_results() {
    let mut source = ScriptedSource::new(fixture_orders());
    source.fail_at_offset = Some(2);
    let fetches = source.fetches.clone();
    let outcome = run_export(source, &test_config(2)).await;

    assert_eq!(fetches.load(Ordering::SeqCst), 2);
    assert_eq!(outcome.stats.orders, 2);
    assert_eq!(outcome.stats.items, 3);
    assert!((outcome.stats.total_spent - 9_500.0).abs() < EPS);
}

#[tokio::test]
async fn rendered_document_is_spreadsheet_ready() {
    let source = ScriptedSource::new(fixture_orders());
    let outcome = run_export(source, &test_config(20)).await;
    let csv = render_csv(&outcome.rows, NumberStyle::QuotedThousands);

    assert!(csv.starts_with('\u{feff}'));
    let body = csv.trim_start_matches('\u{feff}');
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(lines.len(), 1 + outcome.rows.len());

    // The discounted items carry prorated prices.
    assert!(lines[1].contains("\"5,000\""));
    assert!(lines[1].contains("\"4,500\""));
    // The comma inside the item name was flattened to a space.
    assert!(lines[1].contains("\"USB cable  1m\""));
    // The dateless order renders sentinel date columns.
    assert!(lines[4].starts_with("unknown,N/A,N/A,N/A,A3,"));
}

#[tokio::test]
async fn written_file_round_trips_with_bom() {
    let source = ScriptedSource::new(fixture_orders());
    let outcome = run_export(source, &test_config(20)).await;
    let csv = render_csv(&outcome.rows, NumberStyle::PlainDecimal);

    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("orders.csv");
    std::fs::write(&path, &csv).expect("write csv");

    let bytes = std::fs::read(&path).expect("read csv");
    assert_eq!(&bytes[..3], [0xEF, 0xBB, 0xBF]);

    let text = String::from_utf8(bytes).expect("utf-8");
    assert_eq!(text, csv);
    // Plain-decimal cells are unquoted fixed two-decimal values.
    assert!(text.contains(",5000.00,4500.00,"));
}
