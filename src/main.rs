//! Export binary: fetch the full order history and write the ledger CSV.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopee_ledger::aggregator::{run_export, RunningStats};
use shopee_ledger::client::OrderHistoryClient;
use shopee_ledger::models::Config;
use shopee_ledger::render::{group_thousands, render_csv};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    info!(
        page_size = config.page_size,
        delay_ms = config.inter_page_delay_ms,
        source = config.nominal_price_source.as_str(),
        style = config.number_style.as_str(),
        "starting order export"
    );

    let client = OrderHistoryClient::new(&config.api_base)?;
    let outcome = run_export(client, &config).await;

    let csv = render_csv(&outcome.rows, config.number_style);
    let path = config
        .output_path
        .clone()
        .unwrap_or_else(|| format!("shopee_orders_{}.csv", Utc::now().format("%Y-%m-%d")));
    std::fs::write(&path, csv).with_context(|| format!("failed to write {}", path))?;
    info!(path = %path, rows = outcome.rows.len(), "ledger written");

    print_summary(&outcome.stats);

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopee_ledger=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn print_summary(stats: &RunningStats) {
    println!("\n========================================");
    println!("=== EXPORT SUMMARY ===");
    println!("========================================");
    println!("Orders:            {}", stats.orders);
    println!("Line items:        {}", stats.items);
    println!("  - priced:        {}", stats.paid_items());
    println!("  - gifts (0 VND): {}", stats.gift_items);
    println!();
    println!("Total spent:       {} VND", group_thousands(stats.total_spent));
    println!("  - shipping:      {} VND", group_thousands(stats.total_shipping));
    println!("  - products only: {} VND", group_thousands(stats.product_spend()));
    println!();
    println!("Nominal total:     {} VND", group_thousands(stats.total_nominal));
    println!("Total saved:       {} VND", group_thousands(stats.total_saved));
    if stats.no_date_orders > 0 {
        println!();
        println!("Orders without a purchase date: {}", stats.no_date_orders);
    }
    println!("========================================");
}
