use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use tracing::info;

use sf_reports::{cell, format_amount, format_day};
use sf_runtime::{init_tracing, record_aggregation, FetchGuard, JsonFileSource, MetricsRegistry, PassTimer, ReportConfig};
use sf_views::aggregate_with_report;
use sf_views::dashboard::build_dashboard;

/// Headline numbers, the sales window and the top-K boards.
#[derive(Parser, Debug)]
#[command(name = "dashboard")]
struct Args {
    #[arg(long)]
    orders: PathBuf,
    /// Last day of the sales window, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    today: Option<NaiveDate>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the dashboard as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let timer = PassTimer::start();
    let metrics = MetricsRegistry::default();
    let cfg = ReportConfig::load(args.config.as_deref())?;

    let source = JsonFileSource::new(&args.orders, metrics.clone());
    let guard = FetchGuard::new(metrics.clone());
    let Some(batch) = guard.fetch_latest(&source)? else {
        return Ok(());
    };
    let orders = batch.orders;

    let (_, report) = aggregate_with_report(&orders);
    record_aggregation(&metrics, &report);

    let today = args.today.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let dash = build_dashboard(&orders, today, &cfg.dashboard());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&dash)?);
    } else {
        let stats = &dash.stats;
        println!("Total revenue     {}", format_amount(stats.revenue));
        println!("Total orders      {}", stats.orders);
        println!("Active customers  {}", stats.customers);
        println!("Pending orders    {}", stats.pending);

        println!("\nSales, last {} days", cfg.chart_days);
        for day in &dash.sales {
            println!("  {} {}", cell(&day.label, 7), format_amount(day.sales));
        }

        println!("\nTop products");
        if dash.top_products.is_empty() {
            println!("  No sales yet.");
        }
        for product in &dash.top_products {
            println!("  {} {} sold", cell(&product.name, 28), product.units);
        }

        println!("\nTop customers");
        if dash.top_customers.is_empty() {
            println!("  No customers yet.");
        }
        for ranked in &dash.top_customers {
            let badge = if ranked.is_podium() { "*" } else { " " };
            println!(
                "  {}{} {} {} orders  {}",
                cell(&ranked.rank.to_string(), 2),
                badge,
                cell(ranked.customer.display_name(), 28),
                cell(&ranked.customer.total_orders.to_string(), 4),
                format_amount(ranked.customer.total_spent)
            );
        }

        println!("\nRecent orders");
        for order in &dash.recent_orders {
            println!(
                "  #{} {} {} {}",
                order.display_id(),
                cell(order.customer_name().unwrap_or("Guest"), 24),
                format_day(order.effective_date()),
                order.total_amount.map(format_amount).unwrap_or_else(|| "-".to_string())
            );
        }
    }

    info!("{}", metrics.snapshot().to_json_line("dashboard", Some(timer.elapsed())));
    Ok(())
}
