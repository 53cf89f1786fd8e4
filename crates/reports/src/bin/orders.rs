use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use sf_reports::{cell, format_amount, format_day};
use sf_runtime::{init_tracing, FetchGuard, JsonFileSource, MetricsRegistry, PassTimer};
use sf_views::orders::{write_orders_csv, OrderFilter};
use sf_views::{paginate, PageSize};

/// Order table with search, status filter and CSV export.
#[derive(Parser, Debug)]
#[command(name = "orders")]
struct Args {
    #[arg(long)]
    orders: PathBuf,
    /// Order id, short id (with or without '#') or customer name
    #[arg(long, default_value = "")]
    search: String,
    /// Exact order status; "All" disables the filter
    #[arg(long, default_value = "All")]
    status: String,
    #[arg(long, default_value_t = PageSize::Rows(10))]
    page_size: PageSize,
    #[arg(long, default_value_t = 1)]
    page: usize,
    /// Export every matching order as CSV instead of printing a page
    #[arg(long)]
    csv: bool,
    /// CSV destination; stdout when omitted
    #[arg(long, requires = "csv")]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let timer = PassTimer::start();
    let metrics = MetricsRegistry::default();

    let source = JsonFileSource::new(&args.orders, metrics.clone());
    let guard = FetchGuard::new(metrics.clone());
    let Some(batch) = guard.fetch_latest(&source)? else {
        return Ok(());
    };

    let filter = OrderFilter {
        search: args.search.clone(),
        status: Some(args.status.clone()).filter(|s| s != "All"),
    };
    let matching = filter.apply(&batch.orders);

    if args.csv {
        match &args.out {
            Some(path) => {
                let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
                write_orders_csv(matching.iter().copied(), file)?;
                info!(path = %path.display(), orders = matching.len(), "orders exported");
            }
            None => write_orders_csv(matching.iter().copied(), io::stdout().lock())?,
        }
    } else {
        let page = paginate(&matching, args.page_size, args.page);
        if page.items.is_empty() {
            println!("No orders found.");
        }
        for order in &page.items {
            println!(
                "#{} {} {} {} {}",
                order.display_id(),
                cell(order.customer_name().unwrap_or("Guest"), 24),
                format_day(order.effective_date()),
                cell(&order.total_amount.map(format_amount).unwrap_or_else(|| "-".to_string()), 12),
                order.status().unwrap_or("-")
            );
        }
        println!(
            "Showing {} to {} of {} orders (page {} of {})",
            page.show_start, page.show_end, page.total_items, page.page, page.total_pages
        );
    }

    info!("{}", metrics.snapshot().to_json_line("orders", Some(timer.elapsed())));
    Ok(())
}
