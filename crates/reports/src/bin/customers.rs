use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use sf_reports::{cell, format_amount, format_day};
use sf_runtime::prefs::{JsonFileStore, KvStore, MemoryStore, Preferences};
use sf_runtime::{init_tracing, record_aggregation, FetchGuard, JsonFileSource, MetricsRegistry, PassTimer, ReportConfig};
use sf_views::dashboard::PODIUM;
use sf_views::{aggregate_with_report, DirectoryQuery, PageSize, SortKey};

/// Customer directory built from an order feed.
#[derive(Parser, Debug)]
#[command(name = "customers")]
struct Args {
    /// JSON array of orders as served by the orders API
    #[arg(long)]
    orders: PathBuf,
    /// Case-insensitive match on name or email
    #[arg(long, default_value = "")]
    search: String,
    /// spent-desc, spent-asc, orders-desc, alpha-asc, date-desc or date-asc
    #[arg(long)]
    sort: Option<SortKey>,
    /// Rows per page, or "all"
    #[arg(long)]
    page_size: Option<PageSize>,
    #[arg(long, default_value_t = 1)]
    page: usize,
    /// Preference file holding the last sort and page size
    #[arg(long)]
    prefs: Option<PathBuf>,
    /// Save the effective sort and page size to the preference file
    #[arg(long)]
    remember: bool,
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    match args.prefs.clone() {
        Some(path) => run(&args, Preferences::load(JsonFileStore::open(path)?)?),
        None => run(&args, Preferences::load(MemoryStore::default())?),
    }
}

fn run<S: KvStore>(args: &Args, mut prefs: Preferences<S>) -> Result<()> {
    let timer = PassTimer::start();
    let metrics = MetricsRegistry::default();
    let cfg = ReportConfig::load(args.config.as_deref())?;

    let source = JsonFileSource::new(&args.orders, metrics.clone());
    let guard = FetchGuard::new(metrics.clone());
    let Some(batch) = guard.fetch_latest(&source)? else {
        return Ok(());
    };

    let (summaries, report) = aggregate_with_report(&batch.orders);
    record_aggregation(&metrics, &report);

    let query = DirectoryQuery {
        search: args.search.clone(),
        sort: args.sort.or(prefs.sort()).or(cfg.sort),
        page_size: args.page_size.or(prefs.page_size()).unwrap_or(cfg.page_size),
        page: args.page,
    };
    let page = query.apply(&summaries);
    if let Some(key) = query.sort {
        println!("Sorted by: {}", key.label());
    }

    if page.items.is_empty() {
        println!("No customers found.");
    } else {
        println!(
            "{} {} {} {} {} {}",
            cell("#", 4),
            cell("Customer", 24),
            cell("Email", 28),
            cell("Total Spent", 14),
            cell("Orders", 7),
            "Last Active"
        );
        let ranked = query.sort == Some(SortKey::SpentDesc) && query.search.is_empty();
        for (offset, customer) in page.items.iter().enumerate() {
            let position = page.show_start + offset;
            let marker = if ranked && position <= PODIUM {
                format!("{position}*")
            } else {
                position.to_string()
            };
            println!(
                "{} {} {} {} {} {}",
                cell(&marker, 4),
                cell(customer.name.as_deref().unwrap_or("-"), 24),
                cell(&customer.email, 28),
                cell(&format_amount(customer.total_spent), 14),
                cell(&customer.total_orders.to_string(), 7),
                format_day(customer.last_seen_at)
            );
        }
    }
    println!(
        "Showing {} to {} of {} (page {} of {})",
        page.show_start, page.show_end, page.total_items, page.page, page.total_pages
    );

    if args.remember {
        prefs.set_sort(query.sort)?;
        prefs.set_page_size(query.page_size)?;
        info!(sort = ?query.sort, page_size = %query.page_size, "directory preferences saved");
    }

    info!("{}", metrics.snapshot().to_json_line("customers", Some(timer.elapsed())));
    Ok(())
}
