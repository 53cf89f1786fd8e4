//! Runtime plumbing around the pure views: tracing bootstrap, order sources,
//! metrics, preferences and report configuration.

use tracing::{info, warn, Level};

use sf_views::AggregationReport;

pub mod config;
pub mod metrics;
pub mod prefs;
pub mod source;

pub use config::ReportConfig;
pub use metrics::{MetricsRegistry, MetricsSnapshot, PassTimer};
pub use source::{FetchGuard, FetchTicket, JsonFileSource, OrderBatch, OrderSource, StaticSource};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_max_level(Level::INFO)
        .try_init();
}

/// Log what an aggregation pass tolerated and fold it into the registry.
pub fn record_aggregation(metrics: &MetricsRegistry, report: &AggregationReport) {
    metrics.record_aggregation(report);
    info!(
        orders = report.orders_seen,
        customers = report.customers,
        "customer directory aggregated"
    );
    if report.is_clean() {
        return;
    }
    if report.skipped_without_email > 0 {
        warn!(
            skipped = report.skipped_without_email,
            "orders without a customer email left out of the directory"
        );
    }
    if report.zero_filled_amounts > 0 {
        warn!(orders = report.zero_filled_amounts, "missing or invalid order totals counted as 0");
    }
    if report.undated_orders > 0 {
        info!(orders = report.undated_orders, "orders without a usable date");
    }
}
