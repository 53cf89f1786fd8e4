use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use sf_views::AggregationReport;

#[derive(Clone, Default)]
pub struct MetricsRegistry {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    orders_fetched: AtomicU64,
    records_rejected: AtomicU64,
    orders_without_email: AtomicU64,
    zero_filled_amounts: AtomicU64,
    undated_orders: AtomicU64,
    customers_peak: AtomicU64,
    stale_fetches: AtomicU64,
}

impl MetricsRegistry {
    pub fn inc_orders_fetched(&self, delta: u64) {
        self.inner.orders_fetched.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_records_rejected(&self, delta: u64) {
        self.inner.records_rejected.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_stale_fetches(&self, delta: u64) {
        self.inner.stale_fetches.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn record_aggregation(&self, report: &AggregationReport) {
        self.inner
            .orders_without_email
            .fetch_add(report.skipped_without_email, Ordering::Relaxed);
        self.inner
            .zero_filled_amounts
            .fetch_add(report.zero_filled_amounts, Ordering::Relaxed);
        self.inner
            .undated_orders
            .fetch_add(report.undated_orders, Ordering::Relaxed);
        self.inner
            .customers_peak
            .fetch_max(report.customers, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            orders_fetched: self.inner.orders_fetched.load(Ordering::Relaxed),
            records_rejected: self.inner.records_rejected.load(Ordering::Relaxed),
            orders_without_email: self.inner.orders_without_email.load(Ordering::Relaxed),
            zero_filled_amounts: self.inner.zero_filled_amounts.load(Ordering::Relaxed),
            undated_orders: self.inner.undated_orders.load(Ordering::Relaxed),
            customers_peak: self.inner.customers_peak.load(Ordering::Relaxed),
            stale_fetches: self.inner.stale_fetches.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub orders_fetched: u64,
    pub records_rejected: u64,
    pub orders_without_email: u64,
    pub zero_filled_amounts: u64,
    pub undated_orders: u64,
    pub customers_peak: u64,
    pub stale_fetches: u64,
}

impl MetricsSnapshot {
    pub fn to_json_line(&self, label: &str, elapsed: Option<Duration>) -> String {
        #[derive(Serialize)]
        struct Line<'a> {
            label: &'a str,
            #[serde(flatten)]
            counters: &'a MetricsSnapshot,
            elapsed_ms: Option<u128>,
        }

        let payload = Line {
            label,
            counters: self,
            elapsed_ms: elapsed.map(|d| d.as_millis()),
        };
        serde_json::to_string(&payload).unwrap_or_else(|_| String::from("{}"))
    }
}

/// Wall-clock timer for one fetch-and-render pass.
pub struct PassTimer {
    start: Instant,
}

impl PassTimer {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
