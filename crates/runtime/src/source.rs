//! Where order snapshots come from, and how a caller makes sure only the
//! newest completed fetch reaches the views.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use sf_core::order::Order;
use sf_core::{decode_orders, RejectedRecord};

use crate::metrics::MetricsRegistry;

/// One completed fetch of the full order collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBatch {
    pub orders: Vec<Order>,
    pub rejected: Vec<RejectedRecord>,
}

/// "Fetch all orders". Implementations return the whole collection; the views
/// never page or filter at the source.
pub trait OrderSource {
    fn fetch_orders(&self) -> Result<OrderBatch>;
}

/// Reads an order feed exported from the API as a JSON array.
pub struct JsonFileSource {
    path: PathBuf,
    metrics: MetricsRegistry,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>, metrics: MetricsRegistry) -> Self {
        Self {
            path: path.into(),
            metrics,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OrderSource for JsonFileSource {
    fn fetch_orders(&self) -> Result<OrderBatch> {
        let payload = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading order feed {}", self.path.display()))?;
        let decoded = decode_orders(&payload)
            .with_context(|| format!("decoding order feed {}", self.path.display()))?;

        for rejected in &decoded.rejected {
            warn!(index = rejected.index, reason = %rejected.reason, "skipping malformed order record");
        }
        self.metrics.inc_orders_fetched(decoded.orders.len() as u64);
        self.metrics.inc_records_rejected(decoded.rejected.len() as u64);
        info!(
            path = %self.path.display(),
            orders = decoded.orders.len(),
            rejected = decoded.rejected.len(),
            "order feed loaded"
        );

        Ok(OrderBatch {
            orders: decoded.orders,
            rejected: decoded.rejected,
        })
    }
}

/// Serves a fixed collection; handy for demos and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    orders: Vec<Order>,
}

impl StaticSource {
    pub fn new(orders: Vec<Order>) -> Self {
        Self { orders }
    }
}

impl OrderSource for StaticSource {
    fn fetch_orders(&self) -> Result<OrderBatch> {
        Ok(OrderBatch {
            orders: self.orders.clone(),
            rejected: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Hands out a ticket per fetch and only lets the newest one through. A
/// fetch that completes after a newer one has started is discarded.
#[derive(Clone, Default)]
pub struct FetchGuard {
    latest: Arc<AtomicU64>,
    metrics: MetricsRegistry,
}

impl FetchGuard {
    pub fn new(metrics: MetricsRegistry) -> Self {
        Self {
            latest: Arc::default(),
            metrics,
        }
    }

    pub fn begin(&self) -> FetchTicket {
        FetchTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    pub fn accept(&self, ticket: FetchTicket, batch: OrderBatch) -> Option<OrderBatch> {
        if self.is_current(ticket) {
            Some(batch)
        } else {
            debug!(ticket = ticket.0, "discarding superseded order fetch");
            self.metrics.inc_stale_fetches(1);
            None
        }
    }

    /// Begin, fetch and accept in one go.
    pub fn fetch_latest(&self, source: &dyn OrderSource) -> Result<Option<OrderBatch>> {
        let ticket = self.begin();
        let batch = source.fetch_orders()?;
        Ok(self.accept(ticket, batch))
    }
}
