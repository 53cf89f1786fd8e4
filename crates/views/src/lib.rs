//! Derived views over an order snapshot: the customer directory, dashboard
//! aggregates (top-K, daily windows) and the order table.
//!
//! Every function here is pure. Callers fetch orders, hand the latest
//! snapshot in, and render whatever comes back.

pub mod customers;
pub mod dashboard;
pub mod orders;
pub mod paging;

pub use customers::{
    aggregate, aggregate_with_report, filter, sort, AggregationReport, DirectoryQuery, SortKey,
};
pub use paging::{paginate, PageResult, PageSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopKConfig {
    pub k: usize,
}

impl Default for TopKConfig {
    fn default() -> Self {
        Self { k: 5 }
    }
}
