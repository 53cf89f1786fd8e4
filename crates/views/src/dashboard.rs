//! Dashboard aggregates: headline stats, the daily sales window and the
//! top-K boards.

use std::collections::{HashMap, HashSet};

use chrono::{Days, NaiveDate};
use serde::Serialize;

use sf_core::customer::CustomerSummary;
use sf_core::order::Order;
use sf_core::Amount;

use crate::customers::{aggregate, sort, SortKey};
use crate::TopKConfig;

/// Ranks that get a badge on the top customers board.
pub const PODIUM: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub revenue: Amount,
    pub orders: u64,
    /// Distinct non-empty customer emails.
    pub customers: u64,
    pub pending: u64,
}

pub fn dashboard_stats(orders: &[Order]) -> DashboardStats {
    let mut emails: HashSet<&str> = HashSet::new();
    let mut stats = DashboardStats::default();
    for order in orders {
        stats.orders += 1;
        stats.revenue += order.amount_or_zero();
        if order.is_pending() {
            stats.pending += 1;
        }
        if let Some(email) = order.customer_email() {
            emails.insert(email);
        }
    }
    stats.customers = emails.len() as u64;
    stats
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
    pub day: NaiveDate,
    /// Chart label, e.g. `Jan 5`.
    pub label: String,
    pub sales: Amount,
}

/// Sales per UTC calendar day for the `days` days ending at `today`, oldest
/// first. Orders outside the window or without a usable date are ignored.
pub fn daily_sales(orders: &[Order], today: NaiveDate, days: u32) -> Vec<DailySales> {
    let mut per_day: HashMap<NaiveDate, Amount> = HashMap::new();
    for order in orders {
        if let Some(at) = order.effective_date() {
            *per_day.entry(at.date_naive()).or_insert(0.0) += order.amount_or_zero();
        }
    }

    (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(u64::from(back))))
        .map(|day| DailySales {
            day,
            label: day.format("%b %-d").to_string(),
            sales: per_day.get(&day).copied().unwrap_or(0.0),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSales {
    pub name: String,
    pub units: u64,
}

/// Best sellers by units across all line items. Ties keep first-seen order;
/// items without a name are not counted.
pub fn top_products(orders: &[Order], cfg: TopKConfig) -> Vec<ProductSales> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut products: Vec<ProductSales> = Vec::new();
    for item in orders.iter().flat_map(|o| o.items.iter()) {
        let Some(name) = item.name.as_deref() else {
            continue;
        };
        let slot = *index.entry(name).or_insert_with(|| {
            products.push(ProductSales {
                name: name.to_string(),
                units: 0,
            });
            products.len() - 1
        });
        products[slot].units += item.units();
    }
    products.sort_by(|a, b| b.units.cmp(&a.units));
    products.truncate(cfg.k);
    products
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCustomer {
    /// 1-based.
    pub rank: usize,
    pub customer: CustomerSummary,
}

impl RankedCustomer {
    pub fn is_podium(&self) -> bool {
        self.rank <= PODIUM
    }
}

pub fn top_customers(orders: &[Order], cfg: TopKConfig) -> Vec<RankedCustomer> {
    sort(&aggregate(orders), SortKey::SpentDesc)
        .into_iter()
        .take(cfg.k)
        .enumerate()
        .map(|(i, customer)| RankedCustomer { rank: i + 1, customer })
        .collect()
}

/// Newest orders first; undated orders sink to the bottom.
pub fn recent_orders(orders: &[Order], cfg: TopKConfig) -> Vec<&Order> {
    let mut dated: Vec<(Option<sf_core::Timestamp>, &Order)> =
        orders.iter().map(|o| (o.effective_date(), o)).collect();
    dated.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    dated.into_iter().take(cfg.k).map(|(_, o)| o).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardConfig {
    pub chart_days: u32,
    pub top_products: TopKConfig,
    pub top_customers: TopKConfig,
    pub recent_orders: TopKConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            chart_days: 7,
            top_products: TopKConfig::default(),
            top_customers: TopKConfig::default(),
            recent_orders: TopKConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard<'a> {
    pub stats: DashboardStats,
    pub sales: Vec<DailySales>,
    pub top_products: Vec<ProductSales>,
    pub top_customers: Vec<RankedCustomer>,
    pub recent_orders: Vec<&'a Order>,
}

pub fn build_dashboard<'a>(orders: &'a [Order], today: NaiveDate, cfg: &DashboardConfig) -> Dashboard<'a> {
    Dashboard {
        stats: dashboard_stats(orders),
        sales: daily_sales(orders, today, cfg.chart_days),
        top_products: top_products(orders, cfg.top_products),
        top_customers: top_customers(orders, cfg.top_customers),
        recent_orders: recent_orders(orders, cfg.recent_orders),
    }
}
