//! Customer directory: orders folded into one summary per email, then
//! filtered, ranked and paged for the directory table.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use sf_core::customer::CustomerSummary;
use sf_core::order::Order;
use sf_core::Timestamp;

use crate::paging::{paginate, PageResult, PageSize};

/// What a single aggregation pass tolerated instead of failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationReport {
    pub orders_seen: u64,
    /// Orders with no email; they belong to no customer.
    pub skipped_without_email: u64,
    /// Counted orders whose amount was missing or invalid and added as 0.
    pub zero_filled_amounts: u64,
    /// Counted orders with neither a usable `createdAt` nor `date`.
    pub undated_orders: u64,
    pub customers: u64,
}

impl AggregationReport {
    pub fn is_clean(&self) -> bool {
        self.skipped_without_email == 0 && self.zero_filled_amounts == 0 && self.undated_orders == 0
    }
}

/// Fold orders into one summary per distinct non-empty email, in first-seen
/// order.
pub fn aggregate(orders: &[Order]) -> Vec<CustomerSummary> {
    aggregate_with_report(orders).0
}

pub fn aggregate_with_report(orders: &[Order]) -> (Vec<CustomerSummary>, AggregationReport) {
    let mut report = AggregationReport::default();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut summaries: Vec<CustomerSummary> = Vec::new();

    for order in orders {
        report.orders_seen += 1;
        let Some(email) = order.customer_email() else {
            report.skipped_without_email += 1;
            continue;
        };

        let slot = *index.entry(email).or_insert_with(|| {
            summaries.push(CustomerSummary::seeded_from(email, order));
            summaries.len() - 1
        });
        let summary = &mut summaries[slot];

        summary.total_orders += 1;
        if !order.has_valid_amount() {
            report.zero_filled_amounts += 1;
        }
        summary.total_spent += order.amount_or_zero();

        match order.effective_date() {
            Some(at) => summary.observe_date(at),
            None => report.undated_orders += 1,
        }
    }

    report.customers = summaries.len() as u64;
    (summaries, report)
}

/// Directory orderings. Every key sorts stably, so ties keep their prior
/// relative order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    SpentDesc,
    SpentAsc,
    OrdersDesc,
    AlphaAsc,
    DateDesc,
    DateAsc,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::SpentDesc,
        SortKey::SpentAsc,
        SortKey::OrdersDesc,
        SortKey::AlphaAsc,
        SortKey::DateDesc,
        SortKey::DateAsc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::SpentDesc => "spent-desc",
            SortKey::SpentAsc => "spent-asc",
            SortKey::OrdersDesc => "orders-desc",
            SortKey::AlphaAsc => "alpha-asc",
            SortKey::DateDesc => "date-desc",
            SortKey::DateAsc => "date-asc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::SpentDesc => "Highest spend",
            SortKey::SpentAsc => "Lowest spend",
            SortKey::OrdersDesc => "Most orders",
            SortKey::AlphaAsc => "Name (A-Z)",
            SortKey::DateDesc => "Newest members",
            SortKey::DateAsc => "Oldest members",
        }
    }

    fn compare(&self, a: &CustomerSummary, b: &CustomerSummary) -> Ordering {
        match self {
            SortKey::SpentDesc => b.total_spent.total_cmp(&a.total_spent),
            SortKey::SpentAsc => a.total_spent.total_cmp(&b.total_spent),
            SortKey::OrdersDesc => b.total_orders.cmp(&a.total_orders),
            SortKey::AlphaAsc => collation_key(a.display_name()).cmp(&collation_key(b.display_name())),
            SortKey::DateDesc => dated(a.first_seen_at, b.first_seen_at, |x, y| y.cmp(&x)),
            SortKey::DateAsc => dated(a.first_seen_at, b.first_seen_at, |x, y| x.cmp(&y)),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sort key {0:?}, expected one of: spent-desc, spent-asc, orders-desc, alpha-asc, date-desc, date-asc")]
pub struct ParseSortKeyError(String);

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseSortKeyError(wanted.to_string()))
    }
}

/// Root-locale style key: accents and case are ignored first, then accents
/// break ties, so `emile` < `Émile` < `Zoe`.
fn collation_key(name: &str) -> (String, String) {
    let folded = name.trim().to_lowercase();
    let base = folded.nfd().filter(|c| !is_combining_mark(*c)).collect();
    (base, folded)
}

/// Undated summaries go last whichever direction is asked for.
fn dated(
    a: Option<Timestamp>,
    b: Option<Timestamp>,
    cmp: impl Fn(Timestamp, Timestamp) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Return a sorted copy; the input is left untouched.
pub fn sort(summaries: &[CustomerSummary], key: SortKey) -> Vec<CustomerSummary> {
    let mut sorted = summaries.to_vec();
    sorted.sort_by(|a, b| key.compare(a, b));
    sorted
}

/// Case-insensitive substring match on name or email. An empty query keeps
/// everything; whitespace is matched as typed.
pub fn filter(summaries: &[CustomerSummary], query: &str) -> Vec<CustomerSummary> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return summaries.to_vec();
    }
    summaries
        .iter()
        .filter(|c| {
            c.email.to_lowercase().contains(&needle)
                || c.name.as_deref().is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Directory controls as the presentation layer holds them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub sort: Option<SortKey>,
    #[serde(default)]
    pub page_size: PageSize,
    #[serde(default = "first_page")]
    pub page: usize,
}

fn first_page() -> usize {
    1
}

impl Default for DirectoryQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: None,
            page_size: PageSize::default(),
            page: 1,
        }
    }
}

impl DirectoryQuery {
    /// Filter, then sort, then page.
    pub fn apply(&self, summaries: &[CustomerSummary]) -> PageResult<CustomerSummary> {
        let filtered = filter(summaries, &self.search);
        let ordered = match self.sort {
            Some(key) => sort(&filtered, key),
            None => filtered,
        };
        paginate(&ordered, self.page_size, self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn orders(values: serde_json::Value) -> Vec<Order> {
        serde_json::from_value(values).unwrap()
    }

    fn emails(summaries: &[CustomerSummary]) -> Vec<&str> {
        summaries.iter().map(|c| c.email.as_str()).collect()
    }

    #[test]
    fn contact_details_come_from_first_order() {
        let input = orders(json!([
            {"customer": {"email": "a@x.com", "name": "Ada", "phone": "1", "address": "Old St"}, "totalAmount": 10, "date": "2024-01-01"},
            {"customer": {"email": "a@x.com", "name": "Ada L.", "phone": "2", "address": "New St"}, "totalAmount": 5, "date": "2024-02-01"}
        ]));
        let summaries = aggregate(&input);
        assert_eq!(summaries.len(), 1);
        let ada = &summaries[0];
        assert_eq!(ada.name.as_deref(), Some("Ada"));
        assert_eq!(ada.phone.as_deref(), Some("1"));
        assert_eq!(ada.address.as_deref(), Some("Old St"));
    }

    #[test]
    fn malformed_orders_still_count() {
        let input = orders(json!([
            {"customer": {"email": "a@x.com"}, "totalAmount": "oops"},
            {"customer": {"email": "a@x.com"}},
            {"customer": {"email": "a@x.com"}, "totalAmount": 7.5, "createdAt": "2024-03-01T12:00:00Z"},
            {"customer": {"name": "Guest"}, "totalAmount": 99},
            {"customer": {"email": ""}, "totalAmount": 99}
        ]));
        let (summaries, report) = aggregate_with_report(&input);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].total_orders, 3);
        assert_eq!(summaries[0].total_spent, 7.5);
        assert_eq!(summaries[0].first_seen_at, summaries[0].last_seen_at);
        assert_eq!(
            report,
            AggregationReport {
                orders_seen: 5,
                skipped_without_email: 2,
                zero_filled_amounts: 2,
                undated_orders: 2,
                customers: 1,
            }
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn email_key_is_case_sensitive() {
        let input = orders(json!([
            {"customer": {"email": "A@x.com"}},
            {"customer": {"email": "a@x.com"}}
        ]));
        assert_eq!(emails(&aggregate(&input)), vec!["A@x.com", "a@x.com"]);
    }

    #[test]
    fn date_window_fills_in_after_undated_first_order() {
        let input = orders(json!([
            {"customer": {"email": "a@x.com"}},
            {"customer": {"email": "a@x.com"}, "date": "2024-01-05"},
            {"customer": {"email": "a@x.com"}, "createdAt": "2024-01-02"}
        ]));
        let summary = &aggregate(&input)[0];
        assert_eq!(summary.first_seen_at, sf_core::parse_timestamp("2024-01-02"));
        assert_eq!(summary.last_seen_at, sf_core::parse_timestamp("2024-01-05"));
    }

    #[test]
    fn sort_keys_order_as_named() {
        let input = orders(json!([
            {"customer": {"email": "c@x.com", "name": "carol"}, "totalAmount": 50, "date": "2024-01-03"},
            {"customer": {"email": "a@x.com", "name": "Ada"}, "totalAmount": 300, "date": "2024-01-01"},
            {"customer": {"email": "b@x.com", "name": "Bola"}, "totalAmount": 100, "date": "2024-01-02"},
            {"customer": {"email": "b@x.com", "name": "Bola"}, "totalAmount": 100, "date": "2024-01-04"},
            {"customer": {"email": "d@x.com"}, "totalAmount": 50}
        ]));
        let summaries = aggregate(&input);
        assert_eq!(emails(&summaries), vec!["c@x.com", "a@x.com", "b@x.com", "d@x.com"]);

        assert_eq!(emails(&sort(&summaries, SortKey::SpentDesc)), vec!["a@x.com", "b@x.com", "c@x.com", "d@x.com"]);
        assert_eq!(emails(&sort(&summaries, SortKey::SpentAsc)), vec!["c@x.com", "d@x.com", "b@x.com", "a@x.com"]);
        assert_eq!(emails(&sort(&summaries, SortKey::OrdersDesc)), vec!["b@x.com", "c@x.com", "a@x.com", "d@x.com"]);
        assert_eq!(emails(&sort(&summaries, SortKey::AlphaAsc)), vec!["a@x.com", "b@x.com", "c@x.com", "d@x.com"]);
        assert_eq!(emails(&sort(&summaries, SortKey::DateDesc)), vec!["c@x.com", "b@x.com", "a@x.com", "d@x.com"]);
        assert_eq!(emails(&sort(&summaries, SortKey::DateAsc)), vec!["a@x.com", "b@x.com", "c@x.com", "d@x.com"]);

        // input untouched
        assert_eq!(emails(&summaries), vec!["c@x.com", "a@x.com", "b@x.com", "d@x.com"]);
    }

    #[test]
    fn sort_key_round_trips_through_text() {
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>(), Ok(key));
            assert_eq!(serde_json::to_value(key).unwrap(), json!(key.as_str()));
        }
        assert_eq!(" Spent-Desc ".parse::<SortKey>(), Ok(SortKey::SpentDesc));
        let err = "newest".parse::<SortKey>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown sort key \"newest\", expected one of: spent-desc, spent-asc, orders-desc, alpha-asc, date-desc, date-asc"
        );
    }

    #[test]
    fn alphabetical_sort_folds_accents_and_case() {
        let input = orders(json!([
            {"customer": {"email": "z@x.com", "name": "Zoe"}},
            {"customer": {"email": "e1@x.com", "name": "Émile"}},
            {"customer": {"email": "a@x.com", "name": "adam"}},
            {"customer": {"email": "e2@x.com", "name": "emile"}}
        ]));
        let sorted = sort(&aggregate(&input), SortKey::AlphaAsc);
        let names: Vec<&str> = sorted.iter().map(|c| c.display_name()).collect();
        assert_eq!(names, vec!["adam", "emile", "Émile", "Zoe"]);

        let without_plain: Vec<CustomerSummary> = sorted.into_iter().filter(|c| c.email != "e2@x.com").collect();
        let names: Vec<&str> = without_plain.iter().map(|c| c.display_name()).collect();
        assert_eq!(names, vec!["adam", "Émile", "Zoe"]);
    }

    #[test]
    fn filter_matches_name_or_email() {
        let input = orders(json!([
            {"customer": {"email": "ada@lagos.ng", "name": "Ada Obi"}},
            {"customer": {"email": "tunde@abuja.ng", "name": "Tunde"}},
            {"customer": {"email": "no-name@lagos.ng"}}
        ]));
        let summaries = aggregate(&input);
        assert_eq!(emails(&filter(&summaries, "LAGOS")), vec!["ada@lagos.ng", "no-name@lagos.ng"]);
        assert_eq!(emails(&filter(&summaries, "obi")), vec!["ada@lagos.ng"]);
        assert_eq!(filter(&summaries, "").len(), 3);
        assert_eq!(emails(&filter(&summaries, " ")), vec!["ada@lagos.ng"]);
        assert!(filter(&summaries, "   ").is_empty());
        assert!(filter(&summaries, "kano").is_empty());
    }

    #[test]
    fn directory_query_filters_sorts_then_pages() {
        let input: Vec<Order> = (0..12)
            .map(|i| {
                serde_json::from_value(json!({
                    "customer": {"email": format!("shop{i}@x.com"), "name": format!("Shop {i}")},
                    "totalAmount": i * 10
                }))
                .unwrap()
            })
            .collect();
        let summaries = aggregate(&input);
        let query = DirectoryQuery {
            search: "shop1".to_string(),
            sort: Some(SortKey::SpentDesc),
            page_size: PageSize::Rows(2),
            page: 5,
        };
        let page = query.apply(&summaries);
        // shop1, shop10, shop11 match; ranked 11, 10, 1; page 5 clamps to 2
        assert_eq!(page.page, 2);
        assert_eq!(emails(&page.items), vec!["shop1@x.com"]);
        assert_eq!((page.show_start, page.show_end, page.total_items), (3, 3, 3));
    }
}
