use serde::{Deserialize, Serialize};

use crate::order::Order;
use crate::{Amount, Email, Timestamp};

/// One unique customer's order history, recomputed from scratch on every
/// aggregation. Contact details come from the first order seen for the email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub email: Email,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub total_orders: u64,
    pub total_spent: Amount,
    /// Earliest effective order date ("joined").
    pub first_seen_at: Option<Timestamp>,
    /// Latest effective order date ("last active").
    pub last_seen_at: Option<Timestamp>,
}

impl CustomerSummary {
    /// Seed a summary from the first order seen for `email`. Counters start at
    /// zero; the caller records the order itself.
    pub fn seeded_from(email: &str, order: &Order) -> Self {
        let customer = order.customer.clone().unwrap_or_default();
        Self {
            email: email.to_string(),
            name: customer.name,
            phone: customer.phone,
            address: customer.address,
            total_orders: 0,
            total_spent: 0.0,
            first_seen_at: None,
            last_seen_at: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }

    /// Widen the seen-at window to include `at`.
    pub fn observe_date(&mut self, at: Timestamp) {
        if self.first_seen_at.map_or(true, |first| at < first) {
            self.first_seen_at = Some(at);
        }
        if self.last_seen_at.map_or(true, |last| at > last) {
            self.last_seen_at = Some(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_timestamp;

    #[test]
    fn observe_date_keeps_window_ordered() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "customer": {"name": "Ada", "email": "ada@x.com", "address": "12 Marina"}
        }))
        .unwrap();
        let mut summary = CustomerSummary::seeded_from("ada@x.com", &order);
        assert_eq!(summary.address.as_deref(), Some("12 Marina"));

        let mid = parse_timestamp("2024-01-03").unwrap();
        let early = parse_timestamp("2024-01-01").unwrap();
        let late = parse_timestamp("2024-01-09").unwrap();
        for at in [mid, late, early, mid] {
            summary.observe_date(at);
        }
        assert_eq!(summary.first_seen_at, Some(early));
        assert_eq!(summary.last_seen_at, Some(late));
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let order = Order::default();
        let summary = CustomerSummary::seeded_from("anon@x.com", &order);
        assert_eq!(summary.display_name(), "anon@x.com");
    }
}
