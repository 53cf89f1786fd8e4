use std::io;

use serde::{Deserialize, Serialize};

use sf_core::order::Order;

pub const CSV_HEADER: [&str; 5] = ["Order ID", "Customer Name", "Date", "Total", "Status"];

/// Order table search box and status selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilter {
    #[serde(default)]
    pub search: String,
    /// `None` shows every status.
    #[serde(default)]
    pub status: Option<String>,
}

impl OrderFilter {
    /// Matches the full id, the short display id or the customer name. A
    /// leading `#` in the search is ignored.
    pub fn matches(&self, order: &Order) -> bool {
        let query = self.search.replace('#', "").trim().to_lowercase();
        let matches_search = query.is_empty()
            || order.id.to_lowercase().contains(&query)
            || order.display_id().to_lowercase().contains(&query)
            || order
                .customer_name()
                .is_some_and(|name| name.to_lowercase().contains(&query));
        let matches_status = match self.status.as_deref() {
            None => true,
            Some(wanted) => order.status() == Some(wanted),
        };
        matches_search && matches_status
    }

    pub fn apply<'a>(&self, orders: &'a [Order]) -> Vec<&'a Order> {
        orders.iter().filter(|o| self.matches(o)).collect()
    }
}

pub fn write_orders_csv<'a, W, I>(orders: I, writer: W) -> csv::Result<()>
where
    W: io::Write,
    I: IntoIterator<Item = &'a Order>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for order in orders {
        let date = order
            .effective_date()
            .map(|at| at.format("%m/%d/%Y").to_string())
            .unwrap_or_default();
        let total = order.total_amount.map(|a| a.to_string()).unwrap_or_default();
        wtr.write_record([
            order.id.as_str(),
            order.customer_name().unwrap_or("Guest"),
            date.as_str(),
            total.as_str(),
            order.status().unwrap_or(""),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn orders_to_csv<'a, I>(orders: I) -> csv::Result<String>
where
    I: IntoIterator<Item = &'a Order>,
{
    let mut buf = Vec::new();
    write_orders_csv(orders, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Vec<Order> {
        serde_json::from_value(json!([
            {"_id": "65a1f0c2e4b0a1b2c3d4e5f6", "customer": {"name": "Ada, Obi"}, "totalAmount": 1500,
             "createdAt": "2024-01-05T09:00:00Z", "orderStatus": "Pending"},
            {"_id": "65a1f0c2e4b0a1b2c3aa0001", "customer": {"name": "Tunde"}, "totalAmount": 99.5,
             "createdAt": "2024-02-10T09:00:00Z", "orderStatus": "Delivered"},
            {"_id": "65a1f0c2e4b0a1b2c3bb0002", "totalAmount": "n/a"}
        ]))
        .unwrap()
    }

    fn ids<'a>(orders: &[&'a Order]) -> Vec<&'a str> {
        orders.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn search_by_short_id_name_or_full_id() {
        let orders = sample();
        let by_short = OrderFilter { search: "#d4e5f6".into(), status: None };
        assert_eq!(ids(&by_short.apply(&orders)), vec!["65a1f0c2e4b0a1b2c3d4e5f6"]);

        let by_name = OrderFilter { search: "tun".into(), status: None };
        assert_eq!(ids(&by_name.apply(&orders)), vec!["65a1f0c2e4b0a1b2c3aa0001"]);

        let everything = OrderFilter::default();
        assert_eq!(everything.apply(&orders).len(), 3);
    }

    #[test]
    fn status_filter_is_exact() {
        let orders = sample();
        let pending = OrderFilter { search: String::new(), status: Some("Pending".into()) };
        assert_eq!(ids(&pending.apply(&orders)), vec!["65a1f0c2e4b0a1b2c3d4e5f6"]);
        let lower = OrderFilter { search: String::new(), status: Some("pending".into()) };
        assert!(lower.apply(&orders).is_empty());
    }

    #[test]
    fn csv_export_quotes_and_fills_gaps() {
        let orders = sample();
        let csv = orders_to_csv(&orders).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Order ID,Customer Name,Date,Total,Status");
        assert_eq!(lines[1], "65a1f0c2e4b0a1b2c3d4e5f6,\"Ada, Obi\",01/05/2024,1500,Pending");
        assert_eq!(lines[2], "65a1f0c2e4b0a1b2c3aa0001,Tunde,02/10/2024,99.5,Delivered");
        assert_eq!(lines[3], "65a1f0c2e4b0a1b2c3bb0002,Guest,,,");
    }
}
