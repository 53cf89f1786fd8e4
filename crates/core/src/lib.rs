//! Core types for Storefront Insights: orders as the REST API ships them and
//! the customer summaries derived from them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type OrderId = String;
pub type Email = String;

/// Decimal currency amount, no minor units.
pub type Amount = f64;

pub type Timestamp = DateTime<Utc>;

#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("order feed must be a JSON array, found {found}")]
    NotAnArray { found: &'static str },
}

/// A feed record that could not be decoded into an [`order::Order`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RejectedRecord {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedOrders {
    pub orders: Vec<order::Order>,
    pub rejected: Vec<RejectedRecord>,
}

/// Decode an order feed record by record. A malformed record is reported in
/// `rejected` and never fails the rest of the feed.
pub fn decode_orders(payload: &str) -> Result<DecodedOrders, CoreError> {
    let value: Value = serde_json::from_str(payload)?;
    decode_order_values(value)
}

pub fn decode_order_values(value: Value) -> Result<DecodedOrders, CoreError> {
    let records = match value {
        Value::Array(records) => records,
        other => {
            return Err(CoreError::NotAnArray {
                found: json_kind(&other),
            })
        }
    };

    let mut decoded = DecodedOrders::default();
    for (index, record) in records.into_iter().enumerate() {
        if !record.is_object() {
            decoded.rejected.push(RejectedRecord {
                index,
                reason: format!("expected an object, found {}", json_kind(&record)),
            });
            continue;
        }
        match serde_json::from_value::<order::Order>(record) {
            Ok(order) => decoded.orders.push(order),
            Err(err) => decoded.rejected.push(RejectedRecord {
                index,
                reason: err.to_string(),
            }),
        }
    }
    Ok(decoded)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse the timestamp shapes the order API emits: RFC 3339, naive
/// date-times (read as UTC) and bare dates (UTC midnight).
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

mod de;
pub mod customer;
pub mod order;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse_timestamp("2024-01-05T10:30:00+01:00").unwrap();
        assert_eq!(ts.hour(), 9);
        assert_eq!(ts.day(), 5);
    }

    #[test]
    fn parses_naive_and_bare_dates() {
        let naive = parse_timestamp("2024-01-05T10:30:00.250").unwrap();
        assert_eq!((naive.hour(), naive.minute()), (10, 30));

        let bare = parse_timestamp("2024-01-01").unwrap();
        assert_eq!((bare.month(), bare.day(), bare.hour()), (1, 1, 0));
    }

    #[test]
    fn rejects_garbage_timestamps() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2024-13-40").is_none());
    }

    #[test]
    fn decode_keeps_good_records_and_reports_bad_ones() {
        let payload = r#"[
            {"_id": "o1", "customer": {"email": "a@x.com"}, "totalAmount": 10},
            42,
            {"_id": "o2", "customer": "not-an-object"},
            {"_id": "o3", "totalAmount": "12.5"}
        ]"#;
        let decoded = decode_orders(payload).unwrap();
        let ids: Vec<_> = decoded.orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["o1", "o3"]);
        assert_eq!(decoded.rejected.len(), 2);
        assert_eq!(decoded.rejected[0].index, 1);
        assert_eq!(decoded.rejected[1].index, 2);
    }

    #[test]
    fn decode_rejects_non_array_payload() {
        let err = decode_orders(r#"{"orders": []}"#).unwrap_err();
        assert!(matches!(err, CoreError::NotAnArray { found: "an object" }));
    }
}
