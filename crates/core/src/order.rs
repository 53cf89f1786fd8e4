use serde::{Deserialize, Serialize};

use crate::{de, parse_timestamp, Amount, OrderId, Timestamp};

/// Status the dashboard counts as awaiting fulfilment.
pub const PENDING_STATUS: &str = "Pending";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderCustomer {
    #[serde(default, deserialize_with = "de::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    #[serde(default, deserialize_with = "de::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::quantity")]
    pub qty: Option<u64>,
    #[serde(default, deserialize_with = "de::quantity")]
    pub quantity: Option<u64>,
}

impl OrderItem {
    /// First non-zero of `qty` and `quantity`, otherwise a single unit.
    pub fn units(&self) -> u64 {
        self.qty
            .filter(|q| *q > 0)
            .or(self.quantity.filter(|q| *q > 0))
            .unwrap_or(1)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "de::id")]
    pub id: OrderId,
    #[serde(default)]
    pub customer: Option<OrderCustomer>,
    #[serde(default, deserialize_with = "de::amount")]
    pub total_amount: Option<Amount>,
    #[serde(default, deserialize_with = "de::text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub items: Vec<OrderItem>,
    #[serde(default, deserialize_with = "de::text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub order_status: Option<String>,
}

impl Order {
    /// The customer's email when it is present and non-empty. Email is the
    /// customer key and is compared case-sensitively.
    pub fn customer_email(&self) -> Option<&str> {
        self.customer
            .as_ref()
            .and_then(|c| c.email.as_deref())
            .filter(|email| !email.is_empty())
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer.as_ref().and_then(|c| c.name.as_deref())
    }

    pub fn has_valid_amount(&self) -> bool {
        self.total_amount.is_some()
    }

    /// Missing or invalid amounts count as zero, never as anything else.
    pub fn amount_or_zero(&self) -> Amount {
        self.total_amount.unwrap_or(0.0)
    }

    /// `createdAt` when parseable, otherwise `date`.
    pub fn effective_date(&self) -> Option<Timestamp> {
        self.created_at
            .as_deref()
            .and_then(parse_timestamp)
            .or_else(|| self.date.as_deref().and_then(parse_timestamp))
    }

    /// `orderStatus` wins over the legacy `status` field.
    pub fn status(&self) -> Option<&str> {
        self.order_status.as_deref().or(self.status.as_deref())
    }

    pub fn is_pending(&self) -> bool {
        self.status() == Some(PENDING_STATUS)
    }

    /// Short id shown in tables: the last six characters, upper-cased.
    pub fn display_id(&self) -> String {
        let chars: Vec<char> = self.id.chars().collect();
        let start = chars.len().saturating_sub(6);
        chars[start..].iter().collect::<String>().to_uppercase()
    }
}
