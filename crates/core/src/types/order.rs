//! Order placement payload and display identifiers.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{CustomerId, ItemId, Money};

/// The immutable payload sent to the backend order-placement endpoint.
///
/// Wire shape: `{"orderId", "date", "customerId", "orderDetails":
/// [{"itemId", "qty", "unitPrice"}]}`, with the date as `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub order_id: u32,
    pub date: NaiveDate,
    pub customer_id: CustomerId,
    pub order_details: Vec<OrderDetail>,
}

/// One line of an order payload, price frozen at add-to-cart time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub item_id: ItemId,
    pub qty: u32,
    pub unit_price: Money,
}

/// Sequence-derived display identifier, rendered as `ORD-0042`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(pub u32);

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ORD-{:04}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_order_number_zero_pads_to_four() {
        assert_eq!(OrderNumber(1).to_string(), "ORD-0001");
        assert_eq!(OrderNumber(42).to_string(), "ORD-0042");
        assert_eq!(OrderNumber(12345).to_string(), "ORD-12345");
    }

    #[test]
    fn test_payload_wire_format() {
        let payload = OrderPayload {
            order_id: 7,
            date: NaiveDate::from_ymd_opt(2026, 8, 29).expect("valid date"),
            customer_id: CustomerId::new(2),
            order_details: vec![OrderDetail {
                item_id: ItemId::new(5),
                qty: 3,
                unit_price: Money::new(Decimal::from_str("9.99").expect("decimal")),
            }],
        };

        let json = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(json["orderId"], 7);
        assert_eq!(json["date"], "2026-08-29");
        assert_eq!(json["customerId"], 2);
        assert_eq!(json["orderDetails"][0]["itemId"], 5);
        assert_eq!(json["orderDetails"][0]["qty"], 3);
        assert_eq!(json["orderDetails"][0]["unitPrice"], "9.99");
    }
}
