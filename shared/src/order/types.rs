//! Order item and status types

use serde::{Deserialize, Serialize};

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    /// Terminal: no further item mutation is permitted
    Cancelled,
}

/// Kitchen preparation status, independent of [`OrderStatus`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KitchenStatus {
    #[default]
    Queued,
    Preparing,
    Ready,
    Served,
}

/// A line on an order
///
/// `unit_price` is a snapshot taken at order time and immutable
/// thereafter; later product price changes never touch placed orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub product_id: String,
    /// Product name snapshot (for receipts and audit)
    pub name: String,
    /// Always > 0
    pub quantity: i32,
    /// Price snapshot at order time
    pub unit_price: f64,
    /// Tax rate snapshot at order time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<i32>,
    /// Free-text note (e.g. "no onions")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Refunded lines are retained for audit, not deleted
    #[serde(default)]
    pub refunded: bool,
}

impl OrderItem {
    /// Line total: unit price × quantity (0 once refunded)
    pub fn line_total(&self) -> f64 {
        if self.refunded {
            0.0
        } else {
            self.unit_price * self.quantity as f64
        }
    }
}

/// Request to put a product on an order
///
/// The engine resolves the price/tax snapshots from the product at
/// order time; callers never supply them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: String,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let item = OrderItem {
            product_id: "p1".to_string(),
            name: "Burger".to_string(),
            quantity: 2,
            unit_price: 9.9,
            vat_rate: Some(10),
            note: None,
            refunded: false,
        };
        assert!((item.line_total() - 19.8).abs() < 1e-9);
    }

    #[test]
    fn test_refunded_line_contributes_zero() {
        let item = OrderItem {
            product_id: "p1".to_string(),
            name: "Burger".to_string(),
            quantity: 2,
            unit_price: 9.9,
            vat_rate: None,
            note: None,
            refunded: true,
        };
        assert_eq!(item.line_total(), 0.0);
    }

    #[test]
    fn test_status_serde_format() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Cancelled).unwrap(),
            "\"CANCELLED\""
        );
        assert_eq!(
            serde_json::to_string(&KitchenStatus::Preparing).unwrap(),
            "\"PREPARING\""
        );
    }
}
