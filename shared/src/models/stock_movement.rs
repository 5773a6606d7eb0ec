//! Stock Movement Model
//!
//! Movements are append-only: never mutated or deleted, only created.
//! `Ingredient.stock` is a cached projection of this history and is
//! updated in the same transaction that appends a movement.

use crate::util::snowflake_id;
use serde::{Deserialize, Serialize};

/// Movement type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Consumption from a sale (negative quantity)
    Sale,
    /// Goods received from a supplier (positive quantity)
    Purchase,
    /// Inventory count correction (signed)
    Adjustment,
    /// Spoilage / breakage (negative quantity)
    Waste,
    /// Reversal of consumption, e.g. order cancellation (positive quantity)
    Restock,
}

/// A single signed stock movement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockMovement {
    pub id: i64,
    pub ingredient_id: String,
    /// Signed quantity: negative = consumption, positive = restock/purchase
    pub quantity: f64,
    pub movement_type: MovementType,
    /// Unix millis
    pub timestamp: i64,
    /// Reference to the originating document (order id, purchase ref, count ref)
    pub document_ref: String,
    /// Unit cost for PURCHASE movements (feeds the weighted-average update)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<f64>,
}

impl StockMovement {
    /// Create a movement with a fresh snowflake id
    pub fn new(
        ingredient_id: impl Into<String>,
        quantity: f64,
        movement_type: MovementType,
        timestamp: i64,
        document_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: snowflake_id(),
            ingredient_id: ingredient_id.into(),
            quantity,
            movement_type,
            timestamp,
            document_ref: document_ref.into(),
            unit_cost: None,
        }
    }

    /// Attach the unit cost (purchase movements)
    pub fn with_unit_cost(mut self, unit_cost: f64) -> Self {
        self.unit_cost = Some(unit_cost);
        self
    }

    /// Whether this movement consumes stock
    pub fn is_consumption(&self) -> bool {
        self.quantity < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_construction() {
        let m = StockMovement::new("ing-1", -2.0, MovementType::Sale, 1_700_000_000_000, "ord-1");
        assert!(m.id > 0);
        assert!(m.is_consumption());
        assert_eq!(m.movement_type, MovementType::Sale);
        assert!(m.unit_cost.is_none());
    }

    #[test]
    fn test_purchase_with_unit_cost() {
        let m = StockMovement::new(
            "ing-1",
            10.0,
            MovementType::Purchase,
            1_700_000_000_000,
            "po-77",
        )
        .with_unit_cost(4.25);
        assert!(!m.is_consumption());
        assert_eq!(m.unit_cost, Some(4.25));
    }

    #[test]
    fn test_movement_type_serde_format() {
        let json = serde_json::to_string(&MovementType::Restock).unwrap();
        assert_eq!(json, "\"RESTOCK\"");
    }
}
