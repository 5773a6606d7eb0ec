//! Ingredient Model

use serde::{Deserialize, Serialize};

/// Ingredient entity
///
/// `stock` and `average_cost` are projections of the movement log and
/// are mutated only through ledger operations (sale, purchase,
/// adjustment, waste, restock); never assigned directly by callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    /// Unit of measure (e.g. "unit", "kg", "l")
    pub unit: String,
    /// Current stock quantity (derived from movement history)
    pub stock: f64,
    /// Minimum stock threshold for low-stock alerts
    pub minimum_stock: f64,
    /// Weighted-average unit cost (PMP), updated on purchase
    pub average_cost: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Ingredient {
    /// Whether current stock is at or below the alert threshold
    pub fn is_below_minimum(&self) -> bool {
        self.minimum_stock > 0.0 && self.stock <= self.minimum_stock
    }
}
