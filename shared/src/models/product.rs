//! Product Model

use serde::{Deserialize, Serialize};

/// One line of a product recipe
///
/// `quantity_per_unit` is how much of the ingredient one unit of the
/// product consumes, expressed in the ingredient's unit of measure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeLine {
    pub ingredient_id: String,
    pub quantity_per_unit: f64,
}

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Category reference (String ID)
    pub category: String,
    /// Unit sale price
    pub price: f64,
    /// Tax rate in percentage (e.g. 10 = 10%)
    pub vat_rate: i32,
    /// Ordered ingredient consumption per unit sold.
    /// Empty recipe: zero material cost, infinite availability.
    #[serde(default)]
    pub recipe: Vec<RecipeLine>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Product {
    /// Whether this product consumes ingredients when sold
    pub fn has_recipe(&self) -> bool {
        !self.recipe.is_empty()
    }
}
