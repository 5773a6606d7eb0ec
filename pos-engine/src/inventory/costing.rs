//! Recipe costing and weighted-average cost (PMP)
//!
//! Costing never fails on missing-ingredient lookups: unknown
//! ingredients contribute zero cost and the broken reference surfaces
//! through `validate_stock` instead.

use rust_decimal::Decimal;
use shared::models::{Ingredient, Product};

use crate::money::{round_qty, to_decimal, to_f64};

/// Material cost of one unit of a product: Σ average_cost × recipe
/// quantity. 0 without a recipe; ingredients missing from the
/// collection contribute 0.
pub fn product_cost(product: &Product, ingredients: &[Ingredient]) -> f64 {
    let total = product
        .recipe
        .iter()
        .fold(Decimal::ZERO, |acc, line| {
            let cost = ingredients
                .iter()
                .find(|ing| ing.id == line.ingredient_id)
                .map(|ing| to_decimal(ing.average_cost))
                .unwrap_or(Decimal::ZERO);
            acc + cost * to_decimal(line.quantity_per_unit)
        });
    to_f64(round_qty(total))
}

/// Weighted-average unit cost after receiving goods.
///
/// `((stock × avg) + (qty × cost)) / (stock + qty)`, with the defined
/// edges: equals `received_cost` when current stock is zero, equals
/// `current_avg` when nothing was received. Never returns a negative
/// value: a negative received cost is a correction of an earlier
/// data-entry error, not a real price, and clamps to the non-negative
/// current average (or zero).
pub fn weighted_average_cost(
    current_stock: f64,
    current_avg: f64,
    received_qty: f64,
    received_cost: f64,
) -> f64 {
    if received_qty <= 0.0 {
        return current_avg.max(0.0);
    }
    // Oversold (negative) stock carries no cost weight in the blend
    let stock = to_decimal(current_stock.max(0.0));
    let qty = to_decimal(received_qty);
    if stock == Decimal::ZERO {
        return received_cost.max(0.0);
    }

    let blended = (stock * to_decimal(current_avg.max(0.0)) + qty * to_decimal(received_cost))
        / (stock + qty);
    if blended < Decimal::ZERO {
        current_avg.max(0.0)
    } else {
        to_f64(round_qty(blended))
    }
}
