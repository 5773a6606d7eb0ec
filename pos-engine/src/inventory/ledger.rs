//! Stock Ledger
//!
//! Converts (order items, product recipes, ingredient stock) into
//! validation results, stock deltas, and movements. Requirements are
//! aggregated per ingredient across the whole batch before comparison,
//! so two lines consuming the same ingredient are validated against
//! the cumulative requirement, not independently.
//!
//! All functions are pure and non-mutating; calling `destock` twice
//! with the same `document_ref` produces duplicate movements; the
//! caller owns idempotency.

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{Ingredient, MovementType, Product, StockMovement};
use shared::order::OrderItem;
use shared::{AppError, AppResult, ErrorCode};
use std::collections::BTreeMap;

use crate::money::{self, round_qty, to_decimal, to_f64};
use crate::validation::{MAX_REF_LEN, validate_required_text};

/// One ingredient shortfall
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockShortage {
    pub ingredient_id: String,
    pub ingredient_name: String,
    pub required: f64,
    pub available: f64,
}

/// One stock validation problem
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockIssue {
    /// Cumulative requirement exceeds current stock
    Insufficient(StockShortage),
    /// A recipe references an ingredient absent from the collection
    MissingIngredient {
        ingredient_id: String,
        product_id: String,
    },
}

impl StockIssue {
    /// The error code this issue maps to under a blocking policy
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Insufficient(_) => ErrorCode::StockInsufficient,
            Self::MissingIngredient { .. } => ErrorCode::MissingIngredient,
        }
    }

    /// Human-readable one-liner naming the ingredient
    pub fn describe(&self) -> String {
        match self {
            Self::Insufficient(s) => format!(
                "stock insufficient for {}: need {}, have {}",
                s.ingredient_name, s.required, s.available
            ),
            Self::MissingIngredient {
                ingredient_id,
                product_id,
            } => format!(
                "recipe of product {} references unknown ingredient {}",
                product_id, ingredient_id
            ),
        }
    }
}

/// Result of [`validate_stock`]
#[derive(Debug, Clone, PartialEq)]
pub struct StockValidation {
    pub valid: bool,
    pub issues: Vec<StockIssue>,
}

/// Result of [`destock`] / [`restock`]: the new ingredient collection
/// plus the movements to append alongside it
#[derive(Debug, Clone)]
pub struct DestockOutcome {
    pub ingredients: Vec<Ingredient>,
    pub movements: Vec<StockMovement>,
}

/// Cumulative recipe requirement per ingredient across a batch.
///
/// Refunded lines are excluded. The map also tracks which product
/// first referenced each ingredient, for error context. BTreeMap keeps
/// iteration (and therefore issue/movement order) deterministic.
fn aggregate_requirements(
    items: &[OrderItem],
    products: &[Product],
) -> BTreeMap<String, (Decimal, String)> {
    let mut requirements: BTreeMap<String, (Decimal, String)> = BTreeMap::new();
    for item in items.iter().filter(|item| !item.refunded) {
        let Some(product) = products.iter().find(|p| p.id == item.product_id) else {
            // Unknown product: nothing to expand, surfaces elsewhere
            continue;
        };
        for line in &product.recipe {
            let needed = to_decimal(line.quantity_per_unit) * Decimal::from(item.quantity);
            let entry = requirements
                .entry(line.ingredient_id.clone())
                .or_insert_with(|| (Decimal::ZERO, product.id.clone()));
            entry.0 += needed;
        }
    }
    requirements
}

/// Validate a batch of order items against current stock.
///
/// A product with no recipe never fails. An ingredient referenced by a
/// recipe but absent from the collection is reported as
/// [`StockIssue::MissingIngredient`], never silently ignored.
pub fn validate_stock(
    items: &[OrderItem],
    products: &[Product],
    ingredients: &[Ingredient],
) -> StockValidation {
    let requirements = aggregate_requirements(items, products);
    let mut issues = Vec::new();

    for (ingredient_id, (required, product_id)) in &requirements {
        if required <= &Decimal::ZERO {
            continue;
        }
        match ingredients.iter().find(|ing| &ing.id == ingredient_id) {
            None => issues.push(StockIssue::MissingIngredient {
                ingredient_id: ingredient_id.clone(),
                product_id: product_id.clone(),
            }),
            Some(ingredient) => {
                let available = to_decimal(ingredient.stock);
                if *required > available {
                    issues.push(StockIssue::Insufficient(StockShortage {
                        ingredient_id: ingredient_id.clone(),
                        ingredient_name: ingredient.name.clone(),
                        required: to_f64(round_qty(*required)),
                        available: ingredient.stock,
                    }));
                }
            }
        }
    }

    StockValidation {
        valid: issues.is_empty(),
        issues,
    }
}

/// Reduce stock for a sold batch.
///
/// Returns a new ingredient collection with stock reduced by the
/// aggregated requirement and one SALE movement (negative quantity)
/// per ingredient actually affected; zero requirements produce no
/// movement. Ingredients missing from the collection are skipped here
/// ([`validate_stock`] surfaces them).
pub fn destock(
    items: &[OrderItem],
    products: &[Product],
    ingredients: &[Ingredient],
    document_ref: &str,
    now: i64,
) -> DestockOutcome {
    apply_batch(
        items,
        products,
        ingredients,
        document_ref,
        now,
        MovementType::Sale,
    )
}

/// Reverse consumption for a batch (cancellation, quantity decrease).
///
/// Mirror image of [`destock`]: one RESTOCK movement (positive
/// quantity) per affected ingredient.
pub fn restock(
    items: &[OrderItem],
    products: &[Product],
    ingredients: &[Ingredient],
    document_ref: &str,
    now: i64,
) -> DestockOutcome {
    apply_batch(
        items,
        products,
        ingredients,
        document_ref,
        now,
        MovementType::Restock,
    )
}

fn apply_batch(
    items: &[OrderItem],
    products: &[Product],
    ingredients: &[Ingredient],
    document_ref: &str,
    now: i64,
    movement_type: MovementType,
) -> DestockOutcome {
    let sign = match movement_type {
        MovementType::Restock => Decimal::ONE,
        _ => -Decimal::ONE,
    };
    let requirements = aggregate_requirements(items, products);
    let mut updated = ingredients.to_vec();
    let mut movements = Vec::new();

    for (ingredient_id, (required, _)) in requirements {
        if required <= Decimal::ZERO {
            continue;
        }
        let Some(ingredient) = updated.iter_mut().find(|ing| ing.id == ingredient_id) else {
            continue;
        };
        let delta = round_qty(sign * required);
        ingredient.stock = to_f64(round_qty(to_decimal(ingredient.stock) + delta));
        movements.push(StockMovement::new(
            ingredient_id,
            to_f64(delta),
            movement_type,
            now,
            document_ref,
        ));
    }

    DestockOutcome {
        ingredients: updated,
        movements,
    }
}

/// Receive goods from a supplier: PURCHASE movement plus a
/// weighted-average cost update.
pub fn receive_stock(
    ingredient: &Ingredient,
    quantity: f64,
    unit_cost: f64,
    document_ref: &str,
    now: i64,
) -> AppResult<(Ingredient, StockMovement)> {
    money::validate_stock_quantity(quantity)?;
    money::require_finite(unit_cost, "unit_cost")?;
    validate_required_text(document_ref, "document_ref", MAX_REF_LEN)?;

    let mut updated = ingredient.clone();
    updated.average_cost = crate::inventory::costing::weighted_average_cost(
        ingredient.stock,
        ingredient.average_cost,
        quantity,
        unit_cost,
    );
    updated.stock = money::qty(ingredient.stock + quantity);

    let movement = StockMovement::new(
        ingredient.id.clone(),
        money::qty(quantity),
        MovementType::Purchase,
        now,
        document_ref,
    )
    .with_unit_cost(unit_cost);

    Ok((updated, movement))
}

/// Record spoilage / breakage: WASTE movement (negative quantity).
///
/// Unlike sales under a permissive policy, waste may never drive stock
/// negative: the counted loss cannot exceed what was on hand.
pub fn record_waste(
    ingredient: &Ingredient,
    quantity: f64,
    document_ref: &str,
    now: i64,
) -> AppResult<(Ingredient, StockMovement)> {
    money::validate_stock_quantity(quantity)?;
    validate_required_text(document_ref, "document_ref", MAX_REF_LEN)?;

    if quantity > ingredient.stock {
        return Err(AppError::with_message(
            ErrorCode::StockNegative,
            format!(
                "waste of {} {} exceeds stock {} for {}",
                quantity, ingredient.unit, ingredient.stock, ingredient.name
            ),
        )
        .with_detail("ingredient_id", ingredient.id.clone())
        .with_detail("quantity", quantity)
        .with_detail("stock", ingredient.stock));
    }

    let mut updated = ingredient.clone();
    updated.stock = money::qty(ingredient.stock - quantity);

    let movement = StockMovement::new(
        ingredient.id.clone(),
        -money::qty(quantity),
        MovementType::Waste,
        now,
        document_ref,
    );

    Ok((updated, movement))
}

/// Reconcile stock with a physical count: ADJUSTMENT movement carrying
/// the signed difference. A count matching current stock produces no
/// movement.
pub fn adjust_stock(
    ingredient: &Ingredient,
    counted_quantity: f64,
    document_ref: &str,
    now: i64,
) -> AppResult<(Ingredient, Option<StockMovement>)> {
    money::require_finite(counted_quantity, "counted_quantity")?;
    validate_required_text(document_ref, "document_ref", MAX_REF_LEN)?;
    if counted_quantity < 0.0 {
        return Err(AppError::with_message(
            ErrorCode::StockNegative,
            format!("counted quantity must not be negative, got {}", counted_quantity),
        )
        .with_detail("ingredient_id", ingredient.id.clone()));
    }

    let delta = money::qty(counted_quantity - ingredient.stock);
    if delta == 0.0 {
        return Ok((ingredient.clone(), None));
    }

    let mut updated = ingredient.clone();
    updated.stock = money::qty(counted_quantity);

    let movement = StockMovement::new(
        ingredient.id.clone(),
        delta,
        MovementType::Adjustment,
        now,
        document_ref,
    );

    Ok((updated, Some(movement)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::RecipeLine;

    fn burger() -> Product {
        Product {
            id: "burger".to_string(),
            name: "Burger".to_string(),
            category: "food".to_string(),
            price: 9.9,
            vat_rate: 10,
            recipe: vec![
                RecipeLine {
                    ingredient_id: "pain".to_string(),
                    quantity_per_unit: 1.0,
                },
                RecipeLine {
                    ingredient_id: "steak".to_string(),
                    quantity_per_unit: 0.15,
                },
            ],
            is_active: true,
        }
    }

    fn coffee() -> Product {
        Product {
            id: "coffee".to_string(),
            name: "Coffee".to_string(),
            category: "drinks".to_string(),
            price: 1.5,
            vat_rate: 10,
            recipe: vec![],
            is_active: true,
        }
    }

    fn stocks() -> Vec<Ingredient> {
        vec![
            Ingredient {
                id: "pain".to_string(),
                name: "Pain".to_string(),
                unit: "unit".to_string(),
                stock: 50.0,
                minimum_stock: 10.0,
                average_cost: 0.35,
                is_active: true,
            },
            Ingredient {
                id: "steak".to_string(),
                name: "Steak".to_string(),
                unit: "kg".to_string(),
                stock: 5.0,
                minimum_stock: 1.0,
                average_cost: 8.5,
                is_active: true,
            },
        ]
    }

    fn item(product_id: &str, quantity: i32) -> OrderItem {
        OrderItem {
            product_id: product_id.to_string(),
            name: product_id.to_string(),
            quantity,
            unit_price: 9.9,
            vat_rate: None,
            note: None,
            refunded: false,
        }
    }

    #[test]
    fn test_sale_scenario_two_burgers() {
        let products = vec![burger()];
        let ingredients = stocks();
        let items = vec![item("burger", 2)];

        let validation = validate_stock(&items, &products, &ingredients);
        assert!(validation.valid);

        let outcome = destock(&items, &products, &ingredients, "ord-1", 0);
        let pain = outcome.ingredients.iter().find(|i| i.id == "pain").unwrap();
        let steak = outcome.ingredients.iter().find(|i| i.id == "steak").unwrap();
        assert_eq!(pain.stock, 48.0);
        assert_eq!(steak.stock, 4.7);

        assert_eq!(outcome.movements.len(), 2);
        for movement in &outcome.movements {
            assert_eq!(movement.movement_type, MovementType::Sale);
            assert_eq!(movement.document_ref, "ord-1");
        }
        let steak_mv = outcome
            .movements
            .iter()
            .find(|m| m.ingredient_id == "steak")
            .unwrap();
        assert_eq!(steak_mv.quantity, -0.3);
        let pain_mv = outcome
            .movements
            .iter()
            .find(|m| m.ingredient_id == "pain")
            .unwrap();
        assert_eq!(pain_mv.quantity, -2.0);
    }

    #[test]
    fn test_blocked_sale_forty_burgers() {
        let products = vec![burger()];
        let ingredients = stocks();
        let items = vec![item("burger", 40)];

        let validation = validate_stock(&items, &products, &ingredients);
        assert!(!validation.valid);
        let shortage = validation
            .issues
            .iter()
            .find_map(|issue| match issue {
                StockIssue::Insufficient(s) => Some(s),
                _ => None,
            })
            .expect("steak shortage");
        assert_eq!(shortage.ingredient_id, "steak");
        assert_eq!(shortage.required, 6.0);
        assert_eq!(shortage.available, 5.0);
    }

    #[test]
    fn test_aggregation_two_lines_equal_one_line() {
        let products = vec![burger()];
        let ingredients = stocks();

        // 40 in one line vs 25 + 15 in two: same cumulative requirement,
        // same verdict
        let one = validate_stock(&[item("burger", 40)], &products, &ingredients);
        let two = validate_stock(
            &[item("burger", 25), item("burger", 15)],
            &products,
            &ingredients,
        );
        assert_eq!(one.valid, two.valid);
        assert_eq!(one.issues, two.issues);

        // And both pass where the split would individually pass too
        let ok_one = validate_stock(&[item("burger", 30)], &products, &ingredients);
        let ok_two = validate_stock(
            &[item("burger", 20), item("burger", 10)],
            &products,
            &ingredients,
        );
        assert!(ok_one.valid);
        assert!(ok_two.valid);
    }

    #[test]
    fn test_recipe_less_product_never_fails() {
        let products = vec![coffee()];
        let validation = validate_stock(&[item("coffee", 1000)], &products, &[]);
        assert!(validation.valid);
        let outcome = destock(&[item("coffee", 1000)], &products, &[], "ord-2", 0);
        assert!(outcome.movements.is_empty());
    }

    #[test]
    fn test_missing_ingredient_reported_not_ignored() {
        let mut product = burger();
        product.recipe.push(RecipeLine {
            ingredient_id: "ghost".to_string(),
            quantity_per_unit: 1.0,
        });
        let validation = validate_stock(&[item("burger", 1)], &[product], &stocks());
        assert!(!validation.valid);
        assert!(validation.issues.iter().any(|issue| matches!(
            issue,
            StockIssue::MissingIngredient { ingredient_id, .. } if ingredient_id == "ghost"
        )));
    }

    #[test]
    fn test_destock_restock_round_trip() {
        let products = vec![burger()];
        let ingredients = stocks();
        let items = vec![item("burger", 3)];

        let sold = destock(&items, &products, &ingredients, "ord-3", 0);
        let back = restock(&items, &products, &sold.ingredients, "ord-3", 1);

        for (before, after) in ingredients.iter().zip(back.ingredients.iter()) {
            assert_eq!(before.stock, after.stock, "{} diverged", before.id);
        }
        assert!(back.movements.iter().all(|m| m.quantity > 0.0
            && m.movement_type == MovementType::Restock));
    }

    #[test]
    fn test_destock_is_pure() {
        let products = vec![burger()];
        let ingredients = stocks();
        let items = vec![item("burger", 2)];

        let _ = destock(&items, &products, &ingredients, "ord-4", 0);
        // input snapshot untouched
        assert_eq!(ingredients[0].stock, 50.0);
        assert_eq!(ingredients[1].stock, 5.0);
    }

    #[test]
    fn test_refunded_lines_do_not_consume() {
        let products = vec![burger()];
        let mut refunded = item("burger", 2);
        refunded.refunded = true;
        let outcome = destock(&[refunded], &products, &stocks(), "ord-5", 0);
        assert!(outcome.movements.is_empty());
        assert_eq!(outcome.ingredients[0].stock, 50.0);
    }

    #[test]
    fn test_receive_stock_updates_average_cost() {
        let ingredient = stocks().remove(1); // steak: 5kg @ 8.50
        let (updated, movement) =
            receive_stock(&ingredient, 5.0, 10.5, "po-1", 0).unwrap();
        assert_eq!(updated.stock, 10.0);
        assert_eq!(updated.average_cost, 9.5);
        assert_eq!(movement.movement_type, MovementType::Purchase);
        assert_eq!(movement.quantity, 5.0);
        assert_eq!(movement.unit_cost, Some(10.5));
    }

    #[test]
    fn test_waste_cannot_go_negative() {
        let ingredient = stocks().remove(1);
        let err = record_waste(&ingredient, 6.0, "waste-1", 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::StockNegative);

        let (updated, movement) = record_waste(&ingredient, 0.5, "waste-2", 0).unwrap();
        assert_eq!(updated.stock, 4.5);
        assert_eq!(movement.quantity, -0.5);
        assert_eq!(movement.movement_type, MovementType::Waste);
    }

    #[test]
    fn test_adjustment_records_signed_difference() {
        let ingredient = stocks().remove(0); // pain: 50
        let (updated, movement) = adjust_stock(&ingredient, 47.0, "count-1", 0).unwrap();
        assert_eq!(updated.stock, 47.0);
        assert_eq!(movement.unwrap().quantity, -3.0);

        let (same, none) = adjust_stock(&ingredient, 50.0, "count-2", 0).unwrap();
        assert_eq!(same.stock, 50.0);
        assert!(none.is_none());
    }
}
