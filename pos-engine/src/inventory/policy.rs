//! Stock policy evaluator
//!
//! Wraps stock validation with a configurable disposition. The
//! insufficiency set is computed once, identically for every policy;
//! policy only decides whether that set becomes a blocking error, a
//! returned warning, or is discarded.

use serde::{Deserialize, Serialize};
use shared::models::{Ingredient, Product};
use shared::order::OrderItem;
use shared::{AppError, AppResult};

use super::ledger::{StockIssue, validate_stock};

/// Disposition of insufficient-stock sales
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockPolicy {
    /// Insufficient stock is a hard error; the order must not proceed
    Block,
    /// The order proceeds, but the shortfall is reported to the caller
    /// and raised as an observability alert
    #[default]
    Warn,
    /// The order proceeds with no signal
    Silent,
}

/// Evaluate a batch under the configured policy.
///
/// Returns the issues to surface as warnings (empty under `Silent`,
/// or when stock suffices). Under `Block` a non-empty issue set is
/// returned as an error instead.
pub fn evaluate(
    policy: StockPolicy,
    items: &[OrderItem],
    products: &[Product],
    ingredients: &[Ingredient],
) -> AppResult<Vec<StockIssue>> {
    let validation = validate_stock(items, products, ingredients);
    if validation.valid {
        return Ok(Vec::new());
    }

    match policy {
        StockPolicy::Block => Err(issues_to_error(validation.issues)),
        StockPolicy::Warn => Ok(validation.issues),
        StockPolicy::Silent => Ok(Vec::new()),
    }
}

/// Collapse an issue set into one blocking error. The code comes from
/// the most severe issue (insufficiency outranks a broken reference),
/// the details carry the full set.
fn issues_to_error(issues: Vec<StockIssue>) -> AppError {
    let code = issues
        .iter()
        .find(|issue| matches!(issue, StockIssue::Insufficient(_)))
        .map(|issue| issue.code())
        .unwrap_or_else(|| issues[0].code());

    let message = issues
        .iter()
        .map(StockIssue::describe)
        .collect::<Vec<_>>()
        .join("; ");

    AppError::with_message(code, message)
        .with_detail("issues", serde_json::to_value(&issues).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::RecipeLine;
    use shared::ErrorCode;

    fn product() -> Product {
        Product {
            id: "burger".to_string(),
            name: "Burger".to_string(),
            category: "food".to_string(),
            price: 9.9,
            vat_rate: 10,
            recipe: vec![RecipeLine {
                ingredient_id: "steak".to_string(),
                quantity_per_unit: 0.15,
            }],
            is_active: true,
        }
    }

    fn steak(stock: f64) -> Ingredient {
        Ingredient {
            id: "steak".to_string(),
            name: "Steak".to_string(),
            unit: "kg".to_string(),
            stock,
            minimum_stock: 1.0,
            average_cost: 8.5,
            is_active: true,
        }
    }

    fn item(quantity: i32) -> OrderItem {
        OrderItem {
            product_id: "burger".to_string(),
            name: "Burger".to_string(),
            quantity,
            unit_price: 9.9,
            vat_rate: None,
            note: None,
            refunded: false,
        }
    }

    #[test]
    fn test_sufficient_stock_passes_under_all_policies() {
        for policy in [StockPolicy::Block, StockPolicy::Warn, StockPolicy::Silent] {
            let issues =
                evaluate(policy, &[item(2)], &[product()], &[steak(5.0)]).unwrap();
            assert!(issues.is_empty());
        }
    }

    #[test]
    fn test_block_rejects_with_ingredient_named() {
        let err = evaluate(StockPolicy::Block, &[item(40)], &[product()], &[steak(5.0)])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::StockInsufficient);
        assert!(err.message.contains("Steak"));
        assert!(err.details.is_some());
    }

    #[test]
    fn test_warn_returns_the_same_set_block_rejects() {
        let warnings =
            evaluate(StockPolicy::Warn, &[item(40)], &[product()], &[steak(5.0)]).unwrap();
        assert_eq!(warnings.len(), 1);
        match &warnings[0] {
            StockIssue::Insufficient(shortage) => {
                assert_eq!(shortage.ingredient_id, "steak");
                assert_eq!(shortage.required, 6.0);
                assert_eq!(shortage.available, 5.0);
            }
            other => panic!("unexpected issue: {:?}", other),
        }
    }

    #[test]
    fn test_silent_discards_the_set() {
        let warnings =
            evaluate(StockPolicy::Silent, &[item(40)], &[product()], &[steak(5.0)]).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_default_policy_is_warn() {
        assert_eq!(StockPolicy::default(), StockPolicy::Warn);
    }

    #[test]
    fn test_missing_ingredient_blocks_under_block() {
        let err = evaluate(StockPolicy::Block, &[item(1)], &[product()], &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingIngredient);
    }
}
