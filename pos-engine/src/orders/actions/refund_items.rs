//! RefundItems action
//!
//! Partial refund on a completed order: the selected lines are marked
//! refunded and the total drops by their value. Lines are retained for
//! audit, never deleted, and no stock returns: the goods were served.

use shared::order::Order;
use shared::{AppError, AppResult, ErrorCode};

use super::{ActionContext, MutationOutcome, ensure_item_index, ensure_not_cancelled};
use crate::money;

/// RefundItems action
#[derive(Debug, Clone)]
pub struct RefundItemsAction {
    pub item_indices: Vec<usize>,
}

impl RefundItemsAction {
    pub fn execute(&self, order: &Order, ctx: &ActionContext<'_>) -> AppResult<MutationOutcome> {
        ensure_not_cancelled(order)?;
        if !order.is_completed() {
            return Err(AppError::with_message(
                ErrorCode::OrderNotCompleted,
                format!("Order {} is not completed; refunds apply to paid orders", order.id),
            )
            .with_detail("order_id", order.id.clone()));
        }
        if self.item_indices.is_empty() {
            return Err(AppError::validation("no items selected for refund"));
        }

        for &index in &self.item_indices {
            ensure_item_index(order, index)?;
            if order.items[index].refunded {
                return Err(AppError::with_message(
                    ErrorCode::ItemAlreadyRefunded,
                    format!("item {} of order {} is already refunded", index, order.id),
                )
                .with_detail("order_id", order.id.clone())
                .with_detail("index", index as i64));
            }
        }

        let mut order = order.clone();
        for &index in &self.item_indices {
            order.items[index].refunded = true;
        }
        order.total = money::order_total(&order.items);
        order.touch(ctx.now);

        Ok(MutationOutcome::stock_unchanged(order, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::StockPolicy;
    use crate::orders::actions::test_support::{burger, order_with_burgers, stocks};
    use shared::order::{OrderItem, OrderStatus};

    fn ctx<'a>(
        products: &'a [shared::models::Product],
        ingredients: &'a [shared::models::Ingredient],
    ) -> ActionContext<'a> {
        ActionContext {
            products,
            ingredients,
            policy: StockPolicy::Warn,
            now: 9_000,
        }
    }

    fn completed_order() -> Order {
        let mut order = order_with_burgers(2);
        order.items.push(OrderItem {
            product_id: "coffee".to_string(),
            name: "Coffee".to_string(),
            quantity: 1,
            unit_price: 1.5,
            vat_rate: Some(10),
            note: None,
            refunded: false,
        });
        order.total = crate::money::order_total(&order.items);
        order.status = OrderStatus::Completed;
        order
    }

    #[test]
    fn test_refund_reduces_total_and_keeps_lines() {
        let products = vec![burger()];
        let ingredients = stocks();
        let order = completed_order();
        assert_eq!(order.total, 21.3);

        let action = RefundItemsAction {
            item_indices: vec![1],
        };
        let outcome = action.execute(&order, &ctx(&products, &ingredients)).unwrap();

        assert_eq!(outcome.order.items.len(), 2);
        assert!(outcome.order.items[1].refunded);
        assert_eq!(outcome.order.total, 19.8);
        assert_eq!(outcome.order.version, order.version + 1);
        assert!(outcome.movements.is_empty());
    }

    #[test]
    fn test_refund_on_pending_order_fails() {
        let products = vec![burger()];
        let ingredients = stocks();
        let order = order_with_burgers(2);

        let action = RefundItemsAction {
            item_indices: vec![0],
        };
        let err = action
            .execute(&order, &ctx(&products, &ingredients))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotCompleted);
    }

    #[test]
    fn test_double_refund_fails() {
        let products = vec![burger()];
        let ingredients = stocks();
        let mut order = completed_order();
        order.items[1].refunded = true;
        order.total = crate::money::order_total(&order.items);

        let action = RefundItemsAction {
            item_indices: vec![1],
        };
        let err = action
            .execute(&order, &ctx(&products, &ingredients))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ItemAlreadyRefunded);
    }

    #[test]
    fn test_refund_out_of_range_index_fails() {
        let products = vec![burger()];
        let ingredients = stocks();
        let order = completed_order();

        let action = RefundItemsAction {
            item_indices: vec![7],
        };
        let err = action
            .execute(&order, &ctx(&products, &ingredients))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderItemNotFound);
    }
}
