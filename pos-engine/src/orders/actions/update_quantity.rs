//! UpdateQuantity action
//!
//! Changes a line's quantity. Only the delta moves through the ledger:
//! an increase validates and destocks the additional units, a decrease
//! restocks the difference. A target quantity of zero or less behaves
//! as a removal.

use shared::order::{Order, OrderItem};
use shared::{AppError, AppResult, ErrorCode};

use super::remove_item::RemoveItemAction;
use super::{ActionContext, MutationOutcome, ensure_item_index, ensure_not_cancelled};
use crate::inventory::{ledger, policy};
use crate::money;

/// UpdateQuantity action
#[derive(Debug, Clone)]
pub struct UpdateQuantityAction {
    pub item_index: usize,
    pub quantity: i32,
}

impl UpdateQuantityAction {
    pub fn execute(&self, order: &Order, ctx: &ActionContext<'_>) -> AppResult<MutationOutcome> {
        ensure_not_cancelled(order)?;
        ensure_item_index(order, self.item_index)?;

        // Zero or negative target: same as removing the line
        if self.quantity <= 0 {
            return RemoveItemAction {
                item_index: self.item_index,
            }
            .execute(order, ctx);
        }
        money::validate_line_quantity(self.quantity)?;

        let current = &order.items[self.item_index];
        if current.refunded {
            return Err(AppError::with_message(
                ErrorCode::ItemAlreadyRefunded,
                format!(
                    "item {} of order {} is refunded and cannot be changed",
                    self.item_index, order.id
                ),
            )
            .with_detail("order_id", order.id.clone()));
        }

        let delta = self.quantity - current.quantity;
        if delta == 0 {
            return Err(AppError::with_message(
                ErrorCode::InvalidRequest,
                format!(
                    "quantity of item {} is already {}",
                    self.item_index, self.quantity
                ),
            ));
        }

        // Only the delta is validated and moved, never the full new
        // quantity; the original units were already destocked
        let delta_line = OrderItem {
            quantity: delta.abs(),
            ..current.clone()
        };
        let batch = [delta_line];

        let (stock, warnings) = if delta > 0 {
            let warnings = policy::evaluate(ctx.policy, &batch, ctx.products, ctx.ingredients)?;
            (
                ledger::destock(&batch, ctx.products, ctx.ingredients, &order.id, ctx.now),
                warnings,
            )
        } else {
            (
                ledger::restock(&batch, ctx.products, ctx.ingredients, &order.id, ctx.now),
                Vec::new(),
            )
        };

        let mut order = order.clone();
        order.items[self.item_index].quantity = self.quantity;
        order.total = money::order_total(&order.items);
        order.touch(ctx.now);

        Ok(MutationOutcome {
            order,
            ingredients: stock.ingredients,
            movements: stock.movements,
            warnings,
        })
    }
}
