//! RemoveItem action
//!
//! Removes a line by index and restocks its ingredients, keeping the
//! ledger consistent with what will actually be prepared. Refunded
//! lines were already consumed and produce no restock.

use shared::order::Order;
use shared::{AppError, AppResult, ErrorCode};

use super::{ActionContext, MutationOutcome, ensure_item_index, ensure_not_cancelled};
use crate::inventory::ledger;
use crate::money;

/// RemoveItem action
#[derive(Debug, Clone)]
pub struct RemoveItemAction {
    pub item_index: usize,
}

impl RemoveItemAction {
    pub fn execute(&self, order: &Order, ctx: &ActionContext<'_>) -> AppResult<MutationOutcome> {
        ensure_not_cancelled(order)?;
        ensure_item_index(order, self.item_index)?;

        let mut order = order.clone();
        let removed = order.items.remove(self.item_index);
        if removed.refunded {
            return Err(AppError::with_message(
                ErrorCode::ItemAlreadyRefunded,
                format!(
                    "item {} of order {} is refunded and cannot be removed",
                    self.item_index, order.id
                ),
            )
            .with_detail("order_id", order.id.clone()));
        }

        let batch = [removed];
        let stock = ledger::restock(&batch, ctx.products, ctx.ingredients, &order.id, ctx.now);

        order.total = money::order_total(&order.items);
        order.touch(ctx.now);

        Ok(MutationOutcome {
            order,
            ingredients: stock.ingredients,
            movements: stock.movements,
            warnings: Vec::new(),
        })
    }
}
