//! CancelOrder action
//!
//! The simple cancellation path for orders that were never paid.
//! Completed orders must go through the cancellation & restock
//! workflow (or a partial refund); this action only transitions the
//! order itself; restock is the workflow's concern.

use shared::order::{Order, OrderStatus};
use shared::{AppError, AppResult, ErrorCode};

use super::{ActionContext, MutationOutcome, ensure_not_cancelled};

/// CancelOrder action
#[derive(Debug, Clone, Default)]
pub struct CancelOrderAction;

impl CancelOrderAction {
    pub fn execute(&self, order: &Order, ctx: &ActionContext<'_>) -> AppResult<MutationOutcome> {
        ensure_not_cancelled(order)?;
        if order.is_completed() {
            return Err(AppError::with_message(
                ErrorCode::OrderAlreadyCompleted,
                format!(
                    "Order {} is completed; use the restock workflow or a partial refund",
                    order.id
                ),
            )
            .with_detail("order_id", order.id.clone()));
        }

        let mut order = order.clone();
        order.status = OrderStatus::Cancelled;
        order.touch(ctx.now);

        Ok(MutationOutcome::stock_unchanged(order, ctx))
    }
}
