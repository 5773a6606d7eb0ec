//! CompleteOrder action
//!
//! Transitions a pending order to completed, snapshotting the payment
//! method and the invoice number the audit trail assigned. An empty
//! order cannot be completed.

use shared::order::{Order, OrderStatus};
use shared::{AppError, AppResult, ErrorCode};

use super::{ActionContext, MutationOutcome, ensure_not_cancelled};
use crate::validation::{MAX_NAME_LEN, validate_required_text};

/// CompleteOrder action
#[derive(Debug, Clone)]
pub struct CompleteOrderAction {
    /// Payment method snapshot ("cash", "card", ...)
    pub payment_method: String,
    /// Invoice number assigned by the audit trail (formatted)
    pub invoice_number: String,
}

impl CompleteOrderAction {
    pub fn execute(&self, order: &Order, ctx: &ActionContext<'_>) -> AppResult<MutationOutcome> {
        ensure_not_cancelled(order)?;
        if order.is_completed() {
            return Err(AppError::with_message(
                ErrorCode::OrderAlreadyCompleted,
                format!("Order {} is already completed", order.id),
            )
            .with_detail("order_id", order.id.clone()));
        }
        if order.active_items().count() == 0 {
            return Err(AppError::validation(format!(
                "Order {} has no items to complete",
                order.id
            )));
        }
        validate_required_text(&self.payment_method, "payment_method", MAX_NAME_LEN)?;
        validate_required_text(&self.invoice_number, "invoice_number", MAX_NAME_LEN)?;

        let mut order = order.clone();
        order.status = OrderStatus::Completed;
        order.payment_method = Some(self.payment_method.clone());
        order.invoice_number = Some(self.invoice_number.clone());
        order.completed_at = Some(ctx.now);
        order.touch(ctx.now);

        Ok(MutationOutcome::stock_unchanged(order, ctx))
    }
}
