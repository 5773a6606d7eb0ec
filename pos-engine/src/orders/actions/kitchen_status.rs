//! SetKitchenStatus action
//!
//! The kitchen axis moves independently of the financial lifecycle,
//! but it is still an order mutation and versions like one.

use shared::order::{KitchenStatus, Order};
use shared::AppResult;

use super::{ActionContext, MutationOutcome, ensure_not_cancelled};

/// SetKitchenStatus action
#[derive(Debug, Clone)]
pub struct SetKitchenStatusAction {
    pub kitchen_status: KitchenStatus,
}

impl SetKitchenStatusAction {
    pub fn execute(&self, order: &Order, ctx: &ActionContext<'_>) -> AppResult<MutationOutcome> {
        ensure_not_cancelled(order)?;

        let mut order = order.clone();
        order.kitchen_status = self.kitchen_status;
        order.touch(ctx.now);

        Ok(MutationOutcome::stock_unchanged(order, ctx))
    }
}
