//! AddItem action
//!
//! Appends a line to an order, snapshotting price and tax rate from
//! the product. Stock is validated and destocked for just the new
//! line; lines already on the order were destocked when they were
//! added.

use shared::order::{Order, OrderItem};
use shared::{AppError, AppResult};

use super::{ActionContext, MutationOutcome, ensure_not_cancelled};
use crate::inventory::{ledger, policy};
use crate::money;
use crate::validation::{MAX_NOTE_LEN, validate_optional_text};

/// AddItem action
#[derive(Debug, Clone)]
pub struct AddItemAction {
    pub product_id: String,
    pub quantity: i32,
    pub note: Option<String>,
}

impl AddItemAction {
    pub fn execute(&self, order: &Order, ctx: &ActionContext<'_>) -> AppResult<MutationOutcome> {
        // 1. Preconditions
        ensure_not_cancelled(order)?;
        money::validate_line_quantity(self.quantity)?;
        validate_optional_text(self.note.as_deref(), "note", MAX_NOTE_LEN)?;

        // 2. Resolve the product; price/tax are snapshotted here and
        //    immutable on the order thereafter
        let product = ctx
            .products
            .iter()
            .find(|p| p.id == self.product_id)
            .ok_or_else(|| AppError::not_found(format!("Product {}", self.product_id)))?;

        let item = OrderItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            quantity: self.quantity,
            unit_price: product.price,
            vat_rate: Some(product.vat_rate),
            note: self.note.clone(),
            refunded: false,
        };

        // 3. Policy check and destock for just the new line
        let batch = [item.clone()];
        let warnings = policy::evaluate(ctx.policy, &batch, ctx.products, ctx.ingredients)?;
        let stock = ledger::destock(&batch, ctx.products, ctx.ingredients, &order.id, ctx.now);

        // 4. New order version
        let mut order = order.clone();
        order.items.push(item);
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
