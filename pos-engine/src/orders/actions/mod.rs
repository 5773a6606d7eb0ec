//! Order mutation actions
//!
//! Each action validates its preconditions against an immutable order
//! snapshot and returns a [`MutationOutcome`] carrying the next order
//! version. A cancelled order is terminal: every action rejects it.

pub mod add_item;
pub mod cancel_order;
pub mod complete_order;
pub mod kitchen_status;
pub mod refund_items;
pub mod remove_item;
pub mod update_quantity;

pub use add_item::AddItemAction;
pub use cancel_order::CancelOrderAction;
pub use complete_order::CompleteOrderAction;
pub use kitchen_status::SetKitchenStatusAction;
pub use refund_items::RefundItemsAction;
pub use remove_item::RemoveItemAction;
pub use update_quantity::UpdateQuantityAction;

use shared::models::{Ingredient, Product, StockMovement};
use shared::order::Order;
use shared::{AppError, AppResult, ErrorCode};

use crate::inventory::StockIssue;
use crate::inventory::policy::StockPolicy;

/// Shared context passed to every action: the catalog and stock
/// snapshots the mutation runs against, the tenant's stock policy,
/// and the mutation timestamp.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub products: &'a [Product],
    pub ingredients: &'a [Ingredient],
    pub policy: StockPolicy,
    /// Unix millis
    pub now: i64,
}

/// Result of an order mutation: the new order version plus the ledger
/// side effects to persist with it.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    pub order: Order,
    /// Full ingredient collection after the mutation
    pub ingredients: Vec<Ingredient>,
    pub movements: Vec<StockMovement>,
    /// Policy warnings (empty unless policy is Warn and stock fell short)
    pub warnings: Vec<StockIssue>,
}

impl MutationOutcome {
    /// Outcome for mutations that do not touch stock
    pub(crate) fn stock_unchanged(order: Order, ctx: &ActionContext<'_>) -> Self {
        Self {
            order,
            ingredients: ctx.ingredients.to_vec(),
            movements: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Cancelled orders are terminal; no further item mutation is permitted.
pub(crate) fn ensure_not_cancelled(order: &Order) -> AppResult<()> {
    if order.is_cancelled() {
        return Err(AppError::with_message(
            ErrorCode::OrderAlreadyCancelled,
            format!("Order {} is cancelled", order.id),
        )
        .with_detail("order_id", order.id.clone()));
    }
    Ok(())
}

/// Resolve an item index; out-of-range is a usage error, never ignored.
pub(crate) fn ensure_item_index(order: &Order, index: usize) -> AppResult<()> {
    if index >= order.items.len() {
        return Err(AppError::with_message(
            ErrorCode::OrderItemNotFound,
            format!(
                "item index {} out of range (order {} has {} items)",
                index,
                order.id,
                order.items.len()
            ),
        )
        .with_detail("order_id", order.id.clone())
        .with_detail("index", index as i64));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use shared::models::{Ingredient, Product, RecipeLine};
    use shared::order::{Order, OrderItem};

    pub fn burger() -> Product {
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

    pub fn stocks() -> Vec<Ingredient> {
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

    pub fn order_with_burgers(quantity: i32) -> Order {
        let mut order = Order::new("ord-1", 1, 1_000);
        order.items.push(OrderItem {
            product_id: "burger".to_string(),
            name: "Burger".to_string(),
            quantity,
            unit_price: 9.9,
            vat_rate: Some(10),
            note: None,
            refunded: false,
        });
        order.total = crate::money::order_total(&order.items);
        order
    }
}
