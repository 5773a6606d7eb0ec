//! Cancellation & restock workflow
//!
//! Orchestrates whole-order cancellation: eligibility checks, restock
//! computation, and the audit record. The workflow does NOT flip
//! `order.status`; the caller transitions the order once the restock
//! is committed, so the state change stays atomic with the stock write
//! in whatever transaction the storage collaborator provides.

use serde::{Deserialize, Serialize};
use shared::models::{Ingredient, Product, StockMovement};
use shared::order::{Order, OrderItem, OrderStatus};
use shared::util::snowflake_id;
use shared::{AppError, AppResult, ErrorCode};

use crate::config::EngineConfig;
use crate::inventory::ledger;
use crate::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};

/// Who cancels and why
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationRequest {
    pub reason: String,
    pub actor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_name: Option<String>,
}

/// One restocked ingredient line in the audit record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestockedLine {
    pub ingredient_id: String,
    pub quantity: f64,
}

/// Immutable audit record of a cancellation: who, when, why, and what
/// was restocked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationAudit {
    pub id: i64,
    pub order_id: String,
    pub display_number: i64,
    pub actor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_name: Option<String>,
    pub reason: String,
    /// Unix millis
    pub cancelled_at: i64,
    pub restocked: Vec<RestockedLine>,
}

/// Result of the workflow: updated stock, the restock movements, and
/// the audit record, all to be committed together.
#[derive(Debug, Clone)]
pub struct CancellationOutcome {
    pub ingredients: Vec<Ingredient>,
    pub movements: Vec<StockMovement>,
    pub audit: CancellationAudit,
}

/// Run the cancellation & restock workflow for an order.
pub fn cancel_order_with_restock(
    order: &Order,
    request: &CancellationRequest,
    products: &[Product],
    ingredients: &[Ingredient],
    config: &EngineConfig,
    now: i64,
) -> AppResult<CancellationOutcome> {
    // 1. Terminal state check
    if order.is_cancelled() {
        return Err(AppError::with_message(
            ErrorCode::OrderAlreadyCancelled,
            format!("Order {} is already cancelled", order.id),
        )
        .with_detail("order_id", order.id.clone()));
    }

    // 2. Cancellation window
    let elapsed = now - order.created_at;
    let window = config.max_cancellation_delay_millis();
    if elapsed > window {
        return Err(AppError::with_message(
            ErrorCode::OrderCannotCancel,
            format!(
                "Order {} is {} min old, window is {} min",
                order.id,
                elapsed / 60_000,
                config.max_cancellation_delay_minutes
            ),
        )
        .with_detail("order_id", order.id.clone())
        .with_detail("elapsed_minutes", elapsed / 60_000)
        .with_detail("window_minutes", config.max_cancellation_delay_minutes));
    }

    // 3. Reason
    if config.require_cancellation_reason {
        validate_required_text(&request.reason, "reason", MAX_NOTE_LEN)?;
    } else {
        validate_optional_text(Some(&request.reason), "reason", MAX_NOTE_LEN)?;
    }
    validate_required_text(&request.actor_id, "actor_id", MAX_NAME_LEN)?;

    // 4. Restock the cumulative recipe quantities across all lines
    let active: Vec<OrderItem> = order.active_items().cloned().collect();
    let stock = ledger::restock(&active, products, ingredients, &order.id, now);

    let restocked = stock
        .movements
        .iter()
        .map(|movement| RestockedLine {
            ingredient_id: movement.ingredient_id.clone(),
            quantity: movement.quantity,
        })
        .collect();

    let audit = CancellationAudit {
        id: snowflake_id(),
        order_id: order.id.clone(),
        display_number: order.display_number,
        actor_id: request.actor_id.clone(),
        actor_name: request.actor_name.clone(),
        reason: request.reason.clone(),
        cancelled_at: now,
        restocked,
    };

    tracing::info!(
        order_id = %order.id,
        actor = %request.actor_id,
        restocked = audit.restocked.len(),
        "order cancellation restock computed"
    );

    Ok(CancellationOutcome {
        ingredients: stock.ingredients,
        movements: stock.movements,
        audit,
    })
}

/// Transition the order after a successful workflow run.
///
/// Kept here so version semantics stay inside the order mutation
/// component; the simple [`CancelOrderAction`](crate::orders::actions::CancelOrderAction)
/// remains the path for orders that were never paid.
pub fn apply_cancellation(order: &Order, now: i64) -> Order {
    let mut order = order.clone();
    order.status = OrderStatus::Cancelled;
    order.touch(now);
    order
}
