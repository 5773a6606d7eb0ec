//! Order mutation, reconciliation, and cancellation
//!
//! Single-order mutations live in [`actions`], one file per action.
//! Every action takes an immutable order plus an [`actions::ActionContext`]
//! and returns a [`actions::MutationOutcome`]: the new order version,
//! the updated ingredient collection, and the movements to append;
//! the caller persists all three in one transaction.
//!
//! [`merge`] reconciles divergent order sets from offline clients;
//! [`cancellation`] is the restock workflow for whole-order
//! cancellation.

pub mod actions;
pub mod cancellation;
pub mod merge;

// Re-exports
pub use actions::{
    ActionContext, AddItemAction, CancelOrderAction, CompleteOrderAction, MutationOutcome,
    RefundItemsAction, RemoveItemAction, SetKitchenStatusAction, UpdateQuantityAction,
};
pub use cancellation::{
    CancellationAudit, CancellationOutcome, CancellationRequest, RestockedLine,
    apply_cancellation, cancel_order_with_restock,
};
pub use merge::merge_orders;
