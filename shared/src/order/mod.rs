//! Order types
//!
//! The order is a versioned snapshot: every mutation produces a new
//! version (strictly increasing) with a fresh `updated_at`, which is
//! what the offline reconciliation merge keys on. Version and
//! `updated_at` semantics are owned by the order mutation component.

pub mod snapshot;
pub mod types;

// Re-exports
pub use snapshot::Order;
pub use types::{KitchenStatus, OrderItem, OrderItemRequest, OrderStatus};
