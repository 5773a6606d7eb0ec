//! Order snapshot - the versioned order document
//!
//! Concurrent or offline-capable clients may hold divergent copies of
//! the same order; `version` (strictly increasing) and `updated_at`
//! decide the winner during reconciliation. Live concurrent edits are
//! expected to be rejected at the storage boundary via an optimistic
//! version precondition instead.

use super::types::{KitchenStatus, OrderItem, OrderStatus};
use serde::{Deserialize, Serialize};

/// Order document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Order ID (assigned by the engine)
    pub id: String,
    /// Monotonically increasing human-facing number
    pub display_number: i64,
    pub items: Vec<OrderItem>,
    /// Always equals the sum of line totals over non-refunded items
    pub total: f64,
    pub status: OrderStatus,
    /// Independent preparation axis
    pub kitchen_status: KitchenStatus,
    /// Payment method snapshot, set on completion ("cash", "card", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    /// Invoice number assigned on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    /// Operator who created the order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_name: Option<String>,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,
    /// Completion timestamp (Unix millis), set once on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    /// Last mutation timestamp (Unix millis)
    pub updated_at: i64,
    /// Starts at 1, incremented on every mutation, strictly increasing.
    /// Only the order mutation component constructs new versions.
    pub version: u64,
}

impl Order {
    /// Create a fresh order (version 1, empty, pending)
    pub fn new(id: impl Into<String>, display_number: i64, now: i64) -> Self {
        Self {
            id: id.into(),
            display_number,
            items: Vec::new(),
            total: 0.0,
            status: OrderStatus::Pending,
            kitchen_status: KitchenStatus::Queued,
            payment_method: None,
            invoice_number: None,
            operator_id: None,
            operator_name: None,
            created_at: now,
            completed_at: None,
            updated_at: now,
            version: 1,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
    }

    /// Non-refunded items
    pub fn active_items(&self) -> impl Iterator<Item = &OrderItem> {
        self.items.iter().filter(|item| !item.refunded)
    }

    /// Record a mutation: bump version, refresh `updated_at`.
    ///
    /// Reserved for the order mutation component; callers elsewhere
    /// must go through its actions.
    pub fn touch(&mut self, now: i64) {
        self.version += 1;
        self.updated_at = now;
    }
}
