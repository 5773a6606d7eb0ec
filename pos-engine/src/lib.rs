//! Order & Inventory Consistency Engine
//!
//! The back-office core for small food-service businesses: keeps
//! ingredient stock consistent with what was actually sold, prepared,
//! cancelled, or purchased; reconciles divergent copies of the same
//! order set from offline-capable clients; and produces a gapless,
//! hash-chained sequence of financial documents.
//!
//! # Architecture
//!
//! ```text
//! OrderItemRequest ──► StockPolicy ──► Ledger (validate + destock)
//!                          │                    │
//!                          ▼                    ▼
//!                   Order actions         StockMovement log
//!                          │                    │
//!                     Cancellation ──► Restock + audit record
//!                          │
//!                   Completed orders ──► Invoice numbers ──► Z report chain
//! ```
//!
//! The engine is I/O-free: persistence, observability, wall-clock time
//! and digest computation enter through the collaborator ports in
//! [`ports`], wired together by [`engine::Engine`].

pub mod audit;
pub mod config;
pub mod engine;
pub mod inventory;
pub mod money;
pub mod orders;
pub mod ports;
pub mod pricing;
pub mod store;
pub mod time;
pub mod validation;

// Re-exports
pub use config::EngineConfig;
pub use engine::Engine;
pub use inventory::policy::StockPolicy;
pub use ports::{AlertSink, Clock, Digest, EngineAlert, EngineStore};
pub use store::MemoryStore;

// Re-export shared types for convenience
pub use shared::error::{AppError, AppResult, ErrorCode};
pub use shared::models::{
    Ingredient, InvoiceNumber, MovementType, PriceHistoryEntry, Product, RecipeLine,
    StockMovement, ZReport,
};
pub use shared::order::{KitchenStatus, Order, OrderItem, OrderItemRequest, OrderStatus};
