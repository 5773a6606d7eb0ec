//! Stock ledger, recipe costing, and the stock policy evaluator
//!
//! Everything here is pure: functions accept immutable snapshots and
//! return new snapshots plus the movements to append. The ledger is
//! the only component that computes stock mutations; callers persist
//! the returned ingredients and movements in one transaction.

pub mod costing;
pub mod ledger;
pub mod policy;

// Re-exports
pub use costing::{product_cost, weighted_average_cost};
pub use ledger::{
    DestockOutcome, StockIssue, StockShortage, StockValidation, adjust_stock, destock,
    receive_stock, record_waste, restock, validate_stock,
};
pub use policy::{StockPolicy, evaluate};
