//! Price change guard & history
//!
//! Prices on placed orders are immutable snapshots, so the only
//! integrity risk is a change that would retroactively misstate an
//! already-issued document. The guard rejects those; every accepted
//! change lands in the append-only history.

pub mod guard;
pub mod history;

// Re-exports
pub use guard::{PriceChangeOutcome, PriceChangeRequest, PriceSwingWarning, change_price};
pub use history::{history_for, price_at};
