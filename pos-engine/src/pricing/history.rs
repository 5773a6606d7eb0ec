//! Price history queries
//!
//! History is append-only; these are read-side helpers over the entry
//! log.

use shared::models::{PriceHistoryEntry, Product};

/// Entries for one product, oldest first (ties break on entry id so
/// the order is stable).
pub fn history_for<'a>(
    entries: &'a [PriceHistoryEntry],
    product_id: &str,
) -> Vec<&'a PriceHistoryEntry> {
    let mut history: Vec<&PriceHistoryEntry> = entries
        .iter()
        .filter(|entry| entry.product_id == product_id)
        .collect();
    history.sort_by_key(|entry| (entry.changed_at, entry.id));
    history
}

/// Price of a product as of a point in time: the latest entry with
/// `changed_at <= at`, else the product's current price.
pub fn price_at(entries: &[PriceHistoryEntry], product: &Product, at: i64) -> f64 {
    history_for(entries, &product.id)
        .into_iter()
        .rev()
        .find(|entry| entry.changed_at <= at)
        .map(|entry| entry.new_price)
        .unwrap_or(product.price)
}
