//! Offline reconciliation of divergent order sets
//!
//! When a device was offline, two snapshots of the same order set
//! diverge. The merge keeps, per order id, the whole winning
//! representation, never a field-by-field blend: higher `version`
//! wins, ties break on later `updated_at`. Orders present on only one
//! side are kept unconditionally.
//!
//! This is the reconciliation path for edits that could not be
//! serialized; live concurrent edits to one order are expected to be
//! rejected at the storage boundary via the optimistic version check
//! instead.

use shared::order::Order;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Merge two snapshots of the same order set.
///
/// Deterministic: the result depends only on the input sets, not on
/// their ordering, and is returned sorted by order id. When version
/// and `updated_at` both tie the two copies are required to be the
/// same mutation; the local one is kept.
pub fn merge_orders(local: &[Order], remote: &[Order]) -> Vec<Order> {
    let mut merged: BTreeMap<String, Order> = BTreeMap::new();

    for order in local {
        merged.insert(order.id.clone(), order.clone());
    }
    for order in remote {
        match merged.entry(order.id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(order.clone());
            }
            Entry::Occupied(mut slot) => {
                if wins_over(order, slot.get()) {
                    slot.insert(order.clone());
                }
            }
        }
    }

    merged.into_values().collect()
}

fn wins_over(challenger: &Order, incumbent: &Order) -> bool {
    challenger.version > incumbent.version
        || (challenger.version == incumbent.version
            && challenger.updated_at > incumbent.updated_at)
}
