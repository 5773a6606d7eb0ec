//! Price History Model
//!
//! Append-only audit record of product price changes. Entries are
//! never edited or deleted, only appended and queried.

use crate::util::snowflake_id;
use serde::{Deserialize, Serialize};

/// One accepted price change
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceHistoryEntry {
    pub id: i64,
    pub product_id: String,
    pub old_price: f64,
    pub new_price: f64,
    /// Unix millis
    pub changed_at: i64,
    /// Who made the change
    pub actor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Set when a completed sale existed inside the protected window
    /// but the change was still accepted (guard disabled by config)
    #[serde(default)]
    pub is_retroactive: bool,
}

impl PriceHistoryEntry {
    pub fn new(
        product_id: impl Into<String>,
        old_price: f64,
        new_price: f64,
        changed_at: i64,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            id: snowflake_id(),
            product_id: product_id.into(),
            old_price,
            new_price,
            changed_at,
            actor: actor.into(),
            reason: None,
            is_retroactive: false,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn retroactive(mut self) -> Self {
        self.is_retroactive = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_builders() {
        let entry = PriceHistoryEntry::new("p1", 9.9, 11.5, 1_700_000_000_000, "ana")
            .with_reason("supplier cost increase")
            .retroactive();
        assert_eq!(entry.product_id, "p1");
        assert_eq!(entry.reason.as_deref(), Some("supplier cost increase"));
        assert!(entry.is_retroactive);
    }

    #[test]
    fn test_defaults() {
        let entry = PriceHistoryEntry::new("p1", 9.9, 8.0, 0, "ana");
        assert!(!entry.is_retroactive);
        assert!(entry.reason.is_none());
    }
}
