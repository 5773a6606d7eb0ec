//! Error categories for classification and routing

use serde::{Deserialize, Serialize};

/// Classification of errors by domain
///
/// Categories are derived from the numeric code band, so every
/// [`ErrorCode`](super::ErrorCode) maps to exactly one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// 0xxx: validation, lookup, and format errors
    General,
    /// 2xxx: stock and inventory errors
    Stock,
    /// 4xxx: order lifecycle errors
    Order,
    /// 6xxx: price change errors
    Price,
    /// 7xxx: audit trail integrity errors
    Audit,
    /// 9xxx: internal and collaborator errors
    System,
}

impl ErrorCategory {
    /// Derive the category from a numeric error code
    pub fn from_code(code: u16) -> Self {
        match code {
            2000..=2999 => Self::Stock,
            4000..=4999 => Self::Order,
            6000..=6999 => Self::Price,
            7000..=7999 => Self::Audit,
            9000..=9999 => Self::System,
            _ => Self::General,
        }
    }

    /// Whether errors in this category should be logged at error level
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_category_bands() {
        assert_eq!(ErrorCategory::from_code(2), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Stock);
        assert_eq!(ErrorCategory::from_code(4004), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(6003), ErrorCategory::Price);
        assert_eq!(ErrorCategory::from_code(7003), ErrorCategory::Audit);
        assert_eq!(ErrorCategory::from_code(9002), ErrorCategory::System);
    }

    #[test]
    fn test_code_category_accessor() {
        assert_eq!(ErrorCode::StockInsufficient.category(), ErrorCategory::Stock);
        assert!(ErrorCode::InternalError.category().is_system());
        assert!(!ErrorCode::OrderNotFound.category().is_system());
    }
}
