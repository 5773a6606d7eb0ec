//! Unified error codes for the Gamba engine
//!
//! This module defines all error codes used by the consistency engine.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 2xxx: Stock / inventory errors
//! - 4xxx: Order errors
//! - 6xxx: Price errors
//! - 7xxx: Audit trail errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::ErrorCategory;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Duplicate entry (would violate uniqueness)
    DuplicateEntry = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing or blank
    RequiredField = 6,
    /// Value out of range
    ValueOutOfRange = 7,
    /// Invalid date or date format
    InvalidDate = 8,

    // ==================== 2xxx: Stock ====================
    /// Insufficient stock to satisfy the requested quantity
    StockInsufficient = 2001,
    /// Operation would drive an ingredient's stock below zero
    StockNegative = 2002,
    /// Recipe references an ingredient absent from the collection
    MissingIngredient = 2003,
    /// Product has no recipe where one is required
    MissingRecipe = 2004,
    /// Quantity is zero, negative, or otherwise unusable
    InvalidQuantity = 2005,
    /// Stock at or below the minimum threshold (alert context)
    LowStock = 2006,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been cancelled (terminal state)
    OrderAlreadyCancelled = 4002,
    /// Order has already been completed
    OrderAlreadyCompleted = 4003,
    /// Cancellation window has expired
    OrderCannotCancel = 4004,
    /// Order item index out of range
    OrderItemNotFound = 4005,
    /// Operation requires a completed order
    OrderNotCompleted = 4006,
    /// Optimistic version precondition failed at the storage boundary
    OrderVersionConflict = 4007,
    /// Item has already been refunded
    ItemAlreadyRefunded = 4008,

    // ==================== 6xxx: Price ====================
    /// Price is zero, negative, or not finite
    InvalidPrice = 6001,
    /// New price equals the current price (no-op change)
    PriceUnchanged = 6002,
    /// Change would retroactively distort recently issued documents
    PriceHistoryConflict = 6003,
    /// Relative price change exceeds the warning threshold (alert context)
    PriceSwingLarge = 6004,

    // ==================== 7xxx: Audit ====================
    /// Invoice sequence has a gap
    InvoiceSequenceGap = 7001,
    /// Duplicate invoice number
    InvoiceDuplicate = 7002,
    /// Report hash chain is broken
    ChainBroken = 7003,
    /// Report sequence number out of order
    ReportOutOfOrder = 7004,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Storage collaborator error
    StorageError = 9002,
    /// Digest computation failed
    DigestError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }

    /// Default technical message (for logs)
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::DuplicateEntry => "Duplicate entry",
            Self::InvalidRequest => "Invalid request",
            Self::RequiredField => "Required field missing",
            Self::ValueOutOfRange => "Value out of range",
            Self::InvalidDate => "Invalid date",

            Self::StockInsufficient => "Insufficient stock",
            Self::StockNegative => "Stock would become negative",
            Self::MissingIngredient => "Recipe references unknown ingredient",
            Self::MissingRecipe => "Product has no recipe",
            Self::InvalidQuantity => "Invalid quantity",
            Self::LowStock => "Stock below minimum threshold",

            Self::OrderNotFound => "Order not found",
            Self::OrderAlreadyCancelled => "Order already cancelled",
            Self::OrderAlreadyCompleted => "Order already completed",
            Self::OrderCannotCancel => "Cancellation window expired",
            Self::OrderItemNotFound => "Order item not found",
            Self::OrderNotCompleted => "Order is not completed",
            Self::OrderVersionConflict => "Order version conflict",
            Self::ItemAlreadyRefunded => "Item already refunded",

            Self::InvalidPrice => "Invalid price",
            Self::PriceUnchanged => "Price unchanged",
            Self::PriceHistoryConflict => "Retroactive price change rejected",
            Self::PriceSwingLarge => "Large price swing",

            Self::InvoiceSequenceGap => "Invoice sequence gap",
            Self::InvoiceDuplicate => "Duplicate invoice number",
            Self::ChainBroken => "Report hash chain broken",
            Self::ReportOutOfOrder => "Report sequence out of order",

            Self::InternalError => "Internal error",
            Self::StorageError => "Storage error",
            Self::DigestError => "Digest computation failed",
        }
    }

    /// User-facing message
    ///
    /// Every rejection must be resolvable by the end user without
    /// engineering involvement; raw internal messages never cross the
    /// engine boundary.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Success => "OK",
            Self::Unknown | Self::InternalError | Self::StorageError | Self::DigestError => {
                "Something went wrong. Please try again or contact support."
            }
            Self::ValidationFailed | Self::InvalidRequest => {
                "The request could not be processed. Please check the entered data."
            }
            Self::NotFound => "The requested record could not be found.",
            Self::DuplicateEntry => "This record already exists.",
            Self::RequiredField => "A required field is missing. Please fill it in.",
            Self::ValueOutOfRange => "A value is outside the allowed range.",
            Self::InvalidDate => "The date is invalid. Use the YYYY-MM-DD format.",

            Self::StockInsufficient => {
                "Not enough stock for this sale. Check the listed ingredients."
            }
            Self::StockNegative => "This operation would leave negative stock and was rejected.",
            Self::MissingIngredient => {
                "A recipe references an ingredient that no longer exists. Review the recipe."
            }
            Self::MissingRecipe => "This product has no recipe configured.",
            Self::InvalidQuantity => "The quantity must be greater than zero.",
            Self::LowStock => "Stock is running low for this ingredient.",

            Self::OrderNotFound => "The order could not be found.",
            Self::OrderAlreadyCancelled => "This order was already cancelled.",
            Self::OrderAlreadyCompleted => "This order was already completed.",
            Self::OrderCannotCancel => {
                "The cancellation window has expired. Contact support if needed."
            }
            Self::OrderItemNotFound => "The selected line does not exist on this order.",
            Self::OrderNotCompleted => "Only completed orders can be refunded.",
            Self::OrderVersionConflict => {
                "The order was modified elsewhere. Reload and try again."
            }
            Self::ItemAlreadyRefunded => "This line was already refunded.",

            Self::InvalidPrice => "The price must be greater than zero.",
            Self::PriceUnchanged => "The new price equals the current price.",
            Self::PriceHistoryConflict => {
                "This product was sold recently; the price cannot be changed yet."
            }
            Self::PriceSwingLarge => "This is a large price change. Please double-check it.",

            Self::InvoiceSequenceGap => "The invoice sequence has a gap. Contact support.",
            Self::InvoiceDuplicate => "A duplicate invoice number was detected. Contact support.",
            Self::ChainBroken => "The report chain failed verification. Contact support.",
            Self::ReportOutOfOrder => "Report numbering is out of order. Contact support.",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code.code()
    }
}

/// Error when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::DuplicateEntry,
            5 => Self::InvalidRequest,
            6 => Self::RequiredField,
            7 => Self::ValueOutOfRange,
            8 => Self::InvalidDate,

            2001 => Self::StockInsufficient,
            2002 => Self::StockNegative,
            2003 => Self::MissingIngredient,
            2004 => Self::MissingRecipe,
            2005 => Self::InvalidQuantity,
            2006 => Self::LowStock,

            4001 => Self::OrderNotFound,
            4002 => Self::OrderAlreadyCancelled,
            4003 => Self::OrderAlreadyCompleted,
            4004 => Self::OrderCannotCancel,
            4005 => Self::OrderItemNotFound,
            4006 => Self::OrderNotCompleted,
            4007 => Self::OrderVersionConflict,
            4008 => Self::ItemAlreadyRefunded,

            6001 => Self::InvalidPrice,
            6002 => Self::PriceUnchanged,
            6003 => Self::PriceHistoryConflict,
            6004 => Self::PriceSwingLarge,

            7001 => Self::InvoiceSequenceGap,
            7002 => Self::InvoiceDuplicate,
            7003 => Self::ChainBroken,
            7004 => Self::ReportOutOfOrder,

            9001 => Self::InternalError,
            9002 => Self::StorageError,
            9003 => Self::DigestError,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for code in [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::StockInsufficient,
            ErrorCode::MissingIngredient,
            ErrorCode::OrderAlreadyCancelled,
            ErrorCode::OrderCannotCancel,
            ErrorCode::InvalidPrice,
            ErrorCode::PriceHistoryConflict,
            ErrorCode::InvoiceSequenceGap,
            ErrorCode::ChainBroken,
            ErrorCode::StorageError,
        ] {
            let raw = code.code();
            assert_eq!(ErrorCode::try_from(raw), Ok(code));
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert_eq!(ErrorCode::try_from(1234), Err(InvalidErrorCode(1234)));
    }

    #[test]
    fn test_display_format() {
        assert_eq!(ErrorCode::StockInsufficient.to_string(), "E2001");
        assert_eq!(ErrorCode::Success.to_string(), "E0000");
    }

    #[test]
    fn test_user_messages_never_empty() {
        for raw in [0u16, 1, 2, 3, 4, 5, 6, 7, 8] {
            let code = ErrorCode::try_from(raw).unwrap();
            assert!(!code.user_message().is_empty());
        }
        assert!(
            ErrorCode::OrderCannotCancel
                .user_message()
                .contains("support")
        );
    }

    #[test]
    fn test_serde_as_u16() {
        let json = serde_json::to_string(&ErrorCode::OrderNotFound).unwrap();
        assert_eq!(json, "4001");
        let back: ErrorCode = serde_json::from_str("4001").unwrap();
        assert_eq!(back, ErrorCode::OrderNotFound);
    }
}
