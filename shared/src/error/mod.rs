//! Unified error system for the Gamba engine
//!
//! This module provides a comprehensive error handling system with:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 2xxx: Stock / inventory errors
//! - 4xxx: Order errors
//! - 6xxx: Price errors
//! - 7xxx: Audit trail errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! // Create a simple error
//! let err = AppError::new(ErrorCode::OrderAlreadyCancelled);
//!
//! // Create an error with custom message and structured context
//! let err = AppError::with_message(ErrorCode::StockInsufficient, "Not enough Steak")
//!     .with_detail("ingredient_id", "ing-steak")
//!     .with_detail("required", 6.0)
//!     .with_detail("available", 5.0);
//!
//! // The user-facing message never leaks internals
//! assert!(!err.user_message().is_empty());
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
