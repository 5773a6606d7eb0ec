//! Error type with structured context

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// This is the primary error type for the engine, providing:
/// - Standardized error codes via [`ErrorCode`]
/// - A technical message (for logs)
/// - A user-facing message derived from the code
/// - Optional structured details (ids, quantities, context)
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Technical error message (for logs, never shown to end users)
    pub message: String,
    /// Optional additional details (field-level errors, context, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom technical message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// The end-user message for this error
    ///
    /// Always resolvable without engineering involvement; internals
    /// stay in `message` and `details`.
    pub fn user_message(&self) -> &'static str {
        self.code.user_message()
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", r))
            .with_detail("resource", r)
    }

    /// Create an invalid quantity error
    pub fn invalid_quantity(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidQuantity, msg)
    }

    /// Create an invalid price error
    pub fn invalid_price(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidPrice, msg)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create a storage collaborator error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::StorageError, msg)
    }

    /// Create a duplicate entry error
    pub fn duplicate(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::DuplicateEntry, format!("{} already exists", r))
            .with_detail("resource", r)
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
