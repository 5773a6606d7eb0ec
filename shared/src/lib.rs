//! Shared types for the Gamba back-office engine
//!
//! Common types used across the engine crates: domain models,
//! the unified error system, and small utilities (timestamps, IDs).

pub mod error;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
