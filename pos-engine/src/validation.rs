//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Limits cover the free-text fields the engine accepts: notes,
//! cancellation reasons, actor names, document references.

use shared::{AppError, AppResult, ErrorCode};

// ── Text length limits ──────────────────────────────────────────────

/// Actor / operator names
pub const MAX_NAME_LEN: usize = 200;

/// Notes, reasons (item note, cancellation reason, price change reason)
pub const MAX_NOTE_LEN: usize = 500;

/// Document references (order ids, purchase refs, count refs)
pub const MAX_REF_LEN: usize = 100;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(
            AppError::with_message(ErrorCode::RequiredField, format!("{field} must not be empty"))
                .with_detail("field", field),
        );
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(value: Option<&str>, field: &str, max_len: usize) -> AppResult<()> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_rejects_blank() {
        let err = validate_required_text("   ", "reason", MAX_NOTE_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
    }

    #[test]
    fn test_required_text_rejects_too_long() {
        let long = "x".repeat(MAX_NOTE_LEN + 1);
        let err = validate_required_text(&long, "reason", MAX_NOTE_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(None, "note", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(Some("fine"), "note", MAX_NOTE_LEN).is_ok());
        let long = "x".repeat(MAX_NOTE_LEN + 1);
        assert!(validate_optional_text(Some(&long), "note", MAX_NOTE_LEN).is_err());
    }
}
