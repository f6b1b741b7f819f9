//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product, employee, admin
pub const MAX_NAME_LEN: usize = 200;

/// Reasons (stock request reason, rejection reason)
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, SKU, reference numbers
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Passwords shorter than this are rejected on create/reset
pub const MIN_PASSWORD_LEN: usize = 8;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(
            AppError::validation(format!("{field} must not be empty")).with_detail("field", field),
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
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
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

/// Password length bounds
pub fn validate_password(value: &str) -> Result<(), AppError> {
    if value.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        ))
        .with_detail("field", "password"));
    }
    validate_required_text(value, "password", MAX_PASSWORD_LEN)
}

/// Minimal shape check; delivery is the real verification
pub fn validate_email(value: &str) -> Result<(), AppError> {
    validate_required_text(value, "email", MAX_EMAIL_LEN)?;
    let valid = value
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(
            AppError::validation("email is not a valid address").with_detail("field", "email"),
        );
    }
    Ok(())
}

/// Integer quantity / amount must be >= 1
pub fn validate_positive(value: i64, field: &str) -> Result<(), AppError> {
    if value < 1 {
        return Err(AppError::with_message(
            shared::ErrorCode::ValueOutOfRange,
            format!("{field} must be at least 1"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

/// Trimmed, non-empty reason text
pub fn require_reason(value: Option<&str>, field: &str) -> Result<String, AppError> {
    let reason = value.map(str::trim).unwrap_or_default();
    if reason.is_empty() {
        return Err(AppError::with_message(
            shared::ErrorCode::RequiredField,
            format!("{field} is required"),
        )
        .with_detail("field", field));
    }
    validate_required_text(reason, field, MAX_NOTE_LEN)?;
    Ok(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Soap", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_required_text(&long, "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_email_shape() {
        assert!(validate_email("root@fieldstock.local").is_ok());
        assert!(validate_email("root").is_err());
        assert!(validate_email("@x.com").is_err());
    }

    #[test]
    fn test_positive() {
        assert!(validate_positive(1, "quantity").is_ok());
        let err = validate_positive(0, "quantity").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
    }

    #[test]
    fn test_reason_is_trimmed_and_required() {
        assert_eq!(require_reason(Some("  damaged  "), "reason").unwrap(), "damaged");
        assert!(require_reason(Some("   "), "reason").is_err());
        let err = require_reason(None, "reason").unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
    }
}
