//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a session code is exactly four ASCII digits.
///
/// # Examples
///
/// ```ignore
/// validate_session_code("4821") // Ok
/// validate_session_code("482")  // Err - too short
/// validate_session_code("48a1") // Err - not a digit
/// ```
pub fn validate_session_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != 4 || !code.bytes().all(|b| b.is_ascii_digit()) {
        let mut err = ValidationError::new("session_code_format");
        err.message = Some("Invalid session ID format. Must be 4 digits".into());
        return Err(err);
    }

    Ok(())
}

/// Rejects values made only of whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }

    Ok(())
}
