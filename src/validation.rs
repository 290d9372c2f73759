use validator::{ValidationError, ValidationErrors};

pub const USERNAME_MIN_LENGTH: usize = 1;
pub const PASSWORD_MIN_LENGTH: usize = 10;
/// In bytes: bcrypt ignores everything past 72 bytes
pub const PASSWORD_MAX_BYTES: usize = 72;

fn error(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn check_trimmed(value: &str) -> Result<(), ValidationError> {
    if value.trim() != value {
        return Err(error(
            "whitespace",
            "Cannot start or end with whitespace".to_string(),
        ));
    }
    Ok(())
}

fn check_min_chars(value: &str, min: usize) -> Result<(), ValidationError> {
    if value.chars().count() < min {
        return Err(error(
            "too_short",
            format!("Must be at least {} characters long", min),
        ));
    }
    Ok(())
}

fn check_max_bytes(value: &str, max: usize) -> Result<(), ValidationError> {
    if value.len() > max {
        return Err(error(
            "too_long",
            format!("Must be at most {} bytes long", max),
        ));
    }
    Ok(())
}

/// Validates that a username has no surrounding whitespace and is non-empty
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    check_trimmed(username)?;
    check_min_chars(username, USERNAME_MIN_LENGTH)
}

/// Validates that a password has no surrounding whitespace and fits bcrypt's limits
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    check_trimmed(password)?;
    check_min_chars(password, PASSWORD_MIN_LENGTH)?;
    check_max_bytes(password, PASSWORD_MAX_BYTES)
}

/// Picks the first failing field, in the given order, and its message.
///
/// `ValidationErrors` keys fields by name in a map, so callers pass the
/// order in which fields should be reported.
pub fn first_field_error(
    errors: &ValidationErrors,
    order: &[&'static str],
) -> Option<(&'static str, String)> {
    let field_errors = errors.field_errors();
    order.iter().find_map(|field| {
        let errors = field_errors.get(*field)?;
        let first = errors.first()?;
        let message = first
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| first.code.to_string());
        Some((*field, message))
    })
}
