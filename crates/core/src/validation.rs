//! Input validation for signup, password, and template fields.
//!
//! Validators return [`CoreError::Validation`] with a message suitable for
//! showing to the client. Length bounds match what the stored schema
//! enforces so a request that passes here cannot fail the database CHECK
//! constraints.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Minimum password length for signup and reset.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum length for first/last names.
pub const MAX_NAME_LENGTH: usize = 50;

/// Maximum length for a template title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for a template description.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

// Deliberately loose: one @, no whitespace, a dot somewhere in the domain.
// Deliverability is proven by the verification email, not the regex.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));

/// Validate the shape of an email address.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.is_empty() || email.len() > 254 || !EMAIL_RE.is_match(email) {
        return Err(CoreError::Validation(
            "Invalid email address".to_string(),
        ));
    }
    Ok(())
}

/// Validate that a password meets the minimum length requirement.
pub fn validate_password(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}

/// Validate a first or last name: non-empty, at most 50 characters.
pub fn validate_name(field: &str, value: &str) -> Result<(), CoreError> {
    if value.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a template title: non-empty, at most 200 characters.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(
            "Title must not be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an optional template description: at most 1000 characters.
pub fn validate_description(description: Option<&str>) -> Result<(), CoreError> {
    if let Some(desc) = description {
        if desc.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(CoreError::Validation(format!(
                "Description must be at most {MAX_DESCRIPTION_LENGTH} characters"
            )));
        }
    }
    Ok(())
}
