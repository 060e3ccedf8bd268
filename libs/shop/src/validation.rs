//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::error::ValidationError;

/// Validate display name
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::Required("name"));
    }

    if name.chars().count() > 80 {
        return Err(ValidationError::invalid(
            "name",
            "must be at most 80 characters long",
        ));
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::Required("email"));
    }

    if email.len() > 254 {
        return Err(ValidationError::invalid(
            "email",
            "must be at most 254 characters long",
        ));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err(ValidationError::invalid("email", "Invalid email format"));
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Required("password"));
    }

    if password.chars().count() < 6 {
        return Err(ValidationError::invalid(
            "password",
            "must be at least 6 characters long",
        ));
    }

    if password.len() > 128 {
        return Err(ValidationError::invalid(
            "password",
            "must be at most 128 characters long",
        ));
    }

    Ok(())
}

/// Registration form check: password and confirmation must agree
pub fn validate_password_confirmation(
    password: &str,
    confirmation: &str,
) -> Result<(), ValidationError> {
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    validate_password(password)
}

/// Normalize an email for lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
