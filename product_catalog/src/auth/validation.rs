//! Client-side checks for the login, registration, and reset forms.
//!
//! These run before any request is built; a failure never reaches the network.

use crate::errors::{ClientError, ClientResult};
use regex::Regex;
use std::sync::LazyLock;

/// Minimum username length
pub const MIN_USERNAME_LEN: usize = 2;

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").expect("email pattern is valid")
});

fn invalid(message: &str) -> ClientError {
    ClientError::Validation(message.to_string())
}

/// Validate username format
pub fn validate_username(username: &str) -> ClientResult<()> {
    let username = username.trim();
    if username.is_empty() {
        return Err(invalid("Username is required"));
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(invalid("Username must be at least 2 characters long"));
    }
    Ok(())
}

/// Validate email shape
pub fn validate_email(email: &str) -> ClientResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(invalid("Email is required"));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(invalid("Invalid email format"));
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> ClientResult<()> {
    if password.trim().is_empty() {
        return Err(invalid("Password is required"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid("Password must be at least 8 characters long"));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(invalid("Password must contain at least one uppercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(invalid("Password must contain at least one lowercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid("Password must contain at least one number"));
    }
    Ok(())
}

/// Checks for the login form
pub fn validate_login(username: &str, password: &str) -> ClientResult<()> {
    validate_username(username)?;
    if password.trim().is_empty() {
        return Err(invalid("Password is required"));
    }
    Ok(())
}

/// Checks for the registration form
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> ClientResult<()> {
    validate_username(username)?;
    validate_email(email)?;
    if confirm_password.is_empty() {
        return Err(invalid("Password confirmation is required"));
    }
    validate_password(password)?;
    if password != confirm_password {
        return Err(invalid("Passwords do not match"));
    }
    Ok(())
}
