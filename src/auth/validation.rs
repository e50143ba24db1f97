//! Input validation for registration and login.

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Longest email accepted (RFC 5321 path limit)
pub const MAX_EMAIL_LEN: usize = 254;

/// Longest display name accepted
pub const MAX_NAME_LEN: usize = 100;

/// Password strength rules applied before hashing
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub enabled: bool,
    pub min_length: usize,
}

impl PasswordPolicy {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            enabled: config.password_policy,
            min_length: config.password_min_length,
        }
    }

    /// Minimum length plus at least one letter and one digit
    pub fn check(&self, password: &str) -> Result<(), AuthError> {
        if !self.enabled {
            return Ok(());
        }
        if password.chars().count() < self.min_length {
            return Err(AuthError::WeakPassword(format!(
                "Password must be at least {} characters",
                self.min_length
            )));
        }
        let has_letter = password.chars().any(char::is_alphabetic);
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        if !has_letter || !has_digit {
            return Err(AuthError::WeakPassword(
                "Password must contain at least one letter and one digit".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reject empty or whitespace-only fields
pub fn require(field: &str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Basic shape check: one '@', non-empty local part and domain, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

pub fn validate_email(email: &str) -> Result<(), AuthError> {
    require("Email", email)?;
    if !is_valid_email(email) {
        return Err(AuthError::Validation("Email address is not valid".to_string()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), AuthError> {
    require("Name", name)?;
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AuthError::Validation(format!(
            "Name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}
