//! Validation related error types

use thiserror::Error;

/// Input validation errors
///
/// These are recoverable: the message tells the user which rule was
/// violated so they can correct the input and retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Username does not match `^[A-Za-z0-9_]{3,20}$`
    #[error("username must contain only letters, numbers and underscores (3-20 characters)")]
    InvalidUsername,

    /// Email does not match a standard address pattern
    #[error("invalid email address")]
    InvalidEmail,

    /// Password is shorter than the minimum length
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

impl ValidationError {
    /// Create a password-too-short error
    pub fn password_too_short(min: usize) -> Self {
        Self::PasswordTooShort { min }
    }
}
