//! Authentication related error types

use thiserror::Error;

/// Authentication and token errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Password did not verify against the stored hash
    #[error("wrong password")]
    WrongPassword,

    /// Token signature is valid but the token has expired
    #[error("token expired")]
    TokenExpired,

    /// Token is malformed or its signature does not verify
    #[error("invalid token")]
    TokenInvalid,

    /// Password hashing backend failure
    #[error("password hashing failed: {message}")]
    Hashing { message: String },
}

impl AuthError {
    /// Create a hashing backend error
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }
}
