//! Error types for the AniPlay core library
//!
//! This module contains all error types used throughout the library, organized
//! into logical categories for better maintainability and clarity.

use thiserror::Error;

pub mod auth;
pub mod io;
pub mod validation;

pub use self::auth::AuthError;
pub use self::io::{IoError, IoErrorKind};
pub use self::validation::ValidationError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the AniPlay core library
///
/// Errors are categorized to match what the caller can do about them:
/// - Validation errors: the user can correct their input
/// - Auth errors: wrong password, expired or invalid token
/// - Conflict/NotFound: duplicate or missing identity records
/// - I/O errors: transient network and filesystem failures
/// - Corrupt: damaged cached data, self-healed by deletion
/// - Storage: internal database failures, shown to users generically
#[derive(Error, Debug)]
pub enum Error {
    /// Input validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Authentication and token errors
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// I/O related errors (network, filesystem)
    #[error(transparent)]
    Io(#[from] IoError),

    /// A unique field (username, email) already exists
    #[error("{field} already exists")]
    Conflict { field: String },

    /// A requested record does not exist
    #[error("{what} not found")]
    NotFound { what: String },

    /// Stored data failed integrity checks (undersized or undecodable)
    #[error("corrupt data: {reason}")]
    Corrupt { reason: String },

    /// Internal storage failure. The display string is intentionally
    /// generic; the underlying cause is preserved as the source for logs.
    #[error("internal storage error")]
    Storage {
        #[source]
        source: sqlx::Error,
    },
}

impl Error {
    /// Create a conflict error for a duplicate unique field
    pub fn conflict(field: &str) -> Self {
        Self::Conflict {
            field: field.to_string(),
        }
    }

    /// Create a not-found error
    pub fn not_found(what: &str) -> Self {
        Self::NotFound {
            what: what.to_string(),
        }
    }

    /// Create a corrupt-data error
    pub fn corrupt(reason: impl Into<String>) -> Self {
        Self::Corrupt {
            reason: reason.into(),
        }
    }
}

// Conversions from external error types. These are the only places where
// backend errors enter the taxonomy; no raw backend error crosses a public API.

impl From<sqlx::Error> for Error {
    fn from(source: sqlx::Error) -> Self {
        Self::Storage { source }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io(IoError::from_std(source))
    }
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        Self::Io(IoError::from_http(source))
    }
}

impl From<image::ImageError> for Error {
    fn from(source: image::ImageError) -> Self {
        Self::Corrupt {
            reason: format!("image decode failed: {source}"),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(source: jsonwebtoken::errors::Error) -> Self {
        match source.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                Self::Auth(AuthError::TokenExpired)
            }
            _ => Self::Auth(AuthError::TokenInvalid),
        }
    }
}
