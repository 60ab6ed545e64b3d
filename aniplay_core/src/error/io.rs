//! I/O related error types

use std::path::PathBuf;
use thiserror::Error;

/// I/O error with additional context
///
/// Covers transient network and filesystem failures. These are never
/// retried automatically beyond the cache's normal miss fallthrough.
#[derive(Error, Debug)]
#[error("{}", format_io_error(self))]
pub struct IoError {
    /// The kind of I/O error
    pub kind: IoErrorKind,
    /// Path associated with the error (if any)
    pub path: Option<PathBuf>,
    /// Underlying I/O error (if any)
    #[source]
    pub source: Option<std::io::Error>,
}

/// Kind of I/O error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoErrorKind {
    /// File not found
    FileNotFound,
    /// Permission denied
    PermissionDenied,
    /// Network request timed out
    Timeout,
    /// Network request failed or returned a non-success status
    Network { detail: String },
    /// Generic I/O error
    Other,
}

impl IoError {
    /// Create a file not found error
    pub fn file_not_found(path: &std::path::Path) -> Self {
        Self {
            kind: IoErrorKind::FileNotFound,
            path: Some(path.to_path_buf()),
            source: None,
        }
    }

    /// Create a network error with a detail message
    pub fn network(detail: impl Into<String>) -> Self {
        Self {
            kind: IoErrorKind::Network {
                detail: detail.into(),
            },
            path: None,
            source: None,
        }
    }

    /// Create an I/O error from a standard I/O error
    pub fn from_std(source: std::io::Error) -> Self {
        let kind = match source.kind() {
            std::io::ErrorKind::NotFound => IoErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => IoErrorKind::PermissionDenied,
            std::io::ErrorKind::TimedOut => IoErrorKind::Timeout,
            _ => IoErrorKind::Other,
        };

        Self {
            kind,
            path: None,
            source: Some(source),
        }
    }

    /// Create an I/O error from an HTTP client error
    pub fn from_http(source: reqwest::Error) -> Self {
        let kind = if source.is_timeout() {
            IoErrorKind::Timeout
        } else {
            IoErrorKind::Network {
                detail: source.to_string(),
            }
        };

        Self {
            kind,
            path: None,
            source: None,
        }
    }

    /// Create an I/O error with a path
    pub fn with_path(mut self, path: &std::path::Path) -> Self {
        self.path = Some(path.to_path_buf());
        self
    }
}

fn format_io_error(error: &IoError) -> String {
    match (&error.kind, &error.path) {
        (IoErrorKind::FileNotFound, Some(path)) => {
            format!("file not found: {}", path.display())
        }
        (IoErrorKind::FileNotFound, None) => "file not found".to_string(),
        (IoErrorKind::PermissionDenied, Some(path)) => {
            format!("permission denied: {}", path.display())
        }
        (IoErrorKind::PermissionDenied, None) => "permission denied".to_string(),
        (IoErrorKind::Timeout, _) => "network request timed out".to_string(),
        (IoErrorKind::Network { detail }, _) => format!("network error: {detail}"),
        (IoErrorKind::Other, _) => {
            if let Some(source) = &error.source {
                format!("I/O error: {source}")
            } else {
                "I/O error".to_string()
            }
        }
    }
}
