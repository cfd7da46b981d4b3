//! Error types for the version history engine
//!
//! Every fallible store or manager operation reports one of three categories:
//!
//! - **Validation**: malformed JSON on a validated restore, malformed import
//!   payloads, invalid configuration, disabled features
//! - **NotFound**: unknown version/branch/tag ids, broken delta chains
//! - **Storage**: serialization or compression failures, capacity that
//!   cleanup could not free, corrupt records
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use thiserror::Error;

/// Result type alias for history operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the version history engine
#[derive(Debug, Error)]
pub enum Error {
    /// Input failed validation (bad JSON, bad import document, bad config)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced entity does not exist or cannot be reached
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persistence failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error from a file-backed store
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Error::Storage(msg.into())
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this is a storage error (I/O failures count as storage)
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage(_) | Error::Io(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::Storage(e.to_string())
        } else {
            Error::Validation(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_validation() {
        let err = Error::validation("unexpected end of input");
        let msg = err.to_string();
        assert!(msg.contains("Validation error"));
        assert!(msg.contains("unexpected end of input"));
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::not_found("version 42");
        assert!(err.to_string().contains("Not found"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_error_display_storage() {
        let err = Error::storage("write failed");
        let msg = err.to_string();
        assert!(msg.contains("Storage error"));
        assert!(msg.contains("write failed"));
    }

    #[test]
    fn test_error_from_io_counts_as_storage() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_storage());
    }

    #[test]
    fn test_error_from_serde_json_is_validation() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = parse_err.into();
        assert!(err.is_validation());
    }

    #[test]
    fn test_classifiers_are_exclusive() {
        let err = Error::validation("x");
        assert!(err.is_validation());
        assert!(!err.is_not_found());
        assert!(!err.is_storage());
    }
}
