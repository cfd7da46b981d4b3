//! Structural JSON diff engine for Vellum
//!
//! Computes a [`VersionDelta`](vellum_core::VersionDelta) between two
//! documents and applies deltas back:
//! - `engine`: recursive walk, array alignment, apply
//! - `lcs`: LCS alignment of two arrays
//! - `chunked`: chunked traversal and cancellation for large documents
//! - `equality`: deep equality with numeric precision
//! - `summary`: human-readable delta summaries

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunked;
pub mod config;
pub mod engine;
pub mod equality;
pub mod lcs;
pub mod summary;

pub use chunked::Cancellation;
pub use config::DiffConfig;
pub use engine::{apply_delta, apply_operation, DiffEngine};
pub use equality::{numbers_equal, values_equal};
pub use summary::DiffSummary;

use thiserror::Error;

/// Errors from diff calculation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    /// The cancellation token was triggered
    #[error("diff cancelled")]
    Cancelled,
}

impl From<DiffError> for vellum_core::Error {
    fn from(e: DiffError) -> Self {
        vellum_core::Error::validation(e.to_string())
    }
}
