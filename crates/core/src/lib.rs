//! Core types for Vellum
//!
//! This crate defines the foundational types shared by the diff engine, the
//! version store and the history manager:
//! - JsonValue: the document value that versions reconstruct to
//! - JsonPath / PathSegment: typed paths and the path mutations deltas use
//! - DiffOperation / VersionDelta: structural deltas
//! - Version / VersionMetadata / Branch / Tag / StorageMetrics: stored records
//! - VersionId / BranchId / TagId / Timestamp: identity and time
//! - Error: the Validation / NotFound / Storage taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checksum;
pub mod delta;
pub mod error;
pub mod json;
pub mod path;
pub mod timestamp;
pub mod types;
pub mod version;

pub use checksum::{content_checksum, xxh3_hex};
pub use delta::{DiffOp, DiffOperation, VersionDelta};
pub use error::{Error, Result};
pub use json::JsonValue;
pub use path::{
    get_at_path, insert_at_path, remove_at_path, set_at_path, JsonPath, PatchError,
    PathParseError, PathSegment,
};
pub use timestamp::Timestamp;
pub use types::{BranchId, TagId, VersionId};
pub use version::{
    Branch, ChangeImpact, ChangeType, StorageMetrics, Tag, TagType, Version, VersionLabel,
    VersionMetadata, VersionStatus,
};
