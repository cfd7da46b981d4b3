//! Vellum - embedded version history for a single evolving JSON document
//!
//! Vellum records every revision of a JSON document as either a full
//! snapshot or a structural delta against its parent, rebuilds any revision
//! by replaying deltas from the nearest snapshot, keeps the store within
//! configured size limits, and layers branch and tag bookkeeping on top.
//!
//! # Quick Start
//!
//! ```
//! use vellum::{HistoryConfig, RestoreOptions, VersionHistoryManager, VersionOverrides};
//!
//! let history = VersionHistoryManager::new(HistoryConfig::default())?;
//! let first = history.create_version(r#"{"a":1,"b":2}"#, VersionOverrides::default())?;
//! let second = history.create_version(
//!     r#"{"a":1,"b":3,"c":4}"#,
//!     VersionOverrides::default().message("bump b, add c"),
//! )?;
//! assert_eq!(second.delta.as_ref().map(|d| d.total_operations), Some(2));
//!
//! let restored = history.restore_version(RestoreOptions::new(first.id()))?;
//! assert_eq!(restored.content, r#"{"a":1,"b":2}"#);
//! # Ok::<(), vellum::Error>(())
//! ```
//!
//! # Architecture
//!
//! - [`vellum_core`]: shared types, typed JSON paths, error taxonomy
//! - [`vellum_diff`]: structural diff and apply
//! - [`vellum_storage`]: compression codecs, backends, the version store
//! - [`vellum_engine`]: the history manager

pub use vellum_core::{
    content_checksum, Branch, BranchId, ChangeImpact, ChangeType, DiffOp, DiffOperation, Error,
    JsonPath, JsonValue, PathSegment, Result, StorageMetrics, Tag, TagId, TagType, Timestamp,
    Version, VersionDelta, VersionId, VersionLabel, VersionMetadata, VersionStatus,
};
pub use vellum_diff::{Cancellation, DiffConfig, DiffEngine, DiffError, DiffSummary};
pub use vellum_engine::{
    AutoSaveHandle, HistoryConfig, HistoryExport, HistoryFilter, RestoreOptions, RestoreResult,
    VersionHistoryManager, VersionOverrides, DEFAULT_BRANCH,
};
pub use vellum_storage::{
    CleanupReport, CompressionCodec, FileBackend, IdentityCodec, MemoryBackend, OptimizeReport,
    StorageBackend, StoreConfig, VersionStore, ZstdCodec,
};
