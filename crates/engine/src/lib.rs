//! Version history manager for Vellum
//!
//! Orchestrates the diff engine and the version store:
//! - `manager`: working copy, version creation, snapshot policy, queries
//! - `restore`: restore by delta-chain replay, with backup and validation
//! - `branch` / `tag`: in-memory branch and tag bookkeeping
//! - `autosave`: periodic auto-save thread
//! - `export`: whole-history export and import
//! - `config`: `vellum.toml` configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod autosave;
mod branch;
pub mod config;
pub mod export;
pub mod manager;
pub mod restore;
mod tag;

pub use autosave::AutoSaveHandle;
pub use config::{HistoryConfig, CONFIG_FILE_NAME};
pub use export::{HistoryExport, EXPORT_FORMAT_VERSION};
pub use manager::{HistoryFilter, VersionHistoryManager, VersionOverrides, DEFAULT_BRANCH};
pub use restore::{RestoreOptions, RestoreResult};
