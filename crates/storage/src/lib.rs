//! Version persistence for Vellum
//!
//! This crate stores versions and keeps them within budget:
//! - VersionStore: save/load/delete, listing, metrics, cleanup, optimize
//! - codec: the CompressionCodec seam (identity, zstd)
//! - backend: byte stores keyed by version id (memory, one file per version)
//! - record: the MessagePack record envelope
//! - chain: delta chain reconstruction
//! - retention: the count and size caps and eviction order

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod chain;
pub mod codec;
pub mod config;
pub mod record;
pub mod retention;
pub mod store;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use chain::{reconstruct, Reconstruction, VersionSource};
pub use codec::{codec_by_id, codec_for_level, CodecError, CompressionCodec, IdentityCodec, ZstdCodec};
pub use config::StoreConfig;
pub use record::{StoredRecord, RECORD_FORMAT_VERSION};
pub use retention::CapacityPolicy;
pub use store::{CleanupReport, OptimizeReport, VersionStore};
