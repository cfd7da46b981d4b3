//! Storage backends.
//!
//! - [`MemoryBackend`]: process-local, for tests and ephemeral histories
//! - [`FileBackend`]: one file per version in a directory

mod file;
mod memory;
mod traits;

pub use file::{FileBackend, RECORD_EXTENSION};
pub use memory::MemoryBackend;
pub use traits::StorageBackend;
