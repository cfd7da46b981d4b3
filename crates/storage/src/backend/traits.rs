//! Storage backend trait.

use vellum_core::{Result, VersionId};

/// Byte-level persistence keyed by version id.
///
/// Backends know nothing about record contents; the store encodes and
/// decodes. Implementations use interior mutability so a backend can be
/// shared behind `&self`.
pub trait StorageBackend: Send + Sync {
    /// Store bytes under `id`, replacing any previous value.
    fn put(&self, id: &VersionId, bytes: &[u8]) -> Result<()>;

    /// Fetch the bytes stored under `id`.
    fn get(&self, id: &VersionId) -> Result<Option<Vec<u8>>>;

    /// Remove `id`. Returns whether anything was removed.
    fn remove(&self, id: &VersionId) -> Result<bool>;

    /// Every stored id, in no particular order.
    fn keys(&self) -> Result<Vec<VersionId>>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}
