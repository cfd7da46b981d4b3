//! Store configuration

use serde::{Deserialize, Serialize};

/// Default version count cap
pub const DEFAULT_MAX_VERSIONS: usize = 100;
/// Default compressed-size cap (10 MiB)
pub const DEFAULT_MAX_STORAGE_SIZE: usize = 10 * 1024 * 1024;
/// Default zstd level
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;
/// Default snapshot interval
pub const DEFAULT_SNAPSHOT_INTERVAL: usize = 10;

/// Settings the [`VersionStore`](crate::VersionStore) acts on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Most versions kept after a save
    pub max_versions: usize,
    /// Most compressed payload bytes kept after a save
    pub max_storage_size: usize,
    /// zstd level for new records; 0 stores uncompressed
    pub compression_level: i32,
    /// Enforce the caps on every save
    pub auto_cleanup: bool,
    /// Longest delta chain `optimize_storage` leaves in place
    pub snapshot_interval: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            max_versions: DEFAULT_MAX_VERSIONS,
            max_storage_size: DEFAULT_MAX_STORAGE_SIZE,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            auto_cleanup: true,
            snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL,
        }
    }
}
