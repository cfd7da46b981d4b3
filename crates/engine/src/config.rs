//! History configuration via `vellum.toml`
//!
//! Every field has a default, so an empty file (or no file) gives a working
//! configuration. The diff engine's settings live under a `[diff]` table.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use vellum_core::{Error, Result};
use vellum_diff::DiffConfig;
use vellum_storage::config::{
    DEFAULT_COMPRESSION_LEVEL, DEFAULT_MAX_STORAGE_SIZE, DEFAULT_MAX_VERSIONS,
    DEFAULT_SNAPSHOT_INTERVAL,
};
use vellum_storage::StoreConfig;

/// Config file name used by [`HistoryConfig::write_default_if_missing`] callers
pub const CONFIG_FILE_NAME: &str = "vellum.toml";

/// Default auto-save period in milliseconds
pub const DEFAULT_AUTO_SAVE_INTERVAL_MS: u64 = 30_000;

/// Version history configuration
///
/// # Example
///
/// ```toml
/// max_versions = 100
/// max_storage_size = 10485760
/// auto_save_interval_ms = 30000
/// compression_level = 3
/// snapshot_interval = 10
///
/// [diff]
/// max_depth = 50
/// precision = 0.0001
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Most versions kept by the store
    pub max_versions: usize,
    /// Most compressed bytes kept by the store
    pub max_storage_size: usize,
    /// Auto-save period; 0 disables auto-save
    pub auto_save_interval_ms: u64,
    /// zstd level; 0 stores payloads uncompressed
    pub compression_level: i32,
    /// Every `snapshot_interval`-th version is stored in full
    pub snapshot_interval: usize,
    /// Allow branch operations
    pub enable_branching: bool,
    /// Allow tag operations
    pub enable_tagging: bool,
    /// Enforce the caps on every save
    pub auto_cleanup: bool,
    /// Diff engine settings
    pub diff: DiffConfig,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            max_versions: DEFAULT_MAX_VERSIONS,
            max_storage_size: DEFAULT_MAX_STORAGE_SIZE,
            auto_save_interval_ms: DEFAULT_AUTO_SAVE_INTERVAL_MS,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL,
            enable_branching: true,
            enable_tagging: true,
            auto_cleanup: true,
            diff: DiffConfig::default(),
        }
    }
}

impl HistoryConfig {
    /// Reject settings the manager cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.snapshot_interval == 0 {
            return Err(Error::validation("snapshot_interval must be at least 1"));
        }
        if self.max_versions == 0 {
            return Err(Error::validation("max_versions must be at least 1"));
        }
        if !(-7..=22).contains(&self.compression_level) {
            return Err(Error::validation(format!(
                "compression_level {} is outside the zstd range -7..=22",
                self.compression_level
            )));
        }
        self.diff.validate()
    }

    /// Auto-save period, `None` when auto-save is disabled
    pub fn auto_save_interval(&self) -> Option<Duration> {
        match self.auto_save_interval_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// The store's slice of this configuration
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            max_versions: self.max_versions,
            max_storage_size: self.max_storage_size,
            compression_level: self.compression_level,
            auto_cleanup: self.auto_cleanup,
            snapshot_interval: self.snapshot_interval,
        }
    }

    /// This configuration with the store's slice taken from `store`
    pub fn with_store_settings(mut self, store: &StoreConfig) -> Self {
        self.max_versions = store.max_versions;
        self.max_storage_size = store.max_storage_size;
        self.compression_level = store.compression_level;
        self.auto_cleanup = store.auto_cleanup;
        self.snapshot_interval = store.snapshot_interval;
        self
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: HistoryConfig = toml::from_str(text)
            .map_err(|e| Error::validation(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    ///
    /// # Errors
    ///
    /// `Storage` if the file cannot be read, `Validation` if it does not
    /// parse or holds invalid settings.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::storage(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Validation(msg) => {
                Error::validation(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    /// Serialize this config to TOML and write it to `path`
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::storage(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::storage(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Write the default config to `path` unless a file is already there
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        HistoryConfig::default().write_to_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = HistoryConfig::default();
        assert_eq!(config.max_versions, 100);
        assert_eq!(config.max_storage_size, 10 * 1024 * 1024);
        assert_eq!(config.auto_save_interval_ms, 30_000);
        assert_eq!(config.snapshot_interval, 10);
        assert_eq!(config.diff.max_depth, 50);
        assert!(config.enable_branching && config.enable_tagging);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = HistoryConfig::from_toml_str("").unwrap();
        assert_eq!(config, HistoryConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = HistoryConfig::from_toml_str(
            "snapshot_interval = 20\nauto_save_interval_ms = 0\n\n[diff]\nprecision = 0.5\n",
        )
        .unwrap();
        assert_eq!(config.snapshot_interval, 20);
        assert_eq!(config.auto_save_interval(), None);
        assert_eq!(config.diff.precision, 0.5);
        assert_eq!(config.diff.chunk_size, 1000);
        assert_eq!(config.max_versions, 100);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = HistoryConfig::from_toml_str("snapshot_interval = 0").unwrap_err();
        assert!(err.is_validation());
        assert!(HistoryConfig::from_toml_str("max_versions = 0").is_err());
        assert!(HistoryConfig::from_toml_str("[diff]\nchunk_size = 0").is_err());
        assert!(HistoryConfig::from_toml_str("[diff]\nprecision = -1.0").is_err());
        assert!(HistoryConfig::from_toml_str("max_versions = \"lots\"").is_err());
    }

    #[test]
    fn test_store_config_slice() {
        let config = HistoryConfig {
            max_versions: 7,
            compression_level: 0,
            auto_cleanup: false,
            ..HistoryConfig::default()
        };
        let store = config.store_config();
        assert_eq!(store.max_versions, 7);
        assert_eq!(store.compression_level, 0);
        assert!(!store.auto_cleanup);
        assert_eq!(store.snapshot_interval, 10);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        assert!(HistoryConfig::from_file(&path).unwrap_err().is_storage());

        HistoryConfig::write_default_if_missing(&path).unwrap();
        assert_eq!(HistoryConfig::from_file(&path).unwrap(), HistoryConfig::default());

        let custom = HistoryConfig {
            snapshot_interval: 4,
            enable_tagging: false,
            ..HistoryConfig::default()
        };
        custom.write_to_file(&path).unwrap();
        // an existing file is left alone
        HistoryConfig::write_default_if_missing(&path).unwrap();
        assert_eq!(HistoryConfig::from_file(&path).unwrap(), custom);
    }
}
