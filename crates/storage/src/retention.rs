//! Capacity policy
//!
//! Two independent caps, both enforced after a save when auto-cleanup is
//! on:
//!
//! - **max_versions**: number of stored versions
//! - **max_storage_size**: total compressed payload bytes
//!
//! Eviction candidates are taken oldest first by `(timestamp, sequence)`.
//! Pinned versions (the current version and branch heads) and the version
//! being saved are never candidates.

use std::collections::HashSet;

use vellum_core::{Timestamp, VersionId};

use crate::config::StoreConfig;

/// Count and size caps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityPolicy {
    /// Most versions kept
    pub max_versions: usize,
    /// Most compressed bytes kept
    pub max_storage_size: usize,
}

impl CapacityPolicy {
    /// Check whether either cap is exceeded
    pub fn is_exceeded(&self, count: usize, size: usize) -> bool {
        count > self.max_versions || size > self.max_storage_size
    }
}

impl From<&StoreConfig> for CapacityPolicy {
    fn from(config: &StoreConfig) -> Self {
        CapacityPolicy {
            max_versions: config.max_versions,
            max_storage_size: config.max_storage_size,
        }
    }
}

/// Order eviction candidates oldest first, skipping `exempt` ids
pub fn eviction_order<I>(entries: I, exempt: &HashSet<VersionId>) -> Vec<VersionId>
where
    I: IntoIterator<Item = (VersionId, Timestamp, u64)>,
{
    let mut candidates: Vec<(Timestamp, u64, VersionId)> = entries
        .into_iter()
        .filter(|(id, _, _)| !exempt.contains(id))
        .map(|(id, ts, seq)| (ts, seq, id))
        .collect();
    candidates.sort();
    candidates.into_iter().map(|(_, _, id)| id).collect()
}
