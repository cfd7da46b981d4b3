//! Version store
//!
//! [`VersionStore`] persists versions through a [`StorageBackend`], keeps an
//! in-memory index of metadata and sizes, and enforces the capacity policy.
//!
//! # Eviction and chain integrity
//!
//! A version that is the parent of a retained delta version cannot simply
//! be dropped. Before such a version is evicted (or deleted) every delta
//! child is reconstructed and rewritten as a snapshot. Eviction is planned
//! before anything is written: if the caps cannot be met, the save that
//! triggered it fails with a storage error and the store is left untouched.
//!
//! Writes happen in a fixed order: materialized children, then the new
//! record, then removals. The index follows each backend call only once it
//! succeeded, so a failure part way leaves every indexed version readable.

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use vellum_core::{Error, Result, StorageMetrics, Version, VersionId, VersionMetadata};

use crate::backend::{MemoryBackend, StorageBackend};
use crate::chain::{reconstruct, Reconstruction, VersionSource};
use crate::codec::{codec_for_level, CompressionCodec};
use crate::config::StoreConfig;
use crate::record::StoredRecord;
use crate::retention::{eviction_order, CapacityPolicy};

/// Outcome of [`VersionStore::cleanup`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Versions removed, in eviction order
    pub evicted: Vec<VersionId>,
    /// Delta versions rewritten as snapshots to keep their chains whole
    pub materialized: Vec<VersionId>,
    /// Whether both caps hold after cleanup
    pub within_limits: bool,
}

/// Outcome of [`VersionStore::optimize_storage`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimizeReport {
    /// Records re-encoded with the current codec
    pub rewritten: usize,
    /// Delta versions turned into snapshots to shorten their chain
    pub resnapshotted: Vec<VersionId>,
    /// Compressed bytes before
    pub size_before: usize,
    /// Compressed bytes after
    pub size_after: usize,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    metadata: VersionMetadata,
    is_snapshot: bool,
    stored_size: usize,
    original_size: usize,
}

impl IndexEntry {
    fn from_record(record: &StoredRecord) -> Self {
        IndexEntry {
            metadata: record.metadata.clone(),
            is_snapshot: record.is_snapshot,
            stored_size: record.stored_size(),
            original_size: record.original_size,
        }
    }
}

#[derive(Debug, Default)]
struct StoreIndex {
    entries: HashMap<VersionId, IndexEntry>,
    pinned: HashSet<VersionId>,
}

/// Planned changes that bring the store back under its caps
#[derive(Default)]
struct EvictionPlan {
    evict: Vec<VersionId>,
    rewrites: Vec<(VersionId, StoredRecord)>,
    within_limits: bool,
}

/// Reads through pending (not yet written) versions, then the backend
struct Overlay<'a> {
    store: &'a VersionStore,
    index: &'a StoreIndex,
    pending: &'a HashMap<VersionId, Version>,
    evicted: &'a HashSet<VersionId>,
}

impl VersionSource for Overlay<'_> {
    fn fetch(&self, id: &VersionId) -> Result<Option<Version>> {
        if self.evicted.contains(id) {
            return Ok(None);
        }
        if let Some(version) = self.pending.get(id) {
            return Ok(Some(version.clone()));
        }
        self.store.fetch(self.index, id)
    }
}

/// Versioned document store
pub struct VersionStore {
    backend: Box<dyn StorageBackend>,
    codec: Box<dyn CompressionCodec>,
    config: StoreConfig,
    index: RwLock<StoreIndex>,
}

impl std::fmt::Debug for VersionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionStore")
            .field("backend", &self.backend.name())
            .field("codec", &self.codec.codec_id())
            .field("versions", &self.index.read().entries.len())
            .finish()
    }
}

impl VersionStore {
    /// Open a store over `backend`, rebuilding the index from its records
    ///
    /// Records that cannot be decoded are skipped with a warning.
    pub fn open(
        backend: Box<dyn StorageBackend>,
        codec: Box<dyn CompressionCodec>,
        config: StoreConfig,
    ) -> Result<Self> {
        let mut index = StoreIndex::default();
        for id in backend.keys()? {
            let Some(bytes) = backend.get(&id)? else {
                continue;
            };
            match StoredRecord::from_bytes(&bytes) {
                Ok(record) if record.metadata.id == id => {
                    index.entries.insert(id, IndexEntry::from_record(&record));
                }
                Ok(record) => warn!(
                    key = %id,
                    record = %record.metadata.id,
                    "Skipping record stored under a foreign key"
                ),
                Err(e) => warn!(key = %id, error = %e, "Skipping unreadable record"),
            }
        }
        info!(
            backend = backend.name(),
            codec = codec.codec_id(),
            versions = index.entries.len(),
            "Opened version store"
        );
        Ok(VersionStore {
            backend,
            codec,
            config,
            index: RwLock::new(index),
        })
    }

    /// Empty in-memory store, compressing per `config.compression_level`
    pub fn in_memory(config: StoreConfig) -> Self {
        let codec = codec_for_level(config.compression_level);
        VersionStore {
            backend: Box::new(MemoryBackend::new()),
            codec,
            config,
            index: RwLock::new(StoreIndex::default()),
        }
    }

    /// Store configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of stored versions
    pub fn len(&self) -> usize {
        self.index.read().entries.len()
    }

    /// Check if the store holds no versions
    pub fn is_empty(&self) -> bool {
        self.index.read().entries.is_empty()
    }

    /// Check if a version is stored
    pub fn contains(&self, id: &VersionId) -> bool {
        self.index.read().entries.contains_key(id)
    }

    // =========================================================================
    // Save / load / delete
    // =========================================================================

    /// Persist a version, then enforce the caps if auto-cleanup is on
    ///
    /// A delta version's parent must already be stored. Fails with
    /// `Storage` if the payload cannot be serialized or the caps cannot be
    /// met without evicting pinned versions; nothing is written then.
    pub fn save_version(&self, version: Version) -> Result<()> {
        if !version.is_well_formed() {
            return Err(Error::validation(format!(
                "version {} is neither a snapshot with content nor a delta with a parent",
                version.id()
            )));
        }
        let id = version.id();
        let mut record = StoredRecord::encode(&version, self.codec.as_ref())?;

        let mut index = self.index.write();
        if let (false, Some(parent)) = (version.is_snapshot, version.parent_id()) {
            if !index.entries.contains_key(&parent) {
                return Err(Error::not_found(format!(
                    "parent {} of delta version {}",
                    parent, id
                )));
            }
        }

        let plan = if self.config.auto_cleanup {
            let mut plan = self.plan_eviction(&index, Some((&version, &record)))?;
            if !plan.within_limits {
                return Err(Error::storage(format!(
                    "capacity exceeded saving {}: limits are {} versions / {} bytes and \
                     cleanup cannot free enough unpinned versions",
                    id, self.config.max_versions, self.config.max_storage_size
                )));
            }
            // the incoming version itself loses its parent to eviction
            if let Some(pos) = plan.rewrites.iter().position(|(r, _)| *r == id) {
                record = plan.rewrites.remove(pos).1;
            }
            Some(plan)
        } else {
            None
        };
        let bytes = record.to_bytes()?;

        if let Some(plan) = &plan {
            self.write_rewrites(&mut index, &plan.rewrites)?;
        }
        self.backend.put(&id, &bytes)?;
        index.entries.insert(id, IndexEntry::from_record(&record));
        debug!(
            version = %id,
            snapshot = record.is_snapshot,
            stored = record.stored_size(),
            original = record.original_size,
            codec = %record.codec_id,
            "Saved version"
        );

        if let Some(plan) = plan {
            // the version is stored; a failed removal only leaves the store over its caps
            if let Err(e) = self.remove_evicted(&mut index, &plan.evict) {
                warn!(version = %id, error = %e, "Eviction after save failed");
            } else {
                Self::log_eviction(&index, &plan);
            }
        }
        Ok(())
    }

    /// Replace every stored version with `versions`
    ///
    /// All records are encoded before anything is written. New records are
    /// written first; if one fails the writes made so far are undone and
    /// the previous history stays in place. Old records are removed last.
    pub fn replace_all(&self, versions: Vec<Version>) -> Result<()> {
        let mut encoded = Vec::with_capacity(versions.len());
        for version in &versions {
            if !version.is_well_formed() {
                return Err(Error::validation(format!(
                    "version {} is neither a snapshot with content nor a delta with a parent",
                    version.id()
                )));
            }
            let record = StoredRecord::encode(version, self.codec.as_ref())?;
            let bytes = record.to_bytes()?;
            encoded.push((version.id(), record, bytes));
        }

        let mut index = self.index.write();
        let old_keys: HashSet<VersionId> = self.backend.keys()?.into_iter().collect();
        let mut written: Vec<(VersionId, Option<Vec<u8>>)> = Vec::with_capacity(encoded.len());
        for (id, _, bytes) in &encoded {
            match self.put_keeping_previous(id, bytes, old_keys.contains(id)) {
                Ok(previous) => written.push((*id, previous)),
                Err(e) => {
                    self.undo_writes(&written);
                    return Err(e);
                }
            }
        }

        let new_keys: HashSet<VersionId> = encoded.iter().map(|(id, _, _)| *id).collect();
        for id in old_keys.difference(&new_keys) {
            if let Err(e) = self.backend.remove(id) {
                warn!(version = %id, error = %e, "Could not remove replaced version");
            }
        }
        index.entries = encoded
            .iter()
            .map(|(id, record, _)| (*id, IndexEntry::from_record(record)))
            .collect();
        index.pinned.clear();
        info!(versions = index.entries.len(), "Replaced stored versions");
        Ok(())
    }

    /// Store a version as-is, without parent checks or capacity enforcement
    ///
    /// Versions may arrive in any order; see [`replace_all`](Self::replace_all)
    /// for swapping in a whole history.
    pub fn insert_raw(&self, version: Version) -> Result<()> {
        if !version.is_well_formed() {
            return Err(Error::validation(format!(
                "version {} is neither a snapshot with content nor a delta with a parent",
                version.id()
            )));
        }
        let id = version.id();
        let record = StoredRecord::encode(&version, self.codec.as_ref())?;
        let bytes = record.to_bytes()?;
        let mut index = self.index.write();
        self.backend.put(&id, &bytes)?;
        index.entries.insert(id, IndexEntry::from_record(&record));
        Ok(())
    }

    /// Load a stored version, `None` if absent
    pub fn load_version(&self, id: &VersionId) -> Result<Option<Version>> {
        let index = self.index.read();
        self.fetch(&index, id)
    }

    /// Delete a version; absent ids are not an error
    ///
    /// Delta children of the version are rewritten as snapshots first.
    /// Returns whether a version was removed.
    pub fn delete_version(&self, id: &VersionId) -> Result<bool> {
        let mut index = self.index.write();
        if !index.entries.contains_key(id) {
            return Ok(false);
        }

        let pending = HashMap::new();
        let evicted = HashSet::new();
        let mut rewrites = Vec::new();
        for child in Self::delta_children(&index, &pending, &evicted, id) {
            let overlay = Overlay {
                store: self,
                index: &index,
                pending: &pending,
                evicted: &evicted,
            };
            let record = self.materialize(&overlay, &child)?;
            rewrites.push((child, record));
        }

        let plan = EvictionPlan {
            evict: vec![*id],
            rewrites,
            within_limits: true,
        };
        self.execute_plan(&mut index, plan)?;
        Ok(true)
    }

    /// Remove every version
    pub fn clear(&self) -> Result<()> {
        let mut index = self.index.write();
        for id in self.backend.keys()? {
            self.backend.remove(&id)?;
        }
        index.entries.clear();
        index.pinned.clear();
        Ok(())
    }

    /// Rewrite a version's metadata in place
    ///
    /// The id cannot be changed. Returns the updated metadata.
    pub fn update_metadata<F>(&self, id: &VersionId, f: F) -> Result<VersionMetadata>
    where
        F: FnOnce(&mut VersionMetadata),
    {
        let mut index = self.index.write();
        let mut version = self
            .fetch(&index, id)?
            .ok_or_else(|| Error::not_found(format!("version {}", id)))?;
        f(&mut version.metadata);
        version.metadata.id = *id;

        let record = StoredRecord::encode(&version, self.codec.as_ref())?;
        self.backend.put(id, &record.to_bytes()?)?;
        index.entries.insert(*id, IndexEntry::from_record(&record));
        Ok(version.metadata)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Metadata of every version, ordered by sequence (then timestamp)
    pub fn get_version_list(&self) -> Vec<VersionMetadata> {
        let index = self.index.read();
        let mut list: Vec<VersionMetadata> =
            index.entries.values().map(|e| e.metadata.clone()).collect();
        list.sort_by(|a, b| {
            (a.sequence, a.timestamp)
                .cmp(&(b.sequence, b.timestamp))
                .then_with(|| a.id.cmp(&b.id))
        });
        list
    }

    /// Metadata of one version
    pub fn get_metadata(&self, id: &VersionId) -> Option<VersionMetadata> {
        self.index.read().entries.get(id).map(|e| e.metadata.clone())
    }

    /// Sizes and counts computed from the stored records
    pub fn get_storage_metrics(&self) -> StorageMetrics {
        let index = self.index.read();
        let mut metrics = StorageMetrics::default();
        for entry in index.entries.values() {
            metrics.total_versions += 1;
            metrics.total_size += entry.stored_size;
            metrics.original_size += entry.original_size;
            if entry.is_snapshot {
                metrics.snapshot_count += 1;
            } else {
                metrics.delta_count += 1;
            }
        }
        metrics.compression_ratio = if metrics.original_size == 0 {
            1.0
        } else {
            metrics.total_size as f64 / metrics.original_size as f64
        };
        metrics
    }

    /// Versions whose parent is `id`
    pub fn children_of(&self, id: &VersionId) -> Vec<VersionId> {
        let index = self.index.read();
        let mut children: Vec<&IndexEntry> = index
            .entries
            .values()
            .filter(|e| e.metadata.parent_id.as_ref() == Some(id))
            .collect();
        children.sort_by_key(|e| e.metadata.sequence);
        children.into_iter().map(|e| e.metadata.id).collect()
    }

    /// Number of deltas between `id` and its nearest snapshot
    pub fn chain_depth(&self, id: &VersionId) -> Result<usize> {
        let index = self.index.read();
        Self::chain_depth_in(&index, id)
    }

    /// Rebuild the content of a version
    pub fn reconstruct(&self, id: &VersionId) -> Result<Reconstruction> {
        let index = self.index.read();
        let pending = HashMap::new();
        let evicted = HashSet::new();
        let overlay = Overlay {
            store: self,
            index: &index,
            pending: &pending,
            evicted: &evicted,
        };
        reconstruct(&overlay, id)
    }

    // =========================================================================
    // Pinning
    // =========================================================================

    /// Exempt a version from eviction
    pub fn pin(&self, id: VersionId) {
        self.index.write().pinned.insert(id);
    }

    /// Make a version evictable again
    pub fn unpin(&self, id: &VersionId) {
        self.index.write().pinned.remove(id);
    }

    /// Replace the whole pinned set
    pub fn set_pins<I: IntoIterator<Item = VersionId>>(&self, ids: I) {
        self.index.write().pinned = ids.into_iter().collect();
    }

    /// Check whether a version is pinned
    pub fn is_pinned(&self, id: &VersionId) -> bool {
        self.index.read().pinned.contains(id)
    }

    // =========================================================================
    // Cleanup / optimize
    // =========================================================================

    /// Evict oldest unpinned versions until both caps hold
    ///
    /// Best effort: if pinned versions alone exceed a cap, as much as
    /// possible is evicted and `within_limits` is false.
    pub fn cleanup(&self) -> Result<CleanupReport> {
        let mut index = self.index.write();
        let plan = self.plan_eviction(&index, None)?;
        let report = CleanupReport {
            evicted: plan.evict.clone(),
            materialized: plan.rewrites.iter().map(|(id, _)| *id).collect(),
            within_limits: plan.within_limits,
        };
        if !plan.within_limits {
            warn!(
                max_versions = self.config.max_versions,
                max_storage_size = self.config.max_storage_size,
                "Cleanup could not bring the store under its limits"
            );
        }
        self.execute_plan(&mut index, plan)?;
        Ok(report)
    }

    /// Re-encode every record with the current codec and re-snapshot
    /// versions whose chain is longer than `snapshot_interval`
    pub fn optimize_storage(&self) -> Result<OptimizeReport> {
        let mut index = self.index.write();
        let mut ids: Vec<(u64, VersionId)> = index
            .entries
            .values()
            .map(|e| (e.metadata.sequence, e.metadata.id))
            .collect();
        ids.sort();

        let mut report = OptimizeReport {
            size_before: index.entries.values().map(|e| e.stored_size).sum(),
            ..OptimizeReport::default()
        };
        let pending = HashMap::new();
        let evicted = HashSet::new();
        for (_, id) in ids {
            let depth = Self::chain_depth_in(&index, &id)?;
            let record = if depth > self.config.snapshot_interval {
                let overlay = Overlay {
                    store: self,
                    index: &index,
                    pending: &pending,
                    evicted: &evicted,
                };
                let rebuilt = reconstruct(&overlay, &id)?;
                let version = self
                    .fetch(&index, &id)?
                    .ok_or_else(|| Error::not_found(format!("version {}", id)))?
                    .materialize(rebuilt.content);
                report.resnapshotted.push(id);
                StoredRecord::encode(&version, self.codec.as_ref())?
            } else {
                let version = self
                    .fetch(&index, &id)?
                    .ok_or_else(|| Error::not_found(format!("version {}", id)))?;
                StoredRecord::encode(&version, self.codec.as_ref())?
            };
            self.backend.put(&id, &record.to_bytes()?)?;
            index.entries.insert(id, IndexEntry::from_record(&record));
            report.rewritten += 1;
        }
        report.size_after = index.entries.values().map(|e| e.stored_size).sum();
        info!(
            rewritten = report.rewritten,
            resnapshotted = report.resnapshotted.len(),
            size_before = report.size_before,
            size_after = report.size_after,
            "Optimized storage"
        );
        Ok(report)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn fetch(&self, index: &StoreIndex, id: &VersionId) -> Result<Option<Version>> {
        if !index.entries.contains_key(id) {
            return Ok(None);
        }
        match self.backend.get(id)? {
            Some(bytes) => StoredRecord::from_bytes(&bytes)?.into_version().map(Some),
            None => Err(Error::storage(format!(
                "version {} is indexed but missing from the {} backend",
                id,
                self.backend.name()
            ))),
        }
    }

    fn chain_depth_in(index: &StoreIndex, id: &VersionId) -> Result<usize> {
        let mut depth = 0;
        let mut current = *id;
        loop {
            let entry = index
                .entries
                .get(&current)
                .ok_or_else(|| Error::not_found(format!("version {}", current)))?;
            if entry.is_snapshot {
                return Ok(depth);
            }
            depth += 1;
            if depth > index.entries.len() {
                return Err(Error::not_found(format!("delta chain of {} loops", id)));
            }
            current = entry
                .metadata
                .parent_id
                .ok_or_else(|| Error::not_found(format!("delta {} has no parent", current)))?;
        }
    }

    /// Retained delta versions whose parent is `parent`
    fn delta_children(
        index: &StoreIndex,
        pending: &HashMap<VersionId, Version>,
        evicted: &HashSet<VersionId>,
        parent: &VersionId,
    ) -> Vec<VersionId> {
        let mut ids: HashSet<VersionId> = index.entries.keys().copied().collect();
        ids.extend(pending.keys().copied());
        let mut children: Vec<(u64, VersionId)> = ids
            .into_iter()
            .filter(|id| !evicted.contains(id))
            .filter_map(|id| {
                let (is_snapshot, parent_id, sequence) = match pending.get(&id) {
                    Some(v) => (v.is_snapshot, v.metadata.parent_id, v.metadata.sequence),
                    None => {
                        let e = index.entries.get(&id)?;
                        (e.is_snapshot, e.metadata.parent_id, e.metadata.sequence)
                    }
                };
                (!is_snapshot && parent_id.as_ref() == Some(parent)).then_some((sequence, id))
            })
            .collect();
        children.sort();
        children.into_iter().map(|(_, id)| id).collect()
    }

    /// Encode `id` as a snapshot of its reconstructed content
    ///
    /// The parent link is dropped: the parent is about to disappear.
    fn materialize(&self, source: &Overlay<'_>, id: &VersionId) -> Result<StoredRecord> {
        let rebuilt = reconstruct(source, id)?;
        let mut version = source
            .fetch(id)?
            .ok_or_else(|| Error::not_found(format!("version {}", id)))?
            .materialize(rebuilt.content);
        version.metadata.parent_id = None;
        StoredRecord::encode(&version, self.codec.as_ref())
    }

    /// Decide what to evict so that both caps hold
    ///
    /// `incoming` is a version about to be saved: it counts toward the caps,
    /// is never a candidate, and is visible to chain reconstruction.
    fn plan_eviction(
        &self,
        index: &StoreIndex,
        incoming: Option<(&Version, &StoredRecord)>,
    ) -> Result<EvictionPlan> {
        let policy = CapacityPolicy::from(&self.config);

        let mut sizes: HashMap<VersionId, usize> = index
            .entries
            .iter()
            .map(|(id, e)| (*id, e.stored_size))
            .collect();
        let mut pending: HashMap<VersionId, Version> = HashMap::new();
        let mut exempt = index.pinned.clone();
        if let Some((version, record)) = incoming {
            sizes.insert(version.id(), record.stored_size());
            pending.insert(version.id(), version.clone());
            exempt.insert(version.id());
        }

        let total = |sizes: &HashMap<VersionId, usize>| sizes.values().sum::<usize>();
        if !policy.is_exceeded(sizes.len(), total(&sizes)) {
            return Ok(EvictionPlan {
                within_limits: true,
                ..EvictionPlan::default()
            });
        }

        let candidates = eviction_order(
            index
                .entries
                .values()
                .map(|e| (e.metadata.id, e.metadata.timestamp, e.metadata.sequence)),
            &exempt,
        );

        let mut evicted: HashSet<VersionId> = HashSet::new();
        let mut evict = Vec::new();
        let mut rewrites: HashMap<VersionId, StoredRecord> = HashMap::new();
        for candidate in candidates {
            if !policy.is_exceeded(sizes.len(), total(&sizes)) {
                break;
            }
            for child in Self::delta_children(index, &pending, &evicted, &candidate) {
                let overlay = Overlay {
                    store: self,
                    index,
                    pending: &pending,
                    evicted: &evicted,
                };
                let record = self.materialize(&overlay, &child)?;
                let version = record.clone().into_version()?;
                sizes.insert(child, record.stored_size());
                pending.insert(child, version);
                rewrites.insert(child, record);
            }
            sizes.remove(&candidate);
            rewrites.remove(&candidate);
            pending.remove(&candidate);
            evicted.insert(candidate);
            evict.push(candidate);
        }

        let within_limits = !policy.is_exceeded(sizes.len(), total(&sizes));
        let mut rewrites: Vec<(VersionId, StoredRecord)> = rewrites.into_iter().collect();
        rewrites.sort_by_key(|(_, r)| r.metadata.sequence);
        Ok(EvictionPlan {
            evict,
            rewrites,
            within_limits,
        })
    }

    fn execute_plan(&self, index: &mut StoreIndex, plan: EvictionPlan) -> Result<()> {
        self.write_rewrites(index, &plan.rewrites)?;
        self.remove_evicted(index, &plan.evict)?;
        Self::log_eviction(index, &plan);
        Ok(())
    }

    /// Write materialized children; each one is content-equivalent to the
    /// record it replaces, so stopping part way is harmless
    fn write_rewrites(
        &self,
        index: &mut StoreIndex,
        rewrites: &[(VersionId, StoredRecord)],
    ) -> Result<()> {
        for (id, record) in rewrites {
            self.backend.put(id, &record.to_bytes()?)?;
            index.entries.insert(*id, IndexEntry::from_record(record));
            debug!(version = %id, "Materialized delta version as snapshot");
        }
        Ok(())
    }

    /// Remove evicted versions; every retained child is already a snapshot
    fn remove_evicted(&self, index: &mut StoreIndex, evict: &[VersionId]) -> Result<()> {
        for id in evict {
            self.backend.remove(id)?;
            index.entries.remove(id);
            index.pinned.remove(id);
        }
        Ok(())
    }

    fn log_eviction(index: &StoreIndex, plan: &EvictionPlan) {
        if !plan.evict.is_empty() {
            info!(
                evicted = plan.evict.len(),
                materialized = plan.rewrites.len(),
                remaining = index.entries.len(),
                "Evicted versions"
            );
        }
    }

    /// Write `bytes` under `id`, returning what was there before
    fn put_keeping_previous(
        &self,
        id: &VersionId,
        bytes: &[u8],
        existed: bool,
    ) -> Result<Option<Vec<u8>>> {
        let previous = if existed { self.backend.get(id)? } else { None };
        self.backend.put(id, bytes)?;
        Ok(previous)
    }

    fn undo_writes(&self, written: &[(VersionId, Option<Vec<u8>>)]) {
        for (id, previous) in written.iter().rev() {
            let undone = match previous {
                Some(bytes) => self.backend.put(id, bytes),
                None => self.backend.remove(id).map(|_| ()),
            };
            if let Err(e) = undone {
                warn!(version = %id, error = %e, "Could not undo write");
            }
        }
    }
}
