//! Version history manager
//!
//! [`VersionHistoryManager`] ties the diff engine to the version store. It
//! owns the working copy and the current-version pointer, decides whether a
//! new version is stored as a snapshot or as a delta, and keeps the
//! in-memory branch and tag bookkeeping.
//!
//! # Serialization
//!
//! All state lives behind one mutex which is held for the whole of a
//! create, restore, branch switch or import. Two threads calling
//! [`create_version`](VersionHistoryManager::create_version) therefore see a
//! consistent current version, and each result chains onto the other.
//!
//! # Snapshot policy
//!
//! A version is stored in full when it has no parent, when its sequence
//! number is a multiple of `snapshot_interval`, when the delta is classified
//! [`ChangeImpact::Major`], when the diff was cut short by the depth guard,
//! or when the caller forces it. Everything else is stored as a delta
//! against the current version.

use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use vellum_core::{
    content_checksum, Branch, BranchId, ChangeImpact, ChangeType, Error, JsonValue, Result,
    StorageMetrics, Tag, TagId, TagType, Timestamp, Version, VersionDelta, VersionId,
    VersionLabel, VersionMetadata, VersionStatus,
};
use vellum_diff::{apply_delta, DiffEngine};
use vellum_storage::{
    codec_for_level, CleanupReport, FileBackend, OptimizeReport, StorageBackend, VersionStore,
};

use crate::autosave::AutoSaveHandle;
use crate::config::HistoryConfig;

/// Name of the branch every history starts on
pub const DEFAULT_BRANCH: &str = "main";

/// Caller-supplied metadata for a new version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionOverrides {
    /// Commit message
    pub message: Option<String>,
    /// Author
    pub author: Option<String>,
    /// Label bump to apply; `Patch` when unset
    pub change_type: Option<ChangeType>,
    /// Names of custom tags to attach to the new version
    pub tags: Vec<String>,
    /// Store the version in full regardless of the snapshot policy
    pub force_snapshot: bool,
}

impl VersionOverrides {
    /// Set the commit message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the author
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the change type
    pub fn change_type(mut self, change_type: ChangeType) -> Self {
        self.change_type = Some(change_type);
        self
    }

    /// Attach a tag
    pub fn tag(mut self, name: impl Into<String>) -> Self {
        self.tags.push(name.into());
        self
    }

    /// Force a snapshot
    pub fn force_snapshot(mut self) -> Self {
        self.force_snapshot = true;
        self
    }
}

/// Criteria for [`VersionHistoryManager::get_version_history`]
///
/// Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    /// Only versions created on this branch
    pub branch_id: Option<BranchId>,
    /// Only versions with this change type
    pub change_type: Option<ChangeType>,
    /// Only versions carrying the tag with this name
    pub tag: Option<String>,
}

pub(crate) struct HistoryState {
    pub(crate) config: HistoryConfig,
    /// Working copy, canonical text
    pub(crate) working: Option<String>,
    /// Content the store rebuilds for the current version; diffs start here
    pub(crate) head_content: Option<String>,
    /// Text last committed or restored; unsaved changes are measured from it
    pub(crate) committed: Option<String>,
    pub(crate) current_version: Option<VersionId>,
    pub(crate) current_branch: BranchId,
    pub(crate) branches: BTreeMap<BranchId, Branch>,
    pub(crate) tags: BTreeMap<TagId, Tag>,
    pub(crate) next_sequence: u64,
}

impl HistoryState {
    pub(crate) fn new(config: HistoryConfig, main: Branch) -> Self {
        let current_branch = main.id;
        HistoryState {
            config,
            working: None,
            head_content: None,
            committed: None,
            current_version: None,
            current_branch,
            branches: BTreeMap::from([(main.id, main)]),
            tags: BTreeMap::new(),
            next_sequence: 0,
        }
    }

    pub(crate) fn has_unsaved_changes(&self) -> bool {
        self.working.is_some() && self.working != self.committed
    }

    /// Point at `id`, whose stored content is `content`, as a clean working copy
    pub(crate) fn reset_to(&mut self, id: Option<VersionId>, content: Option<String>) {
        self.current_version = id;
        self.working = content.clone();
        self.committed = content.clone();
        self.head_content = content;
    }

    pub(crate) fn branch_named(&self, name: &str) -> Option<&Branch> {
        self.branches.values().find(|b| b.name == name)
    }

    pub(crate) fn tag_named(&self, name: &str) -> Option<&Tag> {
        self.tags.values().find(|t| t.name == name)
    }

    /// Versions the store must never evict
    ///
    /// `incoming` is a version about to become current: it replaces the
    /// current version and the head of the current branch.
    pub(crate) fn protected_versions(&self, incoming: Option<VersionId>) -> HashSet<VersionId> {
        let mut ids: HashSet<VersionId> = self.tags.values().map(|t| t.version_id).collect();
        for branch in self.branches.values() {
            if incoming.is_some() && branch.id == self.current_branch {
                continue;
            }
            ids.extend(branch.head_version_id);
        }
        ids.extend(incoming.or(self.current_version));
        ids
    }
}

/// Check a new tag name against the existing tags
pub(crate) fn check_tag_name(state: &HistoryState, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("tag name must not be empty"));
    }
    if state.tag_named(name).is_some() {
        return Err(Error::validation(format!("tag '{}' already exists", name)));
    }
    Ok(())
}

pub(crate) struct Shared {
    pub(crate) store: VersionStore,
    pub(crate) state: Mutex<HistoryState>,
}

impl Shared {
    pub(crate) fn sync_pins(&self, state: &HistoryState) {
        self.store.set_pins(state.protected_versions(None));
    }

    /// Create a version from `value` on the current branch
    ///
    /// `keep` is an extra version that must survive any eviction the save
    /// triggers. State is only touched once the store accepted the version.
    pub(crate) fn create_locked(
        &self,
        state: &mut HistoryState,
        value: JsonValue,
        overrides: VersionOverrides,
        keep: Option<VersionId>,
    ) -> Result<Version> {
        if !overrides.tags.is_empty() && !state.config.enable_tagging {
            return Err(Error::validation("tagging is disabled"));
        }
        let mut seen = HashSet::new();
        for name in &overrides.tags {
            check_tag_name(state, name)?;
            if !seen.insert(name.as_str()) {
                return Err(Error::validation(format!("tag '{}' given twice", name)));
            }
        }

        let canonical = value.to_json_string();
        let parent = match state.current_version {
            Some(id) => {
                let metadata = self
                    .store
                    .get_metadata(&id)
                    .ok_or_else(|| Error::not_found(format!("current version {}", id)))?;
                let head = match &state.head_content {
                    Some(text) => JsonValue::parse(text)?,
                    None => self.store.reconstruct(&id)?.value,
                };
                let engine = DiffEngine::new(state.config.diff.clone());
                let delta = engine.calculate_diff(&head, &value);
                Some((metadata, head, delta))
            }
            None => None,
        };

        let sequence = state.next_sequence;
        let impact = parent
            .as_ref()
            .map_or(ChangeImpact::Minimal, |(_, _, delta)| delta.impact());
        let truncated = parent.as_ref().map_or(false, |(_, _, delta)| delta.truncated);
        let is_snapshot = parent.is_none()
            || sequence % state.config.snapshot_interval as u64 == 0
            || impact == ChangeImpact::Major
            || truncated
            || overrides.force_snapshot;

        // A delta version holds what replaying its delta gives; numeric edits
        // below the diff precision are not in it.
        let stored = match &parent {
            Some((_, head, delta)) if !is_snapshot => apply_delta(head, delta)
                .map_err(|e| Error::storage(format!("delta does not apply: {}", e)))?
                .to_json_string(),
            _ => canonical.clone(),
        };

        let change_type = overrides.change_type.unwrap_or_default();
        let version_label = parent
            .as_ref()
            .map_or(VersionLabel::INITIAL, |(m, _, _)| m.version_label.bump(change_type));
        let now = Timestamp::now();
        let id = VersionId::new();
        let new_tags: Vec<Tag> = overrides
            .tags
            .iter()
            .map(|name| Tag {
                id: TagId::new(),
                name: name.clone(),
                version_id: id,
                tag_type: TagType::Custom,
                created_at: now,
            })
            .collect();

        let mut metadata = VersionMetadata {
            id,
            sequence,
            version_label,
            timestamp: now,
            message: overrides.message,
            author: overrides.author,
            change_type,
            change_impact: impact,
            status: if new_tags.is_empty() {
                VersionStatus::Committed
            } else {
                VersionStatus::Tagged
            },
            branch_id: state.current_branch,
            parent_id: parent.as_ref().map(|(m, _, _)| m.id),
            tags: new_tags.iter().map(|t| t.id).collect::<BTreeSet<_>>(),
            content_size: stored.len(),
            delta_size: 0,
            checksum: content_checksum(&stored),
        };

        let version = match parent {
            Some((_, _, delta)) if !is_snapshot => {
                metadata.delta_size = serde_json::to_vec(&delta)?.len();
                Version::from_delta(metadata, delta)
            }
            _ => Version::snapshot(metadata, canonical.clone()),
        };

        let mut pins = state.protected_versions(Some(id));
        pins.extend(keep);
        self.store.set_pins(pins);
        if let Err(e) = self.store.save_version(version.clone()) {
            self.sync_pins(state);
            return Err(e);
        }

        state.current_version = Some(id);
        state.head_content = Some(stored);
        state.committed = Some(canonical.clone());
        state.working = Some(canonical);
        state.next_sequence = sequence + 1;
        let current_branch = state.current_branch;
        if let Some(branch) = state.branches.get_mut(&current_branch) {
            branch.head_version_id = Some(id);
        }
        for tag in new_tags {
            state.tags.insert(tag.id, tag);
        }
        if keep.is_some() {
            self.sync_pins(state);
        }

        info!(
            version = %id,
            label = %version.metadata.version_label,
            sequence,
            snapshot = version.is_snapshot,
            impact = ?impact,
            "Created version"
        );
        Ok(version)
    }

    /// Commit the working copy if it differs from the current version
    pub(crate) fn auto_save(&self) -> Result<Option<Version>> {
        let mut state = self.state.lock();
        if !state.has_unsaved_changes() {
            return Ok(None);
        }
        let Some(text) = state.working.clone() else {
            return Ok(None);
        };
        let value = JsonValue::parse(&text)?;
        let overrides = VersionOverrides::default()
            .message("Auto-save")
            .change_type(ChangeType::Auto);
        self.create_locked(&mut state, value, overrides, None).map(Some)
    }
}

/// Version history of a single JSON document
pub struct VersionHistoryManager {
    pub(crate) shared: Arc<Shared>,
    pub(crate) auto_save: Mutex<Option<AutoSaveHandle>>,
}

impl std::fmt::Debug for VersionHistoryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("VersionHistoryManager")
            .field("store", &self.shared.store)
            .field("current_version", &state.current_version)
            .field("current_branch", &state.current_branch)
            .field("auto_save", &self.auto_save.lock().is_some())
            .finish()
    }
}

impl VersionHistoryManager {
    /// Manager over an empty in-memory store
    pub fn new(config: HistoryConfig) -> Result<Self> {
        config.validate()?;
        let store = VersionStore::in_memory(config.store_config());
        Self::with_store(config, store)
    }

    /// Manager over a directory of version files
    ///
    /// Versions already in the directory are picked up; the newest becomes
    /// current. Branches and tags are not stored there, only in exports.
    pub fn open(config: HistoryConfig, dir: impl AsRef<Path>) -> Result<Self> {
        config.validate()?;
        let backend: Box<dyn StorageBackend> = Box::new(FileBackend::open(dir)?);
        let store = VersionStore::open(
            backend,
            codec_for_level(config.compression_level),
            config.store_config(),
        )?;
        Self::with_store(config, store)
    }

    /// Manager over an already opened store
    ///
    /// The store's own settings override the matching fields of `config`.
    pub fn with_store(config: HistoryConfig, store: VersionStore) -> Result<Self> {
        let config = config.with_store_settings(store.config());
        config.validate()?;
        let latest = store.get_version_list().pop();
        let main = Branch {
            id: latest.as_ref().map_or_else(BranchId::new, |m| m.branch_id),
            name: DEFAULT_BRANCH.to_string(),
            head_version_id: latest.as_ref().map(|m| m.id),
            created_at: Timestamp::now(),
        };
        let mut state = HistoryState::new(config, main);
        if let Some(latest) = latest {
            let content = store.reconstruct(&latest.id)?.content;
            state.reset_to(Some(latest.id), Some(content));
            state.next_sequence = latest.sequence + 1;
            debug!(version = %latest.id, "Resumed history at newest version");
        }

        let shared = Arc::new(Shared {
            store,
            state: Mutex::new(state),
        });
        shared.sync_pins(&shared.state.lock());
        Ok(VersionHistoryManager {
            shared,
            auto_save: Mutex::new(None),
        })
    }

    /// Current configuration
    pub fn config(&self) -> HistoryConfig {
        self.shared.state.lock().config.clone()
    }

    /// Underlying store
    pub fn store(&self) -> &VersionStore {
        &self.shared.store
    }

    // =========================================================================
    // Working copy
    // =========================================================================

    /// Replace the working copy; fails with `Validation` on malformed JSON
    pub fn update_content(&self, text: &str) -> Result<()> {
        let canonical = JsonValue::parse(text)?.to_json_string();
        self.shared.state.lock().working = Some(canonical);
        Ok(())
    }

    /// Working copy, canonical text
    pub fn current_content(&self) -> Option<String> {
        self.shared.state.lock().working.clone()
    }

    /// Id of the current version
    pub fn current_version_id(&self) -> Option<VersionId> {
        self.shared.state.lock().current_version
    }

    /// Whether the working copy differs from the current version
    pub fn has_unsaved_changes(&self) -> bool {
        self.shared.state.lock().has_unsaved_changes()
    }

    // =========================================================================
    // Versions
    // =========================================================================

    /// Record `content` as a new version on the current branch
    ///
    /// Fails with `Validation` if `content` is not JSON or a tag override is
    /// rejected, and with `Storage` if the store refuses the version. No
    /// state changes on failure.
    pub fn create_version(&self, content: &str, overrides: VersionOverrides) -> Result<Version> {
        let value = JsonValue::parse(content)?;
        let mut state = self.shared.state.lock();
        self.shared.create_locked(&mut state, value, overrides, None)
    }

    /// Stored record of a version
    pub fn get_version(&self, id: &VersionId) -> Result<Option<Version>> {
        self.shared.store.load_version(id)
    }

    /// Rebuilt content of a version, without touching the working copy
    pub fn get_version_content(&self, id: &VersionId) -> Result<String> {
        Ok(self.shared.store.reconstruct(id)?.content)
    }

    /// Delta turning version `from` into version `to`
    pub fn compare_versions(&self, from: &VersionId, to: &VersionId) -> Result<VersionDelta> {
        let old = self.shared.store.reconstruct(from)?.value;
        let new = self.shared.store.reconstruct(to)?.value;
        let engine = DiffEngine::new(self.shared.state.lock().config.diff.clone());
        Ok(engine.calculate_diff(&old, &new))
    }

    /// Delete a version other than the current one
    ///
    /// Delta children are rewritten as snapshots, tags on the version are
    /// dropped and branch heads pointing at it fall back to its parent.
    /// Returns whether a version was removed.
    pub fn delete_version(&self, id: &VersionId) -> Result<bool> {
        let mut state = self.shared.state.lock();
        if state.current_version == Some(*id) {
            return Err(Error::validation(format!(
                "version {} is the current version and cannot be deleted",
                id
            )));
        }
        let Some(metadata) = self.shared.store.get_metadata(id) else {
            return Ok(false);
        };
        if !self.shared.store.delete_version(id)? {
            return Ok(false);
        }

        let fallback = metadata
            .parent_id
            .filter(|p| self.shared.store.contains(p));
        for branch in state.branches.values_mut() {
            if branch.head_version_id == Some(*id) {
                branch.head_version_id = fallback;
            }
        }
        state.tags.retain(|_, t| t.version_id != *id);
        self.shared.sync_pins(&state);
        info!(version = %id, "Deleted version");
        Ok(true)
    }

    /// Metadata of every version, oldest first
    pub fn get_version_list(&self) -> Vec<VersionMetadata> {
        self.shared.store.get_version_list()
    }

    /// Metadata of the versions matching `filter`, oldest first
    pub fn get_version_history(&self, filter: &HistoryFilter) -> Vec<VersionMetadata> {
        let tag_id = match &filter.tag {
            Some(name) => match self.shared.state.lock().tag_named(name) {
                Some(tag) => Some(tag.id),
                None => return Vec::new(),
            },
            None => None,
        };
        self.shared
            .store
            .get_version_list()
            .into_iter()
            .filter(|m| filter.branch_id.map_or(true, |b| m.branch_id == b))
            .filter(|m| filter.change_type.map_or(true, |c| m.change_type == c))
            .filter(|m| tag_id.map_or(true, |t| m.tags.contains(&t)))
            .collect()
    }

    // =========================================================================
    // Storage
    // =========================================================================

    /// Sizes and counts of the stored versions
    pub fn storage_metrics(&self) -> StorageMetrics {
        self.shared.store.get_storage_metrics()
    }

    /// Evict old versions until the caps hold
    pub fn cleanup(&self) -> Result<CleanupReport> {
        let state = self.shared.state.lock();
        self.shared.sync_pins(&state);
        self.shared.store.cleanup()
    }

    /// Recompress every record and shorten long delta chains
    pub fn optimize_storage(&self) -> Result<OptimizeReport> {
        let _state = self.shared.state.lock();
        self.shared.store.optimize_storage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manager() -> VersionHistoryManager {
        VersionHistoryManager::new(HistoryConfig {
            auto_save_interval_ms: 0,
            ..HistoryConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_first_version_is_initial_snapshot() {
        let m = manager();
        let v = m
            .create_version(r#"{"b": 1, "a": 2}"#, VersionOverrides::default())
            .unwrap();
        assert!(v.is_snapshot);
        assert_eq!(v.metadata.version_label, VersionLabel::INITIAL);
        assert_eq!(v.metadata.parent_id, None);
        assert_eq!(v.full_content.as_deref(), Some(r#"{"a":2,"b":1}"#));
        assert_eq!(v.metadata.checksum, content_checksum(r#"{"a":2,"b":1}"#));
        assert_eq!(m.current_version_id(), Some(v.id()));
        assert!(!m.has_unsaved_changes());
    }

    #[test]
    fn test_label_bumps_follow_change_type() {
        let m = manager();
        m.create_version("{}", VersionOverrides::default()).unwrap();
        let minor = m
            .create_version(r#"{"a":1}"#, VersionOverrides::default().change_type(ChangeType::Minor))
            .unwrap();
        assert_eq!(minor.metadata.version_label, VersionLabel::new(1, 1, 0));
        let patch = m
            .create_version(r#"{"a":2}"#, VersionOverrides::default())
            .unwrap();
        assert_eq!(patch.metadata.version_label, VersionLabel::new(1, 1, 1));
        let major = m
            .create_version(r#"{"a":3}"#, VersionOverrides::default().change_type(ChangeType::Major))
            .unwrap();
        assert_eq!(major.metadata.version_label, VersionLabel::new(2, 0, 0));
    }

    #[test]
    fn test_unchanged_content_still_recorded() {
        let m = manager();
        let first = m.create_version("[1,2]", VersionOverrides::default()).unwrap();
        let second = m.create_version("[1, 2]", VersionOverrides::default()).unwrap();
        assert!(!second.is_snapshot);
        assert_eq!(second.parent_id(), Some(first.id()));
        assert!(second.delta.as_ref().unwrap().is_empty());
        assert_eq!(second.metadata.change_impact, ChangeImpact::Minimal);
    }

    #[test]
    fn test_sub_precision_edit_is_stored_as_replayed() {
        let m = manager();
        let first = m.create_version(r#"{"x":1.5}"#, VersionOverrides::default()).unwrap();
        let second = m
            .create_version(r#"{"x":1.50006}"#, VersionOverrides::default())
            .unwrap();
        assert!(second.delta.as_ref().unwrap().is_empty());

        let stored = m.get_version_content(&second.id()).unwrap();
        assert_eq!(stored, m.get_version_content(&first.id()).unwrap());
        assert_eq!(second.metadata.checksum, content_checksum(&stored));
        assert_eq!(m.current_content().as_deref(), Some(r#"{"x":1.50006}"#));
        assert!(!m.has_unsaved_changes());

        // the next diff starts from the stored value and catches the sum
        let third = m
            .create_version(r#"{"x":1.50012}"#, VersionOverrides::default())
            .unwrap();
        assert_eq!(third.delta.as_ref().unwrap().total_operations, 1);
        assert_eq!(m.get_version_content(&third.id()).unwrap(), r#"{"x":1.50012}"#);
    }

    #[test]
    fn test_malformed_content_changes_nothing() {
        let m = manager();
        m.create_version(r#"{"a":1}"#, VersionOverrides::default()).unwrap();
        let before = m.current_version_id();
        assert!(m
            .create_version("{not json", VersionOverrides::default())
            .unwrap_err()
            .is_validation());
        assert!(m.update_content("[").unwrap_err().is_validation());
        assert_eq!(m.current_version_id(), before);
        assert_eq!(m.get_version_list().len(), 1);
        assert_eq!(m.current_content().as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_working_copy_tracks_unsaved_changes() {
        let m = manager();
        assert!(!m.has_unsaved_changes());
        m.update_content(r#"{"x": 1}"#).unwrap();
        assert!(m.has_unsaved_changes());
        m.create_version(r#"{"x":1}"#, VersionOverrides::default()).unwrap();
        assert!(!m.has_unsaved_changes());
        // same document, different formatting
        m.update_content("{ \"x\" : 1 }").unwrap();
        assert!(!m.has_unsaved_changes());
    }

    #[test]
    fn test_forced_and_major_snapshots() {
        let m = manager();
        m.create_version(r#"{"a":1}"#, VersionOverrides::default()).unwrap();
        let forced = m
            .create_version(r#"{"a":2}"#, VersionOverrides::default().force_snapshot())
            .unwrap();
        assert!(forced.is_snapshot);
        assert!(forced.parent_id().is_some());

        let wide: serde_json::Map<String, serde_json::Value> =
            (0..60).map(|i| (format!("k{}", i), json!(i))).collect();
        let major = m
            .create_version(&serde_json::Value::Object(wide).to_string(), VersionOverrides::default())
            .unwrap();
        assert_eq!(major.metadata.change_impact, ChangeImpact::Major);
        assert!(major.is_snapshot);
    }

    #[test]
    fn test_delete_current_version_is_refused() {
        let m = manager();
        let first = m.create_version("[1]", VersionOverrides::default()).unwrap();
        let second = m.create_version("[1,2]", VersionOverrides::default()).unwrap();
        assert!(m.delete_version(&second.id()).unwrap_err().is_validation());
        assert!(m.delete_version(&first.id()).unwrap());
        assert!(!m.delete_version(&first.id()).unwrap());
        assert_eq!(m.get_version_content(&second.id()).unwrap(), "[1,2]");
    }

    #[test]
    fn test_history_filter() {
        let m = manager();
        m.create_version("[1]", VersionOverrides::default()).unwrap();
        m.create_version("[2]", VersionOverrides::default().change_type(ChangeType::Minor))
            .unwrap();
        m.create_version("[3]", VersionOverrides::default().tag("keep")).unwrap();

        let minor = m.get_version_history(&HistoryFilter {
            change_type: Some(ChangeType::Minor),
            ..HistoryFilter::default()
        });
        assert_eq!(minor.len(), 1);
        let tagged = m.get_version_history(&HistoryFilter {
            tag: Some("keep".into()),
            ..HistoryFilter::default()
        });
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].status, VersionStatus::Tagged);
        assert!(m
            .get_version_history(&HistoryFilter {
                tag: Some("missing".into()),
                ..HistoryFilter::default()
            })
            .is_empty());
        assert_eq!(m.get_version_history(&HistoryFilter::default()).len(), 3);
    }

    #[test]
    fn test_compare_versions() {
        let m = manager();
        let a = m.create_version(r#"{"a":1,"b":2}"#, VersionOverrides::default()).unwrap();
        let b = m.create_version(r#"{"a":1,"b":3,"c":4}"#, VersionOverrides::default()).unwrap();
        let delta = m.compare_versions(&a.id(), &b.id()).unwrap();
        assert_eq!(delta.total_operations, 2);
        assert!(m.compare_versions(&a.id(), &VersionId::new()).unwrap_err().is_not_found());
    }
}
