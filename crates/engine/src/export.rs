//! History export and import
//!
//! An export is a self-contained JSON document holding every stored
//! version (in history order), the branch and tag bookkeeping, the
//! configuration and the current pointers. Importing one replaces the
//! manager's history wholesale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use vellum_core::{Branch, BranchId, Error, Result, Tag, Timestamp, Version, VersionId};

use crate::config::HistoryConfig;
use crate::manager::{VersionHistoryManager, DEFAULT_BRANCH};

/// Current export document format
pub const EXPORT_FORMAT_VERSION: u32 = 1;

fn default_format_version() -> u32 {
    EXPORT_FORMAT_VERSION
}

/// Serializable snapshot of a whole history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryExport {
    /// Document format version
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    /// Every stored version, oldest first
    pub versions: Vec<Version>,
    /// Branches
    #[serde(default)]
    pub branches: Vec<Branch>,
    /// Tags
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Configuration in effect at export time
    #[serde(default)]
    pub config: HistoryConfig,
    /// When the export was taken
    #[serde(default = "Utc::now")]
    pub exported_at: DateTime<Utc>,
    /// Current version at export time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version_id: Option<VersionId>,
    /// Current branch at export time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_branch_id: Option<BranchId>,
}

impl VersionHistoryManager {
    /// Capture the whole history
    pub fn export_version_history(&self) -> Result<HistoryExport> {
        let state = self.shared.state.lock();
        let mut versions = Vec::new();
        for metadata in self.shared.store.get_version_list() {
            if let Some(version) = self.shared.store.load_version(&metadata.id)? {
                versions.push(version);
            }
        }
        let mut branches: Vec<Branch> = state.branches.values().cloned().collect();
        branches.sort_by(|a, b| (a.created_at, &a.name).cmp(&(b.created_at, &b.name)));
        let mut tags: Vec<Tag> = state.tags.values().cloned().collect();
        tags.sort_by(|a, b| (a.created_at, &a.name).cmp(&(b.created_at, &b.name)));

        Ok(HistoryExport {
            format_version: EXPORT_FORMAT_VERSION,
            versions,
            branches,
            tags,
            config: state.config.clone(),
            exported_at: Utc::now(),
            current_version_id: state.current_version,
            current_branch_id: Some(state.current_branch),
        })
    }

    /// Capture the whole history as pretty-printed JSON
    pub fn export_json(&self) -> Result<String> {
        let export = self.export_version_history()?;
        serde_json::to_string_pretty(&export)
            .map_err(|e| Error::storage(format!("Failed to serialize history export: {}", e)))
    }

    /// Replace the history with an exported one
    ///
    /// Fails with `Validation`, before anything is touched, if `doc` has no
    /// `versions` list or does not describe a history. If the store fails
    /// while writing, the previous history stays in place. The store's
    /// settings (caps, compression, snapshot interval) stay those it was
    /// opened with; the rest of the exported configuration is adopted.
    /// Returns the number of imported versions.
    pub fn import_version_history(&self, doc: &serde_json::Value) -> Result<usize> {
        if !doc.get("versions").map_or(false, serde_json::Value::is_array) {
            return Err(Error::validation(
                "history import needs a `versions` list",
            ));
        }
        let export: HistoryExport = serde_json::from_value(doc.clone())
            .map_err(|e| Error::validation(format!("malformed history export: {}", e)))?;
        if export.format_version > EXPORT_FORMAT_VERSION {
            return Err(Error::validation(format!(
                "history export format {} is newer than supported {}",
                export.format_version, EXPORT_FORMAT_VERSION
            )));
        }
        export.config.validate()?;
        if let Some(bad) = export.versions.iter().find(|v| !v.is_well_formed()) {
            return Err(Error::validation(format!(
                "imported version {} is neither a snapshot with content nor a delta with a parent",
                bad.id()
            )));
        }

        let mut state = self.shared.state.lock();
        let store = &self.shared.store;
        let count = export.versions.len();
        store.replace_all(export.versions)?;

        let mut branches: BTreeMap<BranchId, Branch> =
            export.branches.into_iter().map(|b| (b.id, b)).collect();
        for branch in branches.values_mut() {
            branch.head_version_id = branch.head_version_id.filter(|id| store.contains(id));
        }
        if !branches.values().any(|b| b.name == DEFAULT_BRANCH) {
            let main = Branch {
                id: BranchId::new(),
                name: DEFAULT_BRANCH.to_string(),
                head_version_id: store.get_version_list().last().map(|m| m.id),
                created_at: Timestamp::now(),
            };
            branches.insert(main.id, main);
        }
        let current_branch = export
            .current_branch_id
            .filter(|id| branches.contains_key(id))
            .or_else(|| {
                branches
                    .values()
                    .find(|b| b.name == DEFAULT_BRANCH)
                    .map(|b| b.id)
            })
            .unwrap_or_else(BranchId::new);

        let current_version = export
            .current_version_id
            .filter(|id| store.contains(id))
            .or_else(|| store.get_version_list().last().map(|m| m.id));
        let head_content = match current_version {
            Some(id) => match store.reconstruct(&id) {
                Ok(rebuilt) => Some(rebuilt.content),
                Err(e) => {
                    warn!(version = %id, error = %e, "Imported current version cannot be rebuilt");
                    None
                }
            },
            None => None,
        };

        state.config = export.config.with_store_settings(store.config());
        state.branches = branches;
        state.current_branch = current_branch;
        state.tags = export
            .tags
            .into_iter()
            .filter(|t| store.contains(&t.version_id))
            .map(|t| (t.id, t))
            .collect();
        state.reset_to(head_content.as_ref().and(current_version), head_content);
        state.next_sequence = store
            .get_version_list()
            .last()
            .map_or(0, |m| m.sequence + 1);
        self.shared.sync_pins(&state);

        info!(versions = count, branches = state.branches.len(), "Imported version history");
        Ok(count)
    }

    /// Replace the history with one exported by [`export_json`](Self::export_json)
    pub fn import_json(&self, text: &str) -> Result<usize> {
        let doc: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| Error::validation(format!("history export is not JSON: {}", e)))?;
        self.import_version_history(&doc)
    }
}
