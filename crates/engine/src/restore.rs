//! Restore by replay
//!
//! Restoring rebuilds the target's content from its nearest snapshot and
//! the deltas after it, optionally validates and backs up, and only then
//! moves the current-version pointer. Any failure before that point leaves
//! the manager exactly as it was.

use tracing::{info, warn};

use vellum_core::{content_checksum, ChangeType, Error, JsonValue, Result, VersionId};

use crate::manager::{HistoryState, Shared, VersionHistoryManager, VersionOverrides};

/// How to restore a version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOptions {
    /// Version to restore
    pub target_version_id: VersionId,
    /// Commit unsaved working changes as a backup version first
    pub create_backup: bool,
    /// Fail unless the rebuilt content parses as JSON
    pub validate_before_restore: bool,
    /// Keep the working copy; only the current-version pointer moves
    pub preserve_working_changes: bool,
}

impl RestoreOptions {
    /// Restore `target` with a backup and validation, replacing the working copy
    pub fn new(target: VersionId) -> Self {
        RestoreOptions {
            target_version_id: target,
            create_backup: true,
            validate_before_restore: true,
            preserve_working_changes: false,
        }
    }

    /// Enable or disable the backup version
    pub fn with_backup(mut self, create_backup: bool) -> Self {
        self.create_backup = create_backup;
        self
    }

    /// Enable or disable validation
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate_before_restore = validate;
        self
    }

    /// Keep the working copy instead of replacing it
    pub fn preserving_working_changes(mut self) -> Self {
        self.preserve_working_changes = true;
        self
    }
}

/// Outcome of a restore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreResult {
    /// Restored version
    pub version_id: VersionId,
    /// Rebuilt content
    pub content: String,
    /// Backup version created from unsaved changes
    pub backup_version_id: Option<VersionId>,
    /// Deltas replayed on top of the nearest snapshot
    pub replayed_deltas: usize,
    /// Whether the rebuilt content matches the stored checksum
    pub checksum_verified: bool,
}

impl Shared {
    pub(crate) fn restore_locked(
        &self,
        state: &mut HistoryState,
        options: &RestoreOptions,
    ) -> Result<RestoreResult> {
        let target = options.target_version_id;
        let metadata = self
            .store
            .get_metadata(&target)
            .ok_or_else(|| Error::not_found(format!("version {}", target)))?;
        let rebuilt = self.store.reconstruct(&target)?;

        if options.validate_before_restore {
            JsonValue::parse(&rebuilt.content).map_err(|e| {
                Error::validation(format!(
                    "content rebuilt for {} is not valid JSON: {}",
                    target, e
                ))
            })?;
        }

        let checksum_verified = content_checksum(&rebuilt.content) == metadata.checksum;
        if !checksum_verified {
            warn!(
                version = %target,
                expected = %metadata.checksum,
                "Restored content does not match the stored checksum"
            );
        }

        let unsaved = state
            .working
            .clone()
            .filter(|_| options.create_backup && state.has_unsaved_changes());
        let backup_version_id = match unsaved {
            Some(working) => {
                let value = JsonValue::parse(&working)?;
                let overrides = VersionOverrides::default()
                    .message(format!("Backup before restoring {}", metadata.version_label))
                    .change_type(ChangeType::Patch);
                let backup = self.create_locked(state, value, overrides, Some(target))?;
                Some(backup.id())
            }
            None => None,
        };

        let kept_working = state
            .working
            .clone()
            .filter(|_| options.preserve_working_changes);
        state.reset_to(Some(target), Some(rebuilt.content.clone()));
        if kept_working.is_some() {
            state.working = kept_working;
        }
        self.sync_pins(state);

        info!(
            version = %target,
            label = %metadata.version_label,
            replayed = rebuilt.replayed_deltas,
            backup = ?backup_version_id,
            "Restored version"
        );
        Ok(RestoreResult {
            version_id: target,
            content: rebuilt.content,
            backup_version_id,
            replayed_deltas: rebuilt.replayed_deltas,
            checksum_verified,
        })
    }
}

impl VersionHistoryManager {
    /// Make `options.target_version_id` the current version
    ///
    /// Fails with `NotFound` for an unknown target or a broken delta chain
    /// and with `Validation` if the rebuilt content is rejected; nothing
    /// changes on failure.
    pub fn restore_version(&self, options: RestoreOptions) -> Result<RestoreResult> {
        let mut state = self.shared.state.lock();
        self.shared.restore_locked(&mut state, &options)
    }
}
