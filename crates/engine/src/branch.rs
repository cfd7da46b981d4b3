//! Branch bookkeeping
//!
//! A branch is a named head pointer and nothing more. New versions advance
//! the head of the current branch. Switching branches is a restore of the
//! target head: there is no merge.

use tracing::info;

use vellum_core::{Branch, BranchId, Error, Result, Timestamp, VersionId};

use crate::manager::{HistoryState, VersionHistoryManager, DEFAULT_BRANCH};
use crate::restore::{RestoreOptions, RestoreResult};

fn ensure_branching(state: &HistoryState) -> Result<()> {
    if state.config.enable_branching {
        Ok(())
    } else {
        Err(Error::validation("branching is disabled"))
    }
}

impl VersionHistoryManager {
    /// Create a branch whose head is `from_version` (the current version if `None`)
    ///
    /// Does not switch to it.
    pub fn create_branch(&self, name: &str, from_version: Option<VersionId>) -> Result<Branch> {
        let mut state = self.shared.state.lock();
        ensure_branching(&state)?;
        if name.trim().is_empty() {
            return Err(Error::validation("branch name must not be empty"));
        }
        if state.branch_named(name).is_some() {
            return Err(Error::validation(format!("branch '{}' already exists", name)));
        }
        let head = match from_version {
            Some(id) if !self.shared.store.contains(&id) => {
                return Err(Error::not_found(format!("version {}", id)));
            }
            Some(id) => Some(id),
            None => state.current_version,
        };

        let branch = Branch {
            id: BranchId::new(),
            name: name.to_string(),
            head_version_id: head,
            created_at: Timestamp::now(),
        };
        state.branches.insert(branch.id, branch.clone());
        self.shared.sync_pins(&state);
        info!(branch = %branch.name, head = ?head, "Created branch");
        Ok(branch)
    }

    /// Make `id` the current branch, restoring its head
    ///
    /// Unsaved working changes are committed to the branch being left
    /// first. Returns the restore outcome, `None` if nothing was restored
    /// (the branch has no head, or its head is already current).
    pub fn switch_branch(&self, id: &BranchId) -> Result<Option<RestoreResult>> {
        let mut state = self.shared.state.lock();
        ensure_branching(&state)?;
        let branch = state
            .branches
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("branch {}", id)))?;

        let restored = match branch.head_version_id {
            Some(head) if state.current_version != Some(head) || state.has_unsaved_changes() => {
                let options = RestoreOptions::new(head);
                Some(self.shared.restore_locked(&mut state, &options)?)
            }
            _ => None,
        };
        state.current_branch = branch.id;
        self.shared.sync_pins(&state);
        info!(branch = %branch.name, "Switched branch");
        Ok(restored)
    }

    /// Delete a branch other than the current one and the default branch
    ///
    /// Versions created on it are kept.
    pub fn delete_branch(&self, id: &BranchId) -> Result<()> {
        let mut state = self.shared.state.lock();
        ensure_branching(&state)?;
        let branch = state
            .branches
            .get(id)
            .ok_or_else(|| Error::not_found(format!("branch {}", id)))?;
        if branch.id == state.current_branch {
            return Err(Error::validation(format!(
                "branch '{}' is the current branch",
                branch.name
            )));
        }
        if branch.name == DEFAULT_BRANCH {
            return Err(Error::validation("the default branch cannot be deleted"));
        }
        state.branches.remove(id);
        self.shared.sync_pins(&state);
        Ok(())
    }

    /// Every branch, oldest first
    pub fn list_branches(&self) -> Vec<Branch> {
        let state = self.shared.state.lock();
        let mut branches: Vec<Branch> = state.branches.values().cloned().collect();
        branches.sort_by(|a, b| {
            (a.created_at, &a.name).cmp(&(b.created_at, &b.name))
        });
        branches
    }

    /// The current branch
    pub fn current_branch(&self) -> Option<Branch> {
        let state = self.shared.state.lock();
        state.branches.get(&state.current_branch).cloned()
    }

    /// Look a branch up by name
    pub fn get_branch(&self, name: &str) -> Option<Branch> {
        self.shared.state.lock().branch_named(name).cloned()
    }
}
