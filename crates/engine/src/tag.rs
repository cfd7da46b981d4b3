//! Tag bookkeeping
//!
//! Tags are unique names attached to versions. A tagged version gets the
//! `Tagged` status and is never evicted while the tag exists.

use tracing::info;

use vellum_core::{
    Error, Result, Tag, TagId, TagType, Timestamp, VersionId, VersionMetadata, VersionStatus,
};

use crate::manager::{check_tag_name, HistoryState, VersionHistoryManager};

fn ensure_tagging(state: &HistoryState) -> Result<()> {
    if state.config.enable_tagging {
        Ok(())
    } else {
        Err(Error::validation("tagging is disabled"))
    }
}

impl VersionHistoryManager {
    /// Attach a new tag to a stored version
    pub fn create_tag(&self, name: &str, version_id: &VersionId, tag_type: TagType) -> Result<Tag> {
        let mut state = self.shared.state.lock();
        ensure_tagging(&state)?;
        check_tag_name(&state, name)?;

        let tag = Tag {
            id: TagId::new(),
            name: name.to_string(),
            version_id: *version_id,
            tag_type,
            created_at: Timestamp::now(),
        };
        self.shared.store.update_metadata(version_id, |m| {
            m.tags.insert(tag.id);
            m.status = VersionStatus::Tagged;
        })?;
        state.tags.insert(tag.id, tag.clone());
        self.shared.sync_pins(&state);
        info!(tag = %tag.name, version = %version_id, "Created tag");
        Ok(tag)
    }

    /// Remove a tag; the version goes back to `Committed` once untagged
    pub fn delete_tag(&self, id: &TagId) -> Result<()> {
        let mut state = self.shared.state.lock();
        ensure_tagging(&state)?;
        let tag = state
            .tags
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("tag {}", id)))?;

        let untag = self.shared.store.update_metadata(&tag.version_id, |m| {
            m.tags.remove(&tag.id);
            if m.tags.is_empty() && m.status == VersionStatus::Tagged {
                m.status = VersionStatus::Committed;
            }
        });
        match untag {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        state.tags.remove(id);
        self.shared.sync_pins(&state);
        Ok(())
    }

    /// Every tag, oldest first
    pub fn list_tags(&self) -> Vec<Tag> {
        let state = self.shared.state.lock();
        let mut tags: Vec<Tag> = state.tags.values().cloned().collect();
        tags.sort_by(|a, b| (a.created_at, &a.name).cmp(&(b.created_at, &b.name)));
        tags
    }

    /// Look a tag up by name
    pub fn get_tag(&self, name: &str) -> Option<Tag> {
        self.shared.state.lock().tag_named(name).cloned()
    }

    /// Metadata of the versions carrying the tag `name`
    pub fn versions_with_tag(&self, name: &str) -> Vec<VersionMetadata> {
        let Some(tag_id) = self.get_tag(name).map(|t| t.id) else {
            return Vec::new();
        };
        self.shared
            .store
            .get_version_list()
            .into_iter()
            .filter(|m| m.tags.contains(&tag_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HistoryConfig;
    use crate::manager::VersionOverrides;

    fn manager(config: HistoryConfig) -> VersionHistoryManager {
        VersionHistoryManager::new(HistoryConfig {
            auto_save_interval_ms: 0,
            ..config
        })
        .unwrap()
    }

    #[test]
    fn test_tag_marks_version() {
        let m = manager(HistoryConfig::default());
        let v = m.create_version("[1]", VersionOverrides::default()).unwrap();
        let tag = m.create_tag("v1", &v.id(), TagType::Release).unwrap();

        let meta = m.store().get_metadata(&v.id()).unwrap();
        assert_eq!(meta.status, VersionStatus::Tagged);
        assert!(meta.tags.contains(&tag.id));
        assert_eq!(m.versions_with_tag("v1").len(), 1);
        assert!(m.versions_with_tag("nope").is_empty());
        assert!(m.store().is_pinned(&v.id()));

        m.delete_tag(&tag.id).unwrap();
        let meta = m.store().get_metadata(&v.id()).unwrap();
        assert_eq!(meta.status, VersionStatus::Committed);
        assert!(meta.tags.is_empty());
        assert!(m.list_tags().is_empty());
    }

    #[test]
    fn test_tag_names_are_unique() {
        let m = manager(HistoryConfig::default());
        let v = m.create_version("[1]", VersionOverrides::default()).unwrap();
        m.create_tag("stable", &v.id(), TagType::Checkpoint).unwrap();
        assert!(m
            .create_tag("stable", &v.id(), TagType::Custom)
            .unwrap_err()
            .is_validation());
        assert!(m
            .create_version("[2]", VersionOverrides::default().tag("stable"))
            .unwrap_err()
            .is_validation());
        assert!(m.create_tag("", &v.id(), TagType::Custom).is_err());
        // a failed create leaves the history alone
        assert_eq!(m.get_version_list().len(), 1);
    }

    #[test]
    fn test_unknown_version_or_tag() {
        let m = manager(HistoryConfig::default());
        assert!(m
            .create_tag("x", &VersionId::new(), TagType::Custom)
            .unwrap_err()
            .is_not_found());
        assert!(m.get_tag("x").is_none());
        assert!(m.delete_tag(&TagId::new()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_tagging_can_be_disabled() {
        let m = manager(HistoryConfig {
            enable_tagging: false,
            ..HistoryConfig::default()
        });
        let v = m.create_version("[1]", VersionOverrides::default()).unwrap();
        assert!(m.create_tag("t", &v.id(), TagType::Custom).unwrap_err().is_validation());
        assert!(m
            .create_version("[2]", VersionOverrides::default().tag("t"))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_deleting_tagged_version_drops_tag() {
        let m = manager(HistoryConfig::default());
        let first = m.create_version("[1]", VersionOverrides::default()).unwrap();
        m.create_tag("old", &first.id(), TagType::Milestone).unwrap();
        m.create_version("[2]", VersionOverrides::default()).unwrap();
        assert!(m.delete_version(&first.id()).unwrap());
        assert!(m.get_tag("old").is_none());
    }
}
