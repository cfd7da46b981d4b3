//! Delta chain reconstruction
//!
//! A delta version's content is rebuilt by walking `parent_id` links back
//! to the nearest snapshot, then replaying the collected deltas forward
//! from that snapshot.

use std::collections::HashSet;
use tracing::trace;

use vellum_core::{Error, JsonValue, Result, Version, VersionId};
use vellum_diff::apply_delta;

/// Anything that can hand out stored versions by id
pub trait VersionSource {
    /// Fetch a version, `None` if it does not exist
    fn fetch(&self, id: &VersionId) -> Result<Option<Version>>;
}

/// Result of rebuilding one version's content
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    /// Version that was rebuilt
    pub version_id: VersionId,
    /// Snapshot the replay started from
    pub snapshot_id: VersionId,
    /// Deltas applied on top of the snapshot
    pub replayed_deltas: usize,
    /// Rebuilt document
    pub value: JsonValue,
    /// Canonical text of the rebuilt document
    pub content: String,
}

/// Rebuild the content of `id` from `source`
///
/// Fails with `NotFound` if `id` is unknown or no snapshot is reachable
/// (missing ancestor, parent link cycle), and with `Storage` if the
/// snapshot text is corrupt or a delta does not apply.
pub fn reconstruct(source: &dyn VersionSource, id: &VersionId) -> Result<Reconstruction> {
    let mut deltas = Vec::new();
    let mut visited = HashSet::new();
    let mut current = *id;

    let snapshot = loop {
        if !visited.insert(current) {
            return Err(Error::not_found(format!(
                "delta chain of {} loops back to {}",
                id, current
            )));
        }
        let version = match source.fetch(&current)? {
            Some(v) => v,
            None if current == *id => {
                return Err(Error::not_found(format!("version {}", id)));
            }
            None => {
                return Err(Error::not_found(format!(
                    "broken delta chain: ancestor {} of {} is missing",
                    current, id
                )));
            }
        };
        if version.is_snapshot {
            break version;
        }
        let parent = version.parent_id().ok_or_else(|| {
            Error::not_found(format!(
                "broken delta chain: {} has no parent and no content",
                current
            ))
        })?;
        deltas.push(version);
        current = parent;
    };

    let snapshot_id = snapshot.id();
    let text = snapshot.full_content.ok_or_else(|| {
        Error::storage(format!("snapshot {} carries no content", snapshot_id))
    })?;
    let mut value = JsonValue::parse(&text)
        .map_err(|e| Error::storage(format!("corrupt snapshot {}: {}", snapshot_id, e)))?;
    if deltas.is_empty() {
        return Ok(Reconstruction {
            version_id: *id,
            snapshot_id,
            replayed_deltas: 0,
            value,
            content: text,
        });
    }

    for version in deltas.iter().rev() {
        if let Some(delta) = &version.delta {
            value = apply_delta(&value, delta).map_err(|e| {
                Error::storage(format!("delta of {} does not apply: {}", version.id(), e))
            })?;
        }
    }
    trace!(version = %id, snapshot = %snapshot_id, replayed = deltas.len(), "Reconstructed");

    let content = value.to_json_string();
    Ok(Reconstruction {
        version_id: *id,
        snapshot_id,
        replayed_deltas: deltas.len(),
        value,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashMap};
    use vellum_core::{
        BranchId, ChangeImpact, ChangeType, DiffOperation, Timestamp, VersionDelta, VersionLabel,
        VersionMetadata, VersionStatus,
    };

    struct MapSource(HashMap<VersionId, Version>);

    impl VersionSource for MapSource {
        fn fetch(&self, id: &VersionId) -> Result<Option<Version>> {
            Ok(self.0.get(id).cloned())
        }
    }

    fn metadata(id: VersionId, parent: Option<VersionId>) -> VersionMetadata {
        VersionMetadata {
            id,
            sequence: 0,
            version_label: VersionLabel::INITIAL,
            timestamp: Timestamp::EPOCH,
            message: None,
            author: None,
            change_type: ChangeType::Patch,
            change_impact: ChangeImpact::Minimal,
            status: VersionStatus::Committed,
            branch_id: BranchId::new(),
            parent_id: parent,
            tags: BTreeSet::new(),
            content_size: 0,
            delta_size: 0,
            checksum: String::new(),
        }
    }

    fn set_n(n: i64) -> VersionDelta {
        VersionDelta::from_operations(
            vec![DiffOperation::replace("/n".parse().unwrap(), (n - 1).into(), n.into())],
            false,
        )
    }

    fn chain(len: i64) -> (MapSource, Vec<VersionId>) {
        let mut map = HashMap::new();
        let root = VersionId::new();
        map.insert(root, Version::snapshot(metadata(root, None), r#"{"n":0}"#.into()));
        let mut ids = vec![root];
        for n in 1..=len {
            let id = VersionId::new();
            let parent = *ids.last().unwrap();
            map.insert(id, Version::from_delta(metadata(id, Some(parent)), set_n(n)));
            ids.push(id);
        }
        (MapSource(map), ids)
    }

    #[test]
    fn test_snapshot_is_returned_verbatim() {
        let (source, ids) = chain(0);
        let r = reconstruct(&source, &ids[0]).unwrap();
        assert_eq!(r.content, r#"{"n":0}"#);
        assert_eq!(r.replayed_deltas, 0);
    }

    #[test]
    fn test_replays_forward_from_snapshot() {
        let (source, ids) = chain(4);
        let r = reconstruct(&source, &ids[4]).unwrap();
        assert_eq!(r.content, r#"{"n":4}"#);
        assert_eq!(r.replayed_deltas, 4);
        assert_eq!(r.snapshot_id, ids[0]);
    }

    #[test]
    fn test_missing_ancestor_is_not_found() {
        let (mut source, ids) = chain(3);
        source.0.remove(&ids[0]);
        assert!(reconstruct(&source, &ids[3]).unwrap_err().is_not_found());
        assert!(reconstruct(&source, &VersionId::new()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_cycle_is_not_found() {
        let a = VersionId::new();
        let b = VersionId::new();
        let mut map = HashMap::new();
        map.insert(a, Version::from_delta(metadata(a, Some(b)), set_n(1)));
        map.insert(b, Version::from_delta(metadata(b, Some(a)), set_n(2)));
        let err = reconstruct(&MapSource(map), &a).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_bad_delta_is_storage_error() {
        let (mut source, ids) = chain(1);
        let bad = VersionDelta::from_operations(
            vec![DiffOperation::remove("/missing".parse().unwrap(), 1i64.into())],
            false,
        );
        source.0.insert(ids[1], Version::from_delta(metadata(ids[1], Some(ids[0])), bad));
        assert!(reconstruct(&source, &ids[1]).unwrap_err().is_storage());
    }

    #[test]
    fn test_snapshot_without_content_is_storage_error() {
        let (mut source, ids) = chain(2);
        if let Some(root) = source.0.get_mut(&ids[0]) {
            root.full_content = None;
        }
        assert!(reconstruct(&source, &ids[0]).unwrap_err().is_storage());
        assert!(reconstruct(&source, &ids[2]).unwrap_err().is_storage());
    }
}
