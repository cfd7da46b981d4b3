//! Version records
//!
//! A [`Version`] is either a snapshot (full content stored verbatim) or a
//! delta against its parent. A non-snapshot version always has a parent and
//! a delta; its content is only recoverable by walking parents back to the
//! nearest snapshot and replaying deltas forward.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::delta::VersionDelta;
use crate::timestamp::Timestamp;
use crate::types::{BranchId, TagId, VersionId};

/// Why a version was created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ChangeType {
    /// Breaking or large change, bumps the major label component
    Major,
    /// Bumps the minor label component
    Minor,
    /// Bumps the patch label component
    #[default]
    Patch,
    /// Created by the auto-save timer, bumps patch
    Auto,
}

/// Coarse size classification of a delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChangeImpact {
    /// A handful of edits
    Minimal,
    /// Up to a couple dozen edits
    Moderate,
    /// Many edits
    Significant,
    /// Large rewrite; always stored as a snapshot
    Major,
}

/// Lifecycle status of a version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VersionStatus {
    /// Not yet committed
    Draft,
    /// Normal stored version
    #[default]
    Committed,
    /// At least one tag points at it
    Tagged,
    /// Retained for history only
    Archived,
}

/// Semantic `major.minor.patch` label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VersionLabel {
    /// Major component
    pub major: u32,
    /// Minor component
    pub minor: u32,
    /// Patch component
    pub patch: u32,
}

impl VersionLabel {
    /// Label of the first version
    pub const INITIAL: VersionLabel = VersionLabel {
        major: 1,
        minor: 0,
        patch: 0,
    };

    /// Create a label
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        VersionLabel {
            major,
            minor,
            patch,
        }
    }

    /// Label following this one for the given change type
    pub fn bump(&self, change_type: ChangeType) -> Self {
        match change_type {
            ChangeType::Major => VersionLabel::new(self.major + 1, 0, 0),
            ChangeType::Minor => VersionLabel::new(self.major, self.minor + 1, 0),
            ChangeType::Patch | ChangeType::Auto => {
                VersionLabel::new(self.major, self.minor, self.patch + 1)
            }
        }
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Metadata of a stored version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionMetadata {
    /// Version id
    pub id: VersionId,
    /// Creation index, strictly increasing per history
    pub sequence: u64,
    /// `major.minor.patch` label
    pub version_label: VersionLabel,
    /// Creation time
    pub timestamp: Timestamp,
    /// Commit message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Why the version was created
    pub change_type: ChangeType,
    /// Size classification of the delta against the parent
    pub change_impact: ChangeImpact,
    /// Lifecycle status
    pub status: VersionStatus,
    /// Branch the version was created on
    pub branch_id: BranchId,
    /// Parent version, `None` for the first version of a history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<VersionId>,
    /// Tags pointing at this version
    #[serde(default)]
    pub tags: BTreeSet<TagId>,
    /// Size of the canonical content text in bytes
    pub content_size: usize,
    /// Size of the serialized delta in bytes (0 without a delta)
    pub delta_size: usize,
    /// Fingerprint of the canonical content text
    pub checksum: String,
}

/// A stored version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    /// Metadata
    pub metadata: VersionMetadata,
    /// Delta against the parent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<VersionDelta>,
    /// Canonical content text, present on snapshots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_content: Option<String>,
    /// Whether the content is stored verbatim
    pub is_snapshot: bool,
}

impl Version {
    /// Build a snapshot carrying the full content text
    pub fn snapshot(metadata: VersionMetadata, content: String) -> Self {
        Version {
            metadata,
            delta: None,
            full_content: Some(content),
            is_snapshot: true,
        }
    }

    /// Build a delta version against `metadata.parent_id`
    pub fn from_delta(metadata: VersionMetadata, delta: VersionDelta) -> Self {
        Version {
            metadata,
            delta: Some(delta),
            full_content: None,
            is_snapshot: false,
        }
    }

    /// Turn this version into a snapshot of `content`, dropping its delta
    pub fn materialize(mut self, content: String) -> Self {
        self.delta = None;
        self.full_content = Some(content);
        self.is_snapshot = true;
        self
    }

    /// Version id
    pub fn id(&self) -> VersionId {
        self.metadata.id
    }

    /// Parent id
    pub fn parent_id(&self) -> Option<VersionId> {
        self.metadata.parent_id
    }

    /// Check the record shape
    ///
    /// A snapshot must carry its content; a delta version must carry a parent
    /// and a delta.
    pub fn is_well_formed(&self) -> bool {
        if self.is_snapshot {
            self.full_content.is_some()
        } else {
            self.metadata.parent_id.is_some() && self.delta.is_some()
        }
    }
}

/// A named head pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch id
    pub id: BranchId,
    /// Unique branch name
    pub name: String,
    /// Latest version on the branch, `None` until the first commit
    pub head_version_id: Option<VersionId>,
    /// Creation time
    pub created_at: Timestamp,
}

/// Kind of a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TagType {
    /// Published release
    Release,
    /// Project milestone
    Milestone,
    /// Known-good state worth returning to
    Checkpoint,
    /// Anything else
    #[default]
    Custom,
}

/// A named pointer at a version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag id
    pub id: TagId,
    /// Unique tag name
    pub name: String,
    /// Tagged version
    pub version_id: VersionId,
    /// Tag kind
    pub tag_type: TagType,
    /// Creation time
    pub created_at: Timestamp,
}

/// Storage accounting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct StorageMetrics {
    /// Number of stored versions
    pub total_versions: usize,
    /// Bytes after compression
    pub total_size: usize,
    /// Bytes before compression
    pub original_size: usize,
    /// `total_size / original_size`, 1.0 when empty
    pub compression_ratio: f64,
    /// Versions stored as snapshots
    pub snapshot_count: usize,
    /// Versions stored as deltas
    pub delta_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_bumps() {
        let l = VersionLabel::new(1, 2, 3);
        assert_eq!(l.bump(ChangeType::Major), VersionLabel::new(2, 0, 0));
        assert_eq!(l.bump(ChangeType::Minor), VersionLabel::new(1, 3, 0));
        assert_eq!(l.bump(ChangeType::Patch), VersionLabel::new(1, 2, 4));
        assert_eq!(l.bump(ChangeType::Auto), VersionLabel::new(1, 2, 4));
        assert_eq!(VersionLabel::INITIAL.to_string(), "1.0.0");
    }

    #[test]
    fn test_impact_ordering() {
        assert!(ChangeImpact::Minimal < ChangeImpact::Moderate);
        assert!(ChangeImpact::Significant < ChangeImpact::Major);
    }

    fn metadata(parent: Option<VersionId>) -> VersionMetadata {
        VersionMetadata {
            id: VersionId::new(),
            sequence: 0,
            version_label: VersionLabel::INITIAL,
            timestamp: Timestamp::now(),
            message: None,
            author: None,
            change_type: ChangeType::Patch,
            change_impact: ChangeImpact::Minimal,
            status: VersionStatus::Committed,
            branch_id: BranchId::new(),
            parent_id: parent,
            tags: BTreeSet::new(),
            content_size: 2,
            delta_size: 0,
            checksum: String::new(),
        }
    }

    #[test]
    fn test_well_formed() {
        let snapshot = Version {
            metadata: metadata(None),
            delta: None,
            full_content: Some("{}".into()),
            is_snapshot: true,
        };
        assert!(snapshot.is_well_formed());

        let orphan_delta = Version {
            metadata: metadata(None),
            delta: Some(VersionDelta::empty()),
            full_content: None,
            is_snapshot: false,
        };
        assert!(!orphan_delta.is_well_formed());

        let delta = Version {
            metadata: metadata(Some(VersionId::new())),
            delta: Some(VersionDelta::empty()),
            full_content: None,
            is_snapshot: false,
        };
        assert!(delta.is_well_formed());
    }
}
