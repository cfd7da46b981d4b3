//! Structural delta types
//!
//! A [`VersionDelta`] is an ordered list of [`DiffOperation`]s plus counters
//! derived from it. Operations are applied strictly in list order; array
//! indices in later operations refer to the document as already modified by
//! earlier ones.
//!
//! | Op | Carries | Effect |
//! |----|---------|--------|
//! | Add | `value` | set object key / insert array element |
//! | Remove | `old_value` | delete object key / splice array element |
//! | Replace | `value`, `old_value` | overwrite in place |
//! | Move | `from` | remove at `from`, write at `path` |
//! | Copy | `from` | read at `from`, write at `path` |

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::json::JsonValue;
use crate::path::JsonPath;
use crate::version::ChangeImpact;

/// Kind of a diff operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiffOp {
    /// Value appears
    Add,
    /// Value disappears
    Remove,
    /// Value changes in place
    Replace,
    /// Value relocates
    Move,
    /// Value is duplicated
    Copy,
}

impl DiffOp {
    /// Lowercase name, as used in diff summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffOp::Add => "add",
            DiffOp::Remove => "remove",
            DiffOp::Replace => "replace",
            DiffOp::Move => "move",
            DiffOp::Copy => "copy",
        }
    }
}

impl fmt::Display for DiffOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structural edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffOperation {
    /// Operation kind
    pub op: DiffOp,
    /// Target location
    pub path: JsonPath,
    /// New value (Add, Replace)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,
    /// Previous value (Remove, Replace)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<JsonValue>,
    /// Source location (Move, Copy)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<JsonPath>,
}

impl DiffOperation {
    /// Create an Add operation
    pub fn add(path: JsonPath, value: JsonValue) -> Self {
        DiffOperation {
            op: DiffOp::Add,
            path,
            value: Some(value),
            old_value: None,
            from: None,
        }
    }

    /// Create a Remove operation
    pub fn remove(path: JsonPath, old_value: JsonValue) -> Self {
        DiffOperation {
            op: DiffOp::Remove,
            path,
            value: None,
            old_value: Some(old_value),
            from: None,
        }
    }

    /// Create a Replace operation
    pub fn replace(path: JsonPath, old_value: JsonValue, value: JsonValue) -> Self {
        DiffOperation {
            op: DiffOp::Replace,
            path,
            value: Some(value),
            old_value: Some(old_value),
            from: None,
        }
    }

    /// Create a Move operation
    pub fn move_from(from: JsonPath, path: JsonPath) -> Self {
        DiffOperation {
            op: DiffOp::Move,
            path,
            value: None,
            old_value: None,
            from: Some(from),
        }
    }

    /// Create a Copy operation
    pub fn copy_from(from: JsonPath, path: JsonPath) -> Self {
        DiffOperation {
            op: DiffOp::Copy,
            path,
            value: None,
            old_value: None,
            from: Some(from),
        }
    }
}

impl fmt::Display for DiffOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_root() {
            "/".to_string()
        } else {
            self.path.to_string()
        };
        match self.op {
            DiffOp::Add => write!(f, "ADD {}", path),
            DiffOp::Remove => write!(f, "REMOVE {}", path),
            DiffOp::Replace => write!(f, "REPLACE {}", path),
            DiffOp::Move | DiffOp::Copy => {
                let from = self.from.as_ref().map(|p| p.to_string()).unwrap_or_default();
                write!(f, "{} {} -> {}", self.op.as_str().to_uppercase(), from, path)
            }
        }
    }
}

/// Ordered operation list with derived counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VersionDelta {
    /// Operations, in application order
    pub operations: Vec<DiffOperation>,
    /// Number of operations
    pub total_operations: usize,
    /// Add and Copy operations
    pub added_count: usize,
    /// Remove operations
    pub removed_count: usize,
    /// Replace and Move operations
    pub modified_count: usize,
    /// `min(1, (added + removed + 2*modified) / (3*total))`, 0 when empty
    pub change_complexity: f64,
    /// Set when the depth guard cut recursion short somewhere
    #[serde(default)]
    pub truncated: bool,
}

impl VersionDelta {
    /// Build a delta and derive its counters
    pub fn from_operations(operations: Vec<DiffOperation>, truncated: bool) -> Self {
        let mut added = 0;
        let mut removed = 0;
        let mut modified = 0;
        for op in &operations {
            match op.op {
                DiffOp::Add | DiffOp::Copy => added += 1,
                DiffOp::Remove => removed += 1,
                DiffOp::Replace | DiffOp::Move => modified += 1,
            }
        }
        let total = operations.len();
        let change_complexity = if total == 0 {
            0.0
        } else {
            let weighted = (added + removed + 2 * modified) as f64;
            (weighted / (3 * total) as f64).min(1.0)
        };
        VersionDelta {
            operations,
            total_operations: total,
            added_count: added,
            removed_count: removed,
            modified_count: modified,
            change_complexity,
            truncated,
        }
    }

    /// An empty delta
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if the delta has no operations
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Coarse size classification
    ///
    /// | Tier | ops | complexity |
    /// |------|-----|------------|
    /// | Minimal | <= 5 | any |
    /// | Moderate | <= 20 | < 0.6 |
    /// | Significant | <= 50 | < 0.8 |
    /// | Major | otherwise | |
    ///
    /// Small deltas are Minimal whatever their mix: a two-operation edit
    /// with one replace has complexity 0.5 and is still a minimal change.
    pub fn impact(&self) -> ChangeImpact {
        let ops = self.total_operations;
        let complexity = self.change_complexity;
        if ops <= 5 {
            ChangeImpact::Minimal
        } else if ops <= 20 && complexity < 0.6 {
            ChangeImpact::Moderate
        } else if ops <= 50 && complexity < 0.8 {
            ChangeImpact::Significant
        } else {
            ChangeImpact::Major
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> JsonPath {
        s.parse().unwrap()
    }

    #[test]
    fn test_counters() {
        let delta = VersionDelta::from_operations(
            vec![
                DiffOperation::replace(path("/b"), 2i64.into(), 3i64.into()),
                DiffOperation::add(path("/c"), 4i64.into()),
            ],
            false,
        );
        assert_eq!(delta.total_operations, 2);
        assert_eq!(delta.added_count, 1);
        assert_eq!(delta.removed_count, 0);
        assert_eq!(delta.modified_count, 1);
        assert!((delta.change_complexity - 0.5).abs() < 1e-9);
        assert_eq!(delta.impact(), ChangeImpact::Minimal);
    }

    #[test]
    fn test_empty_delta() {
        let delta = VersionDelta::empty();
        assert!(delta.is_empty());
        assert_eq!(delta.change_complexity, 0.0);
        assert_eq!(delta.impact(), ChangeImpact::Minimal);
    }

    #[test]
    fn test_complexity_is_capped() {
        let ops = (0..4)
            .map(|i| DiffOperation::replace(path(&format!("/{}", i)), 0i64.into(), 1i64.into()))
            .collect();
        let delta = VersionDelta::from_operations(ops, false);
        assert!((delta.change_complexity - 2.0 / 3.0).abs() < 1e-9);
        assert!(delta.change_complexity <= 1.0);
    }

    #[test]
    fn test_impact_tiers() {
        let many = |n: usize, replace: bool| {
            let ops = (0..n)
                .map(|i| {
                    let p = path(&format!("/k{}", i));
                    if replace {
                        DiffOperation::replace(p, 0i64.into(), 1i64.into())
                    } else {
                        DiffOperation::add(p, 1i64.into())
                    }
                })
                .collect();
            VersionDelta::from_operations(ops, false)
        };
        assert_eq!(many(5, true).impact(), ChangeImpact::Minimal);
        // adds only: complexity 1/3
        assert_eq!(many(10, false).impact(), ChangeImpact::Moderate);
        assert_eq!(many(30, false).impact(), ChangeImpact::Significant);
        assert_eq!(many(51, false).impact(), ChangeImpact::Major);
        // replaces only: complexity 2/3
        assert_eq!(many(10, true).impact(), ChangeImpact::Significant);
        assert_eq!(many(60, true).impact(), ChangeImpact::Major);
    }

    #[test]
    fn test_operation_display() {
        let op = DiffOperation::move_from(path("/a/0"), path("/b"));
        assert_eq!(op.to_string(), "MOVE /a/0 -> /b");
        let op = DiffOperation::add(JsonPath::root(), JsonValue::null());
        assert_eq!(op.to_string(), "ADD /");
    }

    #[test]
    fn test_operation_serde_skips_absent_fields() {
        let op = DiffOperation::add(path("/x"), 1i64.into());
        let json = serde_json::to_value(&op).unwrap();
        assert!(json.get("old_value").is_none());
        assert!(json.get("from").is_none());
        let back: DiffOperation = serde_json::from_value(json).unwrap();
        assert_eq!(back, op);
    }
}
