//! Human-readable delta summaries

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use vellum_core::{ChangeImpact, DiffOp, DiffOperation, JsonValue, PathSegment, VersionDelta};

const PREVIEW_LEN: usize = 60;

/// Counters, impact and one line per operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffSummary {
    /// Number of operations
    pub total_operations: usize,
    /// Add and Copy operations
    pub added: usize,
    /// Remove operations
    pub removed: usize,
    /// Replace and Move operations
    pub modified: usize,
    /// Change complexity of the delta
    pub complexity: f64,
    /// Impact tier
    pub impact: ChangeImpact,
    /// Whether the depth guard cut the diff short
    pub truncated: bool,
    /// Top-level keys or indices touched by the delta
    pub touched: BTreeSet<String>,
    /// One rendered line per operation
    pub lines: Vec<String>,
}

impl DiffSummary {
    /// Summarize a delta
    pub fn from_delta(delta: &VersionDelta) -> Self {
        let touched = delta
            .operations
            .iter()
            .filter_map(|op| op.path.segments().first())
            .map(|segment| match segment {
                PathSegment::Key(k) => k.clone(),
                PathSegment::Index(i) => i.to_string(),
            })
            .collect();

        DiffSummary {
            total_operations: delta.total_operations,
            added: delta.added_count,
            removed: delta.removed_count,
            modified: delta.modified_count,
            complexity: delta.change_complexity,
            impact: delta.impact(),
            truncated: delta.truncated,
            touched,
            lines: delta.operations.iter().map(render_line).collect(),
        }
    }
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} operations (+{} -{} ~{}), impact {:?}, complexity {:.2}",
            self.total_operations,
            self.added,
            self.removed,
            self.modified,
            self.impact,
            self.complexity
        )?;
        if self.truncated {
            writeln!(f, "  (depth limit reached, some changes not itemized)")?;
        }
        for line in &self.lines {
            writeln!(f, "  {}", line)?;
        }
        Ok(())
    }
}

fn render_line(op: &DiffOperation) -> String {
    match op.op {
        DiffOp::Add => format!("{}: {}", op, preview(op.value.as_ref())),
        DiffOp::Remove => format!("{}: {}", op, preview(op.old_value.as_ref())),
        DiffOp::Replace => format!(
            "{}: {} -> {}",
            op,
            preview(op.old_value.as_ref()),
            preview(op.value.as_ref())
        ),
        DiffOp::Move | DiffOp::Copy => op.to_string(),
    }
}

fn preview(value: Option<&JsonValue>) -> String {
    let Some(value) = value else {
        return "?".to_string();
    };
    let text = value.to_json_string();
    if text.chars().count() <= PREVIEW_LEN {
        text
    } else {
        let cut: String = text.chars().take(PREVIEW_LEN).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_core::JsonPath;

    #[test]
    fn test_summary_lines_and_touched() {
        let delta = VersionDelta::from_operations(
            vec![
                DiffOperation::replace("/b".parse().unwrap(), 2i64.into(), 3i64.into()),
                DiffOperation::add("/c/0".parse().unwrap(), "x".into()),
            ],
            false,
        );
        let summary = DiffSummary::from_delta(&delta);
        assert_eq!(summary.lines, vec!["REPLACE /b: 2 -> 3", "ADD /c/0: \"x\""]);
        assert_eq!(
            summary.touched.into_iter().collect::<Vec<_>>(),
            vec!["b".to_string(), "c".to_string()]
        );
        assert_eq!(summary.impact, ChangeImpact::Minimal);
    }

    #[test]
    fn test_long_values_are_cut() {
        let long = "y".repeat(200);
        let delta = VersionDelta::from_operations(
            vec![DiffOperation::add(JsonPath::root().key("k"), long.into())],
            false,
        );
        let summary = DiffSummary::from_delta(&delta);
        assert!(summary.lines[0].ends_with("..."));
        assert!(summary.lines[0].len() < 100);
        assert!(summary.to_string().starts_with("1 operations"));
    }
}
