//! Diff calculation and application
//!
//! [`DiffEngine::calculate_diff`] walks both documents together and emits a
//! [`VersionDelta`] that transforms `old` into `new`:
//!
//! - objects: keys present only in `old` are removed, keys only in `new` are
//!   added, shared keys recurse
//! - arrays: elements are aligned by LCS under structural equality; an
//!   unmatched removal and an unmatched addition in the same gap are paired
//!   and diffed recursively, the rest become Remove / Add
//! - numbers: compared with the configured precision
//! - anything else that differs (including a kind change) is a Replace
//!
//! Array operations carry running indices: every index refers to the array
//! as modified by the operations before it, so applying the list in order
//! reproduces `new`.

use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, trace};

use vellum_core::{
    get_at_path, insert_at_path, remove_at_path, set_at_path, DiffOp, DiffOperation, JsonPath,
    JsonValue, PatchError, PathSegment, VersionDelta,
};

use crate::chunked::{self, Cancellation};
use crate::config::DiffConfig;
use crate::equality::values_equal;
use crate::lcs::{self, Step};
use crate::DiffError;

/// Structural JSON diff engine
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    config: DiffConfig,
}

impl DiffEngine {
    /// Create an engine with the given configuration
    pub fn new(config: DiffConfig) -> Self {
        DiffEngine { config }
    }

    /// Engine configuration
    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Compute the delta that turns `old` into `new`
    pub fn calculate_diff(&self, old: &JsonValue, new: &JsonValue) -> VersionDelta {
        // Only a cancellation token can make the walk fail.
        self.run(old, new, None).unwrap_or_default()
    }

    /// Compute a delta, giving up when `cancel` is triggered
    ///
    /// The token is checked between chunks and between array windows.
    pub fn calculate_diff_with(
        &self,
        old: &JsonValue,
        new: &JsonValue,
        cancel: &Cancellation,
    ) -> Result<VersionDelta, DiffError> {
        self.run(old, new, Some(cancel))
    }

    /// Apply a delta to a copy of `base`
    pub fn apply_diff(
        &self,
        base: &JsonValue,
        delta: &VersionDelta,
    ) -> Result<JsonValue, PatchError> {
        apply_delta(base, delta)
    }

    fn run(
        &self,
        old: &JsonValue,
        new: &JsonValue,
        cancel: Option<&Cancellation>,
    ) -> Result<VersionDelta, DiffError> {
        let combined = old.size_bytes().saturating_add(new.size_bytes());
        let chunked = combined > self.config.memory_threshold;
        let mut walker = Walker::new(&self.config, cancel, chunked);

        if chunked {
            debug!(
                combined_bytes = combined,
                threshold = self.config.memory_threshold,
                chunk_size = self.config.chunk_size,
                "Diffing in chunked mode"
            );
            chunked::diff_top_level(&mut walker, old.as_inner(), new.as_inner())?;
        } else {
            walker.diff_value(old.as_inner(), new.as_inner(), &JsonPath::root(), 0)?;
        }

        let truncated = walker.truncated;
        if truncated {
            debug!(max_depth = self.config.max_depth, "Diff hit the depth limit");
        }
        Ok(VersionDelta::from_operations(walker.ops, truncated))
    }
}

/// Apply every operation of `delta`, in order, to a copy of `base`
pub fn apply_delta(base: &JsonValue, delta: &VersionDelta) -> Result<JsonValue, PatchError> {
    let mut doc = base.as_inner().clone();
    for operation in &delta.operations {
        apply_operation(&mut doc, operation)?;
    }
    Ok(JsonValue::from_value(doc))
}

/// Apply one operation in place
pub fn apply_operation(doc: &mut Value, operation: &DiffOperation) -> Result<(), PatchError> {
    let path = &operation.path;
    match operation.op {
        DiffOp::Add => {
            let value = required_value(operation)?;
            insert_at_path(doc, path, value)
        }
        DiffOp::Replace => {
            let value = required_value(operation)?;
            set_at_path(doc, path, value)
        }
        DiffOp::Remove => match remove_at_path(doc, path)? {
            Some(_) => Ok(()),
            None => Err(PatchError::NotFound(path.to_string())),
        },
        DiffOp::Move => {
            let from = required_from(operation)?;
            let value = remove_at_path(doc, from)?
                .ok_or_else(|| PatchError::NotFound(from.to_string()))?;
            insert_at_path(doc, path, value)
        }
        DiffOp::Copy => {
            let from = required_from(operation)?;
            let value = get_at_path(doc, from)
                .cloned()
                .ok_or_else(|| PatchError::NotFound(from.to_string()))?;
            insert_at_path(doc, path, value)
        }
    }
}

fn required_value(operation: &DiffOperation) -> Result<Value, PatchError> {
    operation
        .value
        .as_ref()
        .map(|v| v.as_inner().clone())
        .ok_or_else(|| PatchError::Malformed {
            path: operation.path.to_string(),
            reason: "missing value",
        })
}

fn required_from(operation: &DiffOperation) -> Result<&JsonPath, PatchError> {
    operation.from.as_ref().ok_or_else(|| PatchError::Malformed {
        path: operation.path.to_string(),
        reason: "missing source path",
    })
}

/// Recursive walk state for one diff
pub(crate) struct Walker<'a> {
    config: &'a DiffConfig,
    cancel: Option<&'a Cancellation>,
    chunked: bool,
    ops: Vec<DiffOperation>,
    truncated: bool,
}

impl<'a> Walker<'a> {
    fn new(config: &'a DiffConfig, cancel: Option<&'a Cancellation>, chunked: bool) -> Self {
        Walker {
            config,
            cancel,
            chunked,
            ops: Vec::new(),
            truncated: false,
        }
    }

    pub(crate) fn config(&self) -> &DiffConfig {
        self.config
    }

    /// Cancellation point; yields the thread in chunked mode
    pub(crate) fn checkpoint(&self) -> Result<(), DiffError> {
        if self.cancel.map_or(false, Cancellation::is_cancelled) {
            return Err(DiffError::Cancelled);
        }
        if self.chunked {
            std::thread::yield_now();
        }
        Ok(())
    }

    fn equal(&self, a: &Value, b: &Value) -> bool {
        values_equal(a, b, self.config.precision)
    }

    /// Diff a key that may be missing on either side
    pub(crate) fn diff_entry(
        &mut self,
        old: Option<&Value>,
        new: Option<&Value>,
        path: &JsonPath,
        depth: usize,
    ) -> Result<(), DiffError> {
        match (old, new) {
            (Some(o), Some(n)) => self.diff_value(o, n, path, depth)?,
            (Some(o), None) => self.ops.push(DiffOperation::remove(
                path.clone(),
                JsonValue::from_value(o.clone()),
            )),
            (None, Some(n)) => self.ops.push(DiffOperation::add(
                path.clone(),
                JsonValue::from_value(n.clone()),
            )),
            (None, None) => {}
        }
        Ok(())
    }

    pub(crate) fn diff_value(
        &mut self,
        old: &Value,
        new: &Value,
        path: &JsonPath,
        depth: usize,
    ) -> Result<(), DiffError> {
        if depth > self.config.max_depth {
            if !self.equal(old, new) {
                self.truncated = true;
            }
            return Ok(());
        }

        match (old, new) {
            (Value::Object(old_map), Value::Object(new_map)) => {
                let keys: BTreeSet<&String> = old_map.keys().chain(new_map.keys()).collect();
                for key in keys {
                    let child = path.child(PathSegment::Key(key.clone()));
                    self.diff_entry(old_map.get(key), new_map.get(key), &child, depth + 1)?;
                }
                Ok(())
            }
            (Value::Array(old_items), Value::Array(new_items)) => {
                self.diff_array(old_items, new_items, path, depth)
            }
            _ => {
                if !self.equal(old, new) {
                    self.ops.push(DiffOperation::replace(
                        path.clone(),
                        JsonValue::from_value(old.clone()),
                        JsonValue::from_value(new.clone()),
                    ));
                }
                Ok(())
            }
        }
    }

    fn diff_array(
        &mut self,
        old: &[Value],
        new: &[Value],
        path: &JsonPath,
        depth: usize,
    ) -> Result<(), DiffError> {
        if !self.config.use_lcs {
            return self.diff_array_positional(old, new, path, depth);
        }
        if lcs::table_cells(old.len(), new.len()) <= self.config.max_lcs_cells {
            self.diff_array_window(old, new, path, 0, depth)
        } else {
            trace!(
                path = %path,
                old_len = old.len(),
                new_len = new.len(),
                "Array too large for one alignment, windowing"
            );
            self.diff_array_windowed(old, new, path, depth, self.config.chunk_size.max(1))
        }
    }

    fn diff_array_positional(
        &mut self,
        old: &[Value],
        new: &[Value],
        path: &JsonPath,
        depth: usize,
    ) -> Result<(), DiffError> {
        let shared = old.len().min(new.len());
        for i in 0..shared {
            let child = path.child(PathSegment::Index(i));
            self.diff_value(&old[i], &new[i], &child, depth + 1)?;
        }
        // Trailing removals all hit the same slot as the array shrinks.
        for item in &old[shared..] {
            self.ops.push(DiffOperation::remove(
                path.child(PathSegment::Index(shared)),
                JsonValue::from_value(item.clone()),
            ));
        }
        for (i, item) in new.iter().enumerate().skip(shared) {
            self.ops.push(DiffOperation::add(
                path.child(PathSegment::Index(i)),
                JsonValue::from_value(item.clone()),
            ));
        }
        Ok(())
    }

    /// Align fixed-size windows of both arrays independently
    ///
    /// Window `k` turns `old[k*w..]` into `new[k*w..]`; its operations start
    /// at the index where the previous window's output ended.
    pub(crate) fn diff_array_windowed(
        &mut self,
        old: &[Value],
        new: &[Value],
        path: &JsonPath,
        depth: usize,
        window: usize,
    ) -> Result<(), DiffError> {
        let mut start = 0;
        let mut base = 0;
        while start < old.len() || start < new.len() {
            self.checkpoint()?;
            let old_window = &old[start.min(old.len())..(start + window).min(old.len())];
            let new_window = &new[start.min(new.len())..(start + window).min(new.len())];
            self.diff_array_window(old_window, new_window, path, base, depth)?;
            base += new_window.len();
            start += window;
        }
        Ok(())
    }

    /// LCS-align `old` against `new`, emitting operations from index `base`
    fn diff_array_window(
        &mut self,
        old: &[Value],
        new: &[Value],
        path: &JsonPath,
        base: usize,
        depth: usize,
    ) -> Result<(), DiffError> {
        let precision = self.config.precision;
        let steps = lcs::align(old, new, |a, b| values_equal(a, b, precision));

        let mut pos = base;
        let mut removed: Vec<usize> = Vec::new();
        let mut added: Vec<usize> = Vec::new();
        for step in steps {
            match step {
                Step::Matched(..) => {
                    pos = self.flush_gap(old, new, &removed, &added, path, pos, depth)?;
                    removed.clear();
                    added.clear();
                    // aligned pairs are equal under the match predicate
                    pos += 1;
                }
                Step::Removed(i) => removed.push(i),
                Step::Added(j) => added.push(j),
            }
        }
        self.flush_gap(old, new, &removed, &added, path, pos, depth)?;
        Ok(())
    }

    /// Emit the operations for one gap between aligned elements
    #[allow(clippy::too_many_arguments)]
    fn flush_gap(
        &mut self,
        old: &[Value],
        new: &[Value],
        removed: &[usize],
        added: &[usize],
        path: &JsonPath,
        mut pos: usize,
        depth: usize,
    ) -> Result<usize, DiffError> {
        let paired = removed.len().min(added.len());
        for k in 0..paired {
            let child = path.child(PathSegment::Index(pos));
            self.diff_value(&old[removed[k]], &new[added[k]], &child, depth + 1)?;
            pos += 1;
        }
        for &i in &removed[paired..] {
            self.ops.push(DiffOperation::remove(
                path.child(PathSegment::Index(pos)),
                JsonValue::from_value(old[i].clone()),
            ));
        }
        for &j in &added[paired..] {
            self.ops.push(DiffOperation::add(
                path.child(PathSegment::Index(pos)),
                JsonValue::from_value(new[j].clone()),
            ));
            pos += 1;
        }
        Ok(pos)
    }
}
