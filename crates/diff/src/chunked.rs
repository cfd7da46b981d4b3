//! Chunked traversal for large documents
//!
//! When the combined serialized size of both documents exceeds the memory
//! threshold, the top level is walked in chunks of `chunk_size` keys or
//! items. Between chunks the walker checks its [`Cancellation`] token and
//! yields the thread. The operations produced have the same effect as a
//! non-chunked diff; only the array alignment is windowed.

use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use vellum_core::{JsonPath, PathSegment};

use crate::engine::Walker;
use crate::DiffError;

/// Cooperative cancellation token for long diffs
///
/// Clones share the same flag.
///
/// # Example
///
/// ```
/// use vellum_diff::Cancellation;
///
/// let token = Cancellation::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Check whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Diff the document roots chunk by chunk
pub(crate) fn diff_top_level(
    walker: &mut Walker<'_>,
    old: &Value,
    new: &Value,
) -> Result<(), DiffError> {
    let chunk_size = walker.config().chunk_size.max(1);
    let root = JsonPath::root();
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            let keys: Vec<&String> = old_map
                .keys()
                .chain(new_map.keys())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            for chunk in keys.chunks(chunk_size) {
                walker.checkpoint()?;
                for key in chunk {
                    let path = root.child(PathSegment::Key((*key).clone()));
                    walker.diff_entry(old_map.get(*key), new_map.get(*key), &path, 1)?;
                }
            }
            Ok(())
        }
        (Value::Array(old_items), Value::Array(new_items)) => {
            walker.diff_array_windowed(old_items, new_items, &root, 0, chunk_size)
        }
        _ => walker.diff_value(old, new, &root, 0),
    }
}
