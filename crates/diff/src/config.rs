//! Diff engine configuration

use serde::{Deserialize, Serialize};
use vellum_core::{Error, Result};

/// Default recursion bound
pub const DEFAULT_MAX_DEPTH: usize = 50;
/// Default chunk size for chunked traversal (items or keys)
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default combined old+new size above which diffing is chunked (10 MiB)
pub const DEFAULT_MEMORY_THRESHOLD: usize = 10 * 1024 * 1024;
/// Default numeric equality epsilon
pub const DEFAULT_PRECISION: f64 = 1e-4;
/// Default cap on LCS table cells for one alignment
pub const DEFAULT_MAX_LCS_CELLS: usize = 4_000_000;

/// Configuration for [`DiffEngine`](crate::DiffEngine)
///
/// # Example
///
/// ```toml
/// max_depth = 50
/// chunk_size = 1000
/// memory_threshold = 10485760
/// precision = 0.0001
/// use_lcs = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Recursion depth past which subtrees are not compared
    pub max_depth: usize,
    /// Items (arrays) or keys (objects) per chunk in chunked mode
    pub chunk_size: usize,
    /// Combined serialized size of old+new that switches to chunked mode
    pub memory_threshold: usize,
    /// Numbers closer than this are equal (integers compare exactly)
    pub precision: f64,
    /// LCS alignment for arrays; `false` compares positionally
    pub use_lcs: bool,
    /// Largest LCS table built in one piece; bigger arrays are aligned in
    /// windows of `chunk_size`
    pub max_lcs_cells: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        DiffConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            chunk_size: DEFAULT_CHUNK_SIZE,
            memory_threshold: DEFAULT_MEMORY_THRESHOLD,
            precision: DEFAULT_PRECISION,
            use_lcs: true,
            max_lcs_cells: DEFAULT_MAX_LCS_CELLS,
        }
    }
}

impl DiffConfig {
    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::validation("diff chunk_size must be at least 1"));
        }
        if !self.precision.is_finite() || self.precision < 0.0 {
            return Err(Error::validation(format!(
                "diff precision must be a finite non-negative number, got {}",
                self.precision
            )));
        }
        Ok(())
    }
}
