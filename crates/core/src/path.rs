//! Typed paths into a JSON document
//!
//! A path is an ordered sequence of [`PathSegment`]s. Paths are built typed
//! by the diff engine and applied as-is; they are never re-derived from text
//! at apply time.
//!
//! # Text form
//!
//! `Display` renders RFC 6901 JSON Pointer syntax (`/items/0/name`, root is
//! the empty string, `~` and `/` escaped as `~0` and `~1`). `FromStr` parses
//! the same syntax and treats all-digit tokens as array indices; it exists
//! for callers and tests, the engine itself never round-trips through text.
//!
//! | Pointer | Segments |
//! |---------|----------|
//! | `` | root |
//! | `/user` | `Key("user")` |
//! | `/items/0` | `Key("items"), Index(0)` |
//! | `/a~1b` | `Key("a/b")` |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::json::value_type_name;

/// Error type for JSON pointer parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// Non-empty pointer that does not start with '/'
    #[error("pointer must start with '/': {0}")]
    MissingLeadingSlash(String),
    /// '~' not followed by '0' or '1'
    #[error("invalid escape sequence in token '{0}'")]
    InvalidEscape(String),
}

/// A segment in a JSON path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PathSegment {
    /// Object key
    Key(String),
    /// Array index
    Index(usize),
}

impl PathSegment {
    /// Check if this segment addresses an array element
    pub fn is_index(&self) -> bool {
        matches!(self, PathSegment::Index(_))
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "/{}", k.replace('~', "~0").replace('/', "~1")),
            PathSegment::Index(i) => write!(f, "/{}", i),
        }
    }
}

/// A path into a JSON document
///
/// # Examples
///
/// ```
/// use vellum_core::JsonPath;
///
/// let path = JsonPath::root().key("items").index(0).key("name");
/// assert_eq!(path.to_string(), "/items/0/name");
///
/// let parsed: JsonPath = "/items/0/name".parse().unwrap();
/// assert_eq!(parsed, path);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    /// Create the root path (empty path)
    pub fn root() -> Self {
        JsonPath {
            segments: Vec::new(),
        }
    }

    /// Create a path from a vector of segments
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        JsonPath { segments }
    }

    /// Get the path segments
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if this is the root path (empty)
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Check if this is the root path
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a key segment (builder pattern)
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(key.into()));
        self
    }

    /// Append an index segment (builder pattern)
    pub fn index(mut self, idx: usize) -> Self {
        self.segments.push(PathSegment::Index(idx));
        self
    }

    /// Return a child path with one more segment
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        JsonPath { segments }
    }

    /// Get the parent path (None if root)
    pub fn parent(&self) -> Option<JsonPath> {
        if self.segments.is_empty() {
            None
        } else {
            let mut parent = self.clone();
            parent.segments.pop();
            Some(parent)
        }
    }

    /// Get the last segment (None if root)
    pub fn last_segment(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Check if this path is a prefix of (or equal to) another
    pub fn is_ancestor_of(&self, other: &JsonPath) -> bool {
        self.segments.len() <= other.segments.len()
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|(a, b)| a == b)
    }
}

impl FromStr for JsonPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(JsonPath::root());
        }
        let rest = s
            .strip_prefix('/')
            .ok_or_else(|| PathParseError::MissingLeadingSlash(s.to_string()))?;

        let mut segments = Vec::new();
        for token in rest.split('/') {
            let unescaped = unescape_token(token)?;
            let is_index = !unescaped.is_empty()
                && unescaped.bytes().all(|b| b.is_ascii_digit())
                && (unescaped == "0" || !unescaped.starts_with('0'));
            match unescaped.parse::<usize>() {
                Ok(idx) if is_index => segments.push(PathSegment::Index(idx)),
                _ => segments.push(PathSegment::Key(unescaped)),
            }
        }
        Ok(JsonPath { segments })
    }
}

fn unescape_token(token: &str) -> Result<String, PathParseError> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return Err(PathParseError::InvalidEscape(token.to_string())),
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seg in &self.segments {
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

// =============================================================================
// Path Operations
// =============================================================================

/// Error type for applying an operation at a path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// Container kind at the path does not match the segment kind
    #[error("type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Path where traversal failed
        path: String,
        /// Expected container type
        expected: &'static str,
        /// Actual type found
        found: &'static str,
    },

    /// Array index out of bounds
    #[error("index out of bounds at '{path}': {index} > {len}")]
    IndexOutOfBounds {
        /// Path of the array
        path: String,
        /// The requested index
        index: usize,
        /// The array length
        len: usize,
    },

    /// Source path of a move/copy (or required path) does not exist
    #[error("path not found: '{0}'")]
    NotFound(String),

    /// An operation is missing a field it requires
    #[error("malformed operation at '{path}': {reason}")]
    Malformed {
        /// Path of the operation
        path: String,
        /// What is missing
        reason: &'static str,
    },
}

/// How the final segment is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    /// Overwrite an existing array slot (append at `len`)
    Set,
    /// Insert into the array, shifting later elements
    Insert,
}

/// Get value at path
pub fn get_at_path<'a>(
    value: &'a serde_json::Value,
    path: &JsonPath,
) -> Option<&'a serde_json::Value> {
    let mut current = value;
    for segment in path.segments() {
        current = match (segment, current) {
            (PathSegment::Key(key), serde_json::Value::Object(obj)) => obj.get(key)?,
            (PathSegment::Index(idx), serde_json::Value::Array(arr)) => arr.get(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Set value at path, overwriting array slots
///
/// Missing intermediate containers are created; whether an object or an
/// array is created depends on the kind of the following segment. A `null`
/// on the way is replaced by the container the next segment needs.
pub fn set_at_path(
    root: &mut serde_json::Value,
    path: &JsonPath,
    value: serde_json::Value,
) -> Result<(), PatchError> {
    write_at_path(root, path, value, WriteMode::Set)
}

/// Insert value at path, shifting later array elements
///
/// For object keys this behaves like [`set_at_path`].
pub fn insert_at_path(
    root: &mut serde_json::Value,
    path: &JsonPath,
    value: serde_json::Value,
) -> Result<(), PatchError> {
    write_at_path(root, path, value, WriteMode::Insert)
}

fn write_at_path(
    root: &mut serde_json::Value,
    path: &JsonPath,
    value: serde_json::Value,
    mode: WriteMode,
) -> Result<(), PatchError> {
    let segments = path.segments();
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return Ok(());
    };

    let mut current = root;
    for (i, segment) in parents.iter().enumerate() {
        let next_is_index = segments[i + 1].is_index();
        let new_container = || {
            if next_is_index {
                serde_json::Value::Array(Vec::new())
            } else {
                serde_json::Value::Object(serde_json::Map::new())
            }
        };
        current = descend_or_create(current, segment, new_container, &segments[..=i])?;
    }

    match last {
        PathSegment::Key(key) => {
            if current.is_null() {
                *current = serde_json::Value::Object(serde_json::Map::new());
            }
            let found = value_type_name(current);
            let obj = current.as_object_mut().ok_or_else(|| PatchError::TypeMismatch {
                path: path_prefix(parents),
                expected: "object",
                found,
            })?;
            obj.insert(key.clone(), value);
            Ok(())
        }
        PathSegment::Index(idx) => {
            if current.is_null() {
                *current = serde_json::Value::Array(Vec::new());
            }
            let found = value_type_name(current);
            let arr = current.as_array_mut().ok_or_else(|| PatchError::TypeMismatch {
                path: path_prefix(parents),
                expected: "array",
                found,
            })?;
            let len = arr.len();
            match mode {
                WriteMode::Set if *idx < len => arr[*idx] = value,
                WriteMode::Set | WriteMode::Insert if *idx == len => arr.push(value),
                WriteMode::Insert if *idx < len => arr.insert(*idx, value),
                _ => {
                    return Err(PatchError::IndexOutOfBounds {
                        path: path_prefix(parents),
                        index: *idx,
                        len,
                    })
                }
            }
            Ok(())
        }
    }
}

fn descend_or_create<'a>(
    current: &'a mut serde_json::Value,
    segment: &PathSegment,
    new_container: impl Fn() -> serde_json::Value,
    prefix: &[PathSegment],
) -> Result<&'a mut serde_json::Value, PatchError> {
    match segment {
        PathSegment::Key(key) => {
            if current.is_null() {
                *current = serde_json::Value::Object(serde_json::Map::new());
            }
            let found = value_type_name(current);
            let obj = current.as_object_mut().ok_or_else(|| PatchError::TypeMismatch {
                path: path_prefix(&prefix[..prefix.len() - 1]),
                expected: "object",
                found,
            })?;
            Ok(obj.entry(key.clone()).or_insert_with(new_container))
        }
        PathSegment::Index(idx) => {
            if current.is_null() {
                *current = serde_json::Value::Array(Vec::new());
            }
            let found = value_type_name(current);
            let arr = current.as_array_mut().ok_or_else(|| PatchError::TypeMismatch {
                path: path_prefix(&prefix[..prefix.len() - 1]),
                expected: "array",
                found,
            })?;
            if *idx == arr.len() {
                arr.push(new_container());
            }
            let len = arr.len();
            arr.get_mut(*idx).ok_or_else(|| PatchError::IndexOutOfBounds {
                path: path_prefix(&prefix[..prefix.len() - 1]),
                index: *idx,
                len,
            })
        }
    }
}

/// Remove value at path
///
/// Object keys are deleted, array elements are spliced out. Removing the
/// root replaces it with null. Returns `Ok(None)` if the path did not exist.
pub fn remove_at_path(
    root: &mut serde_json::Value,
    path: &JsonPath,
) -> Result<Option<serde_json::Value>, PatchError> {
    let segments = path.segments();
    let Some((last, parents)) = segments.split_last() else {
        return Ok(Some(std::mem::take(root)));
    };

    let mut current = root;
    for segment in parents {
        current = match (segment, current) {
            (PathSegment::Key(key), serde_json::Value::Object(obj)) => match obj.get_mut(key) {
                Some(v) => v,
                None => return Ok(None),
            },
            (PathSegment::Index(idx), serde_json::Value::Array(arr)) => match arr.get_mut(*idx) {
                Some(v) => v,
                None => return Ok(None),
            },
            _ => return Ok(None),
        };
    }

    match (last, current) {
        (PathSegment::Key(key), serde_json::Value::Object(obj)) => Ok(obj.remove(key)),
        (PathSegment::Index(idx), serde_json::Value::Array(arr)) => {
            if *idx < arr.len() {
                Ok(Some(arr.remove(*idx)))
            } else {
                Ok(None)
            }
        }
        (PathSegment::Key(_), other) => Err(PatchError::TypeMismatch {
            path: path_prefix(parents),
            expected: "object",
            found: value_type_name(other),
        }),
        (PathSegment::Index(_), other) => Err(PatchError::TypeMismatch {
            path: path_prefix(parents),
            expected: "array",
            found: value_type_name(other),
        }),
    }
}

fn path_prefix(segments: &[PathSegment]) -> String {
    JsonPath::from_segments(segments.to_vec()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(s: &str) -> JsonPath {
        s.parse().unwrap()
    }

    #[test]
    fn test_pointer_display_and_parse() {
        let path = JsonPath::root().key("a/b").key("c~d").index(3);
        assert_eq!(path.to_string(), "/a~1b/c~0d/3");
        assert_eq!(p("/a~1b/c~0d/3"), path);
        assert_eq!(JsonPath::root().to_string(), "");
        assert_eq!(p(""), JsonPath::root());
    }

    #[test]
    fn test_parse_leading_zero_is_key() {
        assert_eq!(p("/007"), JsonPath::root().key("007"));
        assert_eq!(p("/0"), JsonPath::root().index(0));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "a/b".parse::<JsonPath>(),
            Err(PathParseError::MissingLeadingSlash(_))
        ));
        assert!(matches!(
            "/a~2".parse::<JsonPath>(),
            Err(PathParseError::InvalidEscape(_))
        ));
    }

    #[test]
    fn test_parent_and_ancestry() {
        let path = p("/a/b/0");
        assert_eq!(path.parent(), Some(p("/a/b")));
        assert!(p("/a").is_ancestor_of(&path));
        assert!(JsonPath::root().is_ancestor_of(&path));
        assert!(!p("/b").is_ancestor_of(&path));
        assert_eq!(JsonPath::root().parent(), None);
    }

    #[test]
    fn test_get_at_path() {
        let doc = json!({"user": {"scores": [100, 95]}});
        assert_eq!(get_at_path(&doc, &p("/user/scores/1")), Some(&json!(95)));
        assert_eq!(get_at_path(&doc, &p("/user/missing")), None);
        assert_eq!(get_at_path(&doc, &JsonPath::root()), Some(&doc));
    }

    #[test]
    fn test_set_creates_intermediates_by_next_segment() {
        let mut doc = json!({});
        set_at_path(&mut doc, &p("/a/list/0/name"), json!("x")).unwrap();
        assert_eq!(doc, json!({"a": {"list": [{"name": "x"}]}}));
    }

    #[test]
    fn test_set_overwrites_array_slot() {
        let mut doc = json!([1, 2, 3]);
        set_at_path(&mut doc, &p("/1"), json!(9)).unwrap();
        assert_eq!(doc, json!([1, 9, 3]));
        set_at_path(&mut doc, &p("/3"), json!(4)).unwrap();
        assert_eq!(doc, json!([1, 9, 3, 4]));
    }

    #[test]
    fn test_insert_shifts_array() {
        let mut doc = json!([1, 3]);
        insert_at_path(&mut doc, &p("/1"), json!(2)).unwrap();
        assert_eq!(doc, json!([1, 2, 3]));
        insert_at_path(&mut doc, &p("/3"), json!(4)).unwrap();
        assert_eq!(doc, json!([1, 2, 3, 4]));
    }

    #[test]
    fn test_insert_out_of_bounds() {
        let mut doc = json!([1]);
        let err = insert_at_path(&mut doc, &p("/5"), json!(2)).unwrap_err();
        assert!(matches!(err, PatchError::IndexOutOfBounds { index: 5, len: 1, .. }));
    }

    #[test]
    fn test_set_type_mismatch() {
        let mut doc = json!({"a": 5});
        let err = set_at_path(&mut doc, &p("/a/b"), json!(1)).unwrap_err();
        assert!(matches!(err, PatchError::TypeMismatch { expected: "object", found: "number", .. }));
    }

    #[test]
    fn test_set_root() {
        let mut doc = json!({"a": 1});
        set_at_path(&mut doc, &JsonPath::root(), json!([1])).unwrap();
        assert_eq!(doc, json!([1]));
    }

    #[test]
    fn test_remove_key_and_element() {
        let mut doc = json!({"a": [1, 2, 3], "b": true});
        assert_eq!(remove_at_path(&mut doc, &p("/b")).unwrap(), Some(json!(true)));
        assert_eq!(remove_at_path(&mut doc, &p("/a/0")).unwrap(), Some(json!(1)));
        assert_eq!(doc, json!({"a": [2, 3]}));
        assert_eq!(remove_at_path(&mut doc, &p("/zzz")).unwrap(), None);
    }

    #[test]
    fn test_remove_root_yields_null() {
        let mut doc = json!({"a": 1});
        let old = remove_at_path(&mut doc, &JsonPath::root()).unwrap();
        assert_eq!(old, Some(json!({"a": 1})));
        assert!(doc.is_null());
    }
}
