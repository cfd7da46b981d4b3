//! Identifier types
//!
//! - VersionId: identifies one stored version
//! - BranchId: identifies a branch (a named head pointer)
//! - TagId: identifies a tag attached to a version
//!
//! All three wrap a UUID v4 and serialize as the hyphenated string form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random id using UUID v4
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an id from raw bytes
            pub fn from_bytes(bytes: [u8; 16]) -> Self {
                Self(Uuid::from_bytes(bytes))
            }

            /// Parse an id from its string form, `None` if not a UUID
            pub fn from_string(s: &str) -> Option<Self> {
                Uuid::parse_str(s).ok().map(Self)
            }

            /// Get the raw bytes of this id
            pub fn as_bytes(&self) -> &[u8; 16] {
                self.0.as_bytes()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a stored version
    VersionId
);

uuid_id!(
    /// Unique identifier for a branch
    BranchId
);

uuid_id!(
    /// Unique identifier for a tag
    TagId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(VersionId::new(), VersionId::new());
        assert_ne!(BranchId::new(), BranchId::new());
    }

    #[test]
    fn test_id_string_roundtrip() {
        let id = VersionId::new();
        let parsed: VersionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert_eq!(VersionId::from_string(&id.to_string()), Some(id));
        assert_eq!(VersionId::from_string("not-a-uuid"), None);
    }

    #[test]
    fn test_id_serializes_as_string() {
        let id = TagId::from_bytes([7; 16]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}
