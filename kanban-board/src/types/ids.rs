//! Strongly typed identifiers.
//!
//! Ids are opaque strings. Records minted by the in-process stores use ULIDs,
//! but any string handed back by a remote store is accepted verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Mint a fresh ULID-backed id
            pub fn new() -> Self {
                Self(ulid::Ulid::new().to_string())
            }

            /// Wrap an existing id string
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifies a board
    BoardId
);
define_id!(
    /// Identifies a list (column) on a board
    ListId
);
define_id!(
    /// Identifies a card
    CardId
);
define_id!(
    /// Identifies a workspace member who can be assigned to cards
    MemberId
);
define_id!(
    /// Identifies a tag
    TagId
);
define_id!(
    /// Identifies the signed-in user performing mutations
    UserId
);
define_id!(
    /// Identifies an activity log entry
    LogEntryId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_ulids() {
        let id = CardId::new();
        assert_eq!(id.as_str().len(), 26);
        assert_ne!(id, CardId::new());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = ListId::from_string("todo");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"todo\"");
        let parsed: ListId = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(parsed.as_str(), "done");
        assert_eq!(parsed.to_string(), "done");
    }
}
