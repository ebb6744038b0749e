//! Identifier types.
//!
//! Ids issued by the server are opaque strings (hex object ids in practice).
//! Ids minted locally use a v4 UUID so they never collide with server ids.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an id received from elsewhere.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Mint a fresh id for something created locally.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

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
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifies a drawable object.
    ObjectId
);

string_id!(
    /// Identifies a canvas, root or nested.
    CanvasId
);

string_id!(
    /// Identifies a whiteboard.
    WhiteboardId
);

string_id!(
    /// Identifies a connected client (one browser session of a user).
    ClientId
);

string_id!(
    /// Identifies a user account, as listed in access lists.
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(ObjectId::generate(), ObjectId::generate());
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = CanvasId::from("68d5e8d4829da666aece0200");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"68d5e8d4829da666aece0200\"");
        let back: CanvasId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
