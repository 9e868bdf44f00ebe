//! Type-safe identifier wrappers.
//!
//! Content entities (rooms, objects, players, verbs, motives) are keyed by
//! the string ids their templates declare, so scenario files stay readable
//! and the same id means the same thing in every session. Runtime entities
//! (events, sessions) use UUID v7 so they sort by creation time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around a content-declared string key.
macro_rules! define_key {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl core::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_key! {
    /// Identifier of a room (node in the room graph).
    RoomId
}

define_key! {
    /// Identifier of a game object.
    ObjectId
}

define_key! {
    /// Identifier of a player character.
    PlayerId
}

define_key! {
    /// Canonical verb of an action definition.
    VerbId
}

define_key! {
    /// Identifier of a motive within its owning player.
    MotiveId
}

define_id! {
    /// Unique identifier for a routed event.
    EventId
}

define_id! {
    /// Unique identifier for one play session.
    SessionId
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn keys_serialize_as_plain_strings() {
        let id = RoomId::new("hall");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"hall\""));
    }

    #[test]
    fn keys_can_be_looked_up_by_str() {
        let mut map = BTreeMap::new();
        map.insert(PlayerId::from("alice"), 1_u32);
        assert_eq!(map.get("alice"), Some(&1));
    }

    #[test]
    fn runtime_ids_are_time_ordered() {
        let first = EventId::new();
        let second = EventId::new();
        assert!(first <= second);
        assert_ne!(first.into_inner(), Uuid::nil());
    }
}
