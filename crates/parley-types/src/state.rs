//! Per-session state markers and state-change records.

use serde::{Deserialize, Serialize};

use crate::ids::{ObjectId, PlayerId, RoomId};
use crate::value::PropertyValue;

/// Resolution of a motive. `Achieved` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotiveStatus {
    /// Neither condition has held yet.
    #[default]
    Unresolved,
    /// The success condition held.
    Achieved,
    /// The failure condition held first.
    Failed,
}

impl MotiveStatus {
    /// Whether the motive is settled.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

/// Where an object currently is.
///
/// Written in content as `room:ID` or `inventory:ID`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ObjectLocation {
    /// Lying in a room.
    Room(RoomId),
    /// Carried by a player.
    Inventory(PlayerId),
}

impl core::fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Room(id) => write!(f, "room:{id}"),
            Self::Inventory(id) => write!(f, "inventory:{id}"),
        }
    }
}

impl TryFrom<String> for ObjectLocation {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        match raw.trim().split_once(':') {
            Some(("room", id)) if !id.is_empty() => Ok(Self::Room(RoomId::new(id))),
            Some(("inventory", id)) if !id.is_empty() => Ok(Self::Inventory(PlayerId::new(id))),
            _ => Err(format!("invalid object location '{raw}'")),
        }
    }
}

impl From<ObjectLocation> for String {
    fn from(location: ObjectLocation) -> Self {
        location.to_string()
    }
}

/// Any entity that carries properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "entity", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    /// A player.
    Player(PlayerId),
    /// A room.
    Room(RoomId),
    /// An object.
    Object(ObjectId),
}

impl core::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Player(id) => write!(f, "player:{id}"),
            Self::Room(id) => write!(f, "room:{id}"),
            Self::Object(id) => write!(f, "object:{id}"),
        }
    }
}

/// One entry of the net diff produced by an effect batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum StateChange {
    /// A property was written.
    Property {
        /// Owner of the property.
        entity: EntityRef,
        /// Property key.
        key: String,
        /// Previous value, if any.
        old: Option<PropertyValue>,
        /// New value.
        new: PropertyValue,
    },
    /// An object changed location.
    ObjectMoved {
        /// The object.
        object: ObjectId,
        /// Previous location.
        from: ObjectLocation,
        /// New location.
        to: ObjectLocation,
    },
    /// A player changed rooms.
    PlayerMoved {
        /// The player.
        player: PlayerId,
        /// Previous room.
        from: RoomId,
        /// New room.
        to: RoomId,
    },
    /// A hidden exit became visible.
    ExitRevealed {
        /// Room owning the exit.
        room: RoomId,
        /// Exit name.
        exit: String,
    },
    /// An exit was locked or unlocked.
    ExitLockChanged {
        /// Room owning the exit.
        room: RoomId,
        /// Exit name.
        exit: String,
        /// New lock state.
        locked: bool,
    },
}
