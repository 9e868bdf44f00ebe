//! Error types for the `parley-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`].

use parley_types::{MotiveId, ObjectId, PlayerId, RoomId};

/// Errors that can occur while building or mutating the world.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// A room was not found.
    #[error("room not found: {0}")]
    UnknownRoom(RoomId),

    /// A player was not found.
    #[error("player not found: {0}")]
    UnknownPlayer(PlayerId),

    /// An object was not found.
    #[error("object not found: {0}")]
    UnknownObject(ObjectId),

    /// A player has no motive with this id.
    #[error("player {player} has no motive {motive}")]
    UnknownMotive {
        /// Owning player.
        player: PlayerId,
        /// Missing motive id.
        motive: MotiveId,
    },

    /// A room id was declared twice.
    #[error("duplicate room id: {0}")]
    DuplicateRoom(RoomId),

    /// A player id was declared twice.
    #[error("duplicate player id: {0}")]
    DuplicatePlayer(PlayerId),

    /// An object id was declared twice.
    #[error("duplicate object id: {0}")]
    DuplicateObject(ObjectId),

    /// Two exits of one room answer to the same name.
    #[error("room {room} declares exit '{exit}' more than once")]
    DuplicateExit {
        /// The room.
        room: RoomId,
        /// The clashing name or alias.
        exit: String,
    },

    /// An exit leads to a room that does not exist.
    #[error("exit '{exit}' of room {room} leads to unknown room {to}")]
    DanglingExit {
        /// Room owning the exit.
        room: RoomId,
        /// Exit name.
        exit: String,
        /// Missing destination.
        to: RoomId,
    },

    /// A player declares two motives with the same id.
    #[error("player {player} declares motive {motive} more than once")]
    DuplicateMotive {
        /// Owning player.
        player: PlayerId,
        /// Clashing motive id.
        motive: MotiveId,
    },

    /// A spend exceeded the remaining action points.
    #[error("insufficient action points: need {needed}, have {available}")]
    InsufficientActionPoints {
        /// Points requested.
        needed: u32,
        /// Points remaining.
        available: u32,
    },

    /// The object location index disagrees with room or inventory contents.
    #[error("object {object} violates location uniqueness: {reason}")]
    IntegrityViolation {
        /// Offending object.
        object: ObjectId,
        /// What disagrees.
        reason: String,
    },
}
