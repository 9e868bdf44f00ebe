//! Events and per-player observations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{EventId, PlayerId, RoomId};

/// Which players observe an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Only the acting player.
    SelfOnly,
    /// Every active player in the source room, actor included.
    RoomOccupants,
    /// Every active player in the source room except the actor.
    RoomOccupantsExcludingActor,
    /// Occupants of the room on the far side of the named exit.
    AdjacentViaExit,
    /// A single named player.
    TargetPlayer,
}

impl core::fmt::Display for Scope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::SelfOnly => "self_only",
            Self::RoomOccupants => "room_occupants",
            Self::RoomOccupantsExcludingActor => "room_occupants_excluding_actor",
            Self::AdjacentViaExit => "adjacent_via_exit",
            Self::TargetPlayer => "target_player",
        };
        f.write_str(name)
    }
}

/// Logical position of an event within a session.
///
/// Ordered by round, then by a session-wide sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Round in which the event was generated (1-based).
    pub round: u32,
    /// Strictly increasing per session.
    pub sequence: u64,
}

/// An emission request produced by an effect, not yet routed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRequest {
    /// Observer scope.
    pub scope: Scope,
    /// Fully rendered text.
    pub text: String,
    /// The acting player, if any.
    pub actor: Option<PlayerId>,
    /// Room the event originates from, captured at emission.
    pub source_room: RoomId,
    /// Exit name for [`Scope::AdjacentViaExit`].
    pub exit: Option<String>,
    /// Recipient for [`Scope::TargetPlayer`].
    pub target: Option<PlayerId>,
}

impl EventRequest {
    /// A private message for a single player.
    pub fn private(player: PlayerId, room: RoomId, text: impl Into<String>) -> Self {
        Self {
            scope: Scope::SelfOnly,
            text: text.into(),
            actor: Some(player),
            source_room: room,
            exit: None,
            target: None,
        }
    }
}

/// A routed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique id.
    pub id: EventId,
    /// Rendered text.
    pub text: String,
    /// Scope it was routed with.
    pub scope: Scope,
    /// Originating room.
    pub source_room: RoomId,
    /// Related exit, if any.
    pub exit: Option<String>,
    /// Logical timestamp.
    pub timestamp: Timestamp,
    /// Wall-clock time of routing.
    pub emitted_at: DateTime<Utc>,
    /// The acting player, if any.
    pub actor: Option<PlayerId>,
    /// Related player (target), if any.
    pub related_player: Option<PlayerId>,
}

/// Why an observation landed in a player's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    /// Something the player saw or heard happen.
    Witnessed,
    /// A message addressed to the player alone.
    Private,
    /// A motive progress message.
    Progress,
}

/// One entry in a player's observation queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Delivery kind.
    pub kind: ObservationKind,
    /// The event observed.
    pub event: Event,
}
