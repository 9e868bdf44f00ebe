//! Event routing and per-player observation queues.
//!
//! An [`EventRequest`] names a scope, not a recipient list. The router turns
//! it into concrete recipients against the world as it is at the moment of
//! routing, stamps it, and appends an [`Observation`] to each recipient's
//! queue.
//!
//! Action results travel on a separate feedback channel. Both channels are
//! emptied together by [`EventRouter::drain`], which the session calls
//! exactly once per outbound turn message.

use std::collections::BTreeMap;

use chrono::Utc;
use parley_types::{
    ActionReport, Event, EventId, EventRequest, Observation, ObservationKind, PlayerId, Scope,
    Timestamp,
};
use parley_world::World;
use tracing::{debug, warn};

/// A routed event and who received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routed {
    /// The stamped event.
    pub event: Event,
    /// Players whose queues it was appended to, in roster order.
    pub recipients: Vec<PlayerId>,
}

/// Everything pending for one player, taken in one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drained {
    /// Results of the player's own actions, oldest first.
    pub feedback: Vec<ActionReport>,
    /// Observed events, in generation order.
    pub observations: Vec<Observation>,
}

/// Observation queues, feedback queues and the session event sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventRouter {
    sequence: u64,
    queues: BTreeMap<PlayerId, Vec<Observation>>,
    feedback: BTreeMap<PlayerId, Vec<ActionReport>>,
}

impl EventRouter {
    /// A router with empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `request`, delivering a witnessed observation (or a private
    /// one for self-only and targeted scopes) to every recipient.
    pub fn route(&mut self, world: &World, round: u32, request: EventRequest) -> Routed {
        let kind = if matches!(request.scope, Scope::SelfOnly | Scope::TargetPlayer) {
            ObservationKind::Private
        } else {
            ObservationKind::Witnessed
        };
        self.route_as(world, round, request, kind)
    }

    /// Route `request`, tagging every delivered observation with `kind`.
    pub fn route_as(
        &mut self,
        world: &World,
        round: u32,
        request: EventRequest,
        kind: ObservationKind,
    ) -> Routed {
        let recipients = Self::recipients(world, &request);
        self.sequence = self.sequence.saturating_add(1);
        let event = Event {
            id: EventId::new(),
            text: request.text,
            scope: request.scope,
            source_room: request.source_room,
            exit: request.exit,
            timestamp: Timestamp {
                round,
                sequence: self.sequence,
            },
            emitted_at: Utc::now(),
            actor: request.actor,
            related_player: request.target,
        };
        for player in &recipients {
            self.deliver(
                player,
                Observation {
                    kind,
                    event: event.clone(),
                },
            );
        }
        debug!(
            scope = %event.scope,
            room = %event.source_room,
            sequence = event.timestamp.sequence,
            recipients = recipients.len(),
            "event routed"
        );
        Routed { event, recipients }
    }

    /// Who is entitled to observe `request` right now.
    ///
    /// Only active players receive anything. Occupancy and adjacency are
    /// read from `world` on every call.
    pub fn recipients(world: &World, request: &EventRequest) -> Vec<PlayerId> {
        let is_actor = |id: &PlayerId| request.actor.as_ref() == Some(id);
        let active = |id: &PlayerId| world.player(id).is_some_and(|p| p.is_active());
        match request.scope {
            Scope::SelfOnly => request.actor.iter().filter(|&id| active(id)).cloned().collect(),
            Scope::TargetPlayer => request.target.iter().filter(|&id| active(id)).cloned().collect(),
            Scope::RoomOccupants => world.occupants(&request.source_room),
            Scope::RoomOccupantsExcludingActor => world
                .occupants(&request.source_room)
                .into_iter()
                .filter(|id| !is_actor(id))
                .collect(),
            Scope::AdjacentViaExit => {
                let destination = request.exit.as_deref().and_then(|exit| {
                    world
                        .room(&request.source_room)
                        .and_then(|room| room.exit(exit))
                        .map(|e| e.to.clone())
                });
                let Some(destination) = destination else {
                    warn!(
                        room = %request.source_room,
                        exit = request.exit.as_deref().unwrap_or(""),
                        "adjacent event names no usable exit, nobody hears it"
                    );
                    return Vec::new();
                };
                world
                    .occupants(&destination)
                    .into_iter()
                    .filter(|id| !is_actor(id))
                    .collect()
            }
        }
    }

    /// Append an observation to `player`'s queue.
    pub fn deliver(&mut self, player: &PlayerId, observation: Observation) {
        self.queues.entry(player.clone()).or_default().push(observation);
    }

    /// Append an action result to its player's feedback channel.
    pub fn record_feedback(&mut self, report: ActionReport) {
        self.feedback.entry(report.player.clone()).or_default().push(report);
    }

    /// Pending observations for `player`, without draining them.
    pub fn observations(&self, player: &PlayerId) -> &[Observation] {
        self.queues.get(player).map_or(&[], Vec::as_slice)
    }

    /// Pending feedback for `player`, without draining it.
    pub fn feedback(&self, player: &PlayerId) -> &[ActionReport] {
        self.feedback.get(player).map_or(&[], Vec::as_slice)
    }

    /// Take everything pending for `player`. Both queues are empty
    /// afterwards.
    pub fn drain(&mut self, player: &PlayerId) -> Drained {
        Drained {
            feedback: self.feedback.remove(player).unwrap_or_default(),
            observations: self.queues.remove(player).unwrap_or_default(),
        }
    }

    /// Sequence number of the most recently routed event.
    pub const fn last_sequence(&self) -> u64 {
        self.sequence
    }
}
