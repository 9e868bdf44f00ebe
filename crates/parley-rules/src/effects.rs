//! Effect execution.
//!
//! Effects run strictly in declaration order against the live world.
//! Conditional effects look at the state as it is at their position in the
//! list, and `emit` captures its source room at that same point, so a
//! `move_player` followed by an `emit` narrates from the new room. Emission
//! requests are returned for routing rather than delivered here.

use parley_types::{
    Destination, Effect, EntityRef, EventRequest, ExitRef, ObjectLocation, PlayerDestination,
    PlayerId, PropertyValue, RoomId, Scope, StateChange, Subject,
};
use parley_world::World;
use tracing::debug;

use crate::binding::Bindings;
use crate::error::EffectError;
use crate::predicate::EvalContext;
use crate::render::TextRenderer;
use crate::vocabulary::Vocabulary;

/// Everything an effect batch produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectOutcome {
    /// Emission requests in generation order.
    pub events: Vec<EventRequest>,
    /// Net state diff in application order.
    pub changes: Vec<StateChange>,
}

/// Applies effect lists for one actor.
pub struct EffectExecutor<'a> {
    vocabulary: &'a Vocabulary,
    renderer: &'a TextRenderer,
}

impl<'a> EffectExecutor<'a> {
    /// Executor using the given custom kinds and text renderer.
    pub const fn new(vocabulary: &'a Vocabulary, renderer: &'a TextRenderer) -> Self {
        Self { vocabulary, renderer }
    }

    /// Apply `effects` in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`EffectError`]. Effects before the failing one
    /// have already been applied.
    pub fn execute(
        &self,
        world: &mut World,
        actor: &PlayerId,
        bindings: &Bindings,
        effects: &[Effect],
    ) -> Result<EffectOutcome, EffectError> {
        let mut outcome = EffectOutcome::default();
        self.apply_all(world, actor, bindings, effects, &mut outcome)?;
        debug!(
            actor = %actor,
            events = outcome.events.len(),
            changes = outcome.changes.len(),
            "effects applied"
        );
        Ok(outcome)
    }

    fn apply_all(
        &self,
        world: &mut World,
        actor: &PlayerId,
        bindings: &Bindings,
        effects: &[Effect],
        outcome: &mut EffectOutcome,
    ) -> Result<(), EffectError> {
        for effect in effects {
            self.apply(world, actor, bindings, effect, outcome)?;
        }
        Ok(())
    }

    fn apply(
        &self,
        world: &mut World,
        actor: &PlayerId,
        bindings: &Bindings,
        effect: &Effect,
        outcome: &mut EffectOutcome,
    ) -> Result<(), EffectError> {
        let ctx = EvalContext::new(world, actor, bindings, self.vocabulary);
        match effect {
            Effect::Set { subject, key, value } => {
                let entity = resolve(&ctx, subject)?;
                let props = properties_mut(world, &entity, subject)?;
                let old = props.insert(key.clone(), value.clone());
                if old.as_ref() != Some(value) {
                    outcome.changes.push(StateChange::Property {
                        entity,
                        key: key.clone(),
                        old,
                        new: value.clone(),
                    });
                }
            }
            Effect::Increment { subject, key, by } => {
                let entity = resolve(&ctx, subject)?;
                let props = properties_mut(world, &entity, subject)?;
                let old = props.get(key).cloned();
                let current = match &old {
                    None => 0,
                    Some(PropertyValue::Int(i)) => *i,
                    Some(_) => {
                        return Err(EffectError::TypeMismatch {
                            entity,
                            key: key.clone(),
                        });
                    }
                };
                let Some(next) = current.checked_add(*by) else {
                    return Err(EffectError::Overflow {
                        entity,
                        key: key.clone(),
                    });
                };
                let new = PropertyValue::Int(next);
                props.insert(key.clone(), new.clone());
                if old.as_ref() != Some(&new) {
                    outcome.changes.push(StateChange::Property {
                        entity,
                        key: key.clone(),
                        old,
                        new,
                    });
                }
            }
            Effect::MoveObject { object, to } => {
                let object_id = match resolve(&ctx, object)? {
                    EntityRef::Object(id) => id,
                    _ => return Err(wrong(object, "object")),
                };
                let destination = match to {
                    Destination::ActorInventory => ObjectLocation::Inventory(actor.clone()),
                    Destination::ActorRoom => ObjectLocation::Room(actor_room(&ctx)?),
                    Destination::Room { room } => ObjectLocation::Room(resolve_room(&ctx, room)?),
                    Destination::Inventory { holder } => match resolve(&ctx, holder)? {
                        EntityRef::Player(id) => ObjectLocation::Inventory(id),
                        _ => return Err(wrong(holder, "player")),
                    },
                };
                let from = world.relocate_object(&object_id, destination.clone())?;
                if from != destination {
                    outcome.changes.push(StateChange::ObjectMoved {
                        object: object_id,
                        from,
                        to: destination,
                    });
                }
            }
            Effect::MovePlayer { player, to } => {
                let player_id = match resolve(&ctx, player)? {
                    EntityRef::Player(id) => id,
                    _ => return Err(wrong(player, "player")),
                };
                let destination = match to {
                    PlayerDestination::Room { room } => resolve_room(&ctx, room)?,
                    PlayerDestination::Exit { exit } => {
                        let current = world
                            .player(&player_id)
                            .map(|p| p.room().clone())
                            .ok_or_else(|| unresolved(player, "player does not exist"))?;
                        let name = exit_name(&ctx, exit)?;
                        world
                            .room(&current)
                            .and_then(|r| r.exit(&name))
                            .map(|e| e.to.clone())
                            .ok_or(EffectError::UnresolvedExit {
                                room: current,
                                exit: name,
                            })?
                    }
                };
                let from = world.move_player(&player_id, &destination)?;
                if from != destination {
                    outcome.changes.push(StateChange::PlayerMoved {
                        player: player_id,
                        from,
                        to: destination,
                    });
                }
            }
            Effect::RevealExit { room, exit } => {
                let (room_id, name) = exit_target(&ctx, room.as_ref(), exit)?;
                let found = world
                    .room_mut(&room_id)
                    .and_then(|r| r.exit_mut(&name))
                    .ok_or_else(|| EffectError::UnresolvedExit {
                        room: room_id.clone(),
                        exit: name.clone(),
                    })?;
                if found.hidden {
                    found.hidden = false;
                    outcome.changes.push(StateChange::ExitRevealed {
                        room: room_id,
                        exit: found.name.clone(),
                    });
                }
            }
            Effect::LockExit { room, exit, locked } => {
                let (room_id, name) = exit_target(&ctx, room.as_ref(), exit)?;
                let found = world
                    .room_mut(&room_id)
                    .and_then(|r| r.exit_mut(&name))
                    .ok_or_else(|| EffectError::UnresolvedExit {
                        room: room_id.clone(),
                        exit: name.clone(),
                    })?;
                if found.locked != *locked {
                    found.locked = *locked;
                    outcome.changes.push(StateChange::ExitLockChanged {
                        room: room_id,
                        exit: found.name.clone(),
                        locked: *locked,
                    });
                }
            }
            Effect::Emit {
                scope,
                text,
                exit,
                target,
                room,
            } => {
                let source_room = match room {
                    Some(subject) => {
                        let entity = resolve(&ctx, subject)?;
                        world
                            .room_of(&entity)
                            .ok_or_else(|| unresolved(subject, "has no room"))?
                    }
                    None => actor_room(&ctx)?,
                };
                let exit = exit.as_ref().map(|e| exit_name(&ctx, e)).transpose()?;
                let target = match target {
                    Some(subject) => match resolve(&ctx, subject)? {
                        EntityRef::Player(id) => Some(id),
                        _ => return Err(wrong(subject, "player")),
                    },
                    None => None,
                };
                if *scope == Scope::AdjacentViaExit && exit.is_none() {
                    return Err(EffectError::IncompleteEmission {
                        scope: *scope,
                        missing: "exit",
                    });
                }
                if *scope == Scope::TargetPlayer && target.is_none() {
                    return Err(EffectError::IncompleteEmission {
                        scope: *scope,
                        missing: "target",
                    });
                }
                outcome.events.push(EventRequest {
                    scope: *scope,
                    text: self.renderer.render(text, world, actor, bindings),
                    actor: Some(actor.clone()),
                    source_room,
                    exit,
                    target,
                });
            }
            Effect::When {
                condition,
                then,
                otherwise,
            } => {
                let branch = if ctx.evaluate(condition).is_ok() { then } else { otherwise };
                self.apply_all(world, actor, bindings, branch, outcome)?;
            }
            Effect::Custom { name, args } => {
                let handler = self
                    .vocabulary
                    .effect(name)
                    .ok_or_else(|| EffectError::UnknownKind(name.clone()))?;
                let changes = handler(world, actor, bindings, args).map_err(|reason| EffectError::Custom {
                    kind: name.clone(),
                    reason,
                })?;
                outcome.changes.extend(changes);
            }
        }
        Ok(())
    }
}

fn resolve(ctx: &EvalContext<'_>, subject: &Subject) -> Result<EntityRef, EffectError> {
    ctx.resolve(subject).map_err(|reason| unresolved(subject, &reason))
}

fn resolve_room(ctx: &EvalContext<'_>, subject: &Subject) -> Result<RoomId, EffectError> {
    match resolve(ctx, subject)? {
        EntityRef::Room(id) => Ok(id),
        _ => Err(wrong(subject, "room")),
    }
}

fn actor_room(ctx: &EvalContext<'_>) -> Result<RoomId, EffectError> {
    ctx.actor_room().map_err(|reason| unresolved(&Subject::Actor, &reason))
}

fn exit_name(ctx: &EvalContext<'_>, exit: &ExitRef) -> Result<String, EffectError> {
    ctx.exit_name(exit).map_err(|reason| EffectError::UnresolvedSubject {
        subject: exit.to_string(),
        reason,
    })
}

fn exit_target(
    ctx: &EvalContext<'_>,
    room: Option<&Subject>,
    exit: &ExitRef,
) -> Result<(RoomId, String), EffectError> {
    let room_id = match room {
        Some(subject) => resolve_room(ctx, subject)?,
        None => actor_room(ctx)?,
    };
    Ok((room_id, exit_name(ctx, exit)?))
}

fn properties_mut<'w>(
    world: &'w mut World,
    entity: &EntityRef,
    subject: &Subject,
) -> Result<&'w mut parley_types::PropertyBag, EffectError> {
    world
        .properties_mut(entity)
        .ok_or_else(|| unresolved(subject, "does not exist"))
}

fn unresolved(subject: &Subject, reason: &str) -> EffectError {
    EffectError::UnresolvedSubject {
        subject: subject.to_string(),
        reason: reason.to_owned(),
    }
}

fn wrong(subject: &Subject, expected: &'static str) -> EffectError {
    EffectError::WrongEntity {
        subject: subject.to_string(),
        expected,
    }
}
