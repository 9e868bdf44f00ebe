//! Predicate evaluation against a read-only world.
//!
//! Evaluation never answers with a bare boolean: a failing predicate
//! explains itself with a human-readable reason that ends up in the actor's
//! feedback.

use parley_types::{
    EntityRef, ExitRef, PlayerId, Portability, Predicate, PropertyValue, RoomId, Subject,
};
use parley_world::{Exit, GameObject, Player, World};

use crate::binding::{Bindings, Bound};
use crate::requirements::check_requirements;
use crate::vocabulary::Vocabulary;

/// Everything a predicate may read.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    /// World state.
    pub world: &'a World,
    /// The acting (or motive-owning) player.
    pub actor: &'a PlayerId,
    /// Bound invocation parameters.
    pub bindings: &'a Bindings,
    /// Custom predicate handlers.
    pub vocabulary: &'a Vocabulary,
}

impl<'a> EvalContext<'a> {
    /// Bundle the evaluation inputs.
    pub const fn new(
        world: &'a World,
        actor: &'a PlayerId,
        bindings: &'a Bindings,
        vocabulary: &'a Vocabulary,
    ) -> Self {
        Self {
            world,
            actor,
            bindings,
            vocabulary,
        }
    }

    /// The acting player.
    ///
    /// # Errors
    ///
    /// Returns a reason if the actor is not in the world.
    pub fn actor_player(&self) -> Result<&'a Player, String> {
        self.world
            .player(self.actor)
            .ok_or_else(|| format!("unknown actor {}", self.actor))
    }

    /// Room the actor currently stands in.
    pub fn actor_room(&self) -> Result<RoomId, String> {
        self.actor_player().map(|p| p.room().clone())
    }

    /// Resolve a subject to an existing entity.
    pub fn resolve(&self, subject: &Subject) -> Result<EntityRef, String> {
        let entity = match subject {
            Subject::Actor => EntityRef::Player(self.actor.clone()),
            Subject::ActorRoom => EntityRef::Room(self.actor_room()?),
            Subject::Param(name) => match self.bindings.get(name) {
                Some(Bound::Object(id)) => EntityRef::Object(id.clone()),
                Some(Bound::Player(id)) => EntityRef::Player(id.clone()),
                Some(Bound::Exit(_) | Bound::Text(_)) => {
                    return Err(format!("parameter '{name}' does not name a player or object"));
                }
                None => return Err(format!("parameter '{name}' was not given")),
            },
            Subject::Player(id) => EntityRef::Player(id.clone()),
            Subject::Room(id) => EntityRef::Room(id.clone()),
            Subject::Object(id) => EntityRef::Object(id.clone()),
        };
        if self.world.properties(&entity).is_none() {
            return Err(format!("{entity} does not exist"));
        }
        Ok(entity)
    }

    /// Resolve a subject that must be an object.
    pub fn resolve_object(&self, subject: &Subject) -> Result<&'a GameObject, String> {
        match self.resolve(subject)? {
            EntityRef::Object(id) => self
                .world
                .object(&id)
                .ok_or_else(|| format!("object {id} does not exist")),
            other => Err(format!("{other} is not an object")),
        }
    }

    /// Resolve a subject that must be a player.
    pub fn resolve_player(&self, subject: &Subject) -> Result<&'a Player, String> {
        match self.resolve(subject)? {
            EntityRef::Player(id) => self
                .world
                .player(&id)
                .ok_or_else(|| format!("player {id} does not exist")),
            other => Err(format!("{other} is not a player")),
        }
    }

    /// Resolve a subject that must be a room.
    pub fn resolve_room(&self, subject: &Subject) -> Result<RoomId, String> {
        match self.resolve(subject)? {
            EntityRef::Room(id) => Ok(id),
            other => Err(format!("{other} is not a room")),
        }
    }

    /// The exit name an [`ExitRef`] stands for.
    pub fn exit_name(&self, exit: &ExitRef) -> Result<String, String> {
        match exit {
            ExitRef::Named(name) => Ok(name.clone()),
            ExitRef::Param(param) => match self.bindings.get(param) {
                Some(Bound::Exit(name) | Bound::Text(name)) => Ok(name.clone()),
                Some(_) => Err(format!("parameter '{param}' does not name an exit")),
                None => Err(format!("parameter '{param}' was not given")),
            },
        }
    }

    /// Find an exit of the actor's room.
    fn actor_exit(&self, exit: &ExitRef) -> Result<&'a Exit, String> {
        let name = self.exit_name(exit)?;
        let room = self.actor_room()?;
        self.world
            .room(&room)
            .and_then(|r| r.exit(&name))
            .ok_or_else(|| format!("there is no exit '{name}' here"))
    }

    /// Display name of an entity, falling back to its id.
    pub fn display_name(&self, entity: &EntityRef) -> String {
        match entity {
            EntityRef::Player(id) => self.world.player(id).map_or_else(|| id.to_string(), |p| p.name.clone()),
            EntityRef::Room(id) => self.world.room(id).map_or_else(|| id.to_string(), |r| r.name.clone()),
            EntityRef::Object(id) => self.world.object(id).map_or_else(|| id.to_string(), |o| o.name.clone()),
        }
    }

    /// Evaluate `predicate`.
    ///
    /// # Errors
    ///
    /// Returns the reason the predicate does not hold.
    pub fn evaluate(&self, predicate: &Predicate) -> Result<(), String> {
        match predicate {
            Predicate::Property {
                subject,
                key,
                cmp,
                value,
            } => {
                let entity = self.resolve(subject)?;
                let actual = self.world.properties(&entity).and_then(|p| p.get(key));
                if cmp.holds(actual, value) {
                    return Ok(());
                }
                let name = self.display_name(&entity);
                Err(match actual {
                    Some(actual) => format!("{name}'s {key} is {actual}, needs {} {value}", cmp.symbol()),
                    None => format!("{name} has no {key}, needs {} {value}", cmp.symbol()),
                })
            }
            Predicate::Colocated { subject } => {
                let entity = self.resolve(subject)?;
                let here = self.actor_room()?;
                if self.world.room_of(&entity).as_ref() == Some(&here) {
                    Ok(())
                } else {
                    Err(format!("{} is not here", self.display_name(&entity)))
                }
            }
            Predicate::ExitExists { exit } => self.actor_exit(exit).map(|_| ()),
            Predicate::ExitVisible { exit } => {
                let found = self.actor_exit(exit)?;
                if found.hidden {
                    Err(format!("there is no exit '{}' here", self.exit_name(exit)?))
                } else {
                    Ok(())
                }
            }
            Predicate::ExitUnlocked { exit } => {
                let found = self.actor_exit(exit)?;
                if found.locked {
                    Err(format!("the way {} is locked", found.name))
                } else {
                    Ok(())
                }
            }
            Predicate::ExitPassable { exit } => {
                let found = self.actor_exit(exit)?;
                check_requirements(self, &found.requirements).map_err(|unmet| unmet.reason)
            }
            Predicate::HasCapacity { object } => self.has_capacity(object),
            Predicate::Portable { object } => {
                let object = self.resolve_object(object)?;
                self.portable(object)
            }
            Predicate::Holds { holder, object } => {
                let holder = self.resolve_player(holder)?;
                let object = self.resolve_object(object)?;
                if holder.inventory().contains(&object.id) {
                    Ok(())
                } else {
                    Err(format!("{} is not carrying {}", holder.name, object.name))
                }
            }
            Predicate::InRoom { subject, room } => {
                let entity = self.resolve(subject)?;
                let room = self.resolve_room(room)?;
                if self.world.room_of(&entity).as_ref() == Some(&room) {
                    Ok(())
                } else {
                    let where_ = self.display_name(&EntityRef::Room(room));
                    Err(format!("{} is not in {where_}", self.display_name(&entity)))
                }
            }
            Predicate::All { of } => of.iter().try_for_each(|p| self.evaluate(p)),
            Predicate::Any { of } => {
                let mut reasons = Vec::new();
                for p in of {
                    match self.evaluate(p) {
                        Ok(()) => return Ok(()),
                        Err(reason) => reasons.push(reason),
                    }
                }
                Err(if reasons.is_empty() {
                    "no alternatives".to_owned()
                } else {
                    reasons.join("; or ")
                })
            }
            Predicate::Not { predicate } => match self.evaluate(predicate) {
                Ok(()) => Err(format!("must not hold: {}", describe(predicate))),
                Err(_) => Ok(()),
            },
            Predicate::Custom { name, args } => {
                let handler = self
                    .vocabulary
                    .predicate(name)
                    .ok_or_else(|| format!("unknown predicate kind '{name}'"))?;
                handler(self, args)
            }
        }
    }

    fn has_capacity(&self, object: &Subject) -> Result<(), String> {
        let object = self.resolve_object(object)?;
        let actor = self.actor_player()?;
        let Some(capacity) = actor.capacity else {
            return Ok(());
        };
        if actor.inventory().contains(&object.id) {
            return Ok(());
        }
        let load = self.world.held_size(self.actor).saturating_add(object.size);
        if load <= capacity {
            Ok(())
        } else {
            Err(format!("carrying too much to take {}", object.name))
        }
    }

    /// Whether the actor may pick `object` up.
    ///
    /// # Errors
    ///
    /// Returns the reason the object's portability constraint rejects the
    /// actor.
    pub fn portable(&self, object: &GameObject) -> Result<(), String> {
        let actor = self.actor_player()?;
        let int_property = |key: &str| actor.properties.get(key).and_then(PropertyValue::as_int);
        match &object.portability {
            Portability::Portable => Ok(()),
            Portability::Immovable => Err(format!("{} cannot be moved", object.name)),
            Portability::SizeGated { property } => {
                let strength = int_property(property).unwrap_or(0);
                if strength >= i64::from(object.size) {
                    Ok(())
                } else {
                    Err(format!("{} is too big for you to carry", object.name))
                }
            }
            Portability::LevelGated { property, minimum } => {
                if int_property(property).unwrap_or(0) >= *minimum {
                    Ok(())
                } else {
                    Err(format!("you need {property} {minimum} to take {}", object.name))
                }
            }
            Portability::ClassGated { property, allowed } => {
                let class = actor.properties.get(property).and_then(PropertyValue::as_text);
                if class.is_some_and(|c| allowed.iter().any(|a| a.eq_ignore_ascii_case(c))) {
                    Ok(())
                } else {
                    Err(format!("only {} may take {}", allowed.join(" or "), object.name))
                }
            }
            Portability::Custom { name, args } => {
                let handler = self
                    .vocabulary
                    .predicate(name)
                    .ok_or_else(|| format!("unknown predicate kind '{name}'"))?;
                let mut bindings = self.bindings.clone();
                bindings.insert("object", Bound::Object(object.id.clone()));
                handler(&EvalContext { bindings: &bindings, ..*self }, args)
            }
        }
    }
}

/// Short description of a predicate for negated reasons.
pub fn describe(predicate: &Predicate) -> String {
    match predicate {
        Predicate::Property { subject, key, cmp, value } => {
            format!("{subject} {key} {} {value}", cmp.symbol())
        }
        Predicate::Colocated { subject } => format!("{subject} is here"),
        Predicate::ExitExists { exit } => format!("exit {exit} exists"),
        Predicate::ExitVisible { exit } => format!("exit {exit} is visible"),
        Predicate::ExitUnlocked { exit } => format!("exit {exit} is unlocked"),
        Predicate::ExitPassable { exit } => format!("exit {exit} is passable"),
        Predicate::HasCapacity { object } => format!("room to carry {object}"),
        Predicate::Portable { object } => format!("{object} can be carried"),
        Predicate::Holds { holder, object } => format!("{holder} holds {object}"),
        Predicate::InRoom { subject, room } => format!("{subject} is in {room}"),
        Predicate::All { of } => of.iter().map(describe).collect::<Vec<_>>().join(" and "),
        Predicate::Any { of } => of.iter().map(describe).collect::<Vec<_>>().join(" or "),
        Predicate::Not { predicate } => format!("not ({})", describe(predicate)),
        Predicate::Custom { name, .. } => name.clone(),
    }
}
