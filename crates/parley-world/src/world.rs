//! The session world: room graph, player roster, objects and the location
//! index.
//!
//! Every object appears in exactly one place. The `locations` index, room
//! contents and player inventories are only ever changed together by
//! [`World::relocate_object`], which validates the destination before it
//! removes anything, so no observer can see an object in two places or in
//! none.

use std::collections::BTreeMap;

use parley_types::{EntityRef, ObjectId, ObjectLocation, PlayerId, PropertyBag, RoomId};
use tracing::debug;

use crate::error::WorldError;
use crate::object::GameObject;
use crate::player::Player;
use crate::room::Room;

/// Per-session world state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct World {
    rooms: BTreeMap<RoomId, Room>,
    players: BTreeMap<PlayerId, Player>,
    roster: Vec<PlayerId>,
    objects: BTreeMap<ObjectId, GameObject>,
    locations: BTreeMap<ObjectId, ObjectLocation>,
}

impl World {
    /// An empty world.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Add a room.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateRoom`] if the id is taken.
    pub fn insert_room(&mut self, room: Room) -> Result<(), WorldError> {
        if self.rooms.contains_key(&room.id) {
            return Err(WorldError::DuplicateRoom(room.id));
        }
        self.rooms.insert(room.id.clone(), room);
        Ok(())
    }

    /// Add a player at the end of the roster.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicatePlayer`] if the id is taken, or
    /// [`WorldError::UnknownRoom`] if the player's room does not exist.
    pub fn insert_player(&mut self, player: Player) -> Result<(), WorldError> {
        if self.players.contains_key(&player.id) {
            return Err(WorldError::DuplicatePlayer(player.id));
        }
        if !self.rooms.contains_key(player.room()) {
            return Err(WorldError::UnknownRoom(player.room().clone()));
        }
        self.roster.push(player.id.clone());
        self.players.insert(player.id.clone(), player);
        Ok(())
    }

    /// Add an object at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateObject`] if the id is taken, or an
    /// unknown-entity error if the location does not exist.
    pub fn insert_object(
        &mut self,
        object: GameObject,
        location: ObjectLocation,
    ) -> Result<(), WorldError> {
        if self.objects.contains_key(&object.id) {
            return Err(WorldError::DuplicateObject(object.id));
        }
        self.check_location(&location)?;
        let id = object.id.clone();
        self.objects.insert(id.clone(), object);
        self.place(&id, &location)?;
        self.locations.insert(id, location);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Look up a room.
    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    /// Look up a room for mutation.
    pub fn room_mut(&mut self, id: &RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(id)
    }

    /// All rooms, ordered by id.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Look up a player.
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    /// Look up a player for mutation.
    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    /// All players in roster order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.roster.iter().filter_map(|id| self.players.get(id))
    }

    /// Player ids in roster order.
    pub fn roster(&self) -> &[PlayerId] {
        &self.roster
    }

    /// Look up an object.
    pub fn object(&self, id: &ObjectId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    /// Look up an object for mutation.
    pub fn object_mut(&mut self, id: &ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(id)
    }

    /// All objects, ordered by id.
    pub fn objects(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.values()
    }

    /// Where an object currently is.
    pub fn object_location(&self, id: &ObjectId) -> Option<&ObjectLocation> {
        self.locations.get(id)
    }

    /// Room a player or object is in. Held objects are in their holder's room.
    pub fn room_of(&self, entity: &EntityRef) -> Option<RoomId> {
        match entity {
            EntityRef::Player(id) => self.player(id).map(|p| p.room().clone()),
            EntityRef::Room(id) => self.rooms.contains_key(id).then(|| id.clone()),
            EntityRef::Object(id) => match self.locations.get(id)? {
                ObjectLocation::Room(room) => Some(room.clone()),
                ObjectLocation::Inventory(holder) => self.player(holder).map(|p| p.room().clone()),
            },
        }
    }

    /// Active players currently in `room`, in roster order.
    ///
    /// Computed from current player positions on every call.
    pub fn occupants(&self, room: &RoomId) -> Vec<PlayerId> {
        self.players()
            .filter(|p| p.is_active() && p.room() == room)
            .map(|p| p.id.clone())
            .collect()
    }

    /// Total size of everything `player` carries.
    pub fn held_size(&self, player: &PlayerId) -> u32 {
        self.player(player).map_or(0, |p| {
            p.inventory()
                .iter()
                .filter_map(|id| self.objects.get(id))
                .fold(0_u32, |total, o| total.saturating_add(o.size))
        })
    }

    /// Property bag of any entity.
    pub fn properties(&self, entity: &EntityRef) -> Option<&PropertyBag> {
        match entity {
            EntityRef::Player(id) => self.players.get(id).map(|p| &p.properties),
            EntityRef::Room(id) => self.rooms.get(id).map(|r| &r.properties),
            EntityRef::Object(id) => self.objects.get(id).map(|o| &o.properties),
        }
    }

    /// Mutable property bag of any entity.
    pub fn properties_mut(&mut self, entity: &EntityRef) -> Option<&mut PropertyBag> {
        match entity {
            EntityRef::Player(id) => self.players.get_mut(id).map(|p| &mut p.properties),
            EntityRef::Room(id) => self.rooms.get_mut(id).map(|r| &mut r.properties),
            EntityRef::Object(id) => self.objects.get_mut(id).map(|o| &mut o.properties),
        }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Move an object to `to` in one step and return where it was.
    ///
    /// The destination is validated first; on error nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownObject`] for an unknown object, or an
    /// unknown-entity error for an unknown destination.
    pub fn relocate_object(
        &mut self,
        object: &ObjectId,
        to: ObjectLocation,
    ) -> Result<ObjectLocation, WorldError> {
        let from = self
            .locations
            .get(object)
            .cloned()
            .ok_or_else(|| WorldError::UnknownObject(object.clone()))?;
        self.check_location(&to)?;

        self.unplace(object, &from);
        self.place(object, &to)?;
        self.locations.insert(object.clone(), to.clone());
        debug!(object = %object, from = %from, to = %to, "object relocated");
        Ok(from)
    }

    /// Move a player to `room` and return the room they left.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownPlayer`] or [`WorldError::UnknownRoom`].
    pub fn move_player(&mut self, player: &PlayerId, room: &RoomId) -> Result<RoomId, WorldError> {
        if !self.rooms.contains_key(room) {
            return Err(WorldError::UnknownRoom(room.clone()));
        }
        let state = self
            .players
            .get_mut(player)
            .ok_or_else(|| WorldError::UnknownPlayer(player.clone()))?;
        let from = core::mem::replace(&mut state.room, room.clone());
        debug!(player = %player, from = %from, to = %room, "player moved");
        Ok(from)
    }

    /// Mark a player active or inactive.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownPlayer`].
    pub fn set_active(&mut self, player: &PlayerId, active: bool) -> Result<(), WorldError> {
        let state = self
            .players
            .get_mut(player)
            .ok_or_else(|| WorldError::UnknownPlayer(player.clone()))?;
        state.active = active;
        Ok(())
    }

    /// Verify that every object is in exactly one place and that the
    /// location index agrees with room contents and inventories.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::IntegrityViolation`] for the first offender.
    pub fn check_integrity(&self) -> Result<(), WorldError> {
        for id in self.objects.keys() {
            let violation = |reason: String| WorldError::IntegrityViolation {
                object: id.clone(),
                reason,
            };
            let Some(location) = self.locations.get(id) else {
                return Err(violation("no recorded location".to_owned()));
            };

            let rooms_holding = self.rooms.values().filter(|r| r.contents().contains(id)).count();
            let players_holding = self.players.values().filter(|p| p.inventory().contains(id)).count();
            let places = rooms_holding.saturating_add(players_holding);
            if places != 1 {
                return Err(violation(format!("found in {places} places")));
            }

            let agrees = match location {
                ObjectLocation::Room(room) => {
                    self.rooms.get(room).is_some_and(|r| r.contents().contains(id))
                }
                ObjectLocation::Inventory(holder) => {
                    self.players.get(holder).is_some_and(|p| p.inventory().contains(id))
                }
            };
            if !agrees {
                return Err(violation(format!("index says {location}")));
            }
        }
        Ok(())
    }

    fn check_location(&self, location: &ObjectLocation) -> Result<(), WorldError> {
        match location {
            ObjectLocation::Room(room) if !self.rooms.contains_key(room) => {
                Err(WorldError::UnknownRoom(room.clone()))
            }
            ObjectLocation::Inventory(holder) if !self.players.contains_key(holder) => {
                Err(WorldError::UnknownPlayer(holder.clone()))
            }
            _ => Ok(()),
        }
    }

    fn unplace(&mut self, object: &ObjectId, from: &ObjectLocation) {
        match from {
            ObjectLocation::Room(room) => {
                if let Some(room) = self.rooms.get_mut(room) {
                    room.contents_mut().remove(object);
                }
            }
            ObjectLocation::Inventory(holder) => {
                if let Some(player) = self.players.get_mut(holder) {
                    player.inventory.remove(object);
                }
            }
        }
    }

    fn place(&mut self, object: &ObjectId, to: &ObjectLocation) -> Result<(), WorldError> {
        match to {
            ObjectLocation::Room(room) => {
                self.rooms
                    .get_mut(room)
                    .ok_or_else(|| WorldError::UnknownRoom(room.clone()))?
                    .contents_mut()
                    .insert(object.clone());
            }
            ObjectLocation::Inventory(holder) => {
                self.players
                    .get_mut(holder)
                    .ok_or_else(|| WorldError::UnknownPlayer(holder.clone()))?
                    .inventory
                    .insert(object.clone());
            }
        }
        Ok(())
    }
}
