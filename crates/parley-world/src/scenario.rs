//! Instantiating a session world from scenario templates.

use std::collections::BTreeSet;

use parley_types::Scenario;
use tracing::info;

use crate::error::WorldError;
use crate::object::GameObject;
use crate::player::{MotiveState, Player};
use crate::points::ActionPoints;
use crate::room::Room;
use crate::world::World;

impl World {
    /// Build fresh per-session state from `scenario`.
    ///
    /// Players without their own `max_ap` receive `default_ap`. Content is
    /// checked as it is instantiated: duplicate ids, clashing exit names,
    /// exits or locations that point at unknown rooms or players are all
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns the first [`WorldError`] found in the content.
    pub fn from_scenario(scenario: &Scenario, default_ap: u32) -> Result<Self, WorldError> {
        let mut world = Self::new();

        for template in &scenario.rooms {
            let mut seen = BTreeSet::new();
            for exit in &template.exits {
                for name in core::iter::once(&exit.name).chain(&exit.aliases) {
                    if !seen.insert(name.to_ascii_lowercase()) {
                        return Err(WorldError::DuplicateExit {
                            room: template.id.clone(),
                            exit: name.clone(),
                        });
                    }
                }
            }
            world.insert_room(Room::from_template(template))?;
        }

        for room in world.rooms() {
            for exit in &room.exits {
                if world.room(&exit.to).is_none() {
                    return Err(WorldError::DanglingExit {
                        room: room.id.clone(),
                        exit: exit.name.clone(),
                        to: exit.to.clone(),
                    });
                }
            }
        }

        for template in &scenario.players {
            let ap = ActionPoints::new(template.max_ap.unwrap_or(default_ap));
            let mut player = Player::new(template.id.clone(), template.name.clone(), template.room.clone(), ap);
            player.properties = template.properties.clone();
            player.capacity = template.capacity;

            let mut motive_ids = BTreeSet::new();
            for motive in &template.motives {
                if !motive_ids.insert(motive.id.clone()) {
                    return Err(WorldError::DuplicateMotive {
                        player: template.id.clone(),
                        motive: motive.id.clone(),
                    });
                }
                player.motives.push(MotiveState::new(motive.clone()));
            }
            world.insert_player(player)?;
        }

        for template in &scenario.objects {
            world.insert_object(GameObject::from_template(template), template.location.clone())?;
        }

        world.check_integrity()?;
        info!(
            scenario = %scenario.name,
            rooms = scenario.rooms.len(),
            players = scenario.players.len(),
            objects = scenario.objects.len(),
            "world instantiated"
        );
        Ok(world)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parley_types::{ObjectId, ObjectLocation, PlayerId, RoomId};

    use super::*;

    const SCENARIO: &str = r"
name: test
rooms:
  - id: hall
    name: Hall
    exits:
      - { name: north, aliases: [n], to: study }
  - id: study
    name: Study
    exits:
      - { name: south, to: hall }
players:
  - id: alice
    name: Alice
    room: hall
    max_ap: 20
  - id: bob
    name: Bob
    room: study
objects:
  - id: lamp
    name: lamp
    location: inventory:alice
  - id: desk
    name: desk
    location: room:study
";

    fn scenario() -> Scenario {
        serde_yml::from_str(SCENARIO).unwrap()
    }

    #[test]
    fn builds_world_with_locations_and_budgets() {
        let world = World::from_scenario(&scenario(), 10).unwrap();
        let alice = world.player(&PlayerId::new("alice")).unwrap();
        assert_eq!(alice.ap.max(), 20);
        assert!(alice.inventory().contains(&ObjectId::new("lamp")));
        assert_eq!(world.player(&PlayerId::new("bob")).unwrap().ap.max(), 10);
        assert!(world.room(&RoomId::new("study")).unwrap().contents().contains(&ObjectId::new("desk")));
        assert_eq!(world.roster(), &[PlayerId::new("alice"), PlayerId::new("bob")]);
    }

    #[test]
    fn rejects_exit_to_unknown_room() {
        let mut scenario = scenario();
        scenario.rooms.truncate(1);
        assert!(matches!(
            World::from_scenario(&scenario, 10),
            Err(WorldError::DanglingExit { .. })
        ));
    }

    #[test]
    fn rejects_object_held_by_unknown_player() {
        let mut scenario = scenario();
        if let Some(lamp) = scenario.objects.first_mut() {
            lamp.location = ObjectLocation::Inventory(PlayerId::new("mallory"));
        }
        assert_eq!(
            World::from_scenario(&scenario, 10),
            Err(WorldError::UnknownPlayer(PlayerId::new("mallory")))
        );
    }

    #[test]
    fn rejects_clashing_exit_alias() {
        let mut scenario = scenario();
        if let Some(hall) = scenario.rooms.first_mut()
            && let Some(exit) = hall.exits.first_mut()
        {
            exit.aliases.push("NORTH".to_owned());
        }
        assert!(matches!(
            World::from_scenario(&scenario, 10),
            Err(WorldError::DuplicateExit { .. })
        ));
    }
}
