//! Rooms and their exits.
//!
//! A [`Room`] owns its exits in declaration order and the set of objects
//! lying in it. Occupancy is not stored here: players carry their own room,
//! and [`crate::World::occupants`] derives occupancy on demand so it is never
//! stale.

use std::collections::BTreeSet;

use parley_types::{ExitTemplate, ObjectId, PropertyBag, Requirement, RoomId, RoomTemplate};

/// A directed connection to another room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exit {
    /// Canonical name.
    pub name: String,
    /// Alternative names.
    pub aliases: Vec<String>,
    /// Destination room.
    pub to: RoomId,
    /// Excluded from default disclosure.
    pub hidden: bool,
    /// Blocks passage while set.
    pub locked: bool,
    /// Conditions for passing through.
    pub requirements: Vec<Requirement>,
}

impl Exit {
    /// Whether `name` matches the exit name or an alias, ignoring case.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

impl From<&ExitTemplate> for Exit {
    fn from(template: &ExitTemplate) -> Self {
        Self {
            name: template.name.clone(),
            aliases: template.aliases.clone(),
            to: template.to.clone(),
            hidden: template.hidden,
            locked: template.locked,
            requirements: template.requirements.clone(),
        }
    }
}

/// A node of the room graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    /// Room id.
    pub id: RoomId,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Exits in declaration order.
    pub exits: Vec<Exit>,
    /// Mutable properties.
    pub properties: PropertyBag,
    contents: BTreeSet<ObjectId>,
}

impl Room {
    /// Instantiate an empty room from its template.
    pub fn from_template(template: &RoomTemplate) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            description: template.description.clone(),
            exits: template.exits.iter().map(Exit::from).collect(),
            properties: template.properties.clone(),
            contents: BTreeSet::new(),
        }
    }

    /// Look up an exit, preferring an exact name over an alias.
    pub fn exit(&self, name: &str) -> Option<&Exit> {
        self.exits
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .or_else(|| self.exits.iter().find(|e| e.answers_to(name)))
    }

    /// Mutable variant of [`Room::exit`].
    pub fn exit_mut(&mut self, name: &str) -> Option<&mut Exit> {
        let index = self
            .exits
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(name))
            .or_else(|| self.exits.iter().position(|e| e.answers_to(name)))?;
        self.exits.get_mut(index)
    }

    /// Exits that are not hidden.
    pub fn visible_exits(&self) -> impl Iterator<Item = &Exit> {
        self.exits.iter().filter(|e| !e.hidden)
    }

    /// Objects lying in this room.
    pub const fn contents(&self) -> &BTreeSet<ObjectId> {
        &self.contents
    }

    pub(crate) fn contents_mut(&mut self) -> &mut BTreeSet<ObjectId> {
        &mut self.contents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exit(name: &str, aliases: &[&str]) -> Exit {
        Exit {
            name: name.to_owned(),
            aliases: aliases.iter().map(|a| (*a).to_owned()).collect(),
            to: RoomId::new("elsewhere"),
            hidden: false,
            locked: false,
            requirements: Vec::new(),
        }
    }

    fn room(exits: Vec<Exit>) -> Room {
        Room {
            id: RoomId::new("hall"),
            name: "Hall".to_owned(),
            description: String::new(),
            exits,
            properties: PropertyBag::new(),
            contents: BTreeSet::new(),
        }
    }

    #[test]
    fn exit_lookup_ignores_case_and_uses_aliases() {
        let hall = room(vec![exit("north", &["n"])]);
        assert!(hall.exit("NORTH").is_some());
        assert!(hall.exit("n").is_some());
        assert!(hall.exit("south").is_none());
    }

    #[test]
    fn exact_name_beats_alias() {
        let hall = room(vec![exit("trapdoor", &["down"]), exit("down", &[])]);
        assert_eq!(hall.exit("down").map(|e| e.name.as_str()), Some("down"));
    }

    #[test]
    fn hidden_exits_are_not_visible() {
        let mut secret = exit("bookcase", &[]);
        secret.hidden = true;
        let hall = room(vec![exit("north", &[]), secret]);
        let names: Vec<&str> = hall.visible_exits().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["north"]);
    }
}
