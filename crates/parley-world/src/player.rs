//! Player characters and their motive state.

use std::collections::BTreeSet;

use parley_types::{MotiveDefinition, MotiveStatus, ObjectId, PlayerId, PropertyBag, RoomId};

use crate::points::ActionPoints;

/// Runtime state of one motive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotiveState {
    /// The template.
    pub definition: MotiveDefinition,
    status: MotiveStatus,
    /// Atom ids whose predicate held at the last evaluation.
    pub atoms_true: BTreeSet<String>,
    /// Atom ids whose progress message has been sent.
    pub fired: BTreeSet<String>,
}

impl MotiveState {
    /// Fresh, unresolved state.
    pub const fn new(definition: MotiveDefinition) -> Self {
        Self {
            definition,
            status: MotiveStatus::Unresolved,
            atoms_true: BTreeSet::new(),
            fired: BTreeSet::new(),
        }
    }

    /// Current resolution.
    pub const fn status(&self) -> MotiveStatus {
        self.status
    }

    /// Settle the motive. Only an unresolved motive can change; returns
    /// whether it did.
    pub fn resolve(&mut self, status: MotiveStatus) -> bool {
        if self.status.is_terminal() || !status.is_terminal() {
            return false;
        }
        self.status = status;
        true
    }
}

/// A player character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Player id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Mutable properties.
    pub properties: PropertyBag,
    /// Maximum total size carried, if limited.
    pub capacity: Option<u32>,
    /// Action point budget.
    pub ap: ActionPoints,
    /// Goals in declaration order.
    pub motives: Vec<MotiveState>,
    pub(crate) room: RoomId,
    pub(crate) inventory: BTreeSet<ObjectId>,
    pub(crate) active: bool,
}

impl Player {
    /// A new active player standing in `room` with an empty inventory.
    pub const fn new(id: PlayerId, name: String, room: RoomId, ap: ActionPoints) -> Self {
        Self {
            id,
            name,
            properties: PropertyBag::new(),
            capacity: None,
            ap,
            motives: Vec::new(),
            room,
            inventory: BTreeSet::new(),
            active: true,
        }
    }

    /// Room the player stands in.
    pub const fn room(&self) -> &RoomId {
        &self.room
    }

    /// Objects the player carries.
    pub const fn inventory(&self) -> &BTreeSet<ObjectId> {
        &self.inventory
    }

    /// Whether the player still takes turns.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Whether any motive is still open.
    pub fn has_unresolved_motives(&self) -> bool {
        self.motives.iter().any(|m| !m.status().is_terminal())
    }

    /// Find a motive by id.
    pub fn motive_mut(&mut self, id: &str) -> Option<&mut MotiveState> {
        self.motives.iter_mut().find(|m| m.definition.id.as_str() == id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn motive() -> MotiveState {
        let yaml = "id: escape\nsuccess:\n  kind: atom\n  check:\n    kind: property\n    subject: actor\n    key: free\n";
        MotiveState::new(serde_yml::from_str(yaml).unwrap())
    }

    #[test]
    fn resolution_is_monotonic() {
        let mut state = motive();
        assert!(!state.resolve(MotiveStatus::Unresolved));
        assert!(state.resolve(MotiveStatus::Achieved));
        assert!(!state.resolve(MotiveStatus::Failed));
        assert_eq!(state.status(), MotiveStatus::Achieved);
    }
}
