//! Content templates supplied by the content provider.
//!
//! Templates are loaded once before play and never mutated. A [`Scenario`]
//! bundles everything needed to instantiate a session world.

use serde::{Deserialize, Serialize};

use crate::ids::{MotiveId, ObjectId, PlayerId, RoomId, VerbId};
use crate::rules::{ConditionTree, CostExpr, Effect, Requirement};
use crate::state::ObjectLocation;
use crate::value::PropertyBag;

/// How an invocation argument is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Free text, passed through unchanged.
    #[default]
    Text,
    /// An object, resolved by id, name or alias.
    Object,
    /// A player, resolved by id or name.
    Player,
    /// An exit name, resolved later by predicates and effects.
    Exit,
}

/// Where object arguments are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectScope {
    /// Objects lying in the actor's room.
    Room,
    /// Objects the actor carries.
    Inventory,
    /// Room first, then inventory.
    #[default]
    Nearby,
    /// Any object in the world.
    Anywhere,
}

/// One positional parameter of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Name used by `param:NAME` references.
    pub name: String,
    /// Interpretation of the argument.
    #[serde(default)]
    pub kind: ParamKind,
    /// Lookup scope for object parameters.
    #[serde(default)]
    pub scope: ObjectScope,
    /// Whether the argument may be omitted.
    #[serde(default)]
    pub optional: bool,
}

/// Immutable template for one verb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Canonical verb (may contain spaces).
    pub verb: VerbId,
    /// Alternative names.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Short help text shown in turn prompts.
    #[serde(default)]
    pub description: String,
    /// Action-point cost.
    #[serde(default)]
    pub cost: CostExpr,
    /// Positional parameters.
    #[serde(default)]
    pub params: Vec<ParamSpec>,
    /// Preconditions, all of which must hold.
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    /// Ordered effects.
    #[serde(default)]
    pub effects: Vec<Effect>,
    /// Success text for the actor's feedback channel.
    #[serde(default)]
    pub feedback: Option<String>,
}

/// A persistent win/loss goal of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotiveDefinition {
    /// Id, unique within the player.
    pub id: MotiveId,
    /// Shown to the owning player.
    #[serde(default)]
    pub description: String,
    /// Achieved the first time this holds.
    pub success: ConditionTree,
    /// Failed if this holds while unresolved.
    #[serde(default)]
    pub failure: Option<ConditionTree>,
}

/// Who may pick an object up.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Portability {
    /// Anyone.
    #[default]
    Portable,
    /// No one.
    Immovable,
    /// The actor's integer property must be at least the object's size.
    SizeGated {
        /// Actor property holding carrying strength.
        property: String,
    },
    /// The actor's integer property must reach a minimum.
    LevelGated {
        /// Actor property holding the level.
        property: String,
        /// Minimum level.
        minimum: i64,
    },
    /// The actor's text property must be one of the allowed values.
    ClassGated {
        /// Actor property holding the class.
        property: String,
        /// Accepted values.
        allowed: Vec<String>,
    },
    /// A predicate kind registered at runtime.
    Custom {
        /// Registered kind name.
        name: String,
        /// Free-form arguments for the handler.
        #[serde(default)]
        args: PropertyBag,
    },
}

/// An exit out of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitTemplate {
    /// Direction or door name.
    pub name: String,
    /// Alternative names.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Destination room.
    pub to: RoomId,
    /// Excluded from default disclosure.
    #[serde(default)]
    pub hidden: bool,
    /// Blocks passage while set.
    #[serde(default)]
    pub locked: bool,
    /// Extra conditions for passing through.
    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

/// A room in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTemplate {
    /// Room id.
    pub id: RoomId,
    /// Display name.
    pub name: String,
    /// Description shown on arrival.
    #[serde(default)]
    pub description: String,
    /// Exits in declaration order.
    #[serde(default)]
    pub exits: Vec<ExitTemplate>,
    /// Initial properties.
    #[serde(default)]
    pub properties: PropertyBag,
}

const fn default_size() -> u32 {
    1
}

/// An object and where it starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectTemplate {
    /// Object id.
    pub id: ObjectId,
    /// Display name.
    pub name: String,
    /// Alternative names for argument matching.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Bulk counted against carrying capacity.
    #[serde(default = "default_size")]
    pub size: u32,
    /// Pick-up constraint.
    #[serde(default)]
    pub portability: Portability,
    /// Initial properties.
    #[serde(default)]
    pub properties: PropertyBag,
    /// Starting location.
    pub location: ObjectLocation,
}

/// A player character and their starting state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTemplate {
    /// Player id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Starting room.
    pub room: RoomId,
    /// Initial properties.
    #[serde(default)]
    pub properties: PropertyBag,
    /// Maximum total object size carried. Unlimited when absent.
    #[serde(default)]
    pub capacity: Option<u32>,
    /// Per-turn action points. Falls back to the session allotment.
    #[serde(default)]
    pub max_ap: Option<u32>,
    /// Ordered goals.
    #[serde(default)]
    pub motives: Vec<MotiveDefinition>,
}

/// Everything needed to start a session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario title.
    #[serde(default)]
    pub name: String,
    /// Rooms.
    #[serde(default)]
    pub rooms: Vec<RoomTemplate>,
    /// Objects.
    #[serde(default)]
    pub objects: Vec<ObjectTemplate>,
    /// Players, in turn order.
    #[serde(default)]
    pub players: Vec<PlayerTemplate>,
    /// Verbs.
    #[serde(default)]
    pub actions: Vec<ActionDefinition>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn minimal_action_uses_defaults() {
        let action: ActionDefinition = serde_yml::from_str("verb: wait").unwrap();
        assert_eq!(action.cost, CostExpr::Fixed(1));
        assert!(action.params.is_empty());
        assert!(action.feedback.is_none());
    }

    #[test]
    fn object_template_defaults() {
        let yaml = "id: lamp\nname: brass lamp\nlocation: room:hall\n";
        let object: ObjectTemplate = serde_yml::from_str(yaml).unwrap();
        assert_eq!(object.size, 1);
        assert_eq!(object.portability, Portability::Portable);
        assert_eq!(object.location, ObjectLocation::Room(RoomId::new("hall")));
    }

    #[test]
    fn gated_portability_parses() {
        let yaml = "kind: class_gated\nproperty: class\nallowed: [mage, priest]\n";
        let portability: Portability = serde_yml::from_str(yaml).unwrap();
        assert!(matches!(portability, Portability::ClassGated { ref allowed, .. } if allowed.len() == 2));
    }
}
