//! Declarative rule vocabulary: predicates, effects, cost expressions and
//! motive condition trees.
//!
//! These are pure data. Evaluation lives in `parley-rules`; nothing in this
//! module reads or writes world state. Every list is tagged so new kinds can
//! be added without touching existing content, and anything the built-in
//! kinds cannot express goes through a `custom` variant dispatched by name.

use serde::{Deserialize, Serialize};

use crate::events::Scope;
use crate::ids::{ObjectId, PlayerId, RoomId};
use crate::value::{Comparison, PropertyBag, PropertyValue};

// ---------------------------------------------------------------------------
// Subjects
// ---------------------------------------------------------------------------

/// An entity a predicate or effect refers to.
///
/// Written in content as a short string: `actor`, `actor_room`,
/// `param:NAME`, `player:ID`, `room:ID` or `object:ID`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Subject {
    /// The acting player.
    #[default]
    Actor,
    /// The room the acting player currently occupies.
    ActorRoom,
    /// Whatever the named invocation parameter was bound to.
    Param(String),
    /// A specific player.
    Player(PlayerId),
    /// A specific room.
    Room(RoomId),
    /// A specific object.
    Object(ObjectId),
}

impl core::fmt::Display for Subject {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Actor => f.write_str("actor"),
            Self::ActorRoom => f.write_str("actor_room"),
            Self::Param(name) => write!(f, "param:{name}"),
            Self::Player(id) => write!(f, "player:{id}"),
            Self::Room(id) => write!(f, "room:{id}"),
            Self::Object(id) => write!(f, "object:{id}"),
        }
    }
}

impl TryFrom<String> for Subject {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let trimmed = raw.trim();
        match trimmed {
            "actor" => return Ok(Self::Actor),
            "actor_room" => return Ok(Self::ActorRoom),
            _ => {}
        }
        let Some((prefix, rest)) = trimmed.split_once(':') else {
            return Err(format!("unrecognised subject '{trimmed}'"));
        };
        if rest.is_empty() {
            return Err(format!("subject '{trimmed}' is missing an identifier"));
        }
        match prefix {
            "param" => Ok(Self::Param(rest.to_owned())),
            "player" => Ok(Self::Player(PlayerId::new(rest))),
            "room" => Ok(Self::Room(RoomId::new(rest))),
            "object" => Ok(Self::Object(ObjectId::new(rest))),
            other => Err(format!("unrecognised subject prefix '{other}'")),
        }
    }
}

impl From<Subject> for String {
    fn from(subject: Subject) -> Self {
        subject.to_string()
    }
}

/// Reference to an exit of some room, by parameter or literal name.
///
/// Written as `param:NAME` to use the invocation argument, or as the plain
/// exit name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExitRef {
    /// The raw text bound to the named parameter.
    Param(String),
    /// A literal exit name or alias.
    Named(String),
}

impl core::fmt::Display for ExitRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Param(name) => write!(f, "param:{name}"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

impl From<String> for ExitRef {
    fn from(raw: String) -> Self {
        match raw.strip_prefix("param:") {
            Some(name) => Self::Param(name.to_owned()),
            None => Self::Named(raw),
        }
    }
}

impl From<ExitRef> for String {
    fn from(exit: ExitRef) -> Self {
        exit.to_string()
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

const fn default_true() -> PropertyValue {
    PropertyValue::Bool(true)
}

/// A typed, declarative check against world state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Compare a property of the subject against a value.
    Property {
        /// Entity whose property is read.
        subject: Subject,
        /// Property key.
        key: String,
        /// Comparison operator (default `eq`).
        #[serde(default)]
        cmp: Comparison,
        /// Expected value (default `true`).
        #[serde(default = "default_true")]
        value: PropertyValue,
    },
    /// The subject is in the actor's room (or, for objects, held by the actor).
    Colocated {
        /// Entity to locate.
        subject: Subject,
    },
    /// The actor's room declares the exit.
    ExitExists {
        /// Exit to look up.
        exit: ExitRef,
    },
    /// The exit exists and is not hidden.
    ExitVisible {
        /// Exit to look up.
        exit: ExitRef,
    },
    /// The exit exists and is not locked.
    ExitUnlocked {
        /// Exit to look up.
        exit: ExitRef,
    },
    /// The exit's own requirement list holds for the actor.
    ExitPassable {
        /// Exit to look up.
        exit: ExitRef,
    },
    /// The actor can carry the object without exceeding capacity.
    HasCapacity {
        /// Object that would be picked up.
        object: Subject,
    },
    /// The object's portability constraint admits the actor.
    Portable {
        /// Object to check.
        object: Subject,
    },
    /// The holder's inventory contains the object.
    Holds {
        /// Player whose inventory is checked (default `actor`).
        #[serde(default)]
        holder: Subject,
        /// Object to look for.
        object: Subject,
    },
    /// The subject is located in the given room.
    InRoom {
        /// Player or object to locate.
        subject: Subject,
        /// Room it must be in.
        room: Subject,
    },
    /// Every nested predicate holds.
    All {
        /// Nested predicates, checked in order.
        of: Vec<Predicate>,
    },
    /// At least one nested predicate holds.
    Any {
        /// Nested predicates, checked in order.
        of: Vec<Predicate>,
    },
    /// The nested predicate does not hold.
    Not {
        /// Predicate to negate.
        predicate: Box<Predicate>,
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

impl Predicate {
    /// The content tag of this predicate.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Property { .. } => "property",
            Self::Colocated { .. } => "colocated",
            Self::ExitExists { .. } => "exit_exists",
            Self::ExitVisible { .. } => "exit_visible",
            Self::ExitUnlocked { .. } => "exit_unlocked",
            Self::ExitPassable { .. } => "exit_passable",
            Self::HasCapacity { .. } => "has_capacity",
            Self::Portable { .. } => "portable",
            Self::Holds { .. } => "holds",
            Self::InRoom { .. } => "in_room",
            Self::All { .. } => "all",
            Self::Any { .. } => "any",
            Self::Not { .. } => "not",
            Self::Custom { .. } => "custom",
        }
    }
}

/// One entry in an action's ordered requirement list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Stable identity reported on failure. Defaults to `<index>:<kind>`.
    #[serde(default)]
    pub id: Option<String>,
    /// The check itself.
    pub check: Predicate,
    /// Message shown instead of the generated reason.
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// Where a moved object ends up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Destination {
    /// The acting player's inventory.
    ActorInventory,
    /// The room the acting player occupies.
    ActorRoom,
    /// A specific room.
    Room {
        /// Target room.
        room: Subject,
    },
    /// Some player's inventory.
    Inventory {
        /// Receiving player.
        holder: Subject,
    },
}

/// Where a moved player ends up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayerDestination {
    /// Follow an exit of the player's current room.
    Exit {
        /// Exit to follow.
        exit: ExitRef,
    },
    /// Jump straight to a room.
    Room {
        /// Target room.
        room: Subject,
    },
}

/// One declarative world mutation or emission request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Effect {
    /// Overwrite a property.
    Set {
        /// Entity to modify.
        subject: Subject,
        /// Property key.
        key: String,
        /// New value.
        value: PropertyValue,
    },
    /// Add to an integer property (absent counts as zero).
    Increment {
        /// Entity to modify.
        subject: Subject,
        /// Property key.
        key: String,
        /// Signed delta.
        by: i64,
    },
    /// Relocate an object in one step.
    MoveObject {
        /// Object to move.
        object: Subject,
        /// Where it goes.
        to: Destination,
    },
    /// Relocate a player.
    MovePlayer {
        /// Player to move (default `actor`).
        #[serde(default)]
        player: Subject,
        /// Where they go.
        to: PlayerDestination,
    },
    /// Clear an exit's hidden flag.
    RevealExit {
        /// Room owning the exit (default: actor's room).
        #[serde(default)]
        room: Option<Subject>,
        /// Exit to reveal.
        exit: ExitRef,
    },
    /// Lock or unlock an exit.
    LockExit {
        /// Room owning the exit (default: actor's room).
        #[serde(default)]
        room: Option<Subject>,
        /// Exit to change.
        exit: ExitRef,
        /// New lock state.
        locked: bool,
    },
    /// Queue an event for routing.
    Emit {
        /// Observer scope.
        scope: Scope,
        /// Narrative template.
        text: String,
        /// Exit for adjacent-room delivery.
        #[serde(default)]
        exit: Option<ExitRef>,
        /// Recipient for target-player delivery.
        #[serde(default)]
        target: Option<Subject>,
        /// Source room override (default: actor's room at emission).
        #[serde(default)]
        room: Option<Subject>,
    },
    /// Branch on current state.
    When {
        /// Checked against state at this point of the list.
        condition: Predicate,
        /// Effects applied when the condition holds.
        #[serde(default)]
        then: Vec<Effect>,
        /// Effects applied otherwise.
        #[serde(default)]
        otherwise: Vec<Effect>,
    },
    /// An effect kind registered at runtime.
    Custom {
        /// Registered kind name.
        name: String,
        /// Free-form arguments for the handler.
        #[serde(default)]
        args: PropertyBag,
    },
}

impl Effect {
    /// The content tag of this effect.
    pub const fn op_name(&self) -> &'static str {
        match self {
            Self::Set { .. } => "set",
            Self::Increment { .. } => "increment",
            Self::MoveObject { .. } => "move_object",
            Self::MovePlayer { .. } => "move_player",
            Self::RevealExit { .. } => "reveal_exit",
            Self::LockExit { .. } => "lock_exit",
            Self::Emit { .. } => "emit",
            Self::When { .. } => "when",
            Self::Custom { .. } => "custom",
        }
    }
}

// ---------------------------------------------------------------------------
// Costs
// ---------------------------------------------------------------------------

/// Action-point cost of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CostExpr {
    /// A constant cost.
    Fixed(u32),
    /// A cost derived from the invocation context.
    Computed(CostTerm),
}

impl Default for CostExpr {
    fn default() -> Self {
        Self::Fixed(1)
    }
}

const fn default_multiplier() -> u32 {
    1
}

/// A computed cost term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum CostTerm {
    /// A constant.
    Constant {
        /// Cost value.
        value: u32,
    },
    /// `base + multiplier * property`, or `fallback` when the property is
    /// missing or not a non-negative integer.
    Property {
        /// Entity whose property is read.
        subject: Subject,
        /// Property key.
        key: String,
        /// Cost used when the property cannot be read.
        #[serde(default)]
        fallback: u32,
        /// Added to the scaled property value.
        #[serde(default)]
        base: u32,
        /// Scale applied to the property value.
        #[serde(default = "default_multiplier")]
        multiplier: u32,
    },
    /// Sum of nested terms.
    Sum {
        /// Terms to add.
        terms: Vec<CostTerm>,
    },
    /// Largest nested term.
    Max {
        /// Terms to compare.
        terms: Vec<CostTerm>,
    },
}

// ---------------------------------------------------------------------------
// Motive condition trees
// ---------------------------------------------------------------------------

/// A leaf of a motive condition tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicCondition {
    /// Stable id for the fired flag. Defaults to the positional path.
    #[serde(default)]
    pub id: Option<String>,
    /// Predicate evaluated with the owning player as actor.
    pub check: Predicate,
    /// One-shot message sent privately when the check first becomes true.
    #[serde(default)]
    pub progress: Option<String>,
}

/// A boolean expression over atomic conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConditionTree {
    /// All children hold.
    All {
        /// Children.
        of: Vec<ConditionTree>,
    },
    /// At least one child holds.
    Any {
        /// Children.
        of: Vec<ConditionTree>,
    },
    /// The child does not hold.
    Not {
        /// Child to negate.
        condition: Box<ConditionTree>,
    },
    /// A leaf predicate.
    Atom(AtomicCondition),
}
