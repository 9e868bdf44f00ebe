//! Error types for the `parley-rules` crate.
//!
//! [`ParseFault`] and [`EffectError`] are the two failure channels of an
//! action's life: the first invalidates a whole turn before anything runs,
//! the second aborts an effect batch that content could not express against
//! the current world. [`RegistryError`] covers inconsistent verb content.

use parley_types::{EntityRef, Fault, RoomId, Scope, VerbId};
use parley_world::WorldError;

/// Errors raised while building the verb registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Two action definitions share a verb.
    #[error("duplicate verb: {0}")]
    DuplicateVerb(VerbId),

    /// A name or alias is claimed by two different verbs.
    #[error("'{name}' is claimed by both {first} and {second}")]
    AmbiguousName {
        /// The clashing name, lowercased.
        name: String,
        /// Verb that claimed it first.
        first: VerbId,
        /// Verb that claimed it again.
        second: VerbId,
    },

    /// A verb is empty after trimming.
    #[error("action definition with an empty verb")]
    EmptyVerb,
}

/// Whole-turn parse failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFault {
    /// The turn contains no marker lines.
    #[error("no action lines found; start each action line with the action marker")]
    NoMarkers,

    /// A marker line could not be tokenized or does not fit its verb.
    #[error("line {line}: {reason}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        reason: String,
    },

    /// A marker line names no registered verb.
    #[error("line {line}: unknown action '{verb}'")]
    UnknownVerb {
        /// 1-based line number.
        line: usize,
        /// The verb as written.
        verb: String,
        /// Close registered names, best first.
        suggestions: Vec<String>,
    },
}

impl From<&ParseFault> for Fault {
    fn from(fault: &ParseFault) -> Self {
        match fault {
            ParseFault::UnknownVerb { verb, suggestions, .. } => Self::UnknownVerb {
                verb: verb.clone(),
                suggestions: suggestions.clone(),
            },
            other => Self::Parse {
                reason: other.to_string(),
            },
        }
    }
}

/// Failure while applying an effect batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    /// A subject reference could not be resolved.
    #[error("cannot resolve {subject}: {reason}")]
    UnresolvedSubject {
        /// The reference as written.
        subject: String,
        /// Why.
        reason: String,
    },

    /// A subject resolved to the wrong kind of entity.
    #[error("{subject} is not a {expected}")]
    WrongEntity {
        /// The reference as written.
        subject: String,
        /// Kind that was needed.
        expected: &'static str,
    },

    /// Increment on a non-integer property.
    #[error("property {key} of {entity} is not an integer")]
    TypeMismatch {
        /// Owner of the property.
        entity: EntityRef,
        /// Property key.
        key: String,
    },

    /// Increment overflowed.
    #[error("property {key} of {entity} overflowed")]
    Overflow {
        /// Owner of the property.
        entity: EntityRef,
        /// Property key.
        key: String,
    },

    /// An exit name did not match any exit of the room.
    #[error("room {room} has no exit '{exit}'")]
    UnresolvedExit {
        /// Room searched.
        room: RoomId,
        /// Exit name.
        exit: String,
    },

    /// An emission is missing the exit or target its scope needs.
    #[error("{scope} emission is missing its {missing}")]
    IncompleteEmission {
        /// Scope of the emission.
        scope: Scope,
        /// The missing field.
        missing: &'static str,
    },

    /// No handler is registered for a custom effect kind.
    #[error("unknown effect kind '{0}'")]
    UnknownKind(String),

    /// A custom effect handler failed.
    #[error("effect '{kind}' failed: {reason}")]
    Custom {
        /// Registered kind name.
        kind: String,
        /// Handler-provided reason.
        reason: String,
    },

    /// A world mutation failed.
    #[error(transparent)]
    World(#[from] WorldError),
}
