//! Error types for the `parley-core` crate.
//!
//! Player-level faults never surface here; they travel as
//! [`Fault`](parley_types::Fault) values inside action reports. A
//! [`SessionError`] means the session itself cannot continue.

use parley_rules::RegistryError;
use parley_types::{PlayerId, VerbId};
use parley_world::WorldError;

use crate::config::ConfigError;
use crate::scheduler::TurnState;

/// Errors that stop a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Configuration could not be loaded or is invalid.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The world could not be built or became inconsistent.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The action definitions could not be registered.
    #[error("action registry error: {source}")]
    Registry {
        /// The underlying registry error.
        #[from]
        source: RegistryError,
    },

    /// An operation was attempted in a state that does not accept it.
    #[error("{operation} is not allowed while {state}")]
    InvalidState {
        /// The attempted operation.
        operation: &'static str,
        /// The scheduler state at the time.
        state: TurnState,
    },

    /// An effect failed after its requirements passed. The requirement and
    /// effect vocabularies disagree about the world.
    #[error("effect application failed for {player} running '{verb}': {reason}")]
    EffectApplication {
        /// Acting player.
        player: PlayerId,
        /// Verb being executed.
        verb: VerbId,
        /// What went wrong.
        reason: String,
    },

    /// A turn prompt could not be built or rendered.
    #[error("prompt error: {0}")]
    Prompt(String),
}
