//! Shared type definitions for the Parley turn arbiter.
//!
//! This crate is the single source of truth for the data exchanged between
//! the world model, the rule evaluators and the session engine. It holds no
//! behaviour beyond parsing and display helpers.
//!
//! # Modules
//!
//! - [`ids`] -- Content keys and time-ordered runtime ids
//! - [`value`] -- Property values, bags and comparisons
//! - [`rules`] -- Predicates, effects, cost expressions, condition trees
//! - [`content`] -- Action, room, object, player and motive templates
//! - [`events`] -- Scopes, event requests, routed events, observations
//! - [`actions`] -- Invocations, faults and action reports
//! - [`state`] -- Motive status, object locations and state-change records

pub mod actions;
pub mod content;
pub mod events;
pub mod ids;
pub mod rules;
pub mod state;
pub mod value;

// Re-export all public types at crate root for convenience.
pub use actions::{ActionOutcome, ActionReport, Fault, Invocation};
pub use content::{
    ActionDefinition, ExitTemplate, MotiveDefinition, ObjectScope, ObjectTemplate, ParamKind,
    ParamSpec, PlayerTemplate, Portability, RoomTemplate, Scenario,
};
pub use events::{Event, EventRequest, Observation, ObservationKind, Scope, Timestamp};
pub use ids::{EventId, MotiveId, ObjectId, PlayerId, RoomId, SessionId, VerbId};
pub use rules::{
    AtomicCondition, ConditionTree, CostExpr, CostTerm, Destination, Effect, ExitRef,
    PlayerDestination, Predicate, Requirement, Subject,
};
pub use state::{EntityRef, MotiveStatus, ObjectLocation, StateChange};
pub use value::{Comparison, PropertyBag, PropertyValue};
