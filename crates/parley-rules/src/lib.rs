//! Action parsing and declarative rule evaluation for the Parley turn arbiter.
//!
//! Everything an action goes through between raw turn text and a committed
//! world change lives here. None of it knows about turns, rounds or
//! observation queues; that is the session engine's job.
//!
//! # Modules
//!
//! - [`registry`] -- Verb registry with alias resolution and suggestions
//! - [`parse`] -- Marker-line tokenizer and whole-turn parser
//! - [`binding`] -- Argument binding to objects, players and exits
//! - [`predicate`] -- Predicate evaluation with human-readable reasons
//! - [`requirements`] -- Ordered, short-circuiting requirement lists
//! - [`cost`] -- Static and computed action point costs
//! - [`effects`] -- Ordered effect execution and state diffs
//! - [`motives`] -- Motive condition trees and progress messages
//! - [`render`] -- `minijinja` narrative text rendering
//! - [`vocabulary`] -- Kind-keyed registry of custom predicates and effects
//! - [`error`] -- Registry, parse and effect errors

pub mod binding;
pub mod cost;
pub mod effects;
pub mod error;
pub mod motives;
pub mod parse;
pub mod predicate;
pub mod registry;
pub mod render;
pub mod requirements;
pub mod vocabulary;

pub use binding::{Bindings, Bound, bind};
pub use cost::evaluate_cost;
pub use effects::{EffectExecutor, EffectOutcome};
pub use error::{EffectError, ParseFault, RegistryError};
pub use motives::{MotiveEvaluator, MotiveUpdate, Progress, apply_updates};
pub use parse::{ActionParser, DEFAULT_MARKER, ParsedLines};
pub use predicate::{EvalContext, describe};
pub use registry::ActionRegistry;
pub use render::TextRenderer;
pub use requirements::{Unmet, check_requirements, requirement_identity};
pub use vocabulary::Vocabulary;
