//! Rooms, objects, players and the object location index.
//!
//! This crate models the per-session world: a graph of rooms connected by
//! named exits, player characters with action point budgets and motive
//! state, and game objects that live in exactly one room or inventory.
//!
//! # Modules
//!
//! - [`error`] -- Error types for world operations.
//! - [`room`] -- [`Room`] and [`Exit`] with case-insensitive exit lookup.
//! - [`object`] -- [`GameObject`] instances.
//! - [`player`] -- [`Player`] characters and [`MotiveState`].
//! - [`points`] -- [`ActionPoints`] budget.
//! - [`world`] -- The [`World`] container and its location index.
//! - [`scenario`] -- [`World::from_scenario`] instantiation.

pub mod error;
pub mod object;
pub mod player;
pub mod points;
pub mod room;
pub mod scenario;
pub mod world;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use object::GameObject;
pub use player::{MotiveState, Player};
pub use points::ActionPoints;
pub use room::{Exit, Room};
pub use world::World;
