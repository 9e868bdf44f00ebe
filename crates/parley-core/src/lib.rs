//! Session engine for the Parley turn arbiter.
//!
//! This crate owns the turn/round state machine and everything that happens
//! around a single action: routing the events it emits to the players
//! entitled to see them, re-checking motives, and building the next
//! message each player receives.
//!
//! # Architecture
//!
//! A [`Session`] is single-writer. It holds the world exclusively and runs
//! one invocation at a time to completion (parse, validate, execute, route,
//! evaluate motives). The only `await` in a session is the transport fetch
//! in [`run_session`], during which no state changes.
//!
//! # Modules
//!
//! - [`engine`] -- The session: turn processing, confirmations, snapshots
//! - [`scheduler`] -- Turn and round state machine
//! - [`router`] -- Scope resolution and per-player observation queues
//! - [`message`] -- Outbound turn messages and prompt rendering
//! - [`transport`] -- Agent transport trait, scripted and timeout transports
//! - [`runner`] -- Async loop driving a session to completion
//! - [`report`] -- End-of-session motive outcomes and action log
//! - [`config`] -- YAML session configuration with env overrides
//! - [`telemetry`] -- `tracing-subscriber` setup
//! - [`error`] -- Session-level errors

pub mod config;
pub mod engine;
pub mod error;
pub mod message;
pub mod report;
pub mod router;
pub mod runner;
pub mod scheduler;
pub mod telemetry;
pub mod transport;

pub use config::{ConfigError, LogFormat, LoggingConfig, PromptConfig, RulesConfig, SessionConfig};
pub use engine::{Confirmation, Session, SessionSnapshot};
pub use error::SessionError;
pub use message::{MessageKind, MotiveView, PromptRenderer, RoomView, TurnMessage};
pub use report::{EndReason, MotiveOutcome, PlayerOutcome, SessionReport};
pub use router::{Drained, EventRouter, Routed};
pub use runner::run_session;
pub use scheduler::{Scheduler, TurnState};
pub use telemetry::init_tracing;
pub use transport::{AgentTransport, ScriptedTransport, TimeoutTransport, TransportError};
