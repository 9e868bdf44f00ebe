//! Turn and round state machine.
//!
//! ```text
//! AwaitingAction ──dequeue──▶ Executing ──AP left, queue left──▶ AwaitingAction
//!       │                         │
//!       └──parse/transport fault──┴──AP spent or queue empty──▶ AwaitingTurnEndConfirmation
//!
//! AwaitingTurnEndConfirmation ──continue / quit──▶ AwaitingAction (next player)
//!                                              └─▶ RoundComplete (last player)
//! RoundComplete ──▶ AwaitingAction (next round) | GameComplete
//! ```
//!
//! The scheduler only tracks whose turn it is and what they have queued.
//! Action points, world mutation and routing belong to the session.

use std::collections::VecDeque;

use parley_types::{Invocation, PlayerId};
use serde::Serialize;
use tracing::debug;

use crate::error::SessionError;

/// Where the session is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    /// The current player may act or has queued actions left.
    AwaitingAction,
    /// An invocation is being validated and applied.
    Executing,
    /// The current player's turn is over; waiting for continue or quit.
    AwaitingTurnEndConfirmation,
    /// Every player in the order has had their turn this round.
    RoundComplete,
    /// The session is over.
    GameComplete,
}

impl core::fmt::Display for TurnState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::AwaitingAction => "awaiting action",
            Self::Executing => "executing",
            Self::AwaitingTurnEndConfirmation => "awaiting turn end confirmation",
            Self::RoundComplete => "round complete",
            Self::GameComplete => "game complete",
        };
        f.write_str(name)
    }
}

/// Turn order, current position and the current player's invocation queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduler {
    state: TurnState,
    order: Vec<PlayerId>,
    cursor: usize,
    round: u32,
    max_rounds: u32,
    queue: VecDeque<Invocation>,
}

impl Scheduler {
    /// Start round 1 with `order`. An empty order is complete immediately.
    pub fn new(order: Vec<PlayerId>, max_rounds: u32) -> Self {
        let state = if order.is_empty() || max_rounds == 0 {
            TurnState::GameComplete
        } else {
            TurnState::AwaitingAction
        };
        Self {
            state,
            order,
            cursor: 0,
            round: 1,
            max_rounds,
            queue: VecDeque::new(),
        }
    }

    /// Current state.
    pub const fn state(&self) -> TurnState {
        self.state
    }

    /// Current round, starting at 1.
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Round limit.
    pub const fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Players still taking turns, in turn order.
    pub fn order(&self) -> &[PlayerId] {
        &self.order
    }

    /// Whose turn it is, if anyone's.
    pub fn current(&self) -> Option<&PlayerId> {
        match self.state {
            TurnState::AwaitingAction
            | TurnState::Executing
            | TurnState::AwaitingTurnEndConfirmation => self.order.get(self.cursor),
            TurnState::RoundComplete | TurnState::GameComplete => None,
        }
    }

    /// Invocations still queued for the current player.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Queue a parsed turn for the current player.
    pub fn enqueue(&mut self, invocations: Vec<Invocation>) -> Result<(), SessionError> {
        self.expect(TurnState::AwaitingAction, "queueing actions")?;
        self.queue.extend(invocations);
        Ok(())
    }

    /// Take the next queued invocation and enter `Executing`.
    ///
    /// Returns `None`, leaving the state alone, when nothing is queued.
    pub fn begin_execution(&mut self) -> Result<Option<Invocation>, SessionError> {
        self.expect(TurnState::AwaitingAction, "starting an action")?;
        let next = self.queue.pop_front();
        if next.is_some() {
            self.state = TurnState::Executing;
        }
        Ok(next)
    }

    /// Leave `Executing`. The turn ends when AP ran out or nothing else is
    /// queued.
    pub fn finish_execution(&mut self, ap_exhausted: bool) -> Result<TurnState, SessionError> {
        self.expect(TurnState::Executing, "finishing an action")?;
        self.state = if ap_exhausted || self.queue.is_empty() {
            self.queue.clear();
            TurnState::AwaitingTurnEndConfirmation
        } else {
            TurnState::AwaitingAction
        };
        Ok(self.state)
    }

    /// End the current turn early and discard whatever was queued.
    pub fn forfeit(&mut self) -> Result<(), SessionError> {
        match self.state {
            TurnState::AwaitingAction | TurnState::Executing => {
                self.queue.clear();
                self.state = TurnState::AwaitingTurnEndConfirmation;
                Ok(())
            }
            state => Err(SessionError::InvalidState {
                operation: "forfeiting a turn",
                state,
            }),
        }
    }

    /// Close the confirmed turn and move to the next player. A quitting
    /// player is removed from the order for good.
    pub fn end_turn(&mut self, quit: bool) -> Result<TurnState, SessionError> {
        self.expect(TurnState::AwaitingTurnEndConfirmation, "ending a turn")?;
        if quit {
            if self.cursor < self.order.len() {
                let gone = self.order.remove(self.cursor);
                debug!(player = %gone, "removed from turn order");
            }
        } else {
            self.cursor = self.cursor.saturating_add(1);
        }
        self.state = if self.cursor < self.order.len() {
            TurnState::AwaitingAction
        } else {
            TurnState::RoundComplete
        };
        Ok(self.state)
    }

    /// Start the next round, or finish the game at the round limit or when
    /// nobody is left.
    pub fn advance_round(&mut self) -> Result<TurnState, SessionError> {
        self.expect(TurnState::RoundComplete, "advancing the round")?;
        if self.round >= self.max_rounds || self.order.is_empty() {
            self.state = TurnState::GameComplete;
        } else {
            self.round = self.round.saturating_add(1);
            self.cursor = 0;
            self.state = TurnState::AwaitingAction;
        }
        Ok(self.state)
    }

    fn expect(&self, wanted: TurnState, operation: &'static str) -> Result<(), SessionError> {
        if self.state == wanted {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}
