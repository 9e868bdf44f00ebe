//! Per-turn action point budget.

use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// Current and maximum action points. `current` never exceeds `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPoints {
    current: u32,
    max: u32,
}

impl ActionPoints {
    /// A full budget of `max` points.
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Points left this turn.
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Per-turn allotment.
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Whether nothing is left to spend.
    pub const fn is_exhausted(&self) -> bool {
        self.current == 0
    }

    /// Whether `cost` can be paid.
    pub const fn can_afford(&self, cost: u32) -> bool {
        cost <= self.current
    }

    /// Deduct `cost`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InsufficientActionPoints`] and leaves the budget
    /// untouched when `cost` exceeds what remains.
    pub fn spend(&mut self, cost: u32) -> Result<(), WorldError> {
        self.current = self
            .current
            .checked_sub(cost)
            .ok_or(WorldError::InsufficientActionPoints {
                needed: cost,
                available: self.current,
            })?;
        Ok(())
    }

    /// Refill to the allotment.
    pub const fn reset(&mut self) {
        self.current = self.max;
    }

    /// Forfeit everything left this turn.
    pub const fn drain(&mut self) {
        self.current = 0;
    }
}
