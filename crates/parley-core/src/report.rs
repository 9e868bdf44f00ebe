//! End-of-session reporting.

use chrono::{DateTime, Utc};
use parley_types::{ActionReport, MotiveId, MotiveStatus, PlayerId, SessionId};
use serde::{Deserialize, Serialize};

/// Reason why the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The configured round limit was played out.
    RoundLimit,
    /// Every player quit.
    NoActivePlayers,
}

/// Final state of one motive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotiveOutcome {
    /// Motive id.
    pub motive: MotiveId,
    /// Player-facing description.
    pub description: String,
    /// Resolution at report time.
    pub status: MotiveStatus,
}

/// Final state of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerOutcome {
    /// Player id.
    pub player: PlayerId,
    /// Display name.
    pub name: String,
    /// Whether the player was still in the game.
    pub active: bool,
    /// Motives in declaration order.
    pub motives: Vec<MotiveOutcome>,
}

/// Summary of a session, complete or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Session id.
    pub session_id: SessionId,
    /// Scenario title.
    pub scenario: String,
    /// Why the session ended. `None` while it is still running.
    pub end_reason: Option<EndReason>,
    /// Rounds fully played.
    pub rounds_played: u32,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Per-player motive outcomes, in roster order.
    pub outcomes: Vec<PlayerOutcome>,
    /// Every action attempt, in execution order.
    pub action_log: Vec<ActionReport>,
}

impl SessionReport {
    /// Outcome for `player`.
    pub fn outcome(&self, player: &PlayerId) -> Option<&PlayerOutcome> {
        self.outcomes.iter().find(|o| &o.player == player)
    }

    /// Final status of one motive.
    pub fn motive_status(&self, player: &PlayerId, motive: &str) -> Option<MotiveStatus> {
        self.outcome(player)?
            .motives
            .iter()
            .find(|m| m.motive.as_str() == motive)
            .map(|m| m.status)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
