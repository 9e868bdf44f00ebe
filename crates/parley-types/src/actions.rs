//! Action invocation and result types.
//!
//! An [`Invocation`] is what the parser extracts from one marker line. Every
//! attempt, successful or not, ends up as an [`ActionReport`] delivered on
//! the acting player's private feedback channel.

use serde::{Deserialize, Serialize};

use crate::ids::{PlayerId, VerbId};

/// A parsed request to perform one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Resolved canonical verb.
    pub verb: VerbId,
    /// Positional arguments after the verb, unquoted.
    pub args: Vec<String>,
    /// 1-based line number within the turn text.
    pub line: usize,
    /// The marker line as written, without the marker.
    pub raw: String,
}

/// Player-facing failure taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "fault", rename_all = "snake_case")]
pub enum Fault {
    /// The turn text could not be parsed.
    Parse {
        /// What was wrong.
        reason: String,
    },
    /// A marker line named a verb nobody registered.
    UnknownVerb {
        /// The verb as written.
        verb: String,
        /// Close registered names, best first.
        suggestions: Vec<String>,
    },
    /// A precondition did not hold.
    Requirement {
        /// Identity of the failing requirement.
        requirement: String,
        /// Human-readable reason.
        reason: String,
    },
    /// An effect could not be applied.
    EffectApplication {
        /// What went wrong.
        reason: String,
    },
    /// The agent's response could not be fetched.
    Transport {
        /// Transport error text.
        reason: String,
    },
}

impl Fault {
    /// Whether this fault invalidates the whole turn.
    pub const fn forfeits_turn(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::UnknownVerb { .. } | Self::Transport { .. })
    }
}

impl core::fmt::Display for Fault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Parse { reason } => write!(f, "could not parse turn: {reason}"),
            Self::UnknownVerb { verb, suggestions } => {
                write!(f, "unknown action '{verb}'")?;
                if !suggestions.is_empty() {
                    write!(f, " (did you mean: {}?)", suggestions.join(", "))?;
                }
                Ok(())
            }
            Self::Requirement { requirement, reason } => {
                write!(f, "requirement {requirement} not met: {reason}")
            }
            Self::EffectApplication { reason } => write!(f, "action could not be applied: {reason}"),
            Self::Transport { reason } => write!(f, "no response received: {reason}"),
        }
    }
}

/// Result of one attempted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// The action executed.
    Succeeded {
        /// Action points charged.
        ap_spent: u32,
    },
    /// The action was rejected.
    Failed {
        /// Why.
        fault: Fault,
    },
}

impl ActionOutcome {
    /// Whether the action executed.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Structured per-action result, delivered only to the acting player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReport {
    /// Acting player.
    pub player: PlayerId,
    /// Round of the attempt.
    pub round: u32,
    /// Verb, when parsing got that far.
    pub verb: Option<VerbId>,
    /// Source line, when parsing got that far.
    pub line: Option<usize>,
    /// Rendered feedback text.
    pub text: String,
    /// Success or failure.
    pub outcome: ActionOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_verb_display_lists_suggestions() {
        let fault = Fault::UnknownVerb {
            verb: "tkae".to_owned(),
            suggestions: vec!["take".to_owned()],
        };
        assert_eq!(fault.to_string(), "unknown action 'tkae' (did you mean: take?)");
        assert!(fault.forfeits_turn());
    }

    #[test]
    fn requirement_faults_keep_the_turn() {
        let fault = Fault::Requirement {
            requirement: "exit".to_owned(),
            reason: "no exit 'north'".to_owned(),
        };
        assert!(!fault.forfeits_turn());
        assert!(fault.to_string().contains("north"));
    }
}
