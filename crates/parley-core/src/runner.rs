//! Async session loop.
//!
//! [`run_session`] drives a [`Session`] to completion against an
//! [`AgentTransport`]. Awaiting an agent's reply is the only suspension
//! point; the world is never touched while a fetch is pending, and only one
//! player's turn is ever in flight.

use parley_types::PlayerId;
use tracing::{info, warn};

use crate::engine::{Confirmation, Session};
use crate::error::SessionError;
use crate::report::SessionReport;
use crate::scheduler::TurnState;
use crate::transport::AgentTransport;

/// Run `session` until the game is complete and return the final report.
///
/// Each turn the current player gets an action prompt, their reply is
/// parsed and executed, and they then get a confirmation prompt carrying
/// the results. A failed confirmation fetch counts as unrecognised input.
/// After `rules.max_confirmation_attempts` unrecognised replies in a row
/// (unless it is `0`) the turn is ended as if the agent had continued, so a
/// dead agent cannot stall the game.
///
/// # Errors
///
/// Returns [`SessionError`] if an effect fails after its requirements
/// passed, a prompt cannot be rendered, or the session state is corrupt.
pub async fn run_session<T: AgentTransport>(
    session: &mut Session,
    transport: &mut T,
) -> Result<SessionReport, SessionError> {
    info!(
        session = %session.id(),
        players = session.turn_order().len(),
        max_rounds = session.config().rules.max_rounds,
        "session starting"
    );

    let mut ignored: u32 = 0;
    loop {
        match session.state() {
            TurnState::GameComplete => break,
            TurnState::RoundComplete => {
                session.advance_round()?;
            }
            TurnState::AwaitingAction => {
                let (player, prompt) = next_prompt(session)?;
                let response = transport.fetch_response(&player, &prompt).await;
                if let Err(e) = &response {
                    warn!(player = %player, error = %e, "agent response failed");
                }
                session.submit_turn(response)?;
                session.run_queue()?;
            }
            TurnState::AwaitingTurnEndConfirmation => {
                let (player, prompt) = next_prompt(session)?;
                let input = match transport.fetch_response(&player, &prompt).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(player = %player, error = %e, "confirmation response failed");
                        String::new()
                    }
                };
                match session.confirm(&input)? {
                    Confirmation::Ignored => {
                        ignored = ignored.saturating_add(1);
                        let rules = &session.config().rules;
                        if rules.max_confirmation_attempts != 0
                            && ignored >= rules.max_confirmation_attempts
                        {
                            warn!(player = %player, attempts = ignored, "no usable turn-end input, continuing");
                            let token = rules.continue_token.clone();
                            session.confirm(&token)?;
                            ignored = 0;
                        }
                    }
                    Confirmation::Quit => {
                        info!(player = %player, "agent left the game");
                        ignored = 0;
                    }
                    Confirmation::Continued => ignored = 0,
                }
            }
            state @ TurnState::Executing => {
                return Err(SessionError::InvalidState {
                    operation: "waiting for an agent",
                    state,
                });
            }
        }
    }

    let report = session.report();
    info!(
        session = %report.session_id,
        rounds = report.rounds_played,
        end_reason = ?report.end_reason,
        actions = report.action_log.len(),
        "session finished"
    );
    Ok(report)
}

fn next_prompt(session: &mut Session) -> Result<(PlayerId, String), SessionError> {
    let message = session.turn_message()?;
    let prompt = session.render_prompt(&message)?;
    Ok((message.player, prompt))
}
