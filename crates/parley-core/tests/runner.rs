//! End-to-end tests for the async session loop with scripted agents.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]

mod common;

use std::time::Duration;

use common::{config, id, scenario};
use parley_core::{EndReason, ScriptedTransport, Session, TimeoutTransport, TurnState, run_session};
use parley_types::MotiveStatus;

#[tokio::test]
async fn scripted_agents_play_to_the_round_limit() {
    let mut session = Session::new(&scenario(), config(20, 2)).unwrap();
    let mut transport = ScriptedTransport::new();
    transport
        .push(&id("alice"), "I grab the lamp.\n> take lamp\n> light lamp")
        .push(&id("alice"), "continue")
        .push(&id("alice"), "> pray")
        .push(&id("alice"), "continue");
    transport
        .push(&id("bob"), "> think\n> think")
        .push(&id("bob"), "continue");
    transport
        .push(&id("carol"), "> think")
        .push(&id("carol"), "> continue");

    let report = run_session(&mut session, &mut transport).await.unwrap();

    assert_eq!(report.end_reason, Some(EndReason::RoundLimit));
    assert_eq!(report.rounds_played, 2);
    assert_eq!(report.motive_status(&id("alice"), "ritual"), Some(MotiveStatus::Achieved));
    assert_eq!(report.motive_status(&id("bob"), "darkness"), Some(MotiveStatus::Failed));
    assert_eq!(session.state(), TurnState::GameComplete);

    // Round two: Bob and Carol ran out of script, so each forfeits and then
    // burns through the confirmation attempts.
    assert_eq!(transport.prompts().len(), 16);
    let bob_first = transport
        .prompts()
        .iter()
        .find(|(player, _)| player == &id("bob"))
        .map(|(_, prompt)| prompt.clone())
        .unwrap();
    assert!(bob_first.contains("Alice picks up the brass lamp."));
    assert!(bob_first.contains("The brass lamp flares into light."));
}

#[tokio::test]
async fn everyone_quitting_ends_the_game() {
    let mut session = Session::new(&scenario(), config(20, 5)).unwrap();
    let mut transport = ScriptedTransport::new();
    for player in ["alice", "bob", "carol"] {
        transport.push(&id(player), "> think").push(&id(player), "quit");
    }

    let report = run_session(&mut session, &mut transport).await.unwrap();

    assert_eq!(report.end_reason, Some(EndReason::NoActivePlayers));
    assert_eq!(report.rounds_played, 1);
    assert!(report.outcomes.iter().all(|o| !o.active));
    assert_eq!(report.action_log.len(), 3);
    assert!(session.turn_order().is_empty());
}

#[tokio::test]
async fn silent_agents_still_finish() {
    let mut session = Session::new(&scenario(), config(20, 1)).unwrap();
    let mut transport = TimeoutTransport::new(ScriptedTransport::new(), Duration::from_secs(5));

    let report = run_session(&mut session, &mut transport).await.unwrap();

    assert_eq!(report.end_reason, Some(EndReason::RoundLimit));
    assert_eq!(report.rounds_played, 1);
    // One forfeited turn per player, nothing executed.
    assert_eq!(report.action_log.len(), 3);
    assert!(report.action_log.iter().all(|r| r.verb.is_none()));
    assert_eq!(transport.inner().remaining(&id("alice")), 0);
}

#[tokio::test]
async fn the_runner_stops_waiting_after_the_configured_attempts() {
    let mut rules = config(20, 1);
    rules.rules.max_confirmation_attempts = 1;
    let mut session = Session::new(&scenario(), rules).unwrap();
    let mut transport = ScriptedTransport::new();

    let report = run_session(&mut session, &mut transport).await.unwrap();

    assert_eq!(report.end_reason, Some(EndReason::RoundLimit));
    // One action prompt and one confirmation prompt per player.
    assert_eq!(transport.prompts().len(), 6);
}

#[tokio::test]
async fn zero_attempts_waits_for_a_real_answer() {
    let mut rules = config(20, 1);
    rules.rules.max_confirmation_attempts = 0;
    let mut session = Session::new(&scenario(), rules).unwrap();
    let mut transport = ScriptedTransport::new();
    transport.push(&id("alice"), "> think");
    for garbage in ["hmm", "what", "eh", "nope", "later"] {
        transport.push(&id("alice"), garbage);
    }
    transport.push(&id("alice"), "continue");
    for player in ["bob", "carol"] {
        transport.push(&id(player), "> think").push(&id(player), "continue");
    }

    let report = run_session(&mut session, &mut transport).await.unwrap();

    assert_eq!(report.end_reason, Some(EndReason::RoundLimit));
    assert_eq!(transport.remaining(&id("alice")), 0);
    assert_eq!(transport.prompts().len(), 11);
    assert!(report.outcomes.iter().all(|o| o.active));
}
