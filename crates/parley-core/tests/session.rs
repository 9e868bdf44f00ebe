//! Integration tests for the session engine.
//!
//! Every test drives the manor scenario from `common` through the same
//! operations the async runner uses: build a turn message, submit a reply,
//! run the queue and confirm the turn end.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)]

mod common;

use std::time::Duration;

use common::{ap, config, fault, id, motive, observed_texts, pass, play, scenario, session, skip};
use parley_core::{Confirmation, EndReason, MessageKind, Session, SessionError, TransportError, TurnState};
use parley_rules::{Bound, Vocabulary};
use parley_types::{
    ActionDefinition, EntityRef, Fault, MotiveStatus, ObjectId, ObjectLocation, ObservationKind, PropertyValue,
    RoomId, StateChange, VerbId,
};

fn requirement_fault(fault: Option<&Fault>) -> (String, String) {
    match fault {
        Some(Fault::Requirement { requirement, reason }) => (requirement.clone(), reason.clone()),
        other => panic!("expected a requirement fault, got {other:?}"),
    }
}

fn location(session: &Session, object: &str) -> ObjectLocation {
    session
        .world()
        .object_location(&ObjectId::new(object))
        .cloned()
        .unwrap()
}

// =========================================================================
// Parsing
// =========================================================================

#[test]
fn narration_is_ignored_and_actions_run_in_line_order() {
    let mut s = session();
    let text = "I look around the hall.\n> take lamp\nThen I light it.\n> light lamp\n";
    assert_eq!(s.submit_turn(Ok(text.to_owned())).unwrap(), 2);
    assert_eq!(s.queued(), 2);

    let reports = s.run_queue().unwrap();
    let lines: Vec<_> = reports.iter().map(|r| r.line).collect();
    assert_eq!(lines, vec![Some(2), Some(4)]);
    assert!(reports.iter().all(|r| fault(r).is_none()));
    assert_eq!(ap(&s, "alice"), 13);
}

#[test]
fn multi_word_alias_resolves_to_its_verb() {
    let mut s = session();
    let reports = play(&mut s, "> pick up lamp");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].verb, Some(VerbId::new("take")));
    assert_eq!(location(&s, "lamp"), ObjectLocation::Inventory(id("alice")));
}

#[test]
fn a_malformed_line_invalidates_the_whole_turn() {
    let mut s = session();
    assert_eq!(s.submit_turn(Ok("> take lamp\n> take".to_owned())).unwrap(), 0);

    assert_eq!(s.state(), TurnState::AwaitingTurnEndConfirmation);
    assert_eq!(ap(&s, "alice"), 0);
    assert_eq!(location(&s, "lamp"), ObjectLocation::Room(RoomId::new("hall")));

    let last = s.action_log().last().unwrap();
    assert_eq!(last.verb, None);
    assert_eq!(last.line, Some(2));
    assert!(matches!(fault(last), Some(Fault::Parse { .. })));
}

#[test]
fn unknown_verbs_come_back_with_suggestions() {
    let mut s = session();
    s.submit_turn(Ok("> tkae lamp".to_owned())).unwrap();

    let feedback = s.pending_feedback(&id("alice"));
    assert_eq!(feedback.len(), 1);
    match fault(&feedback[0]) {
        Some(Fault::UnknownVerb { verb, suggestions }) => {
            assert_eq!(verb, "tkae");
            assert!(suggestions.iter().any(|s| s == "take"));
        }
        other => panic!("expected unknown verb, got {other:?}"),
    }
    assert!(feedback[0].text.contains("did you mean"));
}

#[test]
fn a_reply_without_markers_forfeits_the_turn() {
    let mut s = session();
    assert_eq!(s.submit_turn(Ok("I'd rather not.".to_owned())).unwrap(), 0);
    assert_eq!(s.state(), TurnState::AwaitingTurnEndConfirmation);
    assert_eq!(ap(&s, "alice"), 0);
}

#[test]
fn transport_failures_forfeit_the_turn() {
    let mut s = session();
    let count = s
        .submit_turn(Err(TransportError::Timeout(Duration::from_secs(30))))
        .unwrap();
    assert_eq!(count, 0);
    assert_eq!(s.state(), TurnState::AwaitingTurnEndConfirmation);
    assert_eq!(ap(&s, "alice"), 0);
    assert!(matches!(
        fault(&s.pending_feedback(&id("alice"))[0]),
        Some(Fault::Transport { .. })
    ));
}

// =========================================================================
// Action points
// =========================================================================

#[test]
fn spending_every_point_moves_to_confirmation() {
    let mut s = session();
    let reports = play(&mut s, "> think\n> think");
    assert_eq!(reports.len(), 2);
    assert_eq!(ap(&s, "alice"), 0);
    assert_eq!(s.state(), TurnState::AwaitingTurnEndConfirmation);
    assert_eq!(s.current_player(), Some(&id("alice")));
}

#[test]
fn exhaustion_discards_the_rest_of_the_queue() {
    let mut s = session();
    let reports = play(&mut s, "> think\n> think\n> take lamp");
    assert_eq!(reports.len(), 2);
    assert_eq!(s.queued(), 0);
    assert_eq!(location(&s, "lamp"), ObjectLocation::Room(RoomId::new("hall")));
}

#[test]
fn unaffordable_actions_are_rejected_without_charge() {
    let mut s = session();
    let reports = play(&mut s, "> think\n> take lamp\n> think");
    assert_eq!(reports.len(), 3);

    let (requirement, reason) = requirement_fault(fault(&reports[2]));
    assert_eq!(requirement, "ap");
    assert_eq!(reason, "needs 10 action points, 5 left");
    assert_eq!(ap(&s, "alice"), 5);
    assert_eq!(s.state(), TurnState::AwaitingTurnEndConfirmation);
}

#[test]
fn points_refill_at_the_start_of_every_turn() {
    let mut s = session();
    play(&mut s, "> think");
    assert_eq!(ap(&s, "alice"), 10);
    pass(&mut s);
    assert_eq!(ap(&s, "bob"), 20);
    skip(&mut s);
    skip(&mut s);

    assert_eq!(s.state(), TurnState::RoundComplete);
    assert_eq!(s.advance_round().unwrap(), TurnState::AwaitingAction);
    assert_eq!(s.round(), 2);
    assert_eq!(s.current_player(), Some(&id("alice")));
    assert_eq!(ap(&s, "alice"), 20);
}

// =========================================================================
// Requirements
// =========================================================================

#[test]
fn failed_requirement_keeps_points_and_the_rest_of_the_queue() {
    let mut s = session();
    s.submit_turn(Ok("> move north\n> think".to_owned())).unwrap();

    let report = s.step().unwrap().unwrap();
    let (requirement, reason) = requirement_fault(fault(&report));
    assert_eq!(requirement, "exit");
    assert_eq!(reason, "there is no exit 'north' here");
    assert_eq!(ap(&s, "alice"), 20);
    assert_eq!(s.state(), TurnState::AwaitingAction);
    assert_eq!(s.queued(), 1);

    let report = s.step().unwrap().unwrap();
    assert!(fault(&report).is_none());
    assert_eq!(ap(&s, "alice"), 10);
}

#[test]
fn immovable_objects_cannot_be_taken() {
    let mut s = session();
    let reports = play(&mut s, "> take statue");
    let (requirement, reason) = requirement_fault(fault(&reports[0]));
    assert_eq!(requirement, "portable");
    assert_eq!(reason, "marble statue cannot be moved");
    assert_eq!(location(&s, "statue"), ObjectLocation::Room(RoomId::new("hall")));
}

#[test]
fn objects_out_of_reach_do_not_bind() {
    let mut s = session();
    let reports = play(&mut s, "> take key");
    let (requirement, reason) = requirement_fault(fault(&reports[0]));
    assert_eq!(requirement, "param:item");
    assert_eq!(reason, "you see no 'key' here");
}

#[test]
fn locked_exits_block_until_unlocked() {
    let mut s = session();
    let reports = play(&mut s, "> move east");
    let (requirement, reason) = requirement_fault(fault(&reports[0]));
    assert_eq!(requirement, "unlocked");
    assert_eq!(reason, "the way east is locked");
    pass(&mut s);
    skip(&mut s);

    // Carol fetches the key from the study and opens the garden door.
    let reports = play(&mut s, "> take key\n> move east\n> unlock east\n> move east");
    assert_eq!(reports.len(), 4);
    assert!(reports.iter().all(|r| fault(r).is_none()), "{reports:?}");
    assert_eq!(s.world().player(&id("carol")).unwrap().room(), &RoomId::new("garden"));
    assert_eq!(reports[3].text, "You arrive in the Garden.");
}

#[test]
fn unlocking_needs_the_key() {
    let mut s = session();
    let reports = play(&mut s, "> unlock east");
    let (requirement, reason) = requirement_fault(fault(&reports[0]));
    assert_eq!(requirement, "key");
    assert_eq!(reason, "you need the iron key");
}

#[test]
fn hidden_exits_appear_once_searched() {
    let mut s = session();
    let message = s.turn_message().unwrap();
    assert_eq!(message.room.exits, vec!["west".to_owned(), "east".to_owned()]);

    let reports = play(&mut s, "> move down\n> search\n> move down");
    let (requirement, reason) = requirement_fault(fault(&reports[0]));
    assert_eq!(requirement, "exit");
    assert_eq!(reason, "there is no exit 'down' here");
    assert!(fault(&reports[1]).is_none());
    assert!(fault(&reports[2]).is_none());
    assert_eq!(s.world().player(&id("alice")).unwrap().room(), &RoomId::new("cellar"));
    assert_eq!(ap(&s, "alice"), 12);

    assert_eq!(
        observed_texts(&s, "bob"),
        vec![
            "A trapdoor is revealed in the floor.".to_owned(),
            "Alice leaves down.".to_owned(),
        ]
    );
}

// =========================================================================
// Event routing
// =========================================================================

#[test]
fn excluding_actor_scope_skips_the_actor() {
    let mut s = session();
    let reports = play(&mut s, "> take lamp");
    assert_eq!(reports[0].text, "You take the brass lamp.");

    assert_eq!(observed_texts(&s, "bob"), vec!["Alice picks up the brass lamp.".to_owned()]);
    assert!(observed_texts(&s, "alice").is_empty());
    assert!(observed_texts(&s, "carol").is_empty());
    assert_eq!(s.pending_feedback(&id("alice")).len(), 1);
    assert!(s.pending_feedback(&id("bob")).is_empty());
}

#[test]
fn room_scope_includes_the_actor() {
    let mut s = session();
    play(&mut s, "> take lamp\n> light lamp");
    let flare = "The brass lamp flares into light.".to_owned();
    assert!(observed_texts(&s, "alice").contains(&flare));
    assert!(observed_texts(&s, "bob").contains(&flare));
    assert!(!observed_texts(&s, "carol").contains(&flare));
}

#[test]
fn shouting_carries_through_the_west_exit() {
    let mut s = session();
    let reports = play(&mut s, "> shout hello there");
    assert!(fault(&reports[0]).is_none());
    assert_eq!(observed_texts(&s, "bob"), vec!["Alice shouts: hello there".to_owned()]);
    assert_eq!(observed_texts(&s, "carol"), vec!["Someone is shouting nearby.".to_owned()]);
    assert!(observed_texts(&s, "alice").is_empty());
}

#[test]
fn movement_is_seen_from_both_rooms() {
    let mut s = session();
    play(&mut s, "> move w");
    assert_eq!(observed_texts(&s, "bob"), vec!["Alice leaves w.".to_owned()]);
    assert_eq!(observed_texts(&s, "carol"), vec!["Alice arrives.".to_owned()]);
}

#[test]
fn targeted_events_reach_only_the_target() {
    let mut s = session();
    let reports = play(&mut s, "> take lamp\n> give lamp bob");
    assert_eq!(reports[1].text, "You give the brass lamp to Bob.");
    assert_eq!(location(&s, "lamp"), ObjectLocation::Inventory(id("bob")));

    let bob = s.pending_observations(&id("bob"));
    let handed = bob
        .iter()
        .find(|o| o.event.text == "Alice hands you the brass lamp.")
        .unwrap();
    assert_eq!(handed.kind, ObservationKind::Private);
    assert!(observed_texts(&s, "carol").is_empty());
}

#[test]
fn queues_drain_exactly_once() {
    let mut s = session();
    play(&mut s, "> take lamp");

    let confirm = s.turn_message().unwrap();
    assert_eq!(confirm.kind, MessageKind::Confirm);
    assert_eq!(confirm.feedback.len(), 1);
    assert!(s.pending_feedback(&id("alice")).is_empty());
    pass(&mut s);

    let first = s.turn_message().unwrap();
    assert_eq!(first.player, id("bob"));
    assert_eq!(first.kind, MessageKind::Action);
    assert_eq!(first.observations.len(), 1);
    assert_eq!(first.observations[0].event.text, "Alice picks up the brass lamp.");

    let second = s.turn_message().unwrap();
    assert!(second.observations.is_empty());
    assert!(second.feedback.is_empty());
}

#[test]
fn event_timestamps_increase() {
    let mut s = session();
    play(&mut s, "> take lamp\n> drop lamp");
    let sequences: Vec<_> = s
        .pending_observations(&id("bob"))
        .iter()
        .map(|o| o.event.timestamp.sequence)
        .collect();
    assert_eq!(sequences.len(), 2);
    assert!(sequences[0] < sequences[1]);
}

// =========================================================================
// Motives
// =========================================================================

#[test]
fn ritual_needs_both_conditions() {
    let mut s = session();
    play(&mut s, "> pray");
    assert_eq!(motive(&s, "alice"), MotiveStatus::Unresolved);
    pass(&mut s);
    skip(&mut s);
    skip(&mut s);
    s.advance_round().unwrap();

    play(&mut s, "> take lamp\n> light lamp");
    assert_eq!(motive(&s, "alice"), MotiveStatus::Achieved);
}

#[test]
fn resolved_motives_never_revert() {
    let mut s = session();
    play(&mut s, "> pray\n> take lamp\n> light lamp\n> doubt");
    assert_eq!(ap(&s, "alice"), 2);
    assert_eq!(motive(&s, "alice"), MotiveStatus::Achieved);
    // The lamp being lit sinks Bob's motive on Alice's turn.
    assert_eq!(motive(&s, "bob"), MotiveStatus::Failed);
    pass(&mut s);

    play(&mut s, "> take statue");
    assert_eq!(motive(&s, "alice"), MotiveStatus::Achieved);
    assert_eq!(motive(&s, "bob"), MotiveStatus::Failed);
}

#[test]
fn progress_messages_fire_once() {
    let mut s = Session::new(&common::scenario(), common::config(30, 3)).unwrap();
    let reports = play(&mut s, "> pray\n> doubt\n> pray");
    assert!(reports.iter().all(|r| fault(r).is_none()));

    let progress: Vec<_> = s
        .pending_observations(&id("alice"))
        .iter()
        .filter(|o| o.kind == ObservationKind::Progress)
        .map(|o| o.event.text.clone())
        .collect();
    assert_eq!(progress, vec!["You feel blessed.".to_owned()]);
    assert_eq!(motive(&s, "alice"), MotiveStatus::Unresolved);
}

#[test]
fn progress_is_private_to_the_motive_owner() {
    let mut s = session();
    play(&mut s, "> pray");
    assert!(observed_texts(&s, "bob").is_empty());
    assert_eq!(observed_texts(&s, "alice"), vec!["You feel blessed.".to_owned()]);
}

#[test]
fn conditions_true_at_start_do_not_report_progress() {
    let scenario: parley_types::Scenario = serde_yml::from_str(&common::MANOR.replace("lit: false", "lit: true")).unwrap();
    let mut s = Session::new(&scenario, common::config(20, 3)).unwrap();
    play(&mut s, "> pray");

    let progress: Vec<_> = s
        .pending_observations(&id("alice"))
        .iter()
        .filter(|o| o.kind == ObservationKind::Progress)
        .map(|o| o.event.text.clone())
        .collect();
    assert_eq!(progress, vec!["You feel blessed.".to_owned()]);
    assert_eq!(motive(&s, "alice"), MotiveStatus::Achieved);
}

// =========================================================================
// World integrity
// =========================================================================

#[test]
fn objects_are_always_in_exactly_one_place() {
    let mut s = session();
    play(&mut s, "> take lamp\n> give lamp bob");
    pass(&mut s);
    play(&mut s, "> drop lamp");

    s.world().check_integrity().unwrap();
    let lamp = ObjectId::new("lamp");
    let hall = s.world().room(&RoomId::new("hall")).unwrap();
    assert!(hall.contents().contains(&lamp));
    assert!(s.world().players().all(|p| !p.inventory().contains(&lamp)));
}

#[test]
fn effect_failures_stop_the_session() {
    let mut s = session();
    s.submit_turn(Ok("> kick".to_owned())).unwrap();
    let err = s.run_queue().unwrap_err();
    assert!(matches!(err, SessionError::EffectApplication { .. }), "{err}");
    assert!(matches!(
        fault(s.action_log().last().unwrap()),
        Some(Fault::EffectApplication { .. })
    ));
}

// =========================================================================
// Turn end and rounds
// =========================================================================

#[test]
fn unrecognised_confirmations_are_discarded() {
    let mut s = session();
    play(&mut s, "> think\n> think");
    assert_eq!(s.confirm("maybe later").unwrap(), Confirmation::Ignored);
    assert_eq!(s.state(), TurnState::AwaitingTurnEndConfirmation);
    assert_eq!(s.current_player(), Some(&id("alice")));

    assert_eq!(s.confirm("  > CONTINUE ").unwrap(), Confirmation::Continued);
    assert_eq!(s.current_player(), Some(&id("bob")));
    assert_eq!(s.state(), TurnState::AwaitingAction);
}

#[test]
fn garbage_never_ends_the_turn() {
    let mut s = session();
    skip_to_confirmation(&mut s);
    for input in ["hmm", "what", "eh", "nope", ""] {
        assert_eq!(s.confirm(input).unwrap(), Confirmation::Ignored);
        assert_eq!(s.state(), TurnState::AwaitingTurnEndConfirmation);
        assert_eq!(s.current_player(), Some(&id("alice")));
    }
    assert_eq!(s.confirm("quit").unwrap(), Confirmation::Quit);
    assert_eq!(s.current_player(), Some(&id("bob")));
}

#[test]
fn quitting_removes_the_player_for_good() {
    let mut s = session();
    skip_to_confirmation(&mut s);
    assert_eq!(s.confirm("quit").unwrap(), Confirmation::Quit);
    assert_eq!(s.turn_order(), &[id("bob"), id("carol")]);
    assert!(!s.world().player(&id("alice")).unwrap().is_active());
    assert_eq!(s.current_player(), Some(&id("bob")));

    skip(&mut s);
    skip(&mut s);
    s.advance_round().unwrap();
    assert_eq!(s.current_player(), Some(&id("bob")));
}

#[test]
fn actions_are_refused_outside_their_state() {
    let mut s = session();
    assert!(matches!(
        s.confirm("continue"),
        Err(SessionError::InvalidState { .. })
    ));
    skip_to_confirmation(&mut s);
    assert!(matches!(
        s.submit_turn(Ok("> think".to_owned())),
        Err(SessionError::InvalidState { .. })
    ));
    assert!(matches!(s.advance_round(), Err(SessionError::InvalidState { .. })));
}

#[test]
fn the_game_ends_after_the_round_limit() {
    let mut s = Session::new(&common::scenario(), common::config(20, 2)).unwrap();
    for _ in 0..2 {
        skip(&mut s);
        skip(&mut s);
        skip(&mut s);
        s.advance_round().unwrap();
    }
    assert!(s.is_complete());

    let report = s.report();
    assert_eq!(report.end_reason, Some(EndReason::RoundLimit));
    assert_eq!(report.rounds_played, 2);
    assert_eq!(report.scenario, "Manor");
    assert_eq!(
        report.motive_status(&id("alice"), "ritual"),
        Some(MotiveStatus::Unresolved)
    );
}

#[test]
fn snapshots_rewind_the_session() {
    let mut s = session();
    let before = s.snapshot();
    assert_eq!(before.state(), TurnState::AwaitingAction);

    play(&mut s, "> take lamp");
    assert_eq!(location(&s, "lamp"), ObjectLocation::Inventory(id("alice")));

    s.restore(before);
    assert_eq!(location(&s, "lamp"), ObjectLocation::Room(RoomId::new("hall")));
    assert_eq!(s.state(), TurnState::AwaitingAction);
    assert!(s.action_log().is_empty());
    assert!(observed_texts(&s, "bob").is_empty());
    assert_eq!(ap(&s, "alice"), 20);
}

#[test]
fn prompts_render_the_turn_message() {
    let mut s = session();
    let message = s.turn_message().unwrap();
    assert_eq!(message.name, "Alice");
    assert_eq!(message.room.occupants, vec!["Bob".to_owned()]);
    assert_eq!(message.room.objects.len(), 2);

    let prompt = s.render_prompt(&message).unwrap();
    assert!(prompt.contains("Great Hall"));
    assert!(prompt.contains("brass lamp"));
    assert!(prompt.contains("Perform the ritual."));
}

#[test]
fn sessions_run_registered_vocabulary() {
    let mut scenario = scenario();
    let polish: ActionDefinition = serde_yml::from_str(
        "verb: polish
cost: 2
params:
  - { name: item, kind: object, scope: room }
requirements:
  - id: polishable
    check: { kind: custom, name: polishable }
effects:
  - { op: custom, name: polish, args: { by: 2 } }
feedback: \"You polish the {{ item }}.\"
",
    )
    .unwrap();
    scenario.actions.push(polish);

    let mut vocabulary = Vocabulary::new();
    vocabulary.register_predicate("polishable", |ctx, _args| match ctx.bindings.get("item") {
        Some(Bound::Object(item)) if item.as_str() == "statue" => Err("marble will not shine".to_owned()),
        Some(Bound::Object(_)) => Ok(()),
        _ => Err("nothing to polish".to_owned()),
    });
    vocabulary.register_effect("polish", |world, _actor, bindings, args| {
        let Some(Bound::Object(item)) = bindings.get("item") else {
            return Err("nothing to polish".to_owned());
        };
        let by = args.get("by").and_then(PropertyValue::as_int).unwrap_or(1);
        let object = world.object_mut(item).ok_or_else(|| format!("no object {item}"))?;
        let old = object.properties.get("shine").cloned();
        let new = PropertyValue::Int(old.as_ref().and_then(PropertyValue::as_int).unwrap_or(0).saturating_add(by));
        object.properties.insert("shine".to_owned(), new.clone());
        Ok(vec![StateChange::Property { entity: EntityRef::Object(item.clone()), key: "shine".to_owned(), old, new }])
    });
    let mut s = Session::with_vocabulary(&scenario, config(20, 3), vocabulary).unwrap();

    let reports = play(&mut s, "> polish lamp\n> polish lamp\n> polish statue");
    assert_eq!(reports.len(), 3);
    assert!(reports[0].outcome.is_success());
    assert!(reports[1].outcome.is_success());
    assert!(matches!(
        fault(&reports[2]),
        Some(Fault::Requirement { requirement, reason })
            if requirement == "polishable" && reason == "marble will not shine"
    ));

    let lamp = s.world().object(&ObjectId::new("lamp")).unwrap();
    assert_eq!(lamp.properties.get("shine"), Some(&PropertyValue::Int(4)));
    assert!(!s.world().object(&ObjectId::new("statue")).unwrap().properties.contains_key("shine"));
    assert_eq!(ap(&s, "alice"), 16);
}

fn skip_to_confirmation(s: &mut Session) {
    s.submit_turn(Ok(String::new())).unwrap();
    assert_eq!(s.state(), TurnState::AwaitingTurnEndConfirmation);
}
