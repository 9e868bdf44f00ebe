//! Shared scenario and helpers for `parley-core` integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use parley_core::{Session, SessionConfig};
use parley_types::{ActionOutcome, ActionReport, Fault, MotiveStatus, PlayerId, Scenario};

/// A three-room manor with a hidden trapdoor, a locked door, a lamp two
/// players care about and a verb whose effect is broken on purpose.
pub const MANOR: &str = r#"
name: Manor
rooms:
  - id: hall
    name: Great Hall
    description: A draughty hall with a stone floor.
    exits:
      - { name: west, aliases: [w], to: study }
      - { name: down, to: cellar, hidden: true }
      - { name: east, to: garden, locked: true }
  - id: study
    name: Study
    description: Books everywhere.
    exits:
      - { name: east, aliases: [e], to: hall }
  - id: cellar
    name: Cellar
    exits:
      - { name: up, to: hall }
  - id: garden
    name: Garden
    exits:
      - { name: west, to: hall }
objects:
  - id: lamp
    name: brass lamp
    aliases: [lamp]
    location: room:hall
    properties:
      lit: false
  - id: statue
    name: marble statue
    aliases: [statue]
    portability:
      kind: immovable
    location: room:hall
    properties:
      heavy: true
  - id: key
    name: iron key
    aliases: [key]
    location: room:study
players:
  - id: alice
    name: Alice
    room: hall
    motives:
      - id: ritual
        description: Perform the ritual.
        success:
          kind: all
          of:
            - kind: atom
              id: blessed
              check: { kind: property, subject: actor, key: blessed }
              progress: You feel blessed.
            - kind: atom
              id: lamp_lit
              check: { kind: property, subject: 'object:lamp', key: lit }
              progress: The lamp burns brightly.
  - id: bob
    name: Bob
    room: hall
    motives:
      - id: darkness
        description: Keep the manor dark.
        success:
          kind: atom
          check: { kind: in_room, subject: actor, room: 'room:garden' }
        failure:
          kind: atom
          check: { kind: property, subject: 'object:lamp', key: lit }
  - id: carol
    name: Carol
    room: study
actions:
  - verb: move
    aliases: [go, walk]
    cost: 5
    params:
      - { name: direction, kind: exit }
    requirements:
      - id: exit
        check: { kind: exit_visible, exit: 'param:direction' }
      - id: unlocked
        check: { kind: exit_unlocked, exit: 'param:direction' }
    effects:
      - op: emit
        scope: room_occupants_excluding_actor
        text: "{{ actor }} leaves {{ direction }}."
      - op: move_player
        to: { kind: exit, exit: 'param:direction' }
      - op: emit
        scope: room_occupants_excluding_actor
        text: "{{ actor }} arrives."
    feedback: "You arrive in the {{ room }}."
  - verb: take
    aliases: [pick up, grab]
    cost: 5
    params:
      - { name: item, kind: object, scope: room }
    requirements:
      - id: portable
        check: { kind: portable, object: 'param:item' }
      - id: capacity
        check: { kind: has_capacity, object: 'param:item' }
    effects:
      - op: move_object
        object: 'param:item'
        to: { kind: actor_inventory }
      - op: emit
        scope: room_occupants_excluding_actor
        text: "{{ actor }} picks up the {{ item }}."
    feedback: "You take the {{ item }}."
  - verb: drop
    cost: 1
    params:
      - { name: item, kind: object, scope: inventory }
    effects:
      - op: move_object
        object: 'param:item'
        to: { kind: actor_room }
      - op: emit
        scope: room_occupants_excluding_actor
        text: "{{ actor }} drops the {{ item }}."
  - verb: give
    cost: 2
    params:
      - { name: item, kind: object, scope: inventory }
      - { name: who, kind: player }
    requirements:
      - id: nearby
        check: { kind: colocated, subject: 'param:who' }
    effects:
      - op: move_object
        object: 'param:item'
        to: { kind: inventory, holder: 'param:who' }
      - op: emit
        scope: target_player
        target: 'param:who'
        text: "{{ actor }} hands you the {{ item }}."
    feedback: "You give the {{ item }} to {{ who }}."
  - verb: pray
    cost: 10
    effects:
      - { op: set, subject: actor, key: blessed, value: true }
    feedback: You pray.
  - verb: doubt
    cost: 1
    effects:
      - { op: set, subject: actor, key: blessed, value: false }
  - verb: light
    cost: 2
    params:
      - { name: item, kind: object, scope: inventory }
    effects:
      - { op: set, subject: 'param:item', key: lit, value: true }
      - op: emit
        scope: room_occupants
        text: "The {{ item }} flares into light."
    feedback: "You light the {{ item }}."
  - verb: snuff
    cost: 1
    params:
      - { name: item, kind: object, scope: nearby }
    effects:
      - { op: set, subject: 'param:item', key: lit, value: false }
  - verb: think
    cost: 10
    feedback: You think.
  - verb: shout
    cost: 10
    params:
      - { name: message }
    effects:
      - op: emit
        scope: room_occupants_excluding_actor
        text: "{{ actor }} shouts: {{ message }}"
      - op: when
        condition: { kind: exit_exists, exit: west }
        then:
          - op: emit
            scope: adjacent_via_exit
            exit: west
            text: Someone is shouting nearby.
  - verb: search
    cost: 3
    requirements:
      - id: trapdoor
        check: { kind: exit_exists, exit: down }
        message: there is nothing to find here
    effects:
      - { op: reveal_exit, exit: down }
      - op: emit
        scope: room_occupants
        text: A trapdoor is revealed in the floor.
  - verb: unlock
    cost: 2
    params:
      - { name: direction, kind: exit }
    requirements:
      - id: exit
        check: { kind: exit_exists, exit: 'param:direction' }
      - id: key
        check: { kind: holds, object: 'object:key' }
        message: you need the iron key
    effects:
      - { op: lock_exit, exit: 'param:direction', locked: false }
  - verb: kick
    cost: 1
    effects:
      - { op: increment, subject: 'object:statue', key: heavy, by: 1 }
"#;

pub fn scenario() -> Scenario {
    serde_yml::from_str(MANOR).unwrap()
}

pub fn config(ap_per_turn: u32, max_rounds: u32) -> SessionConfig {
    let mut config = SessionConfig::default();
    config.rules.ap_per_turn = ap_per_turn;
    config.rules.max_rounds = max_rounds;
    config
}

/// A fresh manor session with 20 AP per turn and three rounds.
pub fn session() -> Session {
    Session::new(&scenario(), config(20, 3)).unwrap()
}

pub fn id(name: &str) -> PlayerId {
    PlayerId::new(name)
}

pub fn ap(session: &Session, player: &str) -> u32 {
    session.world().player(&id(player)).unwrap().ap.current()
}

pub fn motive(session: &Session, player: &str) -> MotiveStatus {
    session
        .world()
        .player(&id(player))
        .unwrap()
        .motives
        .first()
        .unwrap()
        .status()
}

/// Submit `text` for the current player and run everything it queued.
pub fn play(session: &mut Session, text: &str) -> Vec<ActionReport> {
    session.submit_turn(Ok(text.to_owned())).unwrap();
    session.run_queue().unwrap()
}

/// End the current player's turn.
pub fn pass(session: &mut Session) {
    session.confirm("continue").unwrap();
}

/// Forfeit the current player's turn with an empty reply and end it.
pub fn skip(session: &mut Session) {
    session.submit_turn(Ok(String::new())).unwrap();
    pass(session);
}

pub fn fault(report: &ActionReport) -> Option<&Fault> {
    match &report.outcome {
        ActionOutcome::Failed { fault } => Some(fault),
        ActionOutcome::Succeeded { .. } => None,
    }
}

pub fn observed_texts(session: &Session, player: &str) -> Vec<String> {
    session
        .pending_observations(&id(player))
        .iter()
        .map(|o| o.event.text.clone())
        .collect()
}
