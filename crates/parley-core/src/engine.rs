//! The session engine.
//!
//! A [`Session`] owns the world and drives one player at a time through
//! parse, validate, execute, route and motive evaluation. It exposes the
//! state machine as small operations so the async runner and tests drive
//! it the same way:
//!
//! 1. [`Session::turn_message`] drains the player's queues into a message
//! 2. [`Session::submit_turn`] parses the reply and queues its actions
//! 3. [`Session::run_queue`] (or [`Session::step`]) executes them
//! 4. [`Session::confirm`] ends the turn with continue or quit
//! 5. [`Session::advance_round`] after the last player of a round
//!
//! Faults are player-level and land on the acting player's feedback
//! channel. Only an effect that fails after its requirements passed stops
//! the session.

use parley_rules::{
    ActionParser, ActionRegistry, Bindings, EffectExecutor, EvalContext, MotiveEvaluator,
    ParseFault, TextRenderer, Unmet, Vocabulary, apply_updates, bind, check_requirements,
    evaluate_cost,
};
use parley_types::{
    ActionOutcome, ActionReport, EventRequest, Fault, Invocation, Observation, ObservationKind,
    PlayerId, Scenario, SessionId,
};
use parley_world::{World, WorldError};
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::message::{MessageKind, MotiveView, PromptRenderer, RoomView, TurnMessage};
use crate::report::{EndReason, MotiveOutcome, PlayerOutcome, SessionReport};
use crate::router::EventRouter;
use crate::scheduler::{Scheduler, TurnState};
use crate::transport::TransportError;

/// How a confirmation input was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The turn ended and the player stays in the game.
    Continued,
    /// The turn ended and the player left the game.
    Quit,
    /// The input was neither token and was discarded.
    Ignored,
}

/// Everything needed to rewind a session to an earlier point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    world: World,
    router: EventRouter,
    scheduler: Scheduler,
    action_log: Vec<ActionReport>,
}

impl SessionSnapshot {
    /// The captured world.
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// The captured scheduler state.
    pub const fn state(&self) -> TurnState {
        self.scheduler.state()
    }
}

/// One running game.
pub struct Session {
    id: SessionId,
    scenario: String,
    config: SessionConfig,
    world: World,
    registry: ActionRegistry,
    vocabulary: Vocabulary,
    renderer: TextRenderer,
    prompts: PromptRenderer,
    router: EventRouter,
    scheduler: Scheduler,
    action_log: Vec<ActionReport>,
}

impl Session {
    /// Start a session with only the built-in predicate and effect kinds.
    pub fn new(scenario: &Scenario, config: SessionConfig) -> Result<Self, SessionError> {
        Self::with_vocabulary(scenario, config, Vocabulary::new())
    }

    /// Start a session whose content may use the custom kinds in
    /// `vocabulary`.
    ///
    /// The world is built, motives are primed so conditions that already
    /// hold do not report progress, and the first player's turn begins.
    pub fn with_vocabulary(
        scenario: &Scenario,
        config: SessionConfig,
        vocabulary: Vocabulary,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let mut world = World::from_scenario(scenario, config.rules.ap_per_turn)?;
        let registry = ActionRegistry::new(scenario.actions.iter().cloned())?;
        MotiveEvaluator::new(&vocabulary).prime(&mut world)?;
        let order: Vec<PlayerId> = world
            .players()
            .filter(|p| p.is_active())
            .map(|p| p.id.clone())
            .collect();
        let scheduler = Scheduler::new(order, config.rules.max_rounds);
        let prompts = PromptRenderer::new(&config.prompt)?;

        let mut session = Self {
            id: SessionId::new(),
            scenario: scenario.name.clone(),
            config,
            world,
            registry,
            vocabulary,
            renderer: TextRenderer::new(),
            prompts,
            router: EventRouter::new(),
            scheduler,
            action_log: Vec::new(),
        };
        info!(
            session = %session.id,
            scenario = %session.scenario,
            players = session.scheduler.order().len(),
            verbs = session.registry.len(),
            max_rounds = session.scheduler.max_rounds(),
            "session created"
        );
        session.begin_turn()?;
        Ok(session)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Session id.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Current world state.
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Active configuration.
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Registered verbs.
    pub const fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Current scheduler state.
    pub const fn state(&self) -> TurnState {
        self.scheduler.state()
    }

    /// Current round, starting at 1.
    pub const fn round(&self) -> u32 {
        self.scheduler.round()
    }

    /// Whose turn it is.
    pub fn current_player(&self) -> Option<&PlayerId> {
        self.scheduler.current()
    }

    /// Players still in the turn order.
    pub fn turn_order(&self) -> &[PlayerId] {
        self.scheduler.order()
    }

    /// Invocations still queued for the current player.
    pub fn queued(&self) -> usize {
        self.scheduler.queued()
    }

    /// Every action attempt so far.
    pub fn action_log(&self) -> &[ActionReport] {
        &self.action_log
    }

    /// Observations waiting for `player`, without draining them.
    pub fn pending_observations(&self, player: &PlayerId) -> &[Observation] {
        self.router.observations(player)
    }

    /// Action results waiting for `player`, without draining them.
    pub fn pending_feedback(&self, player: &PlayerId) -> &[ActionReport] {
        self.router.feedback(player)
    }

    /// Whether the game is over.
    pub const fn is_complete(&self) -> bool {
        matches!(self.scheduler.state(), TurnState::GameComplete)
    }

    // -----------------------------------------------------------------------
    // Turn messages
    // -----------------------------------------------------------------------

    /// Build the outbound message for the current player.
    ///
    /// This drains the player's observation and feedback queues; call it
    /// exactly once per message sent.
    pub fn turn_message(&mut self) -> Result<TurnMessage, SessionError> {
        let state = self.scheduler.state();
        let kind = match state {
            TurnState::AwaitingAction => MessageKind::Action,
            TurnState::AwaitingTurnEndConfirmation => MessageKind::Confirm,
            _ => {
                return Err(SessionError::InvalidState {
                    operation: "building a turn message",
                    state,
                });
            }
        };
        let player_id = self.current_or_err("building a turn message")?;
        let drained = self.router.drain(&player_id);

        let player = self
            .world
            .player(&player_id)
            .ok_or_else(|| WorldError::UnknownPlayer(player_id.clone()))?;
        let room = self
            .world
            .room(player.room())
            .ok_or_else(|| WorldError::UnknownRoom(player.room().clone()))?;
        let room_view = RoomView {
            id: room.id.clone(),
            name: room.name.clone(),
            description: room.description.clone(),
            exits: room.visible_exits().map(|e| e.name.clone()).collect(),
            objects: room
                .contents()
                .iter()
                .filter_map(|id| self.world.object(id))
                .map(|o| o.name.clone())
                .collect(),
            occupants: self
                .world
                .occupants(&room.id)
                .iter()
                .filter(|id| **id != player_id)
                .filter_map(|id| self.world.player(id))
                .map(|p| p.name.clone())
                .collect(),
        };
        let inventory = player
            .inventory()
            .iter()
            .filter_map(|id| self.world.object(id))
            .map(|o| o.name.clone())
            .collect();
        let motives = player
            .motives
            .iter()
            .map(|m| MotiveView {
                id: m.definition.id.clone(),
                description: m.definition.description.clone(),
                status: m.status(),
            })
            .collect();

        debug!(
            player = %player_id,
            kind = ?kind,
            feedback = drained.feedback.len(),
            observations = drained.observations.len(),
            "turn message built"
        );
        let message = TurnMessage {
            kind,
            round: self.scheduler.round(),
            player: player_id.clone(),
            name: player.name.clone(),
            ap: player.ap.current(),
            max_ap: player.ap.max(),
            room: room_view,
            inventory,
            motives,
            feedback: drained.feedback,
            observations: drained.observations,
            marker: String::new(),
            continue_token: String::new(),
            quit_token: String::new(),
        };
        Ok(message.with_rules(&self.config.rules))
    }

    /// Render `message` as prompt text.
    pub fn render_prompt(&self, message: &TurnMessage) -> Result<String, SessionError> {
        self.prompts.render(message)
    }

    // -----------------------------------------------------------------------
    // Turn processing
    // -----------------------------------------------------------------------

    /// Accept the current player's reply.
    ///
    /// A reply that parses is queued and the number of invocations is
    /// returned. A transport failure or a parse fault forfeits the rest of
    /// the turn: AP drops to zero, the fault goes to the player privately,
    /// and the session moves to turn-end confirmation. Nothing is charged
    /// or executed from a turn that does not parse in full.
    pub fn submit_turn(
        &mut self,
        response: Result<String, TransportError>,
    ) -> Result<usize, SessionError> {
        let state = self.scheduler.state();
        if state != TurnState::AwaitingAction {
            return Err(SessionError::InvalidState {
                operation: "submitting a turn",
                state,
            });
        }
        let player = self.current_or_err("submitting a turn")?;

        let parsed = match response {
            Ok(text) => ActionParser::new(&self.registry)
                .with_marker(self.config.rules.action_marker.clone())
                .with_suggestion_limit(self.config.rules.suggestion_limit)
                .parse_turn(&text)
                .map_err(|fault| (Fault::from(&fault), fault_line(&fault))),
            Err(e) => Err((
                Fault::Transport {
                    reason: e.to_string(),
                },
                None,
            )),
        };

        match parsed {
            Ok(invocations) => {
                let count = invocations.len();
                info!(player = %player, round = self.scheduler.round(), actions = count, "turn submitted");
                self.scheduler.enqueue(invocations)?;
                Ok(count)
            }
            Err((fault, line)) => {
                self.forfeit(&player, fault, line)?;
                Ok(0)
            }
        }
    }

    /// Execute the next queued invocation of the current player.
    ///
    /// Returns `None` when nothing is queued.
    pub fn step(&mut self) -> Result<Option<ActionReport>, SessionError> {
        let Some(invocation) = self.scheduler.begin_execution()? else {
            return Ok(None);
        };
        let player = self.current_or_err("executing an action")?;
        let report = self.execute(&player, &invocation)?;
        let exhausted = self
            .world
            .player(&player)
            .is_none_or(|p| p.ap.is_exhausted());
        let next = self.scheduler.finish_execution(exhausted)?;
        debug!(player = %player, state = %next, "action finished");
        Ok(Some(report))
    }

    /// Execute queued invocations until the turn ends or the queue is
    /// empty.
    pub fn run_queue(&mut self) -> Result<Vec<ActionReport>, SessionError> {
        let mut reports = Vec::new();
        while self.scheduler.state() == TurnState::AwaitingAction {
            match self.step()? {
                Some(report) => reports.push(report),
                None => break,
            }
        }
        Ok(reports)
    }

    /// Apply a turn-end confirmation input.
    ///
    /// The input is trimmed, an optional leading action marker is removed,
    /// and it is compared case-insensitively with the continue and quit
    /// tokens. Anything else is discarded with a warning and the session
    /// stays where it is.
    pub fn confirm(&mut self, input: &str) -> Result<Confirmation, SessionError> {
        let state = self.scheduler.state();
        if state != TurnState::AwaitingTurnEndConfirmation {
            return Err(SessionError::InvalidState {
                operation: "confirming a turn end",
                state,
            });
        }
        let player = self.current_or_err("confirming a turn end")?;

        let rules = &self.config.rules;
        let trimmed = input.trim();
        let answer = trimmed
            .strip_prefix(rules.action_marker.as_str())
            .unwrap_or(trimmed)
            .trim();
        let decision = if answer.eq_ignore_ascii_case(rules.continue_token.trim()) {
            Confirmation::Continued
        } else if answer.eq_ignore_ascii_case(rules.quit_token.trim()) {
            Confirmation::Quit
        } else {
            warn!(player = %player, input = %answer, "discarding unrecognised turn-end input");
            return Ok(Confirmation::Ignored);
        };

        let quit = decision == Confirmation::Quit;
        if quit {
            self.world.set_active(&player, false)?;
            info!(player = %player, round = self.scheduler.round(), "player quit");
        }
        let next = self.scheduler.end_turn(quit)?;
        info!(player = %player, round = self.scheduler.round(), "turn ended");
        if next == TurnState::AwaitingAction {
            self.begin_turn()?;
        }
        Ok(decision)
    }

    /// Close a completed round and start the next one, or end the game.
    pub fn advance_round(&mut self) -> Result<TurnState, SessionError> {
        let finished = self.scheduler.round();
        let next = self.scheduler.advance_round()?;
        info!(round = finished, "round complete");
        match next {
            TurnState::AwaitingAction => self.begin_turn()?,
            TurnState::GameComplete => {
                info!(
                    session = %self.id,
                    rounds = finished,
                    active = self.scheduler.order().len(),
                    "session complete"
                );
            }
            _ => {}
        }
        Ok(next)
    }

    // -----------------------------------------------------------------------
    // Snapshots and reporting
    // -----------------------------------------------------------------------

    /// Capture the mutable session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            world: self.world.clone(),
            router: self.router.clone(),
            scheduler: self.scheduler.clone(),
            action_log: self.action_log.clone(),
        }
    }

    /// Rewind to a snapshot taken from this session.
    pub fn restore(&mut self, snapshot: SessionSnapshot) {
        self.world = snapshot.world;
        self.router = snapshot.router;
        self.scheduler = snapshot.scheduler;
        self.action_log = snapshot.action_log;
        debug!(session = %self.id, state = %self.scheduler.state(), "session restored");
    }

    /// Summarise the session. Final once the game is complete.
    pub fn report(&self) -> SessionReport {
        let state = self.scheduler.state();
        let end_reason = (state == TurnState::GameComplete).then(|| {
            if self.scheduler.order().is_empty() {
                EndReason::NoActivePlayers
            } else {
                EndReason::RoundLimit
            }
        });
        let rounds_played = match state {
            TurnState::GameComplete | TurnState::RoundComplete => self.scheduler.round(),
            _ => self.scheduler.round().saturating_sub(1),
        };
        let outcomes = self
            .world
            .players()
            .map(|p| PlayerOutcome {
                player: p.id.clone(),
                name: p.name.clone(),
                active: p.is_active(),
                motives: p
                    .motives
                    .iter()
                    .map(|m| MotiveOutcome {
                        motive: m.definition.id.clone(),
                        description: m.definition.description.clone(),
                        status: m.status(),
                    })
                    .collect(),
            })
            .collect();
        SessionReport {
            session_id: self.id,
            scenario: self.scenario.clone(),
            end_reason,
            rounds_played,
            generated_at: chrono::Utc::now(),
            outcomes,
            action_log: self.action_log.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn current_or_err(&self, operation: &'static str) -> Result<PlayerId, SessionError> {
        self.scheduler
            .current()
            .cloned()
            .ok_or_else(|| SessionError::InvalidState {
                operation,
                state: self.scheduler.state(),
            })
    }

    /// Refill the current player's AP. Runs once per turn.
    fn begin_turn(&mut self) -> Result<(), SessionError> {
        let Some(player) = self.scheduler.current().cloned() else {
            return Ok(());
        };
        let state = self
            .world
            .player_mut(&player)
            .ok_or_else(|| WorldError::UnknownPlayer(player.clone()))?;
        state.ap.reset();
        info!(
            player = %player,
            round = self.scheduler.round(),
            ap = state.ap.current(),
            "turn started"
        );
        Ok(())
    }

    fn forfeit(
        &mut self,
        player: &PlayerId,
        fault: Fault,
        line: Option<usize>,
    ) -> Result<(), SessionError> {
        if let Some(state) = self.world.player_mut(player) {
            state.ap.drain();
        }
        self.scheduler.forfeit()?;
        warn!(player = %player, round = self.scheduler.round(), fault = %fault, "turn forfeited");
        self.record(ActionReport {
            player: player.clone(),
            round: self.scheduler.round(),
            verb: None,
            line,
            text: fault.to_string(),
            outcome: ActionOutcome::Failed { fault },
        });
        Ok(())
    }

    fn execute(
        &mut self,
        player: &PlayerId,
        invocation: &Invocation,
    ) -> Result<ActionReport, SessionError> {
        let round = self.scheduler.round();
        let (bindings, cost) = match self.admit(player, invocation) {
            Ok(admitted) => admitted,
            Err(fault) => return Ok(self.reject(player, invocation, fault)),
        };

        self.world
            .player_mut(player)
            .ok_or_else(|| WorldError::UnknownPlayer(player.clone()))?
            .ap
            .spend(cost)?;
        let text = self.apply(player, invocation, &bindings, round)?;
        self.world.check_integrity()?;
        self.evaluate_motives(round)?;

        let report = ActionReport {
            player: player.clone(),
            round,
            verb: Some(invocation.verb.clone()),
            line: Some(invocation.line),
            text,
            outcome: ActionOutcome::Succeeded { ap_spent: cost },
        };
        info!(
            player = %player,
            round,
            verb = %invocation.verb,
            ap_spent = cost,
            "action executed"
        );
        self.record(report.clone());
        Ok(report)
    }

    /// Bind arguments, check requirements and price the action.
    fn admit(&self, player: &PlayerId, invocation: &Invocation) -> Result<(Bindings, u32), Fault> {
        let definition = self.registry.get(&invocation.verb).ok_or_else(|| {
            Unmet::new(
                "verb",
                format!("'{}' is not a registered action", invocation.verb),
            )
        })?;
        let bindings = bind(&self.world, player, definition, invocation)?;
        let ctx = EvalContext::new(&self.world, player, &bindings, &self.vocabulary);
        check_requirements(&ctx, &definition.requirements)?;

        let cost = evaluate_cost(&ctx, &definition.cost);
        let available = self.world.player(player).map_or(0, |p| p.ap.current());
        if cost > available {
            return Err(Fault::Requirement {
                requirement: "ap".to_owned(),
                reason: format!("needs {cost} action points, {available} left"),
            });
        }
        Ok((bindings, cost))
    }

    /// Run the effects, route their events and render the feedback text.
    fn apply(
        &mut self,
        player: &PlayerId,
        invocation: &Invocation,
        bindings: &Bindings,
        round: u32,
    ) -> Result<String, SessionError> {
        let Some(definition) = self.registry.get(&invocation.verb) else {
            return Err(SessionError::EffectApplication {
                player: player.clone(),
                verb: invocation.verb.clone(),
                reason: "action definition not registered".to_owned(),
            });
        };
        let executor = EffectExecutor::new(&self.vocabulary, &self.renderer);
        let outcome =
            match executor.execute(&mut self.world, player, bindings, &definition.effects) {
                Ok(outcome) => outcome,
                Err(e) => {
                    let reason = e.to_string();
                    error!(
                        player = %player,
                        verb = %invocation.verb,
                        error = %reason,
                        "effect failed after requirements passed"
                    );
                    let fault = Fault::EffectApplication {
                        reason: reason.clone(),
                    };
                    self.record(ActionReport {
                        player: player.clone(),
                        round,
                        verb: Some(invocation.verb.clone()),
                        line: Some(invocation.line),
                        text: fault.to_string(),
                        outcome: ActionOutcome::Failed { fault },
                    });
                    return Err(SessionError::EffectApplication {
                        player: player.clone(),
                        verb: invocation.verb.clone(),
                        reason,
                    });
                }
            };
        debug!(
            player = %player,
            verb = %invocation.verb,
            changes = ?outcome.changes,
            "effects committed"
        );

        for request in outcome.events {
            self.router.route(&self.world, round, request);
        }
        let text = definition.feedback.as_deref().map_or_else(
            || format!("You {}.", invocation.verb),
            |template| self.renderer.render(template, &self.world, player, bindings),
        );
        Ok(text)
    }

    /// Re-check every unresolved motive and deliver progress messages.
    fn evaluate_motives(&mut self, round: u32) -> Result<(), SessionError> {
        let updates = MotiveEvaluator::new(&self.vocabulary).evaluate(&self.world);
        apply_updates(&mut self.world, &updates)?;
        for update in updates {
            if let Some(status) = update.resolution {
                info!(
                    player = %update.player,
                    motive = %update.motive,
                    status = ?status,
                    "motive resolved"
                );
            }
            let Some(room) = self.world.player(&update.player).map(|p| p.room().clone()) else {
                continue;
            };
            for progress in update.progress {
                debug!(player = %update.player, atom = %progress.atom, "motive progress");
                self.router.route_as(
                    &self.world,
                    round,
                    EventRequest::private(update.player.clone(), room.clone(), progress.text),
                    ObservationKind::Progress,
                );
            }
        }
        Ok(())
    }

    fn reject(&mut self, player: &PlayerId, invocation: &Invocation, fault: Fault) -> ActionReport {
        info!(
            player = %player,
            verb = %invocation.verb,
            line = invocation.line,
            fault = %fault,
            "action rejected"
        );
        let report = ActionReport {
            player: player.clone(),
            round: self.scheduler.round(),
            verb: Some(invocation.verb.clone()),
            line: Some(invocation.line),
            text: fault.to_string(),
            outcome: ActionOutcome::Failed { fault },
        };
        self.record(report.clone());
        report
    }

    fn record(&mut self, report: ActionReport) {
        self.action_log.push(report.clone());
        self.router.record_feedback(report);
    }
}

const fn fault_line(fault: &ParseFault) -> Option<usize> {
    match fault {
        ParseFault::NoMarkers => None,
        ParseFault::Malformed { line, .. } | ParseFault::UnknownVerb { line, .. } => Some(*line),
    }
}
