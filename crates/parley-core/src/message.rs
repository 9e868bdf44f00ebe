//! Outbound turn messages and prompt rendering.
//!
//! A [`TurnMessage`] is the structured view handed to the presentation
//! layer: what the player can see, what happened to them since their last
//! message, and what they are being asked for. [`PromptRenderer`] turns it
//! into prompt text with the configured `minijinja` templates.

use minijinja::Environment;
use parley_types::{ActionReport, MotiveId, MotiveStatus, Observation, PlayerId, RoomId};
use serde::Serialize;

use crate::config::{PromptConfig, RulesConfig};
use crate::error::SessionError;

/// What the message asks of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Submit action lines.
    Action,
    /// Continue or quit.
    Confirm,
}

/// The player's surroundings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomView {
    /// Room id.
    pub id: RoomId,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Names of exits that are not hidden.
    pub exits: Vec<String>,
    /// Names of objects lying here.
    pub objects: Vec<String>,
    /// Names of other active players here.
    pub occupants: Vec<String>,
}

/// One of the player's own motives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MotiveView {
    /// Motive id.
    pub id: MotiveId,
    /// Player-facing description.
    pub description: String,
    /// Resolution so far.
    pub status: MotiveStatus,
}

/// Everything sent to one player at one prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnMessage {
    /// Action request or confirmation request.
    pub kind: MessageKind,
    /// Current round.
    pub round: u32,
    /// Recipient.
    pub player: PlayerId,
    /// Recipient display name.
    pub name: String,
    /// Action points left.
    pub ap: u32,
    /// Action points per turn.
    pub max_ap: u32,
    /// Current room.
    pub room: RoomView,
    /// Names of carried objects.
    pub inventory: Vec<String>,
    /// The player's motives.
    pub motives: Vec<MotiveView>,
    /// Results of the player's own actions since the last message.
    pub feedback: Vec<ActionReport>,
    /// Events observed since the last message, in generation order.
    pub observations: Vec<Observation>,
    /// Prefix for action lines.
    pub marker: String,
    /// Input that ends the turn.
    pub continue_token: String,
    /// Input that leaves the game.
    pub quit_token: String,
}

impl TurnMessage {
    /// Copy the reply conventions from `rules`.
    pub fn with_rules(mut self, rules: &RulesConfig) -> Self {
        self.marker.clone_from(&rules.action_marker);
        self.continue_token.clone_from(&rules.continue_token);
        self.quit_token.clone_from(&rules.quit_token);
        self
    }
}

/// Renders turn messages with the configured templates.
pub struct PromptRenderer {
    env: Environment<'static>,
}

impl PromptRenderer {
    /// Compile the turn and confirmation templates.
    pub fn new(config: &PromptConfig) -> Result<Self, SessionError> {
        let mut env = Environment::new();
        env.add_template_owned("turn", config.turn_template.clone())
            .map_err(|e| SessionError::Prompt(format!("failed to add turn template: {e}")))?;
        env.add_template_owned("confirm", config.confirm_template.clone())
            .map_err(|e| SessionError::Prompt(format!("failed to add confirm template: {e}")))?;
        Ok(Self { env })
    }

    /// Render `message` with the template matching its kind.
    pub fn render(&self, message: &TurnMessage) -> Result<String, SessionError> {
        let name = match message.kind {
            MessageKind::Action => "turn",
            MessageKind::Confirm => "confirm",
        };
        let template = self
            .env
            .get_template(name)
            .map_err(|e| SessionError::Prompt(format!("template '{name}' missing: {e}")))?;
        template
            .render(message)
            .map_err(|e| SessionError::Prompt(format!("failed to render '{name}' prompt: {e}")))
    }
}
