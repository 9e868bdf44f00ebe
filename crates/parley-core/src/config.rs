//! Session configuration.
//!
//! A session is configured from a YAML document with three sections:
//!
//! ```yaml
//! rules:
//!   ap_per_turn: 10
//!   max_rounds: 20
//!   action_marker: ">"
//!   continue_token: continue
//!   quit_token: quit
//!   max_confirmation_attempts: 3
//!   suggestion_limit: 3
//! prompt:
//!   turn_template: "..."
//!   confirm_template: "..."
//! logging:
//!   level: info
//!   format: pretty
//! ```
//!
//! Every field is optional. Environment variables override the file:
//! `PARLEY_MAX_ROUNDS`, `PARLEY_AP_PER_TURN` and `PARLEY_LOG_LEVEL`.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is out of range or inconsistent with another.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level session configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Turn and round rules.
    #[serde(default)]
    pub rules: RulesConfig,

    /// Prompt templates for outbound turn messages.
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SessionConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment overrides are applied before validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is rejected.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is rejected.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `PARLEY_*` environment variable overrides.
    ///
    /// Unparseable numeric values are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PARLEY_MAX_ROUNDS") {
            match val.parse() {
                Ok(rounds) => self.rules.max_rounds = rounds,
                Err(_) => warn!(value = %val, "ignoring non-numeric PARLEY_MAX_ROUNDS"),
            }
        }
        if let Ok(val) = std::env::var("PARLEY_AP_PER_TURN") {
            match val.parse() {
                Ok(ap) => self.rules.ap_per_turn = ap,
                Err(_) => warn!(value = %val, "ignoring non-numeric PARLEY_AP_PER_TURN"),
            }
        }
        if let Ok(val) = std::env::var("PARLEY_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Reject values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rules = &self.rules;
        if rules.ap_per_turn == 0 {
            return Err(invalid("rules.ap_per_turn", "must be at least 1"));
        }
        if rules.max_rounds == 0 {
            return Err(invalid("rules.max_rounds", "must be at least 1"));
        }
        if rules.action_marker.trim().is_empty() {
            return Err(invalid("rules.action_marker", "must not be blank"));
        }
        let continue_token = rules.continue_token.trim();
        let quit_token = rules.quit_token.trim();
        if continue_token.is_empty() || quit_token.is_empty() {
            return Err(invalid("rules.continue_token", "confirmation tokens must not be blank"));
        }
        if continue_token.eq_ignore_ascii_case(quit_token) {
            return Err(invalid("rules.quit_token", "must differ from rules.continue_token"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_owned(),
    }
}

/// Turn and round rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RulesConfig {
    /// Action points granted at the start of every turn, unless a player
    /// template sets its own maximum.
    #[serde(default = "default_ap_per_turn")]
    pub ap_per_turn: u32,

    /// Rounds played before the session ends.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    /// Prefix that marks a line of agent text as an action request.
    #[serde(default = "default_action_marker")]
    pub action_marker: String,

    /// Confirmation input that ends a turn.
    #[serde(default = "default_continue_token")]
    pub continue_token: String,

    /// Confirmation input that ends a turn and leaves the game.
    #[serde(default = "default_quit_token")]
    pub quit_token: String,

    /// Unrecognised confirmation replies [`run_session`] tolerates from one
    /// agent before it ends the turn as if the agent had continued. `0`
    /// waits forever. The session itself never ends a turn on bad input.
    ///
    /// [`run_session`]: crate::runner::run_session
    #[serde(default = "default_max_confirmation_attempts")]
    pub max_confirmation_attempts: u32,

    /// Maximum verb suggestions offered for an unknown action.
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            ap_per_turn: default_ap_per_turn(),
            max_rounds: default_max_rounds(),
            action_marker: default_action_marker(),
            continue_token: default_continue_token(),
            quit_token: default_quit_token(),
            max_confirmation_attempts: default_max_confirmation_attempts(),
            suggestion_limit: default_suggestion_limit(),
        }
    }
}

/// Prompt templates, rendered with `minijinja` against a
/// [`TurnMessage`](crate::message::TurnMessage).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PromptConfig {
    /// Template for a turn that expects actions.
    #[serde(default = "default_turn_template")]
    pub turn_template: String,

    /// Template for the end-of-turn confirmation request.
    #[serde(default = "default_confirm_template")]
    pub confirm_template: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            turn_template: default_turn_template(),
            confirm_template: default_confirm_template(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) used when `RUST_LOG` is
    /// not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_ap_per_turn() -> u32 {
    10
}

const fn default_max_rounds() -> u32 {
    20
}

fn default_action_marker() -> String {
    ">".to_owned()
}

fn default_continue_token() -> String {
    "continue".to_owned()
}

fn default_quit_token() -> String {
    "quit".to_owned()
}

const fn default_max_confirmation_attempts() -> u32 {
    3
}

const fn default_suggestion_limit() -> usize {
    3
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_turn_template() -> String {
    "\
Round {{ round }}. You are {{ name }}, with {{ ap }} of {{ max_ap }} action points.
You are in {{ room.name }}. {{ room.description }}
{% if room.exits %}Exits: {{ room.exits | join(\", \") }}.
{% endif %}{% if room.objects %}You see: {{ room.objects | join(\", \") }}.
{% endif %}{% if room.occupants %}Also here: {{ room.occupants | join(\", \") }}.
{% endif %}{% if inventory %}You carry: {{ inventory | join(\", \") }}.
{% endif %}{% for motive in motives %}Goal: {{ motive.description }} ({{ motive.status }})
{% endfor %}{% for report in feedback %}- {{ report.text }}
{% endfor %}{% for observation in observations %}* {{ observation.event.text }}
{% endfor %}Write each action on its own line starting with '{{ marker }}'."
        .to_owned()
}

fn default_confirm_template() -> String {
    "\
{% for report in feedback %}- {{ report.text }}
{% endfor %}{% for observation in observations %}* {{ observation.event.text }}
{% endfor %}Your turn is over. Reply '{{ continue_token }}' to pass or '{{ quit_token }}' to leave the game."
        .to_owned()
}
