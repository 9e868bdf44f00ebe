//! Turn text parsing into action invocations.
//!
//! Only lines whose trimmed text starts with the action marker are
//! considered; everything else is narration and is ignored. A marker line is
//! tokenized on whitespace with single or double quotes grouping multi-word
//! arguments, its leading tokens are resolved against the
//! [`ActionRegistry`], and the remaining arguments are checked against the
//! verb's parameter schema. No world state is consulted.

use parley_types::{Invocation, ParamKind};
use tracing::debug;

use crate::error::ParseFault;
use crate::registry::ActionRegistry;

/// Default action marker.
pub const DEFAULT_MARKER: &str = ">";

/// Every marker line of a turn, sorted into invocations and failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLines {
    /// Successfully parsed invocations in source order.
    pub invocations: Vec<Invocation>,
    /// Failures in source order.
    pub failures: Vec<ParseFault>,
    /// Number of marker lines seen.
    pub marker_lines: usize,
}

/// Parser bound to a registry and marker.
#[derive(Debug, Clone)]
pub struct ActionParser<'a> {
    registry: &'a ActionRegistry,
    marker: String,
    suggestion_limit: usize,
}

impl<'a> ActionParser<'a> {
    /// Create a parser using [`DEFAULT_MARKER`] and three suggestions.
    pub fn new(registry: &'a ActionRegistry) -> Self {
        Self {
            registry,
            marker: DEFAULT_MARKER.to_owned(),
            suggestion_limit: 3,
        }
    }

    /// Use a different action marker.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Cap the number of suggestions on unknown verbs.
    #[must_use]
    pub const fn with_suggestion_limit(mut self, limit: usize) -> Self {
        self.suggestion_limit = limit;
        self
    }

    /// Parse a turn, invalidating it entirely on any failure.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFault::NoMarkers`] when the text has no marker lines,
    /// otherwise the first failing line's fault.
    pub fn parse_turn(&self, text: &str) -> Result<Vec<Invocation>, ParseFault> {
        let parsed = self.parse_lines(text);
        if parsed.marker_lines == 0 {
            return Err(ParseFault::NoMarkers);
        }
        if let Some(fault) = parsed.failures.into_iter().next() {
            return Err(fault);
        }
        debug!(invocations = parsed.invocations.len(), "turn parsed");
        Ok(parsed.invocations)
    }

    /// Parse every marker line without giving up on the first failure.
    pub fn parse_lines(&self, text: &str) -> ParsedLines {
        let mut parsed = ParsedLines::default();
        for (index, line) in text.lines().enumerate() {
            let Some(body) = line.trim().strip_prefix(self.marker.as_str()) else {
                continue;
            };
            parsed.marker_lines = parsed.marker_lines.saturating_add(1);
            let number = index.saturating_add(1);
            match self.parse_line(body.trim(), number) {
                Ok(invocation) => parsed.invocations.push(invocation),
                Err(fault) => parsed.failures.push(fault),
            }
        }
        parsed
    }

    fn parse_line(&self, body: &str, line: usize) -> Result<Invocation, ParseFault> {
        let malformed = |reason: String| ParseFault::Malformed { line, reason };
        if body.is_empty() {
            return Err(malformed("empty action line".to_owned()));
        }

        let mut tokens = tokenize(body).map_err(malformed)?;
        let Some((verb, consumed)) = self.registry.resolve(&tokens) else {
            let written = tokens.first().cloned().unwrap_or_default();
            return Err(ParseFault::UnknownVerb {
                line,
                suggestions: self.registry.suggest(&written, self.suggestion_limit),
                verb: written,
            });
        };
        let mut args = tokens.split_off(consumed.min(tokens.len()));

        let Some(definition) = self.registry.get(&verb) else {
            return Err(malformed(format!("'{verb}' has no definition")));
        };
        let params = &definition.params;
        let required = params.iter().filter(|p| !p.optional).count();
        if args.len() < required {
            return Err(malformed(format!(
                "'{verb}' needs at least {required} argument(s), got {}",
                args.len()
            )));
        }
        if args.len() > params.len() {
            let absorbs_rest = params.last().is_some_and(|p| p.kind == ParamKind::Text);
            if !absorbs_rest {
                return Err(malformed(format!(
                    "'{verb}' takes at most {} argument(s), got {}",
                    params.len(),
                    args.len()
                )));
            }
            let rest = args.split_off(params.len().saturating_sub(1));
            args.push(rest.join(" "));
        }

        Ok(Invocation {
            verb,
            args,
            line,
            raw: body.to_owned(),
        })
    }
}

/// Split on whitespace, grouping `'...'` and `"..."`.
///
/// Quotes must stand alone as whole words: an unterminated quote, a quote
/// opening inside a word, or text glued to a closing quote is rejected.
fn tokenize(input: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '"' || c == '\'' {
            if !word.is_empty() {
                return Err(format!("quote {c} opens inside '{word}'"));
            }
            let mut quoted = String::new();
            let mut closed = false;
            for q in chars.by_ref() {
                if q == c {
                    closed = true;
                    break;
                }
                quoted.push(q);
            }
            if !closed {
                return Err(format!("unterminated quote {c}"));
            }
            if chars.peek().is_some_and(|n| !n.is_whitespace()) {
                return Err(format!("text follows closing quote {c}"));
            }
            tokens.push(quoted);
        } else if c.is_whitespace() {
            if !word.is_empty() {
                tokens.push(core::mem::take(&mut word));
            }
        } else {
            word.push(c);
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }
    Ok(tokens)
}
