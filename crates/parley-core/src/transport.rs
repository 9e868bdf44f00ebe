//! Agent transport abstraction.
//!
//! The engine never talks to agents directly. It hands a rendered prompt to
//! an [`AgentTransport`] and waits for raw text back; that wait is the only
//! suspension point in a session. A failed fetch is reported to the engine
//! as a [`TransportError`] and treated like an unparseable turn.

use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::time::Duration;

use parley_types::PlayerId;

/// Why no response arrived.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The agent did not answer in time.
    #[error("agent did not respond within {0:?}")]
    Timeout(Duration),

    /// The agent could not be reached.
    #[error("agent unavailable: {0}")]
    Unavailable(String),

    /// A scripted transport ran out of responses for this player.
    #[error("no scripted responses left for {0}")]
    Exhausted(PlayerId),
}

/// A source of agent responses.
pub trait AgentTransport {
    /// Send `prompt` to `player`'s agent and wait for its raw reply.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no usable reply arrives.
    fn fetch_response(
        &mut self,
        player: &PlayerId,
        prompt: &str,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// Replays canned responses per player and records every prompt it was
/// given. Used by tests and offline replays.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    responses: BTreeMap<PlayerId, VecDeque<Result<String, TransportError>>>,
    prompts: Vec<(PlayerId, String)>,
}

impl ScriptedTransport {
    /// A transport with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `player`.
    pub fn push(&mut self, player: &PlayerId, response: impl Into<String>) -> &mut Self {
        self.push_result(player, Ok(response.into()))
    }

    /// Queue a failed fetch for `player`.
    pub fn push_failure(&mut self, player: &PlayerId, error: TransportError) -> &mut Self {
        self.push_result(player, Err(error))
    }

    fn push_result(&mut self, player: &PlayerId, result: Result<String, TransportError>) -> &mut Self {
        self.responses.entry(player.clone()).or_default().push_back(result);
        self
    }

    /// Every prompt sent so far, in order.
    pub fn prompts(&self) -> &[(PlayerId, String)] {
        &self.prompts
    }

    /// Replies still queued for `player`.
    pub fn remaining(&self, player: &PlayerId) -> usize {
        self.responses.get(player).map_or(0, VecDeque::len)
    }
}

impl AgentTransport for ScriptedTransport {
    fn fetch_response(
        &mut self,
        player: &PlayerId,
        prompt: &str,
    ) -> impl Future<Output = Result<String, TransportError>> + Send {
        self.prompts.push((player.clone(), prompt.to_owned()));
        let response = self
            .responses
            .get_mut(player)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(TransportError::Exhausted(player.clone())));
        std::future::ready(response)
    }
}

/// Wraps a transport and fails any fetch that takes longer than `limit`.
#[derive(Debug, Clone)]
pub struct TimeoutTransport<T> {
    inner: T,
    limit: Duration,
}

impl<T> TimeoutTransport<T> {
    /// Bound every fetch made through `inner` to `limit`.
    pub const fn new(inner: T, limit: Duration) -> Self {
        Self { inner, limit }
    }

    /// The wrapped transport.
    pub const fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: AgentTransport> AgentTransport for TimeoutTransport<T> {
    fn fetch_response(
        &mut self,
        player: &PlayerId,
        prompt: &str,
    ) -> impl Future<Output = Result<String, TransportError>> + Send {
        let limit = self.limit;
        let fetch = self.inner.fetch_response(player, prompt);
        async move {
            tokio::time::timeout(limit, fetch)
                .await
                .unwrap_or(Err(TransportError::Timeout(limit)))
        }
    }
}
