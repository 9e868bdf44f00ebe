//! Kind-keyed registry of custom predicates and effects.
//!
//! Built-in predicate and effect kinds are matched directly. Content that
//! needs something else uses `kind: custom` / `op: custom` with a `name`,
//! and the name is looked up here. Adding a kind never touches the
//! evaluators.

use std::collections::BTreeMap;
use std::sync::Arc;

use parley_types::{PlayerId, PropertyBag, StateChange};
use parley_world::World;

use crate::binding::Bindings;
use crate::predicate::EvalContext;

/// A custom predicate: `Ok(())` when it holds, otherwise the reason.
pub type PredicateFn = dyn Fn(&EvalContext<'_>, &PropertyBag) -> Result<(), String> + Send + Sync;

/// A custom effect: mutates the world and reports what changed, or fails
/// with a reason.
pub type EffectFn =
    dyn Fn(&mut World, &PlayerId, &Bindings, &PropertyBag) -> Result<Vec<StateChange>, String> + Send + Sync;

/// Custom predicate and effect handlers by name.
#[derive(Clone, Default)]
pub struct Vocabulary {
    predicates: BTreeMap<String, Arc<PredicateFn>>,
    effects: BTreeMap<String, Arc<EffectFn>>,
}

impl Vocabulary {
    /// Empty vocabulary: only built-in kinds are available.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a custom predicate kind.
    pub fn register_predicate<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&EvalContext<'_>, &PropertyBag) -> Result<(), String> + Send + Sync + 'static,
    {
        self.predicates.insert(name.into(), Arc::new(predicate));
    }

    /// Register (or replace) a custom effect kind.
    pub fn register_effect<F>(&mut self, name: impl Into<String>, effect: F)
    where
        F: Fn(&mut World, &PlayerId, &Bindings, &PropertyBag) -> Result<Vec<StateChange>, String>
            + Send
            + Sync
            + 'static,
    {
        self.effects.insert(name.into(), Arc::new(effect));
    }

    /// Handler for a custom predicate kind.
    pub fn predicate(&self, name: &str) -> Option<&PredicateFn> {
        self.predicates.get(name).map(AsRef::as_ref)
    }

    /// Handler for a custom effect kind.
    pub fn effect(&self, name: &str) -> Option<&EffectFn> {
        self.effects.get(name).map(AsRef::as_ref)
    }
}

impl core::fmt::Debug for Vocabulary {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Vocabulary")
            .field("predicates", &self.predicates.keys().collect::<Vec<_>>())
            .field("effects", &self.effects.keys().collect::<Vec<_>>())
            .finish()
    }
}
