//! Verb registry: canonical names, aliases and suggestions.
//!
//! Names are matched case-insensitively and may span several words. An
//! exact canonical name always wins over an alias; within each class the
//! longest matching name wins.

use std::collections::BTreeMap;

use parley_types::{ActionDefinition, VerbId};

use crate::error::RegistryError;

/// Immutable set of action definitions for a session.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    definitions: BTreeMap<VerbId, ActionDefinition>,
    order: Vec<VerbId>,
    names: BTreeMap<String, VerbId>,
    aliases: BTreeMap<String, VerbId>,
    longest: usize,
}

impl ActionRegistry {
    /// Index `definitions`, rejecting duplicate verbs and names claimed by
    /// two verbs.
    pub fn new(definitions: impl IntoIterator<Item = ActionDefinition>) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for definition in definitions {
            registry.insert(definition)?;
        }
        Ok(registry)
    }

    fn insert(&mut self, definition: ActionDefinition) -> Result<(), RegistryError> {
        let verb = definition.verb.clone();
        let name = normalize(verb.as_str());
        if name.is_empty() {
            return Err(RegistryError::EmptyVerb);
        }
        if self.definitions.contains_key(&verb) {
            return Err(RegistryError::DuplicateVerb(verb));
        }
        self.claim(&name, &verb)?;
        self.names.insert(name.clone(), verb.clone());
        self.track_length(&name);

        for alias in &definition.aliases {
            let alias = normalize(alias);
            if alias.is_empty() || alias == name {
                continue;
            }
            self.claim(&alias, &verb)?;
            self.aliases.insert(alias.clone(), verb.clone());
            self.track_length(&alias);
        }

        self.order.push(verb.clone());
        self.definitions.insert(verb, definition);
        Ok(())
    }

    fn claim(&self, name: &str, verb: &VerbId) -> Result<(), RegistryError> {
        let existing = self.names.get(name).or_else(|| self.aliases.get(name));
        match existing {
            Some(first) if first != verb => Err(RegistryError::AmbiguousName {
                name: name.to_owned(),
                first: first.clone(),
                second: verb.clone(),
            }),
            _ => Ok(()),
        }
    }

    fn track_length(&mut self, name: &str) {
        self.longest = self.longest.max(name.split(' ').count());
    }

    /// Definition of a canonical verb.
    pub fn get(&self, verb: &VerbId) -> Option<&ActionDefinition> {
        self.definitions.get(verb)
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.order.iter().filter_map(|v| self.definitions.get(v))
    }

    /// Number of registered verbs.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no verbs are registered.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Resolve the verb at the start of `tokens`.
    ///
    /// Returns the canonical verb and how many tokens it spans.
    pub fn resolve(&self, tokens: &[String]) -> Option<(VerbId, usize)> {
        let max = self.longest.min(tokens.len());
        for index in [&self.names, &self.aliases] {
            for k in (1..=max).rev() {
                let candidate = normalize(&tokens.iter().take(k).map(String::as_str).collect::<Vec<_>>().join(" "));
                if let Some(verb) = index.get(&candidate) {
                    return Some((verb.clone(), k));
                }
            }
        }
        None
    }

    /// Canonical verbs whose names or aliases resemble `word`, best first.
    ///
    /// Deterministic for a given registry: ranked by edit distance, then by
    /// name.
    pub fn suggest(&self, word: &str, limit: usize) -> Vec<String> {
        let word = normalize(word);
        let length = word.chars().count();
        let threshold = length.div_euclid(2).max(2);

        let mut ranked: Vec<(usize, &str, &VerbId)> = self
            .names
            .iter()
            .chain(&self.aliases)
            .filter_map(|(name, verb)| {
                let distance = levenshtein(&word, name);
                let shares_prefix = !word.is_empty() && (name.starts_with(&word) || word.starts_with(name.as_str()));
                (distance <= threshold || shares_prefix).then_some((distance, name.as_str(), verb))
            })
            .collect();
        ranked.sort_unstable();

        let mut suggestions: Vec<String> = Vec::new();
        for (_, _, verb) in ranked {
            if suggestions.len() >= limit {
                break;
            }
            if !suggestions.iter().any(|s| s == verb.as_str()) {
                suggestions.push(verb.to_string());
            }
        }
        suggestions
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Edit distance between two strings, counted in characters.
fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0_usize; previous.len()];

    for (i, ca) in a.chars().enumerate() {
        if let Some(first) = current.first_mut() {
            *first = i.saturating_add(1);
        }
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous
                .get(j)
                .copied()
                .unwrap_or_default()
                .saturating_add(usize::from(ca != *cb));
            let deletion = previous.get(j.saturating_add(1)).copied().unwrap_or_default().saturating_add(1);
            let insertion = current.get(j).copied().unwrap_or_default().saturating_add(1);
            if let Some(cell) = current.get_mut(j.saturating_add(1)) {
                *cell = substitution.min(deletion).min(insertion);
            }
        }
        core::mem::swap(&mut previous, &mut current);
    }
    previous.last().copied().unwrap_or_default()
}
