//! single owner of all rule sets
//!
//! consumers hold [`RuleHandle`]s instead of sharing sets. Sets are never
//! removed from the registry, so handles stay valid for its lifetime.

use thiserror::Error;

use crate::conditions::{ConditionSet, GameState, ENTRIES_VERSION};
use crate::config::ConfigStore;

/// non-owning reference to a set in a [`RuleRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleHandle(usize);

impl RuleHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("a rule set for '{0}' is already registered")]
    DuplicateCategory(String),
}

#[derive(Debug, Default)]
pub struct RuleRegistry {
    sets: Vec<ConditionSet>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// load every section of `store` that holds a condition set
    pub fn load_all(store: &dyn ConfigStore) -> Self {
        let mut registry = Self::new();

        for category in store.sections() {
            if !store.has_key(&category, "entries_version") {
                continue;
            }
            let set = ConditionSet::load_from(store, category);
            // sections are unique, so registration cannot collide
            if let Err(e) = registry.register(set) {
                log::warn!("{}", e);
            }
        }

        log::debug!(
            "loaded {} rule set(s) (layout version {})",
            registry.len(),
            ENTRIES_VERSION
        );
        registry
    }

    pub fn register(&mut self, set: ConditionSet) -> Result<RuleHandle, RegistryError> {
        if self.find(set.category()).is_some() {
            return Err(RegistryError::DuplicateCategory(set.category().to_string()));
        }

        let conflicts = self.conflicts_with(&set);
        if !conflicts.is_empty() {
            log::info!(
                "rule set '{}' conflicts with {} other set(s)",
                set.category(),
                conflicts.len()
            );
        }

        self.sets.push(set);
        Ok(RuleHandle(self.sets.len() - 1))
    }

    pub fn get(&self, handle: RuleHandle) -> Option<&ConditionSet> {
        self.sets.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: RuleHandle) -> Option<&mut ConditionSet> {
        self.sets.get_mut(handle.0)
    }

    pub fn find(&self, category: &str) -> Option<RuleHandle> {
        self.sets
            .iter()
            .position(|s| s.category() == category)
            .map(RuleHandle)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RuleHandle, &ConditionSet)> {
        self.sets
            .iter()
            .enumerate()
            .map(|(i, s)| (RuleHandle(i), s))
    }

    /// registered sets (other than one with the same category) that conflict with `candidate`
    pub fn conflicts_with(&self, candidate: &ConditionSet) -> Vec<RuleHandle> {
        self.iter()
            .filter(|(_, s)| s.category() != candidate.category())
            .filter(|(_, s)| s.conflicts(candidate))
            .map(|(h, _)| h)
            .collect()
    }

    /// every conflicting pair, each reported once with the lower handle first
    pub fn conflicting_pairs(&self) -> Vec<(RuleHandle, RuleHandle)> {
        let mut pairs = Vec::new();
        for (i, a) in self.sets.iter().enumerate() {
            for (j, b) in self.sets.iter().enumerate().skip(i + 1) {
                if a.conflicts(b) {
                    pairs.push((RuleHandle(i), RuleHandle(j)));
                }
            }
        }
        pairs
    }

    /// sets that pass for `state`
    pub fn active(&self, state: &GameState) -> Vec<RuleHandle> {
        self.iter()
            .filter(|(_, s)| s.passes(state))
            .map(|(h, _)| h)
            .collect()
    }

    pub fn save_all(&self, store: &mut dyn ConfigStore) {
        for set in &self.sets {
            set.save(store);
        }
    }
}
