//! ordered condition expression persisted under a category

use std::fmt;

use super::conflicts;
use super::error::{ConditionError, NestingError};
use super::eval::{self, GameState};
use super::profession::Profession;
use super::types::{BoolOp, Condition, ConditionEntry, ConditionId, ConditionKind, ConditionOp};
use crate::config::ConfigStore;

/// version of the entry layout written by [`ConditionSet::save`]
pub const ENTRIES_VERSION: i64 = 1;

const KEY_VERSION: &str = "entries_version";
const KEY_COUNT: &str = "entry_count";

fn entry_key(index: usize, field: &str) -> String {
    format!("entry_{}_{}", index, field)
}

/// a boolean expression over conditions, stored under `category`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionSet {
    category: String,
    entries: Vec<ConditionEntry>,
    next_id: ConditionId,
}

impl ConditionSet {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// create a set and load its entries from `store`
    pub fn load_from(store: &dyn ConfigStore, category: impl Into<String>) -> Self {
        let mut set = Self::new(category);
        set.load(store);
        set
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn entries(&self) -> &[ConditionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: ConditionId) -> Option<&Condition> {
        self.entries
            .iter()
            .map(|e| &e.condition)
            .find(|c| c.id() == id)
    }

    fn position(&self, id: ConditionId) -> Result<usize, ConditionError> {
        self.entries
            .iter()
            .position(|e| e.condition.id() == id)
            .ok_or(ConditionError::UnknownCondition(id))
    }

    fn condition_mut(&mut self, id: ConditionId) -> Result<&mut Condition, ConditionError> {
        let index = self.position(id)?;
        Ok(&mut self.entries[index].condition)
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// whether the set is active for this state
    ///
    /// empty sets pass; malformed sets never pass
    pub fn passes(&self, state: &GameState) -> bool {
        self.evaluate(state).unwrap_or(false)
    }

    /// like [`ConditionSet::passes`], but reports malformed nesting
    pub fn evaluate(&self, state: &GameState) -> Result<bool, NestingError> {
        eval::evaluate(&self.entries, state)
    }

    pub fn validate(&self) -> Result<(), NestingError> {
        eval::validate(&self.entries)
    }

    /// true when this set and `other` can never be active together
    pub fn conflicts(&self, other: &ConditionSet) -> bool {
        !self.conflicting_pairs(other).is_empty()
    }

    /// the condition pairs behind a conflict, `(ours, theirs)`
    pub fn conflicting_pairs<'a>(
        &'a self,
        other: &'a ConditionSet,
    ) -> Vec<(&'a Condition, &'a Condition)> {
        conflicts::conflicting_pairs(&self.entries, &other.entries)
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// append a condition joined to the previous entry with `op`
    pub fn add(&mut self, kind: ConditionKind, op: BoolOp) -> ConditionId {
        let id = self.fresh_id();
        self.entries
            .push(ConditionEntry::new(Condition::new(id, kind), ConditionOp::new(op)));
        id
    }

    /// next unused id; once the counter is exhausted, the lowest free id
    fn fresh_id(&mut self) -> ConditionId {
        if let Some(next) = self.next_id.checked_add(1) {
            let id = self.next_id;
            self.next_id = next;
            return id;
        }

        // ids in use are always below ConditionId::MAX, so this cannot overflow
        let mut used: Vec<ConditionId> = self.entries.iter().map(|e| e.condition.id()).collect();
        used.sort_unstable();
        let mut candidate = 0;
        for id in used {
            if id != candidate {
                break;
            }
            candidate += 1;
        }
        log::debug!("condition ids exhausted, reusing {}", candidate);
        candidate
    }

    /// remove a condition, keeping the remaining groups balanced
    ///
    /// grouping flags move to the neighbour inside the same group when it can
    /// take them; otherwise the group is dissolved.
    pub fn remove(&mut self, id: ConditionId) -> Result<Condition, ConditionError> {
        let index = self.position(id)?;
        let removed = self.entries.remove(index);
        let op = removed.op;

        if op.open_group && !op.close_group {
            let transferred = match self.entries.get_mut(index) {
                Some(next) if !next.op.open_group => {
                    next.op.open_group = true;
                    true
                }
                _ => false,
            };
            if !transferred {
                self.clear_matching_close(index);
            }
            // the next entry now joins where the removed one did
            if let Some(next) = self.entries.get_mut(index) {
                next.op.op = op.op;
            }
        } else if op.close_group && !op.open_group {
            let transferred = match index.checked_sub(1).and_then(|i| self.entries.get_mut(i)) {
                Some(prev) if !prev.op.close_group => {
                    prev.op.close_group = true;
                    true
                }
                _ => false,
            };
            if !transferred {
                self.clear_matching_open(index);
            }
        }

        Ok(removed.condition)
    }

    pub fn set_negate(&mut self, id: ConditionId, negate: bool) -> Result<(), ConditionError> {
        self.condition_mut(id)?.set_negate(negate);
        Ok(())
    }

    /// flip negation, returning the new value
    pub fn toggle_negate(&mut self, id: ConditionId) -> Result<bool, ConditionError> {
        let condition = self.condition_mut(id)?;
        let negate = !condition.negate();
        condition.set_negate(negate);
        Ok(negate)
    }

    pub fn set_operator(&mut self, id: ConditionId, op: BoolOp) -> Result<(), ConditionError> {
        let index = self.position(id)?;
        self.entries[index].op.op = op;
        Ok(())
    }

    pub fn set_profession(
        &mut self,
        id: ConditionId,
        profession: Profession,
    ) -> Result<(), ConditionError> {
        let condition = self.condition_mut(id)?;
        let actual = condition.nickname();
        match condition.kind_mut() {
            ConditionKind::Profession { profession: p } => {
                *p = profession;
                Ok(())
            }
            _ => Err(ConditionError::WrongKind {
                id,
                expected: "profession",
                actual,
            }),
        }
    }

    pub fn set_character_name(
        &mut self,
        id: ConditionId,
        name: impl Into<String>,
    ) -> Result<(), ConditionError> {
        let condition = self.condition_mut(id)?;
        let actual = condition.nickname();
        match condition.kind_mut() {
            ConditionKind::Character { name: n } => {
                *n = name.into();
                Ok(())
            }
            _ => Err(ConditionError::WrongKind {
                id,
                expected: "character",
                actual,
            }),
        }
    }

    /// wrap the entries from `first` to `last` (inclusive) in a group
    pub fn group(&mut self, first: ConditionId, last: ConditionId) -> Result<(), ConditionError> {
        let start = self.position(first)?;
        let end = self.position(last)?;

        if start > end {
            return Err(ConditionError::InvalidGroup(format!(
                "condition {} comes after condition {}",
                first, last
            )));
        }
        if self.entries[start].op.open_group {
            return Err(ConditionError::InvalidGroup(format!(
                "condition {} already opens a group",
                first
            )));
        }
        if self.entries[end].op.close_group {
            return Err(ConditionError::InvalidGroup(format!(
                "condition {} already closes a group",
                last
            )));
        }

        // the range has to be balanced on its own
        let mut depth = 0usize;
        for entry in &self.entries[start..=end] {
            if entry.op.open_group {
                depth += 1;
            }
            if entry.op.close_group {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    ConditionError::InvalidGroup("range cuts through an existing group".to_string())
                })?;
            }
        }
        if depth != 0 {
            return Err(ConditionError::InvalidGroup(
                "range cuts through an existing group".to_string(),
            ));
        }

        self.entries[start].op.open_group = true;
        self.entries[end].op.close_group = true;
        Ok(())
    }

    /// dissolve the group opened or closed at `id`
    pub fn ungroup(&mut self, id: ConditionId) -> Result<(), ConditionError> {
        let index = self.position(id)?;
        let op = self.entries[index].op;

        match (op.open_group, op.close_group) {
            (true, true) => {
                self.entries[index].op.open_group = false;
                self.entries[index].op.close_group = false;
            }
            (true, false) => {
                self.entries[index].op.open_group = false;
                self.clear_matching_close(index + 1);
            }
            (false, true) => {
                self.entries[index].op.close_group = false;
                self.clear_matching_open(index);
            }
            (false, false) => return Err(ConditionError::NotGrouped(id)),
        }

        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// clear the close flag of the group whose opener sits just before `from`
    fn clear_matching_close(&mut self, from: usize) {
        let mut depth = 1usize;
        for entry in self.entries.iter_mut().skip(from) {
            if entry.op.open_group {
                depth += 1;
            }
            if entry.op.close_group {
                depth -= 1;
                if depth == 0 {
                    entry.op.close_group = false;
                    return;
                }
            }
        }
    }

    /// clear the open flag of the group whose closer sat at `before`
    fn clear_matching_open(&mut self, before: usize) {
        let mut depth = 1usize;
        for entry in self.entries[..before].iter_mut().rev() {
            if entry.op.close_group {
                depth += 1;
            }
            if entry.op.open_group {
                depth -= 1;
                if depth == 0 {
                    entry.op.open_group = false;
                    return;
                }
            }
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// write all entries to `store`, replacing whatever the category held
    pub fn save(&self, store: &mut dyn ConfigStore) {
        let category = self.category.as_str();

        store.remove_section(category);
        store.set_long(category, KEY_VERSION, ENTRIES_VERSION);
        store.set_long(category, KEY_COUNT, self.entries.len() as i64);

        for (i, entry) in self.entries.iter().enumerate() {
            store.set_long(category, &entry_key(i, "id"), i64::from(entry.condition.id()));
            store.set_value(category, &entry_key(i, "kind"), entry.condition.nickname());
            store.set_long(category, &entry_key(i, "op"), entry.op.to_bits());
            entry.condition.save(store, category);
        }

        log::debug!(
            "saved {} condition(s) for '{}'",
            self.entries.len(),
            category
        );
    }

    /// replace the entries with those stored in `store`
    ///
    /// missing categories load as empty sets; unknown layouts and kinds are
    /// skipped with a warning. Malformed nesting is kept as-is and reported.
    pub fn load(&mut self, store: &dyn ConfigStore) {
        self.entries.clear();
        self.next_id = 0;

        let category = self.category.clone();
        if !store.has_section(&category) {
            log::debug!("no stored conditions for '{}'", category);
            return;
        }

        let version = store.get_long(&category, KEY_VERSION, 0);
        if version != ENTRIES_VERSION {
            log::warn!(
                "ignoring conditions for '{}': unsupported entry layout version {}",
                category,
                version
            );
            return;
        }

        let count = store.get_long(&category, KEY_COUNT, 0).max(0) as usize;
        for i in 0..count {
            // stop at the first missing entry, whatever the declared count
            if !store.has_key(&category, &entry_key(i, "kind")) {
                log::warn!(
                    "'{}' declares {} entries but only {} are stored",
                    category,
                    count,
                    i
                );
                break;
            }

            let nickname = store.get_value(&category, &entry_key(i, "kind"), "");
            let Some(kind) = ConditionKind::from_nickname(&nickname) else {
                log::warn!(
                    "skipping entry {} of '{}': unknown condition kind '{}'",
                    i,
                    category,
                    nickname
                );
                continue;
            };

            let raw_id = store.get_long(&category, &entry_key(i, "id"), -1);
            // ConditionId::MAX is reserved so the id counter can never overflow
            let Some(id) = ConditionId::try_from(raw_id)
                .ok()
                .filter(|id| *id < ConditionId::MAX)
            else {
                log::warn!(
                    "skipping entry {} of '{}': invalid condition id {}",
                    i,
                    category,
                    raw_id
                );
                continue;
            };
            if self.get(id).is_some() {
                log::warn!(
                    "skipping entry {} of '{}': duplicate condition id {}",
                    i,
                    category,
                    id
                );
                continue;
            }

            let mut condition = Condition::new(id, kind);
            condition.load(store, &category);
            let op = ConditionOp::from_bits(store.get_long(&category, &entry_key(i, "op"), 0));

            self.entries.push(ConditionEntry::new(condition, op));
            self.next_id = self.next_id.max(id.saturating_add(1));
        }

        if let Err(e) = self.validate() {
            log::warn!(
                "conditions for '{}' are malformed ({}); the set will not pass until fixed",
                category,
                e
            );
        }

        log::debug!("loaded {} condition(s) for '{}'", self.entries.len(), category);
    }
}

impl fmt::Display for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "always");
        }

        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", entry.op.op)?;
            }
            if entry.op.open_group {
                write!(f, "(")?;
            }
            write!(f, "{}", entry.condition)?;
            if entry.op.close_group {
                write!(f, ")")?;
            }
        }

        Ok(())
    }
}
