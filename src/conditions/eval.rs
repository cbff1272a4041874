//! condition evaluator
//!
//! evaluates condition sets against a snapshot of the current game state

use serde::{Deserialize, Serialize};

use super::error::NestingError;
use super::profession::Profession;
use super::types::{BoolOp, Condition, ConditionEntry};

/// map type ids reported by the game for World vs. World maps
pub const MAP_TYPE_WVW_EB: u32 = 9;
pub const MAP_TYPE_WVW_BB: u32 = 10;
pub const MAP_TYPE_WVW_GB: u32 = 11;
pub const MAP_TYPE_WVW_RB: u32 = 12;
pub const MAP_TYPE_WVW_FV: u32 = 13;
pub const MAP_TYPE_WVW_OBSIDIAN_SANCTUM: u32 = 14;
pub const MAP_TYPE_WVW_EOTM: u32 = 15;
pub const MAP_TYPE_WVW_LOUNGE: u32 = 18;

/// true for every map type that counts as World vs. World
pub fn is_wvw_map(map_type: u32) -> bool {
    matches!(
        map_type,
        MAP_TYPE_WVW_EB..=MAP_TYPE_WVW_EOTM | MAP_TYPE_WVW_LOUNGE
    )
}

/// read-only game state snapshot, refreshed by the host once per frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    /// player is in combat
    pub in_combat: bool,
    /// raw map type of the current map
    pub map_type: u32,
    /// player is underwater
    pub underwater: bool,
    /// profession of the active character
    pub profession: Profession,
    /// name of the active character
    pub character_name: String,
}

impl GameState {
    pub fn is_wvw(&self) -> bool {
        is_wvw_map(self.map_type)
    }

    /// set the combat flag
    pub fn with_combat(mut self, in_combat: bool) -> Self {
        self.in_combat = in_combat;
        self
    }

    /// set the map type
    pub fn with_map_type(mut self, map_type: u32) -> Self {
        self.map_type = map_type;
        self
    }

    /// set the underwater flag
    pub fn with_underwater(mut self, underwater: bool) -> Self {
        self.underwater = underwater;
        self
    }

    /// set the active profession
    pub fn with_profession(mut self, profession: Profession) -> Self {
        self.profession = profession;
        self
    }

    /// set the active character name
    pub fn with_character(mut self, name: impl Into<String>) -> Self {
        self.character_name = name.into();
        self
    }
}

/// fold an entry sequence left to right, honoring explicit groups
///
/// `leaf` maps each condition to a value; `combine` joins the running value with
/// the next operand. Opening a group saves the running value together with the
/// entry's operator; closing it joins the group's value back with that operator.
/// Returns `Ok(None)` for an empty sequence.
pub(crate) fn fold_entries<'a, T>(
    entries: &'a [ConditionEntry],
    mut leaf: impl FnMut(&'a Condition) -> T,
    mut combine: impl FnMut(BoolOp, T, T) -> T,
) -> Result<Option<T>, NestingError> {
    let mut scopes: Vec<(Option<T>, BoolOp)> = Vec::new();
    let mut acc: Option<T> = None;

    for (index, entry) in entries.iter().enumerate() {
        let value = leaf(&entry.condition);

        if entry.op.open_group {
            scopes.push((acc.take(), entry.op.op));
            acc = Some(value);
        } else {
            acc = Some(match acc.take() {
                Some(lhs) => combine(entry.op.op, lhs, value),
                // first operand of a scope ignores its operator
                None => value,
            });
        }

        if entry.op.close_group {
            let (outer, join) = scopes
                .pop()
                .ok_or(NestingError::UnmatchedClose { index })?;

            acc = match (outer, acc.take()) {
                (Some(lhs), Some(group)) => Some(combine(join, lhs, group)),
                (None, group) => group,
                (outer, None) => outer,
            };
        }
    }

    if !scopes.is_empty() {
        return Err(NestingError::Unclosed {
            count: scopes.len(),
        });
    }

    Ok(acc)
}

/// evaluate an entry sequence; an empty sequence is true (vacuous truth)
pub fn evaluate(entries: &[ConditionEntry], state: &GameState) -> Result<bool, NestingError> {
    let result = fold_entries(entries, |c| c.passes(state), |op, lhs, rhs| op.apply(lhs, rhs))?;
    Ok(result.unwrap_or(true))
}

/// check that every group is opened and closed exactly once, in order
pub fn validate(entries: &[ConditionEntry]) -> Result<(), NestingError> {
    let mut depth = 0usize;

    for (index, entry) in entries.iter().enumerate() {
        if entry.op.open_group {
            depth += 1;
        }
        if entry.op.close_group {
            depth = depth
                .checked_sub(1)
                .ok_or(NestingError::UnmatchedClose { index })?;
        }
    }

    if depth > 0 {
        return Err(NestingError::Unclosed { count: depth });
    }

    Ok(())
}
