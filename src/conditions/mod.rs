//! condition system for radial menu rules
//!
//! provides:
//! - single tests against the game state: in combat, in WvW, underwater,
//!   profession, character name, each optionally negated
//! - condition sets combining tests with AND/OR and explicit groups,
//!   evaluated strictly left to right
//! - persistence of sets into a key/value store under a category
//! - a conflict heuristic warning about sets that can never be active together

mod conflicts;
mod error;
mod eval;
mod profession;
mod set;
mod types;

pub use conflicts::{mutually_exclusive, required_conditions};
pub use error::{ConditionError, NestingError};
pub use eval::{
    evaluate, is_wvw_map, validate, GameState, MAP_TYPE_WVW_BB, MAP_TYPE_WVW_EB,
    MAP_TYPE_WVW_EOTM, MAP_TYPE_WVW_FV, MAP_TYPE_WVW_GB, MAP_TYPE_WVW_LOUNGE,
    MAP_TYPE_WVW_OBSIDIAN_SANCTUM, MAP_TYPE_WVW_RB,
};
pub use profession::Profession;
pub use set::{ConditionSet, ENTRIES_VERSION};
pub use types::{BoolOp, Condition, ConditionEntry, ConditionId, ConditionKind, ConditionOp};
