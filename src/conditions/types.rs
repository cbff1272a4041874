//! core types for the condition system

use std::fmt;

use serde::{Deserialize, Serialize};

use super::eval::GameState;
use super::profession::Profession;
use crate::config::ConfigStore;

/// identifier of a condition, unique within its set
pub type ConditionId = u32;

// persisted operator bits
const OP_AND: i64 = 1;
const OP_OPEN_GROUP: i64 = 2;
const OP_CLOSE_GROUP: i64 = 4;

/// boolean operator joining an entry to the one before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoolOp {
    #[default]
    Or,
    And,
}

impl BoolOp {
    /// parse operator from string (supports all forms)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "or" | "||" | "any" => Some(BoolOp::Or),
            "and" | "&&" | "all" => Some(BoolOp::And),
            _ => None,
        }
    }

    pub fn apply(self, lhs: bool, rhs: bool) -> bool {
        match self {
            BoolOp::Or => lhs || rhs,
            BoolOp::And => lhs && rhs,
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolOp::Or => write!(f, "OR"),
            BoolOp::And => write!(f, "AND"),
        }
    }
}

/// operator preceding an entry, plus the grouping it opens or closes
///
/// `open_group` starts a parenthesized group at this entry; `op` then joins the
/// whole group to what came before. `close_group` ends the innermost open group
/// after this entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConditionOp {
    pub op: BoolOp,
    pub open_group: bool,
    pub close_group: bool,
}

impl ConditionOp {
    pub fn new(op: BoolOp) -> Self {
        Self {
            op,
            open_group: false,
            close_group: false,
        }
    }

    pub fn or() -> Self {
        Self::new(BoolOp::Or)
    }

    pub fn and() -> Self {
        Self::new(BoolOp::And)
    }

    /// open a group at this entry
    pub fn opening(mut self) -> Self {
        self.open_group = true;
        self
    }

    /// close the innermost group after this entry
    pub fn closing(mut self) -> Self {
        self.close_group = true;
        self
    }

    /// bit set used in settings files: AND = 1, open = 2, close = 4
    pub fn to_bits(self) -> i64 {
        let mut bits = 0;
        if self.op == BoolOp::And {
            bits |= OP_AND;
        }
        if self.open_group {
            bits |= OP_OPEN_GROUP;
        }
        if self.close_group {
            bits |= OP_CLOSE_GROUP;
        }
        bits
    }

    /// inverse of [`ConditionOp::to_bits`]; unknown bits are ignored
    pub fn from_bits(bits: i64) -> Self {
        Self {
            op: if bits & OP_AND != 0 {
                BoolOp::And
            } else {
                BoolOp::Or
            },
            open_group: bits & OP_OPEN_GROUP != 0,
            close_group: bits & OP_CLOSE_GROUP != 0,
        }
    }
}

/// the test a condition performs against the game state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionKind {
    /// player is in combat
    InCombat,
    /// current map is a World vs. World map
    InWvW,
    /// player is underwater
    Underwater,
    /// player is playing the given profession
    Profession { profession: Profession },
    /// player is controlling the character with this exact name
    Character { name: String },
}

impl ConditionKind {
    /// stable short name used in settings keys
    pub fn nickname(&self) -> &'static str {
        match self {
            ConditionKind::InCombat => "in_combat",
            ConditionKind::InWvW => "wvw",
            ConditionKind::Underwater => "underwater",
            ConditionKind::Profession { .. } => "profession",
            ConditionKind::Character { .. } => "character",
        }
    }

    /// build a kind with default payload from its nickname
    pub fn from_nickname(nickname: &str) -> Option<Self> {
        match nickname {
            "in_combat" => Some(ConditionKind::InCombat),
            "wvw" => Some(ConditionKind::InWvW),
            "underwater" => Some(ConditionKind::Underwater),
            "profession" => Some(ConditionKind::Profession {
                profession: Profession::None,
            }),
            "character" => Some(ConditionKind::Character {
                name: String::new(),
            }),
            _ => None,
        }
    }

    /// raw test against the game state, without negation
    pub fn test(&self, state: &GameState) -> bool {
        match self {
            ConditionKind::InCombat => state.in_combat,
            ConditionKind::InWvW => state.is_wvw(),
            ConditionKind::Underwater => state.underwater,
            ConditionKind::Profession { profession } => state.profession == *profession,
            ConditionKind::Character { name } => state.character_name == *name,
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionKind::Profession { profession } => write!(f, "profession({})", profession),
            ConditionKind::Character { name } => write!(f, "character({:?})", name),
            other => write!(f, "{}", other.nickname()),
        }
    }
}

/// a single, optionally negated, test with a stable id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    id: ConditionId,
    negate: bool,
    kind: ConditionKind,
}

impl Condition {
    pub fn new(id: ConditionId, kind: ConditionKind) -> Self {
        Self {
            id,
            negate: false,
            kind,
        }
    }

    pub fn id(&self) -> ConditionId {
        self.id
    }

    pub fn kind(&self) -> &ConditionKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut ConditionKind {
        &mut self.kind
    }

    pub fn nickname(&self) -> &'static str {
        self.kind.nickname()
    }

    pub fn negate(&self) -> bool {
        self.negate
    }

    pub fn set_negate(&mut self, negate: bool) -> &mut Self {
        self.negate = negate;
        self
    }

    pub fn with_negate(mut self, negate: bool) -> Self {
        self.negate = negate;
        self
    }

    pub fn test(&self, state: &GameState) -> bool {
        self.kind.test(state)
    }

    /// test result after applying negation
    pub fn passes(&self, state: &GameState) -> bool {
        self.test(state) != self.negate
    }

    /// true when both conditions perform the same test (ignores id and negation)
    pub fn same_test(&self, other: &Condition) -> bool {
        self.kind == other.kind
    }

    fn param_name(&self, param: &str) -> String {
        format!("condition_{}_{}_{}", self.id, self.nickname(), param)
    }

    /// write negation and payload under `category`
    pub fn save(&self, store: &mut dyn ConfigStore, category: &str) {
        store.set_bool(category, &self.param_name("negate"), self.negate);

        match &self.kind {
            ConditionKind::Profession { profession } => {
                store.set_long(category, &self.param_name("id"), profession.id());
            }
            ConditionKind::Character { name } => {
                store.set_value(category, &self.param_name("charname"), name);
            }
            ConditionKind::InCombat | ConditionKind::InWvW | ConditionKind::Underwater => {}
        }
    }

    /// read negation and payload from `category`, falling back to defaults
    pub fn load(&mut self, store: &dyn ConfigStore, category: &str) {
        self.negate = store.get_bool(category, &self.param_name("negate"), false);

        let id_key = self.param_name("id");
        let charname_key = self.param_name("charname");
        match &mut self.kind {
            ConditionKind::Profession { profession } => {
                *profession = Profession::from_id(store.get_long(category, &id_key, 0));
            }
            ConditionKind::Character { name } => {
                *name = store.get_value(category, &charname_key, "");
            }
            ConditionKind::InCombat | ConditionKind::InWvW | ConditionKind::Underwater => {}
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negate {
            write!(f, "not ")?;
        }
        write!(f, "{}", self.kind)
    }
}

/// a condition and the operator joining it to the previous entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionEntry {
    pub(crate) condition: Condition,
    pub(crate) op: ConditionOp,
}

impl ConditionEntry {
    pub fn new(condition: Condition, op: ConditionOp) -> Self {
        Self { condition, op }
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn op(&self) -> ConditionOp {
        self.op
    }
}
