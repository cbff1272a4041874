//! process exit codes for radial
//!
//! `eval`, `conflicts` and `check` use 2, 6 and 7 as answers rather than
//! failures, so scripts can branch on them like `grep`'s status

/// command completed; for `eval` the rule set passed
pub const SUCCESS: i32 = 0;

/// unexpected failure (I/O outside the settings file, stdin)
pub const ERROR: i32 = 1;

/// `eval`: the rule set does not pass for the given game state
pub const CONDITION_FAILED: i32 = 2;

/// no rule set with that category, or no condition with that id
pub const NOT_FOUND: i32 = 3;

/// unknown profession, bad group range, wrong condition kind or unreadable snapshot
pub const INVALID_ARGS: i32 = 4;

/// settings file can't be read, parsed or written
pub const CONFIG_ERROR: i32 = 5;

/// `conflicts`: at least one pair of rule sets can never be active together
pub const CONFLICT: i32 = 6;

/// `eval`/`check`: a rule set opens or closes groups out of balance
pub const MALFORMED: i32 = 7;
