//! condition error types

use thiserror::Error;

use super::types::ConditionId;

/// malformed parenthesis nesting in a condition set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NestingError {
    /// an entry closes a group that was never opened
    #[error("entry {index} closes a group that was never opened")]
    UnmatchedClose { index: usize },
    /// groups still open when the expression ends
    #[error("{count} group(s) left open at the end of the expression")]
    Unclosed { count: usize },
}

/// error returned by condition set edits
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("no condition with id {0}")]
    UnknownCondition(ConditionId),

    #[error("condition {id} is a '{actual}' condition, expected '{expected}'")]
    WrongKind {
        id: ConditionId,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("cannot group conditions: {0}")]
    InvalidGroup(String),

    #[error("condition {0} does not open or close a group")]
    NotGrouped(ConditionId),

    #[error(transparent)]
    Nesting(#[from] NestingError),
}
