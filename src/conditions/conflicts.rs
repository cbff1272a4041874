//! conflict detection between condition sets
//!
//! a heuristic, not a satisfiability check: it only looks at the conditions a
//! set *requires* (those that must pass for the whole expression to pass) and
//! reports pairs of required conditions that can never pass together.

use super::eval::fold_entries;
use super::types::{BoolOp, Condition, ConditionEntry, ConditionKind};

/// conditions that must pass for the sequence to pass
///
/// AND keeps the requirements of both sides, OR keeps only those shared by both.
/// Malformed sequences require nothing.
pub fn required_conditions(entries: &[ConditionEntry]) -> Vec<&Condition> {
    let folded = fold_entries(
        entries,
        |c| vec![c],
        |op, lhs: Vec<&Condition>, rhs: Vec<&Condition>| match op {
            BoolOp::And => {
                let mut merged = lhs;
                for c in rhs {
                    if !merged.iter().any(|m| same_literal(m, c)) {
                        merged.push(c);
                    }
                }
                merged
            }
            BoolOp::Or => lhs
                .into_iter()
                .filter(|l| rhs.iter().any(|r| same_literal(l, r)))
                .collect(),
        },
    );

    match folded {
        Ok(required) => required.unwrap_or_default(),
        Err(e) => {
            log::debug!("skipping conflict analysis of malformed set: {}", e);
            Vec::new()
        }
    }
}

fn same_literal(a: &Condition, b: &Condition) -> bool {
    a.negate() == b.negate() && a.same_test(b)
}

/// true when the two conditions can never pass at the same time
pub fn mutually_exclusive(a: &Condition, b: &Condition) -> bool {
    if a.same_test(b) {
        return a.negate() != b.negate();
    }

    // a negated test only rules out one value, which never excludes a different test
    if a.negate() || b.negate() {
        return false;
    }

    match (a.kind(), b.kind()) {
        (
            ConditionKind::Profession { profession: x },
            ConditionKind::Profession { profession: y },
        ) => x != y,
        (ConditionKind::Character { name: x }, ConditionKind::Character { name: y }) => x != y,
        _ => false,
    }
}

/// pairs of required conditions, one from each side, that exclude each other
pub fn conflicting_pairs<'a>(
    left: &'a [ConditionEntry],
    right: &'a [ConditionEntry],
) -> Vec<(&'a Condition, &'a Condition)> {
    let left = required_conditions(left);
    let right = required_conditions(right);

    let mut pairs = Vec::new();
    for l in &left {
        for r in &right {
            if mutually_exclusive(l, r) {
                pairs.push((*l, *r));
            }
        }
    }
    pairs
}
