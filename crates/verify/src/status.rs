//! Verdict statuses and bottom-up aggregation over a comparison tree.

use std::fmt;

use serde::Serialize;

use crate::result::ComparisonNode;

/// Per-field comparison verdict. Aggregation severity is
/// `Failed > ConditionallyFailed > ConditionallyPassed > Passed`, with `Na`
/// when nothing was counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    Passed,
    Failed,
    ConditionallyPassed,
    ConditionallyFailed,
    Na,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Passed => "PASSED",
            Status::Failed => "FAILED",
            Status::ConditionallyPassed => "CONDITIONALLY_PASSED",
            Status::ConditionallyFailed => "CONDITIONALLY_FAILED",
            Status::Na => "NA",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Count the nodes in the subtree rooted at `node` (the node itself plus
/// all descendants, any depth) carrying exactly `status`.
pub fn count_by_status(node: &ComparisonNode, status: Status) -> usize {
    let own = usize::from(node.status == Some(status));
    own + node
        .children
        .iter()
        .map(|child| count_by_status(child, status))
        .sum::<usize>()
}

/// Verdict for a set of status counts.
///
/// Conditionally-failed currently folds into `Failed`; the richer status
/// is kept distinct at the leaf level only.
pub fn status_for(
    failed: usize,
    cond_failed: usize,
    cond_passed: usize,
    passed: usize,
    default: Status,
) -> Status {
    if failed > 0 {
        Status::Failed
    } else if cond_failed > 0 {
        Status::Failed
    } else if cond_passed > 0 {
        Status::ConditionallyPassed
    } else if passed > 0 {
        Status::Passed
    } else {
        default
    }
}

/// Aggregate verdict for the subtree rooted at `node`.
pub fn aggregate(node: &ComparisonNode) -> Status {
    status_for(
        count_by_status(node, Status::Failed),
        count_by_status(node, Status::ConditionallyFailed),
        count_by_status(node, Status::ConditionallyPassed),
        count_by_status(node, Status::Passed),
        Status::Na,
    )
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
