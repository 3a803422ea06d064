//! Pass/fail classification of a comparison run.

use crate::compare::ItemCounts;

const DESCRIPTION_PASSED: &str = "Regression testing passed";
const DESCRIPTION_FAILED: &str = "Regression testing failed";

/// Binary outcome of a comparison run, as reported to the hosting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeState {
    Success,
    Failure,
}

impl OutcomeState {
    /// Wire name used by commit status APIs.
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeState::Success => "success",
            OutcomeState::Failure => "failure",
        }
    }
}

/// A classified run: the state plus its fixed human-readable description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonOutcome {
    pub state: OutcomeState,
    pub description: &'static str,
}

/// Derive the outcome from item counts.
///
/// Failed, new, and deleted items all count as regressions worth flagging;
/// passed items never influence the state. An empty run passes.
pub fn classify(counts: &ItemCounts) -> ComparisonOutcome {
    if counts.failed + counts.new + counts.deleted > 0 {
        ComparisonOutcome {
            state: OutcomeState::Failure,
            description: DESCRIPTION_FAILED,
        }
    } else {
        ComparisonOutcome {
            state: OutcomeState::Success,
            description: DESCRIPTION_PASSED,
        }
    }
}

// ── Tests ──
