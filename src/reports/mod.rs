/*!
Reports from contexts.

Each report derives [Serialize](serde::Serialize), with stable field names, so that a caller may pass reports on to some event stream.
The library itself performs no transport.
*/

use serde::{Deserialize, Serialize};

use crate::{
    context::ExecutionState,
    db::{ClauseKey, DecisionLevelIndex},
    structures::{
        clause::Clause,
        constraint::{Constraint, ConstraintStatus},
        hole::{HoleId, SolutionSpace},
        step::StepId,
    },
};

/// The result of reporting the outcome of a step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    /// The steps eligible after the report, in plan order.
    pub next_steps: Vec<StepId>,

    /// The key to the clause learned from a failure, if the step failed.
    ///
    /// If the learned clause was subsumed, this is the key to the subsuming clause.
    pub learned_clause_id: Option<ClauseKey>,

    /// The level backjumped to after a failure, if the step failed.
    pub backjump_level: Option<DecisionLevelIndex>,

    /// One of [Stepping](ExecutionState::Stepping), [Exhausted](ExecutionState::Exhausted), or [Completed](ExecutionState::Completed).
    pub state: ExecutionState,
}

/// A record of a failed step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub step: StepId,
    pub reason: String,
    /// The decision level at the time of failure.
    pub level: DecisionLevelIndex,
    pub learned_clause: Clause,
    pub learned_clause_id: ClauseKey,
    pub backjump_level: DecisionLevelIndex,
}

/// A record of constraints added to one hole as a consequence of resolving another.
///
/// When the source and target are the same hole, the event records the resolution of the hole itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationEvent {
    pub sequence: u64,
    pub source_hole: HoleId,
    pub target_hole: HoleId,
    pub added_constraints: Vec<Constraint>,
    pub violations: Vec<Constraint>,
    pub space_before: SolutionSpace,
    pub space_after: SolutionSpace,
    pub fully_constrained: bool,
    pub enumerable: bool,
    pub timestamp_ms: u64,
}

/// A count of constraints by status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub satisfied: usize,
    pub violated: usize,
    pub unknown: usize,
}

impl<'c> FromIterator<&'c Constraint> for StatusCounts {
    fn from_iter<I: IntoIterator<Item = &'c Constraint>>(iter: I) -> Self {
        let mut counts = StatusCounts::default();
        for constraint in iter {
            match constraint.status() {
                ConstraintStatus::Satisfied => counts.satisfied += 1,
                ConstraintStatus::Violated => counts.violated += 1,
                ConstraintStatus::Unknown => counts.unknown += 1,
            }
        }
        counts
    }
}

/// The solution space of a hole, with a summary of its constraints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionSpaceReport {
    pub hole: HoleId,
    pub estimate: SolutionSpace,
    pub status_counts: StatusCounts,
    pub resolved: bool,
    pub fully_constrained: bool,
    pub enumerable: bool,
}
