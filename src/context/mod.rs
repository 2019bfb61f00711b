/*!
The plan context, within which a plan is executed.

A [PlanContext] owns a [Plan], together with the state of execution, the clause store, and the implication graph of the execution.

The context does not execute steps.
Instead, the caller asks which steps are [eligible](PlanContext::next_eligible), executes some step, and [reports](PlanContext::report_step) the outcome back to the context.
On failure, the context learns a clause which rules out the attempt under the decisions which led to it, and backjumps to the earliest level at which the clause asserts the failure.

# Example
```rust
# use otter_plan::config::Config;
# use otter_plan::context::{ExecutionState, PlanContext};
# use otter_plan::structures::step::{Plan, StepSpec};
let plan = Plan::new(
    vec![
        StepSpec::new("A"),
        StepSpec::new("B").requires("A"),
        StepSpec::new("C").requires("A"),
    ],
    ["B", "C"],
)
.unwrap();

let mut the_context = PlanContext::from_plan(plan, Config::default()).unwrap();
assert_eq!(the_context.next_eligible(), vec!["A"]);

let result = the_context.report_step("A", true, "").unwrap();
assert_eq!(result.next_steps, vec!["B", "C"]);

let result = the_context.report_step("B", false, "timeout").unwrap();
assert_eq!(result.backjump_level, Some(1));
assert_eq!(result.next_steps, vec!["C"]);
assert_eq!(result.state, ExecutionState::Stepping);
```
*/

pub mod callbacks;
mod counters;
pub use counters::Counters;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    db::{
        clause::{ClauseOk, ClauseSource, ClauseStore},
        implication::ImplicationGraph,
        state::PlannerState,
        ClauseKey, DecisionLevelIndex,
    },
    reports::FailureRecord,
    structures::{
        clause::Clause,
        literal::{Assignment, DecisionLiteral, SubjectId},
        step::{Plan, StepId},
    },
    types::err::ErrorKind,
};

/// The state of execution of a plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionState {
    /// No plan has been loaded.
    Idle,

    /// A plan has been loaded, and no step has been reported.
    Ready,

    /// Some step has been reported, and some step is eligible.
    Stepping,

    /// A step has failed, and the failure is being analysed.
    Conflict,

    /// A clause has been learned from a failure, and the context has backjumped.
    Backjumped,

    /// No step is eligible, and some goal is unmet.
    Exhausted,

    /// Every goal is met.
    Completed,
}

impl ExecutionState {
    /// True if no further step may be reported.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exhausted | Self::Completed)
    }
}

impl std::fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Ready => write!(f, "Ready"),
            Self::Stepping => write!(f, "Stepping"),
            Self::Conflict => write!(f, "Conflict"),
            Self::Backjumped => write!(f, "Backjumped"),
            Self::Exhausted => write!(f, "Exhausted"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

/// A context within which a plan is executed.
#[derive(Serialize, Deserialize)]
pub struct PlanContext {
    /// The configuration of the context.
    #[serde(skip)]
    pub config: Config,

    pub(crate) plan: Option<Plan>,

    pub(crate) state: ExecutionState,

    pub(crate) planner: PlannerState,

    pub(crate) clause_store: ClauseStore,

    pub(crate) implication_graph: ImplicationGraph,

    /// For each step, the literals produced on success of the step, paired with the rule which implies the literal.
    pub(crate) rules: HashMap<StepId, Vec<(DecisionLiteral, ClauseKey)>>,

    pub(crate) failures: Vec<FailureRecord>,

    pub(crate) counters: Counters,

    #[serde(skip)]
    pub(crate) callback_step: Option<Box<callbacks::CallbackOnStep>>,
}

impl Default for PlanContext {
    fn default() -> Self {
        PlanContext::from_config(Config::default())
    }
}

impl PlanContext {
    /// A context without a plan.
    pub fn from_config(config: Config) -> Self {
        PlanContext {
            clause_store: ClauseStore::new(&config),
            config,
            plan: None,
            state: ExecutionState::Idle,
            planner: PlannerState::default(),
            implication_graph: ImplicationGraph::default(),
            rules: HashMap::default(),
            failures: Vec::default(),
            counters: Counters::default(),
            callback_step: None,
        }
    }

    /// A context with the plan loaded.
    pub fn from_plan(plan: Plan, config: Config) -> Result<Self, ErrorKind> {
        let mut the_context = PlanContext::from_config(config);
        the_context.load(plan)?;
        Ok(the_context)
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub fn decision_level(&self) -> DecisionLevelIndex {
        self.planner.decision_level()
    }

    /// Steps completed (and not retracted), in order of completion.
    pub fn completed_steps(&self) -> &[StepId] {
        self.planner.completed_steps()
    }

    pub fn assigned(&self) -> &Assignment {
        self.planner.assigned()
    }

    pub fn value_of(&self, subject: &SubjectId) -> Option<bool> {
        self.planner.value_of(subject)
    }

    /// Every failure reported, in order of report.
    pub fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn clause_store(&self) -> &ClauseStore {
        &self.clause_store
    }

    pub fn implication_graph(&self) -> &ImplicationGraph {
        &self.implication_graph
    }

    /// Adds a clause from outside of the execution, e.g. one learned by some other execution of the same plan.
    ///
    /// Clauses already triggered by the current assignment do not retract any part of the assignment.
    pub fn add_nogood(&mut self, clause: Clause) -> Result<ClauseOk, ErrorKind> {
        Ok(self.clause_store.add(clause, ClauseSource::Imported)?)
    }

    /// Serializes the full execution: the plan, the state, the clause store, the implication graph, and the failure history.
    pub fn snapshot_json(&self) -> Result<String, ErrorKind> {
        Ok(serde_json::to_string(self)?)
    }

    /// Resumes an execution from a snapshot.
    ///
    /// As configuration is not part of a snapshot, a configuration is given alongside the snapshot.
    pub fn from_snapshot_json(json: &str, config: Config) -> Result<Self, ErrorKind> {
        let mut the_context: PlanContext = serde_json::from_str(json)?;
        the_context.clause_store.set_config(&config);
        the_context.clause_store.rebuild_index();
        the_context.config = config;
        Ok(the_context)
    }
}
