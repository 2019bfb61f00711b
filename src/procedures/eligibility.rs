//! Which steps may be attempted.
//!
//! A step is eligible when:
//! - The success of the step is unassigned.
//!   So, the step has neither completed nor failed under the current assignment.
//! - Each precondition of the step is assigned positively.
//! - No stored clause is triggered by the current assignment extended with the success of the step, together with any unassigned literal the step produces.
//!
//! Steps are listed in the order given by the plan.
//!
//! # Example
//!
//! ```rust
//! # use otter_plan::context::PlanContext;
//! # use otter_plan::config::Config;
//! # use otter_plan::structures::step::{Plan, StepSpec};
//! # use otter_plan::structures::literal::DecisionLiteral;
//! let plan = Plan::new(
//!     vec![
//!         StepSpec::new("fetch").produces(DecisionLiteral::positive("sources")),
//!         StepSpec::new("build").requires("sources"),
//!     ],
//!     ["build"],
//! )
//! .unwrap();
//!
//! let mut the_context = PlanContext::from_plan(plan, Config::default()).unwrap();
//! assert_eq!(the_context.next_eligible(), vec!["fetch"]);
//!
//! the_context.report_step("fetch", true, "").unwrap();
//! assert_eq!(the_context.next_eligible(), vec!["build"]);
//! ```

use crate::{
    context::PlanContext,
    misc::log::targets::{self},
    structures::step::{Step, StepId},
};

impl PlanContext {
    /// The ids of eligible steps, in plan order.
    ///
    /// Empty if no plan is loaded, or if execution has reached a terminal state.
    pub fn next_eligible(&self) -> Vec<StepId> {
        if self.state.is_terminal() {
            return Vec::default();
        }
        let Some(plan) = &self.plan else {
            return Vec::default();
        };

        plan.steps()
            .iter()
            .filter(|step| self.is_eligible(step))
            .map(|step| step.id().to_string())
            .collect()
    }

    /// Whether the step is eligible, without regard to the state of execution.
    pub fn is_eligible(&self, step: &Step) -> bool {
        if self.planner.value_of(&step.success_subject()).is_some() {
            return false;
        }

        if let Some(missing) = step
            .preconditions()
            .iter()
            .find(|subject| self.planner.value_of(subject) != Some(true))
        {
            log::trace!(target: targets::ELIGIBILITY, "{} awaits {missing}", step.id());
            return false;
        }

        let mut extension = vec![step.success_literal()];
        extension.extend(
            step.produces_on_success()
                .iter()
                .filter(|literal| self.planner.value_of(literal.subject()).is_none())
                .cloned(),
        );

        match self
            .clause_store
            .check_with_all(self.planner.assigned(), &extension)
        {
            Some(key) => {
                log::trace!(target: targets::ELIGIBILITY, "{} ruled out by {key}", step.id());
                false
            }
            None => true,
        }
    }

    /// True if every goal is assigned positively.
    pub fn goals_met(&self) -> bool {
        match &self.plan {
            Some(plan) => plan
                .goals()
                .iter()
                .all(|goal| self.planner.value_of(goal) == Some(true)),
            None => false,
        }
    }
}
