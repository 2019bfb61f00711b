//! Loading a plan into a context.
//!
//! On load:
//! - Facts of the plan are assigned, and recorded as decisions at level zero.
//! - For each literal a step produces on success, a rule is stored.
//!   The rule for a step `S` producing `p` is the clause {step:S:success, -p}, and so the success of `S` implies `p`.
//!
//! After load the context is [Ready](ExecutionState::Ready), unless the plan is already met or cannot make progress.

use crate::{
    context::{ExecutionState, PlanContext},
    db::clause::ClauseSource,
    misc::log::targets::{self},
    structures::{clause::Clause, step::Plan},
    types::err::{self, ErrorKind},
};

impl PlanContext {
    /// Loads a plan into the context.
    ///
    /// Returns the state of the context after the load.
    pub fn load(&mut self, plan: Plan) -> Result<ExecutionState, ErrorKind> {
        if self.plan.is_some() {
            return Err(err::PlanError::AlreadyLoaded.into());
        }

        for fact in plan.facts() {
            if let Some(previous) = self.planner.value_of(fact.subject()) {
                if previous == fact.polarity() {
                    continue;
                }
                log::error!(target: targets::STEP, "Contradictory fact: {fact}");
                return Err(err::PlanError::ContradictoryEffect(fact.subject().clone()).into());
            }
            self.planner.assign(fact.clone());
            self.implication_graph.record(fact.clone(), 0, None, vec![])?;
        }

        for step in plan.steps() {
            let mut rules = Vec::with_capacity(step.produces_on_success().len());
            for produced in step.produces_on_success() {
                let rule = Clause::new([step.success_literal(), produced.negate()]);
                let key = self
                    .clause_store
                    .add(rule, ClauseSource::Rule(step.id().to_string()))?
                    .key();
                rules.push((produced.clone(), key));
            }
            self.rules.insert(step.id().to_string(), rules);
        }

        log::info!(target: targets::STEP, "Loaded a plan of {} steps with {} rules", plan.steps().len(), self.clause_store.rule_count());

        self.plan = Some(plan);
        self.state = ExecutionState::Ready;
        if self.goals_met() {
            self.state = ExecutionState::Completed;
        } else if self.next_eligible().is_empty() {
            self.state = ExecutionState::Exhausted;
        }

        Ok(self.state)
    }
}
