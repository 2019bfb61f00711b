//! Reporting the outcome of a step.
//!
//! # Success
//!
//! A checkpoint is pushed, and the success of the step is recorded as a decision at a fresh level.
//! The literals the step produces are then recorded as implications at the same level, each with the rule of the step as antecedent.
//!
//! # Failure
//!
//! The failure is recorded as a conflict whose premises are the preconditions of the step, and the conflict is analysed to give a clause and a backjump level.
//! The clause is stored (unless subsumed), the context backjumps, and the negation of the success of the step is recorded at the backjump level as an implication of the clause.
//!
//! A learned clause is only subsumed by a clause already triggered by the assignment, e.g. a nogood added after some of its literals were assigned.
//! As the subsuming clause does not contain the attempt, it is not the antecedent of the negation.
//! Instead, the negation is recorded without an antecedent, with the other literals of the learned clause as premises.
//!
//! So, under the decisions which led to the failure, the step will not be eligible again.
//!
//! # Errors
//!
//! Reporting a step which is unknown or not eligible, or reporting any step after a terminal state, is an error and leaves the context unchanged.

use crate::{
    context::{ExecutionState, PlanContext},
    db::{
        clause::{ClauseOk, ClauseSource},
        implication::Conflict,
        NodeKey,
    },
    misc::log::targets::{self},
    reports::{FailureRecord, StepResult},
    structures::step::{Step, StepId},
    types::err::{self, ErrorKind},
};

impl PlanContext {
    /// Reports the outcome of an eligible step.
    pub fn report_step(
        &mut self,
        step_id: &str,
        success: bool,
        reason: &str,
    ) -> Result<StepResult, ErrorKind> {
        let Some(plan) = &self.plan else {
            return Err(err::PlanError::NotLoaded.into());
        };
        if self.state.is_terminal() {
            return Err(err::PlanError::Terminal(self.state).into());
        }
        let Some(step) = plan.step(step_id).cloned() else {
            return Err(err::PlanError::UnknownStep(step_id.to_string()).into());
        };
        if !self.is_eligible(&step) {
            log::error!(target: targets::STEP, "Report of ineligible step {step_id}");
            return Err(err::PlanError::NotEligible(step_id.to_string()).into());
        }

        let result = match success {
            true => self.apply_success(&step)?,
            false => self.apply_failure(&step, reason)?,
        };

        self.make_callback_step(&step_id.to_string(), &result);
        Ok(result)
    }

    fn apply_success(&mut self, step: &Step) -> Result<StepResult, ErrorKind> {
        let effects = self.rules.get(step.id()).cloned().unwrap_or_default();
        for (literal, _) in &effects {
            if self.planner.value_of(literal.subject()) == Some(!literal.polarity()) {
                return Err(err::PlanError::ContradictoryEffect(literal.subject().clone()).into());
            }
        }

        let level = self.planner.begin_decision();
        self.counters.decisions += 1;

        let success = step.success_literal();
        self.planner.assign(success.clone());
        let decision = self.implication_graph.record(success, level, None, vec![])?;

        for (literal, rule) in effects {
            if self.planner.value_of(literal.subject()).is_some() {
                log::trace!(target: targets::STEP, "{literal} already holds");
                continue;
            }
            self.planner.assign(literal.clone());
            self.implication_graph
                .record(literal, level, Some(rule), vec![decision])?;
        }

        self.planner.complete(step.id().to_string());
        log::info!(target: targets::STEP, "{} succeeded @ {level}", step.id());

        self.state = ExecutionState::Stepping;
        let next_steps = self.settle();

        Ok(StepResult {
            next_steps,
            learned_clause_id: None,
            backjump_level: None,
            state: self.state,
        })
    }

    fn apply_failure(&mut self, step: &Step, reason: &str) -> Result<StepResult, ErrorKind> {
        let level = self.planner.decision_level();
        self.state = ExecutionState::Conflict;
        self.counters.conflicts += 1;
        log::info!(target: targets::STEP, "{} failed @ {level}: {reason}", step.id());

        let attempt = step.success_literal();
        let premises = step
            .preconditions()
            .iter()
            .filter_map(|subject| self.implication_graph.key_of(subject))
            .collect();
        self.implication_graph.record_conflict(Conflict {
            attempt: attempt.clone(),
            level,
            premises,
            reason: reason.to_string(),
        })?;

        let (clause, backjump_level) = self
            .implication_graph
            .conflict_cause(attempt.subject(), self.config.stopping_criteria.value)?;

        let (key, antecedent) = match self
            .clause_store
            .add(clause.clone(), ClauseSource::Failure(step.id().to_string()))?
        {
            ClauseOk::Added(key) => {
                self.counters.learned += 1;
                (key, Some(key))
            }
            ClauseOk::Subsumed(key) => {
                self.counters.subsumed += 1;
                let antecedent = match self.clause_store.get(key) {
                    Ok(stored) if stored.clause().contains(&attempt) => Some(key),
                    _ => None,
                };
                (key, antecedent)
            }
        };

        self.backjump(backjump_level)?;

        let premises: Vec<NodeKey> = clause
            .literals()
            .filter(|literal| literal.subject() != attempt.subject())
            .filter_map(|literal| self.implication_graph.key_of(literal.subject()))
            .collect();
        let negation = attempt.negate();
        self.planner.assign(negation.clone());
        self.implication_graph
            .record(negation, backjump_level, antecedent, premises)?;

        self.failures.push(FailureRecord {
            step: step.id().to_string(),
            reason: reason.to_string(),
            level,
            learned_clause: clause,
            learned_clause_id: key,
            backjump_level,
        });

        self.state = ExecutionState::Backjumped;
        let next_steps = self.settle();

        Ok(StepResult {
            next_steps,
            learned_clause_id: Some(key),
            backjump_level: Some(backjump_level),
            state: self.state,
        })
    }

    /// Moves to a terminal state, if appropriate, and otherwise to stepping, returning the eligible steps.
    fn settle(&mut self) -> Vec<StepId> {
        let next_steps = self.next_eligible();
        self.state = if self.goals_met() {
            ExecutionState::Completed
        } else if next_steps.is_empty() {
            log::info!(target: targets::STEP, "Exhausted at level {}", self.planner.decision_level());
            ExecutionState::Exhausted
        } else {
            ExecutionState::Stepping
        };

        match self.state.is_terminal() {
            true => Vec::default(),
            false => next_steps,
        }
    }
}
