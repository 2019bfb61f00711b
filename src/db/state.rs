//! The state of an execution.
//!
//! The state holds the current assignment, the steps completed, and a stack of checkpoints.
//! A checkpoint is pushed before each decision, recording the state at the end of the level the decision leaves.
//! So, restoring to some level is a matter of popping checkpoints down to that level, at a cost bounded by the number of levels retracted.

use serde::{Deserialize, Serialize};

use crate::{
    db::DecisionLevelIndex,
    misc::log::targets::{self},
    structures::{
        literal::{Assignment, DecisionLiteral, SubjectId},
        step::StepId,
    },
    types::err::{self},
};

/// The state at the end of a decision level.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    pub level: DecisionLevelIndex,
    pub assigned: Assignment,
    /// The count of steps completed.
    pub completed: usize,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlannerState {
    decision_level: DecisionLevelIndex,
    assigned: Assignment,
    completed_steps: Vec<StepId>,
    checkpoints: Vec<Checkpoint>,
}

impl PlannerState {
    pub fn decision_level(&self) -> DecisionLevelIndex {
        self.decision_level
    }

    pub fn assigned(&self) -> &Assignment {
        &self.assigned
    }

    /// Steps completed, in order of completion.
    pub fn completed_steps(&self) -> &[StepId] {
        &self.completed_steps
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn is_completed(&self, step: &str) -> bool {
        self.completed_steps.iter().any(|id| id == step)
    }

    /// The value of the subject on the current assignment, if assigned.
    pub fn value_of(&self, subject: &SubjectId) -> Option<bool> {
        self.assigned.get(subject).map(|literal| literal.polarity())
    }

    /// Assigns the literal, returning the literal previously assigned to the subject, if any.
    pub fn assign(&mut self, literal: DecisionLiteral) -> Option<DecisionLiteral> {
        self.assigned.insert(literal.subject().clone(), literal)
    }

    pub fn complete(&mut self, step: StepId) {
        self.completed_steps.push(step);
    }

    /// Pushes a checkpoint for the current level, and opens the next level.
    pub fn begin_decision(&mut self) -> DecisionLevelIndex {
        self.checkpoints.push(Checkpoint {
            level: self.decision_level,
            assigned: self.assigned.clone(),
            completed: self.completed_steps.len(),
        });
        self.decision_level += 1;
        self.decision_level
    }

    /// Restores the state at the end of the given level, returning the count of levels retracted.
    pub fn restore(&mut self, level: DecisionLevelIndex) -> Result<u32, err::PlanError> {
        if level > self.decision_level {
            return Err(err::PlanError::InvalidRestore {
                level,
                current: self.decision_level,
            });
        }

        let retracted = self.decision_level - level;
        if retracted == 0 {
            return Ok(0);
        }

        let mut restored = None;
        while self
            .checkpoints
            .last()
            .is_some_and(|checkpoint| checkpoint.level >= level)
        {
            restored = self.checkpoints.pop();
        }

        match restored {
            Some(checkpoint) if checkpoint.level == level => {
                self.assigned = checkpoint.assigned;
                self.completed_steps.truncate(checkpoint.completed);
                self.decision_level = level;
                log::info!(target: targets::BACKJUMP, "Restored level {level}, retracting {retracted} levels");
                Ok(retracted)
            }
            _ => {
                log::error!(target: targets::BACKJUMP, "No checkpoint for level {level}");
                Err(err::PlanError::InvalidRestore {
                    level,
                    current: self.decision_level,
                })
            }
        }
    }
}
