//! Databases for holding information relevant to the execution of a plan.
//!
//!   - [The clause store](crate::db::clause)
//!     + A collection of nogoods, each indexed by a [ClauseKey]. \
//!       There are two kinds of clause:
//!       * Rules \
//!         Added when a plan is loaded, one for each literal a step produces on success.
//!       * Learned clauses \
//!         Added by conflict analysis when a step fails.
//!
//!   - [The implication graph](crate::db::implication)
//!     + A stack of decision levels, each of which records a decision and the observed consequences of that decision.
//!
//!   - [The planner state](crate::db::state)
//!     + The assignment, the completed steps, and a stack of checkpoints to restore on a backjump.

pub mod clause;
pub mod implication;
mod keys;
pub use keys::*;
pub mod state;

/// The index of a decision level.
pub type DecisionLevelIndex = u32;
