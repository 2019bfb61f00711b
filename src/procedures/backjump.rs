//! Recovery from a conflict.
//!
//! A backjump is a 'jump' from some (higher) decision level to some previous (lower) decision level.
//!
//! A backjump is made from level *l* to level *l - i* when a step fails at level *l* and analysis produced a clause which rules out the step at level *l - i*.
//! All decisions, and all consequences of those decisions, above level *l - i* are undone, both in the implication graph and in the planner state.
//!
//! As the planner state holds a checkpoint for each level, the cost of a backjump is bounded by the number of levels retracted.
//!
//! For documentation of the backjump level, see [conflict_cause](crate::db::implication::ImplicationGraph::conflict_cause).

use crate::{
    context::PlanContext,
    db::DecisionLevelIndex,
    misc::log::targets::{self},
    types::err::ErrorKind,
};

impl PlanContext {
    /// Backjumps to the given target level, returning the count of levels retracted.
    pub fn backjump(&mut self, target: DecisionLevelIndex) -> Result<u32, ErrorKind> {
        let from = self.planner.decision_level();
        let retracted = self.planner.restore(target)?;
        self.implication_graph.truncate(target);

        if retracted > 0 {
            self.counters.backjumps += 1;
            self.counters.levels_retracted += retracted as usize;
        }
        log::info!(target: targets::BACKJUMP, "Backjump from {from} to {target}");

        Ok(retracted)
    }
}
