use serde::{Deserialize, Serialize};

/// Counts for various things which count, roughly.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// A count of every decision made, i.e. every successful step.
    pub decisions: usize,

    /// A count of every conflict, i.e. every failed step.
    pub conflicts: usize,

    /// A count of backjumps which retracted at least one level.
    pub backjumps: usize,

    /// The total count of levels retracted by backjumps.
    pub levels_retracted: usize,

    /// A count of clauses learned (and not subsumed).
    pub learned: usize,

    /// A count of learned clauses discarded as subsumed.
    pub subsumed: usize,
}
