/*!
Miscelanous items related to [logging](log).

Calls to the log macro are made throughout the library.
These are intended to provide useful information when extending the library and/or diagnosing why a plan stalled.

Note, no log implementation is provided by the library.
The `otter_plan` binary installs [log4rs](https://docs.rs/log4rs) when built with the `log` feature.
*/

/// Targets to be used within a [log]! macro.
pub mod targets {
    /// Logs related to the [clause store](crate::db::clause)
    pub const CLAUSE_STORE: &str = "clause_store";

    /// Logs related to the [implication graph](crate::db::implication)
    pub const IMPLICATION: &str = "implication";

    /// Logs related to [conflict analysis](crate::db::implication::ImplicationGraph::conflict_cause)
    pub const ANALYSIS: &str = "analysis";

    /// Logs related to backjumping
    pub const BACKJUMP: &str = "backjump";

    /// Logs related to [eligibility](crate::procedures::eligibility)
    pub const ELIGIBILITY: &str = "eligibility";

    /// Logs related to reported steps
    pub const STEP: &str = "step";

    /// Logs related to [propagation](crate::propagation)
    pub const PROPAGATION: &str = "propagation";

    /// Logs related to solution space [estimates](crate::propagation::estimator)
    pub const ESTIMATE: &str = "estimate";

    /// Logs related to [sessions](crate::session)
    pub const SESSION: &str = "session";
}
