//! Error types used in the library.
//!
//! - Most of these are protocol violations --- e.g. reporting a step which is not currently eligible --- and indicate a bug in the caller or in the deriver of a plan.
//!   See [ErrorKind::is_logic_error].
//! - Exhaustion of a plan is *not* an error, and is instead reported as an [ExecutionState](crate::context::ExecutionState).
//! - Likewise, a violated constraint is information for the caller, and is reported as part of a [PropagationEvent](crate::reports::PropagationEvent).
//!
//! Names of the error enums --- for the most part --- overlap with corresponding structs.
//  As such, throughout the library err::{self} is often used to prefix use of the types with `err::`.

use crate::{
    context::ExecutionState,
    db::DecisionLevelIndex,
    structures::{hole::HoleId, literal::SubjectId, step::StepId},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    ClauseStore(ClauseStoreError),
    Config(ConfigError),
    Implication(ImplicationError),
    Plan(PlanError),
    Propagation(PropagationError),
    Session(SessionError),

    /// A snapshot could not be written or read, with the message from the serializer.
    Snapshot(String),
}

impl ErrorKind {
    /// True if the error follows from a violation of protocol by the caller, and false otherwise.
    ///
    /// Logic errors are never recovered from within the library.
    pub fn is_logic_error(&self) -> bool {
        match self {
            Self::ClauseStore(_)
            | Self::Implication(_)
            | Self::Plan(_)
            | Self::Propagation(_) => true,

            Self::Session(e) => !matches!(e, SessionError::Poisoned),

            Self::Config(_) | Self::Snapshot(_) => false,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClauseStore(e) => write!(f, "clause store: {e:?}"),
            Self::Config(e) => write!(f, "config: {e:?}"),
            Self::Implication(e) => write!(f, "implication graph: {e:?}"),
            Self::Plan(e) => write!(f, "plan: {e:?}"),
            Self::Propagation(e) => write!(f, "propagation: {e:?}"),
            Self::Session(e) => write!(f, "session: {e:?}"),
            Self::Snapshot(message) => write!(f, "snapshot: {message}"),
        }
    }
}

impl std::error::Error for ErrorKind {}

/// Errors in the clause store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClauseStoreError {
    /// Some attempt was made to store an empty clause.
    EmptyClause,

    /// Some attempt was made to store a clause containing a literal and its negation.
    /// Such a clause can never be violated, and so carries no information.
    Tautology,

    /// A key did not lead to a clause.
    Missing,
}

impl From<ClauseStoreError> for ErrorKind {
    fn from(e: ClauseStoreError) -> Self {
        ErrorKind::ClauseStore(e)
    }
}

/// Errors when configuring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The value given for the named option is outside of the bounds of the option.
    OutOfBounds(&'static str),

    /// Some string could not be read as a value of the named option.
    Unparsable(&'static str, String),
}

impl From<ConfigError> for ErrorKind {
    fn from(e: ConfigError) -> Self {
        ErrorKind::Config(e)
    }
}

/// Errors in the implication graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImplicationError {
    /// The subject already has a node at some live level.
    AlreadyAssigned(SubjectId),

    /// A record was made more than one level above the top level.
    LevelSkipped {
        level: DecisionLevelIndex,
        top: DecisionLevelIndex,
    },

    /// A premise of a record is not (or no longer) part of the graph.
    MissingPremise,

    /// Conflict analysis was requested for a subject without a recorded conflict.
    NoConflict(SubjectId),

    /// A conflict was recorded while another conflict was awaiting analysis.
    ConflictPending,
}

impl From<ImplicationError> for ErrorKind {
    fn from(e: ImplicationError) -> Self {
        ErrorKind::Implication(e)
    }
}

/// Errors when loading or executing a plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlanError {
    /// A step was given without an id.
    EmptyStepId,

    /// Two steps share an id.
    DuplicateStep(StepId),

    /// A plan was loaded into a context which already holds a plan.
    AlreadyLoaded,

    /// A step was reported before any plan was loaded.
    NotLoaded,

    /// No step of the plan has the id.
    UnknownStep(StepId),

    /// The step is part of the plan, but is not currently eligible.
    NotEligible(StepId),

    /// A step was reported after execution reached a terminal state.
    Terminal(ExecutionState),

    /// A restore was requested to a level above the current decision level.
    InvalidRestore {
        level: DecisionLevelIndex,
        current: DecisionLevelIndex,
    },

    /// A successful step produced a literal whose negation is already assigned.
    ContradictoryEffect(SubjectId),
}

impl From<PlanError> for ErrorKind {
    fn from(e: PlanError) -> Self {
        ErrorKind::Plan(e)
    }
}

/// Errors when refining holes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropagationError {
    /// A hole with the id is already registered.
    DuplicateHole(HoleId),

    /// No hole with the id is registered.
    UnknownHole(HoleId),

    /// The hole has already been resolved.
    AlreadyResolved(HoleId),

    /// A hole was declared to be related to itself.
    SelfRelation(HoleId),
}

impl From<PropagationError> for ErrorKind {
    fn from(e: PropagationError) -> Self {
        ErrorKind::Propagation(e)
    }
}

/// Errors from the session registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// The plan handle is stale, or was never issued.
    UnknownPlan,

    /// The refinement session handle is stale, or was never issued.
    UnknownSession,

    /// A lock was poisoned by a panic while held.
    Poisoned,
}

impl From<SessionError> for ErrorKind {
    fn from(e: SessionError) -> Self {
        ErrorKind::Session(e)
    }
}

impl From<serde_json::Error> for ErrorKind {
    fn from(e: serde_json::Error) -> Self {
        ErrorKind::Snapshot(e.to_string())
    }
}
