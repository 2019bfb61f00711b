//! A library for executing reviewable plans whose steps may fail, and for refining the placeholders of such plans.
//!
//! otter_plan drives a plan of steps with techniques from conflict-driven clause-learning satisfiability solving.
//! When a step fails, the failure is explained in terms of the decisions which led to it, the explanation is learned as a clause, and execution jumps back to the earliest point at which the explanation applies, rather than restarting or undoing only the most recent step.
//!
//! Alongside plan execution, otter_plan narrows the solution spaces of unresolved placeholders ("holes") as they are resolved, propagating constraints along relations between holes given by the deriver of the plan.
//!
//! # Orientation
//!
//! The library is designed around two contexts:
//! - A [plan context](crate::context::PlanContext), which holds a plan together with the state of its execution.
//!   The caller asks which steps are [eligible](crate::procedures::eligibility), runs some step, and [reports](crate::procedures::report) the outcome.
//! - A [refinement context](crate::propagation::RefinementContext), which holds holes, their constraints, and the relations between holes.
//!
//! Both contexts are [serde] serializable, and may be resumed from a snapshot.
//!
//! Internally, the execution of a plan is viewed in terms of a handful of [databases](crate::db):
//! - Rules and learned clauses are stored in a [clause store](crate::db::clause).
//! - Decisions and their consequences are recorded, by level, in an [implication graph](crate::db::implication).
//! - The assignment, the completed steps, and a checkpoint for each level are held in the [planner state](crate::db::state).
//!
//! For use from many threads, [sessions](crate::session) hold contexts behind locks, addressed by handle.
//!
//! # Examples
//!
//! + A failure which does not block an independent branch of the plan.
//!
//! ```rust
//! # use otter_plan::config::Config;
//! # use otter_plan::context::{ExecutionState, PlanContext};
//! # use otter_plan::structures::step::{Plan, StepSpec};
//! # use otter_plan::structures::literal::{DecisionLiteral, SubjectId};
//! let plan = Plan::new(
//!     vec![
//!         StepSpec::new("checkout"),
//!         StepSpec::new("lint").requires("checkout"),
//!         StepSpec::new("test").requires("checkout"),
//!         StepSpec::new("release").requires("lint").requires("test"),
//!     ],
//!     ["test"],
//! )
//! .unwrap();
//!
//! let mut the_context = PlanContext::from_plan(plan, Config::default()).unwrap();
//! the_context.report_step("checkout", true, "").unwrap();
//!
//! let result = the_context.report_step("lint", false, "style violations").unwrap();
//! assert_eq!(result.next_steps, vec!["test"]);
//!
//! let failure = &the_context.failures()[0];
//! assert!(failure.learned_clause.contains(&DecisionLiteral::positive(SubjectId::step_success("checkout"))));
//!
//! let result = the_context.report_step("test", true, "").unwrap();
//! assert_eq!(result.state, ExecutionState::Completed);
//! ```
//!
//! + A resolution which narrows a related hole.
//!
//! ```rust
//! # use otter_plan::propagation::RefinementContext;
//! # use otter_plan::structures::constraint::{Resolution, Value};
//! # use otter_plan::structures::hole::{HoleSpec, Relation, SolutionSpace};
//! let mut the_context = RefinementContext::default();
//! the_context.register_hole(HoleSpec::new("start", "u8")).unwrap();
//! the_context
//!     .register_hole(HoleSpec::new("next", "u8").relate("start", Relation::Adjacent))
//!     .unwrap();
//!
//! the_context.resolve("start", Resolution::value(Value::Int(7))).unwrap();
//!
//! let report = the_context.solution_space("next").unwrap();
//! assert_eq!(report.estimate, SolutionSpace::Bounded(2));
//! assert!(report.enumerable);
//! ```
//!
//! # Logs
//!
//! To help diagnose issues calls to [log!](log) are made throughout, and a variety of targets are defined in order to help narrow output to relevant parts of the library.
//!
//! The targets are listed in [misc::log].
//!
//! For example, logs related to [the clause store](crate::db::clause) can be filtered with the target `clause_store`, and logs of violations found during propagation with `propagation=warn`.

pub mod procedures;

pub mod config;
pub mod context;
pub mod structures;
pub mod types;

pub mod db;

pub mod misc;

pub mod propagation;
pub mod reports;
pub mod session;
