/*!
A registry of executions and refinement sessions, addressed by handle.

Each plan execution and each refinement session is a single-writer unit, held behind its own reader-writer lock.
Mutations (reports, registrations, resolutions) take the write lock of the unit, and queries take the read lock.
The lock of the registry itself is held only to look up, insert, or remove a unit.
So, distinct units may be used from distinct threads without coordination.

Handles are generation-tagged, and a handle to a closed unit is never reused.

```rust
# use otter_plan::session::Sessions;
# use otter_plan::structures::step::StepSpec;
# use otter_plan::context::ExecutionState;
let sessions = Sessions::default();
let handle = sessions
    .load_plan(vec![StepSpec::new("A"), StepSpec::new("B").requires("A")], ["B"])
    .unwrap();

assert!(sessions.next_eligible(handle).unwrap().contains("A"));
sessions.report_step(handle, "A", true, "").unwrap();
let result = sessions.report_step(handle, "B", true, "").unwrap();
assert_eq!(result.state, ExecutionState::Completed);

sessions.close_plan(handle).unwrap();
assert!(sessions.next_eligible(handle).is_err());
```
*/

use std::{
    collections::BTreeSet,
    sync::{Arc, RwLock},
};

use slotmap::{new_key_type, SlotMap};

use crate::{
    config::Config,
    context::PlanContext,
    db::HoleKey,
    misc::log::targets::{self},
    propagation::RefinementContext,
    reports::{PropagationEvent, SolutionSpaceReport, StepResult},
    structures::{
        constraint::Resolution,
        hole::HoleSpec,
        step::{Plan, StepId, StepSpec},
    },
    types::err::{self, ErrorKind},
};

new_key_type! {
    /// A handle to a plan execution.
    pub struct PlanHandle;

    /// A handle to a refinement session.
    pub struct SessionHandle;
}

/// A handle to a hole of some refinement session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HoleHandle {
    pub session: SessionHandle,
    pub hole: HoleKey,
}

type Shared<T> = Arc<RwLock<T>>;

/// A registry of plan executions and refinement sessions.
#[derive(Default)]
pub struct Sessions {
    /// The configuration given to each unit, unless some other configuration is given.
    pub config: Config,

    plans: RwLock<SlotMap<PlanHandle, Shared<PlanContext>>>,

    refinements: RwLock<SlotMap<SessionHandle, Shared<RefinementContext>>>,
}

impl Sessions {
    pub fn from_config(config: Config) -> Self {
        Sessions {
            config,
            ..Default::default()
        }
    }

    /// Loads a plan, built from the steps and goals, into a fresh execution.
    pub fn load_plan<G: Into<String>>(
        &self,
        steps: Vec<StepSpec>,
        goals: impl IntoIterator<Item = G>,
    ) -> Result<PlanHandle, ErrorKind> {
        let plan = Plan::new(steps, goals)?;
        self.load_plan_with(plan, self.config.clone())
    }

    /// Loads a plan into a fresh execution with the given configuration.
    pub fn load_plan_with(&self, plan: Plan, config: Config) -> Result<PlanHandle, ErrorKind> {
        let the_context = PlanContext::from_plan(plan, config)?;
        self.insert_plan(the_context)
    }

    fn insert_plan(&self, the_context: PlanContext) -> Result<PlanHandle, ErrorKind> {
        let mut plans = self.plans.write().map_err(|_| err::SessionError::Poisoned)?;
        let handle = plans.insert(Arc::new(RwLock::new(the_context)));
        log::info!(target: targets::SESSION, "Opened plan {handle:?}");
        Ok(handle)
    }

    fn plan(&self, handle: PlanHandle) -> Result<Shared<PlanContext>, ErrorKind> {
        let plans = self.plans.read().map_err(|_| err::SessionError::Poisoned)?;
        match plans.get(handle) {
            Some(the_context) => Ok(Arc::clone(the_context)),
            None => Err(err::SessionError::UnknownPlan.into()),
        }
    }

    /// Applies `f` to the execution, under the read lock of the execution.
    pub fn with_plan<T>(
        &self,
        handle: PlanHandle,
        f: impl FnOnce(&PlanContext) -> T,
    ) -> Result<T, ErrorKind> {
        let shared = self.plan(handle)?;
        let the_context = shared.read().map_err(|_| err::SessionError::Poisoned)?;
        Ok(f(&the_context))
    }

    /// Applies `f` to the execution, under the write lock of the execution.
    pub fn with_plan_mut<T>(
        &self,
        handle: PlanHandle,
        f: impl FnOnce(&mut PlanContext) -> T,
    ) -> Result<T, ErrorKind> {
        let shared = self.plan(handle)?;
        let mut the_context = shared.write().map_err(|_| err::SessionError::Poisoned)?;
        Ok(f(&mut the_context))
    }

    pub fn next_eligible(&self, handle: PlanHandle) -> Result<BTreeSet<StepId>, ErrorKind> {
        self.with_plan(handle, |the_context| {
            the_context.next_eligible().into_iter().collect()
        })
    }

    pub fn report_step(
        &self,
        handle: PlanHandle,
        step_id: &str,
        success: bool,
        reason: &str,
    ) -> Result<StepResult, ErrorKind> {
        self.with_plan_mut(handle, |the_context| {
            the_context.report_step(step_id, success, reason)
        })?
    }

    pub fn snapshot_plan(&self, handle: PlanHandle) -> Result<String, ErrorKind> {
        self.with_plan(handle, |the_context| the_context.snapshot_json())?
    }

    /// Resumes an execution from a snapshot, as a fresh unit.
    pub fn restore_plan(&self, json: &str) -> Result<PlanHandle, ErrorKind> {
        let the_context = PlanContext::from_snapshot_json(json, self.config.clone())?;
        self.insert_plan(the_context)
    }

    /// Removes the execution from the registry.
    ///
    /// Any thread holding the lock of the execution is unaffected.
    pub fn close_plan(&self, handle: PlanHandle) -> Result<(), ErrorKind> {
        let mut plans = self.plans.write().map_err(|_| err::SessionError::Poisoned)?;
        match plans.remove(handle) {
            Some(_) => {
                log::info!(target: targets::SESSION, "Closed plan {handle:?}");
                Ok(())
            }
            None => Err(err::SessionError::UnknownPlan.into()),
        }
    }

    pub fn plan_count(&self) -> Result<usize, ErrorKind> {
        let plans = self.plans.read().map_err(|_| err::SessionError::Poisoned)?;
        Ok(plans.len())
    }

    /// Opens a fresh refinement session.
    pub fn open_refinement(&self) -> Result<SessionHandle, ErrorKind> {
        self.open_refinement_with(self.config.clone())
    }

    pub fn open_refinement_with(&self, config: Config) -> Result<SessionHandle, ErrorKind> {
        let mut refinements = self
            .refinements
            .write()
            .map_err(|_| err::SessionError::Poisoned)?;
        let handle = refinements.insert(Arc::new(RwLock::new(RefinementContext::from_config(
            config,
        ))));
        log::info!(target: targets::SESSION, "Opened refinement {handle:?}");
        Ok(handle)
    }

    fn refinement(&self, session: SessionHandle) -> Result<Shared<RefinementContext>, ErrorKind> {
        let refinements = self
            .refinements
            .read()
            .map_err(|_| err::SessionError::Poisoned)?;
        match refinements.get(session) {
            Some(the_context) => Ok(Arc::clone(the_context)),
            None => Err(err::SessionError::UnknownSession.into()),
        }
    }

    /// Applies `f` to the session, under the read lock of the session.
    pub fn with_refinement<T>(
        &self,
        session: SessionHandle,
        f: impl FnOnce(&RefinementContext) -> T,
    ) -> Result<T, ErrorKind> {
        let shared = self.refinement(session)?;
        let the_context = shared.read().map_err(|_| err::SessionError::Poisoned)?;
        Ok(f(&the_context))
    }

    /// Applies `f` to the session, under the write lock of the session.
    pub fn with_refinement_mut<T>(
        &self,
        session: SessionHandle,
        f: impl FnOnce(&mut RefinementContext) -> T,
    ) -> Result<T, ErrorKind> {
        let shared = self.refinement(session)?;
        let mut the_context = shared.write().map_err(|_| err::SessionError::Poisoned)?;
        Ok(f(&mut the_context))
    }

    pub fn register_hole(
        &self,
        session: SessionHandle,
        spec: HoleSpec,
    ) -> Result<HoleHandle, ErrorKind> {
        let hole = self.with_refinement_mut(session, |the_context| the_context.register_hole(spec))??;
        Ok(HoleHandle { session, hole })
    }

    pub fn resolve_hole(
        &self,
        handle: HoleHandle,
        resolution: Resolution,
    ) -> Result<Vec<PropagationEvent>, ErrorKind> {
        let events = self.with_refinement_mut(handle.session, |the_context| {
            the_context.resolve_key(handle.hole, resolution)
        })??;
        Ok(events)
    }

    pub fn solution_space(
        &self,
        session: SessionHandle,
        hole_id: &str,
    ) -> Result<SolutionSpaceReport, ErrorKind> {
        let report =
            self.with_refinement(session, |the_context| the_context.solution_space(hole_id))??;
        Ok(report)
    }

    pub fn close_refinement(&self, session: SessionHandle) -> Result<(), ErrorKind> {
        let mut refinements = self
            .refinements
            .write()
            .map_err(|_| err::SessionError::Poisoned)?;
        match refinements.remove(session) {
            Some(_) => {
                log::info!(target: targets::SESSION, "Closed refinement {session:?}");
                Ok(())
            }
            None => Err(err::SessionError::UnknownSession.into()),
        }
    }
}
