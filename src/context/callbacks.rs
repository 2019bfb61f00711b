/*!
Callbacks associated with a plan context.

For callbacks on clauses see [crate::db::clause::CallbackOnClause], and for callbacks on propagation see [crate::propagation::CallbackOnEvent].

Callbacks may be mutable functions.
Still, information passed from the context is non-mutable.
*/

use crate::{reports::StepResult, structures::step::StepId};

use super::PlanContext;

/// The type of a callback made after each reported step, with the id of the step and the result of the report.
pub type CallbackOnStep = dyn FnMut(&StepId, &StepResult) + Send + Sync;

impl PlanContext {
    pub fn set_callback_step(&mut self, callback: Box<CallbackOnStep>) {
        self.callback_step = Some(callback);
    }

    pub(crate) fn make_callback_step(&mut self, step: &StepId, result: &StepResult) {
        if let Some(callback) = &mut self.callback_step {
            callback(step, result);
        }
    }
}
