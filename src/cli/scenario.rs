//! Scenarios, as read from JSON.
//!
//! ```json
//! {
//!   "plan": { "steps": [{ "id": "A" }, { "id": "B", "preconditions": ["A"] }], "goals": ["B"] },
//!   "outcomes": { "B": [{ "success": false, "reason": "lint" }] },
//!   "holes": [{ "id": "h1", "type_hint": "i32" }],
//!   "resolutions": [{ "hole": "h1", "label": "42", "refinement": "value", "value": 42 }]
//! }
//! ```
//!
//! Outcomes for a step are used in order, one for each attempt of the step.
//! Any attempt without a listed outcome succeeds.

use std::{
    collections::{HashMap, VecDeque},
    path::Path,
};

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::Deserialize;

use otter_plan::{
    context::{ExecutionState, PlanContext},
    propagation::RefinementContext,
    reports::{PropagationEvent, StepResult},
    structures::{
        constraint::Resolution,
        hole::{HoleId, HoleSpec},
        step::{PlanSpec, StepId},
    },
    types::err::ErrorKind,
};

#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub plan: PlanSpec,

    #[serde(default)]
    pub outcomes: HashMap<StepId, Vec<Outcome>>,

    #[serde(default)]
    pub holes: Vec<HoleSpec>,

    #[serde(default)]
    pub resolutions: Vec<ScriptedResolution>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Outcome {
    pub success: bool,

    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct ScriptedResolution {
    pub hole: HoleId,

    #[serde(flatten)]
    pub resolution: Resolution,
}

pub fn read_scenario(path: &Path) -> Result<Scenario, String> {
    let file = std::fs::File::open(path).map_err(|e| format!("Failed to open {path:?}: {e}"))?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(|e| format!("Failed to read scenario: {e}"))
}

/// How to choose a step when more than one is eligible.
pub enum Policy {
    /// The first eligible step, in plan order.
    First,

    /// Some eligible step, at random.
    Random(StdRng),
}

impl Policy {
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Policy::Random(StdRng::seed_from_u64(seed)),
            None => Policy::First,
        }
    }

    fn choose<'s>(&mut self, eligible: &'s [StepId]) -> Option<&'s StepId> {
        match self {
            Policy::First => eligible.first(),
            Policy::Random(rng) => eligible.choose(rng),
        }
    }
}

/// A step reported to the context, with the outcome used.
pub struct Reported {
    pub step: StepId,
    pub success: bool,
    pub reason: String,
    pub result: StepResult,
}

/// Reports outcomes of eligible steps until the context reaches a terminal state, or `max_steps` reports have been made.
pub fn run_plan(
    ctx: &mut PlanContext,
    outcomes: HashMap<StepId, Vec<Outcome>>,
    policy: &mut Policy,
    max_steps: usize,
    mut on_report: impl FnMut(&Reported),
) -> Result<ExecutionState, ErrorKind> {
    let mut outcomes: HashMap<StepId, VecDeque<Outcome>> = outcomes
        .into_iter()
        .map(|(step, list)| (step, VecDeque::from(list)))
        .collect();

    let mut eligible = ctx.next_eligible();

    for _ in 0..max_steps {
        if ctx.state().is_terminal() {
            break;
        }

        let Some(step) = policy.choose(&eligible).cloned() else {
            break;
        };

        let outcome = outcomes
            .get_mut(&step)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(Outcome {
                success: true,
                reason: String::default(),
            });

        let result = ctx.report_step(&step, outcome.success, &outcome.reason)?;
        eligible = result.next_steps.clone();

        on_report(&Reported {
            step,
            success: outcome.success,
            reason: outcome.reason,
            result,
        });
    }

    Ok(ctx.state())
}

/// Registers each hole and applies each resolution, in order.
pub fn run_refinement(
    ctx: &mut RefinementContext,
    holes: Vec<HoleSpec>,
    resolutions: Vec<ScriptedResolution>,
    mut on_event: impl FnMut(&PropagationEvent),
) -> Result<(), ErrorKind> {
    for hole in holes {
        ctx.register_hole(hole)?;
    }

    for scripted in resolutions {
        for event in ctx.resolve(&scripted.hole, scripted.resolution)? {
            on_event(&event);
        }
    }

    Ok(())
}
