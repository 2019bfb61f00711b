/*!
Steps and plans.

A plan is handed to a [PlanContext](crate::context::PlanContext) by some external deriver as a list of [StepSpec]s together with goals.
Specs are read into [Step]s when the plan is built:

- A precondition (or goal) which is the id of some step of the plan is read as the success of that step.
  Any other precondition is read as a subject, to be assigned (positively) by some effect of a step, or by a fact.
- Produced literals are kept as given.

```rust
# use otter_plan::structures::step::{Plan, StepSpec};
# use otter_plan::structures::literal::SubjectId;
let plan = Plan::new(
    vec![
        StepSpec::new("A"),
        StepSpec::new("B").requires("A"),
    ],
    ["B"],
)
.unwrap();

let b = plan.step("B").unwrap();
assert!(b.preconditions().contains(&SubjectId::step_success("A")));
assert!(plan.goals().contains(&SubjectId::step_success("B")));
```
*/

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    structures::literal::{DecisionLiteral, SubjectId},
    types::err::{self},
};

/// The id of a step.
pub type StepId = String;

/// A step, as given by some deriver.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    pub id: StepId,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub preconditions: Vec<String>,

    #[serde(default)]
    pub produces: Vec<DecisionLiteral>,
}

impl StepSpec {
    pub fn new(id: impl Into<StepId>) -> Self {
        StepSpec {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds a precondition, either the id of some step or some subject.
    pub fn requires(mut self, precondition: impl Into<String>) -> Self {
        self.preconditions.push(precondition.into());
        self
    }

    /// Adds a literal which holds on success of the step.
    pub fn produces(mut self, literal: DecisionLiteral) -> Self {
        self.produces.push(literal);
        self
    }
}

/// A step of a loaded plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    id: StepId,
    description: String,
    preconditions: BTreeSet<SubjectId>,
    produces_on_success: BTreeSet<DecisionLiteral>,
}

impl Step {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn preconditions(&self) -> &BTreeSet<SubjectId> {
        &self.preconditions
    }

    pub fn produces_on_success(&self) -> &BTreeSet<DecisionLiteral> {
        &self.produces_on_success
    }

    /// The subject of the success of the step.
    pub fn success_subject(&self) -> SubjectId {
        SubjectId::step_success(&self.id)
    }

    /// The (positive) literal of the success of the step.
    pub fn success_literal(&self) -> DecisionLiteral {
        DecisionLiteral::positive(self.success_subject())
    }
}

/// Ordered steps, together with goals and facts.
///
/// Facts are literals which hold prior to any step, and are assigned at level zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    steps: Vec<Step>,
    goals: BTreeSet<SubjectId>,
    facts: BTreeSet<DecisionLiteral>,
}

impl Plan {
    /// A plan from specs and goals, with no facts.
    ///
    /// Returns an error if some step has an empty id, or if two steps share an id.
    pub fn new<G: Into<String>>(
        specs: Vec<StepSpec>,
        goals: impl IntoIterator<Item = G>,
    ) -> Result<Self, err::PlanError> {
        let mut ids = HashSet::new();
        for spec in &specs {
            if spec.id.is_empty() {
                return Err(err::PlanError::EmptyStepId);
            }
            if !ids.insert(spec.id.as_str()) {
                return Err(err::PlanError::DuplicateStep(spec.id.clone()));
            }
        }

        let read_subject = |name: String| match ids.contains(name.as_str()) {
            true => SubjectId::step_success(&name),
            false => SubjectId::from(name),
        };

        let steps = specs
            .iter()
            .map(|spec| Step {
                id: spec.id.clone(),
                description: spec.description.clone(),
                preconditions: spec
                    .preconditions
                    .iter()
                    .cloned()
                    .map(read_subject)
                    .collect(),
                produces_on_success: spec.produces.iter().cloned().collect(),
            })
            .collect();

        let goals = goals
            .into_iter()
            .map(|goal| read_subject(goal.into()))
            .collect();

        Ok(Plan {
            steps,
            goals,
            facts: BTreeSet::default(),
        })
    }

    /// The plan, with the given literals as facts.
    pub fn with_facts(mut self, facts: impl IntoIterator<Item = DecisionLiteral>) -> Self {
        self.facts.extend(facts);
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.id == id)
    }

    pub fn goals(&self) -> &BTreeSet<SubjectId> {
        &self.goals
    }

    pub fn facts(&self) -> &BTreeSet<DecisionLiteral> {
        &self.facts
    }
}

/// A plan as read from some external source, e.g. a json file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlanSpec {
    pub steps: Vec<StepSpec>,

    #[serde(default)]
    pub goals: Vec<String>,

    #[serde(default)]
    pub facts: Vec<DecisionLiteral>,
}

impl TryFrom<PlanSpec> for Plan {
    type Error = err::PlanError;

    fn try_from(spec: PlanSpec) -> Result<Self, Self::Error> {
        Ok(Plan::new(spec.steps, spec.goals)?.with_facts(spec.facts))
    }
}
