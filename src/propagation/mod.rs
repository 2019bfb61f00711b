/*!
The refinement context, within which holes are refined.

A [RefinementContext] holds registered [holes](Hole), the relations between holes, and a log of [propagation events](PropagationEvent).

When a hole is [resolved](RefinementContext::resolve):
1. The hole is marked resolved, and its constraints become immutable.
   The status of each constraint is evaluated against the resolution, and an event is recorded with the hole as both source and target.
2. For each related hole which is unresolved, constraints are derived by the [deriver](derive::ConstraintDeriver).
   New constraints are added, the statuses of all constraints of the hole are recomputed, and the solution space is re-estimated.
   If some constraint was added, an event is recorded.
3. For each related hole which is resolved, no constraint is added.
   Though, if the hole violates some derived constraint, an event with the violations is recorded.

Violations never block propagation, and are logged at warn level.

Estimates only ever narrow: the estimate after an event is the lesser of the estimate before and the fresh estimate.

# Example

```rust
# use otter_plan::config::Config;
# use otter_plan::propagation::RefinementContext;
# use otter_plan::structures::constraint::{ConstraintKind, ConstraintStatus, Evaluator, Refinement, Resolution};
# use otter_plan::structures::hole::{HoleSpec, Relation, SolutionSpace};
let mut the_context = RefinementContext::from_config(Config::default());

the_context.register_hole(HoleSpec::new("h1", "int")).unwrap();
the_context
    .register_hole(HoleSpec::new("h2", "i32").relate("h1", Relation::Dataflow))
    .unwrap();

let resolution = Resolution::new(
    "positive integer",
    Refinement::Range { min: Some(1), max: None },
);
let events = the_context.resolve("h1", resolution).unwrap();

let to_h2 = &events[1];
assert_eq!(to_h2.target_hole, "h2");
assert_eq!(to_h2.added_constraints[0].kind(), ConstraintKind::ReturnValue);
assert_eq!(to_h2.added_constraints[0].status(), ConstraintStatus::Unknown);
assert!(to_h2.space_after < to_h2.space_before);
```
*/

pub mod derive;
pub mod domain;
pub mod estimator;
mod evaluate;

use std::{
    collections::HashMap,
    time::{SystemTime, UNIX_EPOCH},
};

use petgraph::graphmap::UnGraphMap;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::{
    config::Config,
    db::HoleKey,
    misc::log::targets::{self},
    reports::{PropagationEvent, SolutionSpaceReport, StatusCounts},
    structures::{
        constraint::{
            Constraint, ConstraintOrigin, ConstraintStatus, Evaluator, Refinement, Resolution,
        },
        hole::{Hole, HoleId, HoleSpec, Relation, SolutionSpace},
    },
    types::err::{self, ErrorKind},
};

use derive::{ConstraintDeriver, RelationDeriver};
use domain::Domain;
use estimator::{default_estimator, Estimator};

/// The type of a callback made with each propagation event recorded.
pub type CallbackOnEvent = dyn FnMut(&PropagationEvent) + Send + Sync;

/// A relation between two holes, by id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub from: HoleId,
    pub to: HoleId,
    pub relation: Relation,
}

fn default_deriver() -> Box<dyn ConstraintDeriver> {
    Box::new(RelationDeriver)
}

fn default_config_estimator() -> Box<dyn Estimator> {
    default_estimator(&Config::default())
}

/// A context within which holes are refined.
#[derive(Serialize, Deserialize)]
pub struct RefinementContext {
    /// The configuration of the context.
    #[serde(skip)]
    pub config: Config,

    holes: SlotMap<HoleKey, Hole>,

    ids: HashMap<HoleId, HoleKey>,

    /// Relations between registered holes, in order of attachment.
    relations: Vec<RelationRecord>,

    /// Relations to holes which are yet to be registered.
    pending: Vec<RelationRecord>,

    #[serde(skip)]
    graph: UnGraphMap<HoleKey, Relation>,

    events: Vec<PropagationEvent>,

    #[serde(skip, default = "default_config_estimator")]
    estimator: Box<dyn Estimator>,

    #[serde(skip, default = "default_deriver")]
    deriver: Box<dyn ConstraintDeriver>,

    #[serde(skip)]
    callback_propagation: Option<Box<CallbackOnEvent>>,
}

impl Default for RefinementContext {
    fn default() -> Self {
        RefinementContext::from_config(Config::default())
    }
}

impl RefinementContext {
    pub fn from_config(config: Config) -> Self {
        RefinementContext {
            estimator: default_estimator(&config),
            config,
            holes: SlotMap::default(),
            ids: HashMap::default(),
            relations: Vec::default(),
            pending: Vec::default(),
            graph: UnGraphMap::default(),
            events: Vec::default(),
            deriver: default_deriver(),
            callback_propagation: None,
        }
    }

    /// Replaces the estimator chosen by the configuration.
    pub fn set_estimator(&mut self, estimator: Box<dyn Estimator>) {
        self.estimator = estimator;
    }

    /// Replaces the default [RelationDeriver].
    pub fn set_deriver(&mut self, deriver: Box<dyn ConstraintDeriver>) {
        self.deriver = deriver;
    }

    pub fn set_callback_propagation(&mut self, callback: Box<CallbackOnEvent>) {
        self.callback_propagation = Some(callback);
    }

    /// Registers a hole.
    ///
    /// Declared constraints are marked as declared, their statuses are computed, and the solution space of the hole is estimated.
    /// Relations to holes not yet registered are held until the other hole is registered.
    pub fn register_hole(&mut self, spec: HoleSpec) -> Result<HoleKey, err::PropagationError> {
        if self.ids.contains_key(&spec.id) {
            return Err(err::PropagationError::DuplicateHole(spec.id));
        }
        if spec.related.iter().any(|related| related.hole == spec.id) {
            return Err(err::PropagationError::SelfRelation(spec.id));
        }

        let mut constraints: Vec<Constraint> = Vec::with_capacity(spec.constraints.len());
        for constraint in spec.constraints {
            let declared = Constraint::declared(
                constraint.kind(),
                constraint.predicate().description.clone(),
                constraint.evaluator().clone(),
            );
            if !constraints.iter().any(|c| c.same_requirement(&declared)) {
                constraints.push(declared);
            }
        }

        let mut hole = Hole {
            id: spec.id.clone(),
            type_hint: spec.type_hint,
            constraints,
            estimate: SolutionSpace::Unbounded,
            resolution: None,
        };
        refresh_statuses(&mut hole);
        let domain = Domain::from_hint(&hole.type_hint);
        hole.estimate = std::cmp::min(
            domain.size(),
            self.estimator.estimate(&domain, &hole.constraints),
        );

        log::info!(target: targets::PROPAGATION, "Registered {} ({}) with estimate {}", hole.id, hole.type_hint, hole.estimate);

        let key = self.holes.insert(hole);
        self.ids.insert(spec.id.clone(), key);
        self.graph.add_node(key);

        for related in spec.related {
            let record = RelationRecord {
                from: spec.id.clone(),
                to: related.hole,
                relation: related.relation,
            };
            match self.ids.get(&record.to) {
                Some(&other) => self.attach(key, other, record),
                None => self.pending.push(record),
            }
        }

        let (ready, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|record| record.to == spec.id);
        self.pending = pending;
        for record in ready {
            if let Some(&other) = self.ids.get(&record.from) {
                self.attach(other, key, record);
            }
        }

        Ok(key)
    }

    fn attach(&mut self, a: HoleKey, b: HoleKey, record: RelationRecord) {
        log::trace!(target: targets::PROPAGATION, "Related {} and {} by {}", record.from, record.to, record.relation);
        self.graph.add_edge(a, b, record.relation);
        self.relations.push(record);
    }

    /// Resolves the hole with the given id, returning the events recorded.
    pub fn resolve(
        &mut self,
        hole_id: &str,
        resolution: Resolution,
    ) -> Result<Vec<PropagationEvent>, err::PropagationError> {
        let key = self.key_of(hole_id)?;
        self.resolve_key(key, resolution)
    }

    /// Resolves the hole with the given key, returning the events recorded.
    pub fn resolve_key(
        &mut self,
        key: HoleKey,
        resolution: Resolution,
    ) -> Result<Vec<PropagationEvent>, err::PropagationError> {
        let hole = self
            .holes
            .get_mut(key)
            .ok_or_else(|| err::PropagationError::UnknownHole(format!("{key:?}")))?;
        if hole.is_resolved() {
            return Err(err::PropagationError::AlreadyResolved(hole.id.clone()));
        }

        let space_before = hole.estimate;
        let domain = Domain::from_hint(&hole.type_hint);
        hole.resolution = Some(resolution.clone());
        refresh_statuses(hole);
        hole.estimate = std::cmp::min(
            space_before,
            resolved_space(&domain, &resolution.refinement),
        );

        log::info!(target: targets::PROPAGATION, "Resolved {} as {resolution}", hole.id);

        let source = hole.clone();
        let violations: Vec<Constraint> = source
            .with_status(ConstraintStatus::Violated)
            .cloned()
            .collect();
        let mut events = vec![self.event(&source, &source, Vec::default(), violations, space_before)];

        let mut neighbours: Vec<(HoleKey, Relation)> = self
            .graph
            .edges(key)
            .map(|(_, other, relation)| (other, *relation))
            .collect();
        neighbours.sort();

        for (other, relation) in neighbours {
            let Some(target) = self.holes.get(other) else {
                continue;
            };
            let derived = self.deriver.derive(&source, &resolution, relation, target);
            if derived.is_empty() {
                continue;
            }

            if let Some(event) = self.propagate_to(other, &source, derived) {
                events.push(event);
            }
        }

        for event in &events {
            for violation in &event.violations {
                log::warn!(target: targets::PROPAGATION, "{} violates {violation}", event.target_hole);
            }
        }

        for event in &mut events {
            event.sequence = self.events.len() as u64;
            self.events.push(event.clone());
            if let Some(callback) = &mut self.callback_propagation {
                callback(event);
            }
        }

        Ok(events)
    }

    /// Adds derived constraints to the hole, returning an event if some constraint was added or some violation was found.
    fn propagate_to(
        &mut self,
        key: HoleKey,
        source: &Hole,
        derived: Vec<Constraint>,
    ) -> Option<PropagationEvent> {
        let target = self.holes.get_mut(key)?;
        let space_before = target.estimate;

        if let Some(resolution) = &target.resolution {
            let violations: Vec<Constraint> = derived
                .into_iter()
                .filter_map(|mut constraint| {
                    let status = constraint.evaluator().evaluate(&resolution.refinement);
                    constraint.set_status(status);
                    (status == ConstraintStatus::Violated).then_some(constraint)
                })
                .collect();

            return match violations.is_empty() {
                true => None,
                false => {
                    let target = target.clone();
                    Some(self.event(source, &target, Vec::default(), violations, space_before))
                }
            };
        }

        let existing = target.constraints.len();
        let was_violated: Vec<bool> = target
            .constraints
            .iter()
            .map(|constraint| constraint.status() == ConstraintStatus::Violated)
            .collect();

        let mut added_count = 0;
        for constraint in derived {
            if target
                .constraints
                .iter()
                .any(|existing| existing.same_requirement(&constraint))
            {
                log::trace!(target: targets::PROPAGATION, "{} already requires {constraint}", target.id);
                continue;
            }
            target.constraints.push(constraint);
            added_count += 1;
        }

        if added_count == 0 {
            return None;
        }

        refresh_statuses(target);
        let domain = Domain::from_hint(&target.type_hint);
        let estimate = self.estimator.estimate(&domain, &target.constraints);
        target.estimate = std::cmp::min(space_before, estimate);
        log::trace!(target: targets::ESTIMATE, "{}: {space_before} -> {}", target.id, target.estimate);

        let added: Vec<Constraint> = target.constraints[existing..].to_vec();
        let violations: Vec<Constraint> = target
            .constraints
            .iter()
            .enumerate()
            .filter(|(index, constraint)| {
                constraint.status() == ConstraintStatus::Violated
                    && !was_violated.get(*index).copied().unwrap_or(false)
            })
            .map(|(_, constraint)| constraint.clone())
            .collect();

        let target = target.clone();
        Some(self.event(source, &target, added, violations, space_before))
    }

    /// An event from `source` to `target`, with the current estimate of `target` as the space after.
    ///
    /// Events are sequenced when logged.
    fn event(
        &self,
        source: &Hole,
        target: &Hole,
        added_constraints: Vec<Constraint>,
        violations: Vec<Constraint>,
        space_before: SolutionSpace,
    ) -> PropagationEvent {
        let space_after = target.estimate;
        PropagationEvent {
            sequence: 0,
            source_hole: source.id.clone(),
            target_hole: target.id.clone(),
            added_constraints,
            violations,
            space_before,
            space_after,
            fully_constrained: space_after.is_single(),
            enumerable: space_after.within(self.config.enumerable_threshold.value),
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|duration| duration.as_millis() as u64)
                .unwrap_or_default(),
        }
    }

    fn key_of(&self, hole_id: &str) -> Result<HoleKey, err::PropagationError> {
        self.ids
            .get(hole_id)
            .copied()
            .ok_or_else(|| err::PropagationError::UnknownHole(hole_id.to_string()))
    }

    /// The key of the hole with the id, if registered.
    pub fn hole_key(&self, hole_id: &str) -> Option<HoleKey> {
        self.ids.get(hole_id).copied()
    }

    pub fn hole(&self, hole_id: &str) -> Option<&Hole> {
        self.hole_key(hole_id).and_then(|key| self.holes.get(key))
    }

    pub fn hole_by_key(&self, key: HoleKey) -> Option<&Hole> {
        self.holes.get(key)
    }

    /// Registered holes, in order of registration.
    pub fn holes(&self) -> impl Iterator<Item = &Hole> {
        self.holes.values()
    }

    /// Holes related to the hole with the id, together with the relation.
    pub fn related(&self, hole_id: &str) -> Vec<(HoleId, Relation)> {
        let Some(key) = self.hole_key(hole_id) else {
            return Vec::default();
        };
        let mut related: Vec<(HoleId, Relation)> = self
            .graph
            .edges(key)
            .filter_map(|(_, other, relation)| {
                self.holes
                    .get(other)
                    .map(|hole| (hole.id.clone(), *relation))
            })
            .collect();
        related.sort();
        related
    }

    /// Relations which await the registration of some hole.
    pub fn pending_relations(&self) -> &[RelationRecord] {
        &self.pending
    }

    /// Every event recorded, in order.
    pub fn events(&self) -> &[PropagationEvent] {
        &self.events
    }

    /// The solution space of the hole with the id, together with a count of its constraints by status.
    pub fn solution_space(&self, hole_id: &str) -> Result<SolutionSpaceReport, err::PropagationError> {
        let key = self.key_of(hole_id)?;
        self.solution_space_by_key(key)
            .ok_or_else(|| err::PropagationError::UnknownHole(hole_id.to_string()))
    }

    pub fn solution_space_by_key(&self, key: HoleKey) -> Option<SolutionSpaceReport> {
        let hole = self.holes.get(key)?;
        Some(SolutionSpaceReport {
            hole: hole.id.clone(),
            estimate: hole.estimate,
            status_counts: hole.constraints.iter().collect::<StatusCounts>(),
            resolved: hole.is_resolved(),
            fully_constrained: hole.estimate.is_single(),
            enumerable: hole.estimate.within(self.config.enumerable_threshold.value),
        })
    }

    /// Ids of holes whose estimate is exactly one.
    pub fn fully_constrained(&self) -> Vec<HoleId> {
        self.holes
            .values()
            .filter(|hole| hole.estimate.is_single())
            .map(|hole| hole.id.clone())
            .collect()
    }

    /// Ids of holes whose estimate is at most the enumerable threshold.
    pub fn enumerable(&self) -> Vec<HoleId> {
        let threshold = self.config.enumerable_threshold.value;
        self.holes
            .values()
            .filter(|hole| hole.estimate.within(threshold))
            .map(|hole| hole.id.clone())
            .collect()
    }

    /// Serializes the holes, relations, and the event log.
    pub fn snapshot_json(&self) -> Result<String, ErrorKind> {
        Ok(serde_json::to_string(self)?)
    }

    /// Resumes refinement from a snapshot, with the default deriver and the estimator chosen by the configuration.
    pub fn from_snapshot_json(json: &str, config: Config) -> Result<Self, ErrorKind> {
        let mut the_context: RefinementContext = serde_json::from_str(json)?;
        the_context.estimator = default_estimator(&config);
        the_context.config = config;

        for key in the_context.holes.keys() {
            the_context.graph.add_node(key);
        }
        for record in &the_context.relations {
            if let (Some(&a), Some(&b)) = (
                the_context.ids.get(&record.from),
                the_context.ids.get(&record.to),
            ) {
                the_context.graph.add_edge(a, b, record.relation);
            }
        }
        Ok(the_context)
    }
}

/// Recomputes the status of each constraint of the hole.
///
/// For a resolved hole each constraint is evaluated against the resolution.
/// Otherwise, a constraint is violated if it conflicts with the type hint of the hole, or with some other constraint of the hole, and is otherwise unknown.
fn refresh_statuses(hole: &mut Hole) {
    if let Some(resolution) = &hole.resolution {
        for constraint in &mut hole.constraints {
            let status = constraint.evaluator().evaluate(&resolution.refinement);
            constraint.set_status(status);
        }
        return;
    }

    let hint = Evaluator::TypeIs {
        type_name: hole.type_hint.clone(),
    };
    let statuses: Vec<ConstraintStatus> = hole
        .constraints
        .iter()
        .enumerate()
        .map(|(index, constraint)| {
            let conflict = constraint.evaluator().conflicts_with(&hint)
                || hole
                    .constraints
                    .iter()
                    .enumerate()
                    .any(|(other_index, other)| {
                        index != other_index && constraint.evaluator().conflicts_with(other.evaluator())
                    });
            match conflict {
                true => ConstraintStatus::Violated,
                false => ConstraintStatus::Unknown,
            }
        })
        .collect();

    for (constraint, status) in hole.constraints.iter_mut().zip(statuses) {
        constraint.set_status(status);
    }
}

/// The size of the solution space of a hole of the domain, resolved with the refinement.
fn resolved_space(domain: &Domain, refinement: &Refinement) -> SolutionSpace {
    match refinement {
        Refinement::Value { .. } => SolutionSpace::Bounded(1),
        Refinement::OneOf { values } => {
            let mut distinct = values.clone();
            distinct.sort();
            distinct.dedup();
            SolutionSpace::Bounded(distinct.len() as u64)
        }
        Refinement::Range { min, max } => {
            let range = domain::Interval::new(*min, *max);
            match domain.interval() {
                Some(interval) => interval.intersect(&range).size(),
                None => range.size(),
            }
        }
        Refinement::Type { type_name } => Domain::from_hint(type_name).size(),
        Refinement::Opaque => domain.size(),
    }
}

/// True if the constraint was derived from the resolution of the hole with the id.
pub fn derived_from(constraint: &Constraint, hole_id: &str) -> bool {
    matches!(constraint.origin(), ConstraintOrigin::Derived { from, .. } if from == hole_id)
}
