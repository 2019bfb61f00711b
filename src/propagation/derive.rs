/*!
Derivation of constraints along relations between holes.

When a hole is resolved, a [ConstraintDeriver] is asked, for each related hole, which constraints follow from the resolution.
The default deriver, [RelationDeriver], derives by relation:

| Relation        | Kind           | Value `v`        | Range          | Type `t`     | One of `vs`    |
|-----------------|----------------|------------------|----------------|--------------|----------------|
| Same parameter  | type           | one of `[v]`     | the range      | type is `t`  | one of `vs`    |
| Dataflow        | return-value   | one of `[v]`     | the range      | type is `t`  | one of `vs`    |
| Sibling branch  | custom / type  | none of `[v]`    | ---            | type is `t`  | none of `vs`   |
| Adjacent        | position       | one of `[v-1, v+1]` for an integer, else none of `[v]` | --- | --- | --- |

Opaque resolutions give no constraints.
*/

use crate::structures::{
    constraint::{Constraint, ConstraintKind, Evaluator, Refinement, Resolution, Value},
    hole::{Hole, Relation},
};

/// A source of constraints on a hole, from the resolution of a related hole.
pub trait ConstraintDeriver: Send + Sync {
    fn derive(
        &self,
        source: &Hole,
        resolution: &Resolution,
        relation: Relation,
        target: &Hole,
    ) -> Vec<Constraint>;
}

/// Derives constraints from the relation between holes, and the structure of the resolution.
#[derive(Clone, Copy, Debug, Default)]
pub struct RelationDeriver;

impl ConstraintDeriver for RelationDeriver {
    fn derive(
        &self,
        source: &Hole,
        resolution: &Resolution,
        relation: Relation,
        _target: &Hole,
    ) -> Vec<Constraint> {
        let label = &resolution.label;
        let derived = |kind: ConstraintKind, description: String, evaluator: Evaluator| {
            Constraint::derived(kind, description, evaluator, source.id(), relation)
        };

        match relation {
            Relation::SameParameter | Relation::Dataflow => {
                let (kind, subject) = match relation {
                    Relation::SameParameter => (ConstraintKind::Type, "the parameter of"),
                    _ => (ConstraintKind::ReturnValue, "the value from"),
                };
                let description = format!("{subject} {} is {label}", source.id());
                match &resolution.refinement {
                    Refinement::Value { value } => vec![derived(
                        kind,
                        description,
                        Evaluator::OneOf {
                            values: vec![value.clone()],
                        },
                    )],
                    Refinement::Range { min, max } => vec![derived(
                        kind,
                        description,
                        Evaluator::Range {
                            min: *min,
                            max: *max,
                        },
                    )],
                    Refinement::Type { type_name } => vec![derived(
                        kind,
                        description,
                        Evaluator::TypeIs {
                            type_name: type_name.clone(),
                        },
                    )],
                    Refinement::OneOf { values } => vec![derived(
                        kind,
                        description,
                        Evaluator::OneOf {
                            values: values.clone(),
                        },
                    )],
                    Refinement::Opaque => Vec::default(),
                }
            }

            Relation::SiblingBranch => {
                let description = format!("differs from sibling {} ({label})", source.id());
                match &resolution.refinement {
                    Refinement::Value { value } => vec![derived(
                        ConstraintKind::Custom,
                        description,
                        Evaluator::NoneOf {
                            values: vec![value.clone()],
                        },
                    )],
                    Refinement::OneOf { values } => vec![derived(
                        ConstraintKind::Custom,
                        description,
                        Evaluator::NoneOf {
                            values: values.clone(),
                        },
                    )],
                    Refinement::Type { type_name } => vec![derived(
                        ConstraintKind::Type,
                        format!("shares the type of sibling {}: {type_name}", source.id()),
                        Evaluator::TypeIs {
                            type_name: type_name.clone(),
                        },
                    )],
                    Refinement::Range { .. } | Refinement::Opaque => Vec::default(),
                }
            }

            Relation::Adjacent => match &resolution.refinement {
                Refinement::Value {
                    value: Value::Int(position),
                } => {
                    let values: Vec<Value> = [position.checked_sub(1), position.checked_add(1)]
                        .into_iter()
                        .flatten()
                        .map(Value::Int)
                        .collect();
                    vec![derived(
                        ConstraintKind::Position,
                        format!("adjacent to {} at {position}", source.id()),
                        Evaluator::OneOf { values },
                    )]
                }
                Refinement::Value { value } => vec![derived(
                    ConstraintKind::Position,
                    format!("not at the position of {} ({label})", source.id()),
                    Evaluator::NoneOf {
                        values: vec![value.clone()],
                    },
                )],
                _ => Vec::default(),
            },
        }
    }
}
