/*!
Estimates of the size of a solution space.

An [Estimator] takes the domain of a hole together with the constraints of the hole, and returns an estimate of how many values meet every constraint.

Three estimators are provided:
- [Enumeration], which counts candidate values exactly, when there are few enough to count.
- [Discount], which applies ranges and sets of alternatives exactly, and otherwise multiplies by a discount for each constraint, by [kind](crate::structures::constraint::ConstraintKind).
  A constrained hole whose candidates are unbounded is taken to have a nominal count of candidates, from the configuration, before discounting.
- [Tiered], which enumerates when there are few enough candidates, and otherwise discounts.

Whichever estimator is used, a hole with a violated constraint has an empty solution space.
And, estimates are never used to widen a solution space, as the context keeps the lesser of the previous and the new estimate.

```rust
# use otter_plan::config::Config;
# use otter_plan::propagation::{domain::Domain, estimator::default_estimator};
# use otter_plan::structures::constraint::*;
# use otter_plan::structures::hole::SolutionSpace;
let estimator = default_estimator(&Config::default());
let small = Constraint::declared(
    ConstraintKind::ReturnValue,
    "at most ten",
    Evaluator::Range { min: Some(1), max: Some(10) },
);

assert_eq!(
    estimator.estimate(&Domain::from_hint("u8"), &[small]),
    SolutionSpace::Bounded(10)
);
```
*/

use crate::{
    config::{Config, DiscountTable, EstimatorKind},
    misc::log::targets::{self},
    structures::{
        constraint::{Constraint, ConstraintStatus, Evaluator, Value},
        hole::SolutionSpace,
    },
};

use super::domain::{Domain, Interval};

/// A strategy for estimating the size of a solution space.
///
/// As contexts are shared between threads by [sessions](crate::session), estimators must be [Send] and [Sync].
pub trait Estimator: Send + Sync {
    fn estimate(&self, domain: &Domain, constraints: &[Constraint]) -> SolutionSpace;
}

/// An estimator, as chosen by the configuration.
pub fn default_estimator(config: &Config) -> Box<dyn Estimator> {
    let enumeration = Enumeration {
        limit: config.enumeration_limit.value,
    };
    let discount = Discount {
        table: config.discount,
        unbounded: config.unbounded_size.value,
    };
    match config.estimator.value {
        EstimatorKind::Tiered => Box::new(Tiered {
            enumeration,
            discount,
        }),
        EstimatorKind::Enumeration => Box::new(enumeration),
        EstimatorKind::Discount => Box::new(discount),
    }
}

/// The candidates for a solution, after applying the constraints which narrow candidates exactly.
enum Narrowed {
    Listed(Vec<Value>),
    Integers(Interval),
    Opaque,
}

impl Narrowed {
    fn new(domain: &Domain, constraints: &[Constraint]) -> Self {
        let alternatives = constraints
            .iter()
            .filter_map(|constraint| match constraint.evaluator() {
                Evaluator::OneOf { values } => Some(values),
                _ => None,
            })
            .min_by_key(|values| values.len());

        if let Some(values) = alternatives {
            let mut listed: Vec<Value> = Vec::default();
            for value in values {
                if domain.admits(value) != Some(false) && !listed.contains(value) {
                    listed.push(value.clone());
                }
            }
            return Narrowed::Listed(listed);
        }

        let intervals = constraints
            .iter()
            .filter_map(|constraint| constraint.evaluator().interval());

        match domain {
            Domain::Choice(values) => Narrowed::Listed(values.clone()),
            Domain::Integer(interval) => Narrowed::Integers(
                intervals.fold(*interval, |narrowed, other| narrowed.intersect(&other)),
            ),
            Domain::Opaque => match intervals.reduce(|narrowed, other| narrowed.intersect(&other)) {
                Some(interval) => Narrowed::Integers(interval),
                None => Narrowed::Opaque,
            },
        }
    }

    fn size(&self) -> SolutionSpace {
        match self {
            Self::Listed(values) => SolutionSpace::Bounded(values.len() as u64),
            Self::Integers(interval) => interval.size(),
            Self::Opaque => SolutionSpace::Unbounded,
        }
    }

    /// The count of candidates, with unbounded candidates taken to be `unbounded` many.
    fn nominal_size(&self, unbounded: u64) -> u64 {
        match self {
            Self::Listed(values) => values.len() as u64,
            Self::Integers(interval) => interval.nominal_size(unbounded),
            Self::Opaque => unbounded,
        }
    }
}

fn has_violation(constraints: &[Constraint]) -> bool {
    constraints
        .iter()
        .any(|constraint| constraint.status() == ConstraintStatus::Violated)
}

fn meets_all(value: &Value, constraints: &[Constraint]) -> bool {
    constraints
        .iter()
        .all(|constraint| constraint.evaluator().admits(value) != Some(false))
}

/// Counts candidates exactly, when there are at most `limit` candidates.
///
/// Otherwise, the estimate is the count of candidates after narrowing by ranges.
#[derive(Clone, Copy, Debug)]
pub struct Enumeration {
    pub limit: u64,
}

impl Estimator for Enumeration {
    fn estimate(&self, domain: &Domain, constraints: &[Constraint]) -> SolutionSpace {
        if has_violation(constraints) {
            return SolutionSpace::Bounded(0);
        }

        match Narrowed::new(domain, constraints) {
            Narrowed::Listed(values) => SolutionSpace::Bounded(
                values
                    .iter()
                    .filter(|value| meets_all(value, constraints))
                    .count() as u64,
            ),

            Narrowed::Integers(interval) => match interval.values(self.limit) {
                Some(ints) => SolutionSpace::Bounded(
                    ints.into_iter()
                        .filter(|int| meets_all(&Value::Int(*int), constraints))
                        .count() as u64,
                ),
                None => interval.size(),
            },

            Narrowed::Opaque => SolutionSpace::Unbounded,
        }
    }
}

/// Applies ranges and alternatives exactly, and discounts for every other constraint.
///
/// Without constraints, unbounded candidates give an unbounded estimate.
/// Otherwise, unbounded candidates are counted as at most `unbounded` before discounting, and so any constraint gives a bounded estimate.
///
/// A bounded estimate is never discounted below one.
#[derive(Clone, Copy, Debug)]
pub struct Discount {
    pub table: DiscountTable,
    pub unbounded: u64,
}

impl Estimator for Discount {
    fn estimate(&self, domain: &Domain, constraints: &[Constraint]) -> SolutionSpace {
        if has_violation(constraints) {
            return SolutionSpace::Bounded(0);
        }

        let narrowed = Narrowed::new(domain, constraints);
        let exact_intervals = matches!(narrowed, Narrowed::Integers(_));

        let mut factor = 1.0;
        for constraint in constraints {
            let exact = match constraint.evaluator() {
                Evaluator::OneOf { .. } => true,
                Evaluator::Range { .. } => exact_intervals,
                Evaluator::TypeIs { .. } => {
                    exact_intervals && constraint.evaluator().interval().is_some()
                }
                Evaluator::NoneOf { .. } | Evaluator::Opaque { .. } => false,
            };
            if !exact {
                factor *= self.table.factor(constraint.kind());
            }
        }

        let count = match narrowed.size() {
            SolutionSpace::Bounded(0) => return SolutionSpace::Bounded(0),
            SolutionSpace::Bounded(count) => count,
            SolutionSpace::Unbounded if constraints.is_empty() => return SolutionSpace::Unbounded,
            SolutionSpace::Unbounded => {
                let nominal = narrowed.nominal_size(self.unbounded);
                log::trace!(target: targets::ESTIMATE, "Unbounded candidates counted as {nominal}");
                nominal
            }
        };

        let discounted = (count as f64 * factor).floor() as u64;
        SolutionSpace::Bounded(std::cmp::max(1, discounted))
    }
}

/// Enumerates when there are at most as many candidates as the limit of enumeration, and otherwise discounts.
#[derive(Clone, Copy, Debug)]
pub struct Tiered {
    pub enumeration: Enumeration,
    pub discount: Discount,
}

impl Estimator for Tiered {
    fn estimate(&self, domain: &Domain, constraints: &[Constraint]) -> SolutionSpace {
        let candidates = Narrowed::new(domain, constraints).size();
        match candidates.within(self.enumeration.limit) {
            true => {
                log::trace!(target: targets::ESTIMATE, "Enumerating {candidates} candidates");
                self.enumeration.estimate(domain, constraints)
            }
            false => {
                log::trace!(target: targets::ESTIMATE, "Discounting {candidates} candidates");
                self.discount.estimate(domain, constraints)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::constraint::ConstraintKind;

    fn constraint(kind: ConstraintKind, evaluator: Evaluator) -> Constraint {
        Constraint::declared(kind, "test", evaluator)
    }

    #[test]
    fn enumeration_counts() {
        let estimator = Enumeration { limit: 4096 };
        let constraints = vec![
            constraint(
                ConstraintKind::ReturnValue,
                Evaluator::Range {
                    min: Some(0),
                    max: Some(9),
                },
            ),
            constraint(
                ConstraintKind::Custom,
                Evaluator::NoneOf {
                    values: vec![Value::Int(3), Value::Int(4)],
                },
            ),
        ];

        assert_eq!(
            estimator.estimate(&Domain::from_hint("int"), &constraints),
            SolutionSpace::Bounded(8)
        );
    }

    #[test]
    fn enumeration_falls_back_to_interval() {
        let estimator = Enumeration { limit: 16 };
        let constraints = vec![constraint(
            ConstraintKind::ReturnValue,
            Evaluator::Range {
                min: Some(1),
                max: None,
            },
        )];

        assert_eq!(
            estimator.estimate(&Domain::from_hint("u8"), &constraints),
            SolutionSpace::Bounded(255)
        );
        assert_eq!(
            estimator.estimate(&Domain::from_hint("int"), &constraints),
            SolutionSpace::Unbounded
        );
    }

    #[test]
    fn discount_applies_factor() {
        let estimator = Discount {
            table: DiscountTable::default(),
            unbounded: crate::config::defaults::UNBOUNDED_SIZE,
        };
        let loop_constraint = constraint(
            ConstraintKind::LoopBehavior,
            Evaluator::Opaque {
                tag: "terminates".into(),
            },
        );

        let expected = (256.0 * DiscountTable::default().loop_behavior).floor() as u64;
        assert_eq!(
            estimator.estimate(&Domain::from_hint("u8"), &[loop_constraint]),
            SolutionSpace::Bounded(expected)
        );
    }

    #[test]
    fn discount_floor_is_one() {
        let estimator = Discount {
            table: DiscountTable::default(),
            unbounded: crate::config::defaults::UNBOUNDED_SIZE,
        };
        let opaque = constraint(
            ConstraintKind::Custom,
            Evaluator::Opaque { tag: "odd".into() },
        );

        assert_eq!(
            estimator.estimate(&Domain::from_hint("unit"), &[opaque]),
            SolutionSpace::Bounded(1)
        );
    }

    #[test]
    fn violation_empties() {
        let mut violated = constraint(ConstraintKind::Type, Evaluator::Opaque { tag: "x".into() });
        violated.set_status(ConstraintStatus::Violated);

        let estimator = Tiered {
            enumeration: Enumeration { limit: 4096 },
            discount: Discount {
                table: DiscountTable::default(),
                unbounded: crate::config::defaults::UNBOUNDED_SIZE,
            },
        };
        assert_eq!(
            estimator.estimate(&Domain::from_hint("int"), &[violated]),
            SolutionSpace::Bounded(0)
        );
    }

    #[test]
    fn alternatives_bound_opaque() {
        let estimator = Tiered {
            enumeration: Enumeration { limit: 4096 },
            discount: Discount {
                table: DiscountTable::default(),
                unbounded: crate::config::defaults::UNBOUNDED_SIZE,
            },
        };
        let alternatives = constraint(
            ConstraintKind::Type,
            Evaluator::OneOf {
                values: vec![Value::Text("a".into()), Value::Text("b".into())],
            },
        );

        assert_eq!(
            estimator.estimate(&Domain::Opaque, &[alternatives]),
            SolutionSpace::Bounded(2)
        );
    }

    #[test]
    fn unbounded_candidates_are_nominal() {
        let estimator = Tiered {
            enumeration: Enumeration { limit: 4096 },
            discount: Discount {
                table: DiscountTable::default(),
                unbounded: 1 << 20,
            },
        };
        let positive = constraint(
            ConstraintKind::ReturnValue,
            Evaluator::Range {
                min: Some(1),
                max: None,
            },
        );
        let terminates = constraint(
            ConstraintKind::LoopBehavior,
            Evaluator::Opaque {
                tag: "terminates".into(),
            },
        );

        let int = Domain::from_hint("int");
        assert_eq!(estimator.estimate(&int, &[]), SolutionSpace::Unbounded);
        assert_eq!(
            estimator.estimate(&int, &[positive.clone()]),
            SolutionSpace::Bounded(1 << 19)
        );

        let expected = ((1 << 19) as f64 * DiscountTable::default().loop_behavior).floor() as u64;
        assert_eq!(
            estimator.estimate(&int, &[positive, terminates.clone()]),
            SolutionSpace::Bounded(expected)
        );

        let expected = ((1 << 20) as f64 * DiscountTable::default().loop_behavior).floor() as u64;
        assert_eq!(
            estimator.estimate(&Domain::Opaque, &[terminates]),
            SolutionSpace::Bounded(expected)
        );
    }
}
