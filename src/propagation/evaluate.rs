//! Evaluation of constraints, against a resolution or against other constraints.

use crate::structures::constraint::{ConstraintStatus, Evaluator, Refinement, Value};

use super::domain::{Domain, Interval};

/// The most integers of a range to list when evaluating against the range.
const LISTING_LIMIT: u64 = 1024;

/// The values a refinement allows, as far as is known.
enum Candidates {
    Listed(Vec<Value>),
    Integers(Interval),
    Unknown,
}

impl From<&Refinement> for Candidates {
    fn from(refinement: &Refinement) -> Self {
        match refinement {
            Refinement::Value { value } => Candidates::Listed(vec![value.clone()]),
            Refinement::OneOf { values } => Candidates::Listed(values.clone()),
            Refinement::Range { min, max } => Candidates::Integers(Interval::new(*min, *max)),
            Refinement::Type { type_name } => match Domain::from_hint(type_name) {
                Domain::Integer(interval) => Candidates::Integers(interval),
                Domain::Choice(values) => Candidates::Listed(values),
                Domain::Opaque => Candidates::Unknown,
            },
            Refinement::Opaque => Candidates::Unknown,
        }
    }
}

/// Combines the evaluation of each of some values.
fn combine(admissions: impl Iterator<Item = Option<bool>>) -> ConstraintStatus {
    let mut all_true = true;
    let mut all_false = true;
    let mut any = false;
    for admission in admissions {
        any = true;
        match admission {
            Some(true) => all_false = false,
            Some(false) => all_true = false,
            None => {
                all_true = false;
                all_false = false;
            }
        }
    }

    match (any, all_true, all_false) {
        (false, _, _) => ConstraintStatus::Unknown,
        (true, true, _) => ConstraintStatus::Satisfied,
        (true, _, true) => ConstraintStatus::Violated,
        _ => ConstraintStatus::Unknown,
    }
}

impl Evaluator {
    /// Whether the value meets the constraint, if known.
    pub fn admits(&self, value: &Value) -> Option<bool> {
        match self {
            Self::TypeIs { type_name } => Domain::from_hint(type_name).admits(value),
            Self::Range { min, max } => match value {
                Value::Int(int) => Some(Interval::new(*min, *max).contains(*int)),
                _ => Some(false),
            },
            Self::OneOf { values } => Some(values.contains(value)),
            Self::NoneOf { values } => Some(!values.contains(value)),
            Self::Opaque { .. } => None,
        }
    }

    /// The integers allowed by the constraint, if the constraint allows only integers from some interval.
    pub fn interval(&self) -> Option<Interval> {
        match self {
            Self::Range { min, max } => Some(Interval::new(*min, *max)),
            Self::TypeIs { type_name } => Domain::from_hint(type_name).interval(),
            _ => None,
        }
    }

    /// The status of the constraint on a hole resolved with the refinement.
    ///
    /// Satisfied if every value the refinement allows meets the constraint, violated if none do, and otherwise unknown.
    pub fn evaluate(&self, refinement: &Refinement) -> ConstraintStatus {
        match Candidates::from(refinement) {
            Candidates::Listed(values) => combine(values.iter().map(|value| self.admits(value))),

            Candidates::Integers(interval) => {
                if interval.is_empty() {
                    return ConstraintStatus::Unknown;
                }
                if let Some(ints) = interval.values(LISTING_LIMIT) {
                    return combine(ints.into_iter().map(|int| self.admits(&Value::Int(int))));
                }

                match self {
                    Self::Range { .. } | Self::TypeIs { .. } => match self.interval() {
                        Some(allowed) if interval.is_subset_of(&allowed) => {
                            ConstraintStatus::Satisfied
                        }
                        Some(allowed) if interval.is_disjoint_from(&allowed) => {
                            ConstraintStatus::Violated
                        }
                        Some(_) => ConstraintStatus::Unknown,
                        None => match self.conflicts_with(&Evaluator::Range {
                            min: interval.min,
                            max: interval.max,
                        }) {
                            true => ConstraintStatus::Violated,
                            false => ConstraintStatus::Unknown,
                        },
                    },

                    Self::OneOf { values } => match interval.filter(values).next() {
                        None => ConstraintStatus::Violated,
                        Some(_) => ConstraintStatus::Unknown,
                    },

                    Self::NoneOf { values } => match interval.filter(values).next() {
                        None => ConstraintStatus::Satisfied,
                        Some(_) => ConstraintStatus::Unknown,
                    },

                    Self::Opaque { .. } => ConstraintStatus::Unknown,
                }
            }

            Candidates::Unknown => ConstraintStatus::Unknown,
        }
    }

    /// True if no value could meet both constraints.
    ///
    /// Opaque constraints never conflict, and a conflict is only claimed when known.
    pub fn conflicts_with(&self, other: &Evaluator) -> bool {
        match (self, other) {
            (Self::Opaque { .. }, _) | (_, Self::Opaque { .. }) => false,

            (Self::NoneOf { .. }, Self::NoneOf { .. }) => false,

            (Self::OneOf { values }, _) => values
                .iter()
                .all(|value| other.admits(value) == Some(false)),

            (_, Self::OneOf { .. }) => other.conflicts_with(self),

            (Self::TypeIs { type_name: a }, Self::TypeIs { type_name: b }) => {
                Domain::from_hint(a).is_disjoint_from(&Domain::from_hint(b))
            }

            (Self::Range { min, max }, Self::TypeIs { type_name })
            | (Self::TypeIs { type_name }, Self::Range { min, max }) => {
                let range = Interval::new(*min, *max);
                match Domain::from_hint(type_name) {
                    Domain::Integer(interval) => range.is_disjoint_from(&interval),
                    Domain::Choice(values) => range.filter(&values).next().is_none(),
                    Domain::Opaque => false,
                }
            }

            (Self::Range { min: a_min, max: a_max }, Self::Range { min: b_min, max: b_max }) => {
                Interval::new(*a_min, *a_max).is_disjoint_from(&Interval::new(*b_min, *b_max))
            }

            (Self::Range { min, max }, Self::NoneOf { values })
            | (Self::NoneOf { values }, Self::Range { min, max }) => {
                match Interval::new(*min, *max).values(LISTING_LIMIT) {
                    Some(ints) => ints
                        .into_iter()
                        .all(|int| values.contains(&Value::Int(int))),
                    None => false,
                }
            }

            (Self::TypeIs { type_name }, Self::NoneOf { values })
            | (Self::NoneOf { values }, Self::TypeIs { type_name }) => {
                match Domain::from_hint(type_name) {
                    Domain::Choice(choices) => choices.iter().all(|choice| values.contains(choice)),
                    Domain::Integer(interval) => match interval.values(LISTING_LIMIT) {
                        Some(ints) => ints
                            .into_iter()
                            .all(|int| values.contains(&Value::Int(int))),
                        None => false,
                    },
                    Domain::Opaque => false,
                }
            }
        }
    }
}
