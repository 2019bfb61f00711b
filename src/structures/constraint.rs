/*!
Constraints on holes, and resolutions of holes.

A [Constraint] pairs a [kind](ConstraintKind) with a [predicate](Predicate), which holds a description for people and an [evaluator](Evaluator) for the library.
Evaluators are deliberately simple: a type, an integer range, a set of values allowed, a set of values disallowed, or an opaque tag the library cannot evaluate.

A [Resolution] is how a hole was resolved, as a label together with a structured [refinement](Refinement).

```rust
# use otter_plan::structures::constraint::*;
let positive = Constraint::declared(
    ConstraintKind::ReturnValue,
    "returns a positive integer",
    Evaluator::Range { min: Some(1), max: None },
);

assert_eq!(positive.status(), ConstraintStatus::Unknown);
assert_eq!(positive.predicate().evaluator.admits(&Value::Int(0)), Some(false));
```
*/

use serde::{Deserialize, Serialize};

use crate::structures::hole::{HoleId, Relation};

/// The aspect of a hole a constraint bears on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Type,
    ReturnValue,
    LoopBehavior,
    /// Position, or adjacency.
    Position,
    Custom,
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Type => write!(f, "type"),
            Self::ReturnValue => write!(f, "return-value"),
            Self::LoopBehavior => write!(f, "loop-behavior"),
            Self::Position => write!(f, "position"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintStatus {
    Satisfied,
    Violated,
    #[default]
    Unknown,
}

impl std::fmt::Display for ConstraintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Satisfied => write!(f, "satisfied"),
            Self::Violated => write!(f, "violated"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A concrete value some hole may take.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(t) => write!(f, "{t:?}"),
        }
    }
}

/// How a constraint is evaluated.
///
/// Ranges are inclusive, with an absent bound being no bound.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "evaluator", rename_all = "snake_case")]
pub enum Evaluator {
    TypeIs { type_name: String },
    Range { min: Option<i64>, max: Option<i64> },
    OneOf { values: Vec<Value> },
    NoneOf { values: Vec<Value> },
    Opaque { tag: String },
}

/// A description of a constraint, together with an evaluator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub description: String,
    #[serde(flatten)]
    pub evaluator: Evaluator,
}

/// Where a constraint came from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintOrigin {
    /// Given when the hole was registered.
    #[default]
    Declared,

    /// Derived from the resolution of a related hole.
    Derived { from: HoleId, relation: Relation },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    kind: ConstraintKind,
    predicate: Predicate,
    #[serde(default)]
    status: ConstraintStatus,
    #[serde(default)]
    origin: ConstraintOrigin,
}

impl Constraint {
    /// A constraint given alongside a hole.
    pub fn declared(
        kind: ConstraintKind,
        description: impl Into<String>,
        evaluator: Evaluator,
    ) -> Self {
        Constraint {
            kind,
            predicate: Predicate {
                description: description.into(),
                evaluator,
            },
            status: ConstraintStatus::Unknown,
            origin: ConstraintOrigin::Declared,
        }
    }

    /// A constraint derived from the resolution of the hole `from`, related by `relation`.
    pub fn derived(
        kind: ConstraintKind,
        description: impl Into<String>,
        evaluator: Evaluator,
        from: impl Into<HoleId>,
        relation: Relation,
    ) -> Self {
        Constraint {
            origin: ConstraintOrigin::Derived {
                from: from.into(),
                relation,
            },
            ..Self::declared(kind, description, evaluator)
        }
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.predicate.evaluator
    }

    pub fn status(&self) -> ConstraintStatus {
        self.status
    }

    pub fn origin(&self) -> &ConstraintOrigin {
        &self.origin
    }

    pub(crate) fn set_status(&mut self, status: ConstraintStatus) {
        self.status = status;
    }

    /// True if the constraints make the same requirement, regardless of description, status, or origin.
    pub fn same_requirement(&self, other: &Constraint) -> bool {
        self.kind == other.kind && self.predicate.evaluator == other.predicate.evaluator
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} ({})",
            self.kind, self.predicate.description, self.status
        )
    }
}

/// The structured part of a resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "refinement", rename_all = "snake_case")]
pub enum Refinement {
    /// Exactly this value.
    Value { value: Value },

    /// Some integer in this (inclusive) range.
    Range { min: Option<i64>, max: Option<i64> },

    /// Some value of this type.
    Type { type_name: String },

    /// One of these values.
    OneOf { values: Vec<Value> },

    /// Something the library cannot interpret.
    Opaque,
}

/// How a hole was resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub label: String,
    #[serde(flatten)]
    pub refinement: Refinement,
}

impl Resolution {
    pub fn new(label: impl Into<String>, refinement: Refinement) -> Self {
        Resolution {
            label: label.into(),
            refinement,
        }
    }

    /// A resolution to exactly the value, labelled by the value.
    pub fn value(value: Value) -> Self {
        Resolution {
            label: value.to_string(),
            refinement: Refinement::Value { value },
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}
