/*!
Holes: placeholders in a plan which are yet to be resolved.

A hole is registered from a [HoleSpec], with a type hint, some initial constraints, and relations to other holes.
Relations are given by the deriver of the plan, and are never inferred.

The size of the solution space of a hole is a [SolutionSpace], which is either some count or unbounded.
Solution spaces are ordered with every count below unbounded, and serialize as either a number or the string `"unbounded"`.

```rust
# use otter_plan::structures::hole::SolutionSpace;
assert!(SolutionSpace::Bounded(u64::MAX) < SolutionSpace::Unbounded);
assert_eq!(serde_json::to_string(&SolutionSpace::Unbounded).unwrap(), "\"unbounded\"");
assert_eq!(serde_json::to_string(&SolutionSpace::Bounded(5)).unwrap(), "5");
```
*/

use serde::{Deserialize, Serialize};

use crate::structures::constraint::{Constraint, ConstraintStatus, Resolution};

/// The id of a hole.
pub type HoleId = String;

/// A relation between two holes, along which constraints propagate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// The holes stand for the same parameter.
    SameParameter,

    /// The value of one hole flows into the other.
    Dataflow,

    /// The holes are alternatives, e.g. branches of some match.
    SiblingBranch,

    /// The holes are neighbours, e.g. adjacent positions.
    Adjacent,
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SameParameter => write!(f, "same-parameter"),
            Self::Dataflow => write!(f, "dataflow"),
            Self::SiblingBranch => write!(f, "sibling-branch"),
            Self::Adjacent => write!(f, "adjacent"),
        }
    }
}

/// The (estimated) size of a solution space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "SpaceRepr", from = "SpaceRepr")]
pub enum SolutionSpace {
    Bounded(u64),
    Unbounded,
}

impl SolutionSpace {
    pub fn is_bounded(&self) -> bool {
        matches!(self, Self::Bounded(_))
    }

    pub fn count(&self) -> Option<u64> {
        match self {
            Self::Bounded(count) => Some(*count),
            Self::Unbounded => None,
        }
    }

    /// True if the space holds exactly one solution.
    pub fn is_single(&self) -> bool {
        matches!(self, Self::Bounded(1))
    }

    /// True if the space holds at most `threshold` solutions.
    pub fn within(&self, threshold: u64) -> bool {
        match self {
            Self::Bounded(count) => *count <= threshold,
            Self::Unbounded => false,
        }
    }
}

impl std::fmt::Display for SolutionSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bounded(count) => write!(f, "{count}"),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum SpaceRepr {
    Bounded(u64),
    Unbounded(UnboundedTag),
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum UnboundedTag {
    Unbounded,
}

impl From<SolutionSpace> for SpaceRepr {
    fn from(space: SolutionSpace) -> Self {
        match space {
            SolutionSpace::Bounded(count) => SpaceRepr::Bounded(count),
            SolutionSpace::Unbounded => SpaceRepr::Unbounded(UnboundedTag::Unbounded),
        }
    }
}

impl From<SpaceRepr> for SolutionSpace {
    fn from(repr: SpaceRepr) -> Self {
        match repr {
            SpaceRepr::Bounded(count) => SolutionSpace::Bounded(count),
            SpaceRepr::Unbounded(_) => SolutionSpace::Unbounded,
        }
    }
}

/// A relation to some other hole, as given in a spec.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedHole {
    pub hole: HoleId,
    pub relation: Relation,
}

/// A hole, as given by some deriver.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoleSpec {
    pub id: HoleId,

    #[serde(default)]
    pub type_hint: String,

    #[serde(default)]
    pub constraints: Vec<Constraint>,

    #[serde(default)]
    pub related: Vec<RelatedHole>,
}

impl HoleSpec {
    pub fn new(id: impl Into<HoleId>, type_hint: impl Into<String>) -> Self {
        HoleSpec {
            id: id.into(),
            type_hint: type_hint.into(),
            ..Default::default()
        }
    }

    pub fn constrain(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn relate(mut self, hole: impl Into<HoleId>, relation: Relation) -> Self {
        self.related.push(RelatedHole {
            hole: hole.into(),
            relation,
        });
        self
    }
}

/// A registered hole.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Hole {
    pub(crate) id: HoleId,
    pub(crate) type_hint: String,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) estimate: SolutionSpace,
    pub(crate) resolution: Option<Resolution>,
}

impl Hole {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn type_hint(&self) -> &str {
        &self.type_hint
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The current estimate of the size of the solution space of the hole.
    pub fn estimate(&self) -> SolutionSpace {
        self.estimate
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    /// The constraints of the hole with the given status.
    pub fn with_status(&self, status: ConstraintStatus) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .iter()
            .filter(move |constraint| constraint.status() == status)
    }
}
