/*!
Subjects and literals.

A [SubjectId] names some proposition --- the success of a step, the resolution of a hole, or some opaque fact produced by a step.
A [DecisionLiteral] pairs a subject with a polarity.

Literals are written as their subject, prefixed with `-` when negative.
The same representation is used when (de)serializing a literal.

```rust
# use otter_plan::structures::literal::{DecisionLiteral, SubjectId};
let built = DecisionLiteral::new(SubjectId::step_success("fetch"), false);
let read: DecisionLiteral = "-step:fetch:success".parse().unwrap();

assert_eq!(built, read);
assert_eq!(read.negate().to_string(), "step:fetch:success");
```
*/

use std::{collections::HashMap, str::FromStr};

use serde::{Deserialize, Serialize};

/// The identifier of some proposition.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

const STEP_PREFIX: &str = "step:";
const STEP_SUFFIX: &str = ":success";
const HOLE_PREFIX: &str = "hole:";
const HOLE_INFIX: &str = ":resolved_as:";

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        SubjectId(id.into())
    }

    /// The subject of the success of the step with the given id.
    pub fn step_success(step: &str) -> Self {
        SubjectId(format!("{STEP_PREFIX}{step}{STEP_SUFFIX}"))
    }

    /// The subject of a hole being resolved as some choice.
    pub fn hole_resolution(hole: &str, resolved_as: &str) -> Self {
        SubjectId(format!("{HOLE_PREFIX}{hole}{HOLE_INFIX}{resolved_as}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id of the step, if the subject is the success of some step.
    pub fn step_id(&self) -> Option<&str> {
        self.0
            .strip_prefix(STEP_PREFIX)
            .and_then(|rest| rest.strip_suffix(STEP_SUFFIX))
    }

    /// The id of the hole and the choice, if the subject is the resolution of some hole.
    pub fn hole_choice(&self) -> Option<(&str, &str)> {
        self.0
            .strip_prefix(HOLE_PREFIX)
            .and_then(|rest| rest.split_once(HOLE_INFIX))
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(value: &str) -> Self {
        SubjectId(value.to_owned())
    }
}

impl From<String> for SubjectId {
    fn from(value: String) -> Self {
        SubjectId(value)
    }
}

/// A subject paired with a polarity.
///
/// Ordered by subject and then polarity, with negative before positive.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DecisionLiteral {
    subject: SubjectId,
    polarity: bool,
}

impl DecisionLiteral {
    pub fn new(subject: SubjectId, polarity: bool) -> Self {
        DecisionLiteral { subject, polarity }
    }

    pub fn positive(subject: impl Into<SubjectId>) -> Self {
        DecisionLiteral::new(subject.into(), true)
    }

    pub fn negative(subject: impl Into<SubjectId>) -> Self {
        DecisionLiteral::new(subject.into(), false)
    }

    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    pub fn polarity(&self) -> bool {
        self.polarity
    }

    /// The literal with the same subject and opposite polarity.
    pub fn negate(&self) -> Self {
        DecisionLiteral {
            subject: self.subject.clone(),
            polarity: !self.polarity,
        }
    }

    /// Some(true) if the literal holds on the assignment, Some(false) if the negation holds, and None if the subject is unassigned.
    pub fn value_on(&self, assignment: &Assignment) -> Option<bool> {
        assignment
            .get(&self.subject)
            .map(|assigned| assigned.polarity == self.polarity)
    }
}

impl std::fmt::Display for DecisionLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.polarity {
            true => write!(f, "{}", self.subject),
            false => write!(f, "-{}", self.subject),
        }
    }
}

impl FromStr for DecisionLiteral {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (subject, polarity) = match s.strip_prefix('-') {
            Some(rest) => (rest.trim(), false),
            None => (s.trim(), true),
        };
        if subject.is_empty() {
            return Err(format!("no subject in literal '{s}'"));
        }
        Ok(DecisionLiteral::new(SubjectId::from(subject), polarity))
    }
}

impl TryFrom<String> for DecisionLiteral {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DecisionLiteral> for String {
    fn from(value: DecisionLiteral) -> Self {
        value.to_string()
    }
}

/// An assignment of literals to subjects, with at most one literal per subject.
pub type Assignment = HashMap<SubjectId, DecisionLiteral>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_subjects() {
        let subject = SubjectId::step_success("deploy");
        assert_eq!(subject.as_str(), "step:deploy:success");
        assert_eq!(subject.step_id(), Some("deploy"));
        assert_eq!(SubjectId::from("artifact").step_id(), None);
    }

    #[test]
    fn hole_subjects() {
        let subject = SubjectId::hole_resolution("h1", "u8");
        assert_eq!(subject.hole_choice(), Some(("h1", "u8")));
    }

    #[test]
    fn values() {
        let mut assignment = Assignment::default();
        let p = DecisionLiteral::positive("p");
        assignment.insert(p.subject().clone(), p.clone());

        assert_eq!(p.value_on(&assignment), Some(true));
        assert_eq!(p.negate().value_on(&assignment), Some(false));
        assert_eq!(DecisionLiteral::positive("q").value_on(&assignment), None);
    }

    #[test]
    fn empty_literal() {
        assert!("-".parse::<DecisionLiteral>().is_err());
        assert!("".parse::<DecisionLiteral>().is_err());
    }
}
