/*!
Clauses, read as nogoods.

A clause is a collection of literals which must not all hold together.
So, a clause is *triggered* by an assignment on which each of its literals holds, and the purpose of storing a clause is to rule out any assignment which would trigger it.

Read as a disjunction, the clause ¬l₁ ∨ … ∨ ¬lₙ is the negation of the collection of literals.
The library stores the collection rather than the negation, as checks are made against the literals which would be assigned.

Clauses are canonical on construction: literals are sorted and duplicates are removed.

```rust
# use otter_plan::structures::clause::Clause;
# use otter_plan::structures::literal::DecisionLiteral;
let short = Clause::new([DecisionLiteral::positive("p")]);
let long = Clause::new([
    DecisionLiteral::positive("q"),
    DecisionLiteral::positive("p"),
    DecisionLiteral::positive("q"),
]);

assert_eq!(long.size(), 2);
assert!(short.subsumes(&long));
assert!(!long.subsumes(&short));
```
*/

use serde::{Deserialize, Serialize};

use crate::structures::literal::{Assignment, DecisionLiteral};

/// A canonical collection of literals which must not all hold together.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clause {
    literals: Vec<DecisionLiteral>,
}

impl Clause {
    pub fn new(literals: impl IntoIterator<Item = DecisionLiteral>) -> Self {
        let mut literals = literals.into_iter().collect::<Vec<_>>();
        literals.sort_unstable();
        literals.dedup();
        Clause { literals }
    }

    pub fn literals(&self) -> impl Iterator<Item = &DecisionLiteral> {
        self.literals.iter()
    }

    pub fn literal_slice(&self) -> &[DecisionLiteral] {
        &self.literals
    }

    pub fn size(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn contains(&self, literal: &DecisionLiteral) -> bool {
        self.literals.binary_search(literal).is_ok()
    }

    /// True if the clause contains some literal together with its negation.
    ///
    /// As literals are sorted by subject first, opposed literals are adjacent.
    pub fn is_tautology(&self) -> bool {
        self.literals
            .windows(2)
            .any(|pair| pair[0].subject() == pair[1].subject())
    }

    /// True if every literal of the clause is a literal of `other`.
    ///
    /// If so, any assignment triggering `other` also triggers the clause, and `other` is redundant.
    pub fn subsumes(&self, other: &Clause) -> bool {
        self.size() <= other.size() && self.literals.iter().all(|l| other.contains(l))
    }

    /// True if every literal of the clause holds on the assignment.
    pub fn triggered_by(&self, assignment: &Assignment) -> bool {
        self.literals
            .iter()
            .all(|literal| literal.value_on(assignment) == Some(true))
    }

    /// As [triggered_by](Clause::triggered_by), with the assignment extended by `extra`.
    ///
    /// If the subject of `extra` is assigned, the extension takes priority.
    pub fn triggered_by_extension(&self, assignment: &Assignment, extra: &DecisionLiteral) -> bool {
        self.triggered_by_extensions(assignment, std::slice::from_ref(extra))
    }

    /// As [triggered_by_extension](Clause::triggered_by_extension), with each literal of `extras` as an extension.
    pub fn triggered_by_extensions(&self, assignment: &Assignment, extras: &[DecisionLiteral]) -> bool {
        self.literals.iter().all(|literal| {
            match extras.iter().find(|extra| extra.subject() == literal.subject()) {
                Some(extra) => literal.polarity() == extra.polarity(),
                None => literal.value_on(assignment) == Some(true),
            }
        })
    }

    pub fn as_string(&self) -> String {
        let literals = self
            .literals
            .iter()
            .map(|literal| literal.to_string())
            .collect::<Vec<_>>();
        format!("{{{}}}", literals.join(", "))
    }
}

impl std::fmt::Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl FromIterator<DecisionLiteral> for Clause {
    fn from_iter<T: IntoIterator<Item = DecisionLiteral>>(iter: T) -> Self {
        Clause::new(iter)
    }
}
