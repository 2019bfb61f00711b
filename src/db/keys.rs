use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, Key};

new_key_type! {
    /// The index to a rule in the clause store.
    pub struct RuleIndex;

    /// The index to a learned clause in the clause store.
    pub struct LearnedIndex;

    /// The key to a node of the implication graph.
    pub struct NodeKey;

    /// The key to a hole of a refinement context.
    pub struct HoleKey;
}

/// A key to access a clause stored in the clause store.
///
/// Within the clause store clauses are stored in slot maps, and keys contain the index to the clause together with a generation to distinguish reuse of the same slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClauseKey {
    /// The key to a rule, derived from the effects of a step.
    Rule(RuleIndex),

    /// The key to a clause learned from a failure.
    Learned(LearnedIndex),
}

impl ClauseKey {
    pub fn is_learned(&self) -> bool {
        matches!(self, Self::Learned(_))
    }
}

impl std::fmt::Display for ClauseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rule(key) => write!(f, "Rule({:?})", key.data()),
            Self::Learned(key) => write!(f, "Learned({:?})", key.data()),
        }
    }
}
