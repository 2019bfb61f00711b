/*!
A record of decisions and their observed consequences, by decision level.

Each node of the graph records a [literal](DecisionLiteral) at some decision level, together with:
- An antecedent, the clause which forced the literal, if any.
- Premises, the nodes whose literals, together with the antecedent, forced the literal.
  These are the edges of the graph.

A node without an antecedent or premises is a decision.

Nodes are held in an arena, indexed by generation-tagged [keys](NodeKey), and the keys of the nodes at each level are held in order of record.
So, removing the nodes above some level is a matter of popping whole levels, and a key to a removed node will never lead to some other node.

# Example

```rust
# use otter_plan::db::implication::ImplicationGraph;
# use otter_plan::structures::literal::DecisionLiteral;
let mut graph = ImplicationGraph::default();

let a = DecisionLiteral::positive("step:A:success");
let a_key = graph.record(a, 1, None, vec![]).unwrap();

let p = DecisionLiteral::positive("p");
graph.record(p.clone(), 1, None, vec![a_key]).unwrap();

assert_eq!(graph.level_of(p.subject()), Some(1));
assert!(graph.record(p, 1, None, vec![]).is_err());

graph.truncate(0);
assert_eq!(graph.top_level(), 0);
assert!(graph.node(a_key).is_none());
```

Conflicts are recorded apart from the other nodes, as the literal attempted by a failed step is never assigned.
See [ImplicationGraph::record_conflict] and [ImplicationGraph::conflict_cause].
*/

mod analysis;
pub use analysis::backjump_level;

use std::collections::HashMap;

use petgraph::{dot::Dot, graph::DiGraph};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::{
    db::{ClauseKey, DecisionLevelIndex, NodeKey},
    misc::log::targets::{self},
    structures::literal::{DecisionLiteral, SubjectId},
    types::err::{self},
};

/// A literal, at some level, and the reason for the literal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImplicationNode {
    literal: DecisionLiteral,
    level: DecisionLevelIndex,
    /// The position of the node within its level.
    index: usize,
    antecedent: Option<ClauseKey>,
    premises: Vec<NodeKey>,
}

impl ImplicationNode {
    pub fn literal(&self) -> &DecisionLiteral {
        &self.literal
    }

    pub fn level(&self) -> DecisionLevelIndex {
        self.level
    }

    pub fn antecedent(&self) -> Option<ClauseKey> {
        self.antecedent
    }

    pub fn premises(&self) -> &[NodeKey] {
        &self.premises
    }

    /// True if the node records a decision, false if the node records an implication.
    pub fn is_decision(&self) -> bool {
        self.antecedent.is_none() && self.premises.is_empty()
    }
}

/// The record of a failed attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// The literal whose assignment was attempted.
    pub attempt: DecisionLiteral,

    /// The level at which the attempt failed.
    pub level: DecisionLevelIndex,

    /// The nodes whose literals allowed the attempt.
    pub premises: Vec<NodeKey>,

    /// The reason given for the failure.
    pub reason: String,
}

/// The implication graph.
#[derive(Serialize, Deserialize)]
pub struct ImplicationGraph {
    nodes: SlotMap<NodeKey, ImplicationNode>,

    /// The keys to nodes at each level, in order of record.
    /// Level zero is always present.
    levels: Vec<Vec<NodeKey>>,

    /// The node of each assigned subject.
    subjects: HashMap<SubjectId, NodeKey>,

    /// A conflict awaiting analysis.
    conflict: Option<Conflict>,
}

impl Default for ImplicationGraph {
    fn default() -> Self {
        ImplicationGraph {
            nodes: SlotMap::default(),
            levels: vec![Vec::default()],
            subjects: HashMap::default(),
            conflict: None,
        }
    }
}

impl ImplicationGraph {
    /// Records a literal at the given level.
    ///
    /// A level may be at most one above the top level, in which case the level is opened.
    ///
    /// # Errors
    /// - If the subject of the literal already has a node.
    /// - If the level skips past the next level.
    /// - If some premise is not a node of the graph.
    pub fn record(
        &mut self,
        literal: DecisionLiteral,
        level: DecisionLevelIndex,
        antecedent: Option<ClauseKey>,
        premises: Vec<NodeKey>,
    ) -> Result<NodeKey, err::ImplicationError> {
        if self.subjects.contains_key(literal.subject()) {
            log::error!(target: targets::IMPLICATION, "{} is already assigned", literal.subject());
            return Err(err::ImplicationError::AlreadyAssigned(
                literal.subject().clone(),
            ));
        }

        let top = self.top_level();
        if level > top + 1 {
            return Err(err::ImplicationError::LevelSkipped { level, top });
        }

        if premises.iter().any(|key| !self.nodes.contains_key(*key)) {
            return Err(err::ImplicationError::MissingPremise);
        }

        if level == top + 1 {
            self.levels.push(Vec::default());
        }

        let level_nodes = &mut self.levels[level as usize];
        let subject = literal.subject().clone();
        let key = self.nodes.insert(ImplicationNode {
            literal,
            level,
            index: level_nodes.len(),
            antecedent,
            premises,
        });
        level_nodes.push(key);
        self.subjects.insert(subject, key);

        if let Some(node) = self.nodes.get(key) {
            match node.antecedent {
                Some(clause) => log::info!(target: targets::IMPLICATION, "Implication {} @ {level} from {clause}", node.literal),
                None if node.is_decision() => log::info!(target: targets::IMPLICATION, "Decision {} @ {level}", node.literal),
                None => log::info!(target: targets::IMPLICATION, "Implication {} @ {level}", node.literal),
            }
        }

        Ok(key)
    }

    /// Records a conflict, to be analysed by [conflict_cause](ImplicationGraph::conflict_cause).
    pub fn record_conflict(&mut self, conflict: Conflict) -> Result<(), err::ImplicationError> {
        if self.conflict.is_some() {
            return Err(err::ImplicationError::ConflictPending);
        }
        if conflict
            .premises
            .iter()
            .any(|key| !self.nodes.contains_key(*key))
        {
            return Err(err::ImplicationError::MissingPremise);
        }

        log::info!(target: targets::IMPLICATION, "Conflict on {} @ {}: {}", conflict.attempt, conflict.level, conflict.reason);
        self.conflict = Some(conflict);
        Ok(())
    }

    /// The conflict awaiting analysis, if any.
    pub fn conflict(&self) -> Option<&Conflict> {
        self.conflict.as_ref()
    }

    /// Removes every node above the given level.
    ///
    /// A pending conflict above the level is removed as well.
    pub fn truncate(&mut self, level: DecisionLevelIndex) {
        while self.top_level() > level {
            if let Some(removed) = self.levels.pop() {
                for key in removed {
                    if let Some(node) = self.nodes.remove(key) {
                        self.subjects.remove(node.literal.subject());
                    }
                }
            }
        }

        if self
            .conflict
            .as_ref()
            .is_some_and(|conflict| conflict.level > level)
        {
            self.conflict = None;
        }
    }

    /// The highest level containing some record, or opened by some record.
    pub fn top_level(&self) -> DecisionLevelIndex {
        (self.levels.len() as DecisionLevelIndex).saturating_sub(1)
    }

    /// The level of the node of the subject, if the subject has a node.
    pub fn level_of(&self, subject: &SubjectId) -> Option<DecisionLevelIndex> {
        self.node_of(subject).map(|node| node.level)
    }

    /// The key to the node of the subject, if the subject has a node.
    pub fn key_of(&self, subject: &SubjectId) -> Option<NodeKey> {
        self.subjects.get(subject).copied()
    }

    pub fn node_of(&self, subject: &SubjectId) -> Option<&ImplicationNode> {
        self.key_of(subject).and_then(|key| self.nodes.get(key))
    }

    pub fn node(&self, key: NodeKey) -> Option<&ImplicationNode> {
        self.nodes.get(key)
    }

    /// The decision made at the level, if any.
    ///
    /// The decision, if present, is always the first record of a level (other than level zero).
    pub fn decision_at(&self, level: DecisionLevelIndex) -> Option<&ImplicationNode> {
        self.levels
            .get(level as usize)?
            .first()
            .and_then(|key| self.nodes.get(*key))
            .filter(|node| node.is_decision())
    }

    /// The nodes of a level, in order of record.
    pub fn level_nodes(
        &self,
        level: DecisionLevelIndex,
    ) -> impl Iterator<Item = &ImplicationNode> + '_ {
        self.levels
            .get(level as usize)
            .into_iter()
            .flatten()
            .filter_map(|key| self.nodes.get(*key))
    }

    /// A count of all nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// A rendering of the graph in the Graphviz dot language.
    ///
    /// Each node is labelled with its literal and level, and each edge from a premise with the antecedent of the implication, if any.
    /// A pending conflict is included as a node labelled with the reason for the conflict.
    pub fn as_dot(&self) -> String {
        let mut graph: DiGraph<String, String> = DiGraph::new();
        let mut indicies = HashMap::new();

        for level in &self.levels {
            for key in level {
                if let Some(node) = self.nodes.get(*key) {
                    let index = graph.add_node(format!("{} @ {}", node.literal, node.level));
                    indicies.insert(*key, index);
                }
            }
        }

        for (key, node) in &self.nodes {
            let Some(&to) = indicies.get(&key) else {
                continue;
            };
            let label = node.antecedent.map(|clause| clause.to_string()).unwrap_or_default();
            for premise in &node.premises {
                if let Some(&from) = indicies.get(premise) {
                    graph.add_edge(from, to, label.clone());
                }
            }
        }

        if let Some(conflict) = &self.conflict {
            let to = graph.add_node(format!(
                "{} @ {} ({})",
                conflict.attempt, conflict.level, conflict.reason
            ));
            for premise in &conflict.premises {
                if let Some(&from) = indicies.get(premise) {
                    graph.add_edge(from, to, "conflict".to_string());
                }
            }
        }

        format!("{}", Dot::new(&graph))
    }
}
