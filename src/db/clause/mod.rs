/*!
A store of clauses.

Clauses are nogoods: collections of literals which must not all hold together.
The store answers whether some (possibly hypothetical) assignment would trigger a clause, and so be ruled out.

Records of clauses are distinguished by [source](ClauseSource):
- Rules are added when a plan is loaded, and encode the effects of steps.
  For example, a step `A` producing `p` gives the rule {step:A:success, -p}.
- Learned clauses are added by conflict analysis, or imported from some other execution.

Clauses are immutable once stored, and are only removed through subsumption.
A clause is discarded at the time it would be stored if some stored clause subsumes it, and otherwise each stored clause it subsumes is removed as it is stored.

Fields of the store are private to ensure the use of methods which may be needed to uphold invariants.
*/

mod callbacks;
pub use callbacks::CallbackOnClause;
mod store;
pub use store::ClauseOk;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::{
    config::Config,
    db::{ClauseKey, LearnedIndex, RuleIndex},
    misc::log::targets::{self},
    structures::{
        clause::Clause,
        literal::{Assignment, DecisionLiteral},
        step::StepId,
    },
    types::err::{self},
};

/// The source of a stored clause.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClauseSource {
    /// A rule derived from the effects of the step.
    Rule(StepId),

    /// A clause learned from a failure of the step.
    Failure(StepId),

    /// A clause imported from outside of the execution.
    Imported,
}

/// A clause, together with the key and source of the clause.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredClause {
    key: ClauseKey,
    clause: Clause,
    source: ClauseSource,
}

impl StoredClause {
    pub fn key(&self) -> ClauseKey {
        self.key
    }

    pub fn clause(&self) -> &Clause {
        &self.clause
    }

    pub fn source(&self) -> &ClauseSource {
        &self.source
    }
}

/// Clause store specific configuration parameters.
#[derive(Clone, Debug)]
pub struct ClauseStoreConfig {
    pub subsumption: bool,
}

impl Default for ClauseStoreConfig {
    fn default() -> Self {
        ClauseStoreConfig {
            subsumption: crate::config::defaults::SUBSUMPTION,
        }
    }
}

/// A store of clauses.
#[derive(Default, Serialize, Deserialize)]
pub struct ClauseStore {
    #[serde(skip)]
    config: ClauseStoreConfig,

    /// Rules.
    rules: SlotMap<RuleIndex, StoredClause>,

    /// Learned (or imported) clauses.
    learned: SlotMap<LearnedIndex, StoredClause>,

    /// Keys, in the order clauses were stored.
    order: Vec<ClauseKey>,

    /// For each literal, the keys of clauses containing the literal, in the order clauses were stored.
    #[serde(skip)]
    occurrences: HashMap<DecisionLiteral, Vec<ClauseKey>>,

    /// Learned clauses are passed in.
    #[serde(skip)]
    callback_learned: Option<Box<CallbackOnClause>>,
}

impl ClauseStore {
    /// A new [ClauseStore] with local configuration options derived from `config`.
    pub fn new(config: &Config) -> Self {
        ClauseStore {
            config: ClauseStoreConfig {
                subsumption: config.subsumption.value,
            },
            ..Default::default()
        }
    }

    pub(crate) fn set_config(&mut self, config: &Config) {
        self.config.subsumption = config.subsumption.value;
    }

    /// Rebuilds the occurrence index from the stored clauses, e.g. after deserializing a store.
    pub(crate) fn rebuild_index(&mut self) {
        self.occurrences.clear();
        for index in 0..self.order.len() {
            let key = self.order[index];
            let literals = match self.get(key) {
                Ok(stored) => stored.clause.literal_slice().to_vec(),
                Err(_) => {
                    log::error!(target: targets::CLAUSE_STORE, "Order lists a missing clause: {key}");
                    continue;
                }
            };
            for literal in literals {
                self.occurrences.entry(literal).or_default().push(key);
            }
        }
    }

    pub fn get(&self, key: ClauseKey) -> Result<&StoredClause, err::ClauseStoreError> {
        let stored = match key {
            ClauseKey::Rule(index) => self.rules.get(index),
            ClauseKey::Learned(index) => self.learned.get(index),
        };
        stored.ok_or(err::ClauseStoreError::Missing)
    }

    /// The first stored clause triggered by the assignment, if any.
    ///
    /// That is, the first clause each literal of which holds on the assignment.
    pub fn check(&self, assignment: &Assignment) -> Option<ClauseKey> {
        self.iter()
            .find(|stored| stored.clause.triggered_by(assignment))
            .map(|stored| stored.key)
    }

    /// The first stored clause containing `extra` which is triggered by the assignment extended with `extra`, if any.
    ///
    /// Only clauses containing `extra` are inspected, and so if the assignment already triggers some clause the result may differ from [check](ClauseStore::check).
    pub fn check_with(
        &self,
        assignment: &Assignment,
        extra: &DecisionLiteral,
    ) -> Option<ClauseKey> {
        let candidates = self.occurrences.get(extra)?;
        candidates.iter().copied().find(|key| match self.get(*key) {
            Ok(stored) => stored.clause.triggered_by_extension(assignment, extra),
            Err(_) => false,
        })
    }

    /// The first stored clause containing some literal of `extras` which is triggered by the assignment extended with `extras`, if any.
    pub fn check_with_all(
        &self,
        assignment: &Assignment,
        extras: &[DecisionLiteral],
    ) -> Option<ClauseKey> {
        extras
            .iter()
            .filter_map(|extra| self.occurrences.get(extra))
            .flatten()
            .copied()
            .find(|key| match self.get(*key) {
                Ok(stored) => stored.clause.triggered_by_extensions(assignment, extras),
                Err(_) => false,
            })
    }

    /// Stored clauses, in the order stored.
    pub fn iter(&self) -> impl Iterator<Item = &StoredClause> {
        self.order.iter().filter_map(|key| self.get(*key).ok())
    }

    /// Learned and imported clauses, in the order stored.
    pub fn learned_clauses(&self) -> impl Iterator<Item = &Clause> {
        self.iter()
            .filter(|stored| stored.key.is_learned())
            .map(|stored| &stored.clause)
    }

    /// The count of all clauses in the store.
    pub fn size(&self) -> usize {
        self.rules.len() + self.learned.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn learned_count(&self) -> usize {
        self.learned.len()
    }
}
