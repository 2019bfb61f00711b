use crate::{
    db::ClauseKey,
    misc::log::targets::{self},
    structures::clause::Clause,
    types::err::{self},
};

use super::{ClauseSource, ClauseStore, StoredClause};

/// Ok results when adding a clause to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClauseOk {
    /// The clause was added to the store, with the given key.
    Added(ClauseKey),

    /// The clause was subsumed by the clause with the given key (and so was not added to the store).
    Subsumed(ClauseKey),
}

impl ClauseOk {
    /// The key to the clause added, or to the subsuming clause.
    pub fn key(&self) -> ClauseKey {
        match self {
            Self::Added(key) | Self::Subsumed(key) => *key,
        }
    }
}

/// Methods for storing clauses.
///
/// As key generation is local, keys are only issued by these methods.
impl ClauseStore {
    /// Stores a clause, unless the clause is subsumed by some stored clause.
    ///
    /// Any stored clause which the clause subsumes is removed, and so no stored clause is a strict superset of another.
    ///
    /// ```rust
    /// # use otter_plan::config::Config;
    /// # use otter_plan::db::clause::{ClauseOk, ClauseSource, ClauseStore};
    /// # use otter_plan::structures::{clause::Clause, literal::DecisionLiteral};
    /// let mut store = ClauseStore::new(&Config::default());
    /// let p = DecisionLiteral::positive("p");
    /// let q = DecisionLiteral::positive("q");
    ///
    /// let short = store.add(Clause::new([p.clone()]), ClauseSource::Imported).unwrap();
    /// let long = store.add(Clause::new([p, q]), ClauseSource::Imported).unwrap();
    ///
    /// assert_eq!(long, ClauseOk::Subsumed(short.key()));
    /// assert_eq!(store.size(), 1);
    /// ```
    ///
    /// Removed keys no longer lead to a clause, though they may remain as antecedents in an implication graph.
    ///
    /// Any instance of storing a clause should use this method, as it maintains the occurrence index.
    pub fn add(
        &mut self,
        clause: Clause,
        source: ClauseSource,
    ) -> Result<ClauseOk, err::ClauseStoreError> {
        if clause.is_empty() {
            log::error!(target: targets::CLAUSE_STORE, "Attempt to store an empty clause");
            return Err(err::ClauseStoreError::EmptyClause);
        }

        if clause.is_tautology() {
            log::error!(target: targets::CLAUSE_STORE, "Attempt to store a tautology: {clause}");
            return Err(err::ClauseStoreError::Tautology);
        }

        if self.config.subsumption {
            if let Some(subsuming) = self.subsuming_key(&clause) {
                log::info!(target: targets::CLAUSE_STORE, "{clause} subsumed by {subsuming}");
                return Ok(ClauseOk::Subsumed(subsuming));
            }

            for removed in self.subsumed_keys(&clause) {
                self.remove(removed);
                log::info!(target: targets::CLAUSE_STORE, "{removed} removed, as subsumed by {clause}");
            }
        }

        let key = match source {
            ClauseSource::Rule(_) => {
                let index = self.rules.insert_with_key(|index| StoredClause {
                    key: ClauseKey::Rule(index),
                    clause: clause.clone(),
                    source: source.clone(),
                });
                ClauseKey::Rule(index)
            }

            ClauseSource::Failure(_) | ClauseSource::Imported => {
                let index = self.learned.insert_with_key(|index| StoredClause {
                    key: ClauseKey::Learned(index),
                    clause: clause.clone(),
                    source: source.clone(),
                });
                ClauseKey::Learned(index)
            }
        };

        self.order.push(key);
        for literal in clause.literals() {
            self.occurrences
                .entry(literal.clone())
                .or_default()
                .push(key);
        }

        log::info!(target: targets::CLAUSE_STORE, "Stored {key}: {clause}");

        if key.is_learned() && self.callback_learned.is_some() {
            if let Ok(stored) = self.get(key) {
                let stored = stored.clone();
                self.make_callback_learned(&stored);
            }
        }

        Ok(ClauseOk::Added(key))
    }

    /// The key of the first stored clause which subsumes `clause`, if any.
    ///
    /// Any subsuming clause contains each of its literals, and so in particular its first literal, which is a literal of `clause`.
    /// So, it is enough to inspect the clauses whose first literal is some literal of `clause`.
    fn subsuming_key(&self, clause: &Clause) -> Option<ClauseKey> {
        for literal in clause.literals() {
            let Some(candidates) = self.occurrences.get(literal) else {
                continue;
            };
            for key in candidates {
                let Ok(stored) = self.get(*key) else {
                    continue;
                };
                if stored.clause.literal_slice().first() == Some(literal)
                    && stored.clause.subsumes(clause)
                {
                    return Some(*key);
                }
            }
        }
        None
    }

    /// The keys of stored clauses which `clause` subsumes, in the order stored.
    ///
    /// Any such clause contains each literal of `clause`, and so in particular its first literal.
    fn subsumed_keys(&self, clause: &Clause) -> Vec<ClauseKey> {
        let Some(first) = clause.literal_slice().first() else {
            return Vec::default();
        };
        let Some(candidates) = self.occurrences.get(first) else {
            return Vec::default();
        };
        candidates
            .iter()
            .copied()
            .filter(|key| match self.get(*key) {
                Ok(stored) => clause.subsumes(&stored.clause),
                Err(_) => false,
            })
            .collect()
    }

    /// Removes the clause with the given key, together with each record of the key.
    fn remove(&mut self, key: ClauseKey) -> Option<StoredClause> {
        let stored = match key {
            ClauseKey::Rule(index) => self.rules.remove(index),
            ClauseKey::Learned(index) => self.learned.remove(index),
        }?;

        self.order.retain(|ordered| *ordered != key);
        for literal in stored.clause.literals() {
            if let Some(keys) = self.occurrences.get_mut(literal) {
                keys.retain(|occurrence| *occurrence != key);
                if keys.is_empty() {
                    self.occurrences.remove(literal);
                }
            }
        }

        Some(stored)
    }
}
