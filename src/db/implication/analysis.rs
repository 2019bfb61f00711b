use std::collections::{BTreeMap, HashSet};

use crate::{
    config::StoppingCriteria,
    db::{DecisionLevelIndex, NodeKey},
    misc::log::targets::{self},
    structures::{
        clause::Clause,
        literal::{DecisionLiteral, SubjectId},
    },
    types::err::{self},
};

use super::ImplicationGraph;

impl ImplicationGraph {
    /// Analyses the recorded conflict on the subject, returning a clause which rules out the attempt together with the level to backjump to.
    ///
    /// The premises of the conflict are resolved backwards through the graph:
    /// - Literals at level zero are never part of the clause.
    /// - Literals of levels below the conflict level are replaced by the decisions they descend from.
    /// - With [StoppingCriteria::FirstUIP], literals of the conflict level are resolved, most recent first, until a single literal of the level remains.
    ///   With [StoppingCriteria::None], these are also replaced by the decisions they descend from.
    ///
    /// Here, the conflict level is the highest level of any premise.
    ///
    /// The clause is the resulting literals together with the attempted literal, and the backjump level is the second highest level of a literal in the clause, with the attempt at the level of the conflict.
    /// For a unit clause, the backjump level is zero.
    ///
    /// The conflict is consumed by the analysis.
    pub fn conflict_cause(
        &mut self,
        failing_subject: &SubjectId,
        criteria: StoppingCriteria,
    ) -> Result<(Clause, DecisionLevelIndex), err::ImplicationError> {
        let conflict = match self.conflict.take() {
            Some(conflict) if conflict.attempt.subject() == failing_subject => conflict,
            other => {
                self.conflict = other;
                return Err(err::ImplicationError::NoConflict(failing_subject.clone()));
            }
        };

        let mut conflict_level = 0;
        for key in &conflict.premises {
            let node = self
                .nodes
                .get(*key)
                .ok_or(err::ImplicationError::MissingPremise)?;
            conflict_level = std::cmp::max(conflict_level, node.level);
        }

        let mut seen: HashSet<NodeKey> = HashSet::default();
        let mut stack: Vec<NodeKey> = conflict.premises.clone();
        let mut frontier: BTreeMap<usize, NodeKey> = BTreeMap::default();
        let mut collected: Vec<(DecisionLiteral, DecisionLevelIndex)> = Vec::default();

        loop {
            while let Some(key) = stack.pop() {
                if !seen.insert(key) {
                    continue;
                }
                let node = self
                    .nodes
                    .get(key)
                    .ok_or(err::ImplicationError::MissingPremise)?;

                match node.level {
                    0 => {}

                    level
                        if level == conflict_level
                            && matches!(criteria, StoppingCriteria::FirstUIP) =>
                    {
                        frontier.insert(node.index, key);
                    }

                    level => match node.is_decision() {
                        true => collected.push((node.literal.clone(), level)),
                        false => stack.extend(node.premises.iter().copied()),
                    },
                }
            }

            if frontier.len() <= 1 {
                break;
            }

            // Resolve the most recent literal of the conflict level.
            let Some((_, key)) = frontier.pop_last() else {
                break;
            };
            let node = self
                .nodes
                .get(key)
                .ok_or(err::ImplicationError::MissingPremise)?;
            log::trace!(target: targets::ANALYSIS, "Resolving on {}", node.literal);

            match node.is_decision() {
                true => collected.push((node.literal.clone(), node.level)),
                false => stack.extend(node.premises.iter().copied()),
            }
        }

        for key in frontier.values() {
            if let Some(node) = self.nodes.get(*key) {
                collected.push((node.literal.clone(), node.level));
            }
        }

        let backjump_level = backjump_level(
            collected
                .iter()
                .map(|(_, level)| *level)
                .chain(std::iter::once(conflict.level)),
        );

        let clause = collected
            .into_iter()
            .map(|(literal, _)| literal)
            .chain(std::iter::once(conflict.attempt))
            .collect::<Clause>();

        log::info!(target: targets::ANALYSIS, "Learnt {clause}, backjump to {backjump_level}");
        Ok((clause, backjump_level))
    }
}

/// The second highest level of the given levels, counting repetitions, or zero if there is at most one level.
pub fn backjump_level(levels: impl Iterator<Item = DecisionLevelIndex>) -> DecisionLevelIndex {
    let mut top_two = (None, None);
    for level in levels {
        match top_two {
            (_, None) => top_two.1 = Some(level),
            (_, Some(top)) if level > top => {
                top_two.0 = top_two.1;
                top_two.1 = Some(level);
            }
            (None, _) => top_two.0 = Some(level),
            (Some(second), _) if level > second => top_two.0 = Some(level),
            _ => {}
        }
    }

    match top_two {
        (None, _) => 0,
        (Some(second_to_top), _) => second_to_top,
    }
}
