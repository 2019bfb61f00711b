use otter_plan::{
    config::{Config, StoppingCriteria},
    db::{
        clause::{ClauseSource, ClauseStore},
        implication::{Conflict, ImplicationGraph},
        ClauseKey,
    },
    structures::{clause::Clause, literal::DecisionLiteral},
    types::err::ImplicationError,
};

fn literal(s: &str) -> DecisionLiteral {
    s.parse().unwrap()
}

/// Some key, to stand as the antecedent of implications.
fn some_key() -> ClauseKey {
    let mut store = ClauseStore::new(&Config::default());
    store
        .add(Clause::new([literal("rule")]), ClauseSource::Imported)
        .unwrap()
        .key()
}

mod record {
    use super::*;

    #[test]
    fn levels() {
        let mut graph = ImplicationGraph::default();
        graph.record(literal("fact"), 0, None, vec![]).unwrap();

        assert_eq!(
            graph.record(literal("a"), 2, None, vec![]),
            Err(ImplicationError::LevelSkipped { level: 2, top: 0 })
        );

        let a = graph.record(literal("a"), 1, None, vec![]).unwrap();
        graph
            .record(literal("p"), 1, Some(some_key()), vec![a])
            .unwrap();

        assert_eq!(graph.top_level(), 1);
        assert_eq!(graph.decision_at(1).unwrap().literal(), &literal("a"));
        assert_eq!(graph.level_nodes(1).count(), 2);
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn already_assigned() {
        let mut graph = ImplicationGraph::default();
        graph.record(literal("a"), 0, None, vec![]).unwrap();

        assert!(matches!(
            graph.record(literal("-a"), 0, None, vec![]),
            Err(ImplicationError::AlreadyAssigned(_))
        ));
    }

    #[test]
    fn stale_premise() {
        let mut graph = ImplicationGraph::default();
        let a = graph.record(literal("a"), 1, None, vec![]).unwrap();
        graph.truncate(0);

        graph.record(literal("b"), 1, None, vec![]).unwrap();
        assert_eq!(
            graph.record(literal("p"), 1, Some(some_key()), vec![a]),
            Err(ImplicationError::MissingPremise)
        );
    }

    #[test]
    fn truncate() {
        let mut graph = ImplicationGraph::default();
        let a = graph.record(literal("a"), 1, None, vec![]).unwrap();
        let b = graph.record(literal("b"), 2, None, vec![]).unwrap();
        graph
            .record(literal("q"), 2, Some(some_key()), vec![b])
            .unwrap();

        graph.truncate(1);
        assert_eq!(graph.top_level(), 1);
        assert!(graph.node(a).is_some());
        assert!(graph.node(b).is_none());
        assert_eq!(graph.key_of(literal("q").subject()), None);

        // The subject is free to be recorded again.
        graph.record(literal("-b"), 1, None, vec![]).unwrap();
    }
}

mod analysis {
    use super::*;

    /// a @ 1 gives p, b @ 2 gives q and r from q, and a step requiring p and r fails at level 2.
    fn chain() -> ImplicationGraph {
        let key = some_key();
        let mut graph = ImplicationGraph::default();
        let a = graph.record(literal("a"), 1, None, vec![]).unwrap();
        let p = graph.record(literal("p"), 1, Some(key), vec![a]).unwrap();
        let b = graph.record(literal("b"), 2, None, vec![]).unwrap();
        let q = graph.record(literal("q"), 2, Some(key), vec![b]).unwrap();
        let r = graph.record(literal("r"), 2, Some(key), vec![q]).unwrap();

        graph
            .record_conflict(Conflict {
                attempt: literal("step:S:success"),
                level: 2,
                premises: vec![p, r],
                reason: "failed".to_string(),
            })
            .unwrap();
        graph
    }

    #[test]
    fn first_uip() {
        let mut graph = chain();
        let (clause, level) = graph
            .conflict_cause(literal("step:S:success").subject(), StoppingCriteria::FirstUIP)
            .unwrap();

        assert_eq!(
            clause,
            Clause::new([literal("a"), literal("r"), literal("step:S:success")])
        );
        assert_eq!(level, 2);
        assert!(graph.conflict().is_none());
    }

    #[test]
    fn decisions_only() {
        let mut graph = chain();
        let (clause, level) = graph
            .conflict_cause(literal("step:S:success").subject(), StoppingCriteria::None)
            .unwrap();

        assert_eq!(
            clause,
            Clause::new([literal("a"), literal("b"), literal("step:S:success")])
        );
        assert_eq!(level, 2);
    }

    #[test]
    fn first_uip_resolves_within_level() {
        let key = some_key();
        let mut graph = ImplicationGraph::default();
        let a = graph.record(literal("a"), 1, None, vec![]).unwrap();
        let b = graph.record(literal("b"), 2, None, vec![]).unwrap();
        let q = graph.record(literal("q"), 2, Some(key), vec![b]).unwrap();
        let r = graph.record(literal("r"), 2, Some(key), vec![b]).unwrap();

        graph
            .record_conflict(Conflict {
                attempt: literal("step:S:success"),
                level: 2,
                premises: vec![a, q, r],
                reason: String::default(),
            })
            .unwrap();

        // Both q and r rest on b, which is the only literal of level two to remain.
        let (clause, level) = graph
            .conflict_cause(literal("step:S:success").subject(), StoppingCriteria::FirstUIP)
            .unwrap();
        assert_eq!(
            clause,
            Clause::new([literal("a"), literal("b"), literal("step:S:success")])
        );
        assert_eq!(level, 2);
    }

    #[test]
    fn level_zero_is_ignored() {
        let mut graph = ImplicationGraph::default();
        let fact = graph.record(literal("fact"), 0, None, vec![]).unwrap();
        let a = graph.record(literal("a"), 1, None, vec![]).unwrap();
        graph.record(literal("b"), 2, None, vec![]).unwrap();

        graph
            .record_conflict(Conflict {
                attempt: literal("step:S:success"),
                level: 2,
                premises: vec![fact, a],
                reason: String::default(),
            })
            .unwrap();

        let (clause, level) = graph
            .conflict_cause(literal("step:S:success").subject(), StoppingCriteria::FirstUIP)
            .unwrap();
        assert_eq!(clause, Clause::new([literal("a"), literal("step:S:success")]));
        assert_eq!(level, 1);
    }

    #[test]
    fn conflict_required() {
        let mut graph = chain();
        assert!(matches!(
            graph.conflict_cause(literal("other").subject(), StoppingCriteria::FirstUIP),
            Err(ImplicationError::NoConflict(_))
        ));
        // A mismatched request leaves the conflict in place.
        assert!(graph.conflict().is_some());

        assert_eq!(
            graph.record_conflict(Conflict {
                attempt: literal("step:T:success"),
                level: 2,
                premises: vec![],
                reason: String::default(),
            }),
            Err(ImplicationError::ConflictPending)
        );
    }

    #[test]
    fn truncate_clears_conflict() {
        let mut graph = chain();
        graph.truncate(1);
        assert!(graph.conflict().is_none());
    }
}

#[test]
fn dot() {
    let mut graph = ImplicationGraph::default();
    let a = graph.record(literal("a"), 1, None, vec![]).unwrap();
    graph
        .record(literal("p"), 1, Some(some_key()), vec![a])
        .unwrap();
    graph
        .record_conflict(Conflict {
            attempt: literal("step:S:success"),
            level: 1,
            premises: vec![a],
            reason: "timeout".to_string(),
        })
        .unwrap();

    let dot = graph.as_dot();
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("a @ 1"));
    assert!(dot.contains("p @ 1"));
    assert!(dot.contains("step:S:success @ 1 (timeout)"));
    assert!(dot.contains("conflict"));
}
