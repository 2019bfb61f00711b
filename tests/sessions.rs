use otter_plan::{
    context::ExecutionState,
    session::Sessions,
    structures::{
        constraint::{Resolution, Value},
        hole::{HoleSpec, Relation, SolutionSpace},
        step::StepSpec,
    },
    types::err::{ErrorKind, SessionError},
};

fn diamond() -> Vec<StepSpec> {
    vec![
        StepSpec::new("A"),
        StepSpec::new("B").requires("A"),
        StepSpec::new("C").requires("A"),
        StepSpec::new("D").requires("B").requires("C"),
    ]
}

mod plans {
    use super::*;

    #[test]
    fn closed_handles() {
        let sessions = Sessions::default();
        let first = sessions.load_plan(diamond(), ["D"]).unwrap();
        let second = sessions.load_plan(diamond(), ["D"]).unwrap();
        assert_eq!(sessions.plan_count().unwrap(), 2);

        sessions.close_plan(first).unwrap();
        assert_eq!(sessions.plan_count().unwrap(), 1);

        assert!(matches!(
            sessions.next_eligible(first),
            Err(ErrorKind::Session(SessionError::UnknownPlan))
        ));
        assert!(matches!(
            sessions.report_step(first, "A", true, ""),
            Err(ErrorKind::Session(SessionError::UnknownPlan))
        ));
        assert!(matches!(
            sessions.close_plan(first),
            Err(ErrorKind::Session(SessionError::UnknownPlan))
        ));

        // A fresh plan does not revive the closed handle.
        let third = sessions.load_plan(diamond(), ["D"]).unwrap();
        assert_ne!(first, third);
        assert!(sessions.next_eligible(first).is_err());
        assert!(sessions.next_eligible(second).unwrap().contains("A"));
    }

    #[test]
    fn errors_from_the_plan() {
        let sessions = Sessions::default();
        let handle = sessions.load_plan(diamond(), ["D"]).unwrap();

        let result = sessions.report_step(handle, "B", true, "");
        assert!(matches!(result, Err(ErrorKind::Plan(_))));
        assert!(result.unwrap_err().is_logic_error());

        // The plan is unaffected.
        assert_eq!(
            sessions.with_plan(handle, |the_context| the_context.state()).unwrap(),
            ExecutionState::Ready
        );
    }

    #[test]
    fn snapshot_and_restore() {
        let sessions = Sessions::default();
        let handle = sessions.load_plan(diamond(), ["D"]).unwrap();

        sessions.report_step(handle, "A", true, "").unwrap();
        sessions.report_step(handle, "B", false, "flaky").unwrap();

        let json = sessions.snapshot_plan(handle).unwrap();
        let restored = sessions.restore_plan(&json).unwrap();
        assert_ne!(handle, restored);
        assert_eq!(sessions.plan_count().unwrap(), 2);

        assert_eq!(
            sessions.next_eligible(handle).unwrap(),
            sessions.next_eligible(restored).unwrap()
        );

        for each in [handle, restored] {
            let result = sessions.report_step(each, "C", true, "").unwrap();
            assert_eq!(result.state, ExecutionState::Exhausted);
        }

        assert_eq!(
            sessions
                .with_plan(restored, |the_context| the_context.failures().len())
                .unwrap(),
            1
        );
    }

    #[test]
    fn parallel_plans() {
        let sessions = Sessions::default();
        let handles = (0..8)
            .map(|_| sessions.load_plan(diamond(), ["D"]).unwrap())
            .collect::<Vec<_>>();

        std::thread::scope(|scope| {
            for (index, handle) in handles.iter().enumerate() {
                let sessions = &sessions;
                let handle = *handle;
                scope.spawn(move || {
                    sessions.report_step(handle, "A", true, "").unwrap();
                    // Half of the plans see C fail.
                    let c_succeeds = index % 2 == 0;
                    sessions.report_step(handle, "B", true, "").unwrap();
                    sessions
                        .report_step(handle, "C", c_succeeds, "odd")
                        .unwrap();
                });
            }
        });

        for (index, handle) in handles.iter().enumerate() {
            let state = sessions
                .with_plan(*handle, |the_context| the_context.state())
                .unwrap();
            let next = sessions.next_eligible(*handle).unwrap();
            assert_eq!(state, ExecutionState::Stepping);
            match index % 2 {
                0 => assert!(next.contains("D")),
                // The failure of C retracts the level of B.
                _ => assert_eq!(next.into_iter().collect::<Vec<_>>(), vec!["B"]),
            }
        }
    }
}

mod refinements {
    use super::*;

    #[test]
    fn resolve_by_handle() {
        let sessions = Sessions::default();
        let session = sessions.open_refinement().unwrap();

        let source = sessions
            .register_hole(session, HoleSpec::new("source", "int"))
            .unwrap();
        sessions
            .register_hole(
                session,
                HoleSpec::new("target", "u8").relate("source", Relation::Dataflow),
            )
            .unwrap();

        let events = sessions
            .resolve_hole(source, Resolution::value(Value::Int(42)))
            .unwrap();
        assert_eq!(events.len(), 2);

        let report = sessions.solution_space(session, "target").unwrap();
        assert_eq!(report.estimate, SolutionSpace::Bounded(1));
        assert!(report.fully_constrained);
        assert!(!report.resolved);
    }

    #[test]
    fn closed_sessions() {
        let sessions = Sessions::default();
        let session = sessions.open_refinement().unwrap();
        let hole = sessions
            .register_hole(session, HoleSpec::new("h", "bool"))
            .unwrap();

        sessions.close_refinement(session).unwrap();

        assert!(matches!(
            sessions.resolve_hole(hole, Resolution::value(Value::Bool(true))),
            Err(ErrorKind::Session(SessionError::UnknownSession))
        ));
        assert!(matches!(
            sessions.solution_space(session, "h"),
            Err(ErrorKind::Session(SessionError::UnknownSession))
        ));
        assert!(matches!(
            sessions.close_refinement(session),
            Err(ErrorKind::Session(SessionError::UnknownSession))
        ));
    }

    #[test]
    fn errors_from_the_session() {
        let sessions = Sessions::default();
        let session = sessions.open_refinement().unwrap();
        sessions
            .register_hole(session, HoleSpec::new("h", "bool"))
            .unwrap();

        assert!(matches!(
            sessions.register_hole(session, HoleSpec::new("h", "bool")),
            Err(ErrorKind::Propagation(_))
        ));
        assert!(matches!(
            sessions.solution_space(session, "missing"),
            Err(ErrorKind::Propagation(_))
        ));
    }

    #[test]
    fn parallel_sessions() {
        let sessions = Sessions::default();
        let handles = (0..4)
            .map(|_| sessions.open_refinement().unwrap())
            .collect::<Vec<_>>();

        std::thread::scope(|scope| {
            for session in &handles {
                let sessions = &sessions;
                let session = *session;
                scope.spawn(move || {
                    let first = sessions
                        .register_hole(session, HoleSpec::new("first", "u8"))
                        .unwrap();
                    sessions
                        .register_hole(
                            session,
                            HoleSpec::new("second", "u8").relate("first", Relation::Adjacent),
                        )
                        .unwrap();
                    sessions
                        .resolve_hole(first, Resolution::value(Value::Int(10)))
                        .unwrap();
                });
            }
        });

        for session in handles {
            let report = sessions.solution_space(session, "second").unwrap();
            assert_eq!(report.estimate, SolutionSpace::Bounded(2));
            assert!(report.enumerable);
        }
    }
}
