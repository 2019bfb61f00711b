use otter_plan::{
    config::{Config, StoppingCriteria},
    context::{ExecutionState, PlanContext},
    reports::StepResult,
    structures::{
        clause::Clause,
        literal::{DecisionLiteral, SubjectId},
        step::{Plan, StepSpec},
    },
    types::err::{ErrorKind, PlanError},
};

fn success(step: &str) -> DecisionLiteral {
    DecisionLiteral::positive(SubjectId::step_success(step))
}

fn context(specs: Vec<StepSpec>, goals: &[&str]) -> PlanContext {
    let plan = Plan::new(specs, goals.iter().copied()).unwrap();
    PlanContext::from_plan(plan, Config::default()).unwrap()
}

mod linear {
    use super::*;

    #[test]
    fn all_succeed() {
        let mut the_context = context(
            vec![
                StepSpec::new("A"),
                StepSpec::new("B").requires("A"),
                StepSpec::new("C").requires("A"),
            ],
            &["B", "C"],
        );
        assert_eq!(the_context.state(), ExecutionState::Ready);
        assert_eq!(the_context.next_eligible(), vec!["A"]);

        let result = the_context.report_step("A", true, "").unwrap();
        assert_eq!(result.next_steps, vec!["B", "C"]);
        assert_eq!(result.state, ExecutionState::Stepping);
        assert_eq!(result.learned_clause_id, None);

        the_context.report_step("B", true, "").unwrap();
        let result = the_context.report_step("C", true, "").unwrap();
        assert_eq!(result.state, ExecutionState::Completed);
        assert!(result.next_steps.is_empty());

        assert_eq!(the_context.completed_steps(), &["A", "B", "C"]);
        assert_eq!(the_context.decision_level(), 3);
        assert_eq!(the_context.counters().decisions, 3);
        assert!(the_context.next_eligible().is_empty());
    }

    #[test]
    fn effects_enable_steps() {
        let mut the_context = context(
            vec![
                StepSpec::new("fetch").produces(DecisionLiteral::positive("sources")),
                StepSpec::new("build").requires("sources"),
            ],
            &["build"],
        );
        assert_eq!(the_context.clause_store().rule_count(), 1);

        the_context.report_step("fetch", true, "").unwrap();
        assert_eq!(the_context.value_of(&SubjectId::from("sources")), Some(true));

        let node = the_context
            .implication_graph()
            .node_of(&SubjectId::from("sources"))
            .unwrap();
        assert_eq!(node.level(), 1);
        assert!(!node.is_decision());

        assert_eq!(the_context.next_eligible(), vec!["build"]);
    }

    #[test]
    fn facts_hold_at_level_zero() {
        let plan = Plan::new(
            vec![StepSpec::new("deploy").requires("approved")],
            ["deploy"],
        )
        .unwrap()
        .with_facts([DecisionLiteral::positive("approved")]);
        let the_context = PlanContext::from_plan(plan, Config::default()).unwrap();

        assert_eq!(
            the_context
                .implication_graph()
                .level_of(&SubjectId::from("approved")),
            Some(0)
        );
        assert_eq!(the_context.next_eligible(), vec!["deploy"]);
    }

    #[test]
    fn goals_met_on_load() {
        let plan = Plan::new(vec![StepSpec::new("A")], ["ready"])
            .unwrap()
            .with_facts([DecisionLiteral::positive("ready")]);
        let the_context = PlanContext::from_plan(plan, Config::default()).unwrap();

        assert_eq!(the_context.state(), ExecutionState::Completed);
        assert!(the_context.next_eligible().is_empty());
    }

    #[test]
    fn stuck_on_load() {
        let the_context = context(vec![StepSpec::new("A").requires("never")], &["A"]);
        assert_eq!(the_context.state(), ExecutionState::Exhausted);
    }
}

mod failure {
    use super::*;

    #[test]
    fn lint_failure() {
        let mut the_context = context(
            vec![
                StepSpec::new("A"),
                StepSpec::new("B").requires("A"),
                StepSpec::new("C").requires("A"),
            ],
            &["C"],
        );
        the_context.report_step("A", true, "").unwrap();

        let result = the_context.report_step("B", false, "lint").unwrap();
        assert_eq!(result.backjump_level, Some(1));
        assert_eq!(result.next_steps, vec!["C"]);
        assert_eq!(result.state, ExecutionState::Stepping);

        let key = result.learned_clause_id.unwrap();
        let learned = the_context.clause_store().get(key).unwrap().clause();
        assert_eq!(learned, &Clause::new([success("A"), success("B")]));

        assert_eq!(
            the_context.value_of(&SubjectId::step_success("B")),
            Some(false)
        );

        let record = &the_context.failures()[0];
        assert_eq!(record.step, "B");
        assert_eq!(record.reason, "lint");
        assert_eq!(record.level, 1);
        assert_eq!(record.backjump_level, 1);

        let result = the_context.report_step("C", true, "").unwrap();
        assert_eq!(result.state, ExecutionState::Completed);
    }

    #[test]
    fn unrelated_level_is_retracted() {
        let mut the_context = context(
            vec![
                StepSpec::new("A"),
                StepSpec::new("X"),
                StepSpec::new("B").requires("A"),
            ],
            &["B", "X"],
        );
        the_context.report_step("A", true, "").unwrap();
        the_context.report_step("X", true, "").unwrap();
        assert_eq!(the_context.decision_level(), 2);

        let result = the_context.report_step("B", false, "flaky").unwrap();
        assert_eq!(result.backjump_level, Some(1));

        // X was decided after A, and is not part of the reason B failed.
        assert_eq!(the_context.completed_steps(), &["A"]);
        assert_eq!(the_context.value_of(&SubjectId::step_success("X")), None);
        assert_eq!(result.next_steps, vec!["X"]);

        let counters = the_context.counters();
        assert_eq!(counters.backjumps, 1);
        assert_eq!(counters.levels_retracted, 1);
        assert_eq!(counters.conflicts, 1);
        assert_eq!(counters.learned, 1);
    }

    #[test]
    fn failure_without_preconditions() {
        let mut the_context = context(vec![StepSpec::new("A"), StepSpec::new("B")], &["A"]);
        the_context.report_step("B", true, "").unwrap();

        let result = the_context.report_step("A", false, "broken").unwrap();
        assert_eq!(result.backjump_level, Some(0));
        assert_eq!(the_context.decision_level(), 0);

        let key = result.learned_clause_id.unwrap();
        let learned = the_context.clause_store().get(key).unwrap().clause();
        assert_eq!(learned, &Clause::new([success("A")]));

        // The success of B was retracted along with level one, though A is ruled out for good.
        assert_eq!(result.next_steps, vec!["B"]);
        let result = the_context.report_step("B", true, "").unwrap();
        assert_eq!(result.state, ExecutionState::Exhausted);
    }

    #[test]
    fn exhausted() {
        let mut the_context = context(
            vec![StepSpec::new("A"), StepSpec::new("B").requires("A")],
            &["B"],
        );
        the_context.report_step("A", true, "").unwrap();
        let result = the_context.report_step("B", false, "no way through").unwrap();

        assert_eq!(result.state, ExecutionState::Exhausted);
        assert!(result.next_steps.is_empty());
        assert_eq!(
            the_context.report_step("A", true, ""),
            Err(ErrorKind::Plan(PlanError::Terminal(ExecutionState::Exhausted)))
        );
    }

    #[test]
    fn effects_are_checked() {
        let mut the_context = context(
            vec![
                StepSpec::new("X"),
                StepSpec::new("Y").produces(DecisionLiteral::positive("p")),
                StepSpec::new("Z").requires("X"),
            ],
            &["Z"],
        );
        the_context
            .add_nogood(Clause::new([DecisionLiteral::positive("p"), success("X")]))
            .unwrap();

        let result = the_context.report_step("X", true, "").unwrap();

        // Y would produce p alongside the success of X.
        assert_eq!(result.next_steps, vec!["Z"]);
        assert_eq!(the_context.clause_store().check(the_context.assigned()), None);
    }

    #[test]
    fn learned_clause_subsumed_by_nogood() {
        let mut the_context = context(
            vec![StepSpec::new("A"), StepSpec::new("X").requires("A")],
            &["X"],
        );
        the_context.report_step("A", true, "").unwrap();

        // Imported after A succeeded, so already triggered.
        let nogood = the_context
            .add_nogood(Clause::new([success("A")]))
            .unwrap()
            .key();

        let result = the_context.report_step("X", false, "").unwrap();
        assert_eq!(result.learned_clause_id, Some(nogood));
        assert_eq!(result.backjump_level, Some(1));
        assert_eq!(the_context.counters().subsumed, 1);
        assert_eq!(the_context.counters().learned, 0);

        let record = the_context.failures().last().unwrap();
        assert_eq!(record.learned_clause, Clause::new([success("A"), success("X")]));

        // The nogood does not mention X, and so is not the reason X is ruled out.
        let graph = the_context.implication_graph();
        let negation = graph.node_of(&SubjectId::step_success("X")).unwrap();
        assert_eq!(negation.literal(), &success("X").negate());
        assert_eq!(negation.antecedent(), None);
        assert!(!negation.is_decision());
        assert_eq!(
            negation.premises(),
            &[graph.key_of(&SubjectId::step_success("A")).unwrap()]
        );
    }

    #[test]
    fn learned_clause_is_antecedent() {
        let mut the_context = context(
            vec![StepSpec::new("A"), StepSpec::new("X").requires("A")],
            &["X"],
        );
        the_context.report_step("A", true, "").unwrap();
        let result = the_context.report_step("X", false, "").unwrap();

        let negation = the_context
            .implication_graph()
            .node_of(&SubjectId::step_success("X"))
            .unwrap();
        let antecedent = negation.antecedent().unwrap();
        assert_eq!(Some(antecedent), result.learned_clause_id);
        assert!(the_context
            .clause_store()
            .get(antecedent)
            .unwrap()
            .clause()
            .contains(&success("X")));
    }

    #[test]
    fn facts_are_not_learned() {
        let plan = Plan::new(
            vec![
                StepSpec::new("A"),
                StepSpec::new("B").requires("A").requires("approved"),
            ],
            ["B"],
        )
        .unwrap()
        .with_facts([DecisionLiteral::positive("approved")]);
        let mut the_context = PlanContext::from_plan(plan, Config::default()).unwrap();

        the_context.report_step("A", true, "").unwrap();
        let result = the_context.report_step("B", false, "").unwrap();

        let key = result.learned_clause_id.unwrap();
        let learned = the_context.clause_store().get(key).unwrap().clause();
        assert!(!learned.contains(&DecisionLiteral::positive("approved")));
        assert_eq!(learned.size(), 2);
    }

    #[test]
    fn resolution_through_effects() {
        let specs = vec![
            StepSpec::new("A").produces(DecisionLiteral::positive("p")),
            StepSpec::new("B").produces(DecisionLiteral::positive("q")),
            StepSpec::new("C").requires("p").requires("q"),
        ];

        for criteria in [StoppingCriteria::FirstUIP, StoppingCriteria::None] {
            let mut config = Config::default();
            config.stopping_criteria.value = criteria;
            let plan = Plan::new(specs.clone(), ["C"]).unwrap();
            let mut the_context = PlanContext::from_plan(plan, config).unwrap();

            the_context.report_step("A", true, "").unwrap();
            the_context.report_step("B", true, "").unwrap();
            let result = the_context.report_step("C", false, "").unwrap();

            let key = result.learned_clause_id.unwrap();
            let learned = the_context.clause_store().get(key).unwrap().clause();

            // p rests on the decision of A, at a lower level.
            assert!(learned.contains(&success("A")));
            assert!(learned.contains(&success("C")));

            // The clause keeps some literal of the level of B, so nothing is retracted.
            assert_eq!(result.backjump_level, Some(2));
            assert_eq!(the_context.decision_level(), 2);

            match criteria {
                StoppingCriteria::FirstUIP => {
                    assert!(learned.contains(&DecisionLiteral::positive("q")))
                }
                StoppingCriteria::None => assert!(learned.contains(&success("B"))),
            }
        }
    }
}

mod protocol {
    use super::*;

    #[test]
    fn not_loaded() {
        let mut the_context = PlanContext::default();
        assert_eq!(the_context.state(), ExecutionState::Idle);
        assert!(the_context.next_eligible().is_empty());
        assert_eq!(
            the_context.report_step("A", true, ""),
            Err(ErrorKind::Plan(PlanError::NotLoaded))
        );
    }

    #[test]
    fn unknown_and_ineligible() {
        let mut the_context = context(
            vec![StepSpec::new("A"), StepSpec::new("B").requires("A")],
            &["B"],
        );

        let unknown = the_context.report_step("Z", true, "");
        assert_eq!(
            unknown,
            Err(ErrorKind::Plan(PlanError::UnknownStep("Z".to_string())))
        );
        assert!(unknown.unwrap_err().is_logic_error());

        assert_eq!(
            the_context.report_step("B", true, ""),
            Err(ErrorKind::Plan(PlanError::NotEligible("B".to_string())))
        );

        // The context is unchanged by a rejected report.
        assert_eq!(the_context.decision_level(), 0);
        assert_eq!(the_context.next_eligible(), vec!["A"]);
    }

    #[test]
    fn completed_step_is_not_eligible() {
        let mut the_context = context(vec![StepSpec::new("A"), StepSpec::new("B")], &["B"]);
        the_context.report_step("A", true, "").unwrap();
        assert_eq!(
            the_context.report_step("A", true, ""),
            Err(ErrorKind::Plan(PlanError::NotEligible("A".to_string())))
        );
    }

    #[test]
    fn double_load() {
        let mut the_context = context(vec![StepSpec::new("A")], &["A"]);
        let plan = Plan::new(vec![StepSpec::new("B")], ["B"]).unwrap();
        assert_eq!(
            the_context.load(plan),
            Err(ErrorKind::Plan(PlanError::AlreadyLoaded))
        );
    }

    #[test]
    fn contradictory_facts() {
        let plan = Plan::new(vec![StepSpec::new("A")], ["A"])
            .unwrap()
            .with_facts([
                DecisionLiteral::positive("ready"),
                DecisionLiteral::negative("ready"),
            ]);
        assert_eq!(
            PlanContext::from_plan(plan, Config::default()).err(),
            Some(ErrorKind::Plan(PlanError::ContradictoryEffect(
                SubjectId::from("ready")
            )))
        );
    }

    #[test]
    fn fact_rules_out_effect() {
        let plan = Plan::new(
            vec![StepSpec::new("A").produces(DecisionLiteral::positive("ready"))],
            ["A"],
        )
        .unwrap()
        .with_facts([DecisionLiteral::negative("ready")]);
        let the_context = PlanContext::from_plan(plan, Config::default()).unwrap();

        assert_eq!(the_context.state(), ExecutionState::Exhausted);
    }

    #[test]
    fn callback_on_step() {
        use std::sync::{Arc, Mutex};

        let mut the_context = context(
            vec![StepSpec::new("A"), StepSpec::new("B").requires("A")],
            &["B"],
        );

        let seen = Arc::new(Mutex::new(Vec::default()));
        let seen_clone = Arc::clone(&seen);
        the_context.set_callback_step(Box::new(move |step: &String, result: &StepResult| {
            seen_clone
                .lock()
                .unwrap()
                .push((step.clone(), result.state));
        }));

        the_context.report_step("A", true, "").unwrap();
        the_context.report_step("B", true, "").unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ("A".to_string(), ExecutionState::Stepping),
                ("B".to_string(), ExecutionState::Completed)
            ]
        );
    }
}
