//! Properties of executions and refinements on randomly generated inputs.
//!
//! Each run is seeded, so any failure is reproducible from the seed reported.

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use otter_plan::{
    config::{Config, StoppingCriteria},
    context::{ExecutionState, PlanContext},
    propagation::RefinementContext,
    structures::{
        constraint::{Refinement, Resolution, Value},
        hole::{HoleSpec, Relation},
        literal::DecisionLiteral,
        step::{Plan, StepSpec},
    },
};

const SEEDS: u64 = 64;

/// A plan of a handful of steps, each requiring some earlier steps or effects, with the final step as the goal.
fn random_plan(rng: &mut StdRng) -> Plan {
    let step_count = rng.gen_range(3..8);
    let mut specs = Vec::default();
    let mut available: Vec<String> = Vec::default();

    for index in 0..step_count {
        let id = format!("s{index}");
        let mut spec = StepSpec::new(id.clone());

        if index > 0 {
            let requirement_count = rng.gen_range(0..=2.min(available.len()));
            for requirement in available.choose_multiple(rng, requirement_count) {
                spec = spec.requires(requirement.clone());
            }
        }

        if rng.gen_bool(0.4) {
            let effect = format!("e{index}");
            spec = spec.produces(DecisionLiteral::positive(effect.as_str()));
            available.push(effect);
        }

        available.push(id);
        specs.push(spec);
    }

    let goal = format!("s{}", step_count - 1);
    match Plan::new(specs, [goal]) {
        Ok(plan) => plan,
        Err(e) => panic!("Invalid random plan: {e:?}"),
    }
}

/// Runs the plan to a terminal state, failing steps at random, and checking properties of each report along the way.
fn run(rng: &mut StdRng, plan: Plan, config: Config, seed: u64) -> PlanContext {
    let mut the_context = PlanContext::from_plan(plan, config).unwrap();

    for _ in 0..10_000 {
        if the_context.state().is_terminal() {
            break;
        }
        let eligible = the_context.next_eligible();
        let step = eligible.choose(rng).unwrap().clone();
        let success = rng.gen_bool(0.7);

        let level = the_context.decision_level();
        let assigned = the_context.assigned().clone();
        let attempt = the_context.plan().unwrap().step(&step).unwrap().success_literal();

        let result = the_context.report_step(&step, success, "random").unwrap();

        // No assignment produced triggers a stored clause.
        assert_eq!(
            the_context.clause_store().check(the_context.assigned()),
            None,
            "seed {seed}"
        );
        assert_eq!(
            the_context.completed_steps().len() as u32,
            the_context.decision_level(),
            "seed {seed}"
        );

        if success {
            assert_eq!(the_context.decision_level(), level + 1, "seed {seed}");
            continue;
        }

        let backjump_level = result.backjump_level.unwrap();
        assert!(backjump_level <= level, "seed {seed}");
        assert_eq!(the_context.decision_level(), backjump_level, "seed {seed}");

        // The store rules out the attempt under the assignment at the time of failure.
        assert!(
            the_context
                .clause_store()
                .check_with(&assigned, &attempt)
                .is_some(),
            "seed {seed}"
        );

        let learned = &the_context.failures().last().unwrap().learned_clause;
        assert!(learned.contains(&attempt), "seed {seed}");
        assert!(learned.triggered_by_extension(&assigned, &attempt), "seed {seed}");

        assert!(!result.next_steps.contains(&step), "seed {seed}");
        assert!(!the_context.next_eligible().contains(&step), "seed {seed}");
    }

    assert!(the_context.state().is_terminal(), "seed {seed}");
    match the_context.state() {
        ExecutionState::Completed => assert!(the_context.goals_met(), "seed {seed}"),
        ExecutionState::Exhausted => {
            assert!(!the_context.goals_met(), "seed {seed}");
            assert!(the_context.next_eligible().is_empty(), "seed {seed}");
        }
        state => panic!("seed {seed}: unexpected state {state}"),
    }

    the_context
}

#[test]
fn failures_are_ruled_out() {
    for criteria in [StoppingCriteria::FirstUIP, StoppingCriteria::None] {
        for seed in 0..SEEDS {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = random_plan(&mut rng);
            let mut config = Config::default();
            config.stopping_criteria.value = criteria;
            run(&mut rng, plan, config, seed);
        }
    }
}

#[test]
fn learned_clauses_replay() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let plan = random_plan(&mut rng);
        let the_context = run(&mut rng, plan.clone(), Config::default(), seed);

        // A fresh execution given the learned clauses, and the surviving completions, reaches the same frontier.
        let mut replay = PlanContext::from_plan(plan, Config::default()).unwrap();
        for failure in the_context.failures() {
            replay.add_nogood(failure.learned_clause.clone()).unwrap();
        }
        for step in the_context.completed_steps() {
            replay.report_step(step, true, "").unwrap();
        }

        assert_eq!(replay.state(), the_context.state(), "seed {seed}");
        assert_eq!(
            replay.next_eligible(),
            the_context.next_eligible(),
            "seed {seed}"
        );
    }
}

#[test]
fn snapshots_continue_identically() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let plan = random_plan(&mut rng);
        let mut the_context = PlanContext::from_plan(plan, Config::default()).unwrap();

        // A few reports, then a snapshot.
        for _ in 0..3 {
            let eligible = the_context.next_eligible();
            let Some(step) = eligible.choose(&mut rng) else {
                break;
            };
            let success = rng.gen_bool(0.5);
            the_context.report_step(step, success, "random").unwrap();
        }

        let json = the_context.snapshot_json().unwrap();
        let mut restored = PlanContext::from_snapshot_json(&json, Config::default()).unwrap();

        assert_eq!(restored.state(), the_context.state(), "seed {seed}");
        assert_eq!(restored.next_eligible(), the_context.next_eligible(), "seed {seed}");
        assert_eq!(restored.assigned(), the_context.assigned(), "seed {seed}");

        // The same reports give the same results.
        while !the_context.state().is_terminal() {
            let eligible = the_context.next_eligible();
            let step = eligible.choose(&mut rng).unwrap().clone();
            let success = rng.gen_bool(0.7);

            let expected = the_context.report_step(&step, success, "random").unwrap();
            let result = restored.report_step(&step, success, "random").unwrap();
            assert_eq!(result, expected, "seed {seed}");
        }
    }
}

fn random_resolution(rng: &mut StdRng) -> Resolution {
    match rng.gen_range(0..3) {
        0 => Resolution::value(Value::Int(rng.gen_range(-5..300))),
        1 => {
            let min = rng.gen_range(-10..200);
            Resolution::new(
                "range",
                Refinement::Range {
                    min: Some(min),
                    max: Some(min + rng.gen_range(0..100)),
                },
            )
        }
        _ => Resolution::new(
            "lower bound",
            Refinement::Range {
                min: Some(rng.gen_range(0..50)),
                max: None,
            },
        ),
    }
}

#[test]
fn estimates_never_grow() {
    let hints = ["u8", "i8", "u16", "i32", "int", "bool"];
    let relations = [
        Relation::SameParameter,
        Relation::Dataflow,
        Relation::SiblingBranch,
        Relation::Adjacent,
    ];

    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut the_context = RefinementContext::from_config(Config::default());

        let hole_count = rng.gen_range(2..10);
        let ids = (0..hole_count).map(|i| format!("h{i}")).collect::<Vec<_>>();
        for id in &ids {
            let mut spec = HoleSpec::new(id.clone(), *hints.choose(&mut rng).unwrap());
            for _ in 0..rng.gen_range(0..3) {
                let other = &ids[rng.gen_range(0..hole_count)];
                if other != id {
                    spec = spec.relate(other.clone(), *relations.choose(&mut rng).unwrap());
                }
            }
            the_context.register_hole(spec).unwrap();
        }
        assert!(the_context.pending_relations().is_empty(), "seed {seed}");

        let mut order = ids.clone();
        order.shuffle(&mut rng);
        for id in order {
            let before = ids
                .iter()
                .map(|id| the_context.hole(id).unwrap().estimate())
                .collect::<Vec<_>>();

            let events = the_context.resolve(&id, random_resolution(&mut rng)).unwrap();
            for event in &events {
                assert!(event.space_after <= event.space_before, "seed {seed}");
            }

            for (id, before) in ids.iter().zip(before) {
                assert!(the_context.hole(id).unwrap().estimate() <= before, "seed {seed}");
            }
        }
    }
}
