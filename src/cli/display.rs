use crossterm::style::Stylize;

use otter_plan::{
    context::{ExecutionState, PlanContext},
    propagation::{derived_from, RefinementContext},
    reports::PropagationEvent,
};

use crate::scenario::Reported;

pub fn step_line(report: &Reported) {
    let outcome = match report.success {
        true => "ok".green(),
        false => "failed".red(),
    };
    print!("c {} {outcome}", report.step.as_str().bold());
    if !report.reason.is_empty() {
        print!(" ({})", report.reason);
    }
    if let Some(level) = report.result.backjump_level {
        print!(" {} {level}", "backjump to".yellow());
    }
    println!(" → [{}]", report.result.next_steps.join(", "));
}

pub fn event_line(event: &PropagationEvent) {
    let from = match event.source_hole == event.target_hole {
        true => "resolved".to_string().cyan(),
        false => format!("from {}", event.source_hole).cyan(),
    };
    print!(
        "c {:>4} {} {from}: {} → {}",
        event.sequence,
        event.target_hole.as_str().bold(),
        event.space_before,
        event.space_after,
    );
    if !event.violations.is_empty() {
        print!(" {}", format!("{} violated", event.violations.len()).red());
    }
    if event.enumerable {
        print!(" {}", "enumerable".green());
    }
    println!();
}

pub fn plan_summary(ctx: &PlanContext) {
    let counters = ctx.counters();
    println!(
        "c decisions {}, conflicts {}, backjumps {}, learned {}, subsumed {}",
        counters.decisions,
        counters.conflicts,
        counters.backjumps,
        counters.learned,
        counters.subsumed
    );

    for failure in ctx.failures() {
        println!(
            "c learned {} from {} at level {}",
            failure.learned_clause.as_string(),
            failure.step,
            failure.level
        );
    }

    let state = match ctx.state() {
        ExecutionState::Completed => ctx.state().to_string().green(),
        ExecutionState::Exhausted => ctx.state().to_string().red(),
        other => other.to_string().yellow(),
    };
    println!("s {state}");
}

pub fn refinement_summary(ctx: &RefinementContext) {
    for hole in ctx.holes() {
        let derived = ctx
            .related(hole.id())
            .iter()
            .map(|(other, _)| {
                hole.constraints()
                    .iter()
                    .filter(|constraint| derived_from(constraint, other))
                    .count()
            })
            .sum::<usize>();

        let resolution = match hole.resolution() {
            Some(resolution) => resolution.to_string().green(),
            None => "unresolved".to_string().dark_grey(),
        };

        println!(
            "h {} {} {} ({} constraints, {derived} derived)",
            hole.id().bold(),
            resolution,
            hole.estimate(),
            hole.constraints().len(),
        );
    }
}
