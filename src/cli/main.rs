#[cfg(not(target_env = "msvc"))]
#[cfg(feature = "jemalloc")]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = Jemalloc;

use clap::Parser;

use otter_plan::{
    context::{ExecutionState, PlanContext},
    propagation::RefinementContext,
    structures::step::Plan,
};

mod args;
mod display;
mod scenario;

use args::Args;
use scenario::Policy;

fn main() {
    let args = Args::parse();

    if args.markdown_help {
        clap_markdown::print_help_markdown::<Args>();
        std::process::exit(0);
    }

    #[cfg(feature = "log")]
    init_logger(args.log_level);

    let config = match args::config_from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            println!("c Configuration error: {e:?}");
            std::process::exit(1);
        }
    };

    let Some(path) = &args.scenario else {
        println!("c Path to scenario required");
        std::process::exit(1);
    };

    println!("c Reading scenario from {path:?}");

    let scenario = match scenario::read_scenario(path) {
        Ok(scenario) => scenario,
        Err(message) => {
            println!("c {message}");
            std::process::exit(1);
        }
    };

    let plan = match Plan::try_from(scenario.plan) {
        Ok(plan) => plan,
        Err(e) => {
            println!("c Plan error: {e:?}");
            std::process::exit(1);
        }
    };

    let mut ctx = match PlanContext::from_plan(plan, config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            println!("c Load error: {e}");
            std::process::exit(1);
        }
    };

    println!("c Eligible after load: [{}]", ctx.next_eligible().join(", "));

    let mut policy = Policy::from_seed(args.seed);
    let state = match scenario::run_plan(
        &mut ctx,
        scenario.outcomes,
        &mut policy,
        args.max_steps,
        display::step_line,
    ) {
        Ok(state) => state,
        Err(e) => {
            println!("c Step error: {e}");
            std::process::exit(2);
        }
    };

    display::plan_summary(&ctx);

    if args.dot {
        println!("{}", ctx.implication_graph().as_dot());
    }

    if let Some(snapshot_path) = &args.snapshot {
        let written = ctx
            .snapshot_json()
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(snapshot_path, json).map_err(|e| e.to_string()));
        if let Err(message) = written {
            println!("c Failed to write snapshot: {message}");
            std::process::exit(1);
        }
        println!("c Snapshot written to {snapshot_path:?}");
    }

    if !scenario.holes.is_empty() {
        let mut refinement = RefinementContext::from_config(config);
        if let Err(e) = scenario::run_refinement(
            &mut refinement,
            scenario.holes,
            scenario.resolutions,
            display::event_line,
        ) {
            println!("c Refinement error: {e}");
            std::process::exit(2);
        }
        display::refinement_summary(&refinement);
    }

    match state {
        ExecutionState::Completed => std::process::exit(10),
        ExecutionState::Exhausted => std::process::exit(20),
        _ => std::process::exit(30),
    }
}

#[cfg(feature = "log")]
fn init_logger(level: log::LevelFilter) {
    use log4rs::{
        append::console::ConsoleAppender,
        config::{Appender, Root},
        encode::pattern::PatternEncoder,
    };

    let console = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{l} {t} - {m}{n}")))
        .build();

    let config = log4rs::Config::builder()
        .appender(Appender::builder().build("console", Box::new(console)))
        .build(Root::builder().appender("console").build(level));

    match config {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                println!("c Failed to install logger: {e}");
            }
        }
        Err(e) => println!("c Failed to configure logger: {e:?}"),
    }
}
