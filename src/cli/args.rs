use std::path::PathBuf;

use clap::Parser;

use otter_plan::{
    config::{defaults, Config, EstimatorKind, StoppingCriteria},
    types::err::{self},
};

/// Drives a plan, and optionally a refinement session, described in a JSON scenario.
#[derive(Debug, Parser)]
#[command(name = "otter_plan", version)]
pub struct Args {
    /// The JSON scenario to run.
    #[arg(required_unless_present = "markdown_help", value_name = "SCENARIO")]
    pub scenario: Option<PathBuf>,

    /// Choose among eligible steps at random, seeded with the given value.
    ///
    /// Without a seed the first eligible step, in plan order, is chosen.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// The most step outcomes to report before giving up.
    #[arg(long, value_name = "COUNT", default_value_t = 1024)]
    pub max_steps: usize,

    /// Write the implication graph, in Graphviz dot form, after the plan stops.
    #[arg(long)]
    pub dot: bool,

    /// Write a snapshot of the plan context to the given path after the plan stops.
    #[arg(long, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Resolution stopping criteria.
    ///
    ///   - FirstUIP: Resolve until the first unique implication point
    ///   - None    : Resolve every implied literal to the decisions it rests on
    #[arg(long, value_name = "CRITERIA", value_parser = stopping_criteria_parser)]
    pub stopping_criteria: Option<StoppingCriteria>,

    /// Keep clauses subsumed by some stored clause.
    #[arg(long)]
    pub no_subsumption: bool,

    /// The estimation strategy: Tiered, Enumeration, or Discount.
    #[arg(long, value_name = "STRATEGY", value_parser = estimator_parser)]
    pub estimator: Option<EstimatorKind>,

    /// The most candidates to count exactly when estimating a solution space.
    #[arg(long, value_name = "LIMIT")]
    pub enumeration_limit: Option<u64>,

    /// The nominal count of candidates for a constrained hole of unbounded type.
    #[arg(long, value_name = "SIZE")]
    pub unbounded_size: Option<u64>,

    /// Flag holes whose solution space is at most this size as enumerable.
    #[arg(long, value_name = "SIZE")]
    pub enumerable_threshold: Option<u64>,

    /// The level of logs to write, when built with logs.
    #[cfg_attr(not(feature = "log"), allow(dead_code))]
    #[arg(long, value_name = "LEVEL", default_value = "warn", value_parser = level_parser)]
    pub log_level: log::LevelFilter,

    /// Print help for the command in markdown form, and exit.
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

/// A [Config] with options taken from the arguments, or defaults if not given.
pub fn config_from_args(args: &Args) -> Result<Config, err::ConfigError> {
    let mut config = Config::default();

    if let Some(criteria) = args.stopping_criteria {
        config.stopping_criteria.set(criteria)?;
    }

    if args.no_subsumption {
        config.subsumption.set(false)?;
    }

    if let Some(estimator) = args.estimator {
        config.estimator.set(estimator)?;
    }

    if let Some(limit) = args.enumeration_limit {
        config.enumeration_limit.set(limit)?;
    }

    if let Some(size) = args.unbounded_size {
        config.unbounded_size.set(size)?;
    }

    if let Some(threshold) = args.enumerable_threshold {
        config.enumerable_threshold.set(threshold)?;
    }

    Ok(config)
}

fn stopping_criteria_parser(arg: &str) -> Result<StoppingCriteria, String> {
    arg.parse::<StoppingCriteria>().map_err(|_| {
        format!(
            "Unknown stopping criteria variant (default: {})",
            defaults::STOPPING_CRITERIA
        )
    })
}

fn estimator_parser(arg: &str) -> Result<EstimatorKind, String> {
    arg.parse::<EstimatorKind>()
        .map_err(|_| format!("Unknown estimator (default: {})", defaults::ESTIMATOR))
}

fn level_parser(arg: &str) -> Result<log::LevelFilter, String> {
    arg.parse::<log::LevelFilter>()
        .map_err(|_| format!("Unknown log level: {arg}"))
}
