/*!
Configuration of a context.

All configuration for plan and refinement contexts is contained within [Config].
Some structures clone parts of the configuration.

Options with some natural bound are held in a [ConfigOption], and should be updated through [ConfigOption::set] to respect the bounds.

```rust
# use otter_plan::config::{Config, StoppingCriteria};
let mut config = Config::default();
assert!(config.enumerable_threshold.set(8).is_ok());
assert!(config.enumeration_limit.set(0).is_err());
assert!(config.unbounded_size.set(1).is_err());

config.stopping_criteria.value = StoppingCriteria::None;
```
*/

pub mod defaults;

mod config_option;
pub use config_option::ConfigOption;

mod estimation;
pub use estimation::{DiscountTable, EstimatorKind};

mod stopping_criteria;
pub use stopping_criteria::StoppingCriteria;

/// The primary configuration structure.
#[derive(Clone, Debug)]
pub struct Config {
    /// Which stopping criteria to use during conflict analysis.
    pub stopping_criteria: ConfigOption<StoppingCriteria>,

    /// Discard clauses which are subsumed by some stored clause, and remove stored clauses subsumed by a new clause.
    pub subsumption: ConfigOption<bool>,

    /// Which strategy to use when estimating the size of a solution space.
    pub estimator: ConfigOption<EstimatorKind>,

    /// The most candidates to count exactly when estimating the size of a solution space.
    pub enumeration_limit: ConfigOption<u64>,

    /// The nominal count of candidates for a hole of unbounded domain, when discounting constraints of the hole.
    pub unbounded_size: ConfigOption<u64>,

    /// Holes whose solution space is estimated to be at most this size are flagged as enumerable.
    pub enumerable_threshold: ConfigOption<u64>,

    /// The discount applied by constraints of each kind when estimating.
    pub discount: DiscountTable,
}

impl Default for Config {
    fn default() -> Self {
        use defaults::*;
        Config {
            stopping_criteria: ConfigOption {
                name: "stopping_criteria",
                min: StoppingCriteria::MIN,
                max: StoppingCriteria::MAX,
                value: STOPPING_CRITERIA,
            },

            subsumption: ConfigOption {
                name: "subsumption",
                min: false,
                max: true,
                value: SUBSUMPTION,
            },

            estimator: ConfigOption {
                name: "estimator",
                min: EstimatorKind::MIN,
                max: EstimatorKind::MAX,
                value: ESTIMATOR,
            },

            enumeration_limit: ConfigOption {
                name: "enumeration_limit",
                min: 1,
                max: 1 << 20,
                value: ENUMERATION_LIMIT,
            },

            unbounded_size: ConfigOption {
                name: "unbounded_size",
                min: 2,
                max: u64::MAX,
                value: UNBOUNDED_SIZE,
            },

            enumerable_threshold: ConfigOption {
                name: "enumerable_threshold",
                min: 1,
                max: u64::MAX,
                value: ENUMERABLE_THRESHOLD,
            },

            discount: DiscountTable::default(),
        }
    }
}
