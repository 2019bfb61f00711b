//! Default values of configuration options.

use super::{EstimatorKind, StoppingCriteria};

pub const STOPPING_CRITERIA: StoppingCriteria = StoppingCriteria::FirstUIP;
pub const SUBSUMPTION: bool = true;

pub const ESTIMATOR: EstimatorKind = EstimatorKind::Tiered;
pub const ENUMERATION_LIMIT: u64 = 4096;
pub const ENUMERABLE_THRESHOLD: u64 = 5;
pub const UNBOUNDED_SIZE: u64 = 1 << 32;

pub const DISCOUNT_TYPE: f64 = 0.5;
pub const DISCOUNT_RETURN_VALUE: f64 = 0.5;
pub const DISCOUNT_LOOP_BEHAVIOR: f64 = 0.75;
pub const DISCOUNT_POSITION: f64 = 0.75;
pub const DISCOUNT_CUSTOM: f64 = 0.9;
