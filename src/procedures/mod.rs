//! Various procedures for mutating a context.
//!
//! For the most part these are methods accessed via a [PlanContext](crate::context::PlanContext), and primarily placed here for documentation.

pub mod backjump;
pub mod eligibility;
pub mod load;
pub mod report;
