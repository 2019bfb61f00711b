use std::str::FromStr;

use crate::structures::constraint::ConstraintKind;

/// Which strategy to use when estimating the size of a solution space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EstimatorKind {
    /// Count candidates exactly when there are at most as many as the enumeration limit, and otherwise discount.
    Tiered = 0,

    /// Always count candidates, falling back to the size of the narrowed domain when there are too many to count.
    Enumeration,

    /// Always discount.
    Discount,
}

impl EstimatorKind {
    pub const MIN: EstimatorKind = EstimatorKind::Tiered;
    pub const MAX: EstimatorKind = EstimatorKind::Discount;
}

impl std::fmt::Display for EstimatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tiered => write!(f, "Tiered"),
            Self::Enumeration => write!(f, "Enumeration"),
            Self::Discount => write!(f, "Discount"),
        }
    }
}

/// Case-insensitive, with `enumerate` and `discounted` as shorthands.
impl FromStr for EstimatorKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tiered" => Ok(Self::Tiered),
            "enumeration" | "enumerate" => Ok(Self::Enumeration),
            "discount" | "discounted" => Ok(Self::Discount),
            _ => Err(()),
        }
    }
}

/// The proportion of a solution space kept by a constraint of each kind, when discounting.
///
/// Range constraints are applied exactly, and are not discounted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiscountTable {
    pub type_constraint: f64,
    pub return_value: f64,
    pub loop_behavior: f64,
    pub position: f64,
    pub custom: f64,
}

impl Default for DiscountTable {
    fn default() -> Self {
        use super::defaults::*;
        DiscountTable {
            type_constraint: DISCOUNT_TYPE,
            return_value: DISCOUNT_RETURN_VALUE,
            loop_behavior: DISCOUNT_LOOP_BEHAVIOR,
            position: DISCOUNT_POSITION,
            custom: DISCOUNT_CUSTOM,
        }
    }
}

impl DiscountTable {
    pub fn factor(&self, kind: ConstraintKind) -> f64 {
        let factor = match kind {
            ConstraintKind::Type => self.type_constraint,
            ConstraintKind::ReturnValue => self.return_value,
            ConstraintKind::LoopBehavior => self.loop_behavior,
            ConstraintKind::Position => self.position,
            ConstraintKind::Custom => self.custom,
        };
        factor.clamp(0.0, 1.0)
    }
}
