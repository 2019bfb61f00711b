//! Abstract elements of plans and refinements, and their representation.
//!
//! - [Literals](literal) pair a [subject](literal::SubjectId) with a polarity.
//! - [Clauses](clause) are nogoods: collections of literals which must not all hold.
//! - [Steps and plans](step) are handed to a [PlanContext](crate::context::PlanContext) by some external deriver.
//! - [Holes](hole) and their [constraints](constraint) are refined within a [RefinementContext](crate::propagation::RefinementContext).

pub mod clause;
pub mod constraint;
pub mod hole;
pub mod literal;
pub mod step;
