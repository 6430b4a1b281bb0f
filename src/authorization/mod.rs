//! Authorization rules that run after authentication has resolved a `Principal`.
//!
//! Both evaluators are plain functions of their inputs: no I/O, no shared state.

/// Age gate driven by the `date_of_birth` claim.
pub mod age;

/// Ownership/role decisions for mutating a restaurant.
pub mod resource;

pub use age::{AgeCheck, MinimumAgeRequirement};
pub use resource::{Decision, ResourceOperation};
