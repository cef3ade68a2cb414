//! Linear model helpers.
//!
//! Small, pure functions for building design matrices and evaluating fitted
//! coefficients, so callers and the sample generator share one definition.

pub mod model;

pub use model::*;
