//! Robust fitting.
//!
//! Responsibilities:
//!
//! - select subsets by discrepancy
//! - compute the Bonferroni-corrected Student-t cutoff
//! - estimate the residual scale
//! - drive the initial, growing and refining phases

pub mod cutoff;
pub mod fitter;
pub mod scale;
pub mod selection;

pub use cutoff::*;
pub use fitter::*;
pub use scale::*;
pub use selection::*;
