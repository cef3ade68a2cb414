//! `wbacon` library crate.
//!
//! Weighted BACON robust linear regression: starting from a seed subset, grow a
//! subset of observations that are consistent with a weighted least squares fit
//! and flag the rest as outliers.
//!
//! - `math`: weighted least squares, Cholesky update/downdate, leverages
//! - `fit`: subset selection, cutoff, scale and the phase driver
//! - `domain`: inputs, configuration and fit outputs
//! - `models` / `data`: design helpers and synthetic samples

pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod math;
pub mod models;

pub use domain::{BaconConfig, BaconFit, Observations, Phase, Seed, Subset};
pub use error::BaconError;
pub use fit::BaconRegression;
