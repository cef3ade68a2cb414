//! Bonferroni-corrected Student-t cutoff.
//!
//! ```text
//! cutoff(m) = t⁻¹(1 - α / (2 (m + 1)); m - p)
//! ```
//!
//! `m` is the realized subset size. The quantile source is a trait so callers
//! can swap in another approximation.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::BaconError;

/// Quantile function of the standard Student-t distribution.
pub trait TQuantile {
    fn quantile(&self, prob: f64, df: f64) -> Result<f64, BaconError>;
}

/// `statrs` backed quantiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct StudentT;

impl TQuantile for StudentT {
    fn quantile(&self, prob: f64, df: f64) -> Result<f64, BaconError> {
        if !(prob > 0.0 && prob < 1.0) {
            return Err(BaconError::Quantile(format!("probability {prob} outside (0, 1)")));
        }
        let dist = StudentsT::new(0.0, 1.0, df)
            .map_err(|e| BaconError::Quantile(format!("df={df}: {e}")))?;
        let q = dist.inverse_cdf(prob);
        if !q.is_finite() {
            return Err(BaconError::Quantile(format!("t({prob}; {df}) is not finite")));
        }
        Ok(q)
    }
}

/// Cutoff for a subset of `m` observations and `p` coefficients.
pub fn bonferroni_cutoff<Q: TQuantile + ?Sized>(
    quantile: &Q,
    alpha: f64,
    m: usize,
    p: usize,
) -> Result<f64, BaconError> {
    if m <= p {
        return Err(BaconError::Quantile(format!(
            "no residual degrees of freedom: m={m}, p={p}"
        )));
    }
    let prob = 1.0 - alpha / (2.0 * (m as f64 + 1.0));
    quantile.quantile(prob, (m - p) as f64)
}
