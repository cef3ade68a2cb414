//! Residual scale estimators.
//!
//! The driver asks for a scale `σ` before every discrepancy computation. The
//! default is the weighted residual standard deviation over the subset with a
//! degrees-of-freedom correction:
//!
//! ```text
//! σ² = (Σₛ w_i r_i² / Σₛ w_i) · m / (m - p)
//! ```
//!
//! The correction is skipped when `m <= p`. Every estimate is floored at
//! `f64::MIN_POSITIVE` so discrepancies stay finite.

use nalgebra::DVector;

use crate::domain::Subset;

/// Scale of the residuals of the current subset fit.
pub trait ScaleEstimator {
    fn estimate(
        &self,
        resid: &DVector<f64>,
        weights: &DVector<f64>,
        subset: &Subset,
        p: usize,
    ) -> f64;
}

/// Weighted residual standard deviation over the subset.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedResidualScale;

impl ScaleEstimator for WeightedResidualScale {
    fn estimate(
        &self,
        resid: &DVector<f64>,
        weights: &DVector<f64>,
        subset: &Subset,
        p: usize,
    ) -> f64 {
        let (mut ssr, mut sw) = (0.0, 0.0);
        for i in subset.indices() {
            ssr += weights[i] * resid[i] * resid[i];
            sw += weights[i];
        }
        if !(sw > 0.0) {
            return f64::MIN_POSITIVE;
        }

        let m = subset.len();
        let mut var = ssr / sw;
        if m > p {
            var *= m as f64 / (m - p) as f64;
        }
        var.sqrt().max(f64::MIN_POSITIVE)
    }
}

/// Normalized median absolute residual over the subset, ignoring weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct MadScale;

impl ScaleEstimator for MadScale {
    fn estimate(
        &self,
        resid: &DVector<f64>,
        _weights: &DVector<f64>,
        subset: &Subset,
        _p: usize,
    ) -> f64 {
        let mut abs: Vec<f64> = subset
            .indices()
            .map(|i| resid[i].abs())
            .filter(|v| v.is_finite())
            .collect();
        let mad = median_mut(&mut abs).unwrap_or(0.0);
        (mad / 0.6745).max(f64::MIN_POSITIVE)
    }
}

/// Known scale.
#[derive(Debug, Clone, Copy)]
pub struct FixedScale(pub f64);

impl ScaleEstimator for FixedScale {
    fn estimate(
        &self,
        _resid: &DVector<f64>,
        _weights: &DVector<f64>,
        _subset: &Subset,
        _p: usize,
    ) -> f64 {
        self.0.max(f64::MIN_POSITIVE)
    }
}

fn median_mut(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}
