//! Leverages and discrepancy scores.
//!
//! With `L Lᵗ = Xₛᵗ W Xₛ` the weighted leverage of observation `i` is
//!
//! ```text
//! h_i = w_i x_iᵗ (Xₛᵗ W Xₛ)⁻¹ x_i = w_i ‖L⁻¹ x_i‖²
//! ```
//!
//! and its discrepancy is `|r_i| / (σ sqrt(1 ∓ h_i))`, minus for subset
//! members and plus for the rest. Leverages use the raw weights for every
//! observation, including those outside the subset.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::domain::Subset;
use crate::error::BaconError;
use crate::math::PARALLEL_MIN_SIZE;

/// Scratch space for leverage computation.
#[derive(Debug, Clone)]
pub struct LeverageWorkspace {
    l_inv: DMatrix<f64>,
    hat: DVector<f64>,
}

impl LeverageWorkspace {
    pub fn new(n: usize, p: usize) -> Self {
        Self {
            l_inv: DMatrix::zeros(p, p),
            hat: DVector::zeros(n),
        }
    }

    /// Leverages from the last `hat_diagonal` call.
    pub fn hat(&self) -> &DVector<f64> {
        &self.hat
    }
}

/// Fill `ws.hat` with the weighted leverage of every observation.
pub fn hat_diagonal(
    x: &DMatrix<f64>,
    weights: &DVector<f64>,
    l: &DMatrix<f64>,
    ws: &mut LeverageWorkspace,
) -> Result<(), BaconError> {
    let (n, p) = x.shape();
    ws.l_inv.fill_with_identity();
    if !l.solve_lower_triangular_mut(&mut ws.l_inv) {
        return Err(BaconError::TriangularMatrixSingular);
    }
    if ws.l_inv.iter().any(|v| !v.is_finite()) {
        return Err(BaconError::TriangularMatrixSingular);
    }

    let l_inv = &ws.l_inv;
    let leverage = |i: usize| -> f64 {
        let mut norm2 = 0.0;
        for j in 0..p {
            let mut z = 0.0;
            for k in 0..=j {
                z += l_inv[(j, k)] * x[(i, k)];
            }
            norm2 += z * z;
        }
        weights[i] * norm2
    };

    if n * p > PARALLEL_MIN_SIZE {
        ws.hat
            .as_mut_slice()
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, h)| *h = leverage(i));
    } else {
        for (i, h) in ws.hat.iter_mut().enumerate() {
            *h = leverage(i);
        }
    }
    Ok(())
}

/// Discrepancy scores for the given residuals and leverages.
///
/// `1 ∓ h_i` is floored at `f64::EPSILON`: a subset member with leverage one
/// would otherwise divide by zero.
pub fn discrepancies(
    resid: &DVector<f64>,
    hat: &DVector<f64>,
    subset: &Subset,
    sigma: f64,
    out: &mut DVector<f64>,
) {
    for (i, d) in out.iter_mut().enumerate() {
        let sign = if subset.contains(i) { -1.0 } else { 1.0 };
        let denom = (1.0 + sign * hat[i]).max(f64::EPSILON).sqrt();
        *d = resid[i].abs() / (sigma * denom);
    }
}
