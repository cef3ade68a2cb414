//! Design rows and prediction for `y = x_iᵗ β`.
//!
//! The intercept, when present, is the first column.

use nalgebra::{DMatrix, DVector};

/// Fill a design row from regressor values, optionally with a leading 1.
///
/// # Panics
/// Panics if `out` does not have length `regressors.len() + intercept as usize`.
pub fn fill_design_row(regressors: &[f64], intercept: bool, out: &mut [f64]) {
    let offset = usize::from(intercept);
    assert_eq!(out.len(), regressors.len() + offset, "design row length");
    if intercept {
        out[0] = 1.0;
    }
    out[offset..].copy_from_slice(regressors);
}

/// Prepend a column of ones.
pub fn design_with_intercept(regressors: &DMatrix<f64>) -> DMatrix<f64> {
    regressors.clone().insert_column(0, 1.0)
}

/// Predict `y` for one design row.
pub fn predict(beta: &DVector<f64>, row: &[f64]) -> f64 {
    beta.iter().zip(row).map(|(b, x)| b * x).sum()
}
