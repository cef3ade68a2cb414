//! Weighted least squares solver.
//!
//! We repeatedly solve problems of the form:
//!
//! ```text
//! minimize Σ w_i (y_i - x_i^T β)^2
//! ```
//!
//! where `w_i` is the observation weight times its subset membership, so
//! observations outside the subset carry zero weight.
//!
//! Implementation choices:
//! - We scale rows by `sqrt(w_i)` and factor the scaled design with a Householder
//!   QR (`nalgebra::QR`), then back-substitute against `R`.
//! - Rank is judged on the diagonal of `R`: any `|R_ii| < sqrt(ε)` rejects the
//!   fit. Near-singular designs never produce an exact zero pivot, so a
//!   tolerance is required.
//! - Residuals are reported against the *unweighted* design.
//!
//! Buffers are sized up front: `WlsWorkspace::required_len` answers the sizing
//! query without touching data, and `WlsWorkspace::with_capacity` refuses
//! anything smaller.

use nalgebra::{DMatrix, DVector, Dyn, QR};

use crate::error::BaconError;

/// `sqrt(f64::EPSILON)`.
pub const RANK_TOLERANCE: f64 = 1.490_116_119_384_765_6e-8;

/// Scratch space for one weighted solve.
///
/// `nalgebra::QR` takes ownership of the matrix it factors, so each solve
/// writes the scaled design straight into a fresh `n × p` buffer that becomes
/// the stored factorization. No second copy of the design is kept.
#[derive(Debug, Clone)]
pub struct WlsWorkspace {
    n: usize,
    p: usize,
    wy: DVector<f64>,
    coef: DVector<f64>,
    r: DMatrix<f64>,
    qr: Option<QR<f64, Dyn, Dyn>>,
}

impl WlsWorkspace {
    /// Number of `f64` slots needed for an `n × p` problem.
    pub fn required_len(n: usize, p: usize) -> usize {
        n * p + n + p + p * p
    }

    /// Allocate a workspace for an `n × p` problem with `capacity` slots.
    pub fn with_capacity(n: usize, p: usize, capacity: usize) -> Result<Self, BaconError> {
        let required = Self::required_len(n, p);
        if capacity < required {
            return Err(BaconError::invalid(format!(
                "least squares workspace too small: {capacity} < {required}"
            )));
        }
        Ok(Self::new(n, p))
    }

    pub fn new(n: usize, p: usize) -> Self {
        Self {
            n,
            p,
            wy: DVector::zeros(n),
            coef: DVector::zeros(p),
            r: DMatrix::zeros(p, p),
            qr: None,
        }
    }

    /// QR factorization of the weighted design from the last successful solve.
    pub fn factorization(&self) -> Option<&QR<f64, Dyn, Dyn>> {
        self.qr.as_ref()
    }

    pub fn take_factorization(&mut self) -> Option<QR<f64, Dyn, Dyn>> {
        self.qr.take()
    }

    /// Write `Rᵗ` (lower triangular, positive diagonal) into `l`.
    pub fn lower_factor_into(&self, l: &mut DMatrix<f64>) {
        self.r.transpose_to(l);
        for j in 0..l.ncols() {
            if l[(j, j)] < 0.0 {
                l.column_mut(j).neg_mut();
            }
        }
    }
}

/// Solve the weighted problem, writing coefficients and unweighted residuals.
///
/// `weights` are the effective weights (zero excludes an observation). On
/// `RankDeficient` neither `beta` nor `resid` is touched.
pub fn solve_weighted_least_squares(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    weights: &[f64],
    ws: &mut WlsWorkspace,
    beta: &mut DVector<f64>,
    resid: &mut DVector<f64>,
) -> Result<(), BaconError> {
    let (n, p) = x.shape();
    if (ws.n, ws.p) != (n, p) || weights.len() != n || y.len() != n {
        return Err(BaconError::invalid(format!(
            "least squares workspace is {} x {}, problem is {n} x {p}",
            ws.n, ws.p
        )));
    }

    let wx = DMatrix::from_fn(n, p, |i, j| weights[i].sqrt() * x[(i, j)]);
    for (i, &w) in weights.iter().enumerate() {
        ws.wy[i] = w.sqrt() * y[i];
    }

    let qr = QR::new(wx);
    let r = qr.r();
    if (0..p).any(|i| r[(i, i)].abs() < RANK_TOLERANCE) {
        return Err(BaconError::RankDeficient);
    }

    qr.q_tr_mul(&mut ws.wy);
    ws.coef.copy_from(&ws.wy.rows(0, p));
    if !r.solve_upper_triangular_mut(&mut ws.coef) {
        return Err(BaconError::RankDeficient);
    }

    beta.copy_from(&ws.coef);
    resid.copy_from(y);
    resid.gemv(-1.0, x, beta, 1.0);

    ws.r.copy_from(&r);
    ws.qr = Some(qr);
    Ok(())
}
