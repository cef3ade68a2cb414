//! Normal equations kept in factored form.
//!
//! `NormalEquations` holds a lower-triangular `L` and `xty` with
//!
//! ```text
//! L Lᵗ = Xₛᵗ W Xₛ,    xty = Xₛᵗ W y
//! ```
//!
//! for the subset `S` it currently represents. Moving to a new subset applies a
//! rank-one update per entering observation and a rank-one downdate per leaving
//! one (Golub & Van Loan, *Matrix Computations*, 12.5). All updates run before
//! any downdate. A downdate can make the factor indefinite; the transition is
//! then rolled back from a snapshot and reported as `RankDeficient`.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::domain::{Observations, Subset};
use crate::error::BaconError;
use crate::math::RANK_TOLERANCE;

/// Work size (`n * p`) above which column sums run in parallel.
pub const PARALLEL_MIN_SIZE: usize = 4096;

/// Rank-one update `L Lᵗ + u uᵗ`. `u` is consumed as workspace.
pub fn chol_update(l: &mut DMatrix<f64>, u: &mut DVector<f64>) {
    let p = l.nrows();
    for i in 0..p {
        let lii = l[(i, i)];
        let a = lii.hypot(u[i]);
        let b = a / lii;
        let c = u[i] / lii;
        l[(i, i)] = a;

        for j in (i + 1)..p {
            l[(j, i)] = (l[(j, i)] + c * u[j]) / b;
            u[j] = b * u[j] - c * l[(j, i)];
        }
    }
}

/// Rank-one downdate `L Lᵗ - u uᵗ`. `u` is consumed as workspace.
///
/// Fails when a new squared diagonal drops below `f64::EPSILON`, or below
/// `RANK_TOLERANCE` times the old one. The relative test catches subsets that
/// are exactly rank deficient but keep a roundoff-sized diagonal. `l` is left
/// partially modified on failure; callers restore it from a snapshot.
pub fn chol_downdate(l: &mut DMatrix<f64>, u: &mut DVector<f64>) -> Result<(), BaconError> {
    let p = l.nrows();
    for i in 0..p {
        let lii = l[(i, i)];
        let a2 = lii * lii - u[i] * u[i];
        if !(a2 >= f64::EPSILON && a2 >= RANK_TOLERANCE * lii * lii) {
            return Err(BaconError::RankDeficient);
        }
        let a = a2.sqrt();
        let b = a / lii;
        let c = u[i] / lii;
        l[(i, i)] = a;

        for j in (i + 1)..p {
            l[(j, i)] = (l[(j, i)] - c * u[j]) / b;
            u[j] = b * u[j] - c * l[(j, i)];
        }
    }
    Ok(())
}

/// Counts of one subset transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionStats {
    pub updates: usize,
    pub downdates: usize,
}

/// Factored normal equations plus their rollback snapshot.
#[derive(Debug, Clone)]
pub struct NormalEquations {
    l: DMatrix<f64>,
    xty: DVector<f64>,
    saved_l: DMatrix<f64>,
    saved_xty: DVector<f64>,
    u: DVector<f64>,
    leaving: Vec<usize>,
}

impl NormalEquations {
    pub fn new(n: usize, p: usize) -> Self {
        Self {
            l: DMatrix::zeros(p, p),
            xty: DVector::zeros(p),
            saved_l: DMatrix::zeros(p, p),
            saved_xty: DVector::zeros(p),
            u: DVector::zeros(p),
            leaving: Vec::with_capacity(n),
        }
    }

    pub fn factor(&self) -> &DMatrix<f64> {
        &self.l
    }

    pub fn factor_mut(&mut self) -> &mut DMatrix<f64> {
        &mut self.l
    }

    pub fn xty(&self) -> &DVector<f64> {
        &self.xty
    }

    /// Recompute `xty = Xₛᵗ W y` from scratch.
    pub fn accumulate_xty(&mut self, obs: &Observations, subset: &Subset) {
        let (x, y, w) = (obs.x(), obs.y(), obs.weights());
        let members = subset.members();
        let column_sum = |j: usize| -> f64 {
            members
                .iter()
                .enumerate()
                .filter(|&(_, &m)| m)
                .map(|(i, _)| w[i] * x[(i, j)] * y[i])
                .sum()
        };

        if obs.n() * obs.p() > PARALLEL_MIN_SIZE {
            self.xty
                .as_mut_slice()
                .par_iter_mut()
                .enumerate()
                .for_each(|(j, v)| *v = column_sum(j));
        } else {
            for (j, v) in self.xty.iter_mut().enumerate() {
                *v = column_sum(j);
            }
        }
    }

    /// Move from representing `from` to representing `to`.
    ///
    /// On error the factor and `xty` are exactly what they were before the call.
    pub fn transition(
        &mut self,
        obs: &Observations,
        from: &Subset,
        to: &Subset,
    ) -> Result<TransitionStats, BaconError> {
        self.saved_l.copy_from(&self.l);
        self.saved_xty.copy_from(&self.xty);
        self.leaving.clear();

        let mut stats = TransitionStats::default();
        for i in 0..obs.n() {
            match (from.contains(i), to.contains(i)) {
                (false, true) => {
                    self.load_row(obs, i, 1.0);
                    chol_update(&mut self.l, &mut self.u);
                    stats.updates += 1;
                }
                (true, false) => self.leaving.push(i),
                _ => {}
            }
        }

        for k in 0..self.leaving.len() {
            let i = self.leaving[k];
            self.load_row(obs, i, -1.0);
            if let Err(err) = chol_downdate(&mut self.l, &mut self.u) {
                self.restore();
                return Err(err);
            }
            stats.downdates += 1;
        }

        Ok(stats)
    }

    /// Solve `L Lᵗ β = xty`.
    pub fn solve_into(&self, beta: &mut DVector<f64>) -> Result<(), BaconError> {
        beta.copy_from(&self.xty);
        if !self.l.solve_lower_triangular_mut(beta) {
            return Err(BaconError::TriangularMatrixSingular);
        }
        if !self.l.tr_solve_lower_triangular_mut(beta) {
            return Err(BaconError::TriangularMatrixSingular);
        }
        Ok(())
    }

    /// Fill `u = sqrt(w_i) x_i` and add `sign * w_i y_i x_i` to `xty`.
    fn load_row(&mut self, obs: &Observations, i: usize, sign: f64) {
        let x = obs.x();
        let w = obs.weights()[i];
        let y = obs.y()[i];
        let sw = w.sqrt();
        for j in 0..obs.p() {
            self.u[j] = sw * x[(i, j)];
            self.xty[j] += sign * w * x[(i, j)] * y;
        }
    }

    fn restore(&mut self) {
        self.l.copy_from(&self.saved_l);
        self.xty.copy_from(&self.saved_xty);
    }
}
