//! Shared domain types.
//!
//! Observations are immutable for the duration of a fit. Subsets are plain
//! membership vectors with a cached cardinality so the driver can copy one into
//! another without reallocating.

use nalgebra::{DMatrix, DVector, Dyn, QR};
use serde::{Deserialize, Serialize};

use crate::error::BaconError;

/// Design matrix, response and per-observation weights.
#[derive(Debug, Clone)]
pub struct Observations {
    x: DMatrix<f64>,
    y: DVector<f64>,
    weights: DVector<f64>,
}

impl Observations {
    /// Validate and wrap the inputs of one fit.
    ///
    /// Requires `n > p >= 1`, finite values everywhere and nonnegative weights.
    pub fn new(
        x: DMatrix<f64>,
        y: DVector<f64>,
        weights: DVector<f64>,
    ) -> Result<Self, BaconError> {
        let (n, p) = x.shape();
        if p == 0 {
            return Err(BaconError::invalid("design matrix has no columns"));
        }
        if n <= p {
            return Err(BaconError::invalid(format!(
                "need more observations than columns: n={n}, p={p}"
            )));
        }
        if y.len() != n {
            return Err(BaconError::invalid(format!(
                "response has length {}, expected {n}",
                y.len()
            )));
        }
        if weights.len() != n {
            return Err(BaconError::invalid(format!(
                "weights have length {}, expected {n}",
                weights.len()
            )));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(BaconError::invalid("design matrix and response must be finite"));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(BaconError::invalid("weights must be finite and nonnegative"));
        }
        Ok(Self { x, y, weights })
    }

    /// Unit weights.
    pub fn unweighted(x: DMatrix<f64>, y: DVector<f64>) -> Result<Self, BaconError> {
        let n = x.nrows();
        Self::new(x, y, DVector::from_element(n, 1.0))
    }

    pub fn n(&self) -> usize {
        self.x.nrows()
    }

    pub fn p(&self) -> usize {
        self.x.ncols()
    }

    pub fn x(&self) -> &DMatrix<f64> {
        &self.x
    }

    pub fn y(&self) -> &DVector<f64> {
        &self.y
    }

    pub fn weights(&self) -> &DVector<f64> {
        &self.weights
    }

    /// Same data with every weight multiplied by `factor`.
    pub fn with_scaled_weights(&self, factor: f64) -> Result<Self, BaconError> {
        Self::new(self.x.clone(), self.y.clone(), &self.weights * factor)
    }
}

/// Membership vector over the n observations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subset {
    members: Vec<bool>,
    size: usize,
}

impl Subset {
    pub fn empty(n: usize) -> Self {
        Self {
            members: vec![false; n],
            size: 0,
        }
    }

    pub fn from_members(members: Vec<bool>) -> Self {
        let size = members.iter().filter(|&&m| m).count();
        Self { members, size }
    }

    /// Subset containing exactly `indices`. Out-of-range indices are an error.
    pub fn from_indices(n: usize, indices: &[usize]) -> Result<Self, BaconError> {
        let mut subset = Self::empty(n);
        for &i in indices {
            if i >= n {
                return Err(BaconError::invalid(format!(
                    "subset index {i} out of range for n={n}"
                )));
            }
            subset.insert(i);
        }
        Ok(subset)
    }

    /// Number of observations the subset ranges over.
    pub fn n(&self) -> usize {
        self.members.len()
    }

    /// Cardinality m.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn contains(&self, i: usize) -> bool {
        self.members[i]
    }

    /// Add observation `i`; returns `false` if it was already a member.
    pub fn insert(&mut self, i: usize) -> bool {
        if self.members[i] {
            return false;
        }
        self.members[i] = true;
        self.size += 1;
        true
    }

    pub fn members(&self) -> &[bool] {
        &self.members
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.members
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| m.then_some(i))
    }

    /// Copy `other` into `self` without reallocating.
    pub fn assign(&mut self, other: &Subset) {
        self.members.copy_from_slice(&other.members);
        self.size = other.size;
    }

    /// Rebuild membership from a predicate over observation indices.
    pub fn assign_with(&mut self, mut member: impl FnMut(usize) -> bool) {
        let mut size = 0;
        for (i, slot) in self.members.iter_mut().enumerate() {
            *slot = member(i);
            size += usize::from(*slot);
        }
        self.size = size;
    }
}

/// Initial subset and discrepancies produced by an external seed generator.
#[derive(Debug, Clone)]
pub struct Seed {
    pub subset: Subset,
    pub discrepancy: Vec<f64>,
}

impl Seed {
    pub fn new(subset: Subset, discrepancy: Vec<f64>) -> Self {
        Self {
            subset,
            discrepancy,
        }
    }

    pub(crate) fn validate(&self, n: usize) -> Result<(), BaconError> {
        if self.subset.n() != n || self.discrepancy.len() != n {
            return Err(BaconError::invalid(format!(
                "seed covers {} observations with {} discrepancies, expected {n}",
                self.subset.n(),
                self.discrepancy.len()
            )));
        }
        if self.subset.is_empty() {
            return Err(BaconError::invalid("seed subset is empty"));
        }
        if self.discrepancy.iter().any(|d| d.is_nan()) {
            return Err(BaconError::invalid("seed discrepancies must not be NaN"));
        }
        Ok(())
    }
}

/// Tuning of one fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaconConfig {
    /// Significance level of the Bonferroni-corrected Student-t cutoff.
    pub alpha: f64,
    /// Maximum number of refinement iterations.
    pub max_iter: usize,
    /// Growth stops once the subset reaches `collect * p` observations.
    pub collect: usize,
    /// Emit progress at `info` instead of `debug`.
    pub verbose: bool,
}

impl Default for BaconConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            max_iter: 50,
            collect: 4,
            verbose: false,
        }
    }
}

impl BaconConfig {
    pub fn validate(&self) -> Result<(), BaconError> {
        if !(self.alpha.is_finite() && self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(BaconError::invalid(format!(
                "alpha must lie in (0, 1), got {}",
                self.alpha
            )));
        }
        if self.max_iter == 0 {
            return Err(BaconError::invalid("max_iter must be positive"));
        }
        if self.collect < 2 {
            return Err(BaconError::invalid(format!(
                "collect must be at least 2, got {}",
                self.collect
            )));
        }
        Ok(())
    }

    /// Subset size at which growth stops, capped at n.
    pub fn growth_target(&self, n: usize, p: usize) -> usize {
        self.collect.saturating_mul(p).min(n)
    }
}

/// Driver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Initial,
    Growing,
    Refining,
    Converged,
    Failed,
}

impl Phase {
    pub fn display_name(self) -> &'static str {
        match self {
            Phase::Initial => "initial subset",
            Phase::Growing => "subset growth",
            Phase::Refining => "refinement",
            Phase::Converged => "converged",
            Phase::Failed => "failed",
        }
    }
}

/// Outputs of one fit.
///
/// When `success` is false the vectors hold whatever was last computed and
/// must not be read as a robust fit.
#[derive(Debug, Clone)]
pub struct BaconFit {
    pub beta: DVector<f64>,
    pub residuals: DVector<f64>,
    pub discrepancy: DVector<f64>,
    pub subset: Subset,
    /// Refinement iterations used (the convergence iteration on success).
    pub iterations: usize,
    pub success: bool,
    /// Terminal phase: `Converged` or `Failed`.
    pub phase: Phase,
    pub error: Option<BaconError>,
    /// Lower-triangular L with `L Lᵗ = XₛᵗWXₛ` for the final subset.
    pub factor: DMatrix<f64>,
    /// QR factorization of the last weighted subset fit.
    pub qr: Option<QR<f64, Dyn, Dyn>>,
}

impl BaconFit {
    pub fn subset_size(&self) -> usize {
        self.subset.len()
    }

    /// Observations outside the final subset.
    pub fn outliers(&self) -> Vec<usize> {
        (0..self.subset.n())
            .filter(|&i| !self.subset.contains(i))
            .collect()
    }

    pub fn fitted_values(&self, x: &DMatrix<f64>) -> DVector<f64> {
        x * &self.beta
    }

    pub fn into_result(self) -> Result<Self, BaconError> {
        if self.success {
            return Ok(self);
        }
        Err(self.error.unwrap_or(BaconError::RankDeficient))
    }
}
