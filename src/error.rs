use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures of a weighted BACON fit.
///
/// `InvalidInput` is returned before any work starts. The algorithmic variants
/// are recorded on [`crate::BaconFit`] so the last computed state can still be
/// inspected.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum BaconError {
    #[error("design matrix is rank deficient on the current subset")]
    RankDeficient,

    #[error("triangular factor is singular; leverages cannot be computed")]
    TriangularMatrixSingular,

    #[error("subset refinement did not converge within {max_iter} iterations")]
    ConvergenceFailure { max_iter: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("Student-t quantile unavailable: {0}")]
    Quantile(String),
}

impl BaconError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Whether the driver can recover by enlarging the subset.
    pub fn is_rank_deficient(&self) -> bool {
        matches!(self, Self::RankDeficient)
    }
}
