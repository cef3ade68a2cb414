//! Numerical kernels: weighted least squares, factor maintenance and leverages.

pub mod cholesky;
pub mod leverage;
pub mod ols;

pub use cholesky::*;
pub use leverage::*;
pub use ols::*;
