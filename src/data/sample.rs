//! Synthetic contaminated regression samples.
//!
//! Rows are drawn as `y = x_iᵗ β + σ ε_i` with uniform regressors and standard
//! normal noise. Each row is independently contaminated with probability
//! `contamination`, which adds `shift` to its response. Generation is
//! reproducible from `seed`.

use nalgebra::{DMatrix, DVector};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::domain::Observations;
use crate::error::BaconError;
use crate::models::{fill_design_row, predict};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    pub n: usize,
    /// Coefficients, intercept first.
    pub beta: Vec<f64>,
    pub noise_sd: f64,
    /// Regressors are uniform on `[-spread, spread]`.
    pub spread: f64,
    pub contamination: f64,
    pub shift: f64,
    /// Weights are uniform on `[1, weight_max]`.
    pub weight_max: f64,
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            n: 200,
            beta: vec![1.0, 2.0, -0.5],
            noise_sd: 0.5,
            spread: 5.0,
            contamination: 0.1,
            shift: 20.0,
            weight_max: 1.0,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SampleData {
    pub observations: Observations,
    pub beta: DVector<f64>,
    /// Rows whose response was shifted, ascending.
    pub contaminated: Vec<usize>,
}

pub fn generate_sample(config: &SampleConfig) -> Result<SampleData, BaconError> {
    let p = config.beta.len();
    if p == 0 {
        return Err(BaconError::invalid("sample needs at least the intercept coefficient"));
    }
    if config.n <= p {
        return Err(BaconError::invalid(format!(
            "sample size {} must exceed the number of coefficients {p}",
            config.n
        )));
    }
    if !(config.contamination >= 0.0 && config.contamination < 1.0) {
        return Err(BaconError::invalid("contamination must lie in [0, 1)"));
    }
    if !(config.spread.is_finite() && config.spread > 0.0) {
        return Err(BaconError::invalid("regressor spread must be positive"));
    }
    if !(config.weight_max.is_finite() && config.weight_max >= 1.0) {
        return Err(BaconError::invalid("weight_max must be at least 1"));
    }
    let normal = Normal::new(0.0, config.noise_sd)
        .map_err(|e| BaconError::invalid(format!("noise distribution error: {e}")))?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let beta = DVector::from_column_slice(&config.beta);
    let mut x = DMatrix::zeros(config.n, p);
    let mut y = DVector::zeros(config.n);
    let mut w = DVector::zeros(config.n);
    let mut contaminated = Vec::new();

    let mut regressors = vec![0.0; p - 1];
    let mut row = vec![0.0; p];
    for i in 0..config.n {
        for v in regressors.iter_mut() {
            *v = rng.gen_range(-config.spread..=config.spread);
        }
        fill_design_row(&regressors, true, &mut row);
        for (j, &v) in row.iter().enumerate() {
            x[(i, j)] = v;
        }

        y[i] = predict(&beta, &row) + normal.sample(&mut rng);
        if rng.gen_bool(config.contamination) {
            y[i] += config.shift;
            contaminated.push(i);
        }
        w[i] = rng.gen_range(1.0..=config.weight_max);
    }

    Ok(SampleData {
        observations: Observations::new(x, y, w)?,
        beta,
        contaminated,
    })
}
