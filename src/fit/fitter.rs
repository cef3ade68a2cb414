//! Weighted BACON driver.
//!
//! Starting from an externally supplied seed subset the driver runs three phases:
//!
//! 1. **Initial**: weighted least squares on the seed. A rank deficient seed is
//!    enlarged one observation at a time (smallest seed discrepancy first).
//! 2. **Growing**: the subset grows from `p + 1` towards `collect * p`
//!    observations, picking the smallest discrepancies each step. The factored
//!    normal equations are carried along by rank-one updates and downdates
//!    instead of refitting.
//! 3. **Refining**: full refits on the subset; the next subset is every
//!    observation whose discrepancy falls below the Bonferroni-corrected
//!    Student-t cutoff. Stops at a fixed point or after `max_iter` rounds.
//!
//! All scratch memory lives in one `Workspace`, allocated up front and dropped
//! on every exit path.

use std::fmt;

use nalgebra::{DMatrix, DVector};

use crate::domain::{BaconConfig, BaconFit, Observations, Phase, Seed, Subset};
use crate::error::BaconError;
use crate::fit::cutoff::{StudentT, TQuantile, bonferroni_cutoff};
use crate::fit::scale::{ScaleEstimator, WeightedResidualScale};
use crate::fit::selection::{select_subset, smallest_outside};
use crate::math::{
    LeverageWorkspace, NormalEquations, WlsWorkspace, discrepancies, hat_diagonal,
    solve_weighted_least_squares,
};

/// Robust regression by weighted BACON.
#[derive(Debug, Clone)]
pub struct BaconRegression<S = WeightedResidualScale, Q = StudentT> {
    config: BaconConfig,
    scale: S,
    quantile: Q,
}

impl BaconRegression {
    pub fn new(config: BaconConfig) -> Self {
        Self {
            config,
            scale: WeightedResidualScale,
            quantile: StudentT,
        }
    }
}

impl Default for BaconRegression {
    fn default() -> Self {
        Self::new(BaconConfig::default())
    }
}

impl<S: ScaleEstimator, Q: TQuantile> BaconRegression<S, Q> {
    /// Replace the residual scale estimator.
    pub fn with_scale<S2: ScaleEstimator>(self, scale: S2) -> BaconRegression<S2, Q> {
        BaconRegression {
            config: self.config,
            scale,
            quantile: self.quantile,
        }
    }

    /// Replace the Student-t quantile source.
    pub fn with_quantile<Q2: TQuantile>(self, quantile: Q2) -> BaconRegression<S, Q2> {
        BaconRegression {
            config: self.config,
            scale: self.scale,
            quantile,
        }
    }

    pub fn config(&self) -> &BaconConfig {
        &self.config
    }

    /// Fit `obs` starting from `seed`.
    ///
    /// Invalid configuration or inputs are returned as `Err`. Algorithmic
    /// failures still produce a `BaconFit` with `success == false` and the
    /// cause in `error`; use [`BaconFit::into_result`] to fold them in.
    pub fn fit(&self, obs: &Observations, seed: &Seed) -> Result<BaconFit, BaconError> {
        self.config.validate()?;
        seed.validate(obs.n())?;

        let mut ws = Workspace::new(obs, seed)?;
        let mut phase = Phase::Initial;
        let mut iterations = 0;

        let outcome = loop {
            let step = match phase {
                Phase::Initial => self.initial(obs, &mut ws).map(|()| Phase::Growing),
                Phase::Growing => self.grow(obs, &mut ws).map(|()| Phase::Refining),
                Phase::Refining => self
                    .refine(obs, &mut ws, &mut iterations)
                    .map(|()| Phase::Converged),
                Phase::Converged | Phase::Failed => break Ok(()),
            };
            match step {
                Ok(next) => {
                    self.progress(format_args!(
                        "{} done: subset size {}",
                        phase.display_name(),
                        ws.subset.len()
                    ));
                    phase = next;
                }
                Err(err) => {
                    log::warn!("{} failed: {err}", phase.display_name());
                    break Err(err);
                }
            }
        };

        let (phase, success, error) = match outcome {
            Ok(()) => (Phase::Converged, true, None),
            Err(err) => (Phase::Failed, false, Some(err)),
        };
        if success {
            self.progress(format_args!(
                "converged after {iterations} iterations, {} of {} observations retained",
                ws.subset.len(),
                obs.n()
            ));
        }

        Ok(ws.into_fit(phase, success, error, iterations))
    }

    fn initial(&self, obs: &Observations, ws: &mut Workspace) -> Result<(), BaconError> {
        loop {
            match ws.solve_subset(obs) {
                Ok(()) => break,
                Err(err) if err.is_rank_deficient() => {
                    let next = smallest_outside(ws.dist.as_slice(), &ws.subset).ok_or(err)?;
                    ws.subset.insert(next);
                    self.progress(format_args!(
                        "initial subset rank deficient; added observation {next}"
                    ));
                }
                Err(err) => return Err(err),
            }
        }
        self.update_discrepancies(obs, ws)?;
        Ok(())
    }

    fn grow(&self, obs: &Observations, ws: &mut Workspace) -> Result<(), BaconError> {
        let (n, p) = (obs.n(), obs.p());
        let target = self.config.growth_target(n, p);
        let mut m = p + 1;
        select_subset(ws.dist.as_slice(), m, &mut ws.scratch, &mut ws.candidate);

        loop {
            let mut enlarged = false;
            loop {
                match ws.normal.transition(obs, &ws.subset, &ws.candidate) {
                    Ok(stats) => {
                        log::trace!(
                            "m={m}: {} updates, {} downdates",
                            stats.updates,
                            stats.downdates
                        );
                        break;
                    }
                    Err(err) if err.is_rank_deficient() => {
                        // An enlarged candidate at the ceiling gets no further retry.
                        if enlarged && m >= target {
                            return Err(err);
                        }
                        let next = smallest_outside(ws.dist.as_slice(), &ws.candidate).ok_or(err)?;
                        ws.candidate.insert(next);
                        m += 1;
                        enlarged = true;
                        self.progress(format_args!(
                            "rank deficient subset enlarged to {m} with observation {next}"
                        ));
                    }
                    Err(err) => return Err(err),
                }
            }

            ws.subset.assign(&ws.candidate);
            ws.normal.solve_into(&mut ws.beta)?;
            ws.resid.copy_from(obs.y());
            ws.resid.gemv(-1.0, obs.x(), &ws.beta, 1.0);
            let sigma = self.update_discrepancies(obs, ws)?;
            log::debug!("grow m={m}: size {}, sigma {sigma:.6}", ws.subset.len());

            m += 1;
            if m > target {
                return Ok(());
            }
            select_subset(ws.dist.as_slice(), m, &mut ws.scratch, &mut ws.candidate);
        }
    }

    fn refine(
        &self,
        obs: &Observations,
        ws: &mut Workspace,
        iterations: &mut usize,
    ) -> Result<(), BaconError> {
        let p = obs.p();
        for iter in 1..=self.config.max_iter {
            *iterations = iter;
            let (m, cutoff) = self.refine_step(obs, ws)?;

            if ws.candidate == ws.subset {
                return Ok(());
            }
            self.progress(format_args!(
                "iteration {iter}: subset {m} -> {} (cutoff {cutoff:.4})",
                ws.candidate.len()
            ));
            if ws.candidate.len() <= p {
                return Err(BaconError::RankDeficient);
            }
            ws.subset.assign(&ws.candidate);
        }
        Err(BaconError::ConvergenceFailure {
            max_iter: self.config.max_iter,
        })
    }

    /// Refit on the current subset and write the next subset into
    /// `ws.candidate`. Returns the current size and the cutoff used.
    fn refine_step(
        &self,
        obs: &Observations,
        ws: &mut Workspace,
    ) -> Result<(usize, f64), BaconError> {
        ws.solve_subset(obs)?;
        self.update_discrepancies(obs, ws)?;

        let m = ws.subset.len();
        let cutoff = bonferroni_cutoff(&self.quantile, self.config.alpha, m, obs.p())?;
        let dist = &ws.dist;
        ws.candidate.assign_with(|i| dist[i] < cutoff);
        Ok((m, cutoff))
    }

    /// Recompute `σ`, the leverages and the discrepancies for the current subset.
    fn update_discrepancies(
        &self,
        obs: &Observations,
        ws: &mut Workspace,
    ) -> Result<f64, BaconError> {
        let sigma = self
            .scale
            .estimate(&ws.resid, obs.weights(), &ws.subset, obs.p());
        hat_diagonal(obs.x(), obs.weights(), ws.normal.factor(), &mut ws.leverage)?;
        discrepancies(&ws.resid, ws.leverage.hat(), &ws.subset, sigma, &mut ws.dist);
        Ok(sigma)
    }

    fn progress(&self, args: fmt::Arguments<'_>) {
        if self.config.verbose {
            log::info!("{args}");
        } else {
            log::debug!("{args}");
        }
    }
}

/// Scratch memory of one fit.
struct Workspace {
    wls: WlsWorkspace,
    normal: NormalEquations,
    leverage: LeverageWorkspace,
    beta: DVector<f64>,
    resid: DVector<f64>,
    dist: DVector<f64>,
    effective_weights: Vec<f64>,
    subset: Subset,
    candidate: Subset,
    scratch: Vec<f64>,
}

impl Workspace {
    fn new(obs: &Observations, seed: &Seed) -> Result<Self, BaconError> {
        let (n, p) = (obs.n(), obs.p());
        let capacity = WlsWorkspace::required_len(n, p);
        Ok(Self {
            wls: WlsWorkspace::with_capacity(n, p, capacity)?,
            normal: NormalEquations::new(n, p),
            leverage: LeverageWorkspace::new(n, p),
            beta: DVector::zeros(p),
            resid: DVector::zeros(n),
            dist: DVector::from_column_slice(&seed.discrepancy),
            effective_weights: vec![0.0; n],
            subset: seed.subset.clone(),
            candidate: Subset::empty(n),
            scratch: Vec::with_capacity(n),
        })
    }

    /// Weighted least squares on the subset; on success the factored normal
    /// equations describe the subset as well.
    fn solve_subset(&mut self, obs: &Observations) -> Result<(), BaconError> {
        let w = obs.weights();
        for (i, ew) in self.effective_weights.iter_mut().enumerate() {
            *ew = if self.subset.contains(i) { w[i] } else { 0.0 };
        }
        solve_weighted_least_squares(
            obs.x(),
            obs.y(),
            &self.effective_weights,
            &mut self.wls,
            &mut self.beta,
            &mut self.resid,
        )?;
        self.wls.lower_factor_into(self.normal.factor_mut());
        self.normal.accumulate_xty(obs, &self.subset);
        Ok(())
    }

    fn into_fit(
        mut self,
        phase: Phase,
        success: bool,
        error: Option<BaconError>,
        iterations: usize,
    ) -> BaconFit {
        let factor: DMatrix<f64> = self.normal.factor().clone();
        BaconFit {
            beta: self.beta,
            residuals: self.resid,
            discrepancy: self.dist,
            subset: self.subset,
            iterations,
            success,
            phase,
            error,
            factor,
            qr: self.wls.take_factorization(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use crate::data::{SampleConfig, generate_sample};

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn seed_from(scores: Vec<f64>, m: usize) -> Seed {
        let mut subset = Subset::empty(scores.len());
        select_subset(&scores, m, &mut Vec::new(), &mut subset);
        Seed::new(subset, scores)
    }

    /// Weighted least squares on the rows in `keep`.
    fn reference_fit(obs: &Observations, keep: &Subset) -> DVector<f64> {
        let (n, p) = (obs.n(), obs.p());
        let w: Vec<f64> = (0..n)
            .map(|i| if keep.contains(i) { obs.weights()[i] } else { 0.0 })
            .collect();
        let mut ws = WlsWorkspace::new(n, p);
        let mut beta = DVector::zeros(p);
        let mut resid = DVector::zeros(n);
        solve_weighted_least_squares(obs.x(), obs.y(), &w, &mut ws, &mut beta, &mut resid).unwrap();
        beta
    }

    /// y = 2 + 3x + noise on x = 1..10, observation 7 shifted by 50.
    fn line_with_outlier() -> (Observations, Seed) {
        let noise = [0.3, -0.2, 0.1, -0.4, 0.25, -0.1, 0.35, -0.3, 0.15, -0.05];
        let xs: Vec<f64> = (1..=10).map(f64::from).collect();
        let mut y: Vec<f64> = xs.iter().zip(noise).map(|(x, e)| 2.0 + 3.0 * x + e).collect();
        y[7] += 50.0;

        let mut x = DMatrix::from_element(10, 2, 1.0);
        for (i, &v) in xs.iter().enumerate() {
            x[(i, 1)] = v;
        }
        let obs = Observations::unweighted(x, DVector::from_vec(y)).unwrap();
        let seed = seed_from(xs.iter().map(|x| (x - 5.5).abs()).collect(), 4);
        (obs, seed)
    }

    /// Low-discrepancy design in two regressors with every 50th row (offset 7) shifted.
    fn designed_sample(n: usize) -> (Observations, Seed, Vec<usize>) {
        let frac = |v: f64| v - v.floor();
        let mut x = DMatrix::zeros(n, 3);
        let mut y = DVector::zeros(n);
        let mut w = DVector::zeros(n);
        let mut scores = Vec::with_capacity(n);
        for i in 0..n {
            let t = i as f64;
            let a = 10.0 * frac(0.6180339887 * t) - 5.0;
            let b = 10.0 * frac(0.4142135623 * t);
            x[(i, 0)] = 1.0;
            x[(i, 1)] = a;
            x[(i, 2)] = b;
            y[i] = 1.5 + 2.0 * a - 0.5 * b + 0.3 * (1.7 * t).sin();
            if i % 50 == 7 {
                y[i] += 40.0;
            }
            w[i] = 1.0 + 0.5 * (i % 4) as f64;
            scores.push(a.abs() + (b - 5.0).abs());
        }
        let outliers = (0..n).filter(|i| i % 50 == 7).collect();
        let obs = Observations::new(x, y, w).unwrap();
        (obs, seed_from(scores, 12), outliers)
    }

    fn config(collect: usize) -> BaconConfig {
        BaconConfig {
            collect,
            ..BaconConfig::default()
        }
    }

    #[test]
    fn flags_single_outlier_on_a_line() {
        init_logs();
        let (obs, seed) = line_with_outlier();
        let fit = BaconRegression::new(config(2)).fit(&obs, &seed).unwrap();

        assert!(fit.success);
        assert_eq!(fit.phase, Phase::Converged);
        assert_eq!(fit.iterations, 2);
        assert_eq!(fit.outliers(), vec![7]);
        assert_relative_eq!(fit.beta[0], 2.012_573_5, epsilon = 1e-6);
        assert_relative_eq!(fit.beta[1], 3.006_103, epsilon = 1e-6);
        assert_relative_eq!(fit.beta, reference_fit(&obs, &fit.subset), epsilon = 1e-9);
        assert!(fit.discrepancy[7] > 100.0);
        assert!(fit.qr.is_some());
    }

    #[test]
    fn result_is_invariant_to_weight_scaling() {
        let (obs, seed) = line_with_outlier();
        let doubled = obs.with_scaled_weights(2.0).unwrap();
        let driver = BaconRegression::new(config(2));

        let a = driver.fit(&obs, &seed).unwrap();
        let b = driver.fit(&doubled, &seed).unwrap();
        assert_eq!(a.subset, b.subset);
        assert_eq!(a.iterations, b.iterations);
        assert_relative_eq!(a.beta, b.beta, epsilon = 1e-9);
        assert_relative_eq!(a.discrepancy, b.discrepancy, epsilon = 1e-6);
    }

    #[test]
    fn iteration_budget_is_enforced() {
        let (obs, seed) = line_with_outlier();
        let cfg = BaconConfig {
            max_iter: 1,
            ..config(2)
        };
        let fit = BaconRegression::new(cfg).fit(&obs, &seed).unwrap();

        assert!(!fit.success);
        assert_eq!(fit.phase, Phase::Failed);
        assert_eq!(fit.iterations, 1);
        assert_eq!(fit.error, Some(BaconError::ConvergenceFailure { max_iter: 1 }));
        assert_eq!(
            fit.into_result().unwrap_err(),
            BaconError::ConvergenceFailure { max_iter: 1 }
        );
    }

    #[test]
    fn rank_deficient_seed_is_enlarged() {
        let xs = [1.0, 1.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let noise = [0.1, -0.1, 0.05, 0.2, -0.15, 0.1, -0.05, 0.12, -0.2, 0.08, -0.1, 0.15];
        let mut y: Vec<f64> = xs.iter().zip(noise).map(|(x, e)| 1.0 + 0.5 * x + e).collect();
        y[9] -= 30.0;
        let mut x = DMatrix::from_element(12, 2, 1.0);
        for (i, &v) in xs.iter().enumerate() {
            x[(i, 1)] = v;
        }
        let obs = Observations::unweighted(x, DVector::from_vec(y)).unwrap();
        let seed = Seed::new(
            Subset::from_indices(12, &[0, 1, 2]).unwrap(),
            xs.iter().map(|x| x - 1.0).collect(),
        );

        let fit = BaconRegression::new(config(2)).fit(&obs, &seed).unwrap();
        assert!(fit.success);
        assert_eq!(fit.iterations, 2);
        assert_eq!(fit.outliers(), vec![9]);
        assert_relative_eq!(fit.beta[0], 1.03067, epsilon = 1e-4);
        assert_relative_eq!(fit.beta[1], 0.49556, epsilon = 1e-4);
    }

    #[test]
    fn collinear_design_fails_without_panicking() {
        let mut x = DMatrix::from_element(8, 3, 1.0);
        for i in 0..8 {
            x[(i, 1)] = i as f64;
            x[(i, 2)] = 2.0 * i as f64;
        }
        let y = DVector::from_fn(8, |i, _| 1.0 + i as f64);
        let obs = Observations::unweighted(x, y).unwrap();
        let seed = seed_from((0..8).map(f64::from).collect(), 4);

        let fit = BaconRegression::new(BaconConfig::default()).fit(&obs, &seed).unwrap();
        assert!(!fit.success);
        assert_eq!(fit.phase, Phase::Failed);
        assert_eq!(fit.error, Some(BaconError::RankDeficient));
        assert!(fit.beta.iter().all(|b| b.is_finite()));
    }

    #[test]
    fn duplicated_column_with_zero_weights_fails_cleanly() {
        let mut x = DMatrix::from_element(8, 3, 1.0);
        for i in 0..8 {
            x[(i, 1)] = 0.5 * i as f64 - 1.0;
            x[(i, 2)] = x[(i, 1)];
        }
        let y = DVector::from_fn(8, |i, _| 2.0 - 0.3 * i as f64);
        let w = DVector::from_row_slice(&[1.0, 2.0, 0.0, 1.5, 0.5, 0.0, 3.0, 1.0]);
        let obs = Observations::new(x, y, w).unwrap();
        let seed = seed_from((0..8).map(|i| f64::from(i) * 0.25).collect(), 4);

        let fit = BaconRegression::new(config(2)).fit(&obs, &seed).unwrap();
        assert!(!fit.success);
        assert_eq!(fit.phase, Phase::Failed);
        assert_eq!(fit.error, Some(BaconError::RankDeficient));
        assert!(fit.beta.iter().all(|b| b.is_finite()));
    }

    #[test]
    fn growth_recovers_when_a_downdate_fails() {
        // Rows 0..3 share x = 8, so the three smallest discrepancies give a rank
        // one subset; only the enlarged candidate of size 4 is admissible.
        let xs = [8.0, 8.0, 8.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let mut x = DMatrix::from_element(10, 2, 1.0);
        for (i, &v) in xs.iter().enumerate() {
            x[(i, 1)] = v;
        }
        let y = DVector::from_fn(10, |i, _| {
            1.0 + 0.5 * xs[i] + if i % 2 == 0 { 0.1 } else { -0.1 }
        });
        let w = DVector::from_fn(10, |i, _| 1.0 + 0.5 * (i % 3) as f64);
        let obs = Observations::new(x, y, w).unwrap();
        let seed = Seed::new(Subset::from_indices(10, &[3, 4, 5, 6]).unwrap(), vec![0.0; 10]);

        let driver = BaconRegression::new(config(2));
        let mut ws = Workspace::new(&obs, &seed).unwrap();
        driver.initial(&obs, &mut ws).unwrap();
        for (i, d) in ws.dist.iter_mut().enumerate() {
            *d = i as f64;
        }
        driver.grow(&obs, &mut ws).unwrap();

        assert_eq!(ws.subset, Subset::from_indices(10, &[0, 1, 2, 3]).unwrap());
        let l = ws.normal.factor();
        let xtwx = DMatrix::from_row_slice(2, 2, &[5.5, 37.0, 37.0, 289.0]);
        assert_relative_eq!(l * l.transpose(), xtwx, epsilon = 1e-9);
    }

    #[test]
    fn generated_sample_outliers_are_flagged() {
        let sample = generate_sample(&SampleConfig::default()).unwrap();
        let obs = &sample.observations;
        let dist = (obs.y() - obs.x() * &sample.beta).abs();
        let seed = seed_from(dist.as_slice().to_vec(), obs.n() / 2);

        let fit = BaconRegression::new(config(4)).fit(obs, &seed).unwrap();
        assert!(fit.success);
        let flagged = fit.outliers();
        assert!(!sample.contaminated.is_empty());
        for i in &sample.contaminated {
            assert!(flagged.contains(i), "shifted row {i} kept in the subset");
        }
    }

    #[test]
    fn weighted_design_recovers_clean_fit() {
        init_logs();
        let (obs, seed, outliers) = designed_sample(60);
        let fit = BaconRegression::new(config(4)).fit(&obs, &seed).unwrap();

        assert!(fit.success);
        assert_eq!(fit.iterations, 5);
        assert_eq!(fit.outliers(), outliers);
        assert_eq!(fit.subset_size(), 58);
        assert_relative_eq!(fit.beta[0], 1.441_088, epsilon = 1e-5);
        assert_relative_eq!(fit.beta[1], 1.992_409, epsilon = 1e-5);
        assert_relative_eq!(fit.beta[2], -0.488_966, epsilon = 1e-5);

        // Factor describes the final subset.
        let mut xtwx = DMatrix::zeros(3, 3);
        for i in fit.subset.indices() {
            let row = obs.x().row(i).transpose();
            xtwx += &row * row.transpose() * obs.weights()[i];
        }
        assert_relative_eq!(&fit.factor * fit.factor.transpose(), xtwx, epsilon = 1e-8);

        let fitted = fit.fitted_values(obs.x());
        assert_relative_eq!(obs.y() - fitted, fit.residuals.clone(), epsilon = 1e-9);
    }

    #[test]
    fn converged_subset_is_a_fixed_point() {
        let (obs, seed, _) = designed_sample(60);
        let driver = BaconRegression::new(config(4));
        let fit = driver.fit(&obs, &seed).unwrap();
        assert!(fit.success);

        // Restarting from the converged subset stops after one refinement.
        let restart = Seed::new(fit.subset.clone(), fit.discrepancy.as_slice().to_vec());
        let mut ws = Workspace::new(&obs, &restart).unwrap();
        let (m, _) = driver.refine_step(&obs, &mut ws).unwrap();
        assert_eq!(m, fit.subset_size());
        assert_eq!(ws.candidate, fit.subset);
    }

    #[test]
    fn large_sample_uses_parallel_kernels() {
        let (obs, seed, outliers) = designed_sample(1500);
        assert!(obs.n() * obs.p() > crate::math::PARALLEL_MIN_SIZE);

        let fit = BaconRegression::new(config(4)).fit(&obs, &seed).unwrap();
        assert!(fit.success);
        assert_eq!(fit.outliers(), outliers);
        assert_relative_eq!(fit.beta, reference_fit(&obs, &fit.subset), epsilon = 1e-8);
        assert_relative_eq!(fit.beta[1], 1.996_273, epsilon = 1e-5);
    }

    #[test]
    fn invalid_inputs_are_rejected_up_front() {
        let (obs, seed) = line_with_outlier();
        let bad = BaconRegression::new(BaconConfig {
            alpha: 0.0,
            ..BaconConfig::default()
        });
        assert!(matches!(bad.fit(&obs, &seed), Err(BaconError::InvalidInput(_))));

        let short = Seed::new(Subset::from_indices(5, &[0, 1, 2]).unwrap(), vec![0.0; 5]);
        assert!(matches!(
            BaconRegression::new(BaconConfig::default()).fit(&obs, &short),
            Err(BaconError::InvalidInput(_))
        ));
    }

    #[test]
    fn alternative_scale_estimators_plug_in() {
        let (obs, seed) = line_with_outlier();
        let fit = BaconRegression::new(config(2))
            .with_scale(crate::fit::scale::MadScale)
            .fit(&obs, &seed)
            .unwrap();
        assert!(fit.success);
        assert!(fit.outliers().contains(&7));
    }
}
