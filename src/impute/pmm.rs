//! Predictive mean matching.
//!
//! For each row with missing `steps`:
//!
//! 1. regress `steps` on the covariates using the complete rows
//! 2. draw a plausible coefficient vector around the estimate
//!    (`σ* = sqrt(RSS / χ²(df))`, `β* = β̂ + σ* L z`)
//! 3. predict complete rows with `β̂` and missing rows with `β*`
//! 4. take the `donors` complete rows whose prediction is closest to the
//!    missing row's prediction and copy the observed value of one of them,
//!    chosen uniformly at random
//!
//! Because the imputed value is always copied from a real observation, the
//! completed data keeps the discrete, zero-heavy shape of step counts and can
//! never go negative.

use nalgebra::{DMatrix, DVector};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{ChiSquared, StandardNormal};
use tracing::{debug, info};

use crate::domain::Observation;
use crate::error::AppError;
use crate::impute::design::Design;
use crate::impute::{Imputation, ImputationModel, Imputer};
use crate::math::{OlsFit, fit_ols};

/// Default size of the donor pool per missing value.
pub const DEFAULT_DONORS: usize = 5;

/// Predictive mean matching imputer.
#[derive(Debug, Clone)]
pub struct PmmImputer {
    /// Number of nearest complete rows to draw a donor from.
    pub donors: usize,
}

impl Default for PmmImputer {
    fn default() -> Self {
        Self {
            donors: DEFAULT_DONORS,
        }
    }
}

impl PmmImputer {
    pub fn new(donors: usize) -> Self {
        Self { donors }
    }
}

impl Imputer for PmmImputer {
    fn impute(&self, observations: &[Observation], seed: u64) -> Result<Imputation, AppError> {
        if self.donors == 0 {
            return Err(AppError::imputation("donor pool size must be > 0"));
        }

        let mut training: Vec<(&Observation, u32)> = Vec::new();
        let mut targets: Vec<usize> = Vec::new();
        for (idx, o) in observations.iter().enumerate() {
            match o.steps {
                Some(steps) => training.push((o, steps)),
                None => targets.push(idx),
            }
        }

        if targets.is_empty() {
            debug!("no missing steps, imputation skipped");
            return Ok(Imputation {
                observations: observations.to_vec(),
                n_imputed: 0,
                model: None,
            });
        }

        let Some(origin) = observations.iter().map(|o| o.date).min() else {
            return Err(AppError::imputation("no rows"));
        };

        let train_rows: Vec<&Observation> = training.iter().map(|(o, _)| *o).collect();
        let design = Design::fit(origin, &train_rows);

        let needed = self.donors.max(design.ncols() + 1);
        if training.len() < needed {
            return Err(AppError::imputation(format!(
                "{} complete rows, need at least {needed}",
                training.len()
            )));
        }

        let x_obs = design.matrix(&train_rows);
        let y_obs = DVector::from_iterator(training.len(), training.iter().map(|(_, s)| f64::from(*s)));
        let fit = fit_ols(&x_obs, &y_obs)
            .ok_or_else(|| AppError::imputation("regression on the complete rows has no unique solution"))?;

        let mut rng = StdRng::seed_from_u64(seed);
        let (beta_draw, sigma) = draw_coefficients(&fit, &mut rng)?;

        let yhat_obs = &x_obs * &fit.beta;
        let target_rows: Vec<&Observation> = targets.iter().map(|&i| &observations[i]).collect();
        let x_mis: DMatrix<f64> = design.matrix(&target_rows);
        let yhat_mis = &x_mis * &beta_draw;

        let pool = DonorPool::new(
            yhat_obs
                .iter()
                .zip(training.iter())
                .map(|(&yhat, (_, steps))| (yhat, *steps))
                .collect(),
        );

        let mut out = observations.to_vec();
        for (&idx, &target) in targets.iter().zip(yhat_mis.iter()) {
            out[idx].steps = Some(pool.draw(target, self.donors, &mut rng));
        }

        let model = ImputationModel {
            columns: design.column_names().into_iter().map(str::to_string).collect(),
            beta_hat: fit.beta.iter().copied().collect(),
            beta_draw: beta_draw.iter().copied().collect(),
            sigma,
            n_train: training.len(),
            donors: self.donors,
            seed,
        };
        debug!(?model, "fitted imputation model");
        info!(
            imputed = targets.len(),
            complete = training.len(),
            donors = self.donors,
            seed,
            "imputed missing steps by predictive mean matching"
        );

        Ok(Imputation {
            observations: out,
            n_imputed: targets.len(),
            model: Some(model),
        })
    }
}

/// Draw `β*` and `σ*` from the approximate posterior of the fit.
fn draw_coefficients(fit: &OlsFit, rng: &mut StdRng) -> Result<(DVector<f64>, f64), AppError> {
    let chi = ChiSquared::new(fit.df() as f64)
        .map_err(|e| AppError::internal(format!("Chi-squared distribution error: {e}")))?;
    let g: f64 = chi.sample(rng);
    let sigma = (fit.rss / g).sqrt();
    if !sigma.is_finite() {
        return Err(AppError::imputation("residual scale is not finite"));
    }

    let p = fit.beta.len();
    let z = DVector::from_iterator(p, (0..p).map(|_| rng.sample::<f64, _>(StandardNormal)));
    let beta = &fit.beta + (&fit.cov_factor * z) * sigma;
    Ok((beta, sigma))
}

/// Complete rows sorted by predicted value.
struct DonorPool {
    entries: Vec<(f64, u32)>,
}

impl DonorPool {
    fn new(mut entries: Vec<(f64, u32)>) -> Self {
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { entries }
    }

    /// Observed value of one of the `k` entries nearest to `target`.
    ///
    /// Equal distances on both sides are resolved by a coin flip so the pool
    /// does not lean towards lower predictions.
    fn draw(&self, target: f64, k: usize, rng: &mut StdRng) -> u32 {
        let n = self.entries.len();
        let k = k.min(n);
        let pos = self.entries.partition_point(|(yhat, _)| *yhat < target);

        let mut lo = pos;
        let mut hi = pos;
        let mut chosen: Vec<u32> = Vec::with_capacity(k);

        while chosen.len() < k {
            let left = (lo > 0).then(|| (target - self.entries[lo - 1].0).abs());
            let right = (hi < n).then(|| (self.entries[hi].0 - target).abs());

            let take_left = match (left, right) {
                (Some(l), Some(r)) if l == r => rng.gen_bool(0.5),
                (Some(l), Some(r)) => l < r,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };

            if take_left {
                lo -= 1;
                chosen.push(self.entries[lo].1);
            } else {
                chosen.push(self.entries[hi].1);
                hi += 1;
            }
        }

        chosen[rng.gen_range(0..chosen.len())]
    }
}
