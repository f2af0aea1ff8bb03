//! Missing-value imputation.
//!
//! The pipeline only depends on the [`Imputer`] trait: a completed copy of
//! the observations with the same length and order, no missing `steps`, and
//! observed values left untouched. [`PmmImputer`] implements it with
//! predictive mean matching.

use serde::Serialize;

use crate::domain::Observation;
use crate::error::AppError;

pub mod design;
pub mod pmm;

pub use pmm::{DEFAULT_DONORS, PmmImputer};

/// Fills missing step counts.
pub trait Imputer {
    /// Complete `observations`. The same input and `seed` must give the same
    /// output.
    fn impute(&self, observations: &[Observation], seed: u64) -> Result<Imputation, AppError>;
}

/// Completed dataset plus diagnostics.
#[derive(Debug, Clone)]
pub struct Imputation {
    pub observations: Vec<Observation>,
    pub n_imputed: usize,
    /// `None` when nothing was missing and no model was fit.
    pub model: Option<ImputationModel>,
}

/// Regression behind the imputation, for reports and debugging.
#[derive(Debug, Clone, Serialize)]
pub struct ImputationModel {
    pub columns: Vec<String>,
    pub beta_hat: Vec<f64>,
    pub beta_draw: Vec<f64>,
    pub sigma: f64,
    pub n_train: usize,
    pub donors: usize,
    pub seed: u64,
}
