//! Ridge-stabilized ordinary least squares.
//!
//! The imputation model solves one small regression problem:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! with a handful of covariate columns and thousands of rows. We solve the
//! normal equations through a Cholesky factorization, which also yields the
//! `(X'X)^-1` factor needed for drawing coefficients from their posterior.
//!
//! A tiny ridge term (`RIDGE × diag(X'X)`) keeps nearly collinear covariates
//! solvable. A column of zeros still leaves the system singular; that is
//! reported as `None`.

use nalgebra::{DMatrix, DVector};

/// Relative ridge penalty added to the diagonal of `X'X`.
pub const RIDGE: f64 = 1e-5;

/// Fitted coefficients and the pieces needed to draw around them.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub beta: DVector<f64>,
    /// Residual sum of squares on the training rows.
    pub rss: f64,
    /// Lower Cholesky factor `L` with `L L' = (X'X + ridge)^-1`.
    pub cov_factor: DMatrix<f64>,
    pub n: usize,
}

impl OlsFit {
    /// Residual degrees of freedom, floored at 1.
    pub fn df(&self) -> usize {
        self.n.saturating_sub(self.beta.len()).max(1)
    }
}

/// Fit `y ~ X` by ridge-stabilized normal equations.
///
/// Returns `None` when the shapes disagree, there are no rows, or the normal
/// matrix is not positive definite.
pub fn fit_ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<OlsFit> {
    if x.nrows() == 0 || x.nrows() != y.len() {
        return None;
    }

    let mut xtx = x.transpose() * x;
    for j in 0..xtx.ncols() {
        xtx[(j, j)] += RIDGE * xtx[(j, j)];
    }
    let xty = x.transpose() * y;

    let chol = xtx.cholesky()?;
    let beta = chol.solve(&xty);
    if !beta.iter().all(|v| v.is_finite()) {
        return None;
    }

    let inverse = chol.inverse();
    let cov_factor = inverse.cholesky()?.l();

    let residuals = y - x * &beta;
    let rss = residuals.norm_squared();

    Some(OlsFit {
        beta,
        rss,
        cov_factor,
        n: x.nrows(),
    })
}
