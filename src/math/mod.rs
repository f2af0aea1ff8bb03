//! Mathematical utilities: least squares for the imputation model.

pub mod ols;

pub use ols::*;
