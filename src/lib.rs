//! `activity-report` library crate.
//!
//! The binary (`activity`) is a thin wrapper around this library so that:
//!
//! - the aggregation and imputation logic is testable without spawning processes
//! - the imputer sits behind a trait and can be swapped
//! - code stays easy to navigate as the report grows

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod debug;
pub mod domain;
pub mod error;
pub mod impute;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
