//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the observation row (`Observation`) and its interval encoding (`IntervalCode`)
//! - aggregation keys and policies (`IntervalGroup`, `MissingPolicy`, `DayKind`)
//! - the run configuration (`ReportConfig`)

pub mod types;

pub use types::*;
