//! Reporting: chart data prep, SVG chart files, and the formatted document.
//!
//! We keep formatting code in one place so:
//! - the aggregation/imputation code stays clean and testable
//! - output changes are localized (golden tests live next to the formatter)

use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::aggregate::{HistogramBin, PassSummary, histogram, profile};
use crate::app::pipeline::ReportRun;
use crate::domain::{DayKind, IntervalCode};
use crate::error::AppError;
use crate::plot::svg;

pub mod format;

pub use format::*;

/// Paths of the SVG charts written for one run.
#[derive(Debug, Clone)]
pub struct ChartFiles {
    pub raw_histogram: PathBuf,
    pub imputed_histogram: PathBuf,
    pub profile: PathBuf,
    pub profile_by_day_kind: PathBuf,
}

/// Histogram bins of a pass's present daily totals.
pub fn daily_histogram(summary: &PassSummary, bin_width: u64) -> Vec<HistogramBin> {
    histogram(&summary.present_totals(), bin_width)
}

/// Interval profile over all days.
pub fn overall_profile(summary: &PassSummary) -> Vec<(IntervalCode, f64)> {
    profile(&summary.interval_means, None)
}

/// One `(title, profile)` panel per day kind, weekday first.
pub fn day_kind_panels(summary: &PassSummary) -> Vec<(&'static str, Vec<(IntervalCode, f64)>)> {
    DayKind::ALL
        .iter()
        .map(|&kind| {
            (
                kind.display_name(),
                profile(&summary.interval_means_by_day_kind, Some(kind)),
            )
        })
        .collect()
}

/// Write all SVG charts into `dir`, creating it if needed.
pub fn write_svg_charts(run: &ReportRun, dir: &Path, bin_width: u64) -> Result<ChartFiles, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::internal(format!("Failed to create chart dir '{}': {e}", dir.display())))?;

    let files = ChartFiles {
        raw_histogram: svg::write_histogram_svg(
            &dir.join("daily_totals_raw.svg"),
            &daily_histogram(&run.raw, bin_width),
            "Total steps per day (missing as zero)",
        )?,
        imputed_histogram: svg::write_histogram_svg(
            &dir.join("daily_totals_imputed.svg"),
            &daily_histogram(&run.imputed, bin_width),
            "Total steps per day (imputed)",
        )?,
        profile: svg::write_profile_svg(
            &dir.join("interval_profile.svg"),
            &overall_profile(&run.raw),
            "Mean steps per 5-minute interval",
        )?,
        profile_by_day_kind: svg::write_faceted_profile_svg(
            &dir.join("interval_profile_by_day_kind.svg"),
            &day_kind_panels(&run.imputed),
        )?,
    };

    info!(dir = %dir.display(), "wrote SVG charts");
    Ok(files)
}
