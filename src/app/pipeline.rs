//! Shared report pipeline used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! locate/extract CSV -> load -> aggregate (raw) -> impute -> aggregate (imputed)
//!
//! The subcommands can then focus on presentation (printing vs exports).

use tracing::{info, warn};

use crate::aggregate::{MissingPatternTable, PassSummary, missing_patterns, summarize};
use crate::domain::{MissingPolicy, ReportConfig};
use crate::error::AppError;
use crate::impute::{Imputation, Imputer, PmmImputer};
use crate::io::archive::ensure_csv;
use crate::io::ingest::{LoadedData, load_observations};

/// All computed outputs of a single report run.
#[derive(Debug, Clone)]
pub struct ReportRun {
    pub data: LoadedData,
    pub patterns: MissingPatternTable,
    pub raw: PassSummary,
    pub imputation: Imputation,
    pub imputed: PassSummary,
}

/// Locate and load the dataset named by the config.
pub fn load(config: &ReportConfig) -> Result<LoadedData, AppError> {
    let csv_path = ensure_csv(&config.csv_path, config.archive_path.as_deref())?;
    load_observations(&csv_path)
}

/// Execute the full pipeline with the default imputer.
pub fn run_report(config: &ReportConfig) -> Result<ReportRun, AppError> {
    let data = load(config)?;
    run_report_with(data, &PmmImputer::new(config.donors), config)
}

/// Execute the pipeline on already-loaded data with any imputer.
pub fn run_report_with(
    data: LoadedData,
    imputer: &dyn Imputer,
    config: &ReportConfig,
) -> Result<ReportRun, AppError> {
    let patterns = missing_patterns(&data.observations);

    // Raw pass: missing steps count as zero in daily totals.
    let raw = summarize(&data.observations, MissingPolicy::Skip);
    if raw.zero_days > 0 {
        warn!(
            zero_days = raw.zero_days,
            "days without any recorded steps total 0 in the raw pass and pull the mean down"
        );
    }

    let imputation = imputer.impute(&data.observations, config.seed)?;
    if imputation.observations.len() != data.observations.len()
        || imputation.observations.iter().any(|o| o.steps.is_none())
    {
        return Err(AppError::internal("Imputer returned an incomplete dataset."));
    }

    let imputed = summarize(&imputation.observations, MissingPolicy::Skip);
    info!(
        raw_mean = ?raw.daily_mean,
        imputed_mean = ?imputed.daily_mean,
        "aggregated raw and imputed passes"
    );

    Ok(ReportRun {
        data,
        patterns,
        raw,
        imputation,
        imputed,
    })
}
