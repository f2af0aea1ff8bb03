//! Read/write the JSON run summary.
//!
//! The summary is the machine-readable counterpart of the Markdown report:
//! - dataset stats and the missing-data pattern table
//! - both pass summaries (daily totals, peaks, weekday/weekend split)
//! - imputation diagnostics (coefficients, seed, donor count)

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::aggregate::{MissingPatternTable, PassSummary};
use crate::app::pipeline::ReportRun;
use crate::domain::DatasetStats;
use crate::error::AppError;
use crate::impute::ImputationModel;

#[derive(Debug, Serialize)]
pub struct SummaryFile<'a> {
    pub tool: &'static str,
    pub dataset: &'a DatasetStats,
    pub missing_patterns: &'a MissingPatternTable,
    pub raw: &'a PassSummary,
    pub imputed: &'a PassSummary,
    pub n_imputed: usize,
    pub imputation_model: Option<&'a ImputationModel>,
}

impl<'a> SummaryFile<'a> {
    pub fn from_run(run: &'a ReportRun) -> Self {
        Self {
            tool: "activity",
            dataset: &run.data.stats,
            missing_patterns: &run.patterns,
            raw: &run.raw,
            imputed: &run.imputed,
            n_imputed: run.imputation.n_imputed,
            imputation_model: run.imputation.model.as_ref(),
        }
    }
}

/// Write the run summary as pretty JSON.
pub fn write_summary_json(path: &Path, run: &ReportRun) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::internal(format!("Failed to create summary JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &SummaryFile::from_run(run))
        .map_err(|e| AppError::internal(format!("Failed to write summary JSON: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_report_with;
    use crate::domain::ReportConfig;
    use crate::impute::PmmImputer;
    use crate::io::ingest::parse_observations;

    #[test]
    fn summary_json_has_expected_fields() {
        let mut csv = String::from("steps,date,interval\n");
        for day in 1..=9 {
            for code in [0, 5, 10, 15, 20, 25] {
                let steps = if (day + code) % 4 == 0 { "NA".to_string() } else { ((day * code) % 17).to_string() };
                csv.push_str(&format!("{steps},2012-10-{day:02},{code}\n"));
            }
        }
        let data = parse_observations(csv.as_bytes()).unwrap();
        let run = run_report_with(data, &PmmImputer::new(3), &ReportConfig::default()).unwrap();

        let value = serde_json::to_value(SummaryFile::from_run(&run)).unwrap();
        assert_eq!(value["tool"], "activity");
        assert_eq!(value["dataset"]["n_rows"], 54);
        assert!(value["raw"]["daily_totals"]["2012-10-01"].is_u64());
        assert_eq!(value["imputation_model"]["donors"], 3);
        assert!(value["imputed"]["by_day_kind"].as_array().unwrap().len() == 2);
    }
}
