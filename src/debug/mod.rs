//! Debug bundle writer for inspecting the imputation model and its effect.

use std::collections::BTreeMap;
use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDate};

use crate::app::pipeline::ReportRun;
use crate::domain::{ReportConfig, weekday_name};
use crate::error::AppError;

/// Directory the binary writes bundles into, relative to the working directory.
pub const DEFAULT_DEBUG_DIR: &str = "debug";

/// Write `activity_debug_seed{seed}_{timestamp}.md` into `dir` and return its path.
pub fn write_debug_bundle(run: &ReportRun, config: &ReportConfig, dir: &Path) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::internal(format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("activity_debug_seed{}_{ts}.md", config.seed));

    let mut file = File::create(&path)
        .map_err(|e| AppError::internal(format!("Failed to create debug file: {e}")))?;
    write_bundle(&mut file, run, config)
        .map_err(|e| AppError::internal(format!("Failed to write debug bundle: {e}")))?;

    Ok(path)
}

fn write_bundle(file: &mut File, run: &ReportRun, config: &ReportConfig) -> std::io::Result<()> {
    let stats = &run.data.stats;

    writeln!(file, "# activity debug bundle")?;
    writeln!(file, "- generated: {}", Local::now().to_rfc3339())?;
    writeln!(file, "- csv: {}", config.csv_path.display())?;
    writeln!(file, "- seed: {}", config.seed)?;
    writeln!(file, "- donors: {}", config.donors)?;
    writeln!(
        file,
        "- rows: {} | dates: {} | missing: {}",
        stats.n_rows, stats.n_dates, stats.n_missing
    )?;

    writeln!(file, "\n## Imputation model")?;
    match &run.imputation.model {
        Some(model) => {
            writeln!(file, "- complete rows: {}", model.n_train)?;
            writeln!(file, "- sigma*: {:.6}", model.sigma)?;
            writeln!(file, "\n| column | beta_hat | beta_draw |")?;
            writeln!(file, "| - | - | - |")?;
            for ((name, hat), draw) in model.columns.iter().zip(&model.beta_hat).zip(&model.beta_draw) {
                writeln!(file, "| {name} | {hat:.6} | {draw:.6} |")?;
            }
        }
        None => writeln!(file, "No missing values; no model was fit.")?,
    }

    let mut imputed_per_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for o in &run.data.observations {
        if o.steps.is_none() {
            *imputed_per_date.entry(o.date).or_insert(0) += 1;
        }
    }

    writeln!(file, "\n## Daily totals")?;
    writeln!(file, "| date | weekday | raw | imputed | filled |")?;
    writeln!(file, "| - | - | - | - | - |")?;
    for (date, raw) in &run.raw.daily_totals {
        let imputed = run.imputed.daily_totals.get(date).copied().flatten();
        writeln!(
            file,
            "| {} | {} | {} | {} | {} |",
            date,
            weekday_name(date.weekday()),
            fmt_opt(*raw),
            fmt_opt(imputed),
            imputed_per_date.get(date).copied().unwrap_or(0)
        )?;
    }

    Ok(())
}

fn fmt_opt(value: Option<u64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_report_with;
    use crate::impute::PmmImputer;
    use crate::io::ingest::parse_observations;

    #[test]
    fn bundle_lists_coefficients_and_daily_totals() {
        let mut csv = String::from("steps,date,interval\n");
        for day in 1..=9 {
            for code in [0, 5, 10, 15, 20, 25] {
                let steps = if day == 2 || (day + code) % 4 == 0 {
                    "NA".to_string()
                } else {
                    ((day * code) % 17).to_string()
                };
                csv.push_str(&format!("{steps},2012-10-{day:02},{code}\n"));
            }
        }
        let data = parse_observations(csv.as_bytes()).unwrap();
        let config = ReportConfig {
            seed: 7,
            donors: 3,
            ..ReportConfig::default()
        };
        let run = run_report_with(data, &PmmImputer::new(3), &config).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("bundles");
        let path = write_debug_bundle(&run, &config, &out).unwrap();
        assert_eq!(path.parent(), Some(out.as_path()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("activity_debug_seed7_"), "{name}");

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("- seed: 7"));
        assert!(text.contains("| column | beta_hat | beta_draw |"));
        assert!(text.contains("| intercept | "));
        assert!(text.contains("| date | weekday | raw | imputed | filled |"));

        // 2012-10-02 is a Tuesday with every value missing.
        let imputed = run.imputed.daily_totals[&NaiveDate::from_ymd_opt(2012, 10, 2).unwrap()].unwrap();
        assert!(text.contains(&format!("| 2012-10-02 | Tuesday | 0 | {imputed} | 6 |")), "{text}");
        assert_eq!(text.matches("| 2012-10-0").count(), 9);
    }
}
