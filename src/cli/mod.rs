//! Command-line parsing for the activity report.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! analysis code: the pipeline only ever sees a `ReportConfig`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::ReportConfig;
use crate::impute::DEFAULT_DONORS;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "activity", version, about = "Activity monitoring report with missing-value imputation")]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace). `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full report: load, aggregate, impute, aggregate again, print.
    Report(ReportArgs),
    /// Impute missing steps and write the completed dataset as CSV.
    Impute(ImputeArgs),
    /// Print the missing-data pattern table only.
    Patterns(DataArgs),
}

/// Where the dataset comes from.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Activity CSV (`steps,date,interval`).
    #[arg(long, env = "ACTIVITY_CSV", default_value = "activity.csv")]
    pub csv: PathBuf,

    /// ZIP archive to extract the CSV from when it is missing
    /// (defaults to `activity.zip` next to the CSV).
    #[arg(long, env = "ACTIVITY_ARCHIVE")]
    pub archive: Option<PathBuf>,
}

/// Imputation settings.
#[derive(Debug, Args, Clone)]
pub struct ImputeOptions {
    /// Random seed for the imputation draws.
    #[arg(long, env = "ACTIVITY_SEED", default_value_t = 1234)]
    pub seed: u64,

    /// Donor pool size for predictive mean matching.
    #[arg(long, default_value_t = DEFAULT_DONORS)]
    pub donors: usize,
}

/// Options for the full report.
#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub impute: ImputeOptions,

    /// Histogram bin width for daily totals (steps).
    #[arg(long, default_value_t = 1000)]
    pub bin_width: u64,

    /// Disable the terminal charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,

    /// Also render SVG charts into this directory.
    #[arg(long, value_name = "DIR")]
    pub svg_dir: Option<PathBuf>,

    /// Write the Markdown report to a file instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Export the run summary to JSON.
    #[arg(long)]
    pub export_summary: Option<PathBuf>,

    /// Export the imputed dataset to CSV.
    #[arg(long)]
    pub export_imputed: Option<PathBuf>,

    /// Write a Markdown debug bundle under `debug/`.
    #[arg(long)]
    pub debug: bool,
}

/// Options for `activity impute`.
#[derive(Debug, Args, Clone)]
pub struct ImputeArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub impute: ImputeOptions,

    /// Output CSV for the completed dataset.
    #[arg(long, value_name = "CSV", default_value = "activity_imputed.csv")]
    pub out: PathBuf,
}

impl ReportArgs {
    pub fn to_config(&self) -> ReportConfig {
        ReportConfig {
            csv_path: self.data.csv.clone(),
            archive_path: self.data.archive.clone(),
            seed: self.impute.seed,
            donors: self.impute.donors,
            bin_width: self.bin_width,
            plot: !self.no_plot,
            plot_width: self.width,
            plot_height: self.height,
            svg_dir: self.svg_dir.clone(),
            output: self.output.clone(),
            export_summary: self.export_summary.clone(),
            export_imputed: self.export_imputed.clone(),
            debug: self.debug,
        }
    }
}

impl ImputeArgs {
    pub fn to_config(&self) -> ReportConfig {
        ReportConfig {
            csv_path: self.data.csv.clone(),
            archive_path: self.data.archive.clone(),
            seed: self.impute.seed,
            donors: self.impute.donors,
            plot: false,
            export_imputed: Some(self.out.clone()),
            ..ReportConfig::default()
        }
    }
}

impl DataArgs {
    pub fn to_config(&self) -> ReportConfig {
        ReportConfig {
            csv_path: self.csv.clone(),
            archive_path: self.archive.clone(),
            plot: false,
            ..ReportConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_args_map_to_config() {
        let cli = Cli::parse_from([
            "activity", "report", "--csv", "data/a.csv", "--seed", "9", "--donors", "3", "--no-plot",
            "--svg-dir", "charts",
        ]);
        let Command::Report(args) = cli.command else {
            panic!("expected report subcommand");
        };
        let config = args.to_config();
        assert_eq!(config.csv_path, PathBuf::from("data/a.csv"));
        assert_eq!(config.seed, 9);
        assert_eq!(config.donors, 3);
        assert!(!config.plot);
        assert_eq!(config.svg_dir, Some(PathBuf::from("charts")));
        assert_eq!(config.bin_width, 1000);
    }

    #[test]
    fn impute_args_set_export_path() {
        let cli = Cli::parse_from(["activity", "--log-level", "debug", "impute", "--out", "x.csv"]);
        assert_eq!(cli.log_level, "debug");
        let Command::Impute(args) = cli.command else {
            panic!("expected impute subcommand");
        };
        assert_eq!(args.to_config().export_imputed, Some(PathBuf::from("x.csv")));
    }
}
