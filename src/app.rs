//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs the log subscriber
//! - runs the report pipeline
//! - prints the report and writes optional charts/exports

use std::fs;
use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, DataArgs, ImputeArgs, ReportArgs};
use crate::domain::ReportConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `activity` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is normal; anything it sets feeds the `env =` fallbacks.
    let _ = dotenvy::dotenv();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_logging(&cli.log_level);

    match cli.command {
        Command::Report(args) => handle_report(&args),
        Command::Impute(args) => handle_impute(&args),
        Command::Patterns(args) => handle_patterns(&args),
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // Logs go to stderr so the report on stdout stays pipeable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_report(args: &ReportArgs) -> Result<(), AppError> {
    let config = args.to_config();
    let run = pipeline::run_report(&config)?;

    let charts = match &config.svg_dir {
        Some(dir) => Some(crate::report::write_svg_charts(&run, dir, config.bin_width)?),
        None => None,
    };

    let document = crate::report::format_report(&run, &config, charts.as_ref());
    match &config.output {
        Some(path) => {
            fs::write(path, &document).map_err(|e| {
                AppError::internal(format!("Failed to write report '{}': {e}", path.display()))
            })?;
            info!(path = %path.display(), "wrote report");
        }
        None => print!("{document}"),
    }

    write_exports(&run, &config)?;

    if config.debug {
        let path = crate::debug::write_debug_bundle(
            &run,
            &config,
            Path::new(crate::debug::DEFAULT_DEBUG_DIR),
        )?;
        eprintln!("Debug bundle written to {}", path.display());
    }

    Ok(())
}

fn handle_impute(args: &ImputeArgs) -> Result<(), AppError> {
    let config = args.to_config();
    let run = pipeline::run_report(&config)?;
    write_exports(&run, &config)?;

    println!(
        "Imputed {} of {} step counts (seed {}).",
        run.imputation.n_imputed, run.data.stats.n_rows, config.seed
    );
    Ok(())
}

fn handle_patterns(args: &DataArgs) -> Result<(), AppError> {
    print!("{}", patterns_table(args)?);
    Ok(())
}

fn patterns_table(args: &DataArgs) -> Result<String, AppError> {
    let data = pipeline::load(&args.to_config())?;
    let table = crate::aggregate::missing_patterns(&data.observations);
    Ok(crate::report::format_missing_patterns(&table))
}

fn write_exports(run: &pipeline::ReportRun, config: &ReportConfig) -> Result<(), AppError> {
    if let Some(path) = &config.export_imputed {
        crate::io::export::write_observations_csv(path, &run.imputation.observations)?;
        info!(path = %path.display(), "wrote imputed dataset");
    }
    if let Some(path) = &config.export_summary {
        crate::io::summary::write_summary_json(path, run)?;
        info!(path = %path.display(), "wrote summary JSON");
    }
    Ok(())
}

/// Rewrite argv so `activity` defaults to `activity report`.
///
/// Rules:
/// - `activity`                     -> `activity report`
/// - `activity --csv x.csv ...`     -> `activity report --csv x.csv ...`
/// - `activity --help/--version/-h` -> unchanged (show top-level help/version)
///
/// Only the first token after the global `--log-level` flag decides, so flag
/// values that happen to spell a subcommand are left alone.
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1) else {
        argv.push("report".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let mut first = 1;
    while let Some(arg) = argv.get(first) {
        if arg == "--log-level" {
            first += 2;
        } else if arg.starts_with("--log-level=") {
            first += 1;
        } else {
            break;
        }
    }

    let token = argv.get(first).cloned();
    match token.as_deref() {
        Some("report" | "impute" | "patterns" | "help") => {}
        // Flags without a subcommand are report flags.
        Some(a) if a.starts_with('-') => argv.insert(1, "report".to_string()),
        None => argv.push("report".to_string()),
        // Unknown positional: leave it for clap to reject.
        Some(_) => {}
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_report() {
        assert_eq!(rewrite_args(args(&["activity"])), args(&["activity", "report"]));
    }

    #[test]
    fn flags_without_subcommand_go_to_report() {
        assert_eq!(
            rewrite_args(args(&["activity", "--csv", "a.csv"])),
            args(&["activity", "report", "--csv", "a.csv"])
        );
    }

    #[test]
    fn explicit_subcommands_and_help_are_untouched() {
        let v = args(&["activity", "--log-level", "info", "impute"]);
        assert_eq!(rewrite_args(v.clone()), v);
        let v = args(&["activity", "--help"]);
        assert_eq!(rewrite_args(v.clone()), v);
    }

    #[test]
    fn flag_values_named_like_subcommands_still_go_to_report() {
        assert_eq!(
            rewrite_args(args(&["activity", "--csv", "report"])),
            args(&["activity", "report", "--csv", "report"])
        );
        assert_eq!(
            rewrite_args(args(&["activity", "--log-level", "debug", "--out", "impute"])),
            args(&["activity", "report", "--log-level", "debug", "--out", "impute"])
        );
    }

    #[test]
    fn global_flag_alone_runs_report() {
        assert_eq!(
            rewrite_args(args(&["activity", "--log-level=info"])),
            args(&["activity", "--log-level=info", "report"])
        );
    }

    #[test]
    fn patterns_table_reads_the_configured_csv() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("activity.csv");
        std::fs::write(&csv, "steps,date,interval\nNA,2012-10-01,0\n3,2012-10-01,5\n0,2012-10-02,0\n").unwrap();

        let data = DataArgs { csv, archive: None };
        assert_eq!(
            patterns_table(&data).unwrap(),
            "| steps | date | interval | rows | missing |\n\
             |---|---|---|---|---|\n\
             | present | present | present | 2 | 0 |\n\
             | missing | present | present | 1 | 1 |\n\
             | 1 | 0 | 0 |  | 1 |\n"
        );
    }

    #[test]
    fn patterns_table_reports_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataArgs {
            csv: dir.path().join("nope.csv"),
            archive: None,
        };
        assert_eq!(patterns_table(&data).unwrap_err().exit_code(), 2);
    }
}
