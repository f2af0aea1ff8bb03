use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use activity_report::app::pipeline::run_report;
use activity_report::domain::ReportConfig;
use activity_report::io::export::write_observations_csv;
use activity_report::io::ingest::load_observations;
use activity_report::report::{format_report, write_svg_charts};
use zip::write::SimpleFileOptions;

/// Ten days of full 5-minute coverage. Day 3 is entirely missing and every
/// 11th interval elsewhere is missing too.
fn synthetic_csv() -> String {
    let mut out = String::from("\"steps\",\"date\",\"interval\"\n");
    let mut n = 0u32;
    for day in 1..=10 {
        for hour in 0..24 {
            for minute in (0..60).step_by(5) {
                n += 1;
                let interval = hour * 100 + minute;
                let steps = if day == 3 || n % 11 == 0 {
                    "NA".to_string()
                } else if (8..10).contains(&hour) {
                    (50 + (n * 7) % 150).to_string()
                } else if (1..6).contains(&hour) {
                    "0".to_string()
                } else {
                    ((n * 13) % 40).to_string()
                };
                out.push_str(&format!("{steps},\"2012-10-{day:02}\",{interval}\n"));
            }
        }
    }
    out
}

fn write_archive(path: &Path, body: &str) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("activity.csv", SimpleFileOptions::default()).unwrap();
    zip.write_all(body.as_bytes()).unwrap();
    zip.finish().unwrap();
}

#[test]
fn full_pipeline_from_archive() {
    let dir = tempfile::tempdir().unwrap();
    write_archive(&dir.path().join("activity.zip"), &synthetic_csv());

    let config = ReportConfig {
        csv_path: dir.path().join("activity.csv"),
        seed: 2024,
        ..ReportConfig::default()
    };
    let run = run_report(&config).unwrap();

    assert!(config.csv_path.is_file(), "CSV should be extracted next to the archive");
    assert_eq!(run.data.stats.n_rows, 10 * 288);
    assert_eq!(run.data.stats.n_dates, 10);

    // Raw pass: the all-missing day totals zero.
    let day3 = chrono::NaiveDate::from_ymd_opt(2012, 10, 3).unwrap();
    assert_eq!(run.raw.daily_totals[&day3], Some(0));
    assert_eq!(run.raw.zero_days, 1);
    assert_eq!(run.raw.interval_means.len(), 288);

    // Imputed pass: same rows, observed values untouched, fills drawn from observed values.
    let imputed = &run.imputation.observations;
    assert_eq!(imputed.len(), run.data.observations.len());
    let observed: HashSet<u32> = run.data.observations.iter().filter_map(|o| o.steps).collect();
    for (raw, done) in run.data.observations.iter().zip(imputed) {
        match raw.steps {
            Some(v) => assert_eq!(done.steps, Some(v)),
            None => assert!(observed.contains(&done.steps.unwrap())),
        }
    }
    assert!(run.imputed.daily_totals[&day3].unwrap() > 0);
    assert!(run.imputed.daily_mean.unwrap() > run.raw.daily_mean.unwrap());

    // Peak falls inside the busy morning window.
    let peak = run.raw.peak.unwrap();
    assert!((800..1000).contains(&peak.interval.code()), "peak at {}", peak.interval);

    let text = format_report(&run, &config, None);
    assert!(text.contains("# Personal activity monitoring report"));
    assert!(text.contains("- rows: 2880 (10 days, 2012-10-01 to 2012-10-10)"));
    assert!(text.contains("```text\nHistogram:"));
}

#[test]
fn same_seed_gives_identical_imputation() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("activity.csv");
    std::fs::write(&csv, synthetic_csv()).unwrap();

    let config = ReportConfig {
        csv_path: csv,
        seed: 99,
        ..ReportConfig::default()
    };
    let a = run_report(&config).unwrap();
    let b = run_report(&config).unwrap();
    assert_eq!(a.imputation.observations, b.imputation.observations);
}

#[test]
fn imputed_export_reloads_complete() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("activity.csv");
    std::fs::write(&csv, synthetic_csv()).unwrap();

    let config = ReportConfig {
        csv_path: csv,
        ..ReportConfig::default()
    };
    let run = run_report(&config).unwrap();

    let out = dir.path().join("imputed.csv");
    write_observations_csv(&out, &run.imputation.observations).unwrap();
    let reloaded = load_observations(&out).unwrap();
    assert_eq!(reloaded.stats.n_missing, 0);
    assert_eq!(reloaded.observations, run.imputation.observations);

    let charts = write_svg_charts(&run, &dir.path().join("charts"), config.bin_width).unwrap();
    assert!(charts.profile_by_day_kind.is_file());
    let text = format_report(&run, &config, Some(&charts));
    assert!(text.contains("interval_profile_by_day_kind.svg"));
}

#[test]
fn bad_schema_aborts_with_input_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("activity.csv");
    std::fs::write(&csv, "steps,date,interval,extra\n1,2012-10-01,0,x\n").unwrap();

    let config = ReportConfig {
        csv_path: csv,
        ..ReportConfig::default()
    };
    let err = run_report(&config).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}
