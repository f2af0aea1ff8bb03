//! Markdown rendering of a report run.

use std::path::Path;

use crate::aggregate::{MissingPatternTable, PATTERN_COLUMNS, PassSummary, Peak};
use crate::app::pipeline::ReportRun;
use crate::domain::ReportConfig;
use crate::plot::{render_faceted_profile, render_histogram, render_profile};
use crate::report::{ChartFiles, daily_histogram, day_kind_panels, overall_profile};

/// Format the whole report document.
pub fn format_report(run: &ReportRun, config: &ReportConfig, charts: Option<&ChartFiles>) -> String {
    let stats = &run.data.stats;
    let mut out = String::new();

    out.push_str("# Personal activity monitoring report\n\n");
    out.push_str(&format!("Source: `{}`\n\n", config.csv_path.display()));
    out.push_str(&format!(
        "- rows: {} ({} days, {} to {})\n",
        stats.n_rows, stats.n_dates, stats.first_date, stats.last_date
    ));
    out.push_str(&format!(
        "- missing step counts: {} ({}% of rows)\n\n",
        stats.n_missing,
        fmt_num(100.0 * stats.n_missing as f64 / stats.n_rows.max(1) as f64)
    ));

    out.push_str("## Missing data\n\n");
    out.push_str(&format_missing_patterns(&run.patterns));
    out.push('\n');

    out.push_str("## Total steps per day\n\n");
    out.push_str("Missing step counts count as zero in this pass.");
    if run.raw.zero_days > 0 {
        out.push_str(&format!(
            " The {} day(s) without any recorded steps therefore total 0, which pulls the mean and median down.",
            run.raw.zero_days
        ));
    }
    out.push_str("\n\n");
    push_daily_stats(&mut out, &run.raw);
    if config.plot {
        push_text_block(&mut out, &render_histogram(
            &daily_histogram(&run.raw, config.bin_width),
            config.plot_width,
            config.plot_height,
        ));
    }
    push_chart_link(&mut out, "Total steps per day", charts.map(|c| c.raw_histogram.as_path()));

    out.push_str("## Average daily activity pattern\n\n");
    match run.raw.peak {
        Some(p) => out.push_str(&format!(
            "The 5-minute interval with the most steps on average is {}, with {} steps.\n\n",
            fmt_interval(&p),
            fmt_num(p.mean_steps)
        )),
        None => out.push_str("No interval has any recorded steps.\n\n"),
    }
    if config.plot {
        push_text_block(&mut out, &render_profile(
            &overall_profile(&run.raw),
            config.plot_width,
            config.plot_height,
        ));
    }
    push_chart_link(&mut out, "Average daily activity pattern", charts.map(|c| c.profile.as_path()));

    out.push_str("## Imputing missing values\n\n");
    match &run.imputation.model {
        Some(model) => out.push_str(&format!(
            "{} missing step counts were filled by predictive mean matching \
             (seed {}, {} donors, regression on {} using {} complete rows). \
             Each filled value is copied from an observed interval, so the completed \
             data keeps the original value distribution.\n\n",
            run.imputation.n_imputed,
            model.seed,
            model.donors,
            model.columns.join(", "),
            model.n_train
        )),
        None => out.push_str("No step counts were missing; the imputed pass equals the raw pass.\n\n"),
    }
    push_daily_stats(&mut out, &run.imputed);
    out.push_str(&format!(
        "Compared with the raw pass the mean changes by {} and the median by {}.\n\n",
        fmt_delta(run.raw.daily_mean, run.imputed.daily_mean),
        fmt_delta(run.raw.daily_median, run.imputed.daily_median)
    ));
    if config.plot {
        push_text_block(&mut out, &render_histogram(
            &daily_histogram(&run.imputed, config.bin_width),
            config.plot_width,
            config.plot_height,
        ));
    }
    push_chart_link(&mut out, "Total steps per day, imputed", charts.map(|c| c.imputed_histogram.as_path()));

    out.push_str("## Weekdays and weekends\n\n");
    out.push_str(&format_day_kind_table(&run.imputed));
    out.push('\n');
    if config.plot {
        push_text_block(&mut out, &render_faceted_profile(
            &day_kind_panels(&run.imputed),
            config.plot_width,
            config.plot_height / 2,
        ));
    }
    push_chart_link(
        &mut out,
        "Activity pattern by day kind",
        charts.map(|c| c.profile_by_day_kind.as_path()),
    );

    out
}

/// Format the missing-data pattern table.
///
/// One row per pattern (most complete first) with its row count and number of
/// missing columns, then a totals row with the missing count per column.
pub fn format_missing_patterns(table: &MissingPatternTable) -> String {
    let mut out = String::new();

    let header: Vec<&str> = PATTERN_COLUMNS.iter().copied().chain(["rows", "missing"]).collect();
    out.push_str(&format!("| {} |\n", header.join(" | ")));
    out.push_str(&format!("|{}\n", "---|".repeat(header.len())));

    for p in &table.patterns {
        let cells: Vec<String> = p
            .present
            .iter()
            .map(|&present| if present { "present" } else { "missing" }.to_string())
            .chain([p.rows.to_string(), p.n_missing().to_string()])
            .collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    let totals: Vec<String> = table
        .missing_per_column
        .iter()
        .map(|n| n.to_string())
        .chain([String::new(), table.total_missing.to_string()])
        .collect();
    out.push_str(&format!("| {} |\n", totals.join(" | ")));

    out
}

fn format_day_kind_table(summary: &PassSummary) -> String {
    let mut out = String::new();
    out.push_str("| day kind | peak interval | peak steps | mean steps per interval |\n");
    out.push_str("|---|---|---|---|\n");
    for s in &summary.by_day_kind {
        let (interval, steps) = match &s.peak {
            Some(p) => (fmt_interval(p), fmt_num(p.mean_steps)),
            None => ("n/a".to_string(), "n/a".to_string()),
        };
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            s.day_kind.display_name(),
            interval,
            steps,
            fmt_opt(s.mean_steps_per_interval)
        ));
    }
    out
}

fn push_daily_stats(out: &mut String, summary: &PassSummary) {
    out.push_str(&format!("- mean: {}\n", fmt_opt(summary.daily_mean)));
    out.push_str(&format!("- median: {}\n\n", fmt_opt(summary.daily_median)));
}

fn push_text_block(out: &mut String, text: &str) {
    out.push_str("```text\n");
    out.push_str(text);
    out.push_str("```\n\n");
}

fn push_chart_link(out: &mut String, alt: &str, path: Option<&Path>) {
    if let Some(path) = path {
        out.push_str(&format!("![{alt}]({})\n\n", path.display()));
    }
}

/// `835 (08:35)`.
fn fmt_interval(p: &Peak) -> String {
    format!("{} ({})", p.interval, p.interval.label())
}

/// Two decimals for fractional values, none for whole numbers.
pub fn fmt_num(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(fmt_num).unwrap_or_else(|| "n/a".to_string())
}

fn fmt_delta(before: Option<f64>, after: Option<f64>) -> String {
    match (before, after) {
        (Some(b), Some(a)) => {
            let d = a - b;
            if d >= 0.0 {
                format!("+{}", fmt_num(d))
            } else {
                format!("-{}", fmt_num(-d))
            }
        }
        _ => "n/a".to_string(),
    }
}
