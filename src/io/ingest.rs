//! CSV ingest for the activity dataset.
//!
//! The input has a fixed three-column schema (`steps`, `date`, `interval`).
//! Every later stage depends on that shape, so unlike a tolerant importer this
//! loader stops at the first bad header or token and reports its line.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{DatasetStats, IntervalCode, Observation};
use crate::error::AppError;

const COLUMNS: [&str; 3] = ["steps", "date", "interval"];

/// Ingest output: observations in file order plus dataset stats.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub observations: Vec<Observation>,
    pub stats: DatasetStats,
}

/// Load the dataset from a CSV file on disk.
pub fn load_observations(path: &Path) -> Result<LoadedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let data = parse_observations(file)?;
    info!(
        path = %path.display(),
        rows = data.stats.n_rows,
        dates = data.stats.n_dates,
        missing = data.stats.n_missing,
        "loaded activity dataset"
    );
    Ok(data)
}

/// Parse the dataset from any reader.
pub fn parse_observations<R: Read>(reader: R) -> Result<LoadedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::schema(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let columns = resolve_columns(&headers)?;

    let mut observations = Vec::new();
    let mut seen = HashSet::new();

    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header, lines are 1-based.
        let line = idx + 2;
        let record =
            result.map_err(|e| AppError::schema(format!("Line {line}: CSV parse error: {e}")))?;

        let obs = parse_row(&record, &columns)
            .map_err(|msg| AppError::schema(format!("Line {line}: {msg}")))?;

        if !seen.insert((obs.date, obs.interval)) {
            return Err(AppError::schema(format!(
                "Line {line}: duplicate row for date {} interval {}",
                obs.date, obs.interval
            )));
        }
        observations.push(obs);
    }

    let stats = compute_stats(&observations)
        .ok_or_else(|| AppError::schema("CSV contains a header but no rows."))?;
    debug!(?stats, "parsed observations");

    Ok(LoadedData {
        observations,
        stats,
    })
}

/// Column positions of the three required fields.
#[derive(Debug, Clone, Copy)]
struct Columns {
    steps: usize,
    date: usize,
    interval: usize,
}

fn resolve_columns(headers: &StringRecord) -> Result<Columns, AppError> {
    let names: Vec<String> = headers.iter().map(normalize_header_name).collect();

    if names.len() != COLUMNS.len() {
        return Err(AppError::schema(format!(
            "Expected exactly {} columns ({}), found {}: [{}]",
            COLUMNS.len(),
            COLUMNS.join(", "),
            names.len(),
            names.join(", ")
        )));
    }

    let header_map: HashMap<&str, usize> = names
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();

    let position = |name: &str| {
        header_map
            .get(name)
            .copied()
            .ok_or_else(|| AppError::schema(format!("Missing required column: `{name}`")))
    };

    Ok(Columns {
        steps: position("steps")?,
        date: position("date")?,
        interval: position("interval")?,
    })
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.trim_matches('"').to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, columns: &Columns) -> Result<Observation, String> {
    let field = |idx: usize| record.get(idx).map(str::trim).unwrap_or("");

    let date = parse_date(field(columns.date))?;
    let interval = parse_interval(field(columns.interval))?;
    let steps = parse_steps(field(columns.steps))?;

    Ok(Observation::new(date, interval, steps))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{s}'. Expected YYYY-MM-DD."))
}

fn parse_interval(s: &str) -> Result<IntervalCode, String> {
    let code = s
        .parse::<u16>()
        .map_err(|_| format!("Invalid interval '{s}'. Expected a non-negative integer."))?;
    IntervalCode::new(code)
        .ok_or_else(|| format!("Invalid interval '{s}'. Expected hour*100 + minute in 5-minute steps."))
}

fn parse_steps(s: &str) -> Result<Option<u32>, String> {
    if s.is_empty() || s.eq_ignore_ascii_case("na") {
        return Ok(None);
    }
    s.parse::<u32>()
        .map(Some)
        .map_err(|_| format!("Invalid steps '{s}'. Expected a non-negative integer or empty."))
}

fn compute_stats(observations: &[Observation]) -> Option<DatasetStats> {
    let dates: BTreeSet<NaiveDate> = observations.iter().map(|o| o.date).collect();
    let first_date = *dates.first()?;
    let last_date = *dates.last()?;

    Some(DatasetStats {
        n_rows: observations.len(),
        n_dates: dates.len(),
        n_missing: observations.iter().filter(|o| o.steps.is_none()).count(),
        first_date,
        last_date,
    })
}
