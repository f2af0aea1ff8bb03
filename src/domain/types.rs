//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - used in-memory by the aggregation and imputation passes
//! - exported to JSON/CSV
//! - printed directly by the report

use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Time-of-day code of a 5-minute interval, encoded as `hour * 100 + minute`.
///
/// The encoding is not a linear time axis: `55` is followed by `100`. Use
/// [`IntervalCode::minutes_since_midnight`] whenever a distance between two
/// intervals matters (plots, regression covariates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct IntervalCode(u16);

impl IntervalCode {
    /// Validate a raw code. Minutes must be a multiple of five below 60 and
    /// hours below 24.
    pub fn new(code: u16) -> Option<Self> {
        let hour = code / 100;
        let minute = code % 100;
        if hour < 24 && minute < 60 && minute % 5 == 0 {
            Some(Self(code))
        } else {
            None
        }
    }

    /// Inverse of [`IntervalCode::minutes_since_midnight`].
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        if minutes >= 24 * 60 || minutes % 5 != 0 {
            return None;
        }
        Some(Self((minutes / 60) * 100 + minutes % 60))
    }

    pub fn code(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 100
    }

    pub fn minute(self) -> u16 {
        self.0 % 100
    }

    pub fn minutes_since_midnight(self) -> u16 {
        self.hour() * 60 + self.minute()
    }

    /// `HH:MM` label.
    pub fn label(self) -> String {
        format!("{:02}:{:02}", self.hour(), self.minute())
    }
}

impl TryFrom<u16> for IntervalCode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        IntervalCode::new(value).ok_or_else(|| format!("invalid interval code {value}"))
    }
}

impl From<IntervalCode> for u16 {
    fn from(value: IntervalCode) -> Self {
        value.0
    }
}

impl fmt::Display for IntervalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Weekday/weekend split of the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayKind {
    Weekday,
    Weekend,
}

impl DayKind {
    pub const ALL: [DayKind; 2] = [DayKind::Weekday, DayKind::Weekend];

    pub fn of(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sat | Weekday::Sun => DayKind::Weekend,
            _ => DayKind::Weekday,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DayKind::Weekday => "weekday",
            DayKind::Weekend => "weekend",
        }
    }
}

/// Full English weekday name, independent of the process locale.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// One 5-minute step count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub date: NaiveDate,
    pub interval: IntervalCode,
    /// `None` when the device recorded nothing for this interval.
    pub steps: Option<u32>,
    pub weekday: Weekday,
    pub day_kind: DayKind,
}

impl Observation {
    /// Build an observation, deriving the calendar fields from `date`.
    pub fn new(date: NaiveDate, interval: IntervalCode, steps: Option<u32>) -> Self {
        let weekday = date.weekday();
        Self {
            date,
            interval,
            steps,
            weekday,
            day_kind: DayKind::of(weekday),
        }
    }

    pub fn weekday_name(&self) -> &'static str {
        weekday_name(self.weekday)
    }

    pub fn is_weekend(&self) -> bool {
        self.day_kind == DayKind::Weekend
    }
}

/// How aggregations treat missing step counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Leave missing values out. Sums count them as zero, means drop them
    /// from the denominator.
    Skip,
    /// Any missing value makes the whole group missing.
    Propagate,
}

/// Key of an interval-mean group.
///
/// `day_kind` is `None` when the means were not split by weekend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IntervalGroup {
    pub day_kind: Option<DayKind>,
    pub interval: IntervalCode,
}

/// Summary stats of a loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetStats {
    pub n_rows: usize,
    pub n_dates: usize,
    pub n_missing: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and `.env`).
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub csv_path: PathBuf,
    /// Archive to extract `csv_path` from when the flat file is absent.
    pub archive_path: Option<PathBuf>,

    pub seed: u64,
    pub donors: usize,

    /// Histogram bin width for daily totals, in steps.
    pub bin_width: u64,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub svg_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub export_summary: Option<PathBuf>,
    pub export_imputed: Option<PathBuf>,
    pub debug: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("activity.csv"),
            archive_path: None,
            seed: 1234,
            donors: 5,
            bin_width: 1000,
            plot: true,
            plot_width: 72,
            plot_height: 16,
            svg_dir: None,
            output: None,
            export_summary: None,
            export_imputed: None,
            debug: false,
        }
    }
}
