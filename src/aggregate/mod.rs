//! Group-and-reduce passes over the observation set.
//!
//! All functions here are pure: they take an immutable slice of observations
//! and return a fresh `BTreeMap`, so results come out sorted by key.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{DayKind, IntervalCode, IntervalGroup, MissingPolicy, Observation};

pub mod stats;
pub mod summary;

pub use stats::*;
pub use summary::*;

/// Mean steps per interval group. `None` marks a group without a usable mean.
pub type IntervalMeans = BTreeMap<IntervalGroup, Option<f64>>;

/// Total steps per date.
///
/// Under [`MissingPolicy::Skip`] missing values add nothing, so a day with no
/// recorded values totals `Some(0)`. Under [`MissingPolicy::Propagate`] any
/// missing value makes that day's total `None`.
pub fn daily_totals(observations: &[Observation], policy: MissingPolicy) -> BTreeMap<NaiveDate, Option<u64>> {
    let mut out: BTreeMap<NaiveDate, Option<u64>> = BTreeMap::new();
    for o in observations {
        let total = out.entry(o.date).or_insert(Some(0));
        match (o.steps, policy) {
            (Some(steps), _) => {
                if let Some(t) = total.as_mut() {
                    *t += u64::from(steps);
                }
            }
            (None, MissingPolicy::Skip) => {}
            (None, MissingPolicy::Propagate) => *total = None,
        }
    }
    out
}

/// Mean steps per interval code, optionally split by weekday/weekend.
///
/// Every interval code in the input gets an entry. Under
/// [`MissingPolicy::Skip`] missing values are left out of the denominator and
/// a group with nothing recorded maps to `None`.
pub fn interval_means(observations: &[Observation], policy: MissingPolicy, by_weekend: bool) -> IntervalMeans {
    #[derive(Default)]
    struct Acc {
        sum: u64,
        count: u64,
        missing: bool,
    }

    let mut acc: BTreeMap<IntervalGroup, Acc> = BTreeMap::new();
    for o in observations {
        let key = IntervalGroup {
            day_kind: by_weekend.then_some(o.day_kind),
            interval: o.interval,
        };
        let a = acc.entry(key).or_default();
        match o.steps {
            Some(steps) => {
                a.sum += u64::from(steps);
                a.count += 1;
            }
            None => a.missing = true,
        }
    }

    acc.into_iter()
        .map(|(key, a)| {
            let mean = match policy {
                MissingPolicy::Propagate if a.missing => None,
                _ if a.count == 0 => None,
                _ => Some(a.sum as f64 / a.count as f64),
            };
            (key, mean)
        })
        .collect()
}

/// The `(interval, mean)` series of one partition, in interval order.
///
/// Pass `None` for means that were not split by weekend. Groups without a
/// mean are left out.
pub fn profile(means: &IntervalMeans, day_kind: Option<DayKind>) -> Vec<(IntervalCode, f64)> {
    means
        .iter()
        .filter(|(key, _)| key.day_kind == day_kind)
        .filter_map(|(key, mean)| mean.map(|m| (key.interval, m)))
        .collect()
}

/// Columns reported by the missing-data pattern table, in display order.
pub const PATTERN_COLUMNS: [&str; 3] = ["steps", "date", "interval"];

/// One present/missing combination and how many rows have it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingPattern {
    /// Presence flags, aligned with [`PATTERN_COLUMNS`].
    pub present: [bool; 3],
    pub rows: usize,
}

impl MissingPattern {
    pub fn n_missing(&self) -> usize {
        self.present.iter().filter(|p| !**p).count()
    }
}

/// Counts of rows per missing-data pattern, plus column totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingPatternTable {
    /// Most complete pattern first.
    pub patterns: Vec<MissingPattern>,
    /// Missing count per column, aligned with [`PATTERN_COLUMNS`].
    pub missing_per_column: [usize; 3],
    pub total_missing: usize,
}

/// Tabulate which columns are present in each row.
///
/// The loader guarantees `date` and `interval`, so in practice only `steps`
/// varies, but the table keeps all three columns.
pub fn missing_patterns(observations: &[Observation]) -> MissingPatternTable {
    let mut counts: BTreeMap<[bool; 3], usize> = BTreeMap::new();
    for o in observations {
        let present = [o.steps.is_some(), true, true];
        *counts.entry(present).or_insert(0) += 1;
    }

    let mut patterns: Vec<MissingPattern> = counts
        .into_iter()
        .map(|(present, rows)| MissingPattern { present, rows })
        .collect();
    patterns.sort_by(|a, b| a.n_missing().cmp(&b.n_missing()).then(b.rows.cmp(&a.rows)));

    let mut missing_per_column = [0usize; 3];
    for p in &patterns {
        for (col, present) in p.present.iter().enumerate() {
            if !present {
                missing_per_column[col] += p.rows;
            }
        }
    }

    MissingPatternTable {
        total_missing: missing_per_column.iter().sum(),
        patterns,
        missing_per_column,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(date: (i32, u32, u32), interval: u16, steps: Option<u32>) -> Observation {
        Observation::new(
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            IntervalCode::new(interval).unwrap(),
            steps,
        )
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2012, 10, d).unwrap()
    }

    fn sample() -> Vec<Observation> {
        vec![
            obs((2012, 10, 1), 0, None),
            obs((2012, 10, 1), 5, Some(10)),
            obs((2012, 10, 2), 0, Some(20)),
        ]
    }

    #[test]
    fn daily_totals_skip_policy() {
        let totals = daily_totals(&sample(), MissingPolicy::Skip);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&day(1)], Some(10));
        assert_eq!(totals[&day(2)], Some(20));
    }

    #[test]
    fn daily_totals_all_missing_day_is_zero_not_missing() {
        let rows = vec![obs((2012, 10, 8), 0, None), obs((2012, 10, 8), 5, None)];
        let totals = daily_totals(&rows, MissingPolicy::Skip);
        assert_eq!(totals[&day(8)], Some(0));
    }

    #[test]
    fn daily_totals_propagate_policy() {
        let totals = daily_totals(&sample(), MissingPolicy::Propagate);
        assert_eq!(totals[&day(1)], None);
        assert_eq!(totals[&day(2)], Some(20));
    }

    #[test]
    fn interval_means_ignore_missing() {
        let means = interval_means(&sample(), MissingPolicy::Skip, false);
        let p = profile(&means, None);
        assert_eq!(
            p,
            vec![(IntervalCode::new(0).unwrap(), 20.0), (IntervalCode::new(5).unwrap(), 10.0)]
        );
    }

    #[test]
    fn interval_means_cover_every_code() {
        let rows = vec![
            obs((2012, 10, 1), 0, Some(1)),
            obs((2012, 10, 2), 0, Some(2)),
            obs((2012, 10, 1), 5, None),
        ];
        let means = interval_means(&rows, MissingPolicy::Skip, false);
        assert_eq!(means.len(), 2);

        let key = |code| IntervalGroup {
            day_kind: None,
            interval: IntervalCode::new(code).unwrap(),
        };
        assert_eq!(means[&key(0)], Some(1.5));
        assert_eq!(means[&key(5)], None);

        let propagated = interval_means(&sample(), MissingPolicy::Propagate, false);
        assert_eq!(propagated[&key(0)], None);
        assert_eq!(propagated[&key(5)], Some(10.0));
    }

    #[test]
    fn interval_means_split_by_weekend() {
        let rows = vec![
            obs((2012, 10, 5), 0, Some(4)), // Friday
            obs((2012, 10, 6), 0, Some(8)), // Saturday
            obs((2012, 10, 7), 0, Some(6)), // Sunday
        ];
        let means = interval_means(&rows, MissingPolicy::Skip, true);
        assert_eq!(means.len(), 2);
        assert_eq!(profile(&means, Some(DayKind::Weekday))[0].1, 4.0);
        assert_eq!(profile(&means, Some(DayKind::Weekend))[0].1, 7.0);
        assert!(profile(&means, None).is_empty());
    }

    #[test]
    fn missing_pattern_table_counts_rows() {
        let table = missing_patterns(&sample());
        assert_eq!(
            table.patterns,
            vec![
                MissingPattern { present: [true, true, true], rows: 2 },
                MissingPattern { present: [false, true, true], rows: 1 },
            ]
        );
        assert_eq!(table.missing_per_column, [1, 0, 0]);
        assert_eq!(table.total_missing, 1);
    }
}
