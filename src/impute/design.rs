//! Covariate design matrix for the imputation regression.
//!
//! Columns, before pruning:
//!
//! | name        | value                                   |
//! |-------------|-----------------------------------------|
//! | `intercept` | 1                                       |
//! | `day_index` | days since the first date in the data   |
//! | `hour`      | decoded time of day in hours (0..24)    |
//! | `tuesday`.. | weekday indicators, Monday is baseline  |
//!
//! The weekend flag is the sum of the Saturday and Sunday indicators, so it
//! gets no column of its own.

use chrono::{NaiveDate, Weekday};
use nalgebra::DMatrix;

use crate::domain::Observation;

const WEEKDAY_COLUMNS: [(Weekday, &str); 6] = [
    (Weekday::Tue, "tuesday"),
    (Weekday::Wed, "wednesday"),
    (Weekday::Thu, "thursday"),
    (Weekday::Fri, "friday"),
    (Weekday::Sat, "saturday"),
    (Weekday::Sun, "sunday"),
];

/// Selected covariate columns and how to evaluate them per row.
#[derive(Debug, Clone)]
pub struct Design {
    origin: NaiveDate,
    /// Indexes into the full column list that survived pruning.
    keep: Vec<usize>,
}

impl Design {
    /// Choose columns from the training rows.
    ///
    /// Columns that are constant across `training` carry no information and
    /// would make the normal matrix singular, so they are dropped. The
    /// intercept is always kept.
    pub fn fit(origin: NaiveDate, training: &[&Observation]) -> Self {
        let all = Self {
            origin,
            keep: (0..column_count()).collect(),
        };

        let full: Vec<Vec<f64>> = training.iter().map(|o| all.full_row(o)).collect();

        let mut keep = vec![0];
        for col in 1..column_count() {
            let Some(first) = full.first().map(|r| r[col]) else { continue };
            if full.iter().any(|r| r[col] != first) {
                keep.push(col);
            }
        }

        Self { origin, keep }
    }

    pub fn ncols(&self) -> usize {
        self.keep.len()
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        let names = full_column_names();
        self.keep.iter().map(|&c| names[c]).collect()
    }

    /// Build the matrix for `rows`, one matrix row per observation.
    pub fn matrix(&self, rows: &[&Observation]) -> DMatrix<f64> {
        let mut x = DMatrix::zeros(rows.len(), self.ncols());
        for (i, o) in rows.iter().enumerate() {
            let full = self.full_row(o);
            for (j, &c) in self.keep.iter().enumerate() {
                x[(i, j)] = full[c];
            }
        }
        x
    }

    fn full_row(&self, o: &Observation) -> Vec<f64> {
        let mut row = Vec::with_capacity(column_count());
        row.push(1.0);
        row.push((o.date - self.origin).num_days() as f64);
        row.push(f64::from(o.interval.minutes_since_midnight()) / 60.0);
        for (weekday, _) in WEEKDAY_COLUMNS {
            row.push(if o.weekday == weekday { 1.0 } else { 0.0 });
        }
        row
    }
}

fn full_column_names() -> Vec<&'static str> {
    let mut names = vec!["intercept", "day_index", "hour"];
    names.extend(WEEKDAY_COLUMNS.iter().map(|(_, name)| *name));
    names
}

fn column_count() -> usize {
    3 + WEEKDAY_COLUMNS.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IntervalCode;

    fn obs(day: u32, interval: u16) -> Observation {
        Observation::new(
            NaiveDate::from_ymd_opt(2012, 10, day).unwrap(),
            IntervalCode::new(interval).unwrap(),
            Some(0),
        )
    }

    #[test]
    fn constant_columns_are_pruned() {
        let origin = NaiveDate::from_ymd_opt(2012, 10, 1).unwrap();
        // Monday and Tuesday only: other weekday indicators are all zero.
        let rows = [obs(1, 0), obs(1, 130), obs(2, 0)];
        let refs: Vec<&Observation> = rows.iter().collect();

        let design = Design::fit(origin, &refs);
        assert_eq!(design.column_names(), vec!["intercept", "day_index", "hour", "tuesday"]);

        let x = design.matrix(&refs);
        assert_eq!(x.nrows(), 3);
        assert_eq!(x.ncols(), 4);
        assert_eq!(x[(1, 2)], 1.5);
        assert_eq!(x[(2, 1)], 1.0);
        assert_eq!(x[(2, 3)], 1.0);
        assert_eq!(x[(0, 3)], 0.0);
    }

    #[test]
    fn full_week_keeps_every_column() {
        let origin = NaiveDate::from_ymd_opt(2012, 10, 1).unwrap();
        let rows: Vec<Observation> = (1..=7).flat_map(|d| [obs(d, 0), obs(d, 500)]).collect();
        let refs: Vec<&Observation> = rows.iter().collect();

        let design = Design::fit(origin, &refs);
        assert_eq!(design.ncols(), 9);
    }
}
