//! Scalar summaries of one aggregation pass (raw or imputed).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::{IntervalMeans, daily_totals, interval_means, mean, median, peak, profile, Peak};
use crate::domain::{DayKind, MissingPolicy, Observation};

/// Peak and average level of one weekday/weekend partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayKindSummary {
    pub day_kind: DayKind,
    pub peak: Option<Peak>,
    /// Mean of the partition's interval means (steps per 5 minutes).
    pub mean_steps_per_interval: Option<f64>,
}

/// Everything the report prints for one pass.
#[derive(Debug, Clone, Serialize)]
pub struct PassSummary {
    pub daily_totals: BTreeMap<NaiveDate, Option<u64>>,
    pub daily_mean: Option<f64>,
    pub daily_median: Option<f64>,
    /// Days whose total came out as zero.
    pub zero_days: usize,
    #[serde(skip)]
    pub interval_means: IntervalMeans,
    pub peak: Option<Peak>,
    #[serde(skip)]
    pub interval_means_by_day_kind: IntervalMeans,
    pub by_day_kind: Vec<DayKindSummary>,
}

impl PassSummary {
    /// Daily totals that are present, in date order.
    pub fn present_totals(&self) -> Vec<u64> {
        self.daily_totals.values().filter_map(|t| *t).collect()
    }
}

/// Run both aggregations and reduce them to the report's scalars.
pub fn summarize(observations: &[Observation], policy: MissingPolicy) -> PassSummary {
    let daily_totals = daily_totals(observations, policy);
    let totals: Vec<f64> = daily_totals.values().filter_map(|t| t.map(|v| v as f64)).collect();

    let interval_means_all = interval_means(observations, policy, false);
    let by_kind = interval_means(observations, policy, true);

    let by_day_kind = DayKind::ALL
        .iter()
        .map(|&day_kind| {
            let series = profile(&by_kind, Some(day_kind));
            let values: Vec<f64> = series.iter().map(|(_, m)| *m).collect();
            DayKindSummary {
                day_kind,
                peak: peak(&series),
                mean_steps_per_interval: mean(&values),
            }
        })
        .collect();

    PassSummary {
        daily_mean: mean(&totals),
        daily_median: median(&totals),
        zero_days: daily_totals.values().filter(|t| **t == Some(0)).count(),
        peak: peak(&profile(&interval_means_all, None)),
        daily_totals,
        interval_means: interval_means_all,
        interval_means_by_day_kind: by_kind,
        by_day_kind,
    }
}
