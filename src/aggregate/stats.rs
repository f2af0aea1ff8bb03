//! Small descriptive statistics used by the report.

use serde::Serialize;

use crate::domain::IntervalCode;

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median; even-length input averages the two middle values.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Interval with the highest mean and that mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Peak {
    pub interval: IntervalCode,
    pub mean_steps: f64,
}

/// Highest point of an interval profile. The earliest interval wins ties.
pub fn peak(profile: &[(IntervalCode, f64)]) -> Option<Peak> {
    let mut best: Option<Peak> = None;
    for &(interval, mean_steps) in profile {
        match best {
            Some(b) if mean_steps <= b.mean_steps => {}
            _ => best = Some(Peak { interval, mean_steps }),
        }
    }
    best
}

/// A half-open histogram bin `[lower, upper)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistogramBin {
    pub lower: u64,
    pub upper: u64,
    pub count: usize,
}

/// Count values into fixed-width bins starting at zero.
///
/// Bins run up to the one holding the maximum value, so empty bins in the
/// middle are kept and the x-axis stays contiguous.
pub fn histogram(values: &[u64], bin_width: u64) -> Vec<HistogramBin> {
    let bin_width = bin_width.max(1);
    let Some(&max) = values.iter().max() else {
        return Vec::new();
    };

    let n_bins = (max / bin_width + 1) as usize;
    let mut bins: Vec<HistogramBin> = (0..n_bins as u64)
        .map(|i| HistogramBin {
            lower: i * bin_width,
            upper: (i + 1) * bin_width,
            count: 0,
        })
        .collect();
    for &v in values {
        bins[(v / bin_width) as usize].count += 1;
    }
    bins
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_median() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn peak_prefers_first_on_ties() {
        let code = |c| IntervalCode::new(c).unwrap();
        let p = peak(&[(code(0), 1.0), (code(5), 9.0), (code(10), 9.0)]).unwrap();
        assert_eq!(p.interval, code(5));
        assert_eq!(p.mean_steps, 9.0);
        assert_eq!(peak(&[]), None);
    }

    #[test]
    fn histogram_keeps_empty_bins() {
        let bins = histogram(&[0, 999, 1000, 3500], 1000);
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 1, 0, 1]);
        assert_eq!(bins[3].lower, 3000);
        assert_eq!(bins[3].upper, 4000);
        assert!(histogram(&[], 1000).is_empty());
    }
}
