//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Chart types:
//! - histogram of daily totals: `#` bars
//! - mean steps by time of day: `*` line over the decoded time axis
//!   (minutes since midnight), so the `55 -> 100` jump in interval codes does
//!   not show up as a gap

use crate::aggregate::HistogramBin;
use crate::domain::IntervalCode;

/// Last 5-minute slot of the day, in minutes since midnight.
const DAY_END_MINUTES: f64 = 1435.0;

/// Render a histogram of binned counts.
pub fn render_histogram(bins: &[HistogramBin], width: usize, height: usize) -> String {
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return "Histogram: (no data)\n".to_string();
    };
    let height = height.max(2);
    let bar_w = (width / bins.len()).max(1);
    let total_w = bar_w * bins.len();

    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    let bar_heights: Vec<usize> = bins
        .iter()
        .map(|b| ((b.count as f64 / max_count as f64) * height as f64).round() as usize)
        .collect();

    let mut out = String::new();
    out.push_str(&format!(
        "Histogram: n={} | bin width={} | max count={}\n",
        bins.iter().map(|b| b.count).sum::<usize>(),
        first.upper - first.lower,
        max_count
    ));

    for r in 0..height {
        let level = height - r;
        let mut row = String::with_capacity(total_w);
        for &h in &bar_heights {
            for c in 0..bar_w {
                // Keep one blank column between wide bars.
                let gap = bar_w > 1 && c == bar_w - 1;
                row.push(if h >= level && !gap { '#' } else { ' ' });
            }
        }
        out.push_str(row.trim_end());
        out.push('\n');
    }

    out.push_str(&"-".repeat(total_w));
    out.push('\n');
    out.push_str(&axis_labels(&first.lower.to_string(), &last.upper.to_string(), total_w));
    out
}

/// Render a line chart of interval means over the day.
pub fn render_profile(series: &[(IntervalCode, f64)], width: usize, height: usize) -> String {
    let Some(y_max) = y_max(&[series]) else {
        return "Profile: (no data)\n".to_string();
    };
    render_profile_panel(series, width, height, y_max)
}

/// Render one panel per series, stacked, with a shared y-range.
pub fn render_faceted_profile(
    panels: &[(&str, Vec<(IntervalCode, f64)>)],
    width: usize,
    height: usize,
) -> String {
    let all: Vec<&[(IntervalCode, f64)]> = panels.iter().map(|(_, s)| s.as_slice()).collect();
    let Some(y_max) = y_max(&all) else {
        return "Profile: (no data)\n".to_string();
    };

    let mut out = String::new();
    for (idx, (title, series)) in panels.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(&format!("[{title}]\n"));
        out.push_str(&render_profile_panel(series, width, height, y_max));
    }
    out
}

fn render_profile_panel(series: &[(IntervalCode, f64)], width: usize, height: usize, y_max: f64) -> String {
    let width = width.max(10);
    let height = height.max(3);
    let y_min = 0.0;

    let mut grid = vec![vec![' '; width]; height];

    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|(code, m)| (f64::from(code.minutes_since_midnight()), *m))
        .collect();
    draw_curve(&mut grid, &points, 0.0, DAY_END_MINUTES, y_min, y_max);

    let mut out = String::new();
    out.push_str(&format!(
        "Profile: x=[00:00, 23:55] | y=[{y_min:.2}, {y_max:.2}] steps\n"
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out.push_str(&"-".repeat(width));
    out.push('\n');
    out.push_str(&axis_labels("00:00", "23:55", width));
    out
}

fn axis_labels(left: &str, right: &str, width: usize) -> String {
    let pad = width.saturating_sub(left.len() + right.len()).max(1);
    format!("{left}{}{right}\n", " ".repeat(pad))
}

/// Largest mean across all series; an all-zero chart still gets a unit range.
fn y_max(series: &[&[(IntervalCode, f64)]]) -> Option<f64> {
    let mut max = f64::NEG_INFINITY;
    for s in series {
        for &(_, y) in s.iter() {
            max = max.max(y);
        }
    }
    if !max.is_finite() {
        return None;
    }
    Some(if max > 0.0 { max } else { 1.0 })
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], t_min: f64, t_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '*');
        } else {
            grid[yy][x] = '*';
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
