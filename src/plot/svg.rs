//! SVG chart files rendered with Plotters.
//!
//! These are the report's document-quality charts; the terminal gets the
//! ASCII versions from `plot::ascii`.

use std::error::Error;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::aggregate::HistogramBin;
use crate::domain::IntervalCode;
use crate::error::AppError;

const SIZE: (u32, u32) = (900, 500);
const FACET_SIZE: (u32, u32) = (900, 800);
const DAY_END_MINUTES: f64 = 1435.0;

type PlotResult = Result<(), Box<dyn Error>>;

/// Write a histogram of daily totals.
pub fn write_histogram_svg(path: &Path, bins: &[HistogramBin], title: &str) -> Result<PathBuf, AppError> {
    draw_histogram(path, bins, title).map_err(|e| render_error(path, e))?;
    Ok(path.to_path_buf())
}

/// Write a line chart of mean steps over the time of day.
pub fn write_profile_svg(path: &Path, series: &[(IntervalCode, f64)], title: &str) -> Result<PathBuf, AppError> {
    draw_single_profile(path, series, title).map_err(|e| render_error(path, e))?;
    Ok(path.to_path_buf())
}

/// Write stacked profile panels sharing one y-range.
pub fn write_faceted_profile_svg(
    path: &Path,
    panels: &[(&str, Vec<(IntervalCode, f64)>)],
) -> Result<PathBuf, AppError> {
    draw_faceted_profile(path, panels).map_err(|e| render_error(path, e))?;
    Ok(path.to_path_buf())
}

fn draw_single_profile(path: &Path, series: &[(IntervalCode, f64)], title: &str) -> PlotResult {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    draw_profile(&root, series, title, y_max(&[series]))?;
    root.present()?;
    Ok(())
}

fn draw_faceted_profile(path: &Path, panels: &[(&str, Vec<(IntervalCode, f64)>)]) -> PlotResult {
    let root = SVGBackend::new(path, FACET_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let all: Vec<&[(IntervalCode, f64)]> = panels.iter().map(|(_, s)| s.as_slice()).collect();
    let y_max = y_max(&all);

    let areas = root.split_evenly((panels.len().max(1), 1));
    for (area, (title, series)) in areas.iter().zip(panels.iter()) {
        draw_profile(area, series, title, y_max)?;
    }
    root.present()?;
    Ok(())
}

fn draw_histogram(path: &Path, bins: &[HistogramBin], title: &str) -> PlotResult {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = bins.last().map(|b| b.upper as f64).unwrap_or(1.0);
    let y_max = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20).into_font())
        .margin(12)
        .set_label_area_size(LabelAreaPosition::Left, 50)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max * 1.05)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("total steps per day")
        .y_desc("days")
        .x_label_formatter(&|v| format!("{v:.0}"))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()?;

    let fill = RGBColor(70, 130, 180);
    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new(
            [(b.lower as f64, 0.0), (b.upper as f64, b.count as f64)],
            fill.mix(0.8).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

fn draw_profile(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    series: &[(IntervalCode, f64)],
    title: &str,
    y_max: f64,
) -> PlotResult {
    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 18).into_font())
        .margin(12)
        .set_label_area_size(LabelAreaPosition::Left, 50)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(0.0..DAY_END_MINUTES, 0.0..y_max * 1.05)?;

    chart
        .configure_mesh()
        .x_desc("time of day")
        .y_desc("mean steps per 5 minutes")
        .x_labels(9)
        .x_label_formatter(&|v| {
            let m = v.round().clamp(0.0, DAY_END_MINUTES) as u32;
            format!("{:02}:{:02}", m / 60, m % 60)
        })
        .draw()?;

    chart.draw_series(LineSeries::new(
        series
            .iter()
            .map(|(code, m)| (f64::from(code.minutes_since_midnight()), *m)),
        &RGBColor(70, 130, 180),
    ))?;
    Ok(())
}

fn y_max(series: &[&[(IntervalCode, f64)]]) -> f64 {
    let max = series
        .iter()
        .flat_map(|s| s.iter().map(|(_, y)| *y))
        .fold(0.0_f64, f64::max);
    if max > 0.0 { max } else { 1.0 }
}

fn render_error(path: &Path, e: Box<dyn Error>) -> AppError {
    AppError::internal(format!("Failed to render chart '{}': {e}", path.display()))
}
