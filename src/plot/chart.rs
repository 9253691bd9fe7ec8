//! SVG line chart for a computed series.
//!
//! The chart is fully data-driven: labels come from `report::chart_labels`,
//! bounds are derived from the points, and the x axis is "days since the first
//! point" so that calendar gaps keep their true width.

use std::error::Error;
use std::ops::Range;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use plotters::coord::Shift;
use plotters::coord::ranged1d::{AsRangedCoord, Ranged, ValueFormatter};
use plotters::prelude::*;
use tracing::debug;

use crate::domain::{SeriesPoint, YScale};
use crate::error::{AppError, Result};
use crate::report::ChartLabels;

/// Default canvas size in pixels.
pub const DEFAULT_SIZE: (u32, u32) = (1280, 720);

/// Render `points` as an SVG line chart at `path`.
///
/// With a log y axis, non-positive values cannot be placed and are left out;
/// a series with no positive value at all fails to render.
pub fn write_svg(
    path: &Path,
    points: &[SeriesPoint],
    labels: &ChartLabels,
    yscale: YScale,
    size: (u32, u32),
) -> Result<()> {
    let plotted: Vec<&SeriesPoint> = match yscale {
        YScale::Linear => points.iter().collect(),
        YScale::Log => points.iter().filter(|p| p.value > 0.0).collect(),
    };
    let (Some(first), Some(last)) = (plotted.first(), plotted.last()) else {
        return Err(AppError::Render(format!(
            "nothing to plot for '{}'{}",
            labels.title,
            if yscale == YScale::Log { " (log scale needs positive values)" } else { "" }
        )));
    };

    let origin = first.date;
    let span = (last.date - origin).num_days().max(1) as f64;
    let series: Vec<(f64, f64)> = plotted
        .iter()
        .map(|p| ((p.date - origin).num_days() as f64, p.value))
        .collect();

    let (y0, y1) = y_bounds(&series, yscale);
    let root = SVGBackend::new(path, size).into_drawing_area();

    let drawn = match yscale {
        YScale::Linear => draw(&root, 0.0..span, y0..y1, &series, labels, origin),
        YScale::Log => draw(&root, 0.0..span, (y0..y1).log_scale(), &series, labels, origin),
    };
    drawn.map_err(|e| AppError::Render(format!("failed to draw '{}': {e}", path.display())))?;

    debug!(path = %path.display(), points = series.len(), "chart written");
    Ok(())
}

fn draw<Y>(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    x_range: Range<f64>,
    y_range: Y,
    series: &[(f64, f64)],
    labels: &ChartLabels,
    origin: NaiveDate,
) -> std::result::Result<(), Box<dyn Error>>
where
    Y: AsRangedCoord<Value = f64>,
    Y::CoordDescType: Ranged<ValueType = f64> + ValueFormatter<f64>,
{
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(&labels.title, ("sans-serif", 24))
        .margin(12)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 50)
        .build_cartesian_2d(x_range, y_range)?;

    let fmt_x = |v: &f64| (origin + Duration::days(v.round() as i64)).format("%Y-%m-%d").to_string();
    chart
        .configure_mesh()
        .x_desc(labels.x_label.as_str())
        .y_desc(labels.y_label.as_str())
        .x_labels(8)
        .y_labels(8)
        .x_label_formatter(&fmt_x)
        .draw()?;

    chart.draw_series(LineSeries::new(series.iter().copied(), &BLUE))?;

    root.present()?;
    Ok(())
}

fn y_bounds(series: &[(f64, f64)], yscale: YScale) -> (f64, f64) {
    let lo = series.iter().map(|&(_, y)| y).fold(f64::INFINITY, f64::min);
    let hi = series.iter().map(|&(_, y)| y).fold(f64::NEG_INFINITY, f64::max);

    match yscale {
        YScale::Linear => {
            if hi > lo {
                let pad = (hi - lo) * 0.05;
                (lo - pad, hi + pad)
            } else {
                (lo - 1.0, hi + 1.0)
            }
        }
        // Log axes pad multiplicatively and must stay above zero.
        YScale::Log => {
            if hi > lo {
                (lo / 1.1, hi * 1.1)
            } else {
                (lo / 2.0, hi * 2.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> ChartLabels {
        ChartLabels {
            title: "Cumulative Covid-19 Confirmed Cases in South Africa".to_string(),
            y_label: "Confirmed Cases".to_string(),
            x_label: "Date".to_string(),
        }
    }

    fn points(values: &[f64]) -> Vec<SeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| SeriesPoint::new(NaiveDate::from_ymd_opt(2020, 4, 1 + i as u32).unwrap(), v))
            .collect()
    }

    #[test]
    fn writes_svg_with_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        write_svg(&path, &points(&[10.0, 12.0, 15.0]), &labels(), YScale::Linear, (640, 480)).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Confirmed Cases"));
    }

    #[test]
    fn log_scale_skips_non_positive_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.svg");
        write_svg(&path, &points(&[0.0, 5.0, 50.0]), &labels(), YScale::Log, (640, 480)).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn log_scale_without_positive_values_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.svg");
        let err = write_svg(&path, &points(&[0.0, 0.0]), &labels(), YScale::Log, (640, 480)).unwrap_err();
        assert!(matches!(err, AppError::Render(_)));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn flat_series_gets_room_on_both_sides() {
        assert_eq!(y_bounds(&[(0.0, 3.0), (1.0, 3.0)], YScale::Linear), (2.0, 4.0));
        assert_eq!(y_bounds(&[(0.0, 4.0)], YScale::Log), (2.0, 8.0));
    }
}
