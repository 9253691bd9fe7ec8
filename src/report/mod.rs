//! Reporting utilities: chart labels, artifact names, and terminal output.
//!
//! Everything here is derived deterministically from the query and the
//! computed series, so renderers never have to make naming decisions.

use crate::domain::{Mode, Query, SeriesPoint, YScale};
use crate::error::{AppError, Result};

pub mod format;

pub use format::*;

/// Title and axis labels for a chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartLabels {
    pub title: String,
    pub y_label: String,
    pub x_label: String,
}

pub fn chart_labels(query: &Query) -> ChartLabels {
    let prefix = match query.mode {
        Mode::Cumulative => "Cumulative",
        Mode::Daily => "Daily",
    };

    let mut title = format!(
        "{prefix} Covid-19 {} in {}",
        query.metric.display_name(),
        query.region.display_name()
    );
    if query.is_averaged() {
        title.push_str(&format!(" ({} Day Average)", query.window));
    }
    if query.yscale == YScale::Log {
        title.push_str(" (Log Scale)");
    }

    ChartLabels {
        title,
        y_label: query.metric.display_name().to_string(),
        x_label: "Date".to_string(),
    }
}

/// File stem for the rendered chart:
/// `region_metric_mode_yscale[_Nday]_first_last`.
///
/// Fails with `EmptyResult` when there is no first/last date to name it by.
pub fn artifact_name(query: &Query, points: &[SeriesPoint]) -> Result<String> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Err(AppError::EmptyResult {
            region: query.region.display_name().to_string(),
            metric: query.metric.display_name().to_string(),
        });
    };

    let mut parts = vec![
        query.region.slug(),
        query.metric.slug().to_string(),
        query.mode.slug().to_string(),
        query.yscale.slug().to_string(),
    ];
    if query.is_averaged() {
        parts.push(format!("{}day", query.window));
    }
    parts.push(first.date.format("%Y-%m-%d").to_string());
    parts.push(last.date.format("%Y-%m-%d").to_string());

    Ok(parts.join("_"))
}
