//! Export a computed series to CSV and JSON.
//!
//! CSV is the spreadsheet-friendly form (`date,value`). JSON is the portable
//! form: the series plus enough query metadata to re-render the chart later
//! without the original log (see `read_series_json`).

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Metric, Mode, Query, Region, SeriesPoint, YScale};
use crate::error::{AppError, Result};
use crate::report::ChartLabels;

/// Portable JSON representation of one computed series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesFile {
    pub tool: String,
    pub artifact: String,
    pub title: String,
    pub y_label: String,
    pub region: Region,
    pub metric: Metric,
    pub mode: Mode,
    pub window: usize,
    pub yscale: YScale,
    pub points: Vec<SeriesPoint>,
}

impl SeriesFile {
    pub fn new(query: &Query, labels: &ChartLabels, artifact: &str, points: &[SeriesPoint]) -> Self {
        Self {
            tool: "epi".to_string(),
            artifact: artifact.to_string(),
            title: labels.title.clone(),
            y_label: labels.y_label.clone(),
            region: query.region,
            metric: query.metric,
            mode: query.mode,
            window: query.window,
            yscale: query.yscale,
            points: points.to_vec(),
        }
    }

    /// Labels to render this file with.
    pub fn labels(&self) -> ChartLabels {
        ChartLabels {
            title: self.title.clone(),
            y_label: self.y_label.clone(),
            x_label: "Date".to_string(),
        }
    }
}

/// Write `date,value` rows to a CSV file.
pub fn write_series_csv(path: &Path, points: &[SeriesPoint]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::Export(format!("failed to create CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["date", "value"])
        .map_err(|e| AppError::Export(format!("failed to write CSV header: {e}")))?;
    for p in points {
        writer
            .write_record([p.date.format("%Y-%m-%d").to_string(), p.value.to_string()])
            .map_err(|e| AppError::Export(format!("failed to write CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::Export(format!("failed to flush CSV '{}': {e}", path.display())))?;

    Ok(())
}

/// Write a series JSON file.
pub fn write_series_json(path: &Path, series: &SeriesFile) -> Result<()> {
    let file = File::create(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer_pretty(file, series)
        .map_err(|e| AppError::Export(format!("failed to write series JSON: {e}")))?;
    Ok(())
}

/// Read a series JSON file.
pub fn read_series_json(path: &Path) -> Result<SeriesFile> {
    let file = File::open(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let series: SeriesFile = serde_json::from_reader(file)
        .map_err(|e| AppError::InvalidQuery(format!("invalid series JSON '{}': {e}", path.display())))?;
    Ok(series)
}
