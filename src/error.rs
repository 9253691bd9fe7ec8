//! Application error type.
//!
//! Only run-terminating conditions live here. Per-record problems found while
//! parsing or transforming the log are reported as
//! [`Diagnostic`](crate::domain::Diagnostic)s and never abort a run.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The query violates its closed-set or numeric constraints.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Every point was filtered out, so there is nothing to name or draw.
    #[error("No data points remain for {metric} in {region} after filtering.")]
    EmptyResult { region: String, metric: String },

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Chart rendering failed: {0}")]
    Render(String),

    #[error("Terminal error: {0}")]
    Terminal(String),
}

impl AppError {
    /// Process exit code for this error.
    ///
    /// - 2: bad input (query, files)
    /// - 3: nothing left to plot
    /// - 4: runtime failures while writing output
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::InvalidQuery(_) | AppError::Io { .. } => 2,
            AppError::EmptyResult { .. } => 3,
            AppError::Export(_) | AppError::Render(_) | AppError::Terminal(_) => 4,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
