//! Shared "query pipeline" logic used by every subcommand that produces a series.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! validate query -> read log -> compute metric -> sort -> label/name
//!
//! The subcommands can then focus on presentation (printing vs files).

use std::path::Path;

use tracing::info;

use crate::domain::{Diagnostic, Query, SeriesPoint};
use crate::error::{AppError, Result};
use crate::io::parser::{ParsedLog, read_log};
use crate::metrics::compute_sorted;
use crate::report::{ChartLabels, artifact_name, chart_labels};

/// All computed outputs of a single query run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub query: Query,
    pub series: Vec<SeriesPoint>,
    /// Parser skips first, then transform/metric diagnostics.
    pub diagnostics: Vec<Diagnostic>,
    pub labels: ChartLabels,
    pub artifact: String,
    pub lines_read: usize,
    pub records_used: usize,
}

/// Validate `query`, read the log at `path`, and compute the series.
///
/// The query is checked before the file is touched, so a bad query never costs
/// a read.
pub fn run_query(path: &Path, query: &Query) -> Result<RunOutput> {
    query.validate()?;
    let parsed = read_log(path)?;
    run_query_on_log(parsed, query)
}

/// Compute the series for an already parsed log.
pub fn run_query_on_log(parsed: ParsedLog, query: &Query) -> Result<RunOutput> {
    query.validate()?;

    let computed = compute_sorted(&parsed.store, query);
    if computed.points.is_empty() {
        return Err(AppError::EmptyResult {
            region: query.region.display_name().to_string(),
            metric: query.metric.display_name().to_string(),
        });
    }

    let labels = chart_labels(query);
    let artifact = artifact_name(query, &computed.points)?;

    let mut diagnostics = parsed.issues;
    diagnostics.extend(computed.diagnostics);

    info!(
        artifact = %artifact,
        points = computed.points.len(),
        diagnostics = diagnostics.len(),
        "series computed"
    );

    Ok(RunOutput {
        query: query.clone(),
        series: computed.points,
        diagnostics,
        labels,
        artifact,
        lines_read: parsed.lines_read,
        records_used: parsed.records_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Metric, Mode, Region};
    use crate::io::parser::parse_log;

    const LOG: &str = "\
Entry:
date\t01-04-2020
tests\t100
pos\t10
Entry:
date\t02-04-2020
tests\t120
pos\t15
deaths\tnot-a-number
";

    #[test]
    fn runs_a_ratio_query_end_to_end() {
        let query = Query::new(Metric::Positivity, Region::Za, Mode::Cumulative, 1).unwrap();
        let run = run_query_on_log(parse_log(LOG), &query).unwrap();
        assert_eq!(run.series.len(), 2);
        assert!((run.series[1].value - 0.125).abs() < 1e-9);
        assert_eq!(run.artifact, "za_positivity_cumulative_linear_2020-04-01_2020-04-02");
        assert_eq!(run.lines_read, 9);
    }

    #[test]
    fn empty_result_is_reported_with_exit_code_three() {
        let query = Query::new(Metric::Recov, Region::Za, Mode::Cumulative, 1).unwrap();
        let err = run_query_on_log(parse_log(LOG), &query).unwrap_err();
        assert!(matches!(err, AppError::EmptyResult { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let query = Query::new(Metric::Pos, Region::Za, Mode::Cumulative, 1).unwrap();
        let err = run_query(Path::new("/no/such/log.txt"), &query).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }

    #[test]
    fn clipping_everything_away_is_empty() {
        let start = chrono::NaiveDate::from_ymd_opt(2021, 1, 1);
        let query = Query::new(Metric::Pos, Region::Za, Mode::Cumulative, 1)
            .unwrap()
            .with_range(start, None)
            .unwrap();
        assert!(run_query_on_log(parse_log(LOG), &query).is_err());
    }
}
