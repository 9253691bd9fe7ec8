//! Formatted terminal output.
//!
//! Formatting lives in one place so the transform code stays free of
//! presentation concerns and output changes stay localized.

use crate::app::pipeline::RunOutput;
use crate::domain::{Diagnostic, Indicator, MetricKind, Query, Region, SeriesPoint};
use crate::io::parser::{DATE_TOKEN, ENTRY_MARKER};
use crate::store::SeriesStore;

/// Maximum number of diagnostics listed in the summary.
const DIAGNOSTIC_PREVIEW: usize = 10;

/// Header block: what was read, what was asked for, what came out.
pub fn format_run_summary(run: &RunOutput) -> String {
    let query = &run.query;
    let mut out = String::new();

    out.push_str(&format!("=== {} ===\n", run.labels.title));
    out.push_str(&format!(
        "Log: {} line(s), {} record(s) used\n",
        run.lines_read, run.records_used
    ));
    out.push_str(&format!(
        "Query: metric={} region={} mode={} window={} gaps={:?}\n",
        query.metric.slug(),
        query.region.code(),
        query.mode.slug(),
        query.window,
        query.gaps,
    ));
    if query.start.is_some() || query.end.is_some() {
        out.push_str(&format!(
            "Range: {} .. {}\n",
            query.start.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
            query.end.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
        ));
    }
    if let (Some(first), Some(last)) = (run.series.first(), run.series.last()) {
        out.push_str(&format!(
            "Points: n={} | {} .. {}\n",
            run.series.len(),
            first.date,
            last.date
        ));
    }
    out.push_str(&format!("Artifact: {}\n", run.artifact));

    if !run.diagnostics.is_empty() {
        out.push('\n');
        out.push_str(&format_diagnostics(&run.diagnostics));
    }

    out
}

/// List diagnostics, truncated after a handful.
pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut out = format!("Diagnostics ({}):\n", diagnostics.len());
    for diag in diagnostics.iter().take(DIAGNOSTIC_PREVIEW) {
        out.push_str(&format!("  {diag}\n"));
    }
    if diagnostics.len() > DIAGNOSTIC_PREVIEW {
        out.push_str(&format!(
            "  ... {} more\n",
            diagnostics.len() - DIAGNOSTIC_PREVIEW
        ));
    }
    out
}

/// Two-column `(date, value)` table.
pub fn format_series(points: &[SeriesPoint], query: &Query) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<12} {:>14}\n", "date", query.metric.slug()).trim_end());
    out.push('\n');
    out.push_str(format!("{:-<12} {:-<14}\n", "", "").trim_end());
    out.push('\n');

    for p in points {
        out.push_str(&format!("{:<12} {:>14}\n", p.date.format("%Y-%m-%d"), fmt_value(p.value, query)));
    }

    out
}

fn fmt_value(v: f64, query: &Query) -> String {
    match query.metric.kind() {
        MetricKind::Ratio { .. } => format!("{v:.4}"),
        _ if query.is_averaged() => format!("{v:.2}"),
        _ => format!("{v:.0}"),
    }
}

/// Print the store back in log form, one block per date.
///
/// With `region` set, only that region's lines are written.
pub fn format_store(store: &SeriesStore, region: Option<Region>) -> String {
    let regions: Vec<Region> = match region {
        Some(r) => vec![r],
        None => store.regions(),
    };

    let mut out = String::new();
    for date in store.distinct_dates() {
        let mut lines = Vec::new();
        for &r in &regions {
            for indicator in Indicator::ALL {
                let Some(value) = store.get(indicator, r, date) else {
                    continue;
                };
                let prefix = if r == Region::default() {
                    String::new()
                } else {
                    format!("{}\t", r.code())
                };
                lines.push(format!("{prefix}{}\t{value}", indicator.token()));
            }
        }
        if lines.is_empty() {
            continue;
        }

        out.push_str(ENTRY_MARKER);
        out.push('\n');
        out.push_str(&format!("{DATE_TOKEN}\t{date}\n"));
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}
