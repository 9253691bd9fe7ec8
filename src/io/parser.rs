//! Tab-delimited log ingest.
//!
//! A log is a sequence of blocks like:
//!
//! ```text
//! Entry:
//! date	05-04-2020
//! tests	47964
//! pos	1655
//! GP	pos	  734
//! ```
//!
//! - an optional leading region code (`GP`, `WC`, ...) scopes the rest of the
//!   line to that region; otherwise the national region is used
//! - `Entry:` clears the current date
//! - `date` sets the current date for the indicator lines that follow
//! - indicator lines (`tests`, `pos`, `deaths`, `recov`) record a value for the
//!   current date, and are dropped when no date is active
//!
//! Parsing never fails: bad lines are skipped and reported as diagnostics.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::domain::{Diagnostic, DiagnosticKind, Indicator, Region};
use crate::error::{AppError, Result};
use crate::store::SeriesStore;

/// Marker that opens a new block and clears the current date.
pub const ENTRY_MARKER: &str = "Entry:";
pub const DATE_TOKEN: &str = "date";
const COMMENT_MARKER: char = '#';
const FIELD_SEPARATOR: char = '\t';

/// Parser output: the populated store plus what was skipped along the way.
#[derive(Debug, Clone)]
pub struct ParsedLog {
    pub store: SeriesStore,
    pub issues: Vec<Diagnostic>,
    pub lines_read: usize,
    /// Indicator lines that reached the store.
    pub records_used: usize,
}

/// Read and parse a log file.
///
/// Only I/O failures are errors; content problems end up in `issues`.
pub fn read_log(path: &Path) -> Result<ParsedLog> {
    let text = fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = parse_log(&text);
    debug!(
        path = %path.display(),
        lines = parsed.lines_read,
        records = parsed.records_used,
        skipped = parsed.issues.len(),
        "parsed log"
    );
    Ok(parsed)
}

/// Parse the full text of a log.
pub fn parse_log(text: &str) -> ParsedLog {
    let mut store = SeriesStore::new();
    let mut issues = Vec::new();
    let mut current_date: Option<String> = None;
    let mut lines_read = 0usize;
    let mut records_used = 0usize;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        lines_read += 1;

        if raw_line.trim().is_empty() || raw_line.trim_start().starts_with(COMMENT_MARKER) {
            continue;
        }

        let fields: Vec<&str> = raw_line.split(FIELD_SEPARATOR).collect();
        let (region, fields) = match Region::from_token(fields[0]) {
            Some(region) => (region, &fields[1..]),
            None => (Region::default(), &fields[..]),
        };

        let Some(key) = fields.first().map(|f| f.trim()) else {
            skip(&mut issues, line_no, format!("region prefix `{}` without a field", region.code()));
            continue;
        };

        if key == ENTRY_MARKER {
            current_date = None;
            continue;
        }

        if key == DATE_TOKEN {
            let value = fields.get(1).map(|f| f.trim()).unwrap_or("");
            if value.is_empty() {
                skip(&mut issues, line_no, "`date` line without a value");
                current_date = None;
            } else {
                store.push_date(value);
                current_date = Some(value.to_string());
            }
            continue;
        }

        let Some(indicator) = Indicator::from_token(key) else {
            // Unknown first fields are reserved for future record types.
            continue;
        };

        let Some(date) = current_date.as_deref() else {
            debug!(line = line_no, indicator = indicator.token(), "indicator line outside a dated block");
            continue;
        };

        let value = strip_whitespace(fields.get(1).copied().unwrap_or(""));
        if value.is_empty() {
            skip(&mut issues, line_no, format!("`{}` line without a value", indicator.token()));
            continue;
        }

        store.insert(indicator, region, date, value);
        records_used += 1;
    }

    ParsedLog {
        store,
        issues,
        lines_read,
        records_used,
    }
}

/// Remove every whitespace character, including spaces used as digit grouping.
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn skip(issues: &mut Vec<Diagnostic>, line: usize, message: impl Into<String>) {
    let diag = Diagnostic::at_line(DiagnosticKind::ParseSkip, line, message);
    warn!("{diag}");
    issues.push(diag);
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# daily report
Entry:
date\t01-04-2020
tests\t 1 000
pos\t10
deaths\t1
recov\t2
GP\tpos\t4
WC\tdeaths\t0

Entry:
date\t02-04-2020
pos\t15
GP\tpos\t6
";

    #[test]
    fn parses_blocks_and_region_prefixes() {
        let parsed = parse_log(SAMPLE);
        let store = &parsed.store;

        assert_eq!(store.get(Indicator::Tests, Region::Za, "01-04-2020"), Some("1000"));
        assert_eq!(store.get(Indicator::Positive, Region::Za, "02-04-2020"), Some("15"));
        assert_eq!(store.get(Indicator::Positive, Region::Gp, "01-04-2020"), Some("4"));
        assert_eq!(store.get(Indicator::Positive, Region::Gp, "02-04-2020"), Some("6"));
        assert_eq!(store.get(Indicator::Deaths, Region::Wc, "01-04-2020"), Some("0"));
        assert_eq!(store.dates(), ["01-04-2020", "02-04-2020"]);
        assert_eq!(parsed.records_used, 8);
        assert!(parsed.issues.is_empty());
    }

    #[test]
    fn entry_marker_clears_the_date() {
        let text = "date\t01-04-2020\npos\t10\nEntry:\npos\t99\n";
        let parsed = parse_log(text);
        assert_eq!(parsed.store.get(Indicator::Positive, Region::Za, "01-04-2020"), Some("10"));
        assert_eq!(parsed.records_used, 1);
    }

    #[test]
    fn region_prefixed_entry_marker_also_clears() {
        let text = "date\t01-04-2020\nGP\tEntry:\nGP\tpos\t3\n";
        let parsed = parse_log(text);
        assert!(parsed.store.is_empty());
    }

    #[test]
    fn indicator_without_date_is_dropped_silently() {
        let parsed = parse_log("pos\t10\ntests\t200\n");
        assert!(parsed.store.is_empty());
        assert!(parsed.issues.is_empty());
    }

    #[test]
    fn malformed_lines_are_reported_not_fatal() {
        let text = "date\t01-04-2020\npos\ntests\t\ndate\nGP\nfuture_field\t7\ndeaths\t3\n";
        let parsed = parse_log(text);
        // `date` with no value clears the context, so `deaths` is dropped too.
        assert!(parsed.store.is_empty());
        assert_eq!(parsed.issues.len(), 4);
        assert!(parsed.issues.iter().all(|d| d.kind == DiagnosticKind::ParseSkip));
        assert_eq!(parsed.issues[0].line, Some(2));
    }

    #[test]
    fn duplicate_dates_are_kept_in_sequence_and_values_overwrite() {
        let text = "date\t01-04-2020\npos\t10\ndate\t01-04-2020\npos\t11\n";
        let parsed = parse_log(text);
        assert_eq!(parsed.store.dates().len(), 2);
        assert_eq!(parsed.store.get(Indicator::Positive, Region::Za, "01-04-2020"), Some("11"));
    }

    #[test]
    fn read_log_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_log(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }

    #[test]
    fn read_log_parses_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("covid19_tests.txt");
        std::fs::write(&path, SAMPLE).unwrap();
        let parsed = read_log(&path).unwrap();
        assert_eq!(parsed.lines_read, SAMPLE.lines().count());
        assert_eq!(parsed.store.regions(), vec![Region::Za, Region::Gp, Region::Wc]);
    }
}
