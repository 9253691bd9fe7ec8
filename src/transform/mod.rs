//! Temporal transforms applied to a single series.
//!
//! Stages, in order:
//!
//! 1. date conversion (bad tokens are dropped and reported), then a calendar sort
//! 2. range clipping to the query's inclusive bounds
//! 3. differencing when the query asks for daily values
//! 4. rolling average over the query's window
//!
//! Every stage keeps dates paired with their values, so nothing downstream has
//! to re-align arrays.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::warn;

use crate::domain::{Diagnostic, DiagnosticKind, GapPolicy, Mode, Query, SeriesPoint};

pub mod rolling;

pub use rolling::{RollingWindow, rolling_average};

/// Date format used by the log (`DD-MM-YYYY`).
pub const LOG_DATE_FORMAT: &str = "%d-%m-%Y";

pub fn parse_log_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), LOG_DATE_FORMAT).ok()
}

/// Parse an integer count, ignoring any whitespace inside the token.
pub fn parse_count(raw: &str) -> Option<i64> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    cleaned.parse::<i64>().ok()
}

/// Stage 1: convert date tokens and order rows by calendar date.
///
/// Rows whose token does not parse are dropped. Two tokens naming the same
/// calendar day (`1-04-2020` and `01-04-2020`) keep only the first row.
/// The result is sorted, so differencing and rolling windows never see log
/// order.
pub fn convert_dates<T>(rows: Vec<(&str, T)>, diagnostics: &mut Vec<Diagnostic>) -> Vec<(NaiveDate, T)> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(rows.len());

    for (token, payload) in rows {
        let Some(date) = parse_log_date(token) else {
            report(
                diagnostics,
                Diagnostic::at_date(DiagnosticKind::ParseSkip, token, "unparseable date (expected DD-MM-YYYY)"),
            );
            continue;
        };
        if !seen.insert(date) {
            report(
                diagnostics,
                Diagnostic::at_date(DiagnosticKind::ParseSkip, token, "repeats an earlier calendar date"),
            );
            continue;
        }
        out.push((date, payload));
    }

    out.sort_by_key(|(date, _)| *date);
    out
}

/// Convert one raw count, reporting the row when it is not an integer.
pub fn convert_count(date: NaiveDate, raw: &str, diagnostics: &mut Vec<Diagnostic>) -> Option<i64> {
    let value = parse_count(raw);
    if value.is_none() {
        report(
            diagnostics,
            Diagnostic::at_date(
                DiagnosticKind::ParseSkip,
                date.format(LOG_DATE_FORMAT).to_string(),
                format!("non-integer value `{raw}`"),
            ),
        );
    }
    value
}

/// Stage 2: keep rows inside the query's inclusive date bounds.
pub fn clip<T>(rows: Vec<(NaiveDate, T)>, query: &Query) -> Vec<(NaiveDate, T)> {
    rows.into_iter().filter(|(date, _)| query.in_range(*date)).collect()
}

/// Outcome of differencing one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delta {
    /// No previous value yet; the point only seeds the differencer.
    Seed,
    /// Strict policy and the point is not the day after the previous one.
    Gap { days: i64 },
    Change(f64),
}

/// Day-over-day differencing state.
///
/// The previous value is whatever was last passed to [`Differencer::advance`],
/// so callers that drop a point simply do not advance.
#[derive(Debug, Clone)]
pub struct Differencer {
    policy: GapPolicy,
    prev: Option<(NaiveDate, f64)>,
}

impl Differencer {
    pub fn new(policy: GapPolicy) -> Self {
        Self { policy, prev: None }
    }

    /// Delta of `value` against the previous point. Does not change state.
    pub fn delta(&self, date: NaiveDate, value: f64) -> Delta {
        let Some((prev_date, prev_value)) = self.prev else {
            return Delta::Seed;
        };
        let days = (date - prev_date).num_days();
        match self.policy {
            GapPolicy::Strict if days != 1 => Delta::Gap { days },
            _ => Delta::Change(value - prev_value),
        }
    }

    pub fn advance(&mut self, date: NaiveDate, value: f64) {
        self.prev = Some((date, value));
    }
}

/// Stage 3 for a plain series: daily deltas, first point consumed as the seed.
pub fn difference(
    points: Vec<(NaiveDate, f64)>,
    policy: GapPolicy,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<(NaiveDate, f64)> {
    let mut diff = Differencer::new(policy);
    let mut out = Vec::with_capacity(points.len().saturating_sub(1));

    for (date, value) in points {
        match diff.delta(date, value) {
            Delta::Seed => {}
            Delta::Gap { days } => report_gap(diagnostics, date, days),
            Delta::Change(delta) => out.push((date, delta)),
        }
        diff.advance(date, value);
    }

    out
}

pub(crate) fn report_gap(diagnostics: &mut Vec<Diagnostic>, date: NaiveDate, days: i64) {
    report(
        diagnostics,
        Diagnostic::at_date(
            DiagnosticKind::GapReseed,
            date.format(LOG_DATE_FORMAT).to_string(),
            format!("{days} day(s) after the previous record; differencing restarted"),
        ),
    );
}

pub(crate) fn report(diagnostics: &mut Vec<Diagnostic>, diag: Diagnostic) {
    warn!("{diag}");
    diagnostics.push(diag);
}

/// Run the full transform over one indicator's `(date token, raw value)` pairs.
///
/// Output is in input order; sorting is the caller's job.
pub fn transform_series(rows: &[(&str, &str)], query: &Query, diagnostics: &mut Vec<Diagnostic>) -> Vec<SeriesPoint> {
    let dated = convert_dates(rows.to_vec(), diagnostics);
    let counted: Vec<(NaiveDate, f64)> = dated
        .into_iter()
        .filter_map(|(date, raw)| convert_count(date, raw, diagnostics).map(|v| (date, v as f64)))
        .collect();
    let clipped = clip(counted, query);

    let values = match query.mode {
        Mode::Cumulative => clipped,
        Mode::Daily => difference(clipped, query.gaps, diagnostics),
    };

    rolling_average(&values, query.window)
        .into_iter()
        .map(|(date, value)| SeriesPoint::new(date, value))
        .collect()
}
