//! Active cases: confirmed minus recovered (and, by default, deaths).

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{Diagnostic, DiagnosticKind, Indicator, Mode, Query, SeriesPoint};
use crate::store::SeriesStore;
use crate::transform::{
    Delta, Differencer, LOG_DATE_FORMAT, clip, convert_count, convert_dates, report, report_gap, rolling_average,
};

/// Active-case series for the query's region.
///
/// A negative active count cannot happen in consistent data; such dates are
/// reported as anomalies and left out. The same holds in daily mode for a
/// negative day-over-day change. Daily differencing is seeded by the first
/// valid active value.
pub fn active_series(
    store: &SeriesStore,
    query: &Query,
    subtract_deaths: bool,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<SeriesPoint> {
    let region = query.region;
    let rows: Vec<(&str, [Option<&str>; 3])> = store
        .distinct_dates()
        .into_iter()
        .filter_map(|date| {
            let pos = store.get(Indicator::Positive, region, date);
            let recov = store.get(Indicator::Recovered, region, date);
            let deaths = if subtract_deaths {
                store.get(Indicator::Deaths, region, date)
            } else {
                Some("0")
            };
            let parts = [pos, recov, deaths];
            match parts.iter().filter(|p| p.is_some()).count() {
                3 => Some((date, parts)),
                0 => None,
                _ => {
                    debug!(date, "date missing an input for active cases");
                    None
                }
            }
        })
        .collect();

    let counted: Vec<(NaiveDate, (i64, i64, i64))> = convert_dates(rows, diagnostics)
        .into_iter()
        .filter_map(|(date, [pos, recov, deaths])| {
            let pos = convert_count(date, pos?, diagnostics)?;
            let recov = convert_count(date, recov?, diagnostics)?;
            let deaths = convert_count(date, deaths?, diagnostics)?;
            Some((date, (pos, recov, deaths)))
        })
        .collect();

    let mut active = Vec::with_capacity(counted.len());
    for (date, (pos, recov, deaths)) in clip(counted, query) {
        let Some(value) = recov.checked_add(deaths).and_then(|closed| pos.checked_sub(closed)) else {
            report(
                diagnostics,
                Diagnostic::at_date(
                    DiagnosticKind::ParseSkip,
                    date.format(LOG_DATE_FORMAT).to_string(),
                    format!("counts out of range: {pos} confirmed, {recov} recovered, {deaths} deaths"),
                ),
            );
            continue;
        };
        if value < 0 {
            report(
                diagnostics,
                Diagnostic::at_date(
                    DiagnosticKind::Anomaly,
                    date.format(LOG_DATE_FORMAT).to_string(),
                    format!("negative active cases: {pos} confirmed - {recov} recovered - {deaths} deaths = {value}"),
                ),
            );
            continue;
        }
        active.push((date, value as f64));
    }

    let values = match query.mode {
        Mode::Cumulative => active,
        Mode::Daily => daily_changes(active, query, diagnostics),
    };

    rolling_average(&values, query.window)
        .into_iter()
        .map(|(date, value)| SeriesPoint::new(date, value))
        .collect()
}

/// Day-over-day change of the active level. A negative change is an anomaly:
/// it is dropped and the differencer keeps its previous level.
fn daily_changes(
    levels: Vec<(NaiveDate, f64)>,
    query: &Query,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<(NaiveDate, f64)> {
    let mut diff = Differencer::new(query.gaps);
    let mut out = Vec::with_capacity(levels.len().saturating_sub(1));

    for (date, level) in levels {
        match diff.delta(date, level) {
            Delta::Seed => {}
            Delta::Gap { days } => report_gap(diagnostics, date, days),
            Delta::Change(delta) if delta < 0.0 => {
                report(
                    diagnostics,
                    Diagnostic::at_date(
                        DiagnosticKind::Anomaly,
                        date.format(LOG_DATE_FORMAT).to_string(),
                        format!("negative daily active cases: {delta}"),
                    ),
                );
                continue;
            }
            Delta::Change(delta) => out.push((date, delta)),
        }
        diff.advance(date, level);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Metric, Region};
    use crate::io::parser::parse_log;

    fn query(metric: Metric, mode: Mode) -> Query {
        Query::new(metric, Region::Za, mode, 1).unwrap()
    }

    #[test]
    fn subtracts_recoveries_and_deaths() {
        let store = parse_log("date\t01-01-2020\npos\t20\nrecov\t5\ndeaths\t3\n").store;
        let mut diags = Vec::new();
        let out = active_series(&store, &query(Metric::Active, Mode::Cumulative), true, &mut diags);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, 12.0);
    }

    #[test]
    fn excluding_deaths_variant_ignores_deaths() {
        let store = parse_log("date\t01-01-2020\npos\t20\nrecov\t5\n").store;
        let mut diags = Vec::new();
        let out = active_series(&store, &query(Metric::ActiveExclDeaths, Mode::Cumulative), false, &mut diags);
        assert_eq!(out[0].value, 15.0);

        // Without a deaths record the full variant has nothing to work with.
        let out = active_series(&store, &query(Metric::Active, Mode::Cumulative), true, &mut diags);
        assert!(out.is_empty());
    }

    #[test]
    fn negative_active_is_dropped_as_anomaly() {
        let store = parse_log(
            "date\t01-01-2020\npos\t20\nrecov\t15\ndeaths\t8\n\
             date\t02-01-2020\npos\t30\nrecov\t15\ndeaths\t8\n",
        )
        .store;
        let mut diags = Vec::new();
        let out = active_series(&store, &query(Metric::Active, Mode::Cumulative), true, &mut diags);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, 7.0);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::Anomaly);
        assert_eq!(diags[0].date.as_deref(), Some("01-01-2020"));
    }

    #[test]
    fn daily_drop_in_active_cases_is_an_anomaly() {
        let store = parse_log(
            "date\t01-01-2020\npos\t20\nrecov\t5\ndeaths\t3\n\
             date\t02-01-2020\npos\t22\nrecov\t15\ndeaths\t3\n\
             date\t03-01-2020\npos\t40\nrecov\t16\ndeaths\t4\n",
        )
        .store;
        let mut diags = Vec::new();
        let out = active_series(&store, &query(Metric::Active, Mode::Daily), true, &mut diags);
        // Levels 12, 4, 20: the fall to 4 is dropped and 03-01 differences against 12.
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, 8.0);
        assert!(out.iter().all(|p| p.value >= 0.0));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::Anomaly);
        assert_eq!(diags[0].date.as_deref(), Some("02-01-2020"));
    }

    #[test]
    fn oversized_counts_are_skipped_not_overflowed() {
        let store = parse_log(
            "date\t01-01-2020\npos\t5\nrecov\t9223372036854775807\ndeaths\t1\n\
             date\t02-01-2020\npos\t20\nrecov\t5\ndeaths\t3\n",
        )
        .store;
        let mut diags = Vec::new();
        let out = active_series(&store, &query(Metric::Active, Mode::Cumulative), true, &mut diags);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, 12.0);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::ParseSkip);
    }

    #[test]
    fn daily_is_seeded_by_first_valid_value() {
        let store = parse_log(
            "date\t01-01-2020\npos\t5\nrecov\t9\ndeaths\t0\n\
             date\t02-01-2020\npos\t20\nrecov\t5\ndeaths\t3\n\
             date\t03-01-2020\npos\t30\nrecov\t6\ndeaths\t4\n",
        )
        .store;
        let mut diags = Vec::new();
        let out = active_series(&store, &query(Metric::Active, Mode::Daily), true, &mut diags);
        // 01-01 is an anomaly, 02-01 (12) seeds, 03-01 emits 20 - 12.
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, 8.0);
    }
}
