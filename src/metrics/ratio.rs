//! Ratio of two aligned indicator series (positivity, recovery ratio).

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{Diagnostic, Indicator, Mode, Query, SeriesPoint};
use crate::store::SeriesStore;
use crate::transform::{Delta, Differencer, clip, convert_count, convert_dates, report_gap, rolling_average};

/// `numerator / denominator` for the query's region.
///
/// Only dates present in both indicator maps are used. Numerator and
/// denominator are differenced with separate state, a point whose denominator
/// is zero is dropped, and the two sides are averaged independently before
/// dividing. Both sides are built from the same surviving dates, so they always
/// have the same length.
pub fn ratio_series(
    store: &SeriesStore,
    query: &Query,
    numerator: Indicator,
    denominator: Indicator,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<SeriesPoint> {
    let region = query.region;
    let rows: Vec<(&str, (&str, &str))> = store
        .distinct_dates()
        .into_iter()
        .filter_map(|date| {
            match (store.get(numerator, region, date), store.get(denominator, region, date)) {
                (Some(n), Some(d)) => Some((date, (n, d))),
                (None, None) => None,
                _ => {
                    debug!(date, "date missing from one side of the ratio");
                    None
                }
            }
        })
        .collect();

    let counted: Vec<(NaiveDate, (f64, f64))> = convert_dates(rows, diagnostics)
        .into_iter()
        .filter_map(|(date, (n, d))| {
            let n = convert_count(date, n, diagnostics)?;
            let d = convert_count(date, d, diagnostics)?;
            Some((date, (n as f64, d as f64)))
        })
        .collect();
    let clipped = clip(counted, query);

    let mut num_diff = Differencer::new(query.gaps);
    let mut den_diff = Differencer::new(query.gaps);
    let mut nums = Vec::with_capacity(clipped.len());
    let mut dens = Vec::with_capacity(clipped.len());

    for (date, (n, d)) in clipped {
        let (num, den) = match query.mode {
            Mode::Cumulative => (n, d),
            Mode::Daily => match (num_diff.delta(date, n), den_diff.delta(date, d)) {
                (Delta::Change(dn), Delta::Change(dd)) => (dn, dd),
                (num_delta, _) => {
                    if let Delta::Gap { days } = num_delta {
                        report_gap(diagnostics, date, days);
                    }
                    num_diff.advance(date, n);
                    den_diff.advance(date, d);
                    continue;
                }
            },
        };

        if den == 0.0 {
            debug!(%date, "zero denominator; ratio undefined");
            continue;
        }

        if query.mode == Mode::Daily {
            num_diff.advance(date, n);
            den_diff.advance(date, d);
        }
        nums.push((date, num));
        dens.push((date, den));
    }

    let nums = rolling_average(&nums, query.window);
    let dens = rolling_average(&dens, query.window);
    debug_assert_eq!(nums.len(), dens.len());

    nums.into_iter()
        .zip(dens)
        .filter(|(_, (_, den))| *den != 0.0)
        .map(|((date, num), (_, den))| SeriesPoint::new(date, num / den))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GapPolicy, Metric, Region};
    use crate::io::parser::parse_log;

    fn store(text: &str) -> SeriesStore {
        parse_log(text).store
    }

    fn positivity(mode: Mode, window: usize) -> Query {
        Query::new(Metric::Positivity, Region::Za, mode, window).unwrap()
    }

    #[test]
    fn cumulative_ratio() {
        let s = store("date\t01-01-2020\npos\t10\ntests\t100\ndate\t02-01-2020\npos\t15\ntests\t120\n");
        let mut diags = Vec::new();
        let out = ratio_series(&s, &positivity(Mode::Cumulative, 1), Indicator::Positive, Indicator::Tests, &mut diags);
        assert_eq!(out.len(), 2);
        assert!((out[0].value - 0.10).abs() < 1e-9);
        assert!((out[1].value - 0.125).abs() < 1e-9);
    }

    #[test]
    fn dates_missing_either_side_are_excluded() {
        let s = store(
            "date\t01-01-2020\npos\t10\ntests\t100\n\
             date\t02-01-2020\npos\t15\n\
             date\t03-01-2020\ntests\t300\n\
             date\t04-01-2020\npos\t20\ntests\t400\n",
        );
        let mut diags = Vec::new();
        let out = ratio_series(&s, &positivity(Mode::Cumulative, 1), Indicator::Positive, Indicator::Tests, &mut diags);
        let dates: Vec<u32> = out.iter().map(|p| chrono::Datelike::day(&p.date)).collect();
        assert_eq!(dates, vec![1, 4]);
        assert!(diags.is_empty());
    }

    #[test]
    fn daily_zero_denominator_is_dropped() {
        // tests do not change on 03-01, so the daily ratio is undefined there.
        let s = store(
            "date\t01-01-2020\npos\t10\ntests\t100\n\
             date\t02-01-2020\npos\t15\ntests\t150\n\
             date\t03-01-2020\npos\t16\ntests\t150\n\
             date\t04-01-2020\npos\t20\ntests\t200\n",
        );
        let mut diags = Vec::new();
        let out = ratio_series(&s, &positivity(Mode::Daily, 1), Indicator::Positive, Indicator::Tests, &mut diags);
        assert_eq!(out.len(), 2);
        assert!((out[0].value - 5.0 / 50.0).abs() < 1e-9);
        // Previous values stay at 02-01, so 04-01 spans both days: (20-15)/(200-150).
        assert!((out[1].value - 5.0 / 50.0).abs() < 1e-9);
    }

    #[test]
    fn zero_cumulative_denominator_is_dropped() {
        let s = store("date\t01-01-2020\npos\t0\ntests\t0\ndate\t02-01-2020\npos\t1\ntests\t10\n");
        let mut diags = Vec::new();
        let out = ratio_series(&s, &positivity(Mode::Cumulative, 1), Indicator::Positive, Indicator::Tests, &mut diags);
        assert_eq!(out.len(), 1);
        assert!((out[0].value - 0.1).abs() < 1e-9);
    }

    #[test]
    fn sides_are_averaged_before_dividing() {
        let s = store(
            "date\t01-01-2020\npos\t10\ntests\t100\n\
             date\t02-01-2020\npos\t30\ntests\t100\n",
        );
        let mut diags = Vec::new();
        let out = ratio_series(&s, &positivity(Mode::Cumulative, 5), Indicator::Positive, Indicator::Tests, &mut diags);
        assert_eq!(out.len(), 1);
        assert!((out[0].value - 20.0 / 100.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_order_dates_are_differenced_in_calendar_order() {
        let s = store(
            "date\t03-01-2020\npos\t26\ntests\t260\n\
             date\t01-01-2020\npos\t10\ntests\t100\n\
             date\t02-01-2020\npos\t20\ntests\t200\n",
        );
        let mut diags = Vec::new();
        let out = ratio_series(&s, &positivity(Mode::Daily, 1), Indicator::Positive, Indicator::Tests, &mut diags);
        let dates: Vec<u32> = out.iter().map(|p| chrono::Datelike::day(&p.date)).collect();
        assert_eq!(dates, vec![2, 3]);
        assert!((out[0].value - 10.0 / 100.0).abs() < 1e-9);
        assert!((out[1].value - 6.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn strict_gap_reseeds_both_sides() {
        let s = store(
            "date\t01-01-2020\npos\t10\ntests\t100\n\
             date\t03-01-2020\npos\t20\ntests\t200\n\
             date\t04-01-2020\npos\t26\ntests\t260\n",
        );
        let q = positivity(Mode::Daily, 1).with_gap_policy(GapPolicy::Strict);
        let mut diags = Vec::new();
        let out = ratio_series(&s, &q, Indicator::Positive, Indicator::Tests, &mut diags);
        assert_eq!(out.len(), 1);
        assert!((out[0].value - 0.1).abs() < 1e-9);
        assert_eq!(diags.len(), 1);
    }
}
