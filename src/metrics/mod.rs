//! Metric calculation.
//!
//! Dispatches on the requested metric:
//!
//! - direct indicators go straight through the temporal transform
//! - ratios pair two indicators date by date (`ratio`)
//! - active cases combine three indicators (`active`)
//!
//! Calculators order their inputs by calendar date before differencing;
//! [`compute_sorted`] still applies the final date sort to the output.

use crate::domain::{Diagnostic, MetricKind, Query, SeriesPoint};
use crate::store::SeriesStore;
use crate::transform::transform_series;

pub mod active;
pub mod align;
pub mod ratio;

pub use active::active_series;
pub use align::sort_by_date;
pub use ratio::ratio_series;

/// Points produced for a query plus the per-record problems met on the way.
#[derive(Debug, Clone, Default)]
pub struct ComputedSeries {
    pub points: Vec<SeriesPoint>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compute the requested metric without the final sort stage.
pub fn compute(store: &SeriesStore, query: &Query) -> ComputedSeries {
    let mut diagnostics = Vec::new();
    let points = match query.metric.kind() {
        MetricKind::Direct(indicator) => {
            let rows = store.series(indicator, query.region);
            transform_series(&rows, query, &mut diagnostics)
        }
        MetricKind::Ratio {
            numerator,
            denominator,
        } => ratio_series(store, query, numerator, denominator, &mut diagnostics),
        MetricKind::Active { subtract_deaths } => active_series(store, query, subtract_deaths, &mut diagnostics),
    };
    ComputedSeries { points, diagnostics }
}

/// Compute the requested metric and sort it by date.
pub fn compute_sorted(store: &SeriesStore, query: &Query) -> ComputedSeries {
    let ComputedSeries { points, diagnostics } = compute(store, query);
    ComputedSeries {
        points: sort_by_date(points),
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Metric, Mode, Region};
    use crate::io::parser::parse_log;

    const LOG: &str = "\
Entry:
date\t03-01-2020
pos\t15
GP\tpos\t7
Entry:
date\t01-01-2020
pos\t10
GP\tpos\t3
Entry:
date\t02-01-2020
pos\t12
GP\tpos\t5
";

    #[test]
    fn direct_metric_is_scoped_to_region() {
        let store = parse_log(LOG).store;
        let query = Query::new(Metric::Pos, Region::Gp, Mode::Cumulative, 1).unwrap();
        let out = compute_sorted(&store, &query);
        let values: Vec<f64> = out.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![3.0, 5.0, 7.0]);
    }

    #[test]
    fn out_of_order_log_differences_by_calendar_date() {
        let store = parse_log(LOG).store;
        let cumulative = compute_sorted(&store, &Query::new(Metric::Pos, Region::Za, Mode::Cumulative, 1).unwrap());
        assert!(cumulative.points.windows(2).all(|w| w[0].date < w[1].date));

        let daily = compute_sorted(&store, &Query::new(Metric::Pos, Region::Za, Mode::Daily, 1).unwrap());
        let values: Vec<f64> = daily.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![2.0, 3.0]);

        let regional = compute(&store, &Query::new(Metric::Pos, Region::Gp, Mode::Daily, 1).unwrap());
        assert!(regional.points.iter().all(|p| p.value > 0.0));
    }

    #[test]
    fn unknown_region_yields_no_points() {
        let store = parse_log(LOG).store;
        let query = Query::new(Metric::Pos, Region::Kzn, Mode::Cumulative, 1).unwrap();
        assert!(compute_sorted(&store, &query).points.is_empty());
    }
}
