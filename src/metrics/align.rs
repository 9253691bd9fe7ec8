//! Final ordering of a computed series.

use crate::domain::SeriesPoint;

/// Sort points by date, ascending.
///
/// Region-interleaved or out-of-order logs mean the calculators do not emit in
/// calendar order. The sort is stable.
pub fn sort_by_date(mut points: Vec<SeriesPoint>) -> Vec<SeriesPoint> {
    points.sort_by_key(|p| p.date);
    points
}
