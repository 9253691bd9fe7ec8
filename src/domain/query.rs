//! Validated query parameters.

use chrono::NaiveDate;

use crate::domain::{GapPolicy, Metric, Mode, Region, YScale};
use crate::error::{AppError, Result};

/// What the caller wants plotted.
///
/// Built by the CLI layer; the core calls [`Query::validate`] before reading
/// the log and refuses to repair a bad query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub metric: Metric,
    pub region: Region,
    pub mode: Mode,
    /// Rolling-average window size in points (1 = no averaging).
    pub window: usize,
    /// Inclusive lower date bound.
    pub start: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub end: Option<NaiveDate>,
    pub yscale: YScale,
    pub gaps: GapPolicy,
}

impl Query {
    pub fn new(metric: Metric, region: Region, mode: Mode, window: usize) -> Result<Self> {
        let query = Self {
            metric,
            region,
            mode,
            window,
            start: None,
            end: None,
            yscale: YScale::default(),
            gaps: GapPolicy::default(),
        };
        query.validate()?;
        Ok(query)
    }

    pub fn with_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        self.start = start;
        self.end = end;
        self.validate()?;
        Ok(self)
    }

    pub fn with_yscale(mut self, yscale: YScale) -> Self {
        self.yscale = yscale;
        self
    }

    pub fn with_gap_policy(mut self, gaps: GapPolicy) -> Self {
        self.gaps = gaps;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.window < 1 {
            return Err(AppError::InvalidQuery(format!(
                "rolling window must be at least 1 (got {})",
                self.window
            )));
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(AppError::InvalidQuery(format!(
                    "start date {start} is after end date {end}"
                )));
            }
        }
        Ok(())
    }

    /// Whether `date` falls inside the inclusive `[start, end]` bounds.
    pub fn in_range(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }

    pub fn is_averaged(&self) -> bool {
        self.window > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 4, d).unwrap()
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = Query::new(Metric::Pos, Region::Za, Mode::Daily, 0).unwrap_err();
        assert!(matches!(err, AppError::InvalidQuery(_)));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let query = Query::new(Metric::Pos, Region::Za, Mode::Daily, 1).unwrap();
        let err = query.with_range(Some(day(10)), Some(day(2))).unwrap_err();
        assert!(matches!(err, AppError::InvalidQuery(_)));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let query = Query::new(Metric::Tests, Region::Gp, Mode::Cumulative, 3)
            .unwrap()
            .with_range(Some(day(2)), Some(day(4)))
            .unwrap();
        assert!(!query.in_range(day(1)));
        assert!(query.in_range(day(2)));
        assert!(query.in_range(day(4)));
        assert!(!query.in_range(day(5)));
    }

    #[test]
    fn open_range_accepts_everything() {
        let query = Query::new(Metric::Tests, Region::Gp, Mode::Cumulative, 1).unwrap();
        assert!(query.in_range(day(1)));
        assert!(!query.is_averaged());
    }
}
