//! In-memory observation store.
//!
//! Holds what the parser found as `indicator -> region -> date -> raw value`.
//! Dates and values stay as the strings that appeared in the log; conversion
//! happens downstream so one bad token only costs one point.

use std::collections::{HashMap, HashSet};

use crate::domain::{Indicator, Region};

#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    observations: HashMap<Indicator, HashMap<Region, HashMap<String, String>>>,
    /// Every non-empty `date` token in encounter order (may repeat).
    dates: Vec<String>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observation. A later value for the same key replaces the earlier one.
    pub(crate) fn insert(&mut self, indicator: Indicator, region: Region, date: &str, value: String) {
        self.observations
            .entry(indicator)
            .or_default()
            .entry(region)
            .or_default()
            .insert(date.to_string(), value);
    }

    pub(crate) fn push_date(&mut self, date: &str) {
        self.dates.push(date.to_string());
    }

    /// Raw value for `(indicator, region, date)`, if one was recorded.
    pub fn get(&self, indicator: Indicator, region: Region, date: &str) -> Option<&str> {
        self.observations
            .get(&indicator)?
            .get(&region)?
            .get(date)
            .map(String::as_str)
    }

    pub fn contains(&self, indicator: Indicator, region: Region, date: &str) -> bool {
        self.get(indicator, region, date).is_some()
    }

    /// Date tokens as encountered, duplicates and disorder included.
    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    /// Date tokens in first-encounter order with repeats removed.
    pub fn distinct_dates(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.dates
            .iter()
            .map(String::as_str)
            .filter(|d| seen.insert(*d))
            .collect()
    }

    /// `(date, raw value)` pairs for one indicator in one region, in date
    /// encounter order, restricted to dates that have an observation.
    pub fn series(&self, indicator: Indicator, region: Region) -> Vec<(&str, &str)> {
        self.distinct_dates()
            .into_iter()
            .filter_map(|date| self.get(indicator, region, date).map(|value| (date, value)))
            .collect()
    }

    /// Regions that have at least one observation, in table order.
    pub fn regions(&self) -> Vec<Region> {
        Region::ALL
            .into_iter()
            .filter(|region| {
                self.observations
                    .values()
                    .any(|by_region| by_region.get(region).is_some_and(|m| !m.is_empty()))
            })
            .collect()
    }

    /// Number of stored observations across all indicators and regions.
    pub fn len(&self) -> usize {
        self.observations
            .values()
            .flat_map(HashMap::values)
            .map(HashMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
