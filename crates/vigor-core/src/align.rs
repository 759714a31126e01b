//! Joining date-keyed series on common dates

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{EventSeries, ObservationSeries};

/// Which dates survive an alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignPolicy {
    /// Dates with a value in every series
    All,
    /// Dates with a value in at least one series
    Any,
}

/// A series that can say which dates carry a usable value.
pub trait DatedSeries {
    fn has_value(&self, date: NaiveDate) -> bool;

    /// Dates carrying a value, ascending.
    fn value_dates(&self) -> Vec<NaiveDate>;
}

impl DatedSeries for ObservationSeries {
    fn has_value(&self, date: NaiveDate) -> bool {
        self.get(date).is_some()
    }

    fn value_dates(&self) -> Vec<NaiveDate> {
        self.present().map(|(d, _)| d).collect()
    }
}

/// Zero magnitudes count as values for an event series.
impl DatedSeries for EventSeries {
    fn has_value(&self, date: NaiveDate) -> bool {
        self.get(date).is_some()
    }

    fn value_dates(&self) -> Vec<NaiveDate> {
        self.dates().collect()
    }
}

/// Dates kept under `policy`, sorted ascending.
pub fn align(series: &[&dyn DatedSeries], policy: AlignPolicy) -> Vec<NaiveDate> {
    let Some((first, rest)) = series.split_first() else {
        return Vec::new();
    };

    match policy {
        AlignPolicy::All => first
            .value_dates()
            .into_iter()
            .filter(|d| rest.iter().all(|s| s.has_value(*d)))
            .collect(),
        AlignPolicy::Any => series
            .iter()
            .flat_map(|s| s.value_dates())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
    }
}

/// Paired values of two series on the dates both carry a value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedPairs {
    pub dates: Vec<NaiveDate>,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl AlignedPairs {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Pair two observation series on their common present dates.
pub fn aligned_pairs(a: &ObservationSeries, b: &ObservationSeries) -> AlignedPairs {
    let dates = align(&[a as &dyn DatedSeries, b], AlignPolicy::All);
    let mut pairs = AlignedPairs::default();
    for date in dates {
        if let (Some(x), Some(y)) = (a.get(date), b.get(date)) {
            pairs.dates.push(date);
            pairs.xs.push(x);
            pairs.ys.push(y);
        }
    }
    pairs
}

/// Pair event magnitudes with observations on dates both were recorded.
pub fn aligned_event_pairs(events: &EventSeries, observation: &ObservationSeries) -> AlignedPairs {
    let dates = align(&[events as &dyn DatedSeries, observation], AlignPolicy::All);
    let mut pairs = AlignedPairs::default();
    for date in dates {
        if let (Some(x), Some(y)) = (events.get(date), observation.get(date)) {
            pairs.dates.push(date);
            pairs.xs.push(x);
            pairs.ys.push(y);
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(entries: &[(&str, Option<f64>)]) -> ObservationSeries {
        ObservationSeries::from_iso(entries.iter().copied()).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        crate::error::parse_date(s).unwrap()
    }

    #[test]
    fn test_align_all_drops_missing_and_null() {
        let mood = series(&[
            ("2024-01-03", Some(6.0)),
            ("2024-01-01", Some(5.0)),
            ("2024-01-02", Some(7.0)),
        ]);
        let sleep = series(&[
            ("2024-01-01", Some(8.0)),
            ("2024-01-02", None),
            ("2024-01-03", Some(4.0)),
        ]);
        let dates = align(&[&mood as &dyn DatedSeries, &sleep], AlignPolicy::All);
        assert_eq!(dates, vec![date("2024-01-01"), date("2024-01-03")]);
    }

    #[test]
    fn test_align_any_is_sorted_union() {
        let a = series(&[("2024-01-05", Some(1.0)), ("2024-01-02", None)]);
        let b = series(&[("2024-01-01", Some(2.0)), ("2024-01-05", Some(3.0))]);
        let dates = align(&[&a as &dyn DatedSeries, &b], AlignPolicy::Any);
        assert_eq!(dates, vec![date("2024-01-01"), date("2024-01-05")]);
    }

    #[test]
    fn test_align_empty_input() {
        assert!(align(&[], AlignPolicy::All).is_empty());
    }

    #[test]
    fn test_event_zero_counts_as_value() {
        let mut events = EventSeries::new();
        events.add(date("2024-01-01"), 0.0);
        events.add(date("2024-01-02"), 2.0);
        let symptom = series(&[
            ("2024-01-01", Some(3.0)),
            ("2024-01-02", Some(6.0)),
            ("2024-01-03", Some(1.0)),
        ]);
        let pairs = aligned_event_pairs(&events, &symptom);
        // 2024-01-03 has no event entry at all, so it is not a zero exposure
        assert_eq!(pairs.dates, vec![date("2024-01-01"), date("2024-01-02")]);
        assert_eq!(pairs.xs, vec![0.0, 2.0]);
        assert_eq!(pairs.ys, vec![3.0, 6.0]);
    }

    #[test]
    fn test_aligned_pairs() {
        let a = series(&[("2024-01-01", Some(1.0)), ("2024-01-02", Some(2.0))]);
        let b = series(&[("2024-01-02", Some(20.0)), ("2024-01-03", Some(30.0))]);
        let pairs = aligned_pairs(&a, &b);
        assert_eq!(pairs.len(), 1);
        assert_eq!((pairs.xs[0], pairs.ys[0]), (2.0, 20.0));
    }
}
