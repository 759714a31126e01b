//! Food-group exposure against symptom severity
//!
//! Every FODMAP group is correlated with every symptom score by Spearman
//! rank correlation. Only days with both a food log and a symptom entry
//! count; on such a day a group that was not eaten has exposure 0.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::align::aligned_event_pairs;
use crate::models::{
    CorrelationMethod, CorrelationResult, EventSeries, FodmapGroup, ObservationSeries, Symptom,
};
use crate::stats::correlate;

/// Servings of each FODMAP group per logged day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExposureTable {
    days: BTreeMap<NaiveDate, BTreeMap<FodmapGroup, f64>>,
}

impl ExposureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one food entry. Missing or zero servings count as one.
    ///
    /// An entry with no groups still marks the day as logged.
    pub fn record(&mut self, date: NaiveDate, groups: &[FodmapGroup], servings: Option<f64>) {
        let servings = servings.filter(|s| *s != 0.0).unwrap_or(1.0);
        let day = self.days.entry(date).or_default();
        for group in groups {
            *day.entry(*group).or_insert(0.0) += servings;
        }
    }

    /// Days with at least one food entry, ascending.
    pub fn logged_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Servings of `group` on every logged day, zero where it was not eaten.
    pub fn series(&self, group: FodmapGroup) -> EventSeries {
        let mut series = EventSeries::new();
        for (date, groups) in &self.days {
            series.add(*date, groups.get(&group).copied().unwrap_or(0.0));
        }
        series
    }
}

/// Spearman correlation of each group's exposure with each symptom.
///
/// Pairs with fewer than ten common dates are omitted. Sorted by |rho|,
/// strongest first.
pub fn exposure_symptom_correlations(
    exposure: &ExposureTable,
    symptoms: &BTreeMap<Symptom, ObservationSeries>,
) -> Vec<CorrelationResult> {
    let mut results = Vec::new();

    for group in FodmapGroup::ALL {
        let events = exposure.series(group);
        for (symptom, scores) in symptoms {
            let pairs = aligned_event_pairs(&events, scores);
            match correlate(
                group.key(),
                symptom.key(),
                &pairs.xs,
                &pairs.ys,
                CorrelationMethod::Spearman,
            ) {
                Ok(Some(result)) => results.push(result),
                _ => debug!(
                    group = group.key(),
                    symptom = symptom.key(),
                    n = pairs.len(),
                    "exposure pair below sample gate"
                ),
            }
        }
    }

    results.sort_by(|a, b| b.coefficient.abs().total_cmp(&a.coefficient.abs()));
    results
}
