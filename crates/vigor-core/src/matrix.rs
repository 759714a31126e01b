//! Pairwise correlation matrix over labeled series

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::align::aligned_pairs;
use crate::models::{
    CheckinLog, CorrelationMethod, CorrelationResult, ObservationSeries, Pillar, Signal,
};
use crate::stats::significance::MIN_SIGNIFICANCE_N;
use crate::stats::{correlate, pearson, round_to};

/// Filters applied to every pair in a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatrixOptions {
    /// Minimum aligned dates for a pair
    pub min_n: usize,
    /// Pairs at or below this |r| are dropped
    pub min_abs_r: f64,
}

impl Default for MatrixOptions {
    fn default() -> Self {
        Self {
            min_n: 5,
            min_abs_r: 0.3,
        }
    }
}

impl MatrixOptions {
    fn keeps(&self, r: f64) -> bool {
        r.abs() > self.min_abs_r && round_to(r, 2).abs() >= self.min_abs_r
    }
}

/// Pearson coefficient (2 dp) for every unordered pair passing the filters.
///
/// Keys hold the smaller label first.
pub fn build_matrix<L>(
    series_by_label: &BTreeMap<L, ObservationSeries>,
    options: &MatrixOptions,
) -> BTreeMap<(L, L), f64>
where
    L: Ord + Clone + fmt::Debug,
{
    let entries: Vec<(&L, &ObservationSeries)> = series_by_label.iter().collect();
    let mut matrix = BTreeMap::new();

    for (i, (label_a, series_a)) in entries.iter().enumerate() {
        for (label_b, series_b) in &entries[i + 1..] {
            let pairs = aligned_pairs(series_a, series_b);
            if pairs.len() < options.min_n {
                debug!(?label_a, ?label_b, n = pairs.len(), "pair below min_n");
                continue;
            }

            let r = pearson(&pairs.xs, &pairs.ys);
            if options.keeps(r) {
                matrix.insert(((*label_a).clone(), (*label_b).clone()), round_to(r, 2));
            }
        }
    }

    matrix
}

/// Correlations between the six pillar ratings.
///
/// Empty when there are fewer check-ins than `options.min_n`.
pub fn pillar_matrix(
    checkins: &CheckinLog,
    options: &MatrixOptions,
) -> BTreeMap<(Pillar, Pillar), f64> {
    if checkins.len() < options.min_n {
        return BTreeMap::new();
    }
    build_matrix(&pillar_series(checkins), options)
}

/// The matrix pairs as full results with p-values, strongest first.
///
/// Only pairs with at least `max(min_n, 10)` aligned dates are reported.
pub fn correlation_results<L>(
    series_by_label: &BTreeMap<L, ObservationSeries>,
    options: &MatrixOptions,
) -> Vec<CorrelationResult>
where
    L: Ord + fmt::Display,
{
    let min_n = options.min_n.max(MIN_SIGNIFICANCE_N);
    let entries: Vec<(&L, &ObservationSeries)> = series_by_label.iter().collect();
    let mut results = Vec::new();

    for (i, (label_a, series_a)) in entries.iter().enumerate() {
        for (label_b, series_b) in &entries[i + 1..] {
            let pairs = aligned_pairs(series_a, series_b);
            if pairs.len() < min_n {
                continue;
            }
            let Ok(Some(result)) = correlate(
                &label_a.to_string(),
                &label_b.to_string(),
                &pairs.xs,
                &pairs.ys,
                CorrelationMethod::Pearson,
            ) else {
                continue;
            };
            if options.keeps(result.coefficient) {
                results.push(result);
            }
        }
    }

    results.sort_by(|a, b| b.coefficient.abs().total_cmp(&a.coefficient.abs()));
    results
}

/// One rating series per pillar, keyed in pillar order.
pub fn pillar_series(checkins: &CheckinLog) -> BTreeMap<Pillar, ObservationSeries> {
    Pillar::ALL
        .into_iter()
        .map(|p| (p, checkins.series(Signal::Pillar(p))))
        .collect()
}
