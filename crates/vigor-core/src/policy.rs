//! Tunable thresholds and insight ranking weights
//!
//! The weights only order heterogeneous insights against each other. They
//! are not derived from a model; changing them changes which insights a
//! user sees first.

use serde::{Deserialize, Serialize};

use crate::matrix::MatrixOptions;

/// Score of the "top 3 mood boosters" insight
pub const TOP_BOOSTERS_SCORE: f64 = 9.0;
/// Score of the "biggest mood booster(s)" insight
pub const BOOSTER_SCORE: f64 = 8.0;
/// Per-habit lift: score = mood diff x weight
pub const HABIT_LIFT_WEIGHT: f64 = 4.0;
/// Pillar pair: score = |r| x weight
pub const PILLAR_PAIR_WEIGHT: f64 = 6.0;
/// Score of the strongest-weekday insight
pub const STRONGEST_DAY_SCORE: f64 = 5.0;
/// Weekend gap: score = |gap| x weight
pub const WEEKEND_GAP_WEIGHT: f64 = 3.0;
/// Half-split trend: score = |delta| x weight
pub const HALF_TREND_WEIGHT: f64 = 3.0;
/// Streak lift: score = diff x weight
pub const STREAK_WEIGHT: f64 = 3.5;

/// Thresholds for the insight and digest pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightPolicy {
    /// Insights returned per run
    pub top_k: usize,
    /// Minimum aligned dates for a pillar pair
    pub matrix_min_n: usize,
    /// Pillar pairs at or below this |r| are dropped
    pub matrix_min_abs_r: f64,
    /// Week-over-week change counted as a trend
    pub trend_threshold: f64,
    /// Look-back for habit impacts
    pub habit_window_days: i64,
    /// Look-back for pattern insights
    pub pattern_window_days: i64,
}

impl Default for InsightPolicy {
    fn default() -> Self {
        Self {
            top_k: 8,
            matrix_min_n: 5,
            matrix_min_abs_r: 0.3,
            trend_threshold: 0.5,
            habit_window_days: 90,
            pattern_window_days: 60,
        }
    }
}

impl InsightPolicy {
    pub fn matrix_options(&self) -> MatrixOptions {
        MatrixOptions {
            min_n: self.matrix_min_n,
            min_abs_r: self.matrix_min_abs_r,
        }
    }
}
