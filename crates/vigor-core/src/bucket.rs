//! Event / no-event bucket comparison
//!
//! Splits the days a signal was logged into "event happened" and "event did
//! not happen" and compares the two means. A date missing from the event
//! series counts as "did not happen": habit logs only record completions, so
//! a day the user never opened the habit screen lands in the negative bucket.

use tracing::debug;

use crate::align::{align, AlignPolicy, DatedSeries};
use crate::models::{
    mean, BucketComparison, CheckinLog, EventSeries, HabitImpact, HabitLog, ObservationSeries,
    Scale, SecondaryComparison, Signal, StrengthTier,
};
use crate::stats::round_to;

/// Smallest bucket for a reported comparison
pub const MIN_BUCKET: usize = 2;

/// Smallest bucket before a comparison is worth a headline
pub const MIN_HEADLINE_BUCKET: usize = 3;

/// Mean difference (1-10 scale) above which an effect is strong
pub const STRONG_DIFF: f64 = 1.5;

/// Mean difference (1-10 scale) above which an effect is moderate
pub const MODERATE_DIFF: f64 = 0.8;

/// Compares a signal's mean on event days against non-event days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketComparator {
    scale: Scale,
    min_bucket: usize,
}

impl Default for BucketComparator {
    fn default() -> Self {
        Self::new(Scale::RATING)
    }
}

impl BucketComparator {
    pub fn new(scale: Scale) -> Self {
        Self {
            scale,
            min_bucket: MIN_BUCKET,
        }
    }

    pub fn for_signal(signal: Signal) -> Self {
        Self::new(signal.scale())
    }

    /// Raise (or lower) the per-bucket minimum. Never below one.
    pub fn with_min_bucket(mut self, min_bucket: usize) -> Self {
        self.min_bucket = min_bucket.max(1);
        self
    }

    pub fn min_bucket(&self) -> usize {
        self.min_bucket
    }

    /// Compare `observation` on days `event` occurred against the rest.
    ///
    /// `None` when either bucket is smaller than the minimum.
    pub fn compare(
        &self,
        label: &str,
        observation: &ObservationSeries,
        event: &EventSeries,
    ) -> Option<BucketComparison> {
        let universe = align(&[observation as &dyn DatedSeries], AlignPolicy::Any);
        let (with, without): (Vec<_>, Vec<_>) =
            universe.into_iter().partition(|d| event.occurred(*d));

        if !self.buckets_large_enough(label, with.len(), without.len()) {
            return None;
        }

        let mean_with = mean(with.iter().filter_map(|d| observation.get(*d)))?;
        let mean_without = mean(without.iter().filter_map(|d| observation.get(*d)))?;
        let difference = mean_with - mean_without;

        Some(BucketComparison {
            entity_label: label.to_string(),
            mean_with_event: round_to(mean_with, 2),
            mean_without_event: round_to(mean_without, 2),
            difference: round_to(difference, 2),
            strength_tier: self.tier(difference.abs()),
            n_with: with.len(),
            n_without: without.len(),
            secondary: None,
        })
    }

    /// Compare a primary and a secondary signal on one shared partition.
    ///
    /// Only dates where both signals are present take part. The tier uses
    /// the larger of the two absolute differences.
    pub fn compare_with_secondary(
        &self,
        label: &str,
        primary: &ObservationSeries,
        secondary: &ObservationSeries,
        event: &EventSeries,
    ) -> Option<BucketComparison> {
        let universe = align(&[primary as &dyn DatedSeries, secondary], AlignPolicy::All);
        let (with, without): (Vec<_>, Vec<_>) =
            universe.into_iter().partition(|d| event.occurred(*d));

        if !self.buckets_large_enough(label, with.len(), without.len()) {
            return None;
        }

        let bucket_mean = |series: &ObservationSeries, dates: &[chrono::NaiveDate]| {
            mean(dates.iter().filter_map(|d| series.get(*d)))
        };

        let primary_with = bucket_mean(primary, &with)?;
        let primary_without = bucket_mean(primary, &without)?;
        let secondary_with = bucket_mean(secondary, &with)?;
        let secondary_without = bucket_mean(secondary, &without)?;

        let primary_diff = primary_with - primary_without;
        let secondary_diff = secondary_with - secondary_without;

        Some(BucketComparison {
            entity_label: label.to_string(),
            mean_with_event: round_to(primary_with, 2),
            mean_without_event: round_to(primary_without, 2),
            difference: round_to(primary_diff, 2),
            strength_tier: self.tier(primary_diff.abs().max(secondary_diff.abs())),
            n_with: with.len(),
            n_without: without.len(),
            secondary: Some(SecondaryComparison {
                mean_with_event: round_to(secondary_with, 2),
                mean_without_event: round_to(secondary_without, 2),
                difference: round_to(secondary_diff, 2),
            }),
        })
    }

    /// Tier for an absolute mean difference on this comparator's scale.
    pub fn tier(&self, abs_diff: f64) -> StrengthTier {
        if abs_diff > self.scale.rescale_threshold(STRONG_DIFF) {
            StrengthTier::Strong
        } else if abs_diff > self.scale.rescale_threshold(MODERATE_DIFF) {
            StrengthTier::Moderate
        } else {
            StrengthTier::Weak
        }
    }

    fn buckets_large_enough(&self, label: &str, n_with: usize, n_without: usize) -> bool {
        if n_with < self.min_bucket || n_without < self.min_bucket {
            debug!(
                label,
                n_with,
                n_without,
                min_bucket = self.min_bucket,
                "bucket below minimum, skipping comparison"
            );
            return false;
        }
        true
    }
}

/// Mood and energy lift for every habit over the check-ins given.
///
/// Only check-in days with both mood and energy take part. Habits without
/// enough days in either bucket are left out. Sorted by mood lift, largest
/// first; ties keep habit order.
pub fn habit_impacts(checkins: &CheckinLog, habits: &HabitLog) -> Vec<HabitImpact> {
    let mood = checkins.series(Signal::Mood);
    let energy = checkins.series(Signal::Energy);
    let total_days = align(&[&mood as &dyn DatedSeries, &energy], AlignPolicy::All).len();
    if total_days == 0 {
        return Vec::new();
    }

    let comparator = BucketComparator::for_signal(Signal::Mood);
    let mut impacts: Vec<HabitImpact> = habits
        .habits()
        .iter()
        .filter_map(|habit| {
            let events = habits.events(habit.id);
            let comparison =
                comparator.compare_with_secondary(&habit.name, &mood, &energy, &events)?;
            let energy_cmp = comparison.secondary?;
            Some(HabitImpact {
                habit_name: habit.name.clone(),
                pillar: habit.pillar,
                mood_with: comparison.mean_with_event,
                mood_without: comparison.mean_without_event,
                mood_diff: comparison.difference,
                energy_with: energy_cmp.mean_with_event,
                energy_without: energy_cmp.mean_without_event,
                energy_diff: energy_cmp.difference,
                times_done: comparison.n_with,
                total_days,
                strength: comparison.strength_tier,
            })
        })
        .collect();

    impacts.sort_by(|a, b| b.mood_diff.total_cmp(&a.mood_diff));
    debug!(
        habits = habits.habits().len(),
        impacts = impacts.len(),
        total_days,
        "computed habit impacts"
    );
    impacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CheckinDay, Habit, Symptom};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn observations(values: &[(u32, f64)]) -> ObservationSeries {
        ObservationSeries::from_entries(values.iter().map(|(d, v)| (day(*d), Some(*v)))).unwrap()
    }

    #[test]
    fn test_compare_reference_example() {
        let obs = observations(&[(1, 8.0), (2, 8.0), (3, 2.0), (4, 2.0)]);
        let event = EventSeries::from_dates([day(1), day(2)]);

        let result = BucketComparator::default()
            .compare("walk", &obs, &event)
            .unwrap();
        assert_eq!(result.mean_with_event, 8.0);
        assert_eq!(result.mean_without_event, 2.0);
        assert_eq!(result.difference, 6.0);
        assert_eq!(result.strength_tier, StrengthTier::Strong);
        assert_eq!((result.n_with, result.n_without), (2, 2));
        assert!(result.secondary.is_none());
    }

    #[test]
    fn test_compare_small_bucket_is_none() {
        let obs = observations(&[(1, 8.0), (2, 8.0), (3, 2.0)]);
        let comparator = BucketComparator::default();

        // One day without the event
        let event = EventSeries::from_dates([day(1), day(2)]);
        assert!(comparator.compare("walk", &obs, &event).is_none());

        // No day with the event
        assert!(comparator.compare("walk", &obs, &EventSeries::new()).is_none());
    }

    #[test]
    fn test_zero_magnitude_is_not_an_occurrence() {
        let obs = observations(&[(1, 6.0), (2, 6.0), (3, 4.0), (4, 4.0)]);
        let mut event = EventSeries::from_dates([day(1), day(2)]);
        event.add(day(3), 0.0);

        let result = BucketComparator::default()
            .compare("lactose", &obs, &event)
            .unwrap();
        assert_eq!(result.n_without, 2);
        assert_eq!(result.difference, 2.0);
    }

    #[test]
    fn test_headline_minimum() {
        let obs = observations(&[(1, 8.0), (2, 8.0), (3, 2.0), (4, 2.0)]);
        let event = EventSeries::from_dates([day(1), day(2)]);
        let strict = BucketComparator::default().with_min_bucket(MIN_HEADLINE_BUCKET);
        assert!(strict.compare("walk", &obs, &event).is_none());
    }

    #[test]
    fn test_tier_rescaled_for_graded_symptom() {
        let graded = BucketComparator::for_signal(Signal::Symptom(Symptom::Diarrhea));
        // 0.6 on a 0-3 scale is above 1.5 * 3 / 9
        assert_eq!(graded.tier(0.6), StrengthTier::Strong);
        assert_eq!(BucketComparator::default().tier(0.6), StrengthTier::Weak);
        assert_eq!(BucketComparator::default().tier(1.0), StrengthTier::Moderate);
    }

    #[test]
    fn test_secondary_drives_tier() {
        let mood = observations(&[(1, 6.0), (2, 6.0), (3, 5.5), (4, 5.5)]);
        let energy = observations(&[(1, 8.0), (2, 8.0), (3, 4.0), (4, 4.0)]);
        let event = EventSeries::from_dates([day(1), day(2)]);

        let result = BucketComparator::default()
            .compare_with_secondary("run", &mood, &energy, &event)
            .unwrap();
        assert_eq!(result.difference, 0.5);
        assert_eq!(result.secondary.as_ref().unwrap().difference, 4.0);
        assert_eq!(result.strength_tier, StrengthTier::Strong);
    }

    #[test]
    fn test_habit_impacts_sorted_by_mood_lift() {
        let days: Vec<CheckinDay> = (1..=6)
            .map(|d| {
                let mut c = CheckinDay::new(day(d));
                c.mood = Some(if d <= 3 { 8.0 } else { 5.0 });
                c.energy = Some(6.0);
                c
            })
            .collect();
        let checkins = CheckinLog::from_days(days).unwrap();

        let mut habits = HabitLog::new(vec![
            Habit {
                id: 1,
                name: "Scroll".to_string(),
                pillar: None,
            },
            Habit {
                id: 2,
                name: "Meditate".to_string(),
                pillar: None,
            },
            Habit {
                id: 3,
                name: "Never".to_string(),
                pillar: None,
            },
        ]);
        for d in [4, 5] {
            habits.record_completion(1, day(d)).unwrap();
        }
        for d in [1, 2, 3] {
            habits.record_completion(2, day(d)).unwrap();
        }

        let impacts = habit_impacts(&checkins, &habits);
        assert_eq!(impacts.len(), 2);
        assert_eq!(impacts[0].habit_name, "Meditate");
        assert_eq!(impacts[0].mood_diff, 3.0);
        assert_eq!(impacts[0].times_done, 3);
        assert_eq!(impacts[0].total_days, 6);
        assert_eq!(impacts[0].strength, StrengthTier::Strong);
        assert_eq!(impacts[1].habit_name, "Scroll");
        assert!(impacts[1].mood_diff < 0.0);
    }
}
