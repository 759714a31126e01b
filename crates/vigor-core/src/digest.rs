//! Weekly digest: this week against last week

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::bucket::{BucketComparator, MIN_HEADLINE_BUCKET};
use crate::models::{
    BucketComparison, CheckinLog, DigestResult, HabitLog, Pillar, Polarity, Signal, Trend,
    WindowAverages,
};
use crate::policy::InsightPolicy;

/// Week-over-week mean change (1-10 scale) that counts as a trend
pub const TREND_THRESHOLD: f64 = 0.5;

/// Top-habit lift needed before it can headline the digest
const HEADLINE_MIN_LIFT: f64 = 0.3;

const DEFAULT_HEADLINE: &str = "Keep logging daily to unlock personalized insights.";
const DEFAULT_RECOMMENDATION: &str = "Try to check in every day this week for the best analysis.";
const GENERIC_RECOMMENDATION: &str =
    "Try completing at least 3 habits daily this week and see how it affects your mood.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyDigestBuilder {
    trend_threshold: f64,
}

impl Default for WeeklyDigestBuilder {
    fn default() -> Self {
        Self {
            trend_threshold: TREND_THRESHOLD,
        }
    }
}

impl WeeklyDigestBuilder {
    pub fn new(trend_threshold: f64) -> Self {
        Self { trend_threshold }
    }

    pub fn from_policy(policy: &InsightPolicy) -> Self {
        Self::new(policy.trend_threshold)
    }

    /// Classify the change between two window means of `signal`.
    ///
    /// The threshold is rescaled to the signal's range, and a fall counts as
    /// an improvement for lower-is-better signals.
    pub fn trend(&self, signal: Signal, current: Option<f64>, previous: Option<f64>) -> Trend {
        let (Some(current), Some(previous)) = (current, previous) else {
            return Trend::Stable;
        };
        let threshold = signal.scale().rescale_threshold(self.trend_threshold);
        let diff = match signal.polarity() {
            Polarity::HigherIsBetter => current - previous,
            Polarity::LowerIsBetter => previous - current,
        };
        if diff >= threshold {
            Trend::Improving
        } else if diff <= -threshold {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }

    /// Digest for the week ending on `today` (inclusive).
    pub fn build(
        &self,
        checkins: &CheckinLog,
        habits: &HabitLog,
        today: NaiveDate,
    ) -> DigestResult {
        let this_start = today - Duration::days(6);
        let this_week = checkins.between(this_start, today);
        let last_week = checkins.between(today - Duration::days(13), today - Duration::days(7));

        let averages: Vec<WindowAverages> = Signal::checkin_signals()
            .into_iter()
            .map(|signal| {
                let current = this_week.mean(signal);
                let previous = last_week.mean(signal);
                WindowAverages {
                    signal,
                    current,
                    previous,
                    trend: self.trend(signal, current, previous),
                }
            })
            .collect();

        if this_week.is_empty() {
            debug!(%today, "no check-ins this week, returning default digest");
            return DigestResult {
                averages,
                mood_trend: Trend::Stable,
                energy_trend: Trend::Stable,
                strongest_pillar: None,
                weakest_pillar: None,
                top_habit: None,
                headline: DEFAULT_HEADLINE.to_string(),
                recommendation: DEFAULT_RECOMMENDATION.to_string(),
            };
        }

        let pillar_means: Vec<(Pillar, f64)> = Pillar::ALL
            .into_iter()
            .filter_map(|p| this_week.mean(Signal::Pillar(p)).map(|m| (p, m)))
            .collect();
        let strongest = pillar_means
            .iter()
            .copied()
            .reduce(|best, next| if next.1 > best.1 { next } else { best });
        let weakest = pillar_means
            .iter()
            .copied()
            .reduce(|worst, next| if next.1 < worst.1 { next } else { worst });

        let best_habit = top_habit(&this_week, &habits.between(this_start, today));
        let top_habit_name = best_habit
            .as_ref()
            .filter(|c| c.difference > 0.0)
            .map(|c| c.entity_label.clone());

        let signal_average = |signal: Signal| averages.iter().find(|a| a.signal == signal);
        let mood = signal_average(Signal::Mood);
        let mood_trend = mood.map_or(Trend::Stable, |a| a.trend);
        let energy_trend = signal_average(Signal::Energy).map_or(Trend::Stable, |a| a.trend);

        let headline = match (mood_trend, mood.and_then(|a| a.current.zip(a.previous))) {
            (Trend::Improving, Some((current, previous))) => format!(
                "Your mood is trending upward this week ({current:.1} avg vs {previous:.1} last week). Keep doing what's working!"
            ),
            (Trend::Declining, Some((current, previous))) => format!(
                "Your mood dipped this week ({current:.1} avg vs {previous:.1} last week). Small resets help; consider a restorative activity today."
            ),
            _ => match best_habit.as_ref().filter(|c| is_headline_worthy(c)) {
                Some(habit) => format!(
                    "\"{}\" was your top mood booster this week (+{:.1} mood points on days completed).",
                    habit.entity_label, habit.difference
                ),
                None => {
                    let n = this_week.len();
                    let plural = if n == 1 { "" } else { "s" };
                    format!(
                        "You logged {n} check-in{plural} this week. Consistency is your superpower!"
                    )
                }
            },
        };

        let recommendation = match (weakest, &top_habit_name) {
            (Some((pillar, avg)), _) => format!(
                "Focus on {} this week (avg {avg:.1}/10). {}",
                pillar.display_name(),
                pillar.quick_tip()
            ),
            (None, Some(name)) => {
                format!("Double down on \"{name}\"; it's clearly lifting your mood.")
            }
            (None, None) => GENERIC_RECOMMENDATION.to_string(),
        };

        DigestResult {
            averages,
            mood_trend,
            energy_trend,
            strongest_pillar: strongest.map(|(p, _)| p),
            weakest_pillar: weakest.map(|(p, _)| p),
            top_habit: top_habit_name,
            headline,
            recommendation,
        }
    }
}

/// Digest with the default trend threshold.
pub fn digest(checkins: &CheckinLog, habits: &HabitLog, today: NaiveDate) -> DigestResult {
    WeeklyDigestBuilder::default().build(checkins, habits, today)
}

/// The habit with the largest mood lift; the first one wins ties.
fn top_habit(checkins: &CheckinLog, habits: &HabitLog) -> Option<BucketComparison> {
    let mood = checkins.series(Signal::Mood);
    let comparator = BucketComparator::for_signal(Signal::Mood);
    habits
        .habits()
        .iter()
        .filter_map(|h| comparator.compare(&h.name, &mood, &habits.events(h.id)))
        .reduce(|best, next| if next.difference > best.difference { next } else { best })
}

fn is_headline_worthy(comparison: &BucketComparison) -> bool {
    comparison.difference > HEADLINE_MIN_LIFT
        && comparison.n_with >= MIN_HEADLINE_BUCKET
        && comparison.n_without >= MIN_HEADLINE_BUCKET
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CheckinDay, Habit, Symptom};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 15).unwrap()
    }

    fn mood_log(mood_for: impl Fn(i64) -> f64) -> CheckinLog {
        let days = (0..14).map(|back| {
            let mut c = CheckinDay::new(today() - Duration::days(back));
            c.mood = Some(mood_for(back));
            c
        });
        CheckinLog::from_days(days).unwrap()
    }

    #[test]
    fn test_flat_mood_is_stable() {
        let result = digest(&mood_log(|_| 5.0), &HabitLog::default(), today());
        assert_eq!(result.mood_trend, Trend::Stable);
        assert_eq!(
            result.headline,
            "You logged 7 check-ins this week. Consistency is your superpower!"
        );
        assert_eq!(result.recommendation, GENERIC_RECOMMENDATION);
    }

    #[test]
    fn test_rising_mood_is_improving() {
        let log = mood_log(|back| if back <= 6 { 7.0 } else { 4.0 });
        let result = digest(&log, &HabitLog::default(), today());
        assert_eq!(result.mood_trend, Trend::Improving);
        assert_eq!(result.energy_trend, Trend::Stable);
        assert_eq!(
            result.headline,
            "Your mood is trending upward this week (7.0 avg vs 4.0 last week). Keep doing what's working!"
        );
        let mood = &result.averages[0];
        assert_eq!((mood.current, mood.previous), (Some(7.0), Some(4.0)));
    }

    #[test]
    fn test_falling_mood_is_declining() {
        let log = mood_log(|back| if back <= 6 { 4.0 } else { 6.0 });
        assert_eq!(digest(&log, &HabitLog::default(), today()).mood_trend, Trend::Declining);
    }

    #[test]
    fn test_missing_last_week_is_stable() {
        let builder = WeeklyDigestBuilder::default();
        assert_eq!(builder.trend(Signal::Mood, Some(9.0), None), Trend::Stable);
        assert_eq!(builder.trend(Signal::Mood, Some(5.5), Some(5.0)), Trend::Improving);
        assert_eq!(builder.trend(Signal::Mood, Some(5.0), Some(5.49)), Trend::Stable);
    }

    #[test]
    fn test_symptom_drop_is_improving() {
        let builder = WeeklyDigestBuilder::default();
        let bloating = Signal::Symptom(Symptom::Bloating);
        assert_eq!(builder.trend(bloating, Some(3.0), Some(6.0)), Trend::Improving);
        assert_eq!(builder.trend(bloating, Some(6.0), Some(3.0)), Trend::Declining);

        // 0-3 graded symptoms use a threshold scaled to their range
        let diarrhea = Signal::Symptom(Symptom::Diarrhea);
        assert_eq!(builder.trend(diarrhea, Some(1.0), Some(1.3)), Trend::Improving);
        assert_eq!(builder.trend(diarrhea, Some(1.0), Some(1.1)), Trend::Stable);
    }

    #[test]
    fn test_empty_week_returns_default_digest() {
        let old = CheckinLog::from_days([CheckinDay::new(today() - Duration::days(20))]).unwrap();
        let result = digest(&old, &HabitLog::default(), today());
        assert_eq!(result.headline, DEFAULT_HEADLINE);
        assert_eq!(result.recommendation, DEFAULT_RECOMMENDATION);
        assert!(result.weakest_pillar.is_none());
    }

    #[test]
    fn test_weakest_pillar_recommendation() {
        let days = (0..3).map(|back| {
            let mut c = CheckinDay::new(today() - Duration::days(back));
            c.set_rating(Pillar::Sleep, Some(3.0));
            c.set_rating(Pillar::Nutrition, Some(8.0));
            c
        });
        let log = CheckinLog::from_days(days).unwrap();
        let result = digest(&log, &HabitLog::default(), today());
        assert_eq!(result.strongest_pillar, Some(Pillar::Nutrition));
        assert_eq!(result.weakest_pillar, Some(Pillar::Sleep));
        assert_eq!(
            result.recommendation,
            format!("Focus on Sleep this week (avg 3.0/10). {}", Pillar::Sleep.quick_tip())
        );
    }

    #[test]
    fn test_top_habit_headline() {
        let log = mood_log(|back| if back % 2 == 0 { 8.0 } else { 6.0 });
        let mut habits = HabitLog::new(vec![Habit {
            id: 1,
            name: "Morning walk".to_string(),
            pillar: Some(Pillar::PhysicalActivity),
        }]);
        for back in [0, 2, 4, 6] {
            habits
                .record_completion(1, today() - Duration::days(back))
                .unwrap();
        }

        let result = digest(&log, &habits, today());
        // This week: 8, 6, 8, 6, 8, 6, 8; last week: 6, 8, 6, 8, 6, 8, 6
        assert_eq!(result.mood_trend, Trend::Stable);
        assert_eq!(result.top_habit.as_deref(), Some("Morning walk"));
        assert_eq!(
            result.headline,
            "\"Morning walk\" was your top mood booster this week (+2.0 mood points on days completed)."
        );
        assert_eq!(
            result.recommendation,
            "Double down on \"Morning walk\"; it's clearly lifting your mood."
        );
    }
}
