//! Pattern insight generation
//!
//! Turns habit impacts, pillar correlations and calendar patterns into short
//! natural-language insights. Each candidate gets an importance score from
//! the weights in [`crate::policy`]; the generator deduplicates by text and
//! keeps the top `policy.top_k` by score.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bucket::habit_impacts;
use crate::matrix::pillar_matrix;
use crate::models::{mean, CheckinLog, HabitImpact, HabitLog, Insight, Pillar, Signal};
use crate::policy::{
    InsightPolicy, BOOSTER_SCORE, HABIT_LIFT_WEIGHT, HALF_TREND_WEIGHT, PILLAR_PAIR_WEIGHT,
    STREAK_WEIGHT, STRONGEST_DAY_SCORE, TOP_BOOSTERS_SCORE, WEEKEND_GAP_WEIGHT,
};

/// Fewer check-ins than this yields no insights
pub const MIN_INSIGHT_CHECKINS: usize = 3;

/// Mood lift for a habit to count as a booster
const BOOSTER_MIN_DIFF: f64 = 0.3;
/// Mood lift for a per-habit insight
const HABIT_LIFT_MIN_DIFF: f64 = 0.5;
/// Habit impacts considered for per-habit insights
const HABIT_LIFT_CANDIDATES: usize = 5;
/// Stop adding pillar pairs once this many candidates exist
const PILLAR_CANDIDATE_CAP: usize = 12;
/// |r| a matrix entry needs before it is worth an insight
const PAIR_INSIGHT_MIN_R: f64 = 0.3;
/// |r| above which a pair is "strongly" correlated
const STRONG_PAIR_R: f64 = 0.7;
const MIN_WEEKDAY_SAMPLES: usize = 2;
const MIN_WEEKDAY_VALUES: usize = 3;
const MIN_WEEKEND_VALUES: usize = 2;
const WEEKEND_GAP_MIN: f64 = 1.0;
const MIN_HALF_SPLIT_CHECKINS: usize = 14;
const MIN_HALF_VALUES: usize = 3;
const HALF_TREND_MIN: f64 = 1.0;
const MIN_STREAK_COMPLETIONS: usize = 5;
const MIN_STREAK_RUN: usize = 3;
const MIN_STREAK_MOODS: usize = 3;
const MIN_ISOLATED_MOODS: usize = 2;
const STREAK_MIN_DIFF: f64 = 0.5;

/// Mean mood on one day of the week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayMood {
    pub weekday: Weekday,
    pub mean: f64,
    pub samples: usize,
}

/// A pillar's mean rating on weekdays vs weekends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekendSplit {
    pub pillar: Pillar,
    pub weekday_mean: f64,
    pub weekend_mean: f64,
}

impl WeekendSplit {
    pub fn gap(&self) -> f64 {
        self.weekend_mean - self.weekday_mean
    }
}

/// A pillar's mean rating over the earlier and later half of the check-ins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HalfTrend {
    pub pillar: Pillar,
    pub first_mean: f64,
    pub second_mean: f64,
}

impl HalfTrend {
    pub fn delta(&self) -> f64 {
        self.second_mean - self.first_mean
    }
}

/// Mood on days inside a completion streak vs one-off completion days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakLift {
    pub habit_name: String,
    pub streak_mean: f64,
    pub isolated_mean: f64,
}

impl StreakLift {
    pub fn diff(&self) -> f64 {
        self.streak_mean - self.isolated_mean
    }
}

/// Everything the generator scores. Partial or sparse inputs are fine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsightInputs {
    pub checkin_count: usize,
    /// Sorted by mood lift, largest first
    pub habit_impacts: Vec<HabitImpact>,
    pub pillar_matrix: BTreeMap<(Pillar, Pillar), f64>,
    /// Monday first, days without mood omitted
    pub weekday_moods: Vec<WeekdayMood>,
    pub weekend_splits: Vec<WeekendSplit>,
    pub half_trends: Vec<HalfTrend>,
    pub streak_lifts: Vec<StreakLift>,
}

impl InsightInputs {
    /// Derive every input from check-ins and habit completions over one window.
    pub fn from_logs(checkins: &CheckinLog, habits: &HabitLog, policy: &InsightPolicy) -> Self {
        Self {
            checkin_count: checkins.len(),
            habit_impacts: habit_impacts(checkins, habits),
            pillar_matrix: pillar_matrix(checkins, &policy.matrix_options()),
            weekday_moods: weekday_moods(checkins),
            weekend_splits: weekend_splits(checkins),
            half_trends: half_trends(checkins),
            streak_lifts: streak_lifts(checkins, habits),
        }
    }
}

/// Insights over the `policy.pattern_window_days` ending on `today`.
pub fn pattern_insights(
    checkins: &CheckinLog,
    habits: &HabitLog,
    today: NaiveDate,
    policy: &InsightPolicy,
) -> Vec<Insight> {
    let start = today - Duration::days(policy.pattern_window_days);
    let inputs = InsightInputs::from_logs(
        &checkins.between(start, today),
        &habits.between(start, today),
        policy,
    );
    generate(&inputs, policy)
}

/// Score, deduplicate and rank insight candidates.
pub fn generate(inputs: &InsightInputs, policy: &InsightPolicy) -> Vec<Insight> {
    if inputs.checkin_count < MIN_INSIGHT_CHECKINS {
        debug!(checkins = inputs.checkin_count, "not enough check-ins for insights");
        return Vec::new();
    }

    let mut candidates = Vec::new();
    booster_insights(&inputs.habit_impacts, &mut candidates);
    pillar_pair_insights(&inputs.pillar_matrix, &mut candidates);
    strongest_day_insight(&inputs.weekday_moods, &mut candidates);
    weekend_insights(&inputs.weekend_splits, &mut candidates);
    trend_insights(&inputs.half_trends, &mut candidates);
    streak_insights(&inputs.streak_lifts, &mut candidates);

    let total = candidates.len();
    let mut seen = HashSet::new();
    let mut insights: Vec<Insight> = candidates
        .into_iter()
        .filter(|insight| seen.insert(insight.text.clone()))
        .collect();
    insights.sort_by(|a, b| b.importance_score.total_cmp(&a.importance_score));
    insights.truncate(policy.top_k);

    debug!(candidates = total, kept = insights.len(), "generated insights");
    insights
}

fn push(candidates: &mut Vec<Insight>, importance_score: f64, text: String) {
    candidates.push(Insight {
        text,
        importance_score,
    });
}

fn booster_insights(impacts: &[HabitImpact], candidates: &mut Vec<Insight>) {
    let boosters: Vec<&HabitImpact> = impacts
        .iter()
        .filter(|h| h.mood_diff > BOOSTER_MIN_DIFF)
        .collect();

    match boosters.len() {
        0 => {}
        1 | 2 => {
            let names = join_names(&boosters);
            let plural = if boosters.len() > 1 { "s" } else { "" };
            push(
                candidates,
                BOOSTER_SCORE,
                format!("Your biggest mood booster{plural}: {names}"),
            );
        }
        _ => {
            let names = join_names(&boosters[..3]);
            push(
                candidates,
                TOP_BOOSTERS_SCORE,
                format!("Your top 3 mood boosters: {names}"),
            );
        }
    }

    for impact in impacts.iter().take(HABIT_LIFT_CANDIDATES) {
        if impact.mood_diff > HABIT_LIFT_MIN_DIFF {
            push(
                candidates,
                impact.mood_diff * HABIT_LIFT_WEIGHT,
                format!(
                    "Your mood is {:.1} points higher on days you complete \"{}\"",
                    impact.mood_diff, impact.habit_name
                ),
            );
        }
    }
}

fn join_names(impacts: &[&HabitImpact]) -> String {
    impacts
        .iter()
        .map(|h| h.habit_name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn pillar_pair_insights(matrix: &BTreeMap<(Pillar, Pillar), f64>, candidates: &mut Vec<Insight>) {
    let mut pairs: Vec<(&(Pillar, Pillar), &f64)> = matrix.iter().collect();
    pairs.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));

    for ((a, b), &r) in pairs {
        let name_a = a.display_name();
        let name_b = b.display_name();
        if r > PAIR_INSIGHT_MIN_R {
            let strength = if r.abs() > STRONG_PAIR_R {
                "strongly"
            } else {
                "moderately"
            };
            push(
                candidates,
                r.abs() * PILLAR_PAIR_WEIGHT,
                format!(
                    "{name_a} and {name_b} are {strength} correlated (r={r:.2}): better {} = more {}",
                    name_a.to_lowercase(),
                    name_b.to_lowercase()
                ),
            );
        } else if r < -PAIR_INSIGHT_MIN_R {
            push(
                candidates,
                r.abs() * PILLAR_PAIR_WEIGHT,
                format!("{name_a} and {name_b} show an inverse correlation (r={r:.2})"),
            );
        }
        if candidates.len() > PILLAR_CANDIDATE_CAP {
            break;
        }
    }
}

fn strongest_day_insight(weekday_moods: &[WeekdayMood], candidates: &mut Vec<Insight>) {
    let Some(best) = weekday_moods
        .iter()
        .reduce(|best, day| if day.mean > best.mean { day } else { best })
    else {
        return;
    };
    if best.samples >= MIN_WEEKDAY_SAMPLES {
        push(
            candidates,
            STRONGEST_DAY_SCORE,
            format!(
                "Your strongest day is {} (avg mood: {:.1})",
                day_name(best.weekday),
                best.mean
            ),
        );
    }
}

fn weekend_insights(splits: &[WeekendSplit], candidates: &mut Vec<Insight>) {
    for split in splits {
        let gap = split.gap();
        let name = split.pillar.display_name();
        if gap < -WEEKEND_GAP_MIN {
            push(
                candidates,
                gap.abs() * WEEKEND_GAP_WEIGHT,
                format!(
                    "Weekends show lower {name} ratings ({:.1} vs {:.1} on weekdays); consider a weekend {} routine",
                    split.weekend_mean,
                    split.weekday_mean,
                    name.to_lowercase()
                ),
            );
        } else if gap > WEEKEND_GAP_MIN {
            push(
                candidates,
                gap.abs() * WEEKEND_GAP_WEIGHT,
                format!(
                    "Your {name} ratings are higher on weekends ({:.1} vs {:.1} on weekdays); try bringing that weekend energy into your work week",
                    split.weekend_mean, split.weekday_mean
                ),
            );
        }
    }
}

fn trend_insights(trends: &[HalfTrend], candidates: &mut Vec<Insight>) {
    for trend in trends {
        let delta = trend.delta();
        let name = trend.pillar.display_name();
        if delta >= HALF_TREND_MIN {
            push(
                candidates,
                delta * HALF_TREND_WEIGHT,
                format!(
                    "You've been trending upward in {name}: up {delta:.1} points over the last month"
                ),
            );
        } else if delta <= -HALF_TREND_MIN {
            push(
                candidates,
                delta.abs() * HALF_TREND_WEIGHT,
                format!(
                    "{name} has been trending downward: down {:.1} points recently. What changed?",
                    delta.abs()
                ),
            );
        }
    }
}

fn streak_insights(lifts: &[StreakLift], candidates: &mut Vec<Insight>) {
    for lift in lifts {
        let diff = lift.diff();
        if diff > STREAK_MIN_DIFF {
            push(
                candidates,
                diff * STREAK_WEIGHT,
                format!(
                    "When you do \"{}\" for 3+ days in a row, your mood averages {:.1} vs {:.1} on one-off days. Streaks matter!",
                    lift.habit_name, lift.streak_mean, lift.isolated_mean
                ),
            );
        }
    }
}

// =============================================================================
// Input derivation
// =============================================================================

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Mean mood per day of the week, Monday first.
pub fn weekday_moods(checkins: &CheckinLog) -> Vec<WeekdayMood> {
    let mut by_day: BTreeMap<u32, (Weekday, Vec<f64>)> = BTreeMap::new();
    for (date, mood) in checkins.series(Signal::Mood).present() {
        let weekday = date.weekday();
        by_day
            .entry(weekday.num_days_from_monday())
            .or_insert_with(|| (weekday, Vec::new()))
            .1
            .push(mood);
    }

    by_day
        .into_values()
        .filter_map(|(weekday, moods)| {
            Some(WeekdayMood {
                weekday,
                samples: moods.len(),
                mean: mean(moods)?,
            })
        })
        .collect()
}

/// Weekday vs weekend means for pillars with enough ratings on both sides.
pub fn weekend_splits(checkins: &CheckinLog) -> Vec<WeekendSplit> {
    Pillar::ALL
        .into_iter()
        .filter_map(|pillar| {
            let (weekend, weekday): (Vec<_>, Vec<_>) = checkins
                .series(Signal::Pillar(pillar))
                .present()
                .partition(|(date, _)| is_weekend(*date));
            if weekday.len() < MIN_WEEKDAY_VALUES || weekend.len() < MIN_WEEKEND_VALUES {
                return None;
            }
            Some(WeekendSplit {
                pillar,
                weekday_mean: mean(weekday.into_iter().map(|(_, v)| v))?,
                weekend_mean: mean(weekend.into_iter().map(|(_, v)| v))?,
            })
        })
        .collect()
}

/// First-half vs second-half means per pillar.
///
/// The check-ins are split by row count, so each half covers the same number
/// of check-ins regardless of gaps in the calendar.
pub fn half_trends(checkins: &CheckinLog) -> Vec<HalfTrend> {
    if checkins.len() < MIN_HALF_SPLIT_CHECKINS {
        return Vec::new();
    }
    let days: Vec<_> = checkins.days().collect();
    let (first, second) = days.split_at(days.len() / 2);

    Pillar::ALL
        .into_iter()
        .filter_map(|pillar| {
            let first_values: Vec<f64> = first.iter().filter_map(|c| c.rating(pillar)).collect();
            let second_values: Vec<f64> = second.iter().filter_map(|c| c.rating(pillar)).collect();
            if first_values.len() < MIN_HALF_VALUES || second_values.len() < MIN_HALF_VALUES {
                return None;
            }
            Some(HalfTrend {
                pillar,
                first_mean: mean(first_values)?,
                second_mean: mean(second_values)?,
            })
        })
        .collect()
}

/// Streak vs one-off mood for habits with enough completions.
pub fn streak_lifts(checkins: &CheckinLog, habits: &HabitLog) -> Vec<StreakLift> {
    habits
        .habits()
        .iter()
        .filter_map(|habit| {
            let completed = habits.completions(habit.id);
            if completed.len() < MIN_STREAK_COMPLETIONS {
                return None;
            }

            let streak_dates = streak_dates(&completed);
            if streak_dates.is_empty() {
                return None;
            }

            let mood_on = |date: &NaiveDate| checkins.get(*date).and_then(|c| c.mood);
            let streak_moods: Vec<f64> = streak_dates.iter().filter_map(mood_on).collect();
            let isolated_moods: Vec<f64> = completed
                .iter()
                .filter(|d| !streak_dates.contains(*d))
                .filter_map(mood_on)
                .collect();

            if streak_moods.len() < MIN_STREAK_MOODS || isolated_moods.len() < MIN_ISOLATED_MOODS {
                return None;
            }
            Some(StreakLift {
                habit_name: habit.name.clone(),
                streak_mean: mean(streak_moods)?,
                isolated_mean: mean(isolated_moods)?,
            })
        })
        .collect()
}

/// Dates belonging to runs of at least [`MIN_STREAK_RUN`] consecutive days.
fn streak_dates(sorted: &[NaiveDate]) -> BTreeSet<NaiveDate> {
    let mut streaks = BTreeSet::new();
    let mut run: Vec<NaiveDate> = Vec::new();

    for &date in sorted {
        let extends = run
            .last()
            .is_some_and(|prev| date - *prev == Duration::days(1));
        if !extends {
            if run.len() >= MIN_STREAK_RUN {
                streaks.extend(run.iter().copied());
            }
            run.clear();
        }
        run.push(date);
    }
    if run.len() >= MIN_STREAK_RUN {
        streaks.extend(run);
    }
    streaks
}
