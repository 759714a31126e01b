//! Data models for the correlation and insight engine
//!
//! Everything here is built per request from rows the storage layer has
//! already fetched, and thrown away once the results are rendered.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::{VigorError, VigorResult};

// =============================================================================
// Signals
// =============================================================================

/// Value range of a logged signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub min: f64,
    pub max: f64,
}

impl Scale {
    /// 1-10 self-rating (mood, energy, pillars)
    pub const RATING: Scale = Scale { min: 1.0, max: 10.0 };
    /// 0-10 symptom severity
    pub const SEVERITY: Scale = Scale { min: 0.0, max: 10.0 };
    /// 0-3 graded symptom (none, mild, moderate, severe)
    pub const GRADED: Scale = Scale { min: 0.0, max: 3.0 };

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Restate a threshold calibrated on the 1-10 rating scale for this scale.
    pub fn rescale_threshold(&self, threshold: f64) -> f64 {
        threshold * self.span() / Scale::RATING.span()
    }
}

/// Which direction of change counts as an improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

/// The six lifestyle-medicine pillars rated at each check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    Nutrition,
    PhysicalActivity,
    Sleep,
    StressManagement,
    SocialConnection,
    SubstanceAvoidance,
}

impl Pillar {
    pub const ALL: [Pillar; 6] = [
        Pillar::Nutrition,
        Pillar::PhysicalActivity,
        Pillar::Sleep,
        Pillar::StressManagement,
        Pillar::SocialConnection,
        Pillar::SubstanceAvoidance,
    ];

    /// Stable numeric id used by the storage layer (1-6)
    pub fn id(self) -> u8 {
        match self {
            Pillar::Nutrition => 1,
            Pillar::PhysicalActivity => 2,
            Pillar::Sleep => 3,
            Pillar::StressManagement => 4,
            Pillar::SocialConnection => 5,
            Pillar::SubstanceAvoidance => 6,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Pillar::Nutrition => "Nutrition",
            Pillar::PhysicalActivity => "Physical Activity",
            Pillar::Sleep => "Sleep",
            Pillar::StressManagement => "Stress Management",
            Pillar::SocialConnection => "Social Connection",
            Pillar::SubstanceAvoidance => "Substance Avoidance",
        }
    }

    pub fn quick_tip(self) -> &'static str {
        match self {
            Pillar::Nutrition => "Try adding one extra serving of vegetables to your meals today.",
            Pillar::PhysicalActivity => "A 10-minute walk counts. Start small and build up.",
            Pillar::Sleep => "Set a consistent bedtime and avoid screens 30 minutes before sleep.",
            Pillar::StressManagement => {
                "Try 3 deep breaths right now. Inhale for 4 counts, hold for 4, exhale for 6."
            }
            Pillar::SocialConnection => {
                "Reach out to someone you care about today, even just a quick message."
            }
            Pillar::SubstanceAvoidance => {
                "If you drink alcohol, try replacing one drink this week with sparkling water."
            }
        }
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// GI symptoms scored in the symptom diary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symptom {
    Bloating,
    AbdominalPain,
    Gas,
    Diarrhea,
    Constipation,
    Nausea,
    Fatigue,
    /// Mean of the individual scores, normalized to 0-10
    OverallScore,
}

impl Symptom {
    pub const ALL: [Symptom; 8] = [
        Symptom::Bloating,
        Symptom::AbdominalPain,
        Symptom::Gas,
        Symptom::Diarrhea,
        Symptom::Constipation,
        Symptom::Nausea,
        Symptom::Fatigue,
        Symptom::OverallScore,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Symptom::Bloating => "bloating",
            Symptom::AbdominalPain => "abdominal_pain",
            Symptom::Gas => "gas",
            Symptom::Diarrhea => "diarrhea",
            Symptom::Constipation => "constipation",
            Symptom::Nausea => "nausea",
            Symptom::Fatigue => "fatigue",
            Symptom::OverallScore => "overall_score",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    pub fn scale(self) -> Scale {
        match self {
            Symptom::Diarrhea | Symptom::Constipation => Scale::GRADED,
            _ => Scale::SEVERITY,
        }
    }
}

/// FODMAP food groups tracked in the food log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FodmapGroup {
    Fructans,
    Gos,
    Lactose,
    Fructose,
    Sorbitol,
    Mannitol,
}

impl FodmapGroup {
    pub const ALL: [FodmapGroup; 6] = [
        FodmapGroup::Fructans,
        FodmapGroup::Gos,
        FodmapGroup::Lactose,
        FodmapGroup::Fructose,
        FodmapGroup::Sorbitol,
        FodmapGroup::Mannitol,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FodmapGroup::Fructans => "fructans",
            FodmapGroup::Gos => "gos",
            FodmapGroup::Lactose => "lactose",
            FodmapGroup::Fructose => "fructose",
            FodmapGroup::Sorbitol => "sorbitol",
            FodmapGroup::Mannitol => "mannitol",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.key() == key)
    }
}

/// A tracked numeric signal, bound to its scale and polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Mood,
    Energy,
    Pillar(Pillar),
    Symptom(Symptom),
}

impl Signal {
    /// Mood, energy and the six pillars, in display order
    pub fn checkin_signals() -> Vec<Signal> {
        let mut signals = vec![Signal::Mood, Signal::Energy];
        signals.extend(Pillar::ALL.into_iter().map(Signal::Pillar));
        signals
    }

    pub fn scale(self) -> Scale {
        match self {
            Signal::Mood | Signal::Energy | Signal::Pillar(_) => Scale::RATING,
            Signal::Symptom(s) => s.scale(),
        }
    }

    pub fn polarity(self) -> Polarity {
        match self {
            Signal::Symptom(_) => Polarity::LowerIsBetter,
            _ => Polarity::HigherIsBetter,
        }
    }
}

// =============================================================================
// Series
// =============================================================================

/// One logged signal keyed by calendar date.
///
/// A date may be present with no value (`None`); that is kept distinct
/// from zero. Deserializing rejects a repeated date just like [`insert`].
///
/// [`insert`]: ObservationSeries::insert
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ObservationSeries {
    values: BTreeMap<NaiveDate, Option<f64>>,
}

impl ObservationSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, rejecting a second entry for the same date.
    pub fn insert(&mut self, date: NaiveDate, value: Option<f64>) -> VigorResult<()> {
        if self.values.contains_key(&date) {
            return Err(VigorError::DuplicateDate(date));
        }
        self.values.insert(date, value);
        Ok(())
    }

    pub fn from_entries<I>(entries: I) -> VigorResult<Self>
    where
        I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
    {
        let mut series = Self::new();
        for (date, value) in entries {
            series.insert(date, value)?;
        }
        Ok(series)
    }

    /// Build from ISO date strings.
    pub fn from_iso<'a, I>(entries: I) -> VigorResult<Self>
    where
        I: IntoIterator<Item = (&'a str, Option<f64>)>,
    {
        let mut series = Self::new();
        for (date, value) in entries {
            series.insert(crate::error::parse_date(date)?, value)?;
        }
        Ok(series)
    }

    /// The value on `date`, if one was logged.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.values.get(&date).copied().flatten()
    }

    /// Dates with a value, ascending.
    pub fn present(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.values.iter().filter_map(|(d, v)| v.map(|v| (*d, v)))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<'de> Deserialize<'de> for ObservationSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SeriesVisitor;

        impl<'de> Visitor<'de> for SeriesVisitor {
            type Value = ObservationSeries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of ISO dates to optional values")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut series = ObservationSeries::new();
                while let Some((date, value)) = map.next_entry::<NaiveDate, Option<f64>>()? {
                    series.insert(date, value).map_err(de::Error::custom)?;
                }
                Ok(series)
            }
        }

        deserializer.deserialize_map(SeriesVisitor)
    }
}

/// Per-day event magnitudes (habit completions, servings eaten).
///
/// Zero is a real value; a missing date means nothing was recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventSeries {
    values: BTreeMap<NaiveDate, f64>,
}

impl EventSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// A series with magnitude 1.0 on each date.
    pub fn from_dates<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        Self {
            values: dates.into_iter().map(|d| (d, 1.0)).collect(),
        }
    }

    /// Add `amount` to the magnitude recorded on `date`.
    pub fn add(&mut self, date: NaiveDate, amount: f64) {
        *self.values.entry(date).or_insert(0.0) += amount;
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.values.get(&date).copied()
    }

    /// True when a positive magnitude is recorded for `date`.
    pub fn occurred(&self, date: NaiveDate) -> bool {
        self.get(date).is_some_and(|v| v > 0.0)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// =============================================================================
// Check-ins and habits
// =============================================================================

/// One daily check-in row. Every rating is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckinDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub mood: Option<f64>,
    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub nutrition_rating: Option<f64>,
    #[serde(default)]
    pub activity_rating: Option<f64>,
    #[serde(default)]
    pub sleep_rating: Option<f64>,
    #[serde(default)]
    pub stress_rating: Option<f64>,
    #[serde(default)]
    pub connection_rating: Option<f64>,
    #[serde(default)]
    pub substance_rating: Option<f64>,
}

impl CheckinDay {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            ..Self::default()
        }
    }

    pub fn rating(&self, pillar: Pillar) -> Option<f64> {
        match pillar {
            Pillar::Nutrition => self.nutrition_rating,
            Pillar::PhysicalActivity => self.activity_rating,
            Pillar::Sleep => self.sleep_rating,
            Pillar::StressManagement => self.stress_rating,
            Pillar::SocialConnection => self.connection_rating,
            Pillar::SubstanceAvoidance => self.substance_rating,
        }
    }

    pub fn set_rating(&mut self, pillar: Pillar, value: Option<f64>) {
        let slot = match pillar {
            Pillar::Nutrition => &mut self.nutrition_rating,
            Pillar::PhysicalActivity => &mut self.activity_rating,
            Pillar::Sleep => &mut self.sleep_rating,
            Pillar::StressManagement => &mut self.stress_rating,
            Pillar::SocialConnection => &mut self.connection_rating,
            Pillar::SubstanceAvoidance => &mut self.substance_rating,
        };
        *slot = value;
    }

    /// The value of a check-in signal. Symptoms are not part of a check-in.
    pub fn value(&self, signal: Signal) -> Option<f64> {
        match signal {
            Signal::Mood => self.mood,
            Signal::Energy => self.energy,
            Signal::Pillar(p) => self.rating(p),
            Signal::Symptom(_) => None,
        }
    }
}

/// Date-ordered check-ins, at most one per date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckinLog {
    days: BTreeMap<NaiveDate, CheckinDay>,
}

impl CheckinLog {
    pub fn from_days<I>(days: I) -> VigorResult<Self>
    where
        I: IntoIterator<Item = CheckinDay>,
    {
        let mut log = Self::default();
        for day in days {
            if log.days.contains_key(&day.date) {
                return Err(VigorError::DuplicateDate(day.date));
            }
            log.days.insert(day.date, day);
        }
        Ok(log)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&CheckinDay> {
        self.days.get(&date)
    }

    /// Check-ins in ascending date order.
    pub fn days(&self) -> impl Iterator<Item = &CheckinDay> + '_ {
        self.days.values()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Check-ins within `start..=end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> CheckinLog {
        if start > end {
            return CheckinLog::default();
        }
        CheckinLog {
            days: self
                .days
                .range(start..=end)
                .map(|(d, c)| (*d, c.clone()))
                .collect(),
        }
    }

    /// Project one signal out of the check-ins.
    pub fn series(&self, signal: Signal) -> ObservationSeries {
        ObservationSeries {
            values: self
                .days
                .iter()
                .map(|(d, c)| (*d, c.value(signal)))
                .collect(),
        }
    }

    /// Mean of a signal over all check-ins where it is present.
    pub fn mean(&self, signal: Signal) -> Option<f64> {
        mean(self.days.values().filter_map(|c| c.value(signal)))
    }
}

/// An active habit definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub pillar: Option<Pillar>,
}

/// Habit definitions plus the dates each habit was completed.
///
/// Only positive completions are recorded, so a date missing here cannot be
/// told apart from a day the habit was skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HabitLog {
    habits: Vec<Habit>,
    completions: BTreeMap<i64, BTreeSet<NaiveDate>>,
}

impl HabitLog {
    pub fn new(habits: Vec<Habit>) -> Self {
        Self {
            habits,
            completions: BTreeMap::new(),
        }
    }

    pub fn record_completion(&mut self, habit_id: i64, date: NaiveDate) -> VigorResult<()> {
        if !self.habits.iter().any(|h| h.id == habit_id) {
            return Err(VigorError::UnknownHabit(habit_id));
        }
        self.completions.entry(habit_id).or_default().insert(date);
        Ok(())
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    /// Completion dates for a habit, ascending.
    pub fn completions(&self, habit_id: i64) -> Vec<NaiveDate> {
        self.completions
            .get(&habit_id)
            .map(|dates| dates.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Completions of one habit as an event series.
    pub fn events(&self, habit_id: i64) -> EventSeries {
        EventSeries::from_dates(self.completions(habit_id))
    }

    /// Completions within `start..=end`; habit definitions are kept.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> HabitLog {
        let completions = if start > end {
            BTreeMap::new()
        } else {
            self.completions
                .iter()
                .map(|(id, dates)| (*id, dates.range(start..=end).copied().collect()))
                .collect()
        };
        HabitLog {
            habits: self.habits.clone(),
            completions,
        }
    }
}

// =============================================================================
// Statistical results
// =============================================================================

/// Coarse qualitative label for a correlation or mean difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthTier {
    Negligible,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl StrengthTier {
    /// Tier for a correlation coefficient (sign ignored).
    pub fn from_coefficient(r: f64) -> Self {
        let abs_r = r.abs();
        if abs_r < 0.1 {
            StrengthTier::Negligible
        } else if abs_r < 0.3 {
            StrengthTier::Weak
        } else if abs_r < 0.5 {
            StrengthTier::Moderate
        } else if abs_r < 0.7 {
            StrengthTier::Strong
        } else {
            StrengthTier::VeryStrong
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMethod {
    Pearson,
    Spearman,
}

/// A reported correlation between two labeled series.
///
/// Only produced when `sample_size` clears the significance gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub label_a: String,
    pub label_b: String,

    /// Coefficient in [-1, 1]
    pub coefficient: f64,

    /// Two-tailed p-value in [0, 1]
    pub p_value: Option<f64>,

    /// Number of paired dates
    pub sample_size: usize,

    pub strength_tier: StrengthTier,

    pub method: CorrelationMethod,
}

/// Means of a secondary signal on the same event/no-event partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryComparison {
    pub mean_with_event: f64,
    pub mean_without_event: f64,
    pub difference: f64,
}

/// Mean of a signal on days an event happened vs days it did not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketComparison {
    pub entity_label: String,
    pub mean_with_event: f64,
    pub mean_without_event: f64,
    /// `mean_with_event - mean_without_event`
    pub difference: f64,
    pub strength_tier: StrengthTier,
    pub n_with: usize,
    pub n_without: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<SecondaryComparison>,
}

/// Mood and energy lift associated with completing one habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitImpact {
    pub habit_name: String,
    pub pillar: Option<Pillar>,
    pub mood_with: f64,
    pub mood_without: f64,
    pub mood_diff: f64,
    pub energy_with: f64,
    pub energy_without: f64,
    pub energy_diff: f64,
    pub times_done: usize,
    pub total_days: usize,
    pub strength: StrengthTier,
}

// =============================================================================
// Insights and digest
// =============================================================================

/// A rendered natural-language insight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub text: String,
    /// Ranking weight only; never shown to the user
    pub importance_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

/// One signal's mean this week and last week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowAverages {
    pub signal: Signal,
    pub current: Option<f64>,
    pub previous: Option<f64>,
    pub trend: Trend,
}

/// Week-over-week summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestResult {
    pub averages: Vec<WindowAverages>,
    pub mood_trend: Trend,
    pub energy_trend: Trend,
    pub strongest_pillar: Option<Pillar>,
    pub weakest_pillar: Option<Pillar>,
    pub top_habit: Option<String>,
    pub headline: String,
    pub recommendation: String,
}

// =============================================================================
// Helpers
// =============================================================================

/// Arithmetic mean, `None` for an empty input.
pub(crate) fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_observation_series_rejects_duplicates() {
        let mut series = ObservationSeries::new();
        series.insert(day(1), Some(7.0)).unwrap();
        assert_eq!(
            series.insert(day(1), Some(8.0)),
            Err(VigorError::DuplicateDate(day(1)))
        );
    }

    #[test]
    fn test_observation_series_deserialize_rejects_duplicates() {
        let err = serde_json::from_str::<ObservationSeries>(
            r#"{"2024-05-01": 1.0, "2024-05-01": 2.0}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate date in series: 2024-05-01"));

        let series: ObservationSeries =
            serde_json::from_str(r#"{"2024-05-02": null, "2024-05-01": 3}"#).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.get(day(1)), Some(3.0));
        assert_eq!(series.get(day(2)), None);
    }

    #[test]
    fn test_absent_value_is_not_zero() {
        let series =
            ObservationSeries::from_iso([("2024-05-01", None), ("2024-05-02", Some(0.0))]).unwrap();
        assert_eq!(series.get(day(1)), None);
        assert_eq!(series.get(day(2)), Some(0.0));
        assert_eq!(series.present().count(), 1);
    }

    #[test]
    fn test_event_series_zero_is_recorded_but_not_occurred() {
        let mut events = EventSeries::new();
        events.add(day(1), 0.0);
        events.add(day(2), 1.5);
        events.add(day(2), 0.5);
        assert_eq!(events.get(day(1)), Some(0.0));
        assert!(!events.occurred(day(1)));
        assert!(events.occurred(day(2)));
        assert_eq!(events.get(day(2)), Some(2.0));
        assert_eq!(events.get(day(3)), None);
    }

    #[test]
    fn test_scale_rescales_rating_thresholds() {
        assert!((Scale::RATING.rescale_threshold(1.5) - 1.5).abs() < 1e-12);
        assert!((Scale::GRADED.rescale_threshold(1.5) - 0.5).abs() < 1e-12);
        assert_eq!(Signal::Symptom(Symptom::Diarrhea).scale(), Scale::GRADED);
        assert_eq!(Signal::Symptom(Symptom::Gas).polarity(), Polarity::LowerIsBetter);
    }

    #[test]
    fn test_pillar_ids_round_trip() {
        for pillar in Pillar::ALL {
            assert_eq!(Pillar::from_id(pillar.id()), Some(pillar));
        }
        assert_eq!(Pillar::from_id(7), None);
    }

    #[test]
    fn test_checkin_log_projects_signals() {
        let mut first = CheckinDay::new(day(1));
        first.mood = Some(6.0);
        first.set_rating(Pillar::Sleep, Some(8.0));
        let second = CheckinDay::new(day(2));

        let log = CheckinLog::from_days([first, second]).unwrap();
        let sleep = log.series(Signal::Pillar(Pillar::Sleep));
        assert_eq!(sleep.len(), 2);
        assert_eq!(sleep.get(day(1)), Some(8.0));
        assert_eq!(sleep.get(day(2)), None);
        assert_eq!(log.mean(Signal::Mood), Some(6.0));
        assert_eq!(log.between(day(2), day(9)).len(), 1);
    }

    #[test]
    fn test_habit_log_rejects_unknown_habit() {
        let mut habits = HabitLog::new(vec![Habit {
            id: 1,
            name: "Walk".to_string(),
            pillar: Some(Pillar::PhysicalActivity),
        }]);
        habits.record_completion(1, day(3)).unwrap();
        assert_eq!(habits.completions(1), vec![day(3)]);
        assert_eq!(habits.record_completion(2, day(3)), Err(VigorError::UnknownHabit(2)));
        assert!(habits.between(day(4), day(9)).completions(1).is_empty());
    }

    #[test]
    fn test_strength_tier_boundaries() {
        assert_eq!(StrengthTier::from_coefficient(0.05), StrengthTier::Negligible);
        assert_eq!(StrengthTier::from_coefficient(-0.2), StrengthTier::Weak);
        assert_eq!(StrengthTier::from_coefficient(0.3), StrengthTier::Moderate);
        assert_eq!(StrengthTier::from_coefficient(-0.69), StrengthTier::Strong);
        assert_eq!(StrengthTier::from_coefficient(0.7), StrengthTier::VeryStrong);
    }

    #[test]
    fn test_checkin_day_deserializes_with_missing_ratings() {
        let day: CheckinDay =
            serde_json::from_str(r#"{"date":"2024-05-01","mood":7,"sleep_rating":6}"#).unwrap();
        assert_eq!(day.mood, Some(7.0));
        assert_eq!(day.rating(Pillar::Sleep), Some(6.0));
        assert_eq!(day.energy, None);
    }
}
