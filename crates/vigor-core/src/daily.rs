//! One-sentence insight shown right after a check-in

use chrono::{Duration, NaiveDate};

use crate::models::{mean, CheckinDay, CheckinLog, Pillar};

/// Recent check-ins needed before pattern messages are tried
pub const MIN_RECENT_CHECKINS: usize = 3;

/// Days looked back from the check-in date
pub const RECENT_WINDOW_DAYS: i64 = 14;

const MOOD_SWING: f64 = 1.5;
const MIN_ACTIVITY_PAIRS: usize = 5;
const HIGH_ACTIVITY: f64 = 7.0;
const LOW_ACTIVITY: f64 = 4.0;
const MIN_CONSISTENCY_DAYS: usize = 7;
const GREAT_CONSISTENCY_DAYS: usize = 10;

/// Insight for `today` given the recent check-ins (which may include today).
///
/// `None` when no pattern applies.
pub fn checkin_insight(today: &CheckinDay, recent: &[CheckinDay]) -> Option<String> {
    if recent.len() < MIN_RECENT_CHECKINS {
        return Some(simple_insight(today).to_string());
    }

    sleep_energy_insight(today, recent)
        .or_else(|| mood_insight(today, recent))
        .or_else(|| activity_insight(today, recent))
        .or_else(|| consistency_insight(recent))
}

/// Insight for the check-in logged on `date`, looking back two weeks.
pub fn checkin_insight_for(checkins: &CheckinLog, date: NaiveDate) -> Option<String> {
    let today = checkins.get(date)?;
    let recent: Vec<CheckinDay> = checkins
        .between(date - Duration::days(RECENT_WINDOW_DAYS), date)
        .days()
        .cloned()
        .collect();
    checkin_insight(today, &recent)
}

fn simple_insight(today: &CheckinDay) -> &'static str {
    let mood = today.mood.unwrap_or(5.0);
    if mood >= 7.0 {
        "You're feeling good today! Take note of what's contributing to this positive state; it's valuable data for building lasting habits."
    } else if mood <= 3.0 {
        "Tough days happen and they're part of the journey. Even showing up to check in is a win. Be gentle with yourself today."
    } else {
        "Thanks for checking in! The more data you log, the more patterns we can find to help you thrive."
    }
}

fn sleep_energy_insight(today: &CheckinDay, recent: &[CheckinDay]) -> Option<String> {
    let sleep = today.rating(Pillar::Sleep)?;
    let energy = today.energy?;
    let avg_sleep = mean(recent.iter().filter_map(|c| c.rating(Pillar::Sleep)))?;
    let avg_energy = mean(recent.iter().filter_map(|c| c.energy))?;

    if sleep >= avg_sleep + 1.0 && energy >= avg_energy + 1.0 {
        Some(format!(
            "Great sleep pays off! Your sleep rating ({sleep}) is above your recent average ({avg_sleep:.1}), and your energy is up too."
        ))
    } else if sleep <= avg_sleep - 1.0 {
        Some(format!(
            "Your sleep rating ({sleep}) is below your recent average ({avg_sleep:.1}). Consider your wind-down routine tonight."
        ))
    } else {
        None
    }
}

fn mood_insight(today: &CheckinDay, recent: &[CheckinDay]) -> Option<String> {
    let mood = today.mood?;
    let moods: Vec<f64> = recent.iter().filter_map(|c| c.mood).collect();
    let days = moods.len();
    let avg_mood = mean(moods)?;

    if mood >= avg_mood + MOOD_SWING {
        Some(format!(
            "Your mood ({mood}) is notably higher than your {days}-day average ({avg_mood:.1}). What's working well for you?"
        ))
    } else if mood <= avg_mood - MOOD_SWING {
        Some(format!(
            "Your mood ({mood}) dipped below your average ({avg_mood:.1}). Remember: tough days are part of the journey, and they don't erase your progress."
        ))
    } else {
        None
    }
}

fn activity_insight(today: &CheckinDay, recent: &[CheckinDay]) -> Option<String> {
    today.rating(Pillar::PhysicalActivity)?;
    today.mood?;

    let pairs: Vec<(f64, f64)> = recent
        .iter()
        .filter_map(|c| Some((c.rating(Pillar::PhysicalActivity)?, c.mood?)))
        .collect();
    if pairs.len() < MIN_ACTIVITY_PAIRS {
        return None;
    }

    let active = mean(pairs.iter().filter(|(a, _)| *a >= HIGH_ACTIVITY).map(|(_, m)| *m))?;
    let inactive = mean(pairs.iter().filter(|(a, _)| *a <= LOW_ACTIVITY).map(|(_, m)| *m))?;
    (active - inactive > 1.0).then(|| {
        format!(
            "Pattern spotted: on active days your mood averages {active:.1} vs {inactive:.1} on less active days. Movement is your mood booster!"
        )
    })
}

fn consistency_insight(recent: &[CheckinDay]) -> Option<String> {
    let n = recent.len();
    if n < MIN_CONSISTENCY_DAYS {
        return None;
    }
    let verdict = if n >= GREAT_CONSISTENCY_DAYS {
        "Great consistency!"
    } else {
        "Try to check in daily: consistency reveals the patterns that drive real change."
    };
    Some(format!("You've checked in {n} of the last {RECENT_WINDOW_DAYS} days. {verdict}"))
}
