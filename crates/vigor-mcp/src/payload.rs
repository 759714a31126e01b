//! Tool argument payloads
//!
//! Callers send the rows they already fetched; these helpers turn them into
//! the engine's typed logs. A missing or null field is an empty collection.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use vigor_core::{
    parse_date, CheckinDay, CheckinLog, ExposureTable, FodmapGroup, Habit, HabitLog,
    ObservationSeries, Pillar, Symptom, VigorError,
};

use crate::error::{McpError, Result};

/// A habit definition plus the dates it was completed.
#[derive(Debug, Deserialize)]
pub struct HabitPayload {
    pub id: i64,
    pub name: String,
    /// Pillar id, 1-6
    #[serde(default)]
    pub pillar_id: Option<u8>,
    #[serde(default)]
    pub completed: Vec<String>,
}

/// One food log entry. Unknown group keys are skipped.
#[derive(Debug, Deserialize)]
pub struct FoodLogPayload {
    pub date: String,
    #[serde(default)]
    pub fodmap_groups: Vec<String>,
    #[serde(default)]
    pub servings: Option<f64>,
}

fn field<T>(args: &Value, key: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match args.get(key) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => Ok(T::deserialize(value)?),
    }
}

/// `checkins`: array of check-in rows
pub fn checkin_log(args: &Value) -> Result<CheckinLog> {
    let days: Vec<CheckinDay> = field(args, "checkins")?;
    Ok(CheckinLog::from_days(days)?)
}

/// `habits`: array of habits with their completion dates
pub fn habit_log(args: &Value) -> Result<HabitLog> {
    let payloads: Vec<HabitPayload> = field(args, "habits")?;

    let mut habits = Vec::with_capacity(payloads.len());
    for payload in &payloads {
        let pillar = match payload.pillar_id {
            Some(id) => Some(Pillar::from_id(id).ok_or_else(|| {
                McpError::InvalidParameter(format!("pillar_id {id} is not between 1 and 6"))
            })?),
            None => None,
        };
        habits.push(Habit {
            id: payload.id,
            name: payload.name.clone(),
            pillar,
        });
    }

    let mut log = HabitLog::new(habits);
    for payload in &payloads {
        for date in &payload.completed {
            log.record_completion(payload.id, parse_date(date)?)?;
        }
    }
    Ok(log)
}

/// `food_logs`: array of food entries
pub fn exposure_table(args: &Value) -> Result<ExposureTable> {
    let entries: Vec<FoodLogPayload> = field(args, "food_logs")?;
    let mut table = ExposureTable::new();
    for entry in entries {
        let groups: Vec<FodmapGroup> = entry
            .fodmap_groups
            .iter()
            .filter_map(|key| {
                let group = FodmapGroup::from_key(key);
                if group.is_none() {
                    debug!(group = %key, date = %entry.date, "skipping unknown FODMAP group");
                }
                group
            })
            .collect();
        table.record(parse_date(&entry.date)?, &groups, entry.servings);
    }
    Ok(table)
}

/// `symptoms`: object of symptom key to `{date: score}`
pub fn symptom_series(args: &Value) -> Result<BTreeMap<Symptom, ObservationSeries>> {
    let raw: BTreeMap<String, ObservationSeries> = field(args, "symptoms")?;
    raw.into_iter()
        .map(|(key, series)| {
            let symptom = Symptom::from_key(&key).ok_or(VigorError::UnknownSignal(key))?;
            Ok((symptom, series))
        })
        .collect()
}

/// `key`: array of numbers
pub fn values(args: &Value, key: &'static str) -> Result<Vec<f64>> {
    let value = args.get(key).ok_or(McpError::MissingParameter(key))?;
    Ok(Vec::<f64>::deserialize(value)?)
}

/// Optional ISO date under `key`, today's local date when absent.
pub fn date_or_today(args: &Value, key: &str) -> Result<NaiveDate> {
    match args[key].as_str() {
        Some(date) => Ok(parse_date(date)?),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_are_empty() {
        let args = json!({});
        assert!(checkin_log(&args).unwrap().is_empty());
        assert!(habit_log(&args).unwrap().habits().is_empty());
        assert!(exposure_table(&args).unwrap().is_empty());
        assert!(symptom_series(&args).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_checkin_is_rejected() {
        let args = json!({
            "checkins": [
                {"date": "2024-05-01", "mood": 6},
                {"date": "2024-05-01", "mood": 7}
            ]
        });
        let err = checkin_log(&args).unwrap_err();
        assert!(matches!(err, McpError::Core(VigorError::DuplicateDate(_))));
    }

    #[test]
    fn test_habit_payload() {
        let args = json!({
            "habits": [
                {"id": 3, "name": "Walk", "pillar_id": 2, "completed": ["2024-05-01", "2024-05-03"]}
            ]
        });
        let log = habit_log(&args).unwrap();
        assert_eq!(log.habits()[0].pillar, Some(Pillar::PhysicalActivity));
        assert_eq!(log.completions(3).len(), 2);

        let bad = json!({"habits": [{"id": 1, "name": "X", "pillar_id": 9}]});
        assert!(matches!(habit_log(&bad), Err(McpError::InvalidParameter(_))));
    }

    #[test]
    fn test_unknown_symptom_is_rejected() {
        let args = json!({"symptoms": {"hiccups": {"2024-05-01": 3}}});
        assert!(matches!(
            symptom_series(&args),
            Err(McpError::Core(VigorError::UnknownSignal(_)))
        ));
    }

    #[test]
    fn test_food_log_payload() {
        let args = json!({
            "food_logs": [
                {"date": "2024-05-01", "fodmap_groups": ["lactose", "gos"], "servings": 2},
                {"date": "2024-05-02"},
                {"date": "2024-05-03", "fodmap_groups": ["lactose", "polyols"]}
            ]
        });
        let table = exposure_table(&args).unwrap();
        assert_eq!(table.len(), 3);
        let lactose = table.series(FodmapGroup::Lactose);
        assert_eq!(lactose.get(parse_date("2024-05-01").unwrap()), Some(2.0));
        assert_eq!(lactose.get(parse_date("2024-05-02").unwrap()), Some(0.0));
        assert_eq!(lactose.get(parse_date("2024-05-03").unwrap()), Some(1.0));
    }
}
