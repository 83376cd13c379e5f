use chrono::NaiveDateTime;
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::records::{
    Choice, Record, RecordLimits, ValidationError, bounded_u32, require_non_empty,
    require_notes_len,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

impl Choice for Intensity {
    const FIELD: &'static str = "intensity";
}

/// A single completed training session.
///
/// Workout records are append-only: they are never edited once stored, only deleted.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters, Serialize, Deserialize)]
#[serde(try_from = "RawWorkoutRecord")]
pub struct WorkoutRecord {
    #[getset(get_copy = "pub")]
    date: NaiveDateTime,
    #[getset(get = "pub")]
    exercise: String,
    #[getset(get_copy = "pub")]
    duration_minutes: u32,
    #[getset(get_copy = "pub")]
    calories: u32,
    #[getset(get_copy = "pub")]
    intensity: Intensity,
    #[getset(get = "pub")]
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

impl WorkoutRecord {
    pub fn new(
        date: NaiveDateTime,
        exercise: &str,
        duration_minutes: u32,
        calories: u32,
        intensity: Intensity,
        notes: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Self::with_limits(
            &RecordLimits::default(),
            date,
            exercise,
            duration_minutes,
            calories,
            intensity,
            notes,
        )
    }

    pub fn with_limits(
        limits: &RecordLimits,
        date: NaiveDateTime,
        exercise: &str,
        duration_minutes: u32,
        calories: u32,
        intensity: Intensity,
        notes: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let record = Self {
            date,
            exercise: exercise.to_string(),
            duration_minutes,
            calories,
            intensity,
            notes: notes.map(str::to_string),
        };

        record.validate(limits)?;

        Ok(record)
    }

    /// Check every field against `limits`. Dates are not constrained, a workout may be logged
    /// for any point in time.
    pub fn validate(&self, limits: &RecordLimits) -> Result<(), ValidationError> {
        require_non_empty("exercise", &self.exercise)?;
        validate_duration(i64::from(self.duration_minutes), limits)?;
        validate_calories(i64::from(self.calories), limits)?;
        require_notes_len(self.notes.as_deref(), limits.max_notes_len)
    }
}

impl Record for WorkoutRecord {
    fn check(&self, limits: &RecordLimits) -> Result<(), ValidationError> {
        self.validate(limits)
    }
}

fn validate_duration(minutes: i64, limits: &RecordLimits) -> Result<u32, ValidationError> {
    bounded_u32(
        "duration_minutes",
        minutes,
        1,
        limits.max_duration_minutes,
        format!(
            "duration_minutes must be between 1 and {}",
            limits.max_duration_minutes
        ),
    )
}

fn validate_calories(calories: i64, limits: &RecordLimits) -> Result<u32, ValidationError> {
    bounded_u32(
        "calories",
        calories,
        0,
        limits.max_workout_calories,
        format!(
            "calories must be between 0 and {}",
            limits.max_workout_calories
        ),
    )
}

#[derive(Deserialize)]
struct RawWorkoutRecord {
    date: NaiveDateTime,
    exercise: String,
    #[serde(alias = "duration")]
    duration_minutes: i64,
    calories: i64,
    intensity: String,
    #[serde(default)]
    notes: Option<String>,
}

impl TryFrom<RawWorkoutRecord> for WorkoutRecord {
    type Error = ValidationError;

    fn try_from(raw: RawWorkoutRecord) -> Result<Self, Self::Error> {
        let limits = RecordLimits::UNBOUNDED;

        let record = Self {
            date: raw.date,
            duration_minutes: validate_duration(raw.duration_minutes, &limits)?,
            calories: validate_calories(raw.calories, &limits)?,
            intensity: Intensity::parse(&raw.intensity)?,
            exercise: raw.exercise,
            notes: raw.notes,
        };

        record.validate(&limits)?;

        Ok(record)
    }
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;

    use super::*;

    fn date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new() {
        let record =
            WorkoutRecord::new(date(), "running", 30, 300, Intensity::Medium, None).unwrap();

        assert_eq!(record.exercise(), "running");
        assert_eq!(record.duration_minutes(), 30);
        assert_eq!(record.notes(), &None);
    }

    #[test]
    fn test_bounds() {
        let new = |duration, calories| {
            WorkoutRecord::new(date(), "running", duration, calories, Intensity::Low, None)
        };

        assert!(new(1, 0).is_ok());
        assert!(new(600, 10_000).is_ok());
        assert_eq!(new(0, 100).unwrap_err().field(), "duration_minutes");
        assert_eq!(new(601, 100).unwrap_err().field(), "duration_minutes");
        assert_eq!(new(30, 10_001).unwrap_err().field(), "calories");
    }

    #[test]
    fn test_configured_limits() {
        let raised = RecordLimits {
            max_duration_minutes: 900,
            ..RecordLimits::default()
        };
        assert!(WorkoutRecord::new(date(), "hike", 720, 1500, Intensity::Low, None).is_err());

        let record =
            WorkoutRecord::with_limits(&raised, date(), "hike", 720, 1500, Intensity::Low, None)
                .unwrap();
        let read: WorkoutRecord =
            serde_json::from_str(&serde_json::to_string(&record).unwrap()).unwrap();

        assert!(read.check(&raised).is_ok());
        assert_eq!(
            read.check(&RecordLimits::default()).unwrap_err().field(),
            "duration_minutes"
        );
    }

    #[test]
    fn test_empty_exercise() {
        let err = WorkoutRecord::new(date(), "", 30, 300, Intensity::High, None).unwrap_err();
        assert_eq!(err.field(), "exercise");
    }

    #[test]
    fn test_notes_length() {
        let long = "x".repeat(501);
        let err =
            WorkoutRecord::new(date(), "yoga", 30, 90, Intensity::Low, Some(&long)).unwrap_err();
        assert_eq!(err.field(), "notes");

        let max = "あ".repeat(500);
        assert!(WorkoutRecord::new(date(), "yoga", 30, 90, Intensity::Low, Some(&max)).is_ok());
    }

    #[test]
    fn test_round_trip() {
        let record = WorkoutRecord::new(
            date(),
            "cycling",
            45,
            400,
            Intensity::High,
            Some("hill repeats"),
        )
        .unwrap();

        let json = serde_json::to_string(&record).unwrap();

        assert_eq!(serde_json::from_str::<WorkoutRecord>(&json).unwrap(), record);
    }

    #[test]
    fn test_deserialize_legacy_duration() {
        let json = r#"{"date": "2025-01-02T00:00:00", "exercise": "strength", "duration": 45,
            "calories": 200, "intensity": "high", "notes": null}"#;

        let record: WorkoutRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.duration_minutes(), 45);
        assert_eq!(record.intensity(), Intensity::High);
    }

    #[test]
    fn test_deserialize_rejects_negative_calories() {
        let json = r#"{"date": "2025-01-02T00:00:00", "exercise": "strength",
            "duration_minutes": 45, "calories": -1, "intensity": "high"}"#;

        assert!(serde_json::from_str::<WorkoutRecord>(json).is_err());
    }
}
