use chrono::NaiveDateTime;
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::records::{
    Choice, Record, RecordLimits, ValidationError, bounded_u32, now, require_non_empty,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Choice for Gender {
    const FIELD: &'static str = "gender";
}

/// How physically active the user is on a typical week.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Desk work, little or no exercise
    #[strum(to_string = "sedentary")]
    Sedentary,
    /// Exercise 1-3 days a week
    #[strum(to_string = "light", serialize = "lightly_active")]
    Light,
    /// Exercise 3-5 days a week
    #[strum(to_string = "moderate", serialize = "moderately_active")]
    Moderate,
    /// Exercise 6-7 days a week
    #[strum(to_string = "active")]
    Active,
    /// Training twice a day or physical labour
    #[strum(to_string = "very_active")]
    VeryActive,
}

impl ActivityLevel {
    /// Factor applied to BMR to estimate total daily energy expenditure
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::Active => 1.725,
            Self::VeryActive => 1.9,
        }
    }
}

impl Choice for ActivityLevel {
    const FIELD: &'static str = "activity_level";
}

/// What the user is trying to achieve, drives the macronutrient split.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    #[strum(to_string = "maintain")]
    Maintain,
    #[strum(to_string = "lose", serialize = "lose_weight", serialize = "weight_loss")]
    Lose,
    #[strum(to_string = "gain", serialize = "gain_weight")]
    Gain,
    #[strum(to_string = "build_muscle", serialize = "muscle_gain")]
    BuildMuscle,
    #[strum(to_string = "health", serialize = "health_maintenance")]
    Health,
}

impl Choice for Goal {
    const FIELD: &'static str = "goal";
}

/// The user's body measurements and goals. There is exactly one current profile per store.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters, Serialize, Deserialize)]
#[serde(try_from = "RawProfile")]
pub struct Profile {
    #[getset(get = "pub")]
    name: String,
    #[getset(get_copy = "pub")]
    age: u32,
    #[getset(get_copy = "pub")]
    gender: Gender,
    #[getset(get_copy = "pub")]
    height_cm: f64,
    #[getset(get_copy = "pub")]
    weight_kg: f64,
    #[getset(get_copy = "pub")]
    activity_level: ActivityLevel,
    #[getset(get_copy = "pub")]
    goal: Goal,
    #[getset(get_copy = "pub")]
    created_at: NaiveDateTime,
    #[getset(get_copy = "pub")]
    updated_at: NaiveDateTime,
}

impl Profile {
    /// Create a new profile, validating every field against the default [`RecordLimits`].
    pub fn new(
        name: &str,
        age: u32,
        gender: Gender,
        height_cm: f64,
        weight_kg: f64,
        activity_level: ActivityLevel,
        goal: Goal,
    ) -> Result<Self, ValidationError> {
        Self::with_limits(
            &RecordLimits::default(),
            name,
            age,
            gender,
            height_cm,
            weight_kg,
            activity_level,
            goal,
        )
    }

    /// Create a new profile, validating every field against `limits`.
    #[allow(clippy::too_many_arguments)]
    pub fn with_limits(
        limits: &RecordLimits,
        name: &str,
        age: u32,
        gender: Gender,
        height_cm: f64,
        weight_kg: f64,
        activity_level: ActivityLevel,
        goal: Goal,
    ) -> Result<Self, ValidationError> {
        let timestamp = now();
        let profile = Self {
            name: name.to_string(),
            age,
            gender,
            height_cm,
            weight_kg,
            activity_level,
            goal,
            created_at: timestamp,
            updated_at: timestamp,
        };

        profile.validate(limits)?;

        Ok(profile)
    }

    /// Check every field against `limits`.
    pub fn validate(&self, limits: &RecordLimits) -> Result<(), ValidationError> {
        require_non_empty("name", &self.name)?;
        validate_age(i64::from(self.age), limits)?;

        if !self.height_cm.is_finite()
            || !(limits.min_height_cm..=limits.max_height_cm).contains(&self.height_cm)
        {
            return Err(ValidationError::new(
                "height_cm",
                format!(
                    "height_cm must be between {} and {}",
                    limits.min_height_cm, limits.max_height_cm
                ),
            ));
        }

        if !self.weight_kg.is_finite()
            || self.weight_kg <= 0.0
            || self.weight_kg > limits.max_weight_kg
        {
            return Err(ValidationError::new(
                "weight_kg",
                format!(
                    "weight_kg must be greater than 0 and at most {}",
                    limits.max_weight_kg
                ),
            ));
        }

        Ok(())
    }

    // Mutation does not re-validate, it only refreshes `updated_at`.

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
        self.touch();
    }

    pub fn set_age(&mut self, age: u32) {
        self.age = age;
        self.touch();
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.gender = gender;
        self.touch();
    }

    pub fn set_height_cm(&mut self, height_cm: f64) {
        self.height_cm = height_cm;
        self.touch();
    }

    pub fn set_weight_kg(&mut self, weight_kg: f64) {
        self.weight_kg = weight_kg;
        self.touch();
    }

    pub fn set_activity_level(&mut self, activity_level: ActivityLevel) {
        self.activity_level = activity_level;
        self.touch();
    }

    pub fn set_goal(&mut self, goal: Goal) {
        self.goal = goal;
        self.touch();
    }

    /// Mark this profile as modified now
    pub fn touch(&mut self) {
        self.updated_at = now();
    }
}

impl Record for Profile {
    fn check(&self, limits: &RecordLimits) -> Result<(), ValidationError> {
        self.validate(limits)
    }
}

fn validate_age(age: i64, limits: &RecordLimits) -> Result<u32, ValidationError> {
    if age <= 0 {
        return Err(ValidationError::new("age", "age must be a positive integer"));
    }

    bounded_u32(
        "age",
        age,
        1,
        limits.max_age,
        format!("age must be at most {}", limits.max_age),
    )
}

/// The loosely typed shape a profile is read from. Older files name the measurements `height`
/// and `weight`, and may lack timestamps entirely.
#[derive(Deserialize)]
struct RawProfile {
    name: String,
    age: i64,
    gender: String,
    #[serde(alias = "height")]
    height_cm: f64,
    #[serde(alias = "weight")]
    weight_kg: f64,
    activity_level: String,
    goal: String,
    created_at: Option<NaiveDateTime>,
    updated_at: Option<NaiveDateTime>,
}

impl TryFrom<RawProfile> for Profile {
    type Error = ValidationError;

    fn try_from(raw: RawProfile) -> Result<Self, Self::Error> {
        let limits = RecordLimits::UNBOUNDED;
        let timestamp = now();
        let created_at = raw.created_at.unwrap_or(timestamp);

        let profile = Self {
            age: validate_age(raw.age, &limits)?,
            gender: Gender::parse(&raw.gender)?,
            activity_level: ActivityLevel::parse(&raw.activity_level)?,
            goal: Goal::parse(&raw.goal)?,
            name: raw.name,
            height_cm: raw.height_cm,
            weight_kg: raw.weight_kg,
            created_at,
            updated_at: raw.updated_at.unwrap_or(created_at),
        };

        profile.validate(&limits)?;

        Ok(profile)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn profile() -> Profile {
        Profile::new(
            "Taro",
            30,
            Gender::Male,
            175.0,
            70.0,
            ActivityLevel::Moderate,
            Goal::Maintain,
        )
        .unwrap()
    }

    #[test]
    fn test_new() {
        let profile = profile();

        assert_eq!(profile.name(), "Taro");
        assert_eq!(profile.age(), 30);
        assert_eq!(profile.created_at(), profile.updated_at());
    }

    #[test]
    fn test_new_rejects_bad_fields() {
        let cases = [
            ("", 30, 175.0, 70.0, "name"),
            ("   ", 30, 175.0, 70.0, "name"),
            ("Taro", 0, 175.0, 70.0, "age"),
            ("Taro", 151, 175.0, 70.0, "age"),
            ("Taro", 30, 49.9, 70.0, "height_cm"),
            ("Taro", 30, 300.1, 70.0, "height_cm"),
            ("Taro", 30, 175.0, 0.0, "weight_kg"),
            ("Taro", 30, 175.0, 500.5, "weight_kg"),
            ("Taro", 30, f64::NAN, 70.0, "height_cm"),
        ];

        for (name, age, height, weight, field) in cases {
            let err = Profile::new(
                name,
                age,
                Gender::Female,
                height,
                weight,
                ActivityLevel::Light,
                Goal::Lose,
            )
            .unwrap_err();
            assert_eq!(err.field(), field, "case {name:?} {age} {height} {weight}");
        }
    }

    #[test]
    fn test_configured_limits() {
        let raised = RecordLimits {
            max_age: 200,
            ..RecordLimits::default()
        };
        let new = |limits: &RecordLimits| {
            Profile::with_limits(
                limits,
                "Kame",
                180,
                Gender::Female,
                150.0,
                45.0,
                ActivityLevel::Sedentary,
                Goal::Health,
            )
        };
        assert_eq!(new(&RecordLimits::default()).unwrap_err().field(), "age");

        let profile = new(&raised).unwrap();
        let read: Profile =
            serde_json::from_str(&serde_json::to_string(&profile).unwrap()).unwrap();

        assert_eq!(read, profile);
        assert!(read.check(&raised).is_ok());
        assert!(read.check(&RecordLimits::default()).is_err());
    }

    #[test]
    fn test_age_message() {
        let err = validate_age(-1, &RecordLimits::default()).unwrap_err();
        assert_eq!(err.reason(), "age must be a positive integer");
    }

    #[test]
    fn test_setters_refresh_updated_at_without_validating() {
        let mut profile = profile();
        let before = profile.updated_at();

        profile.set_age(0);

        assert_eq!(profile.age(), 0);
        assert!(profile.updated_at() >= before);
        assert!(profile.validate(&RecordLimits::default()).is_err());
    }

    #[test]
    fn test_serialize_flat_map() {
        let value = serde_json::to_value(profile()).unwrap();

        assert_eq!(value["gender"], "male");
        assert_eq!(value["activity_level"], "moderate");
        assert_eq!(value["goal"], "maintain");
        assert_eq!(value["height_cm"], 175.0);
    }

    #[test]
    fn test_round_trip() {
        let profile = profile();
        let json = serde_json::to_string(&profile).unwrap();

        assert_eq!(serde_json::from_str::<Profile>(&json).unwrap(), profile);
    }

    #[test]
    fn test_deserialize_legacy_field_names() {
        let json = r#"{
            "name": "Hanako", "age": 28, "gender": "female",
            "height": 160.0, "weight": 52.5,
            "activity_level": "lightly_active", "goal": "lose_weight",
            "created_at": "2025-01-01T08:00:00.123456"
        }"#;

        let profile: Profile = serde_json::from_str(json).unwrap();

        assert_eq!(profile.height_cm(), 160.0);
        assert_eq!(profile.activity_level(), ActivityLevel::Light);
        assert_eq!(profile.goal(), Goal::Lose);
        assert_eq!(profile.updated_at(), profile.created_at());
    }

    #[test]
    fn test_deserialize_rejects_unknown_enum() {
        let json = r#"{
            "name": "Hanako", "age": 28, "gender": "other",
            "height_cm": 160.0, "weight_kg": 52.5,
            "activity_level": "light", "goal": "lose"
        }"#;

        let err = serde_json::from_str::<Profile>(json).unwrap_err();
        assert!(err.to_string().contains("gender must be one of {male, female}"));
    }

    #[test]
    fn test_goal_aliases() {
        assert_eq!(Goal::parse("weight_loss").unwrap(), Goal::Lose);
        assert_eq!(Goal::parse("muscle_gain").unwrap(), Goal::BuildMuscle);
        assert_eq!(Goal::BuildMuscle.to_string(), "build_muscle");
        assert_eq!(
            Goal::choices(),
            "maintain, lose, gain, build_muscle, health"
        );
    }
}
