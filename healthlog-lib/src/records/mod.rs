//! Validated domain records.
//!
//! Every record is checked field by field when it is constructed through `new` (default
//! [`RecordLimits`]) or `with_limits`. Deserializing from the flat JSON form checks the shape of
//! every field but not its range: the range depends on the configured limits, which the store
//! applies through [`Record::check`]. Mutating a record does not re-validate it.

use std::{fmt::Display, str::FromStr};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

mod nutrition;
mod profile;
mod workout;

pub use nutrition::{FoodItem, FoodTotals, MealType, NutritionRecord};
pub use profile::{ActivityLevel, Gender, Goal, Profile};
pub use workout::{Intensity, WorkoutRecord};

/// A field failed its declared constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{field}`: {reason}")]
pub struct ValidationError {
    field: &'static str,
    reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Human readable explanation of what was wrong with the field
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Upper and lower bounds used to catch data entry mistakes.
///
/// These are not physiological limits, they only exist to reject obviously mistyped values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordLimits {
    pub max_age: u32,
    pub min_height_cm: f64,
    pub max_height_cm: f64,
    pub max_weight_kg: f64,
    pub max_duration_minutes: u32,
    pub max_workout_calories: u32,
    pub max_notes_len: usize,
}

impl RecordLimits {
    pub const MAX_AGE: u32 = 150;
    pub const MIN_HEIGHT_CM: f64 = 50.0;
    pub const MAX_HEIGHT_CM: f64 = 300.0;
    pub const MAX_WEIGHT_KG: f64 = 500.0;
    pub const MAX_DURATION_MINUTES: u32 = 600;
    pub const MAX_WORKOUT_CALORIES: u32 = 10_000;
    pub const MAX_NOTES_LEN: usize = 500;

    /// Limits that only enforce the shape of a field, such as a positive age or a finite height.
    pub const UNBOUNDED: Self = Self {
        max_age: u32::MAX,
        min_height_cm: f64::MIN_POSITIVE,
        max_height_cm: f64::MAX,
        max_weight_kg: f64::MAX,
        max_duration_minutes: u32::MAX,
        max_workout_calories: u32::MAX,
        max_notes_len: usize::MAX,
    };
}

impl Default for RecordLimits {
    fn default() -> Self {
        Self {
            max_age: Self::MAX_AGE,
            min_height_cm: Self::MIN_HEIGHT_CM,
            max_height_cm: Self::MAX_HEIGHT_CM,
            max_weight_kg: Self::MAX_WEIGHT_KG,
            max_duration_minutes: Self::MAX_DURATION_MINUTES,
            max_workout_calories: Self::MAX_WORKOUT_CALORIES,
            max_notes_len: Self::MAX_NOTES_LEN,
        }
    }
}

/// How string keyed lookups (activity level, goal) treat a key they don't recognise.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    StrumDisplay,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LookupMode {
    /// Unknown keys are an error
    Strict,
    /// Unknown keys fall back to a default value
    #[default]
    Lenient,
}

/// A record persisted by the store, checked against the configured limits whenever it is
/// written or read back.
pub trait Record: Serialize + DeserializeOwned {
    fn check(&self, limits: &RecordLimits) -> Result<(), ValidationError>;
}

/// A closed set of string values a record field may take.
pub trait Choice: Sized + Copy + FromStr + IntoEnumIterator + AsRef<str> {
    /// Name of the record field holding this value, used in error messages
    const FIELD: &'static str;

    /// Parse `value`, failing with a [`ValidationError`] listing the accepted values.
    fn parse(value: &str) -> Result<Self, ValidationError> {
        Self::from_str(value).map_err(|_| {
            ValidationError::new(
                Self::FIELD,
                format!("{} must be one of {{{}}}", Self::FIELD, Self::choices()),
            )
        })
    }

    /// Comma separated list of the canonical spellings
    fn choices() -> String {
        Self::iter()
            .map(|c| c.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The current local wall clock time, the reference point for every record timestamp.
pub(crate) fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(
            field,
            format!("{field} must not be empty"),
        ));
    }

    Ok(())
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::new(
            field,
            format!("{field} must be a non-negative number"),
        ));
    }

    Ok(())
}

fn require_notes_len(notes: Option<&str>, max: usize) -> Result<(), ValidationError> {
    if let Some(notes) = notes
        && notes.chars().count() > max
    {
        return Err(ValidationError::new(
            "notes",
            format!("notes must be at most {max} characters"),
        ));
    }

    Ok(())
}

/// Convert a raw integer into a bounded `u32`, reporting `reason` on failure.
fn bounded_u32(
    field: &'static str,
    value: i64,
    min: u32,
    max: u32,
    reason: impl Display,
) -> Result<u32, ValidationError> {
    u32::try_from(value)
        .ok()
        .filter(|v| (min..=max).contains(v))
        .ok_or_else(|| ValidationError::new(field, reason.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_choice_error_lists_values() {
        let err = Intensity::parse("extreme").unwrap_err();

        assert_eq!(err.field(), "intensity");
        assert_eq!(err.reason(), "intensity must be one of {low, medium, high}");
    }

    #[test]
    fn test_choice_is_case_sensitive() {
        assert!(Gender::parse("Male").is_err());
        assert_eq!(Gender::parse("male").unwrap(), Gender::Male);
    }

    #[test]
    fn test_bounded_u32() {
        assert_eq!(bounded_u32("age", 30, 1, 150, "bad").unwrap(), 30);
        assert!(bounded_u32("age", 0, 1, 150, "bad").is_err());
        assert!(bounded_u32("age", -3, 1, 150, "bad").is_err());
        assert!(bounded_u32("age", 151, 1, 150, "bad").is_err());
    }

    #[test]
    fn test_lookup_mode_default_is_lenient() {
        assert_eq!(LookupMode::default(), LookupMode::Lenient);
    }
}
