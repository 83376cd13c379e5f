//! Health metric calculations.
//!
//! Every function here is pure and deterministic. Inputs that violate a precondition produce a
//! [`CalcError`] rather than a sentinel value. Callers are expected to have validated their
//! inputs through [`crate::records`] already, so these errors indicate a caller bug.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::records::{ActivityLevel, Choice, Gender, Goal, LookupMode, Profile};

mod summary;

pub use summary::{NutritionSummary, WorkoutSummary, cutoff_days_ago, daily_calories_burned};

pub const PROTEIN_KCAL_PER_GRAM: f64 = 4.0;
pub const CARBS_KCAL_PER_GRAM: f64 = 4.0;
pub const FAT_KCAL_PER_GRAM: f64 = 9.0;

/// Multiplier used when an activity level key isn't recognised in lenient mode
pub const DEFAULT_ACTIVITY_LEVEL: ActivityLevel = ActivityLevel::Moderate;
/// Ratio set used when a goal key isn't recognised in lenient mode
pub const DEFAULT_GOAL: Goal = Goal::Maintain;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("height must be greater than zero, got {height_cm} cm")]
    DivisionByZero { height_cm: f64 },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unknown {kind} `{key}`")]
    UnknownKey { kind: &'static str, key: String },
}

pub type Result<T> = std::result::Result<T, CalcError>;

/// Body Mass Index: weight (kg) / height (m)².
///
/// The weight is not checked, a negative weight yields a negative BMI.
pub fn bmi(height_cm: f64, weight_kg: f64) -> Result<f64> {
    if height_cm.is_nan() || height_cm <= 0.0 {
        return Err(CalcError::DivisionByZero { height_cm });
    }

    let height_m = height_cm / 100.0;

    Ok(weight_kg / height_m.powi(2))
}

/// Basal Metabolic Rate in kcal/day, using the revised Harris-Benedict equation.
///
/// - Male: 88.362 + 13.397 × weight + 4.799 × height − 5.677 × age
/// - Female: 447.593 + 9.247 × weight + 3.098 × height − 4.330 × age
pub fn bmr(height_cm: f64, weight_kg: f64, age: u32, gender: Gender) -> Result<f64> {
    if !is_positive(height_cm) || !is_positive(weight_kg) || age == 0 {
        return Err(CalcError::InvalidArgument(
            "height, weight and age must be positive".into(),
        ));
    }

    let age = f64::from(age);

    Ok(match gender {
        Gender::Male => 88.362 + 13.397 * weight_kg + 4.799 * height_cm - 5.677 * age,
        Gender::Female => 447.593 + 9.247 * weight_kg + 3.098 * height_cm - 4.330 * age,
    })
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Total Daily Energy Expenditure: BMR scaled by the activity multiplier.
pub fn tdee(bmr: f64, activity_level: ActivityLevel) -> f64 {
    bmr * activity_level.multiplier()
}

/// [`tdee`] for a string keyed activity level, see [`resolve`].
pub fn tdee_for_key(bmr: f64, activity_level: &str, mode: LookupMode) -> Result<f64> {
    Ok(tdee(
        bmr,
        resolve(activity_level, mode, DEFAULT_ACTIVITY_LEVEL)?,
    ))
}

/// Look up a closed-set value by key.
///
/// In [`LookupMode::Lenient`] an unknown key resolves to `fallback`, in
/// [`LookupMode::Strict`] it is an error.
pub fn resolve<T: Choice>(key: &str, mode: LookupMode, fallback: T) -> Result<T> {
    match (T::parse(key), mode) {
        (Ok(value), _) => Ok(value),
        (Err(_), LookupMode::Lenient) => {
            debug!(
                "Unknown {} `{key}`, falling back to `{}`",
                T::FIELD,
                fallback.as_ref()
            );
            Ok(fallback)
        }
        (Err(_), LookupMode::Strict) => Err(CalcError::UnknownKey {
            kind: T::FIELD,
            key: key.to_string(),
        }),
    }
}

/// Share of calories given to each macronutrient. The three ratios sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroRatios {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroRatios {
    pub const fn for_goal(goal: Goal) -> Self {
        let (protein, carbs, fat) = match goal {
            Goal::Lose => (0.30, 0.35, 0.35),
            Goal::Gain | Goal::BuildMuscle => (0.25, 0.45, 0.30),
            Goal::Maintain | Goal::Health => (0.20, 0.50, 0.30),
        };

        Self {
            protein,
            carbs,
            fat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroShare {
    pub grams: f64,
    pub calories: f64,
}

impl MacroShare {
    fn new(calories: f64, kcal_per_gram: f64) -> Self {
        Self {
            grams: calories / kcal_per_gram,
            calories,
        }
    }
}

/// Target protein, carbohydrate and fat intake for a calorie budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Macros {
    pub protein: MacroShare,
    pub carbs: MacroShare,
    pub fat: MacroShare,
}

impl Macros {
    /// Sum of the calories of the three shares
    pub fn total_calories(&self) -> f64 {
        self.protein.calories + self.carbs.calories + self.fat.calories
    }
}

/// Split `calories` into macronutrients according to the ratio table of `goal`.
pub fn macros(calories: f64, goal: Goal) -> Result<Macros> {
    if !calories.is_finite() || calories < 0.0 {
        return Err(CalcError::InvalidArgument(
            "calories must be a non-negative number".into(),
        ));
    }

    let ratios = MacroRatios::for_goal(goal);

    Ok(Macros {
        protein: MacroShare::new(calories * ratios.protein, PROTEIN_KCAL_PER_GRAM),
        carbs: MacroShare::new(calories * ratios.carbs, CARBS_KCAL_PER_GRAM),
        fat: MacroShare::new(calories * ratios.fat, FAT_KCAL_PER_GRAM),
    })
}

/// [`macros`] for a string keyed goal, see [`resolve`].
pub fn macros_for_key(calories: f64, goal: &str, mode: LookupMode) -> Result<Macros> {
    macros(calories, resolve(goal, mode, DEFAULT_GOAL)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Underweight => "underweight",
            Self::Normal => "normal",
            Self::Overweight => "overweight",
            Self::Obese => "obese",
        }
    }

    /// A coloured marker suitable for display next to the label
    pub fn indicator(self) -> &'static str {
        match self {
            Self::Underweight => "🔵",
            Self::Normal => "🟢",
            Self::Overweight => "🟡",
            Self::Obese => "🔴",
        }
    }
}

pub fn bmi_category(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Weight range (kg) that keeps BMI within 18.5–24.9 for the given height.
pub fn ideal_weight_range(height_cm: f64) -> Result<(f64, f64)> {
    if !is_positive(height_cm) {
        return Err(CalcError::InvalidArgument(
            "height must be positive".into(),
        ));
    }

    let height_m_sq = (height_cm / 100.0).powi(2);

    Ok((18.5 * height_m_sq, 24.9 * height_m_sq))
}

/// Metabolic equivalent of an exercise, 4.0 when the exercise is unknown
pub fn met_value(exercise: &str) -> f64 {
    match exercise.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
        "walking" => 3.5,
        "running" => 8.0,
        "cycling" => 7.5,
        "swimming" => 8.0,
        "strength_training" | "weight_training" => 4.0,
        "jump_rope" => 12.3,
        "yoga" => 2.5,
        "aerobics" => 7.3,
        "tennis" => 7.3,
        "basketball" => 8.0,
        "soccer" => 7.0,
        "baseball" => 5.0,
        _ => 4.0,
    }
}

/// Estimated calories burned: MET × weight (kg) × duration (h).
pub fn estimate_calories_burned(exercise: &str, weight_kg: f64, minutes: u32) -> Result<f64> {
    if !is_positive(weight_kg) {
        return Err(CalcError::InvalidArgument(
            "weight must be positive".into(),
        ));
    }

    Ok(met_value(exercise) * weight_kg * (f64::from(minutes) / 60.0))
}

/// Daily calorie target: a 300 kcal deficit to lose weight, a 300 kcal surplus to gain.
pub fn target_calories(tdee: f64, goal: Goal) -> f64 {
    match goal {
        Goal::Lose => tdee - 300.0,
        Goal::Gain | Goal::BuildMuscle => tdee + 300.0,
        Goal::Maintain | Goal::Health => tdee,
    }
}

/// Recommended daily protein intake in grams.
pub fn protein_requirement(weight_kg: f64, goal: Goal, activity_level: ActivityLevel) -> f64 {
    let grams_per_kg = match (goal, activity_level) {
        (Goal::Gain | Goal::BuildMuscle, _)
        | (_, ActivityLevel::Active | ActivityLevel::VeryActive) => 2.0,
        (Goal::Lose, _) => 1.8,
        _ => 1.4,
    };

    weight_kg * grams_per_kg
}

/// Every metric derivable from a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthStats {
    pub bmi: f64,
    pub bmi_category: BmiCategory,
    pub bmr: f64,
    pub tdee: f64,
    pub target_calories: f64,
    pub protein_requirement_g: f64,
    pub macros: Macros,
    pub ideal_weight_kg: (f64, f64),
}

impl HealthStats {
    pub fn for_profile(profile: &Profile) -> Result<Self> {
        let bmi = bmi(profile.height_cm(), profile.weight_kg())?;
        let bmr = bmr(
            profile.height_cm(),
            profile.weight_kg(),
            profile.age(),
            profile.gender(),
        )?;
        let tdee = tdee(bmr, profile.activity_level());
        let target_calories = target_calories(tdee, profile.goal());

        Ok(Self {
            bmi,
            bmi_category: bmi_category(bmi),
            bmr,
            tdee,
            target_calories,
            protein_requirement_g: protein_requirement(
                profile.weight_kg(),
                profile.goal(),
                profile.activity_level(),
            ),
            macros: macros(target_calories.max(0.0), profile.goal())?,
            ideal_weight_kg: ideal_weight_range(profile.height_cm())?,
        })
    }
}
