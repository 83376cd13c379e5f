use chrono::NaiveDateTime;
use derive_more::Add;
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::records::{
    Choice, Record, RecordLimits, ValidationError, now, require_non_empty, require_non_negative,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    #[strum(to_string = "breakfast")]
    Breakfast,
    #[strum(to_string = "lunch")]
    Lunch,
    #[strum(to_string = "dinner")]
    Dinner,
    #[strum(to_string = "snack")]
    Snack,
    #[serde(rename = "late-snack")]
    #[strum(to_string = "late-snack")]
    LateSnack,
}

impl Choice for MealType {
    const FIELD: &'static str = "meal_type";
}

/// One food eaten as part of a meal, with its energy and macronutrient content.
#[derive(Debug, Clone, PartialEq, CopyGetters, Getters, Serialize, Deserialize)]
#[serde(try_from = "FoodEntry")]
pub struct FoodItem {
    #[getset(get = "pub")]
    name: String,
    #[getset(get_copy = "pub")]
    calories: f64,
    #[getset(get_copy = "pub")]
    protein: f64,
    #[getset(get_copy = "pub")]
    carbs: f64,
    #[getset(get_copy = "pub")]
    fat: f64,
}

impl FoodItem {
    pub fn new(
        name: &str,
        calories: f64,
        protein: f64,
        carbs: f64,
        fat: f64,
    ) -> Result<Self, ValidationError> {
        let item = Self {
            name: name.to_string(),
            calories,
            protein,
            carbs,
            fat,
        };

        item.validate()?;

        Ok(item)
    }

    /// Build a food item from a loosely typed key/value map.
    ///
    /// `name` is required. The numeric fields may be numbers or numeric strings, a missing one
    /// counts as zero. Any other keys are ignored.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ValidationError> {
        let name = match map.get("name") {
            Some(Value::String(name)) => name.as_str(),
            _ => return Err(ValidationError::new("name", "name must be a string")),
        };

        Self::new(
            name,
            number_field(map, "calories")?,
            number_field(map, "protein")?,
            number_field(map, "carbs")?,
            number_field(map, "fat")?,
        )
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("name", &self.name)?;
        require_non_negative("calories", self.calories)?;
        require_non_negative("protein", self.protein)?;
        require_non_negative("carbs", self.carbs)?;
        require_non_negative("fat", self.fat)
    }
}

fn number_field(map: &Map<String, Value>, field: &'static str) -> Result<f64, ValidationError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ValidationError::new(field, format!("{field} must be a number"))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| ValidationError::new(field, format!("{field} must be a number"))),
        Some(_) => Err(ValidationError::new(
            field,
            format!("{field} must be a number"),
        )),
    }
}

/// The two shapes a stored food entry may take. Both are normalized into a [`FoodItem`] at
/// the deserialization boundary.
#[derive(Deserialize)]
#[serde(untagged)]
enum FoodEntry {
    Structured(StructuredFood),
    Loose(Map<String, Value>),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StructuredFood {
    name: String,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
}

impl TryFrom<FoodEntry> for FoodItem {
    type Error = ValidationError;

    fn try_from(entry: FoodEntry) -> Result<Self, Self::Error> {
        match entry {
            FoodEntry::Structured(food) => {
                Self::new(&food.name, food.calories, food.protein, food.carbs, food.fat)
            }
            FoodEntry::Loose(map) => Self::from_map(&map),
        }
    }
}

/// Summed energy and macronutrients over a collection of foods.
#[derive(Debug, Default, Clone, Copy, PartialEq, Add, Serialize)]
pub struct FoodTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl From<&FoodItem> for FoodTotals {
    fn from(item: &FoodItem) -> Self {
        Self {
            calories: item.calories,
            protein: item.protein,
            carbs: item.carbs,
            fat: item.fat,
        }
    }
}

/// A meal eaten at a given time.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters, Serialize, Deserialize)]
#[serde(try_from = "RawNutritionRecord")]
pub struct NutritionRecord {
    #[getset(get_copy = "pub")]
    date: NaiveDateTime,
    #[getset(get_copy = "pub")]
    meal_type: MealType,
    #[getset(get = "pub")]
    foods: Vec<FoodItem>,
    #[getset(get_copy = "pub")]
    total_calories: f64,
    #[getset(get = "pub")]
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

impl NutritionRecord {
    /// Create a new record. `foods` may be empty here, though such a record can't be stored.
    pub fn new(
        date: NaiveDateTime,
        meal_type: MealType,
        foods: Vec<FoodItem>,
        total_calories: f64,
        notes: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let record = Self {
            date,
            meal_type,
            foods,
            total_calories,
            notes: notes.map(str::to_string),
        };

        record.validate()?;

        Ok(record)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.date > now() {
            return Err(ValidationError::new(
                "date",
                "date must not be in the future",
            ));
        }

        require_non_negative("total_calories", self.total_calories)?;

        self.foods.iter().try_for_each(FoodItem::validate)
    }

    /// Sum of the energy and macronutrients of every food in this meal
    pub fn food_totals(&self) -> FoodTotals {
        self.foods
            .iter()
            .map(FoodTotals::from)
            .fold(FoodTotals::default(), |acc, item| acc + item)
    }
}

impl Record for NutritionRecord {
    /// Meals have no configurable limits, only their own invariants.
    fn check(&self, _limits: &RecordLimits) -> Result<(), ValidationError> {
        self.validate()
    }
}

#[derive(Deserialize)]
struct RawNutritionRecord {
    date: NaiveDateTime,
    meal_type: String,
    #[serde(default)]
    foods: Vec<FoodItem>,
    total_calories: f64,
    #[serde(default)]
    notes: Option<String>,
}

impl TryFrom<RawNutritionRecord> for NutritionRecord {
    type Error = ValidationError;

    fn try_from(raw: RawNutritionRecord) -> Result<Self, Self::Error> {
        let record = Self {
            date: raw.date,
            meal_type: MealType::parse(&raw.meal_type)?,
            foods: raw.foods,
            total_calories: raw.total_calories,
            notes: raw.notes,
        };

        record.validate()?;

        Ok(record)
    }
}

#[cfg(test)]
mod test {
    use chrono::{Duration, NaiveDate};
    use serde_json::json;

    use super::*;

    fn date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn bread() -> FoodItem {
        FoodItem::new("bread", 200.0, 8.0, 40.0, 2.0).unwrap()
    }

    #[test]
    fn test_food_item_rejects_negative() {
        let err = FoodItem::new("bread", 200.0, -1.0, 40.0, 2.0).unwrap_err();
        assert_eq!(err.field(), "protein");

        let err = FoodItem::new("", 200.0, 1.0, 40.0, 2.0).unwrap_err();
        assert_eq!(err.field(), "name");
    }

    #[test]
    fn test_loose_and_structured_foods_normalize() {
        let structured: FoodItem = serde_json::from_value(json!({
            "name": "rice", "calories": 300.0, "protein": 6.0, "carbs": 65.0, "fat": 1.0
        }))
        .unwrap();
        let loose: FoodItem = serde_json::from_value(json!({
            "name": "rice", "calories": "300", "protein": 6, "carbs": "65.0", "fat": 1.0,
            "source": "label"
        }))
        .unwrap();

        assert_eq!(structured, loose);
        assert_eq!(
            serde_json::to_value(&loose).unwrap(),
            json!({"name": "rice", "calories": 300.0, "protein": 6.0, "carbs": 65.0, "fat": 1.0})
        );
    }

    #[test]
    fn test_loose_food_missing_macros_count_as_zero() {
        let food: FoodItem = serde_json::from_value(json!({"name": "tea"})).unwrap();

        assert_eq!(food.calories(), 0.0);
        assert_eq!(food.fat(), 0.0);
    }

    #[test]
    fn test_loose_food_requires_name() {
        assert!(serde_json::from_value::<FoodItem>(json!({"calories": 10})).is_err());
        assert!(serde_json::from_value::<FoodItem>(json!({"name": "x", "fat": "lots"})).is_err());
    }

    #[test]
    fn test_new_allows_empty_foods() {
        let record = NutritionRecord::new(date(), MealType::Snack, vec![], 0.0, None).unwrap();
        assert!(record.foods().is_empty());
    }

    #[test]
    fn test_future_date_rejected() {
        let tomorrow = now() + Duration::days(1);
        let err = NutritionRecord::new(tomorrow, MealType::Dinner, vec![bread()], 200.0, None)
            .unwrap_err();

        assert_eq!(err.field(), "date");
    }

    #[test]
    fn test_negative_total_rejected() {
        let err = NutritionRecord::new(date(), MealType::Lunch, vec![bread()], -5.0, None)
            .unwrap_err();

        assert_eq!(err.field(), "total_calories");
    }

    #[test]
    fn test_late_snack_spelling() {
        assert_eq!(MealType::parse("late-snack").unwrap(), MealType::LateSnack);
        assert!(MealType::parse("late_snack").is_err());
        assert_eq!(
            serde_json::to_value(MealType::LateSnack).unwrap(),
            json!("late-snack")
        );
    }

    #[test]
    fn test_food_totals() {
        let rice = FoodItem::new("rice", 300.0, 6.0, 65.0, 1.0).unwrap();
        let record =
            NutritionRecord::new(date(), MealType::Lunch, vec![bread(), rice], 500.0, None)
                .unwrap();

        let totals = record.food_totals();

        assert_eq!(totals.calories, 500.0);
        assert_eq!(totals.protein, 14.0);
        assert_eq!(totals.carbs, 105.0);
        assert_eq!(totals.fat, 3.0);
    }

    #[test]
    fn test_round_trip() {
        let record = NutritionRecord::new(
            date(),
            MealType::Breakfast,
            vec![bread()],
            200.0,
            Some("toast"),
        )
        .unwrap();

        let json = serde_json::to_string(&record).unwrap();

        assert_eq!(
            serde_json::from_str::<NutritionRecord>(&json).unwrap(),
            record
        );
    }
}
