use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::records::{FoodTotals, Intensity, NutritionRecord, WorkoutRecord, now};

/// The point in time `days` days before now.
pub fn cutoff_days_ago(days: u32) -> NaiveDateTime {
    now() - Duration::days(i64::from(days))
}

/// Training totals over the workouts logged at or after a cutoff.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct WorkoutSummary {
    pub sessions: usize,
    pub total_minutes: u64,
    pub total_calories: u64,
    /// The intensity logged most often. Ties go to the lower intensity.
    pub most_common_intensity: Option<Intensity>,
}

impl WorkoutSummary {
    pub fn since(records: &[WorkoutRecord], cutoff: NaiveDateTime) -> Self {
        let recent: Vec<&WorkoutRecord> = records.iter().filter(|r| r.date() >= cutoff).collect();

        let mut most_common_intensity = None;
        let mut best = 0;
        for intensity in Intensity::iter() {
            let count = recent
                .iter()
                .filter(|r| r.intensity() == intensity)
                .count();
            if count > best {
                best = count;
                most_common_intensity = Some(intensity);
            }
        }

        Self {
            sessions: recent.len(),
            total_minutes: recent
                .iter()
                .map(|r| u64::from(r.duration_minutes()))
                .sum(),
            total_calories: recent.iter().map(|r| u64::from(r.calories())).sum(),
            most_common_intensity,
        }
    }
}

/// Calories burned per calendar day.
pub fn daily_calories_burned(records: &[WorkoutRecord]) -> BTreeMap<NaiveDate, u64> {
    let mut days = BTreeMap::new();
    for record in records {
        *days.entry(record.date().date()).or_default() += u64::from(record.calories());
    }

    days
}

/// Intake totals over the meals logged at or after a cutoff.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct NutritionSummary {
    pub meals: usize,
    pub total_calories: f64,
    pub daily_calories: BTreeMap<NaiveDate, f64>,
    /// Summed from the individual foods, so may differ from `total_calories`
    pub foods: FoodTotals,
}

impl NutritionSummary {
    pub fn since(records: &[NutritionRecord], cutoff: NaiveDateTime) -> Self {
        records
            .iter()
            .filter(|r| r.date() >= cutoff)
            .fold(Self::default(), |mut summary, record| {
                summary.meals += 1;
                summary.total_calories += record.total_calories();
                *summary
                    .daily_calories
                    .entry(record.date().date())
                    .or_default() += record.total_calories();
                summary.foods = summary.foods + record.food_totals();
                summary
            })
    }
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;

    use super::*;
    use crate::records::{FoodItem, MealType};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn workout(day: u32, minutes: u32, calories: u32, intensity: Intensity) -> WorkoutRecord {
        WorkoutRecord::new(at(day, 7), "running", minutes, calories, intensity, None).unwrap()
    }

    #[test]
    fn test_workout_summary() {
        let records = [
            workout(1, 60, 600, Intensity::High),
            workout(5, 30, 300, Intensity::Medium),
            workout(6, 45, 350, Intensity::Medium),
            workout(7, 20, 100, Intensity::Low),
        ];

        let summary = WorkoutSummary::since(&records, at(5, 0));

        assert_eq!(summary.sessions, 3);
        assert_eq!(summary.total_minutes, 95);
        assert_eq!(summary.total_calories, 750);
        assert_eq!(summary.most_common_intensity, Some(Intensity::Medium));
    }

    #[test]
    fn test_workout_summary_tie_and_empty() {
        let records = [
            workout(1, 60, 600, Intensity::High),
            workout(2, 30, 300, Intensity::Low),
        ];

        let summary = WorkoutSummary::since(&records, at(1, 0));
        assert_eq!(summary.most_common_intensity, Some(Intensity::Low));

        assert_eq!(
            WorkoutSummary::since(&records, at(20, 0)),
            WorkoutSummary::default()
        );
    }

    #[test]
    fn test_daily_calories_burned() {
        let mut records = vec![
            workout(1, 60, 600, Intensity::High),
            workout(1, 30, 150, Intensity::Low),
        ];
        records.push(workout(3, 30, 300, Intensity::Medium));

        let days = daily_calories_burned(&records);

        assert_eq!(days.len(), 2);
        assert_eq!(days.get(&at(1, 0).date()), Some(&750));
        assert_eq!(days.get(&at(3, 0).date()), Some(&300));
    }

    #[test]
    fn test_nutrition_summary() {
        let bread = FoodItem::new("bread", 200.0, 8.0, 40.0, 2.0).unwrap();
        let rice = FoodItem::new("rice", 300.0, 6.0, 65.0, 1.0).unwrap();
        let records = [
            NutritionRecord::new(at(1, 8), MealType::Breakfast, vec![bread.clone()], 200.0, None)
                .unwrap(),
            NutritionRecord::new(at(2, 8), MealType::Breakfast, vec![bread], 210.0, None).unwrap(),
            NutritionRecord::new(at(2, 12), MealType::Lunch, vec![rice], 300.0, None).unwrap(),
        ];

        let summary = NutritionSummary::since(&records, at(2, 0));

        assert_eq!(summary.meals, 2);
        assert_eq!(summary.total_calories, 510.0);
        assert_eq!(summary.daily_calories.get(&at(2, 0).date()), Some(&510.0));
        assert_eq!(summary.foods.calories, 500.0);
        assert_eq!(summary.foods.carbs, 105.0);
    }
}
