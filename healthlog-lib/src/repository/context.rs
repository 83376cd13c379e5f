use serde::Serialize;

use crate::records::{NutritionRecord, Profile, WorkoutRecord};

/// The payload handed to an advice service: the profile plus the most recent records.
///
/// Serializes to flat maps only, so the receiving side needs no knowledge of these types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdviceContext {
    pub profile: Profile,
    pub workouts: Vec<WorkoutRecord>,
    pub nutrition: Vec<NutritionRecord>,
}

impl AdviceContext {
    /// Keep at most `window` of the latest records of each kind, oldest first.
    pub fn build(
        profile: Profile,
        mut workouts: Vec<WorkoutRecord>,
        mut nutrition: Vec<NutritionRecord>,
        window: usize,
    ) -> Self {
        workouts.sort_by_key(WorkoutRecord::date);
        nutrition.sort_by_key(NutritionRecord::date);

        Self {
            profile,
            workouts: latest(workouts, window),
            nutrition: latest(nutrition, window),
        }
    }
}

fn latest<T>(mut records: Vec<T>, window: usize) -> Vec<T> {
    records.split_off(records.len().saturating_sub(window))
}
