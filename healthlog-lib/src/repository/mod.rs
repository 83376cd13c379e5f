use std::{path::Path, sync::Arc};

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    metrics::HealthStats,
    records::{NutritionRecord, Profile, Record, RecordLimits, ValidationError, WorkoutRecord},
    repository::{
        config::{Cfg, CoreConfig},
        store::Store,
    },
};

mod context;
mod store;

pub mod config;

pub use context::AdviceContext;
pub use store::{Category, PROFILE_FILE, Recovery};

pub type Result<T> = std::result::Result<T, Error>;

/// Failure to read or write the record store.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to serialize configuration: {0}")]
    Config(#[from] toml::ser::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("No record at index {index}, there are {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Record can't be stored: {0}")]
    NotStorable(&'static str),
    #[error("Unable to locate the home directory")]
    NoHomeDirectory,
}

/// Central access point for all persistent data.
///
/// The [`Repository`] owns the record store and the configuration it was opened with. It is
/// the explicit application context: create one at startup and pass it by reference to
/// whatever needs the user's data.
#[derive(Clone, Debug)]
pub struct Repository {
    store: Store,
    cfg: Cfg,
}

impl Repository {
    /// Open the repository described by the user's configuration file.
    pub fn new() -> Result<Self> {
        Self::open(CoreConfig::load()?)
    }

    /// Open a repository with an explicit configuration, initializing its files.
    pub fn open(cfg: CoreConfig) -> Result<Self> {
        let repo = Self {
            store: Store::open(&cfg.data_dir)?,
            cfg: Arc::new(RwLock::new(cfg)),
        };

        repo.ensure_initialized()?;

        Ok(repo)
    }

    pub fn data_dir(&self) -> &Path {
        self.store.dir()
    }

    pub fn config(&self) -> Cfg {
        self.cfg.clone()
    }

    /// The record limits currently configured, applied on every read and write
    pub fn limits(&self) -> RecordLimits {
        self.cfg.read().limits
    }

    /// Create missing category files and reset corrupt ones. Every recovered file is logged and
    /// returned.
    pub fn ensure_initialized(&self) -> Result<Vec<Recovery>> {
        let recoveries = self.store.ensure_initialized()?;

        for recovery in &recoveries {
            warn!(
                "Recovered corrupt {} file, backup at {}",
                recovery.category,
                recovery.backup.display()
            );
        }

        Ok(recoveries)
    }

    // Profile

    /// Store `profile` as the current profile, replacing any existing one. Returns the profile
    /// as stored, with `updated_at` set to now.
    pub fn save_profile(&self, profile: &Profile) -> Result<Profile> {
        if profile.name().trim().is_empty() {
            return Err(Error::NotStorable("the profile has no name"));
        }
        if profile.age() == 0 {
            return Err(Error::NotStorable("the profile age must be positive"));
        }
        profile.check(&self.limits())?;

        let mut profile = profile.clone();
        profile.touch();

        self.store.write_profile(&profile)?;

        Ok(profile)
    }

    /// The current profile, if one has been saved and is still valid
    pub fn load_profile(&self) -> Result<Option<Profile>> {
        self.store.read_profile(&self.limits())
    }

    /// Delete the current profile, returning whether there was one.
    pub fn delete_profile(&self) -> Result<bool> {
        self.store.remove_profile()
    }

    // Workouts

    pub fn save_workout(&self, record: &WorkoutRecord) -> Result<()> {
        record.check(&self.limits())?;

        self.store.append(Category::Workouts, record)
    }

    /// Every stored workout in insertion order. Entries that can't be read are skipped.
    pub fn load_workouts(&self) -> Result<Vec<WorkoutRecord>> {
        self.store.load(Category::Workouts, &self.limits())
    }

    /// Delete the workout at `index` in the order returned by [`Repository::load_workouts`].
    pub fn delete_workout(&self, index: usize) -> Result<()> {
        let removed = self
            .store
            .remove::<WorkoutRecord>(Category::Workouts, index, &self.limits())?;

        debug!(
            "Deleted workout: {}",
            removed
                .get("exercise")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
        );

        Ok(())
    }

    // Nutrition

    /// Store a meal. Beyond being a valid record it must list at least one food.
    pub fn save_nutrition(&self, record: &NutritionRecord) -> Result<()> {
        if record.foods().is_empty() {
            return Err(Error::NotStorable("a meal must contain at least one food"));
        }
        record.check(&self.limits())?;

        self.store.append(Category::Nutrition, record)
    }

    /// Every stored meal in insertion order. Entries that can't be read are skipped.
    pub fn load_nutrition(&self) -> Result<Vec<NutritionRecord>> {
        self.store.load(Category::Nutrition, &self.limits())
    }

    /// Delete the meal at `index` in the order returned by [`Repository::load_nutrition`].
    pub fn delete_nutrition(&self, index: usize) -> Result<()> {
        let removed = self
            .store
            .remove::<NutritionRecord>(Category::Nutrition, index, &self.limits())?;

        debug!(
            "Deleted nutrition record: {}",
            removed
                .get("meal_type")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
        );

        Ok(())
    }

    /// Reset every record collection to empty. The profile is kept.
    pub fn clear_all_data(&self) -> Result<()> {
        for category in [Category::Workouts, Category::Nutrition] {
            self.store.clear(category)?;
        }

        Ok(())
    }

    // Derived data

    /// Health metrics for the current profile, if there is one.
    pub fn health_stats(&self) -> crate::Result<Option<HealthStats>> {
        Ok(self
            .load_profile()?
            .map(|profile| HealthStats::for_profile(&profile))
            .transpose()?)
    }

    /// Context for an advice request: the current profile and the `window` latest records of
    /// each kind. `None` when there is no profile.
    pub fn advice_context(&self, window: usize) -> Result<Option<AdviceContext>> {
        let Some(profile) = self.load_profile()? else {
            return Ok(None);
        };

        Ok(Some(AdviceContext::build(
            profile,
            self.load_workouts()?,
            self.load_nutrition()?,
            window,
        )))
    }

    #[cfg(test)]
    /// Return a [`Repository`] backed by a fresh temporary directory. The directory is removed
    /// when the returned [`tempfile::TempDir`] is dropped.
    pub(crate) fn mock() -> (Self, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("failed to create a temporary directory");
        let repo = Self::open(CoreConfig::with_data_dir(dir.path()))
            .expect("failed to open a temporary repository");

        (repo, dir)
    }
}
