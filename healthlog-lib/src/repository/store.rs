//! Whole-file JSON persistence.
//!
//! Each category of records lives in its own file holding a JSON array in insertion order.
//! Every mutation reads the full array, modifies it in memory and rewrites the whole file.
//! A file that fails to parse is moved aside and replaced by an empty array.
//!
//! Entries are checked against the caller's [`RecordLimits`] on every read, the same limits
//! used when they were written.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Serialize;
use serde_json::Value;
use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::{debug, info, warn};

use crate::{
    fs::write_atomic,
    records::{Profile, Record, RecordLimits},
    repository::{Error, Result},
};

pub const PROFILE_FILE: &str = "current_user.json";
const CORRUPT_SUFFIX: &str = "corrupt";

/// A collection of records persisted together in one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Workouts,
    Nutrition,
}

impl Category {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Workouts => "workouts.json",
            Self::Nutrition => "nutrition.json",
        }
    }
}

/// A category file that failed to parse and was reset to an empty collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovery {
    pub category: Category,
    /// Where the unreadable contents were moved
    pub backup: PathBuf,
    /// Size of the discarded contents
    pub discarded_bytes: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct Store {
    dir: PathBuf,
}

impl Store {
    /// Open the store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;

        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, category: Category) -> PathBuf {
        self.dir.join(category.file_name())
    }

    /// Make sure every category file exists and holds a JSON array, recovering corrupt files.
    ///
    /// Valid files are left untouched, so calling this repeatedly is harmless.
    pub fn ensure_initialized(&self) -> Result<Vec<Recovery>> {
        let mut recoveries = Vec::new();

        for category in Category::iter() {
            let path = self.path(category);

            if !path.exists() {
                self.write_entries(category, &[])?;
                info!("Created {}", path.display());
                continue;
            }

            if is_blank(&fs::read(&path)?) {
                self.write_entries(category, &[])?;
                info!("Reset blank {} to an empty collection", path.display());
                continue;
            }

            let (_, recovery) = self.read_entries(category)?;
            recoveries.extend(recovery);
        }

        Ok(recoveries)
    }

    /// Read the raw entries of a category.
    ///
    /// A missing or blank file reads as an empty collection, left as is until the next write or
    /// [`Store::ensure_initialized`]. A file that isn't a JSON array is backed up and reset.
    pub fn read_entries(&self, category: Category) -> Result<(Vec<Value>, Option<Recovery>)> {
        let path = self.path(category);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok((Vec::new(), None)),
            Err(err) => return Err(err.into()),
        };

        if is_blank(&bytes) {
            return Ok((Vec::new(), None));
        }

        match serde_json::from_slice::<Vec<Value>>(&bytes) {
            Ok(entries) => Ok((entries, None)),
            Err(err) => {
                warn!("Failed to parse {}: {err}", path.display());
                let recovery = self.recover(category, bytes.len())?;
                Ok((Vec::new(), Some(recovery)))
            }
        }
    }

    /// Move a corrupt category file aside and replace it with an empty collection.
    fn recover(&self, category: Category, discarded_bytes: usize) -> Result<Recovery> {
        let path = self.path(category);
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S-%6f");
        let backup = self.dir.join(format!(
            "{}.{timestamp}.{CORRUPT_SUFFIX}",
            category.file_name()
        ));

        fs::rename(&path, &backup)?;
        self.write_entries(category, &[])?;

        warn!(
            "Reset {} to an empty collection, discarded {discarded_bytes} bytes backed up to {}",
            path.display(),
            backup.display()
        );

        Ok(Recovery {
            category,
            backup,
            discarded_bytes,
        })
    }

    pub fn write_entries(&self, category: Category, entries: &[Value]) -> Result<()> {
        let contents = serde_json::to_vec_pretty(entries)?;
        write_atomic(&self.path(category), &contents)
    }

    /// Parse every entry of a category, skipping the ones that don't parse or break `limits`.
    pub fn load<T: Record>(&self, category: Category, limits: &RecordLimits) -> Result<Vec<T>> {
        let (entries, _) = self.read_entries(category)?;

        Ok(entries
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                parse_entry(entry, limits)
                    .inspect_err(|err| {
                        warn!("Skipping unreadable {category} entry at {position}: {err}")
                    })
                    .ok()
            })
            .collect())
    }

    /// Append a record to the end of a category.
    pub fn append<T: Serialize>(&self, category: Category, record: &T) -> Result<()> {
        let (mut entries, _) = self.read_entries(category)?;
        entries.push(serde_json::to_value(record)?);
        self.write_entries(category, &entries)?;

        debug!("Saved {category} entry, {} stored", entries.len());

        Ok(())
    }

    /// Remove the record at `index`, counted over the entries that [`Store::load`] returns.
    ///
    /// Entries that fail to parse as `T` are invisible to callers, so they are skipped when
    /// counting but kept in the file.
    pub fn remove<T: Record>(
        &self,
        category: Category,
        index: usize,
        limits: &RecordLimits,
    ) -> Result<Value> {
        let (mut entries, _) = self.read_entries(category)?;

        let visible: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| parse_entry::<T>(entry, limits).is_ok())
            .map(|(position, _)| position)
            .collect();

        let position = *visible.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: visible.len(),
        })?;

        let removed = entries.remove(position);
        self.write_entries(category, &entries)?;

        debug!("Deleted {category} entry at index {index}");

        Ok(removed)
    }

    pub fn clear(&self, category: Category) -> Result<()> {
        self.write_entries(category, &[])?;

        debug!("Cleared {category}");

        Ok(())
    }

    fn profile_path(&self) -> PathBuf {
        self.dir.join(PROFILE_FILE)
    }

    /// Read the current profile. A missing file, or one that doesn't hold a profile valid under
    /// `limits`, reads as no profile.
    pub fn read_profile(&self, limits: &RecordLimits) -> Result<Option<Profile>> {
        let path = self.profile_path();

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let profile = serde_json::from_slice::<Value>(&bytes)
            .map_err(Error::from)
            .and_then(|value| parse_entry::<Profile>(&value, limits));

        Ok(profile
            .inspect_err(|err| warn!("Ignoring unreadable profile {}: {err}", path.display()))
            .ok())
    }

    pub fn write_profile(&self, profile: &Profile) -> Result<()> {
        let contents = serde_json::to_vec_pretty(profile)?;
        write_atomic(&self.profile_path(), &contents)?;

        debug!("Saved profile: {}", profile.name());

        Ok(())
    }

    /// Delete the current profile, returning whether there was one.
    pub fn remove_profile(&self) -> Result<bool> {
        match fs::remove_file(self.profile_path()) {
            Ok(()) => {
                debug!("Removed profile");
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

fn parse_entry<T: Record>(entry: &Value, limits: &RecordLimits) -> Result<T> {
    let record = T::deserialize(entry)?;
    record.check(limits)?;

    Ok(record)
}
