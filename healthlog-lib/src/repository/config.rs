use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    fs::{config_dir, data_dir, write_atomic},
    records::{LookupMode, RecordLimits},
    repository::Result,
};

const CURRENT_CONFIG_VERSION: u16 = 1;
const FILE_NAME: &str = "core.toml";
/// Directory under the data home holding the user's record files
const USERS_DIR: &str = "users";

/// Handle to the library's core configuration
pub type Cfg = Arc<RwLock<CoreConfig>>;

/// The library's core configuration, serialized to TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub version: u16,
    /// Directory holding `current_user.json`, `workouts.json` and `nutrition.json`
    pub data_dir: PathBuf,
    /// What to do with unrecognised activity level and goal keys
    pub lookup: LookupMode,
    pub limits: RecordLimits,
}

impl CoreConfig {
    /// Load the configuration from the user's config directory, writing out the defaults if
    /// no configuration exists yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir()?.join(FILE_NAME))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            Ok(toml::from_str(&contents).unwrap_or_else(|err| {
                warn!(
                    "Ignoring malformed configuration {}: {err}",
                    path.display()
                );
                Self::default()
            }))
        } else {
            let cfg = Self::default();
            cfg.save_to(path)?;
            Ok(cfg)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        write_atomic(path, contents.as_bytes())
    }

    /// Default configuration storing its records in `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            data_dir: data_dir.into(),
            lookup: LookupMode::default(),
            limits: RecordLimits::default(),
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        let data_dir = data_dir()
            .map(|dir| dir.join(USERS_DIR))
            .unwrap_or_else(|_| PathBuf::from("data").join(USERS_DIR));

        Self::with_data_dir(data_dir)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(FILE_NAME);

        let cfg = CoreConfig::load_from(&path).unwrap();

        assert!(path.exists());
        assert_eq!(CoreConfig::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        let contents = r#"
data_dir = "/tmp/records"
lookup = "strict"

[limits]
max_duration_minutes = 300
"#;
        fs::write(&path, contents).unwrap();

        let cfg = CoreConfig::load_from(&path).unwrap();

        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/records"));
        assert_eq!(cfg.lookup, LookupMode::Strict);
        assert_eq!(cfg.limits.max_duration_minutes, 300);
        assert_eq!(cfg.limits.max_age, RecordLimits::MAX_AGE);
    }

    #[test]
    fn test_load_malformed_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        fs::write(&path, "lookup = [").unwrap();

        let cfg = CoreConfig::load_from(&path).unwrap();

        assert_eq!(cfg.lookup, LookupMode::Lenient);
    }
}
