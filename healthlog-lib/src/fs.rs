use std::{
    fs::create_dir_all,
    io::Write,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use xdg::BaseDirectories;

use crate::repository::{Error, Result};

/// Returns the path to the healthlog configuration directory. If it doesn't exist when this
/// function is called, it will be created.
pub fn config_dir() -> Result<PathBuf> {
    let path = xdg_prefix()
        .get_config_home()
        .ok_or(Error::NoHomeDirectory)?;

    create_dir_all(&path)?;

    Ok(path)
}

/// Returns the path to the healthlog data directory. If it doesn't exist when this function is
/// called, it will be created.
pub fn data_dir() -> Result<PathBuf> {
    let path = xdg_prefix()
        .get_data_home()
        .ok_or(Error::NoHomeDirectory)?;

    create_dir_all(&path)?;

    Ok(path)
}

/// Replace the contents of `path` with `contents`.
///
/// The bytes are written to a temporary file in the same directory and then renamed over the
/// target, so a reader never observes a half-written file.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;

    Ok(())
}

fn xdg_prefix() -> BaseDirectories {
    xdg::BaseDirectories::with_prefix("healthlog")
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;

    #[test]
    fn test_write_atomic_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workouts.json");

        write_atomic(&path, b"[1]").unwrap();
        write_atomic(&path, b"[]").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
        // Only the target remains, no stray temporary files
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
