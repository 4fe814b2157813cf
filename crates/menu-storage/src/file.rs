//! # File Storage
//!
//! A `KeyValueStore` that keeps each key in its own JSON file.
//!
//! ## Layout
//! ```text
//! <data_dir>/
//! ├── restaurant-menu.json        ← value for key "restaurant-menu"
//! └── restaurant-menu.json.tmp    ← only exists mid-write
//! ```
//!
//! Writes go to the `.tmp` sibling first and are renamed over the real file,
//! so a crash mid-write leaves the previous value intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use menu_core::{KeyValueStore, PersistenceResult};
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Directory-backed key/value store.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a key is stored in.
    ///
    /// Keys are restricted to a safe character set so they can never name a
    /// path outside `dir`.
    pub fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(path = %path.display(), bytes = bytes.len(), "Read stored value");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    fn write(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value).map_err(|e| StorageError::io(&temp_path, e))?;
        fs::rename(&temp_path, &path).map_err(|e| StorageError::io(&path, e))?;

        debug!(path = %path.display(), bytes = value.len(), "Wrote stored value");
        Ok(())
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> PersistenceResult<Option<Vec<u8>>> {
        Ok(self.read(key)?)
    }

    fn set(&self, key: &str, value: &[u8]) -> PersistenceResult<()> {
        Ok(self.write(key, value)?)
    }
}
