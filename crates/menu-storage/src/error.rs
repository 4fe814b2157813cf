//! # Storage Error Types
//!
//! Error types for file storage and configuration loading.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / toml errors                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StorageError (this module) ← Adds the path or key involved             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PersistenceError (menu-core) ← What the engine logs and moves past     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use menu_core::{ConfigError, PersistenceError};
use thiserror::Error;

/// Storage adapter errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing a file failed.
    ///
    /// ## When This Occurs
    /// - Data directory can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("I/O failed on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A key can't be mapped onto a file name.
    #[error("Invalid storage key '{0}': use letters, digits, '-', '_' or '.'")]
    InvalidKey(String),

    /// The config file isn't valid TOML for `AppConfig`.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The config couldn't be written as TOML.
    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Config values failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No config path given and no platform default available.
    #[error("No config path available")]
    NoConfigPath,
}

impl StorageError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<StorageError> for PersistenceError {
    fn from(err: StorageError) -> Self {
        let key = match &err {
            StorageError::Io { path, .. } => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
            StorageError::InvalidKey(key) => key.clone(),
            _ => String::new(),
        };
        PersistenceError::backend(key, err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_becomes_backend_error() {
        let err = StorageError::io(
            "/data/restaurant-menu.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        match PersistenceError::from(err) {
            PersistenceError::Backend { key, message } => {
                assert_eq!(key, "restaurant-menu");
                assert!(message.contains("denied"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_key_message() {
        let err = StorageError::InvalidKey("../etc".to_string());
        assert!(err.to_string().contains("../etc"));
    }
}
