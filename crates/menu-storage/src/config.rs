//! # Application Configuration
//!
//! Loads `AppConfig` for the menu engine and its storage.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MENU_HISTORY_LIMIT=100                                             │
//! │     MENU_REFERENCE_POLICY=strict                                       │
//! │     MENU_STORAGE_KEY=restaurant-menu                                   │
//! │     MENU_DATA_DIR=/var/lib/menu                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/restaurant-menu/menu.toml (Linux)                        │
//! │     ~/Library/Application Support/com.restaurant.menu/menu.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     history_limit 50, lenient references, platform data dir            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # menu.toml
//! [engine]
//! history_limit = 50
//! reference_policy = "lenient"  # lenient | strict
//! storage_key = "restaurant-menu"
//!
//! [storage]
//! data_dir = "/var/lib/menu"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use menu_core::{EngineConfig, MenuStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{StorageError, StorageResult};
use crate::file::FileStorage;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "restaurant", "menu")
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Where persisted data lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory for `FileStorage`. Defaults to the platform data dir.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl StorageSettings {
    /// The configured directory, else the platform data directory, else
    /// `./data`.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("data"))
    }
}

// =============================================================================
// App Config
// =============================================================================

/// Complete configuration for a menu engine process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl AppConfig {
    /// Loads configuration from file (if present) and the environment.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Replace with `config_path`, or the platform `menu.toml`, if it exists
    /// 3. Apply `MENU_*` environment overrides
    /// 4. Validate
    pub fn load(config_path: Option<PathBuf>) -> StorageResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading menu config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Like `load`, falling back to defaults on any error.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load menu config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML file without environment overrides.
    pub fn from_file(path: &Path) -> StorageResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> StorageResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(StorageError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| StorageError::io(&path, e))?;

        info!(?path, "Menu config saved");
        Ok(path)
    }

    pub fn validate(&self) -> StorageResult<()> {
        self.engine.validate()?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(limit) = std::env::var("MENU_HISTORY_LIMIT") {
            match limit.parse::<usize>() {
                Ok(parsed) => {
                    debug!(history_limit = parsed, "Overriding history limit from environment");
                    self.engine.history_limit = parsed;
                }
                Err(_) => warn!(value = %limit, "Ignoring non-numeric MENU_HISTORY_LIMIT"),
            }
        }

        if let Ok(policy) = std::env::var("MENU_REFERENCE_POLICY") {
            match policy.parse() {
                Ok(parsed) => {
                    debug!(policy = %policy, "Overriding reference policy from environment");
                    self.engine.reference_policy = parsed;
                }
                Err(e) => warn!(error = %e, "Ignoring MENU_REFERENCE_POLICY"),
            }
        }

        if let Ok(key) = std::env::var("MENU_STORAGE_KEY") {
            self.engine.storage_key = key;
        }

        if let Ok(dir) = std::env::var("MENU_DATA_DIR") {
            debug!(data_dir = %dir, "Overriding data directory from environment");
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("menu.toml"))
    }

    /// File storage at the resolved data directory.
    pub fn file_storage(&self) -> FileStorage {
        FileStorage::new(self.storage.resolved_data_dir())
    }

    /// Opens a `MenuStore` persisted to `file_storage()`.
    pub fn open_store(&self) -> MenuStore {
        MenuStore::open(self.engine.clone(), self.file_storage())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menu_core::ReferencePolicy;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.engine.history_limit, 50);
        assert_eq!(config.engine.reference_policy, ReferencePolicy::Lenient);
        assert!(config.storage.data_dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_sections() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[engine]"));
        assert!(toml_str.contains("history_limit = 50"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("menu.toml");
        std::fs::write(&path, "[engine]\nreference_policy = \"strict\"\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert!(config.engine.reference_policy.is_strict());
        assert_eq!(config.engine.history_limit, 50);
        assert_eq!(config.engine.storage_key, "restaurant-menu");
    }

    #[test]
    fn test_save_then_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("conf/menu.toml");

        let mut config = AppConfig::default();
        config.engine.history_limit = 20;
        config.storage.data_dir = Some(temp_dir.path().join("data"));
        config.save(Some(path.clone())).unwrap();

        assert_eq!(AppConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("menu.toml");
        std::fs::write(&path, "[engine]\nhistory_limit = \"many\"\n").unwrap();

        assert!(matches!(
            AppConfig::from_file(&path),
            Err(StorageError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_validation_rejects_zero_history() {
        let mut config = AppConfig::default();
        config.engine.history_limit = 0;
        assert!(matches!(config.validate(), Err(StorageError::Config(_))));
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let settings = StorageSettings {
            data_dir: Some(PathBuf::from("/srv/menu")),
        };
        assert_eq!(settings.resolved_data_dir(), PathBuf::from("/srv/menu"));
    }

    #[test]
    fn test_open_store_uses_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.storage.data_dir = Some(temp_dir.path().to_path_buf());

        let mut store = config.open_store();
        store
            .add_item(menu_core::ItemDraft::new("Tea", 300))
            .unwrap();

        assert!(temp_dir.path().join("restaurant-menu.json").exists());
    }
}
