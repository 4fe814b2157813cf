//! # menu-storage: Storage and Configuration Adapters
//!
//! This crate connects the pure `menu-core` engine to the file system.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Menu Engine Data Flow                            │
//! │                                                                         │
//! │  AppConfig::load (menu.toml + MENU_* env)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   menu-storage (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   AppConfig   │    │  FileStorage  │    │     seed     │  │   │
//! │  │   │  (config.rs)  │───►│   (file.rs)   │◄───│  (bin/seed)  │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │ KeyValueStore                  │   │
//! │  └────────────────────────────────┼────────────────────────────────┘   │
//! │                                   ▼                                     │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     Data Directory                              │   │
//! │  │   ~/.local/share/menu/restaurant-menu.json                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - `AppConfig` loading, saving and environment overrides
//! - [`file`] - `FileStorage`, one JSON file per key
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use menu_storage::AppConfig;
//!
//! let config = AppConfig::load_or_default(None);
//! let mut store = config.open_store();
//! store.add_category(CategoryDraft::new("Mains"))?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod file;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AppConfig, StorageSettings};
pub use error::{StorageError, StorageResult};
pub use file::FileStorage;
