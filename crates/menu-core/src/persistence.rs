//! # Persistence Adapter Boundary
//!
//! The engine persists a projection of its state through a plain key/value
//! interface and never learns what sits behind it.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  MenuStore::open ──► KeyValueStore::get(key) ──► PersistedMenu::decode  │
//! │                      (once, at startup)           → seed the catalog    │
//! │                                                                         │
//! │  commit / undo / redo / view change                                     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  CatalogObserver::on_commit(&Commit)                                    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  PersistenceHook ──► PersistedMenu::encode ──► KeyValueStore::set       │
//! │                      failures: warn! and move on (no retry, no undo)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Projection
//! `{ version, items, categories, combos, viewMode, sortBy, sortOrder }`.
//! Selection, history and the transient filters are never persisted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, Change};
use crate::error::{PersistenceError, PersistenceResult};
use crate::view::ViewSettings;

/// Version written into every projection.
pub const PERSISTED_FORMAT_VERSION: u32 = 1;

// =============================================================================
// Key/Value Boundary
// =============================================================================

/// A byte store addressed by string keys.
///
/// Calls are synchronous; an implementation that needs to queue writes
/// does so internally.
pub trait KeyValueStore {
    /// Reads the bytes stored under `key`, `None` if nothing is stored.
    fn get(&self, key: &str) -> PersistenceResult<Option<Vec<u8>>>;

    /// Replaces whatever is stored under `key`.
    fn set(&self, key: &str, value: &[u8]) -> PersistenceResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> PersistenceResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> PersistenceResult<()> {
        (**self).set(key, value)
    }
}

/// In-process key/value store.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> PersistenceResult<Option<Vec<u8>>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| PersistenceError::backend(key, "memory storage lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> PersistenceResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| PersistenceError::backend(key, "memory storage lock poisoned"))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

// =============================================================================
// Projection
// =============================================================================

/// The persisted shape of a `MenuStore`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedMenu {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(flatten)]
    pub catalog: Catalog,

    #[serde(flatten)]
    pub view: ViewSettings,
}

fn default_version() -> u32 {
    PERSISTED_FORMAT_VERSION
}

#[derive(Deserialize)]
struct VersionHeader {
    #[serde(default = "default_version")]
    version: u32,
}

impl PersistedMenu {
    pub fn new(catalog: Catalog, view: ViewSettings) -> Self {
        PersistedMenu {
            version: PERSISTED_FORMAT_VERSION,
            catalog,
            view,
        }
    }

    pub fn encode(&self) -> PersistenceResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes a projection, refusing one written by a newer format.
    pub fn decode(bytes: &[u8]) -> PersistenceResult<Self> {
        let header: VersionHeader = serde_json::from_slice(bytes)?;
        if header.version > PERSISTED_FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: header.version,
                supported: PERSISTED_FORMAT_VERSION,
            });
        }
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Reads and decodes the projection under `key`.
///
/// Anything short of a usable projection (nothing stored, backend error,
/// bad payload, newer version) yields `None`; the failures are logged.
pub fn load_projection<S>(storage: &S, key: &str) -> Option<PersistedMenu>
where
    S: KeyValueStore + ?Sized,
{
    let bytes = match storage.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            debug!(key = %key, "No persisted menu found");
            return None;
        }
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to read persisted menu; starting empty");
            return None;
        }
    };

    match PersistedMenu::decode(&bytes) {
        Ok(menu) => {
            info!(
                key = %key,
                items = menu.catalog.item_count(),
                categories = menu.catalog.category_count(),
                combos = menu.catalog.combo_count(),
                "Loaded persisted menu"
            );
            Some(menu)
        }
        Err(e) => {
            warn!(key = %key, error = %e, "Ignoring unreadable persisted menu; starting empty");
            None
        }
    }
}

// =============================================================================
// Observer Hook
// =============================================================================

/// What an observer sees after an externally visible change.
#[derive(Debug, Clone, Copy)]
pub struct Commit<'a> {
    pub changes: &'a [Change],
    pub catalog: &'a Catalog,
    pub view: ViewSettings,
}

impl Commit<'_> {
    /// The persistable projection of the committed state.
    pub fn projection(&self) -> PersistedMenu {
        PersistedMenu::new(self.catalog.clone(), self.view)
    }
}

/// Invoked by `MenuStore` after every commit that changed something.
pub trait CatalogObserver {
    fn on_commit(&mut self, commit: &Commit<'_>);
}

impl<F> CatalogObserver for F
where
    F: FnMut(&Commit<'_>),
{
    fn on_commit(&mut self, commit: &Commit<'_>) {
        self(commit)
    }
}

/// Writes the projection to a `KeyValueStore` after each commit.
#[derive(Debug)]
pub struct PersistenceHook<S> {
    storage: S,
    key: String,
    failures: u64,
}

impl<S: KeyValueStore> PersistenceHook<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        PersistenceHook {
            storage,
            key: key.into(),
            failures: 0,
        }
    }

    /// Writes that have failed since the hook was created.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    fn write(&self, commit: &Commit<'_>) -> PersistenceResult<usize> {
        let bytes = commit.projection().encode()?;
        self.storage.set(&self.key, &bytes)?;
        Ok(bytes.len())
    }
}

impl<S: KeyValueStore> CatalogObserver for PersistenceHook<S> {
    fn on_commit(&mut self, commit: &Commit<'_>) {
        match self.write(commit) {
            Ok(bytes) => {
                debug!(key = %self.key, bytes, changes = commit.changes.len(), "Persisted menu");
            }
            Err(e) => {
                self.failures += 1;
                warn!(key = %self.key, error = %e, "Failed to persist menu");
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Transaction;
    use crate::config::ReferencePolicy;
    use crate::types::{CategoryDraft, ItemDraft};
    use crate::view::{SortField, SortOrder, ViewMode};

    struct BrokenStorage;

    impl KeyValueStore for BrokenStorage {
        fn get(&self, key: &str) -> PersistenceResult<Option<Vec<u8>>> {
            Err(PersistenceError::backend(key, "disk on fire"))
        }

        fn set(&self, key: &str, _value: &[u8]) -> PersistenceResult<()> {
            Err(PersistenceError::backend(key, "disk on fire"))
        }
    }

    fn sample_catalog() -> Catalog {
        let mut tx = Transaction::begin(&Catalog::new(), ReferencePolicy::Lenient);
        let mains = tx.add_category(CategoryDraft::new("Mains")).unwrap();
        tx.add_item(ItemDraft::new("Curry", 1200).in_category(&mains))
            .unwrap();
        tx.finish().0
    }

    #[test]
    fn test_projection_field_names() {
        let view = ViewSettings {
            view_mode: ViewMode::List,
            sort_by: SortField::CreatedAt,
            sort_order: SortOrder::Desc,
        };
        let bytes = PersistedMenu::new(sample_catalog(), view).encode().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["version"], 1);
        assert_eq!(json["viewMode"], "list");
        assert_eq!(json["sortBy"], "createdAt");
        assert_eq!(json["sortOrder"], "desc");
        assert_eq!(json["items"][0]["name"], "Curry");
        assert_eq!(json["categories"][0]["itemCount"], 1);
        assert!(json["combos"].as_array().unwrap().is_empty());
        assert!(json.get("selection").is_none());
    }

    #[test]
    fn test_decode_restores_catalog() {
        let menu = PersistedMenu::new(sample_catalog(), ViewSettings::default());
        let decoded = PersistedMenu::decode(&menu.encode().unwrap()).unwrap();
        assert_eq!(decoded, menu);
    }

    #[test]
    fn test_decode_rejects_newer_version() {
        let err = PersistedMenu::decode(br#"{"version": 7, "items": []}"#).unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::UnsupportedVersion { found: 7, supported: 1 }
        ));
    }

    #[test]
    fn test_decode_fills_missing_fields() {
        let menu = PersistedMenu::decode(b"{}").unwrap();
        assert_eq!(menu.version, PERSISTED_FORMAT_VERSION);
        assert!(menu.catalog.is_empty());
        assert_eq!(menu.view, ViewSettings::default());
    }

    #[test]
    fn test_load_projection_tolerates_failures() {
        let storage = MemoryStorage::new();
        assert!(load_projection(&storage, "menu").is_none());

        storage.set("menu", b"not json").unwrap();
        assert!(load_projection(&storage, "menu").is_none());

        assert!(load_projection(&BrokenStorage, "menu").is_none());
    }

    #[test]
    fn test_hook_writes_projection() {
        let storage = Arc::new(MemoryStorage::new());
        let mut hook = PersistenceHook::new(Arc::clone(&storage), "menu");
        let catalog = sample_catalog();

        hook.on_commit(&Commit {
            changes: &[Change::CategoriesReordered],
            catalog: &catalog,
            view: ViewSettings::default(),
        });

        let loaded = load_projection(&storage, "menu").unwrap();
        assert_eq!(loaded.catalog, catalog);
        assert_eq!(hook.failures(), 0);
    }

    #[test]
    fn test_hook_counts_failures() {
        let mut hook = PersistenceHook::new(BrokenStorage, "menu");
        let catalog = Catalog::new();
        let commit = Commit {
            changes: &[],
            catalog: &catalog,
            view: ViewSettings::default(),
        };

        hook.on_commit(&commit);
        hook.on_commit(&commit);
        assert_eq!(hook.failures(), 2);
    }

    fn as_observer<F: FnMut(&Commit<'_>)>(f: F) -> F {
        f
    }

    #[test]
    fn test_closure_is_an_observer() {
        let mut seen = 0;
        {
            let mut observer = as_observer(|commit| seen += commit.changes.len());
            let catalog = Catalog::new();
            observer.on_commit(&Commit {
                changes: &[Change::ViewSettingsChanged, Change::HistoryRestored],
                catalog: &catalog,
                view: ViewSettings::default(),
            });
        }
        assert_eq!(seen, 2);
    }
}
