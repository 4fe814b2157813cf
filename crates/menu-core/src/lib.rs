//! # menu-core: Catalog State Engine for the Restaurant Dashboard
//!
//! This crate owns the menu's items, categories and combos for a client
//! session. It keeps cross-entity counts consistent, supports explicit
//! checkpoint / undo / redo over the whole catalog, and derives filtered,
//! sorted and aggregated views on demand.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Menu Dashboard                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Dashboard UI                                 │   │
//! │  │    Item grid ──► Item form ──► Category sidebar ──► Combos      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ &mut MenuStore                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ menu-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  catalog  │  │ selection │  │  history  │  │   view    │  │   │
//! │  │   │ Entities  │  │ Selected  │  │ Undo/Redo │  │ Filter    │  │   │
//! │  │   │ Txn+counts│  │ live ids  │  │ ≤ 50 deep │  │ Sort/Stats│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO FILE SYSTEM • NO NETWORK • NO ASYNC                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ KeyValueStore                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                menu-storage (Adapters)                          │   │
//! │  │          File key/value store, config loading, seed tool        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities, drafts and patches
//! - [`money`] - Integer-cent money
//! - [`error`] - Mutation, validation, persistence and config errors
//! - [`validation`] - Field rules shared by drafts and patches
//! - [`catalog`] - Entity Store and the `Transaction` Mutation Layer
//! - [`selection`] - Selection Tracker
//! - [`history`] - Bounded checkpoint history
//! - [`view`] - Filtering, sorting and statistics
//! - [`persistence`] - Key/value boundary, projection, observer hook
//! - [`config`] - Engine settings
//! - [`store`] - `MenuStore`, the service object tying it together
//!
//! ## Invariants
//!
//! 1. **Counts**: a category's `item_count` equals the number of items pointing at it
//! 2. **Selection**: the selection only ever holds ids of existing items
//! 3. **History**: history holds at most `history_limit` entries and its cursor is valid
//!
//! ## Example Usage
//!
//! ```rust
//! use menu_core::{CategoryDraft, EngineConfig, ItemDraft, ItemPatch, MenuStore};
//!
//! let mut store = MenuStore::new(EngineConfig::default());
//! let mains = store.add_category(CategoryDraft::new("Mains")).unwrap();
//! let soup = store
//!     .add_item(ItemDraft::new("Soup", 500).in_category(&mains))
//!     .unwrap();
//! assert_eq!(store.category_by_id(&mains).unwrap().item_count, 1);
//!
//! store.checkpoint();
//! store.update_item(&soup, &ItemPatch::category(None)).unwrap();
//! store.checkpoint();
//! assert_eq!(store.category_by_id(&mains).unwrap().item_count, 0);
//!
//! store.undo();
//! assert_eq!(store.category_by_id(&mains).unwrap().item_count, 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod config;
pub mod error;
pub mod history;
pub mod money;
pub mod persistence;
pub mod selection;
pub mod store;
pub mod types;
pub mod validation;
pub mod view;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{Catalog, Change, Transaction};
pub use config::{EngineConfig, ReferencePolicy};
pub use error::{
    ConfigError, EntityKind, MutationError, MutationResult, PersistenceError, PersistenceResult,
    ValidationError,
};
pub use history::History;
pub use money::Money;
pub use persistence::{
    CatalogObserver, Commit, KeyValueStore, MemoryStorage, PersistedMenu, PersistenceHook,
};
pub use selection::Selection;
pub use store::MenuStore;
pub use types::*;
pub use view::{ItemQuery, MenuStats, SortField, SortOrder, ViewMode, ViewSettings};
