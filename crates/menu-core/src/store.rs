//! # Menu Store
//!
//! The service object that owns the catalog engine's state. The hosting
//! application constructs one and hands `&mut MenuStore` to whatever needs
//! it; there is no global instance.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  MenuStore                                                              │
//! │  ├── catalog:    Catalog              (Entity Store, live)              │
//! │  ├── selection:  Selection            (transient)                       │
//! │  ├── history:    History<Catalog>     (transient, explicit checkpoints) │
//! │  ├── view:       ViewSettings         (persisted)                       │
//! │  ├── filters:    category + search    (transient)                       │
//! │  └── observers:  Vec<Box<dyn CatalogObserver>>                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Commit Rules
//! - A transaction that returns `Err` is discarded whole.
//! - Selection is pruned of deleted items and the category filter is
//!   cleared if its category is gone, in the same step the catalog is
//!   replaced.
//! - Observers run once per commit, and only if something changed.
//!
//! Every `MutationResult` is informational. UI callers may drop it; an
//! unknown id is then a silent no-op.

use std::fmt;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::catalog::{Catalog, Change, Transaction};
use crate::config::EngineConfig;
use crate::error::{EntityKind, MutationError, MutationResult};
use crate::history::History;
use crate::persistence::{
    load_projection, CatalogObserver, Commit, KeyValueStore, PersistedMenu, PersistenceHook,
};
use crate::selection::Selection;
use crate::types::{
    CategoryDraft, CategoryPatch, ComboDraft, ComboPatch, EntityId, ItemDraft, ItemPatch,
    MenuCategory, MenuCombo, MenuItem,
};
use crate::validation::{validate_search_query, ValidationResult};
use crate::view::{
    self, CategorySummary, ComboPricing, DanglingReport, ItemQuery, MenuStats, SortField,
    SortOrder, ViewMode, ViewSettings,
};

/// The catalog state engine.
pub struct MenuStore {
    catalog: Catalog,
    selection: Selection,
    history: History<Catalog>,
    view: ViewSettings,
    selected_category: Option<EntityId>,
    search_query: String,
    config: EngineConfig,
    observers: Vec<Box<dyn CatalogObserver>>,
}

impl fmt::Debug for MenuStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuStore")
            .field("items", &self.catalog.item_count())
            .field("categories", &self.catalog.category_count())
            .field("combos", &self.catalog.combo_count())
            .field("selected", &self.selection.len())
            .field("history", &self.history.len())
            .field("view", &self.view)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for MenuStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl MenuStore {
    // =========================================================================
    // Construction
    // =========================================================================

    /// An empty store with no observers.
    pub fn new(config: EngineConfig) -> Self {
        MenuStore {
            catalog: Catalog::new(),
            selection: Selection::new(),
            history: History::with_limit(config.history_limit),
            view: ViewSettings::default(),
            selected_category: None,
            search_query: String::new(),
            config,
            observers: Vec::new(),
        }
    }

    /// A store seeded from a decoded projection.
    ///
    /// Categories are put back in display order and every count is
    /// recomputed, so both hold even if the projection was stale.
    pub fn load_from(config: EngineConfig, menu: PersistedMenu) -> Self {
        let mut catalog = menu.catalog;
        let drifted = catalog.normalize();
        if drifted > 0 {
            info!(drifted, "Repaired category counts from persisted menu");
        }

        MenuStore {
            catalog,
            view: menu.view,
            ..Self::new(config)
        }
    }

    /// Reads the projection under `config.storage_key` once, then persists
    /// every later change back to `storage`.
    ///
    /// A missing or unreadable projection starts an empty store.
    pub fn open<S>(config: EngineConfig, storage: S) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let key = config.storage_key.clone();
        let mut store = match load_projection(&storage, &key) {
            Some(menu) => Self::load_from(config, menu),
            None => Self::new(config),
        };
        store.subscribe(PersistenceHook::new(storage, key));
        store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registers an observer for every future commit.
    pub fn subscribe<O>(&mut self, observer: O)
    where
        O: CatalogObserver + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Registers a closure for every future commit.
    pub fn on_commit<F>(&mut self, callback: F)
    where
        F: FnMut(&Commit<'_>) + 'static,
    {
        self.subscribe(callback);
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Runs `f` against a working copy and commits it if `f` succeeds.
    ///
    /// ```text
    /// store.transaction(|tx| {
    ///     let mains = tx.add_category(CategoryDraft::new("Mains"))?;
    ///     tx.add_item(ItemDraft::new("Curry", 1200).in_category(&mains))
    /// })
    /// ```
    pub fn transaction<T, F>(&mut self, f: F) -> MutationResult<T>
    where
        F: FnOnce(&mut Transaction) -> MutationResult<T>,
    {
        let mut tx = Transaction::begin(&self.catalog, self.config.reference_policy);
        let output = f(&mut tx)?;
        let (catalog, changes) = tx.finish();
        self.commit(catalog, changes);
        Ok(output)
    }

    fn commit(&mut self, catalog: Catalog, changes: Vec<Change>) {
        if changes.is_empty() {
            return;
        }

        self.catalog = catalog;
        self.reconcile();
        debug_assert!(self.catalog.counts_consistent());
        self.notify(&changes);
    }

    /// Drops selection entries and the category filter that no longer
    /// resolve against the live catalog.
    fn reconcile(&mut self) {
        let catalog = &self.catalog;
        let dropped = self.selection.retain(|id| catalog.item(id).is_some());
        if dropped > 0 {
            debug!(dropped, "Pruned selection of deleted items");
        }

        let stale_filter = self
            .selected_category
            .as_deref()
            .is_some_and(|id| self.catalog.category(id).is_none());
        if stale_filter {
            if let Some(category_id) = self.selected_category.take() {
                debug!(category_id = %category_id, "Cleared filter for deleted category");
            }
        }
    }

    fn notify(&mut self, changes: &[Change]) {
        let commit = Commit {
            changes,
            catalog: &self.catalog,
            view: self.view,
        };
        for observer in &mut self.observers {
            observer.on_commit(&commit);
        }
    }

    // =========================================================================
    // Items
    // =========================================================================

    pub fn add_item(&mut self, draft: ItemDraft) -> MutationResult<EntityId> {
        self.transaction(|tx| tx.add_item(draft))
    }

    pub fn update_item(&mut self, id: &str, patch: &ItemPatch) -> MutationResult<()> {
        self.transaction(|tx| tx.update_item(id, patch))
    }

    /// Deletes an item and removes it from the selection.
    pub fn delete_item(&mut self, id: &str) -> MutationResult<()> {
        self.transaction(|tx| tx.delete_item(id))
    }

    pub fn toggle_item_availability(&mut self, id: &str) -> MutationResult<bool> {
        self.transaction(|tx| tx.toggle_item_availability(id))
    }

    /// Applies `patch` to every resolvable id; returns how many were updated.
    pub fn bulk_update_items<I, S>(&mut self, ids: I, patch: &ItemPatch) -> MutationResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.transaction(|tx| tx.bulk_update_items(ids, patch))
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub fn add_category(&mut self, draft: CategoryDraft) -> MutationResult<EntityId> {
        self.transaction(|tx| tx.add_category(draft))
    }

    pub fn update_category(&mut self, id: &str, patch: &CategoryPatch) -> MutationResult<()> {
        self.transaction(|tx| tx.update_category(id, patch))
    }

    /// Deletes a category, un-categorizing its items and clearing the
    /// category filter if it pointed here.
    pub fn delete_category(&mut self, id: &str) -> MutationResult<()> {
        self.transaction(|tx| tx.delete_category(id))
    }

    /// Returns how many categories were repositioned.
    pub fn reorder_categories<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.transaction(|tx| Ok(tx.reorder_categories(ids)))
            .unwrap_or_default()
    }

    // =========================================================================
    // Combos
    // =========================================================================

    pub fn add_combo(&mut self, draft: ComboDraft) -> MutationResult<EntityId> {
        self.transaction(|tx| tx.add_combo(draft))
    }

    pub fn update_combo(&mut self, id: &str, patch: &ComboPatch) -> MutationResult<()> {
        self.transaction(|tx| tx.update_combo(id, patch))
    }

    pub fn delete_combo(&mut self, id: &str) -> MutationResult<()> {
        self.transaction(|tx| tx.delete_combo(id))
    }

    pub fn toggle_combo_active(&mut self, id: &str) -> MutationResult<bool> {
        self.transaction(|tx| tx.toggle_combo_active(id))
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Selects an existing item. Returns true if it was newly selected.
    pub fn select_item(&mut self, id: &str) -> bool {
        if self.catalog.item(id).is_none() {
            debug!(item_id = %id, "Ignoring selection of unknown item");
            return false;
        }
        self.selection.select(id)
    }

    /// Returns true if the item was selected.
    pub fn deselect_item(&mut self, id: &str) -> bool {
        self.selection.deselect(id)
    }

    /// Flips an item's selection; returns whether it is selected afterwards.
    pub fn toggle_item_selection(&mut self, id: &str) -> bool {
        if self.selection.contains(id) {
            self.selection.deselect(id);
            false
        } else {
            self.select_item(id)
        }
    }

    /// Adds every existing id to the selection; returns how many were new.
    pub fn select_items<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let catalog = &self.catalog;
        self.selection.select_many(
            ids.into_iter()
                .filter(|id| catalog.item(id.as_ref()).is_some()),
        )
    }

    /// Selects every item in the current filtered view.
    pub fn select_all_filtered(&mut self) -> usize {
        let ids: Vec<EntityId> = self
            .filtered_items()
            .into_iter()
            .map(|item| item.id.clone())
            .collect();
        self.selection.select_many(ids)
    }

    pub fn deselect_all(&mut self) {
        self.selection.deselect_all();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    /// Selected item ids, sorted.
    pub fn selected_item_ids(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.selection.iter()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Deletes every selected item in one commit; returns how many.
    pub fn delete_selected(&mut self) -> usize {
        let ids: Vec<EntityId> = self.selection.iter().map(str::to_string).collect();
        self.transaction(|tx| {
            let mut deleted = 0;
            for id in &ids {
                if tx.delete_item(id).is_ok() {
                    deleted += 1;
                }
            }
            Ok(deleted)
        })
        .unwrap_or_default()
    }

    /// Applies `patch` to every selected item.
    pub fn bulk_update_selected(&mut self, patch: &ItemPatch) -> MutationResult<usize> {
        let ids: Vec<EntityId> = self.selection.iter().map(str::to_string).collect();
        self.bulk_update_items(ids, patch)
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Snapshots the catalog as one undoable step.
    pub fn checkpoint(&mut self) {
        self.history.checkpoint(self.catalog.clone());
        info!(
            entries = self.history.len(),
            cursor = self.history.cursor(),
            "History checkpoint"
        );
    }

    /// Restores the previous checkpoint. Returns false at the oldest entry.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                info!(cursor = self.history.cursor(), "Undo");
                self.restore(snapshot);
                true
            }
            None => {
                debug!("Nothing to undo");
                false
            }
        }
    }

    /// Restores the next checkpoint. Returns false at the newest entry.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                info!(cursor = self.history.cursor(), "Redo");
                self.restore(snapshot);
                true
            }
            None => {
                debug!("Nothing to redo");
                false
            }
        }
    }

    fn restore(&mut self, snapshot: Catalog) {
        self.catalog = snapshot;
        self.reconcile();
        debug_assert!(self.catalog.counts_consistent());
        self.notify(&[Change::HistoryRestored]);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // =========================================================================
    // View Settings and Filters
    // =========================================================================

    pub fn view_settings(&self) -> ViewSettings {
        self.view
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view.view_mode != mode {
            self.view.view_mode = mode;
            self.notify(&[Change::ViewSettingsChanged]);
        }
    }

    pub fn set_sort(&mut self, sort_by: SortField, sort_order: SortOrder) {
        if self.view.sort_by != sort_by || self.view.sort_order != sort_order {
            self.view.sort_by = sort_by;
            self.view.sort_order = sort_order;
            self.notify(&[Change::ViewSettingsChanged]);
        }
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.selected_category.as_deref()
    }

    /// Sets the category filter; `None` shows every category.
    pub fn set_selected_category(&mut self, category_id: Option<&str>) -> MutationResult<()> {
        if let Some(id) = category_id {
            if self.catalog.category(id).is_none() {
                debug!(category_id = %id, "Ignoring filter on unknown category");
                return Err(MutationError::not_found(EntityKind::Category, id));
            }
        }
        self.selected_category = category_id.map(str::to_string);
        Ok(())
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Sets the (trimmed) search query; over-long queries are rejected.
    pub fn set_search_query(&mut self, query: &str) -> ValidationResult<()> {
        self.search_query = validate_search_query(query)?;
        Ok(())
    }

    // =========================================================================
    // Read Access and Views
    // =========================================================================

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn all_items(&self) -> impl ExactSizeIterator<Item = &MenuItem> + '_ {
        self.catalog.items()
    }

    pub fn all_categories(&self) -> impl ExactSizeIterator<Item = &MenuCategory> + '_ {
        self.catalog.categories()
    }

    pub fn all_combos(&self) -> impl ExactSizeIterator<Item = &MenuCombo> + '_ {
        self.catalog.combos()
    }

    pub fn item_by_id(&self, id: &str) -> Option<&MenuItem> {
        self.catalog.item(id)
    }

    pub fn category_by_id(&self, id: &str) -> Option<&MenuCategory> {
        self.catalog.category(id)
    }

    pub fn combo_by_id(&self, id: &str) -> Option<&MenuCombo> {
        self.catalog.combo(id)
    }

    pub fn items_by_category<'a>(
        &'a self,
        category_id: &'a str,
    ) -> impl Iterator<Item = &'a MenuItem> + 'a {
        self.catalog.items_in_category(category_id)
    }

    /// The query the dashboard is currently showing.
    pub fn current_query(&self) -> ItemQuery {
        ItemQuery {
            category_id: self.selected_category.clone(),
            search: Some(self.search_query.clone()).filter(|s| !s.is_empty()),
            sort_by: self.view.sort_by,
            sort_order: self.view.sort_order,
        }
    }

    /// Items under the current filters and sort.
    pub fn filtered_items(&self) -> Vec<&MenuItem> {
        view::query_items(&self.catalog, &self.current_query())
    }

    /// Items for an arbitrary query, independent of the store's filters.
    pub fn filtered_items_with(&self, query: &ItemQuery) -> Vec<&MenuItem> {
        view::query_items(&self.catalog, query)
    }

    pub fn menu_stats(&self) -> MenuStats {
        view::menu_stats(self.catalog.items(), self.catalog.categories())
    }

    pub fn category_summaries(&self) -> Vec<CategorySummary> {
        view::category_summaries(&self.catalog)
    }

    pub fn combo_pricing(&self, combo_id: &str) -> Option<ComboPricing> {
        self.catalog
            .combo(combo_id)
            .map(|combo| view::combo_pricing(combo, &self.catalog))
    }

    pub fn combos_valid_on(&self, date: NaiveDate) -> Vec<&MenuCombo> {
        view::combos_valid_on(self.catalog.combos(), date)
    }

    pub fn dangling_references(&self) -> DanglingReport {
        view::dangling_references(&self.catalog)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    use super::*;
    use crate::config::ReferencePolicy;
    use crate::persistence::MemoryStorage;
    use crate::types::ComboLine;

    fn recorder(store: &mut MenuStore) -> Rc<RefCell<Vec<Vec<Change>>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        store.on_commit(move |commit| {
            sink.borrow_mut().push(commit.changes.to_vec());
        });
        log
    }

    fn assert_counts(store: &MenuStore) {
        for category in store.all_categories() {
            assert_eq!(
                category.item_count,
                store.items_by_category(&category.id).count(),
                "count mismatch for {}",
                category.name
            );
        }
    }

    #[test]
    fn test_mains_and_soup_scenario() {
        let mut store = MenuStore::default();
        let mains = store
            .add_category(CategoryDraft::new("Mains").with_sort_order(0))
            .unwrap();
        assert_eq!(store.category_by_id(&mains).unwrap().item_count, 0);

        let soup = store
            .add_item(ItemDraft::new("Soup", 500).in_category(&mains))
            .unwrap();
        assert_eq!(store.category_by_id(&mains).unwrap().item_count, 1);

        store
            .update_item(&soup, &ItemPatch::category(None))
            .unwrap();
        assert_eq!(store.category_by_id(&mains).unwrap().item_count, 0);

        store
            .update_item(&soup, &ItemPatch::category(Some(mains.clone())))
            .unwrap();
        store.delete_category(&mains).unwrap();
        let item = store.item_by_id(&soup).unwrap();
        assert_eq!(item.category_id, None);
    }

    #[test]
    fn test_counts_hold_after_every_operation() {
        let mut store = MenuStore::default();
        let a = store.add_category(CategoryDraft::new("A")).unwrap();
        let b = store.add_category(CategoryDraft::new("B")).unwrap();
        assert_counts(&store);

        let mut items = Vec::new();
        for n in 0..6 {
            let category = if n % 2 == 0 { &a } else { &b };
            items.push(
                store
                    .add_item(ItemDraft::new(format!("Item {n}"), 100 * n).in_category(category))
                    .unwrap(),
            );
            assert_counts(&store);
        }

        store.update_item(&items[0], &ItemPatch::category(Some(b.clone()))).unwrap();
        assert_counts(&store);
        store.bulk_update_items(&items[1..4], &ItemPatch::category(Some(a.clone()))).unwrap();
        assert_counts(&store);
        store.delete_item(&items[2]).unwrap();
        assert_counts(&store);
        store.delete_category(&a).unwrap();
        assert_counts(&store);
        let _ = store.delete_item("missing");
        assert_counts(&store);
    }

    #[test]
    fn test_deleted_item_leaves_selection() {
        let mut store = MenuStore::default();
        let soup = store.add_item(ItemDraft::new("Soup", 500)).unwrap();
        let salad = store.add_item(ItemDraft::new("Salad", 700)).unwrap();
        store.select_item(&soup);
        store.select_item(&salad);

        store.delete_item(&soup).unwrap();
        assert!(!store.is_selected(&soup));
        assert_eq!(store.selected_item_ids().collect::<Vec<_>>(), vec![salad.as_str()]);
    }

    #[test]
    fn test_select_unknown_item_is_ignored() {
        let mut store = MenuStore::default();
        assert!(!store.select_item("ghost"));
        assert_eq!(store.select_items(["ghost", "phantom"]), 0);
        assert!(store.selection().is_empty());
    }

    #[test]
    fn test_select_twice_equals_once() {
        let mut store = MenuStore::default();
        let soup = store.add_item(ItemDraft::new("Soup", 500)).unwrap();

        assert!(store.select_item(&soup));
        let once = store.selection().clone();
        assert!(!store.select_item(&soup));
        assert_eq!(store.selection(), &once);

        assert!(!store.toggle_item_selection(&soup));
        assert!(store.selection().is_empty());
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut store = MenuStore::default();
        let mains = store.add_category(CategoryDraft::new("Mains")).unwrap();
        store
            .add_item(ItemDraft::new("Curry", 1200).in_category(&mains))
            .unwrap();
        let s0 = store.catalog().clone();
        store.checkpoint();

        let noodles = store
            .add_item(ItemDraft::new("Noodles", 1100).in_category(&mains))
            .unwrap();
        store.toggle_item_availability(&noodles).unwrap();
        store.add_category(CategoryDraft::new("Drinks")).unwrap();
        let after = store.catalog().clone();
        store.checkpoint();

        assert!(store.undo());
        assert_eq!(store.catalog(), &s0);
        assert_counts(&store);

        assert!(store.redo());
        assert_eq!(store.catalog(), &after);
        assert!(!store.can_redo());
    }

    #[test]
    fn test_undo_prunes_selection_and_filter() {
        let mut store = MenuStore::default();
        store.checkpoint();

        let drinks = store.add_category(CategoryDraft::new("Drinks")).unwrap();
        let tea = store
            .add_item(ItemDraft::new("Tea", 300).in_category(&drinks))
            .unwrap();
        store.checkpoint();
        store.select_item(&tea);
        store.set_selected_category(Some(&drinks)).unwrap();

        assert!(store.undo());
        assert!(store.selection().is_empty());
        assert_eq!(store.selected_category(), None);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut store = MenuStore::default();
        for n in 0..51 {
            store.add_item(ItemDraft::new(format!("Item {n}"), 100)).unwrap();
            store.checkpoint();
        }

        assert_eq!(store.history_len(), 50);
        assert!(store.can_undo());
        assert!(!store.can_redo());
    }

    #[test]
    fn test_history_limit_comes_from_config() {
        let config = EngineConfig {
            history_limit: 3,
            ..EngineConfig::default()
        };
        let mut store = MenuStore::new(config);
        for _ in 0..5 {
            store.checkpoint();
        }
        assert_eq!(store.history_len(), 3);
    }

    #[test]
    fn test_undo_without_history_is_noop() {
        let mut store = MenuStore::default();
        let log = recorder(&mut store);
        assert!(!store.can_undo());
        assert!(!store.undo());
        assert!(!store.redo());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_failed_transaction_is_discarded() {
        let mut store = MenuStore::default();
        let log = recorder(&mut store);

        let result = store.transaction(|tx| {
            tx.add_item(ItemDraft::new("Curry", 1200))?;
            tx.delete_item("ghost")
        });

        assert_eq!(result, Err(MutationError::not_found(EntityKind::Item, "ghost")));
        assert_eq!(store.all_items().len(), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_observers_see_one_commit_per_transaction() {
        let mut store = MenuStore::default();
        let log = recorder(&mut store);

        store
            .transaction(|tx| {
                let mains = tx.add_category(CategoryDraft::new("Mains"))?;
                tx.add_item(ItemDraft::new("Curry", 1200).in_category(&mains))
            })
            .unwrap();
        let _ = store.update_item("ghost", &ItemPatch::default());
        store.set_view_mode(ViewMode::List);
        store.set_view_mode(ViewMode::List);

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].len(), 2);
        assert_eq!(log[1], vec![Change::ViewSettingsChanged]);
    }

    #[test]
    fn test_filtered_items_follow_filters_and_sort() {
        let mut store = MenuStore::default();
        let mains = store.add_category(CategoryDraft::new("Mains")).unwrap();
        store
            .add_item(ItemDraft::new("Red Curry", 1300).in_category(&mains))
            .unwrap();
        store
            .add_item(ItemDraft::new("Green Curry", 1200).in_category(&mains))
            .unwrap();
        store.add_item(ItemDraft::new("Curry Puff", 500)).unwrap();

        store.set_search_query("  curry ").unwrap();
        assert_eq!(store.search_query(), "curry");
        store.set_sort(SortField::Price, SortOrder::Asc);
        let names: Vec<&str> = store.filtered_items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Curry Puff", "Green Curry", "Red Curry"]);

        store.set_selected_category(Some(&mains)).unwrap();
        assert_eq!(store.select_all_filtered(), 2);

        assert!(store.set_selected_category(Some("ghost")).is_err());
        assert_eq!(store.selected_category(), Some(mains.as_str()));
        assert!(store.set_search_query(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_bulk_actions_on_selection() {
        let mut store = MenuStore::default();
        let ids: Vec<EntityId> = (0..4)
            .map(|n| store.add_item(ItemDraft::new(format!("Item {n}"), 100)).unwrap())
            .collect();
        store.select_items(&ids[..3]);

        let patch = ItemPatch {
            is_featured: Some(true),
            ..ItemPatch::default()
        };
        assert_eq!(store.bulk_update_selected(&patch).unwrap(), 3);
        assert_eq!(store.menu_stats().featured_items, 3);

        assert_eq!(store.delete_selected(), 3);
        assert!(store.selection().is_empty());
        assert_eq!(store.all_items().len(), 1);
        assert_eq!(store.delete_selected(), 0);
    }

    #[test]
    fn test_stats_on_empty_store() {
        let stats = MenuStore::default().menu_stats();
        assert_eq!(stats.average_price.cents(), 0);
        assert_eq!(stats.price_range.min.cents(), 0);
        assert_eq!(stats.price_range.max.cents(), 0);
    }

    #[test]
    fn test_strict_policy_rejects_dangling_combo() {
        let mut store = MenuStore::new(EngineConfig::with_policy(ReferencePolicy::Strict));
        let result = store.add_combo(ComboDraft::new("Meal", 900, vec![ComboLine::new("ghost", 1)]));
        assert!(result.unwrap_err().is_not_found());
        assert_eq!(store.all_combos().len(), 0);
    }

    #[test]
    fn test_strict_policy_rejects_dangling_updates() {
        let mut store = MenuStore::new(EngineConfig::with_policy(ReferencePolicy::Strict));
        let mains = store.add_category(CategoryDraft::new("Mains")).unwrap();
        let curry = store
            .add_item(ItemDraft::new("Curry", 1200).in_category(&mains))
            .unwrap();
        let rice = store.add_item(ItemDraft::new("Rice", 300)).unwrap();
        let combo = store
            .add_combo(ComboDraft::new("Meal", 1400, vec![ComboLine::new(&curry, 1)]))
            .unwrap();
        let commits = recorder(&mut store);
        let before = store.catalog().clone();

        let ghost = ItemPatch::category(Some("ghost".to_string()));
        assert!(store.update_item(&curry, &ghost).unwrap_err().is_not_found());
        assert!(store
            .bulk_update_items([&curry, &rice], &ghost)
            .unwrap_err()
            .is_not_found());
        let lines = ComboPatch {
            items: Some(vec![ComboLine::new("ghost", 1)]),
            ..Default::default()
        };
        assert!(store.update_combo(&combo, &lines).unwrap_err().is_not_found());

        assert_eq!(store.catalog(), &before);
        assert!(commits.borrow().is_empty());
        assert_counts(&store);
    }

    #[test]
    fn test_update_category_through_store() {
        let mut store = MenuStore::default();
        let starters = store.add_category(CategoryDraft::new("Starters")).unwrap();
        let mains = store.add_category(CategoryDraft::new("Mains")).unwrap();

        let patch = CategoryPatch {
            sort_order: Some(-1),
            ..Default::default()
        };
        store.update_category(&mains, &patch).unwrap();

        let order: Vec<&str> = store.all_categories().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec![mains.as_str(), starters.as_str()]);
        assert!(store
            .update_category("ghost", &patch)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_deleted_item_shows_up_as_dangling() {
        let mut store = MenuStore::default();
        let burger = store.add_item(ItemDraft::new("Burger", 1000)).unwrap();
        let combo = store
            .add_combo(ComboDraft::new("Meal", 900, vec![ComboLine::new(&burger, 1)]))
            .unwrap();
        assert!(store.dangling_references().is_empty());

        store.delete_item(&burger).unwrap();
        let report = store.dangling_references();
        assert_eq!(report.combo_items.len(), 1);
        assert_eq!(report.combo_items[0].owner_id, combo);
        assert_eq!(store.combo_pricing(&combo).unwrap().unresolved_items, vec![burger]);
    }

    #[test]
    fn test_open_persists_and_reloads() {
        let storage = Arc::new(MemoryStorage::new());
        let config = EngineConfig::default();

        let mut store = MenuStore::open(config.clone(), Arc::clone(&storage));
        assert!(storage.is_empty());
        let mains = store.add_category(CategoryDraft::new("Mains")).unwrap();
        let curry = store
            .add_item(ItemDraft::new("Curry", 1200).in_category(&mains))
            .unwrap();
        store.select_item(&curry);
        store.checkpoint();
        store.set_sort(SortField::Price, SortOrder::Desc);

        let reloaded = MenuStore::open(config, Arc::clone(&storage));
        assert_eq!(reloaded.catalog(), store.catalog());
        assert_eq!(reloaded.view_settings().sort_order, SortOrder::Desc);
        assert!(reloaded.selection().is_empty());
        assert!(!reloaded.can_undo());
        assert_eq!(reloaded.history_len(), 0);
    }

    #[test]
    fn test_open_repairs_stale_counts() {
        let storage = MemoryStorage::new();
        let json = r#"{
            "version": 1,
            "categories": [{
                "id": "c1", "name": "Mains", "description": null, "sortOrder": 0,
                "isActive": true, "itemCount": 9,
                "createdAt": "2026-01-01T00:00:00Z", "updatedAt": "2026-01-01T00:00:00Z"
            }]
        }"#;
        storage.set("restaurant-menu", json.as_bytes()).unwrap();

        let store = MenuStore::open(EngineConfig::default(), storage);
        assert_eq!(store.category_by_id("c1").unwrap().item_count, 0);
    }

    #[test]
    fn test_open_restores_category_display_order() {
        let storage = MemoryStorage::new();
        let json = r#"{
            "version": 1,
            "categories": [
                {
                    "id": "b", "name": "Desserts", "description": null, "sortOrder": 5,
                    "isActive": true, "itemCount": 0,
                    "createdAt": "2026-01-01T00:00:00Z", "updatedAt": "2026-01-01T00:00:00Z"
                },
                {
                    "id": "a", "name": "Starters", "description": null, "sortOrder": 0,
                    "isActive": true, "itemCount": 0,
                    "createdAt": "2026-01-01T00:00:00Z", "updatedAt": "2026-01-01T00:00:00Z"
                }
            ]
        }"#;
        storage.set("restaurant-menu", json.as_bytes()).unwrap();

        let store = MenuStore::open(EngineConfig::default(), storage);
        let order: Vec<&str> = store.all_categories().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn test_combo_pricing_saturates_on_huge_prices() {
        let mut store = MenuStore::default();
        let wagyu = store.add_item(ItemDraft::new("Wagyu", i64::MAX / 2)).unwrap();
        let combo = store
            .add_combo(ComboDraft::new("Feast", 1000, vec![ComboLine::new(&wagyu, 3)]))
            .unwrap();

        let pricing = store.combo_pricing(&combo).unwrap();
        assert_eq!(pricing.components_total.cents(), i64::MAX);
        assert_eq!(pricing.savings.cents(), i64::MAX - 1000);
    }
}
