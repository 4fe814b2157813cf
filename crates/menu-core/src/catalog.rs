//! # Catalog: Entity Store and Mutation Layer
//!
//! The authoritative collections of items, categories and combos, and the
//! `Transaction` type that is the only way to change them.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Structural Sharing                                   │
//! │                                                                         │
//! │  Catalog                                                                │
//! │  ├── items:      Arc<Vec<Arc<MenuItem>>>                                │
//! │  ├── categories: Arc<Vec<Arc<MenuCategory>>>                            │
//! │  └── combos:     Arc<Vec<Arc<MenuCombo>>>                               │
//! │                                                                         │
//! │  clone()         → three Arc bumps, O(1)                                │
//! │  first write     → Arc::make_mut copies the pointer Vec (if shared)     │
//! │  entity write    → Arc::make_mut copies only that entity (if shared)    │
//! │                                                                         │
//! │  A history snapshot and the live catalog share every entity that was   │
//! │  not touched since the snapshot was taken, yet writes to one are never │
//! │  visible through the other.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Flow
//! ```text
//! MenuStore::transaction(|tx| ...)
//!      │
//!      ▼
//! Transaction::begin(&live)      working = live.clone()   (O(1))
//!      │
//!      ▼
//! tx.add_item / update_item ...  mutate `working`, record `Change`s
//!      │
//!      ▼
//! commit                         live = working; prune selection; notify
//! ```
//!
//! ## Count Invariant
//! After every operation `category.item_count` equals the number of items
//! whose `category_id` is that category. Every write that can move an item
//! between categories adjusts both counts in the same step.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ReferencePolicy;
use crate::error::{EntityKind, MutationError, MutationResult};
use crate::types::{
    CategoryDraft, CategoryPatch, ComboDraft, ComboLine, ComboPatch, EntityId, ItemDraft,
    ItemPatch, MenuCategory, MenuCombo, MenuItem,
};

// =============================================================================
// Change Records
// =============================================================================

/// One externally visible change, reported to observers after commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    ItemAdded(EntityId),
    ItemUpdated(EntityId),
    ItemDeleted(EntityId),
    CategoryAdded(EntityId),
    CategoryUpdated(EntityId),
    CategoryDeleted(EntityId),
    CategoriesReordered,
    ComboAdded(EntityId),
    ComboUpdated(EntityId),
    ComboDeleted(EntityId),
    /// A persisted view setting (view mode, sort) changed.
    ViewSettingsChanged,
    /// Undo or redo replaced the catalog with a snapshot.
    HistoryRestored,
}

// =============================================================================
// Catalog
// =============================================================================

/// The Entity Store.
///
/// Categories are kept in display order (ascending `sort_order`, ties in
/// insertion order). Items and combos keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    items: Arc<Vec<Arc<MenuItem>>>,

    #[serde(default)]
    categories: Arc<Vec<Arc<MenuCategory>>>,

    #[serde(default)]
    combos: Arc<Vec<Arc<MenuCombo>>>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from plain collections (seed data, persisted state).
    ///
    /// Categories are put in display order and every `item_count` is
    /// recomputed, so the counts hold regardless of what the input claimed.
    pub fn from_parts(
        items: Vec<MenuItem>,
        categories: Vec<MenuCategory>,
        combos: Vec<MenuCombo>,
    ) -> Self {
        let mut catalog = Catalog {
            items: Arc::new(items.into_iter().map(Arc::new).collect()),
            categories: Arc::new(categories.into_iter().map(Arc::new).collect()),
            combos: Arc::new(combos.into_iter().map(Arc::new).collect()),
        };
        catalog.normalize();
        catalog
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    /// All items in insertion order.
    pub fn items(&self) -> impl ExactSizeIterator<Item = &MenuItem> + '_ {
        self.items.iter().map(|item| item.as_ref())
    }

    /// All categories in display order.
    pub fn categories(&self) -> impl ExactSizeIterator<Item = &MenuCategory> + '_ {
        self.categories.iter().map(|category| category.as_ref())
    }

    /// All combos in insertion order.
    pub fn combos(&self) -> impl ExactSizeIterator<Item = &MenuCombo> + '_ {
        self.combos.iter().map(|combo| combo.as_ref())
    }

    pub fn item(&self, id: &str) -> Option<&MenuItem> {
        self.items.iter().find(|i| i.id == id).map(|i| i.as_ref())
    }

    pub fn category(&self, id: &str) -> Option<&MenuCategory> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.as_ref())
    }

    pub fn combo(&self, id: &str) -> Option<&MenuCombo> {
        self.combos.iter().find(|c| c.id == id).map(|c| c.as_ref())
    }

    /// Items whose `category_id` is `category_id`, in insertion order.
    pub fn items_in_category<'a>(
        &'a self,
        category_id: &'a str,
    ) -> impl Iterator<Item = &'a MenuItem> + 'a {
        self.items()
            .filter(move |item| item.category_id.as_deref() == Some(category_id))
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn combo_count(&self) -> usize {
        self.combos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.categories.is_empty() && self.combos.is_empty()
    }

    /// Checks that every category's `item_count` matches its items.
    pub fn counts_consistent(&self) -> bool {
        self.categories
            .iter()
            .all(|c| c.item_count == self.items_in_category(&c.id).count())
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Puts categories in display order and recomputes every `item_count`.
    ///
    /// Used on data that did not come through a `Transaction`. Returns how
    /// many categories held a stale count.
    pub fn normalize(&mut self) -> usize {
        if !self.categories.windows(2).all(|w| w[0].sort_order <= w[1].sort_order) {
            self.sort_categories();
        }
        self.recount_categories()
    }

    /// Recomputes every category's `item_count` from the items.
    ///
    /// Returns how many categories held a stale count.
    pub fn recount_categories(&mut self) -> usize {
        let actual: Vec<usize> = self
            .categories
            .iter()
            .map(|c| self.items_in_category(&c.id).count())
            .collect();

        let mut drifted = 0;
        for (index, count) in actual.into_iter().enumerate() {
            if self.categories[index].item_count != count {
                let category = Arc::make_mut(&mut Arc::make_mut(&mut self.categories)[index]);
                warn!(
                    category_id = %category.id,
                    stored = category.item_count,
                    actual = count,
                    "Category item count drifted; recomputed"
                );
                category.item_count = count;
                drifted += 1;
            }
        }
        drifted
    }

    fn sort_categories(&mut self) {
        // Stable: equal sort orders keep their current relative order
        Arc::make_mut(&mut self.categories).sort_by_key(|c| c.sort_order);
    }

    fn item_index(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    fn category_index(&self, id: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.id == id)
    }

    fn combo_index(&self, id: &str) -> Option<usize> {
        self.combos.iter().position(|c| c.id == id)
    }

    fn item_at_mut(&mut self, index: usize) -> &mut MenuItem {
        Arc::make_mut(&mut Arc::make_mut(&mut self.items)[index])
    }

    fn category_at_mut(&mut self, index: usize) -> &mut MenuCategory {
        Arc::make_mut(&mut Arc::make_mut(&mut self.categories)[index])
    }

    fn combo_at_mut(&mut self, index: usize) -> &mut MenuCombo {
        Arc::make_mut(&mut Arc::make_mut(&mut self.combos)[index])
    }

    /// Moves a category's count by `delta`. Unknown ids are ignored, which
    /// is what keeps dangling references out of the counts.
    fn adjust_item_count(&mut self, category_id: &str, delta: isize) {
        if let Some(index) = self.category_index(category_id) {
            let category = self.category_at_mut(index);
            category.item_count = category.item_count.saturating_add_signed(delta);
        }
    }

    #[cfg(test)]
    pub(crate) fn shares_item_with(&self, other: &Catalog, id: &str) -> bool {
        match (self.item_index(id), other.item_index(id)) {
            (Some(a), Some(b)) => Arc::ptr_eq(&self.items[a], &other.items[b]),
            _ => false,
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A mutable working copy of the catalog.
///
/// Every Mutation Layer operation lives here. Nothing is visible to the
/// store until the owning `MenuStore` commits the transaction. Operations
/// check everything before writing, so an `Err` leaves the working copy
/// exactly as it was.
#[derive(Debug)]
pub struct Transaction {
    working: Catalog,
    policy: ReferencePolicy,
    changes: Vec<Change>,
}

impl Transaction {
    /// Opens a transaction over a cheap clone of `base`.
    pub fn begin(base: &Catalog, policy: ReferencePolicy) -> Self {
        Transaction {
            working: base.clone(),
            policy,
            changes: Vec::new(),
        }
    }

    /// The working copy, including this transaction's own writes.
    pub fn catalog(&self) -> &Catalog {
        &self.working
    }

    /// Changes recorded so far.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Closes the transaction, yielding the new catalog and its changes.
    pub fn finish(self) -> (Catalog, Vec<Change>) {
        (self.working, self.changes)
    }

    // =========================================================================
    // Reference Policy
    // =========================================================================

    fn check_category_ref(&self, category_id: &str, owner: &str) -> MutationResult<()> {
        if self.working.category(category_id).is_some() {
            return Ok(());
        }
        if self.policy.is_strict() {
            debug!(category_id = %category_id, owner = %owner, "Rejecting unknown category reference");
            return Err(MutationError::not_found(EntityKind::Category, category_id));
        }
        warn!(
            category_id = %category_id,
            owner = %owner,
            "Item references unknown category; storing dangling reference"
        );
        Ok(())
    }

    fn check_combo_lines(&self, lines: &[ComboLine], owner: &str) -> MutationResult<()> {
        for line in lines {
            if self.working.item(&line.item_id).is_some() {
                continue;
            }
            if self.policy.is_strict() {
                debug!(item_id = %line.item_id, combo = %owner, "Rejecting unknown combo item");
                return Err(MutationError::not_found(EntityKind::Item, &line.item_id));
            }
            warn!(
                item_id = %line.item_id,
                combo = %owner,
                "Combo line references unknown item; storing dangling reference"
            );
        }
        Ok(())
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Inserts a new item and returns its id.
    ///
    /// A resolvable `category_id` gains one in its `item_count`; an
    /// unresolvable one is stored as-is (lenient) or rejected (strict).
    pub fn add_item(&mut self, draft: ItemDraft) -> MutationResult<EntityId> {
        draft.validate()?;
        if let Some(category_id) = &draft.category_id {
            self.check_category_ref(category_id, &draft.name)?;
        }

        let item = draft.into_item(Utc::now());
        let id = item.id.clone();
        if let Some(category_id) = &item.category_id {
            self.working.adjust_item_count(category_id, 1);
        }
        debug!(item_id = %id, name = %item.name, "Item added");
        Arc::make_mut(&mut self.working.items).push(Arc::new(item));

        self.changes.push(Change::ItemAdded(id.clone()));
        Ok(id)
    }

    /// Applies a patch to an item and refreshes its update timestamp.
    ///
    /// Moving the item to another category moves one unit of `item_count`
    /// from the old category (if it exists) to the new one (if it exists).
    pub fn update_item(&mut self, id: &str, patch: &ItemPatch) -> MutationResult<()> {
        patch.validate()?;
        let Some(index) = self.working.item_index(id) else {
            debug!(item_id = %id, "Update skipped: unknown item");
            return Err(MutationError::not_found(EntityKind::Item, id));
        };
        if let Some(Some(category_id)) = &patch.category_id {
            self.check_category_ref(category_id, id)?;
        }

        self.apply_item_patch(index, patch);
        Ok(())
    }

    /// Patches the item at `index` once the patch and its category
    /// reference have been checked.
    fn apply_item_patch(&mut self, index: usize, patch: &ItemPatch) {
        let (id, old_category, new_category) = {
            let item = self.working.item_at_mut(index);
            let old_category = item.category_id.clone();
            patch.apply_fields(item);
            if let Some(category_id) = &patch.category_id {
                item.category_id = category_id.clone();
            }
            item.updated_at = Utc::now();
            (item.id.clone(), old_category, item.category_id.clone())
        };

        if old_category != new_category {
            if let Some(old) = &old_category {
                self.working.adjust_item_count(old, -1);
            }
            if let Some(new) = &new_category {
                self.working.adjust_item_count(new, 1);
            }
        }

        self.changes.push(Change::ItemUpdated(id));
    }

    /// Removes an item. The owning category loses one in its count.
    ///
    /// Combo lines naming the item are left alone (no cascade).
    pub fn delete_item(&mut self, id: &str) -> MutationResult<()> {
        let Some(index) = self.working.item_index(id) else {
            debug!(item_id = %id, "Delete skipped: unknown item");
            return Err(MutationError::not_found(EntityKind::Item, id));
        };

        let removed = Arc::make_mut(&mut self.working.items).remove(index);
        if let Some(category_id) = &removed.category_id {
            self.working.adjust_item_count(category_id, -1);
        }
        debug!(item_id = %id, "Item deleted");

        self.changes.push(Change::ItemDeleted(id.to_string()));
        Ok(())
    }

    /// Flips an item's availability and returns the new value.
    pub fn toggle_item_availability(&mut self, id: &str) -> MutationResult<bool> {
        let Some(index) = self.working.item_index(id) else {
            debug!(item_id = %id, "Toggle skipped: unknown item");
            return Err(MutationError::not_found(EntityKind::Item, id));
        };

        let item = self.working.item_at_mut(index);
        item.is_available = !item.is_available;
        item.updated_at = Utc::now();
        let available = item.is_available;

        self.changes.push(Change::ItemUpdated(id.to_string()));
        Ok(available)
    }

    /// Applies the same patch to each resolvable id independently.
    ///
    /// Unknown (and repeated) ids are skipped. Returns how many items were
    /// updated. The patch itself is checked once up front, so an invalid
    /// patch or a strict-policy category miss updates nothing.
    pub fn bulk_update_items<I, S>(&mut self, ids: I, patch: &ItemPatch) -> MutationResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        patch.validate()?;
        if let Some(Some(category_id)) = &patch.category_id {
            self.check_category_ref(category_id, "bulk update")?;
        }

        let mut seen = HashSet::new();
        let mut applied = 0;
        for id in ids {
            let id = id.as_ref();
            if !seen.insert(id.to_string()) {
                continue;
            }
            let Some(index) = self.working.item_index(id) else {
                debug!(item_id = %id, "Bulk update skipped unknown item");
                continue;
            };
            self.apply_item_patch(index, patch);
            applied += 1;
        }
        Ok(applied)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Inserts a new category (with `item_count` 0) and returns its id.
    pub fn add_category(&mut self, draft: CategoryDraft) -> MutationResult<EntityId> {
        draft.validate()?;

        let now = Utc::now();
        let sort_order = draft.sort_order.unwrap_or_else(|| {
            self.working
                .categories()
                .map(|c| c.sort_order)
                .max()
                .map_or(0, |max| max.saturating_add(1))
        });
        let category = MenuCategory {
            id: crate::types::generate_id(),
            name: draft.name.trim().to_string(),
            description: draft.description,
            sort_order,
            is_active: draft.is_active,
            item_count: 0,
            created_at: now,
            updated_at: now,
        };
        let id = category.id.clone();
        debug!(category_id = %id, name = %category.name, "Category added");

        Arc::make_mut(&mut self.working.categories).push(Arc::new(category));
        self.working.sort_categories();

        self.changes.push(Change::CategoryAdded(id.clone()));
        Ok(id)
    }

    pub fn update_category(&mut self, id: &str, patch: &CategoryPatch) -> MutationResult<()> {
        patch.validate()?;
        let Some(index) = self.working.category_index(id) else {
            debug!(category_id = %id, "Update skipped: unknown category");
            return Err(MutationError::not_found(EntityKind::Category, id));
        };

        let category = self.working.category_at_mut(index);
        let previous_order = category.sort_order;
        patch.apply(category);
        category.updated_at = Utc::now();
        let reordered = category.sort_order != previous_order;

        if reordered {
            self.working.sort_categories();
        }

        self.changes.push(Change::CategoryUpdated(id.to_string()));
        Ok(())
    }

    /// Removes a category and un-categorizes every item that pointed at it.
    ///
    /// Items are never deleted along with their category.
    pub fn delete_category(&mut self, id: &str) -> MutationResult<()> {
        let Some(index) = self.working.category_index(id) else {
            debug!(category_id = %id, "Delete skipped: unknown category");
            return Err(MutationError::not_found(EntityKind::Category, id));
        };

        Arc::make_mut(&mut self.working.categories).remove(index);

        let orphaned: Vec<usize> = self
            .working
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.category_id.as_deref() == Some(id))
            .map(|(index, _)| index)
            .collect();
        let now = Utc::now();
        for &item_index in &orphaned {
            let item = self.working.item_at_mut(item_index);
            item.category_id = None;
            item.updated_at = now;
        }
        debug!(category_id = %id, uncategorized = orphaned.len(), "Category deleted");

        self.changes.push(Change::CategoryDeleted(id.to_string()));
        Ok(())
    }

    /// Sets each listed category's `sort_order` to its position in `ids`,
    /// then re-sorts the categories.
    ///
    /// Unlisted categories keep their `sort_order`; unknown ids are
    /// skipped but still occupy their position. Returns how many
    /// categories were repositioned.
    pub fn reorder_categories<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let now = Utc::now();
        let mut repositioned = 0;
        for (position, id) in ids.into_iter().enumerate() {
            let id = id.as_ref();
            let Some(index) = self.working.category_index(id) else {
                debug!(category_id = %id, "Reorder skipped unknown category");
                continue;
            };
            let category = self.working.category_at_mut(index);
            category.sort_order = i32::try_from(position).unwrap_or(i32::MAX);
            category.updated_at = now;
            repositioned += 1;
        }

        if repositioned > 0 {
            self.working.sort_categories();
            self.changes.push(Change::CategoriesReordered);
        }
        repositioned
    }

    // =========================================================================
    // Combos
    // =========================================================================

    pub fn add_combo(&mut self, draft: ComboDraft) -> MutationResult<EntityId> {
        draft.validate()?;
        self.check_combo_lines(&draft.items, &draft.name)?;

        let combo = draft.into_combo(Utc::now());
        let id = combo.id.clone();
        debug!(combo_id = %id, name = %combo.name, lines = combo.items.len(), "Combo added");
        Arc::make_mut(&mut self.working.combos).push(Arc::new(combo));

        self.changes.push(Change::ComboAdded(id.clone()));
        Ok(id)
    }

    pub fn update_combo(&mut self, id: &str, patch: &ComboPatch) -> MutationResult<()> {
        let Some(index) = self.working.combo_index(id) else {
            debug!(combo_id = %id, "Update skipped: unknown combo");
            return Err(MutationError::not_found(EntityKind::Combo, id));
        };
        patch.validate_for(&self.working.combos[index])?;
        if let Some(lines) = &patch.items {
            self.check_combo_lines(lines, id)?;
        }

        let combo = self.working.combo_at_mut(index);
        patch.apply(combo);
        combo.updated_at = Utc::now();

        self.changes.push(Change::ComboUpdated(id.to_string()));
        Ok(())
    }

    pub fn delete_combo(&mut self, id: &str) -> MutationResult<()> {
        let Some(index) = self.working.combo_index(id) else {
            debug!(combo_id = %id, "Delete skipped: unknown combo");
            return Err(MutationError::not_found(EntityKind::Combo, id));
        };

        Arc::make_mut(&mut self.working.combos).remove(index);

        self.changes.push(Change::ComboDeleted(id.to_string()));
        Ok(())
    }

    /// Flips a combo's active flag and returns the new value.
    pub fn toggle_combo_active(&mut self, id: &str) -> MutationResult<bool> {
        let Some(index) = self.working.combo_index(id) else {
            debug!(combo_id = %id, "Toggle skipped: unknown combo");
            return Err(MutationError::not_found(EntityKind::Combo, id));
        };

        let combo = self.working.combo_at_mut(index);
        combo.is_active = !combo.is_active;
        combo.updated_at = Utc::now();
        let active = combo.is_active;

        self.changes.push(Change::ComboUpdated(id.to_string()));
        Ok(active)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
