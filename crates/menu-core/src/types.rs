//! # Domain Types
//!
//! Catalog entities plus the drafts and patches callers hand to the
//! Mutation Layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    MenuItem     │   │  MenuCategory   │   │    MenuCombo    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  category_id ───┼──►│  sort_order     │   │  items: lines ──┼──►Item│
//! │  │  price_cents    │   │  item_count     │   │  price_cents    │       │
//! │  │  variants       │   │  (derived)      │   │  validity window│       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Drafts  (ItemDraft, CategoryDraft, ComboDraft)  → add_*                │
//! │  Patches (ItemPatch, CategoryPatch, ComboPatch)  → update_*             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! References between entities (`category_id`, combo `item_id`) are weak:
//! plain ids that may dangle depending on the engine's reference policy.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::validation::{
    validate_combo_lines, validate_name, validate_price_cents, validate_validity_window,
    ValidationResult,
};

/// Engine-generated identifier (UUID v4 string).
pub type EntityId = String;

/// Generates a fresh entity identifier.
pub fn generate_id() -> EntityId {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// Item Attributes
// =============================================================================

/// Allergens a dish may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Allergen {
    Gluten,
    Dairy,
    Eggs,
    Fish,
    Shellfish,
    TreeNuts,
    Peanuts,
    Soy,
    Sesame,
}

/// How hot a dish is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SpiceLevel {
    Mild,
    Medium,
    Hot,
    ExtraHot,
}

/// Per-serving nutrition facts. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NutritionInfo {
    pub calories: Option<u32>,
    pub protein_grams: Option<f64>,
    pub carbs_grams: Option<f64>,
    pub fat_grams: Option<f64>,
    pub sodium_mg: Option<u32>,
}

/// A priced variation of an item (size, portion, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemVariant {
    pub id: EntityId,
    pub name: String,
    /// Added to the base price; may be negative for smaller portions.
    pub price_adjustment_cents: i64,
}

// =============================================================================
// Menu Item
// =============================================================================

/// A dish or drink on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Unique identifier (UUID v4).
    pub id: EntityId,

    /// Display name.
    pub name: String,

    pub description: Option<String>,

    /// Price in cents, never negative.
    pub price_cents: i64,

    /// Cost in cents (for margin reporting).
    pub cost_cents: Option<i64>,

    /// Weak reference to the owning category.
    pub category_id: Option<EntityId>,

    /// Whether the kitchen can currently serve this item.
    pub is_available: bool,

    pub is_featured: bool,

    pub prep_time_minutes: Option<u32>,

    pub spice_level: Option<SpiceLevel>,

    #[serde(default)]
    #[ts(as = "Vec<Allergen>")]
    pub allergens: BTreeSet<Allergen>,

    #[serde(default)]
    #[ts(as = "Vec<String>")]
    pub dietary_tags: BTreeSet<String>,

    pub nutrition: Option<NutritionInfo>,

    #[serde(default)]
    pub variants: Vec<ItemVariant>,

    pub image_url: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the cost as a Money type, if known.
    #[inline]
    pub fn cost(&self) -> Option<Money> {
        self.cost_cents.map(Money::from_cents)
    }

    /// Price minus cost, if the cost is known.
    pub fn margin(&self) -> Option<Money> {
        self.cost().map(|cost| self.price() - cost)
    }

    /// Looks up a variant by id.
    pub fn variant(&self, variant_id: &str) -> Option<&ItemVariant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    /// Price of the item with an optional variant applied.
    ///
    /// An unknown variant id falls back to the base price.
    pub fn price_with_variant(&self, variant_id: Option<&str>) -> Money {
        let adjustment = variant_id
            .and_then(|id| self.variant(id))
            .map_or(0, |v| v.price_adjustment_cents);
        Money::from_cents(self.price_cents.saturating_add(adjustment))
    }
}

// =============================================================================
// Menu Category
// =============================================================================

/// A section of the menu ("Starters", "Mains", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MenuCategory {
    pub id: EntityId,

    pub name: String,

    pub description: Option<String>,

    /// Display position; lower sorts first.
    pub sort_order: i32,

    pub is_active: bool,

    /// Number of items whose `category_id` is this category.
    ///
    /// Maintained by the Mutation Layer; never set by callers.
    pub item_count: usize,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Menu Combo
// =============================================================================

/// One line of a combo: an item, how many, and optionally which variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ComboLine {
    pub item_id: EntityId,
    pub quantity: u32,
    pub variant_id: Option<EntityId>,
}

impl ComboLine {
    /// A single unit of an item, no variant.
    pub fn new(item_id: impl Into<EntityId>, quantity: u32) -> Self {
        ComboLine {
            item_id: item_id.into(),
            quantity,
            variant_id: None,
        }
    }
}

/// A bundle of items sold at one price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MenuCombo {
    pub id: EntityId,

    pub name: String,

    pub description: Option<String>,

    pub price_cents: i64,

    pub is_active: bool,

    /// First day the combo may be sold (inclusive).
    #[ts(as = "Option<String>")]
    pub valid_from: Option<NaiveDate>,

    /// Last day the combo may be sold (inclusive).
    #[ts(as = "Option<String>")]
    pub valid_until: Option<NaiveDate>,

    pub items: Vec<ComboLine>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl MenuCombo {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether `date` falls inside the validity window.
    ///
    /// An open bound never excludes a date.
    pub fn is_within_window(&self, date: NaiveDate) -> bool {
        let after_start = self.valid_from.map_or(true, |from| date >= from);
        let before_end = self.valid_until.map_or(true, |until| date <= until);
        after_start && before_end
    }
}

// =============================================================================
// Drafts
// =============================================================================

/// Caller input for a new variant; the engine assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDraft {
    pub name: String,
    pub price_adjustment_cents: i64,
}

impl VariantDraft {
    fn into_variant(self, id: EntityId) -> ItemVariant {
        ItemVariant {
            id,
            name: self.name,
            price_adjustment_cents: self.price_adjustment_cents,
        }
    }
}

/// Caller input for `add_item`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemDraft {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub cost_cents: Option<i64>,
    pub category_id: Option<EntityId>,
    pub is_available: bool,
    pub is_featured: bool,
    pub prep_time_minutes: Option<u32>,
    pub spice_level: Option<SpiceLevel>,
    pub allergens: BTreeSet<Allergen>,
    pub dietary_tags: BTreeSet<String>,
    pub nutrition: Option<NutritionInfo>,
    pub variants: Vec<VariantDraft>,
    pub image_url: Option<String>,
}

impl Default for ItemDraft {
    fn default() -> Self {
        ItemDraft {
            name: String::new(),
            description: None,
            price_cents: 0,
            cost_cents: None,
            category_id: None,
            is_available: true,
            is_featured: false,
            prep_time_minutes: None,
            spice_level: None,
            allergens: BTreeSet::new(),
            dietary_tags: BTreeSet::new(),
            nutrition: None,
            variants: Vec::new(),
            image_url: None,
        }
    }
}

impl ItemDraft {
    /// An available, uncategorized item.
    pub fn new(name: impl Into<String>, price_cents: i64) -> Self {
        ItemDraft {
            name: name.into(),
            price_cents,
            ..Default::default()
        }
    }

    /// Sets the owning category.
    pub fn in_category(mut self, category_id: impl Into<EntityId>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        validate_price_cents("price", self.price_cents)?;
        if let Some(cost) = self.cost_cents {
            validate_price_cents("cost", cost)?;
        }
        for variant in &self.variants {
            validate_name("variant name", &variant.name)?;
        }
        Ok(())
    }

    /// Materializes the draft into an item stamped with `now`.
    pub(crate) fn into_item(self, now: DateTime<Utc>) -> MenuItem {
        MenuItem {
            id: generate_id(),
            name: self.name.trim().to_string(),
            description: self.description,
            price_cents: self.price_cents,
            cost_cents: self.cost_cents,
            category_id: self.category_id,
            is_available: self.is_available,
            is_featured: self.is_featured,
            prep_time_minutes: self.prep_time_minutes,
            spice_level: self.spice_level,
            allergens: self.allergens,
            dietary_tags: self.dietary_tags,
            nutrition: self.nutrition,
            variants: self
                .variants
                .into_iter()
                .map(|v| v.into_variant(generate_id()))
                .collect(),
            image_url: self.image_url,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Caller input for `add_category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
    /// `None` places the category after the current last one.
    pub sort_order: Option<i32>,
    pub is_active: bool,
}

impl Default for CategoryDraft {
    fn default() -> Self {
        CategoryDraft {
            name: String::new(),
            description: None,
            sort_order: None,
            is_active: true,
        }
    }
}

impl CategoryDraft {
    pub fn new(name: impl Into<String>) -> Self {
        CategoryDraft {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = Some(sort_order);
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)
    }
}

/// Caller input for `add_combo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComboDraft {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub is_active: bool,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub items: Vec<ComboLine>,
}

impl Default for ComboDraft {
    fn default() -> Self {
        ComboDraft {
            name: String::new(),
            description: None,
            price_cents: 0,
            is_active: true,
            valid_from: None,
            valid_until: None,
            items: Vec::new(),
        }
    }
}

impl ComboDraft {
    pub fn new(name: impl Into<String>, price_cents: i64, items: Vec<ComboLine>) -> Self {
        ComboDraft {
            name: name.into(),
            price_cents,
            items,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        validate_price_cents("price", self.price_cents)?;
        validate_combo_lines(&self.items)?;
        validate_validity_window(self.valid_from, self.valid_until)
    }

    pub(crate) fn into_combo(self, now: DateTime<Utc>) -> MenuCombo {
        MenuCombo {
            id: generate_id(),
            name: self.name.trim().to_string(),
            description: self.description,
            price_cents: self.price_cents,
            is_active: self.is_active,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            items: self.items,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Patches
// =============================================================================
// `None` leaves a field unchanged. Clearable fields use `Option<Option<T>>`
// so that `Some(None)` clears them; in JSON an explicit `null` clears and an
// absent key leaves the field alone.

/// Maps a present JSON value (including `null`) to `Some(..)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial update for `update_item` / `bulk_update_items`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemPatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub price_cents: Option<i64>,
    #[serde(deserialize_with = "present")]
    pub cost_cents: Option<Option<i64>>,
    #[serde(deserialize_with = "present")]
    pub category_id: Option<Option<EntityId>>,
    pub is_available: Option<bool>,
    pub is_featured: Option<bool>,
    #[serde(deserialize_with = "present")]
    pub prep_time_minutes: Option<Option<u32>>,
    #[serde(deserialize_with = "present")]
    pub spice_level: Option<Option<SpiceLevel>>,
    pub allergens: Option<BTreeSet<Allergen>>,
    pub dietary_tags: Option<BTreeSet<String>>,
    #[serde(deserialize_with = "present")]
    pub nutrition: Option<Option<NutritionInfo>>,
    /// Replaces the variant list. A variant whose name matches an existing
    /// one keeps that variant's id, so combo lines naming it still resolve.
    pub variants: Option<Vec<VariantDraft>>,
    #[serde(deserialize_with = "present")]
    pub image_url: Option<Option<String>>,
}

impl ItemPatch {
    /// A patch that only moves the item to another category (or none).
    pub fn category(category_id: Option<EntityId>) -> Self {
        ItemPatch {
            category_id: Some(category_id),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(price) = self.price_cents {
            validate_price_cents("price", price)?;
        }
        if let Some(Some(cost)) = self.cost_cents {
            validate_price_cents("cost", cost)?;
        }
        for variant in self.variants.iter().flatten() {
            validate_name("variant name", &variant.name)?;
        }
        Ok(())
    }

    /// Applies every present field except `category_id`, which the
    /// Mutation Layer handles because it moves item counts.
    pub(crate) fn apply_fields(&self, item: &mut MenuItem) {
        if let Some(name) = &self.name {
            item.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(price) = self.price_cents {
            item.price_cents = price;
        }
        if let Some(cost) = self.cost_cents {
            item.cost_cents = cost;
        }
        if let Some(available) = self.is_available {
            item.is_available = available;
        }
        if let Some(featured) = self.is_featured {
            item.is_featured = featured;
        }
        if let Some(prep) = self.prep_time_minutes {
            item.prep_time_minutes = prep;
        }
        if let Some(spice) = self.spice_level {
            item.spice_level = spice;
        }
        if let Some(allergens) = &self.allergens {
            item.allergens = allergens.clone();
        }
        if let Some(tags) = &self.dietary_tags {
            item.dietary_tags = tags.clone();
        }
        if let Some(nutrition) = &self.nutrition {
            item.nutrition = nutrition.clone();
        }
        if let Some(variants) = &self.variants {
            item.variants = variants
                .iter()
                .map(|draft| {
                    let id = item
                        .variants
                        .iter()
                        .find(|existing| existing.name == draft.name)
                        .map_or_else(generate_id, |existing| existing.id.clone());
                    draft.clone().into_variant(id)
                })
                .collect();
        }
        if let Some(image_url) = &self.image_url {
            item.image_url = image_url.clone();
        }
    }
}

/// Partial update for `update_category`. `item_count` is not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl CategoryPatch {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        Ok(())
    }

    pub(crate) fn apply(&self, category: &mut MenuCategory) {
        if let Some(name) = &self.name {
            category.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            category.description = description.clone();
        }
        if let Some(sort_order) = self.sort_order {
            category.sort_order = sort_order;
        }
        if let Some(active) = self.is_active {
            category.is_active = active;
        }
    }
}

/// Partial update for `update_combo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComboPatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub price_cents: Option<i64>,
    pub is_active: Option<bool>,
    #[serde(deserialize_with = "present")]
    pub valid_from: Option<Option<NaiveDate>>,
    #[serde(deserialize_with = "present")]
    pub valid_until: Option<Option<NaiveDate>>,
    pub items: Option<Vec<ComboLine>>,
}

impl ComboPatch {
    /// Validates the patch against the combo it will be applied to, so a
    /// window is checked with both of its final bounds.
    pub fn validate_for(&self, combo: &MenuCombo) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(price) = self.price_cents {
            validate_price_cents("price", price)?;
        }
        if let Some(items) = &self.items {
            validate_combo_lines(items)?;
        }
        let from = self.valid_from.unwrap_or(combo.valid_from);
        let until = self.valid_until.unwrap_or(combo.valid_until);
        validate_validity_window(from, until)
    }

    pub(crate) fn apply(&self, combo: &mut MenuCombo) {
        if let Some(name) = &self.name {
            combo.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            combo.description = description.clone();
        }
        if let Some(price) = self.price_cents {
            combo.price_cents = price;
        }
        if let Some(active) = self.is_active {
            combo.is_active = active;
        }
        if let Some(from) = self.valid_from {
            combo.valid_from = from;
        }
        if let Some(until) = self.valid_until {
            combo.valid_until = until;
        }
        if let Some(items) = &self.items {
            combo.items = items.clone();
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> MenuItem {
        let mut draft = ItemDraft::new("Pad Thai", 1250);
        draft.cost_cents = Some(400);
        draft.variants.push(VariantDraft {
            name: "Large".to_string(),
            price_adjustment_cents: 300,
        });
        draft.into_item(Utc::now())
    }

    #[test]
    fn test_draft_defaults_to_available() {
        let draft = ItemDraft::new("Soup", 500);
        assert!(draft.is_available);
        assert!(!draft.is_featured);
        assert!(draft.category_id.is_none());
    }

    #[test]
    fn test_into_item_assigns_ids_and_timestamps() {
        let item = sample_item();
        assert!(!item.id.is_empty());
        assert_eq!(item.created_at, item.updated_at);
        assert_eq!(item.variants.len(), 1);
        assert!(!item.variants[0].id.is_empty());

        let other = sample_item();
        assert_ne!(item.id, other.id);
    }

    #[test]
    fn test_item_money_helpers() {
        let item = sample_item();
        assert_eq!(item.price().cents(), 1250);
        assert_eq!(item.margin().map(|m| m.cents()), Some(850));

        let large = item.variants[0].id.clone();
        assert_eq!(item.price_with_variant(Some(&large)).cents(), 1550);
        assert_eq!(item.price_with_variant(Some("missing")).cents(), 1250);
        assert_eq!(item.price_with_variant(None).cents(), 1250);
    }

    #[test]
    fn test_patch_variants_keep_ids_by_name() {
        let mut item = sample_item();
        let large = item.variants[0].id.clone();

        let patch = ItemPatch {
            variants: Some(vec![
                VariantDraft {
                    name: "Large".to_string(),
                    price_adjustment_cents: 350,
                },
                VariantDraft {
                    name: "Small".to_string(),
                    price_adjustment_cents: -200,
                },
            ]),
            ..Default::default()
        };
        patch.validate().unwrap();
        patch.apply_fields(&mut item);

        assert_eq!(item.variants.len(), 2);
        assert_eq!(item.variants[0].id, large);
        assert_eq!(item.price_with_variant(Some(&large)).cents(), 1600);
        assert!(!item.variants[1].id.is_empty());
        assert_ne!(item.variants[1].id, large);
    }

    #[test]
    fn test_patch_rejects_blank_variant_name() {
        let patch = ItemPatch {
            variants: Some(vec![VariantDraft {
                name: " ".to_string(),
                price_adjustment_cents: 0,
            }]),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_draft_validation() {
        assert!(ItemDraft::new("Soup", 500).validate().is_ok());
        assert!(ItemDraft::new("", 500).validate().is_err());
        assert!(ItemDraft::new("Soup", -1).validate().is_err());

        assert!(CategoryDraft::new("Mains").validate().is_ok());
        assert!(CategoryDraft::new("  ").validate().is_err());

        assert!(ComboDraft::new("Lunch", 900, vec![]).validate().is_err());
        assert!(ComboDraft::new("Lunch", 900, vec![ComboLine::new("x", 1)])
            .validate()
            .is_ok());
    }

    #[test]
    fn test_item_patch_leaves_absent_fields() {
        let mut item = sample_item();
        let patch = ItemPatch {
            price_cents: Some(1300),
            description: Some(Some("Rice noodles".to_string())),
            ..Default::default()
        };
        patch.apply_fields(&mut item);

        assert_eq!(item.price_cents, 1300);
        assert_eq!(item.description.as_deref(), Some("Rice noodles"));
        assert_eq!(item.name, "Pad Thai");
        assert_eq!(item.cost_cents, Some(400));
    }

    #[test]
    fn test_item_patch_json_null_clears() {
        let patch: ItemPatch =
            serde_json::from_str(r#"{"categoryId": null, "isFeatured": true}"#).unwrap();
        assert_eq!(patch.category_id, Some(None));
        assert_eq!(patch.is_featured, Some(true));
        assert_eq!(patch.description, None);

        let patch: ItemPatch = serde_json::from_str(r#"{"categoryId": "cat-1"}"#).unwrap();
        assert_eq!(patch.category_id, Some(Some("cat-1".to_string())));
    }

    #[test]
    fn test_combo_window() {
        let mut draft = ComboDraft::new("Summer", 1500, vec![ComboLine::new("x", 2)]);
        draft.valid_from = NaiveDate::from_ymd_opt(2026, 6, 1);
        draft.valid_until = NaiveDate::from_ymd_opt(2026, 8, 31);
        let combo = draft.into_combo(Utc::now());

        let inside = NaiveDate::from_ymd_opt(2026, 7, 15).unwrap();
        let last_day = NaiveDate::from_ymd_opt(2026, 8, 31).unwrap();
        let outside = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        assert!(combo.is_within_window(inside));
        assert!(combo.is_within_window(last_day));
        assert!(!combo.is_within_window(outside));
    }

    #[test]
    fn test_combo_patch_validates_final_window() {
        let mut draft = ComboDraft::new("Summer", 1500, vec![ComboLine::new("x", 1)]);
        draft.valid_until = NaiveDate::from_ymd_opt(2026, 8, 31);
        let combo = draft.into_combo(Utc::now());

        let bad = ComboPatch {
            valid_from: Some(NaiveDate::from_ymd_opt(2026, 9, 1)),
            ..Default::default()
        };
        assert!(bad.validate_for(&combo).is_err());

        let good = ComboPatch {
            valid_from: Some(NaiveDate::from_ymd_opt(2026, 6, 1)),
            ..Default::default()
        };
        assert!(good.validate_for(&combo).is_ok());
    }
}
