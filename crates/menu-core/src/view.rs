//! # View Builder
//!
//! Pure, read-only functions that derive lists and statistics from the
//! catalog. Nothing here is cached: views are recomputed on demand from
//! whatever state they are handed.
//!
//! ## Item List Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  catalog.items()                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  filter_items(category, search)                                         │
//! │    • category: exact category_id match (when set)                       │
//! │    • search:   name, description or any dietary tag contains the        │
//! │                query, case-insensitively (when non-blank)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  sort_items(field, order)      STABLE: ties keep their input order      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<&MenuItem>  → dashboard grid / list                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::money::Money;
use crate::types::{EntityId, MenuCategory, MenuCombo, MenuItem};

// =============================================================================
// View Settings
// =============================================================================

/// Grid of cards or a dense table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

/// Field the item list is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Name,
    Price,
    CategoryName,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// View preferences that survive a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ViewSettings {
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default)]
    pub sort_by: SortField,
    #[serde(default)]
    pub sort_order: SortOrder,
}

/// A full item-list request: filters plus sort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemQuery {
    pub category_id: Option<EntityId>,
    pub search: Option<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

// =============================================================================
// Filtering and Sorting
// =============================================================================

/// Whether an item matches a lower-cased search needle.
fn matches_search(item: &MenuItem, needle: &str) -> bool {
    item.name.to_lowercase().contains(needle)
        || item
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
        || item
            .dietary_tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}

/// Keeps items in `category_id` (when set) that match `search` (when
/// non-blank). Input order is preserved.
pub fn filter_items<'a, I>(
    items: I,
    category_id: Option<&str>,
    search: Option<&str>,
) -> Vec<&'a MenuItem>
where
    I: IntoIterator<Item = &'a MenuItem>,
{
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    items
        .into_iter()
        .filter(|item| category_id.map_or(true, |c| item.category_id.as_deref() == Some(c)))
        .filter(|item| needle.as_deref().map_or(true, |n| matches_search(item, n)))
        .collect()
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Text(String),
    Cents(i64),
    Time(DateTime<Utc>),
}

/// Sorts items in place by `sort_by`, ascending or descending.
///
/// The sort is stable in both directions: descending reverses the
/// comparison, not the result, so tied items keep their input order.
/// Names compare case-insensitively; an item without a resolvable
/// category sorts under the empty category name.
pub fn sort_items<'a, 'c, C>(
    items: &mut [&'a MenuItem],
    sort_by: SortField,
    order: SortOrder,
    categories: C,
) where
    C: IntoIterator<Item = &'c MenuCategory>,
{
    let category_names: HashMap<&str, String> = match sort_by {
        SortField::CategoryName => categories
            .into_iter()
            .map(|c| (c.id.as_str(), c.name.to_lowercase()))
            .collect(),
        _ => HashMap::new(),
    };

    let mut keyed: Vec<(SortKey, &'a MenuItem)> = items
        .iter()
        .map(|&item| {
            let key = match sort_by {
                SortField::Name => SortKey::Text(item.name.to_lowercase()),
                SortField::Price => SortKey::Cents(item.price_cents),
                SortField::CategoryName => SortKey::Text(
                    item.category_id
                        .as_deref()
                        .and_then(|id| category_names.get(id))
                        .cloned()
                        .unwrap_or_default(),
                ),
                SortField::CreatedAt => SortKey::Time(item.created_at),
            };
            (key, item)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match order {
        SortOrder::Asc => a.cmp(b),
        SortOrder::Desc => b.cmp(a),
    });

    for (slot, (_, item)) in items.iter_mut().zip(keyed) {
        *slot = item;
    }
}

/// Filters then sorts the catalog's items per `query`.
pub fn query_items<'a>(catalog: &'a Catalog, query: &ItemQuery) -> Vec<&'a MenuItem> {
    let mut items = filter_items(
        catalog.items(),
        query.category_id.as_deref(),
        query.search.as_deref(),
    );
    sort_items(&mut items, query.sort_by, query.sort_order, catalog.categories());
    items
}

// =============================================================================
// Statistics
// =============================================================================

/// Cheapest and most expensive priced item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceRange {
    pub min: Money,
    pub max: Money,
}

/// Headline numbers for the menu dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MenuStats {
    pub total_items: usize,
    pub available_items: usize,
    pub featured_items: usize,
    pub total_categories: usize,
    /// Mean of prices above zero, rounded to the cent; zero if none.
    pub average_price: Money,
    /// Over prices above zero; `{0, 0}` if none.
    pub price_range: PriceRange,
}

/// Computes `MenuStats`.
///
/// Free (zero-priced) items count toward the totals but not toward the
/// average or the range.
pub fn menu_stats<'a, I, C>(items: I, categories: C) -> MenuStats
where
    I: IntoIterator<Item = &'a MenuItem>,
    C: IntoIterator<Item = &'a MenuCategory>,
{
    let mut stats = MenuStats {
        total_categories: categories.into_iter().count(),
        ..MenuStats::default()
    };
    let mut priced = Vec::new();

    for item in items {
        stats.total_items += 1;
        if item.is_available {
            stats.available_items += 1;
        }
        if item.is_featured {
            stats.featured_items += 1;
        }
        if item.price().is_positive() {
            priced.push(item.price());
        }
    }

    if let (Some(&min), Some(&max)) = (priced.iter().min(), priced.iter().max()) {
        stats.price_range = PriceRange { min, max };
    }
    stats.average_price = Money::mean(priced);
    stats
}

/// One row of the category sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: EntityId,
    pub name: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub item_count: usize,
    pub available_count: usize,
}

/// Categories in display order with their item and availability counts.
pub fn category_summaries(catalog: &Catalog) -> Vec<CategorySummary> {
    catalog
        .categories()
        .map(|category| CategorySummary {
            id: category.id.clone(),
            name: category.name.clone(),
            sort_order: category.sort_order,
            is_active: category.is_active,
            item_count: category.item_count,
            available_count: catalog
                .items_in_category(&category.id)
                .filter(|item| item.is_available)
                .count(),
        })
        .collect()
}

// =============================================================================
// Combos
// =============================================================================

/// What a combo saves compared with buying its lines separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ComboPricing {
    /// Sum of resolvable lines: (item price + variant adjustment) × quantity.
    pub components_total: Money,
    /// `components_total - combo price`; negative when the combo costs more.
    pub savings: Money,
    /// Line item ids that do not resolve and were left out of the total.
    pub unresolved_items: Vec<EntityId>,
}

pub fn combo_pricing(combo: &MenuCombo, catalog: &Catalog) -> ComboPricing {
    let mut components_total = Money::zero();
    let mut unresolved_items = Vec::new();

    for line in &combo.items {
        match catalog.item(&line.item_id) {
            Some(item) => {
                components_total += item
                    .price_with_variant(line.variant_id.as_deref())
                    .multiply_quantity(i64::from(line.quantity));
            }
            None => unresolved_items.push(line.item_id.clone()),
        }
    }

    ComboPricing {
        components_total,
        savings: components_total - combo.price(),
        unresolved_items,
    }
}

/// Active combos whose validity window contains `date`.
pub fn combos_valid_on<'a, I>(combos: I, date: NaiveDate) -> Vec<&'a MenuCombo>
where
    I: IntoIterator<Item = &'a MenuCombo>,
{
    combos
        .into_iter()
        .filter(|combo| combo.is_active && combo.is_within_window(date))
        .collect()
}

// =============================================================================
// Dangling References
// =============================================================================

/// A reference from `owner_id` to `missing_id` that does not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DanglingReference {
    pub owner_id: EntityId,
    pub missing_id: EntityId,
}

/// Every unresolved item→category and combo→item reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DanglingReport {
    pub item_categories: Vec<DanglingReference>,
    pub combo_items: Vec<DanglingReference>,
}

impl DanglingReport {
    pub fn is_empty(&self) -> bool {
        self.item_categories.is_empty() && self.combo_items.is_empty()
    }
}

pub fn dangling_references(catalog: &Catalog) -> DanglingReport {
    let item_categories = catalog
        .items()
        .filter_map(|item| {
            let category_id = item.category_id.as_ref()?;
            catalog.category(category_id).is_none().then(|| DanglingReference {
                owner_id: item.id.clone(),
                missing_id: category_id.clone(),
            })
        })
        .collect();

    let combo_items = catalog
        .combos()
        .flat_map(|combo| {
            combo
                .items
                .iter()
                .filter(|line| catalog.item(&line.item_id).is_none())
                .map(|line| DanglingReference {
                    owner_id: combo.id.clone(),
                    missing_id: line.item_id.clone(),
                })
        })
        .collect();

    DanglingReport {
        item_categories,
        combo_items,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
