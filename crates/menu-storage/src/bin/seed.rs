//! # Demo Menu Seeder
//!
//! Builds a demo restaurant menu, persists it to the configured data
//! directory and prints the derived statistics.
//!
//! ## Usage
//! ```bash
//! # Seed into the platform data directory
//! cargo run -p menu-storage --bin seed
//!
//! # Seed into a specific directory
//! cargo run -p menu-storage --bin seed -- --data-dir ./data
//!
//! # Use a specific config file
//! cargo run -p menu-storage --bin seed -- --config ./menu.toml
//! ```
//!
//! ## Generated Menu
//! - Four categories: Appetizers, Mains, Desserts, Drinks
//! - Items with allergens, dietary tags, spice levels and variants
//! - Two combos, one limited to a date window

use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;

use chrono::{Datelike, Months, Utc};
use menu_core::{
    Allergen, CategoryDraft, ComboDraft, ComboLine, ItemDraft, MenuStore, MutationResult,
    SpiceLevel, VariantDraft,
};
use menu_storage::AppConfig;
use tracing_subscriber::EnvFilter;

/// (category, [(name, price_cents, allergens, tags, spice)])
type SeedItem = (
    &'static str,
    i64,
    &'static [Allergen],
    &'static [&'static str],
    Option<SpiceLevel>,
);

const MENU: &[(&str, &[SeedItem])] = &[
    (
        "Appetizers",
        &[
            ("Spring Rolls", 650, &[Allergen::Gluten, Allergen::Soy], &["vegetarian"], None),
            ("Chicken Satay", 895, &[Allergen::Peanuts], &["gluten-free"], Some(SpiceLevel::Mild)),
            ("Edamame", 495, &[Allergen::Soy], &["vegan", "gluten-free"], None),
        ],
    ),
    (
        "Mains",
        &[
            ("Green Curry", 1450, &[Allergen::Fish], &["gluten-free"], Some(SpiceLevel::Hot)),
            ("Pad Thai", 1395, &[Allergen::Peanuts, Allergen::Eggs, Allergen::Fish], &[], Some(SpiceLevel::Mild)),
            ("Tofu Stir Fry", 1250, &[Allergen::Soy, Allergen::Sesame], &["vegan"], Some(SpiceLevel::Medium)),
            ("Crying Tiger Steak", 2295, &[Allergen::Soy], &["gluten-free"], Some(SpiceLevel::ExtraHot)),
        ],
    ),
    (
        "Desserts",
        &[
            ("Mango Sticky Rice", 795, &[], &["vegan", "gluten-free"], None),
            ("Coconut Ice Cream", 595, &[Allergen::Dairy], &["vegetarian"], None),
        ],
    ),
    (
        "Drinks",
        &[
            ("Thai Iced Tea", 450, &[Allergen::Dairy], &["vegetarian"], None),
            ("Lemongrass Soda", 395, &[], &["vegan"], None),
            ("Tap Water", 0, &[], &["vegan"], None),
        ],
    ),
];

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=menu_core=trace` - Show trace for the engine only
/// - Default: INFO, DEBUG for the menu crates
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,menu=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn seed_menu(store: &mut MenuStore) -> MutationResult<()> {
    store.transaction(|tx| {
        for (category, items) in MENU {
            let category_id = tx.add_category(CategoryDraft::new(*category))?;

            for &(name, price_cents, allergens, tags, spice_level) in items.iter() {
                let mut draft = ItemDraft::new(name, price_cents).in_category(&category_id);
                draft.allergens = allergens.iter().copied().collect();
                draft.dietary_tags = tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>();
                draft.spice_level = spice_level;
                draft.cost_cents = Some(price_cents * 3 / 10);
                draft.prep_time_minutes = Some(if category == &"Drinks" { 2 } else { 12 });
                if name == "Green Curry" {
                    draft.is_featured = true;
                    draft.variants = vec![
                        VariantDraft {
                            name: "Chicken".to_string(),
                            price_adjustment_cents: 0,
                        },
                        VariantDraft {
                            name: "Prawn".to_string(),
                            price_adjustment_cents: 400,
                        },
                    ];
                }
                tx.add_item(draft)?;
            }
        }

        let find = |name: &str| {
            tx.catalog()
                .items()
                .find(|item| item.name == name)
                .map(|item| item.id.clone())
                .unwrap_or_default()
        };
        let curry = find("Green Curry");
        let rolls = find("Spring Rolls");
        let tea = find("Thai Iced Tea");
        let sticky_rice = find("Mango Sticky Rice");

        tx.add_combo(ComboDraft::new(
            "Lunch Set",
            1995,
            vec![
                ComboLine::new(&rolls, 1),
                ComboLine::new(&curry, 1),
                ComboLine::new(&tea, 1),
            ],
        ))?;

        let today = Utc::now().date_naive();
        let mut season = ComboDraft::new(
            "Mango Season Treat",
            1150,
            vec![ComboLine::new(&sticky_rice, 1), ComboLine::new(&tea, 1)],
        );
        season.valid_from = today.with_day(1);
        season.valid_until = today.checked_add_months(Months::new(2));
        tx.add_combo(season)?;

        Ok(())
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut data_dir: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--data-dir" | "-d" => {
                if i + 1 < args.len() {
                    data_dir = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Restaurant Menu Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>    Config file (default: platform menu.toml)");
                println!("  -d, --data-dir <PATH>  Data directory (overrides config)");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = AppConfig::load(config_path)?;
    if data_dir.is_some() {
        config.storage.data_dir = data_dir;
    }
    let storage = config.file_storage();

    println!("🌱 Restaurant Menu Seeder");
    println!("=========================");
    println!("Data dir: {}", storage.dir().display());
    println!("Key:      {}", config.engine.storage_key);
    println!();

    let mut store = config.open_store();
    if !store.catalog().is_empty() {
        println!("⚠ Menu already has {} items", store.all_items().len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the data file to regenerate.");
        return Ok(());
    }

    seed_menu(&mut store)?;
    store.checkpoint();
    println!(
        "✓ Seeded {} categories, {} items, {} combos",
        store.all_categories().len(),
        store.all_items().len(),
        store.all_combos().len(),
    );

    let stats = store.menu_stats();
    println!();
    println!("Menu stats:");
    println!(
        "  Items:      {} ({} available, {} featured)",
        stats.total_items, stats.available_items, stats.featured_items
    );
    println!("  Categories: {}", stats.total_categories);
    println!("  Average:    {}", stats.average_price);
    println!(
        "  Range:      {} - {}",
        stats.price_range.min, stats.price_range.max
    );

    println!();
    println!("Categories:");
    for summary in store.category_summaries() {
        println!("  {:<12} {} items", summary.name, summary.item_count);
    }

    println!();
    println!("Combos:");
    for combo in store.all_combos() {
        if let Some(pricing) = store.combo_pricing(&combo.id) {
            println!(
                "  {:<20} {} (saves {})",
                combo.name,
                combo.price(),
                pricing.savings
            );
        }
    }

    println!();
    println!("✓ Seed complete!");
    Ok(())
}
