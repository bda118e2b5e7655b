//! # Catalog
//!
//! An immutable snapshot of what a restaurant sells: foods with their
//! variations, and the add-ons and options those variations offer.
//!
//! ## Shape
//! ```text
//! Category ──► Food ──► Variation (price, addon ids)
//!                                    │
//!                                    ▼
//!                 Addon (option ids) ──► AddonOption (price)
//! ```
//!
//! Foods, addons and options are indexed by id on construction, so lookups
//! from cart lines are O(1). The snapshot is replaced wholesale when the
//! menu reloads; cart lines that point at ids which disappeared are skipped
//! by the pricing module.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Catalog Entities
// =============================================================================

/// A purchasable dish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub variations: Vec<Variation>,
}

impl Food {
    /// Looks up one of this food's variations.
    pub fn variation(&self, variation_id: &str) -> Option<&Variation> {
        self.variations.iter().find(|v| v.id == variation_id)
    }

    /// Add-ons the food supports, as listed on its first variation.
    pub fn addon_ids(&self) -> &[String] {
        self.variations
            .first()
            .map(|v| v.addons.as_slice())
            .unwrap_or(&[])
    }
}

/// A size or style of a food with its own base price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub addons: Vec<String>,
}

impl Variation {
    /// Returns the title when it is present and not blank.
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }
}

/// A group of options, e.g. "Extras" or "Sauces".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Addon {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub options: Vec<String>,
}

/// A single choice within an addon, e.g. "Cheese".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonOption {
    pub id: String,
    pub title: String,
    pub price: Money,
}

/// A menu section grouping foods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub foods: Vec<Food>,
}

// =============================================================================
// Catalog
// =============================================================================

/// Serialized form of a catalog: plain lists, no indexes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogData {
    #[serde(default)]
    foods: Vec<Food>,
    #[serde(default)]
    addons: Vec<Addon>,
    #[serde(default)]
    options: Vec<AddonOption>,
}

/// Id-indexed catalog snapshot.
///
/// Food order is preserved for display; lookups go through the indexes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "CatalogData", into = "CatalogData")]
pub struct Catalog {
    foods: Vec<Food>,
    food_index: HashMap<String, usize>,
    addons: HashMap<String, Addon>,
    options: HashMap<String, AddonOption>,
}

impl Catalog {
    /// Builds a catalog from flat lists.
    ///
    /// Duplicate ids keep the first occurrence, matching a linear
    /// find-first lookup over the lists.
    pub fn new(foods: Vec<Food>, addons: Vec<Addon>, options: Vec<AddonOption>) -> Self {
        let mut food_index = HashMap::with_capacity(foods.len());
        for (position, food) in foods.iter().enumerate() {
            food_index.entry(food.id.clone()).or_insert(position);
        }

        let mut addon_map = HashMap::with_capacity(addons.len());
        for addon in addons {
            addon_map.entry(addon.id.clone()).or_insert(addon);
        }

        let mut option_map = HashMap::with_capacity(options.len());
        for option in options {
            option_map.entry(option.id.clone()).or_insert(option);
        }

        Catalog {
            foods,
            food_index,
            addons: addon_map,
            options: option_map,
        }
    }

    /// Builds a catalog from menu categories, flattening their foods in order.
    pub fn from_categories(
        categories: Vec<Category>,
        addons: Vec<Addon>,
        options: Vec<AddonOption>,
    ) -> Self {
        let foods = categories.into_iter().flat_map(|c| c.foods).collect();
        Catalog::new(foods, addons, options)
    }

    pub fn food(&self, id: &str) -> Option<&Food> {
        self.food_index.get(id).map(|&i| &self.foods[i])
    }

    pub fn addon(&self, id: &str) -> Option<&Addon> {
        self.addons.get(id)
    }

    pub fn option(&self, id: &str) -> Option<&AddonOption> {
        self.options.get(id)
    }

    /// Foods in menu order.
    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    /// The first food on the menu; the cart screen seeds its
    /// "would you like to add these" suggestions from it.
    pub fn first_food(&self) -> Option<&Food> {
        self.foods.first()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }
}

impl From<CatalogData> for Catalog {
    fn from(data: CatalogData) -> Self {
        Catalog::new(data.foods, data.addons, data.options)
    }
}

impl From<Catalog> for CatalogData {
    fn from(catalog: Catalog) -> Self {
        let mut addons: Vec<Addon> = catalog.addons.into_values().collect();
        addons.sort_by(|a, b| a.id.cmp(&b.id));
        let mut options: Vec<AddonOption> = catalog.options.into_values().collect();
        options.sort_by(|a, b| a.id.cmp(&b.id));

        CatalogData {
            foods: catalog.foods,
            addons,
            options,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
