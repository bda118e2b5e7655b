//! # Restaurant Catalog Provider
//!
//! Loads the restaurant the cart belongs to: identity, availability switch,
//! minimum order, location, opening times and the full menu.
//!
//! ## Wire → Domain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GraphQL wire shape                 │  Domain (crumb-core)              │
//! │  ─────────────────                  │  ───────────────────              │
//! │  _id                                │  id                               │
//! │  price: 5.5 (decimal)               │  Money(550)                       │
//! │  location.coordinates ["lon","lat"] │  Coordinates { latitude, .. }     │
//! │  categories[].foods[]               │  Catalog (flattened, indexed)     │
//! │  openingTimes[].times ["09","00"]   │  RestaurantSchedule               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decimal prices become integer cents here and nowhere else.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crumb_core::{
    Addon, AddonOption, Catalog, Category, Coordinates, Food, Money, OpeningTime, Restaurant,
    RestaurantSchedule, Variation,
};

use crate::error::{SessionError, SessionResult};
use crate::graphql::GraphqlClient;

/// Query for one restaurant with its menu.
pub const RESTAURANT_QUERY: &str = r#"query Restaurant($id: String) {
  restaurant(id: $id) {
    _id
    name
    isAvailable
    minimumOrder
    location { coordinates }
    openingTimes { day times { startTime endTime } }
    categories {
      _id
      title
      foods { _id title image variations { _id title price addons } }
    }
    addons { _id title options }
    options { _id title price }
  }
}"#;

// =============================================================================
// Catalog Provider
// =============================================================================

/// Source of restaurant snapshots.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn restaurant(&self, restaurant_id: &str) -> SessionResult<Restaurant>;
}

#[derive(Debug, Clone)]
pub struct GraphqlCatalogProvider {
    client: GraphqlClient,
}

impl GraphqlCatalogProvider {
    pub fn new(client: GraphqlClient) -> Self {
        GraphqlCatalogProvider { client }
    }
}

#[derive(Debug, Deserialize)]
struct RestaurantData {
    restaurant: Option<RestaurantWire>,
}

#[async_trait]
impl CatalogProvider for GraphqlCatalogProvider {
    async fn restaurant(&self, restaurant_id: &str) -> SessionResult<Restaurant> {
        let data: RestaurantData = self
            .client
            .query(RESTAURANT_QUERY, json!({ "id": restaurant_id }))
            .await?;

        let wire = data.restaurant.ok_or_else(|| {
            SessionError::UpstreamFetch(format!("restaurant {} not found", restaurant_id))
        })?;
        let restaurant = wire.into_restaurant()?;

        info!(
            restaurant_id = %restaurant.id,
            foods = restaurant.catalog.foods().len(),
            "Loaded restaurant"
        );
        Ok(restaurant)
    }
}

/// Serves restaurants from memory (fixtures, offline previews).
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogProvider {
    restaurants: HashMap<String, Restaurant>,
}

impl StaticCatalogProvider {
    pub fn new(restaurants: impl IntoIterator<Item = Restaurant>) -> Self {
        StaticCatalogProvider {
            restaurants: restaurants.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalogProvider {
    async fn restaurant(&self, restaurant_id: &str) -> SessionResult<Restaurant> {
        self.restaurants.get(restaurant_id).cloned().ok_or_else(|| {
            SessionError::UpstreamFetch(format!("restaurant {} not found", restaurant_id))
        })
    }
}

/// Parses a restaurant in the API's wire shape (as returned under
/// `data.restaurant`), e.g. from a saved fixture.
pub fn restaurant_from_json(raw: &str) -> SessionResult<Restaurant> {
    let wire: RestaurantWire = serde_json::from_str(raw)?;
    wire.into_restaurant()
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestaurantWire {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    #[serde(default = "default_available")]
    is_available: bool,
    #[serde(default)]
    minimum_order: Option<f64>,
    #[serde(default)]
    location: Option<LocationWire>,
    #[serde(default)]
    opening_times: Vec<OpeningTime>,
    #[serde(default)]
    categories: Vec<CategoryWire>,
    #[serde(default)]
    addons: Vec<AddonWire>,
    #[serde(default)]
    options: Vec<OptionWire>,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct LocationWire {
    /// GeoJSON order: longitude first.
    coordinates: [CoordinateWire; 2],
}

/// Coordinates arrive as strings from some backends and numbers from others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CoordinateWire {
    Number(f64),
    Text(String),
}

impl CoordinateWire {
    fn degrees(&self) -> SessionResult<f64> {
        match self {
            CoordinateWire::Number(value) => Ok(*value),
            CoordinateWire::Text(text) => text.trim().parse().map_err(|_| {
                SessionError::UpstreamFetch(format!("invalid coordinate '{}'", text))
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CategoryWire {
    #[serde(default)]
    title: String,
    #[serde(default)]
    foods: Vec<FoodWire>,
}

#[derive(Debug, Deserialize)]
struct FoodWire {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    variations: Vec<VariationWire>,
}

#[derive(Debug, Deserialize)]
struct VariationWire {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    title: Option<String>,
    price: f64,
    #[serde(default)]
    addons: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AddonWire {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    options: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OptionWire {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    price: f64,
}

// =============================================================================
// Conversion
// =============================================================================

impl RestaurantWire {
    fn into_restaurant(self) -> SessionResult<Restaurant> {
        let location = match self.location {
            Some(loc) => {
                let [lon, lat] = loc.coordinates;
                Coordinates::from_geojson([lon.degrees()?, lat.degrees()?])
            }
            None => Coordinates::default(),
        };

        let categories = self
            .categories
            .into_iter()
            .map(|c| Category {
                title: c.title,
                foods: c.foods.into_iter().map(FoodWire::into_food).collect(),
            })
            .collect();

        let addons = self
            .addons
            .into_iter()
            .map(|a| Addon {
                id: a.id,
                title: a.title,
                options: a.options,
            })
            .collect();

        let options = self
            .options
            .into_iter()
            .map(|o| AddonOption {
                id: o.id,
                title: o.title,
                price: Money::from_decimal(o.price),
            })
            .collect();

        Ok(Restaurant {
            id: self.id,
            name: self.name,
            is_available: self.is_available,
            minimum_order: self.minimum_order.map(Money::from_decimal).unwrap_or_default(),
            location,
            schedule: RestaurantSchedule::new(self.opening_times),
            catalog: Catalog::from_categories(categories, addons, options),
        })
    }
}

impl FoodWire {
    fn into_food(self) -> Food {
        Food {
            id: self.id,
            title: self.title,
            image: self.image.filter(|i| !i.is_empty()),
            variations: self
                .variations
                .into_iter()
                .map(|v| Variation {
                    id: v.id,
                    title: v.title,
                    price: Money::from_decimal(v.price),
                    addons: v.addons,
                })
                .collect(),
        }
    }
}
