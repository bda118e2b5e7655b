//! # Domain Types
//!
//! Small value types shared by the pricing and availability modules.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DiscountRate   │   │     Coupon      │   │   Fulfilment    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  percent (f64)  │   │  code           │   │  Delivery       │       │
//! │  │  0.0 ..= 100.0  │   │  discount (%)   │   │  Pickup         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌───────────────────────────────────────┐       │
//! │  │  Coordinates    │   │  Restaurant                           │       │
//! │  │  ─────────────  │   │  ───────────────────────────────────  │       │
//! │  │  latitude       │   │  id, name, is_available,              │       │
//! │  │  longitude      │   │  minimum_order, location,             │       │
//! │  └─────────────────┘   │  schedule, catalog                    │       │
//! │                        └───────────────────────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::availability::RestaurantSchedule;
use crate::catalog::Catalog;
use crate::money::Money;

// =============================================================================
// Discount Rate
// =============================================================================

/// A coupon discount as a percentage of the item subtotal.
///
/// Kept at full precision; the only rounding happens when the discount is
/// turned into cents (see [`Money::percentage_of`]).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(f64);

impl DiscountRate {
    /// Creates a rate from a percentage, clamped to 0-100%. NaN counts as 0.
    pub fn from_percentage(pct: f64) -> Self {
        if pct.is_nan() {
            return DiscountRate(0.0);
        }
        DiscountRate(pct.clamp(0.0, 100.0))
    }

    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// A discount coupon handed to the cart screen by the coupon flow.
///
/// The discount applies to the item subtotal only, never to delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    #[serde(default)]
    pub code: String,

    /// Discount percentage, 0-100.
    pub discount: f64,
}

impl Coupon {
    pub fn new(code: impl Into<String>, discount: f64) -> Self {
        Coupon {
            code: code.into(),
            discount,
        }
    }

    pub fn rate(&self) -> DiscountRate {
        DiscountRate::from_percentage(self.discount)
    }
}

// =============================================================================
// Fulfilment
// =============================================================================

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Fulfilment {
    /// Courier delivery; the delivery charge applies.
    #[default]
    Delivery,
    /// Customer collects the order; no delivery charge.
    Pickup,
}

impl Fulfilment {
    #[inline]
    pub fn is_delivery(&self) -> bool {
        matches!(self, Fulfilment::Delivery)
    }
}

// =============================================================================
// Coordinates
// =============================================================================

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Coordinates {
            latitude,
            longitude,
        }
    }

    /// Builds a point from a GeoJSON `[longitude, latitude]` pair.
    pub const fn from_geojson(pair: [f64; 2]) -> Self {
        Coordinates {
            latitude: pair[1],
            longitude: pair[0],
        }
    }
}

// =============================================================================
// Restaurant
// =============================================================================

/// A snapshot of the restaurant the cart belongs to.
///
/// Loaded by the session layer; the core only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    /// Manual availability switch, independent of opening hours.
    pub is_available: bool,
    #[serde(default)]
    pub minimum_order: Money,
    #[serde(default)]
    pub location: Coordinates,
    #[serde(default)]
    pub schedule: RestaurantSchedule,
    #[serde(default)]
    pub catalog: Catalog,
}

// =============================================================================
// Unit Tests
// =============================================================================
