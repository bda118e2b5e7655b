//! # Pricing
//!
//! Resolves cart lines against the catalog and turns them into totals.
//!
//! ## Calculation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Pricing                                     │
//! │                                                                         │
//! │  CartItem ──► resolve_cart_item ──► ResolvedItem (unit price, title)    │
//! │                    │                                                    │
//! │                    └── missing food/variation ──► None (line skipped)   │
//! │                                                                         │
//! │  Σ unit_price × quantity ─────────────────────► cart_subtotal           │
//! │                                                      │                  │
//! │  Coupon (items only) ──────────────────────► apply_discount             │
//! │                                                      │                  │
//! │  Delivery charge (None for pickup) ────────► grand_total                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All sums are integer cents. Rounding happens in exactly one place, the
//! percentage coupon; everything else is exact until it is formatted.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartItem};
use crate::catalog::Catalog;
use crate::error::{CatalogEntity, CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Coupon, Fulfilment};

// =============================================================================
// Resolved Item
// =============================================================================

/// A cart line with its catalog data filled in, ready to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedItem {
    /// Key of the cart line (UI identity).
    pub key: String,
    /// `Food(Variation)`, or just `Food` when the variation has no title.
    pub title: String,
    /// Titles of every chosen option that still exists, in selection order.
    pub option_titles: Vec<String>,
    /// Variation price plus chosen option prices.
    pub unit_price: Money,
    pub quantity: u32,
    /// `unit_price × quantity`.
    pub line_total: Money,
    pub image: Option<String>,
    /// Addons the food offers, for the "edit" affordance on the line.
    pub addon_ids: Vec<String>,
}

/// Resolves one cart line against the catalog.
///
/// ## Rules
/// - Food or variation missing: the whole line is absent (`None`)
/// - Addon missing: that selection is skipped, the line survives
/// - Option missing: that option is skipped
///
/// ```rust
/// use crumb_core::cart::CartItem;
/// use crumb_core::catalog::{Catalog, Food, Variation};
/// use crumb_core::money::Money;
/// use crumb_core::pricing::resolve_cart_item;
///
/// let catalog = Catalog::new(
///     vec![Food {
///         id: "F1".into(),
///         title: "Burger".into(),
///         image: None,
///         variations: vec![Variation {
///             id: "V1".into(),
///             title: Some("Large".into()),
///             price: Money::from_cents(500),
///             addons: vec![],
///         }],
///     }],
///     vec![],
///     vec![],
/// );
///
/// let line = resolve_cart_item(&CartItem::new("F1", "V1", 2), &catalog).unwrap();
/// assert_eq!(line.title, "Burger(Large)");
/// assert_eq!(line.line_total.cents(), 1000);
/// ```
pub fn resolve_cart_item(item: &CartItem, catalog: &Catalog) -> Option<ResolvedItem> {
    let food = catalog.food(&item.food_id)?;
    let variation = food.variation(&item.variation_id)?;

    let mut unit_price = variation.price;
    let mut option_titles = Vec::new();

    for selection in &item.addons {
        if catalog.addon(&selection.addon_id).is_none() {
            continue;
        }
        for option_id in &selection.option_ids {
            let Some(option) = catalog.option(option_id) else {
                continue;
            };
            unit_price += option.price;
            option_titles.push(option.title.clone());
        }
    }

    let title = match variation.display_title() {
        Some(variation_title) => format!("{}({})", food.title, variation_title),
        None => food.title.clone(),
    };

    Some(ResolvedItem {
        key: item.key.clone(),
        title,
        option_titles,
        unit_price,
        quantity: item.quantity,
        line_total: unit_price.multiply_quantity(item.quantity),
        image: food.image.clone(),
        addon_ids: food.addon_ids().to_vec(),
    })
}

/// Resolves every line of the cart, dropping lines that no longer exist.
pub fn resolve_cart(cart: &Cart, catalog: &Catalog) -> Vec<ResolvedItem> {
    cart.items
        .iter()
        .filter_map(|item| resolve_cart_item(item, catalog))
        .collect()
}

/// Reports the first catalog reference of a line that no longer exists.
///
/// Pricing does not need this (it skips silently); the session layer uses
/// it to log which lines went stale.
pub fn verify_cart_item(item: &CartItem, catalog: &Catalog) -> CoreResult<()> {
    let missing = |kind, id: &str| CoreError::MissingCatalogReference {
        kind,
        id: id.to_string(),
    };

    let food = catalog
        .food(&item.food_id)
        .ok_or_else(|| missing(CatalogEntity::Food, &item.food_id))?;
    food.variation(&item.variation_id)
        .ok_or_else(|| missing(CatalogEntity::Variation, &item.variation_id))?;

    for selection in &item.addons {
        catalog
            .addon(&selection.addon_id)
            .ok_or_else(|| missing(CatalogEntity::Addon, &selection.addon_id))?;
        for option_id in &selection.option_ids {
            catalog
                .option(option_id)
                .ok_or_else(|| missing(CatalogEntity::Option, option_id))?;
        }
    }

    Ok(())
}

// =============================================================================
// Totals
// =============================================================================

/// Sum of `unit_price × quantity` over every line that still resolves.
pub fn cart_subtotal(cart: &Cart, catalog: &Catalog) -> Money {
    cart.items
        .iter()
        .filter_map(|item| resolve_cart_item(item, catalog))
        .map(|line| line.line_total)
        .sum()
}

/// Applies a coupon to the item subtotal.
///
/// No coupon, or a coupon with a zero discount, leaves the subtotal as is.
pub fn apply_discount(subtotal: Money, coupon: Option<&Coupon>) -> Money {
    match coupon.map(Coupon::rate) {
        Some(rate) if !rate.is_zero() => subtotal.apply_percentage_discount(rate),
        _ => subtotal,
    }
}

/// Adds the delivery charge to a (possibly discounted) subtotal.
///
/// `None` means delivery does not apply (pickup). A charge that is zero or
/// negative contributes nothing.
pub fn grand_total(subtotal: Money, delivery_charge: Option<Money>) -> Money {
    match delivery_charge {
        Some(charge) if charge.is_positive() => subtotal + charge,
        _ => subtotal,
    }
}

/// Delivery fee for a distance: every started kilometre costs `rate`.
///
/// When the result is not positive (zero distance, bad input) the base rate
/// is charged instead.
///
/// ```rust
/// use crumb_core::money::Money;
/// use crumb_core::pricing::delivery_charge;
///
/// let rate = Money::from_cents(150);
/// assert_eq!(delivery_charge(2.3, rate).cents(), 450);
/// assert_eq!(delivery_charge(0.0, rate).cents(), 150);
/// ```
pub fn delivery_charge(distance_km: f64, rate: Money) -> Money {
    let kilometres = if distance_km.is_finite() {
        distance_km.ceil() as i64
    } else {
        0
    };
    let amount = rate * kilometres;
    if amount.is_positive() {
        amount
    } else {
        rate
    }
}

/// True when the subtotal reaches the restaurant's minimum order.
pub fn meets_minimum_order(subtotal: Money, minimum: Money) -> bool {
    subtotal >= minimum
}

// =============================================================================
// Cart Summary
// =============================================================================

/// Everything the cart screen shows about money, computed in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub lines: Vec<ResolvedItem>,
    /// Resolved lines, the count shown in the "Your Order (n)" header.
    pub line_count: usize,
    /// Lines in the cart that no longer resolve against the catalog.
    pub skipped_lines: usize,
    /// Sum of quantities over resolved lines.
    pub item_count: u32,
    /// Items total before the coupon.
    pub subtotal: Money,
    /// Amount taken off by the coupon.
    pub discount: Money,
    /// `subtotal - discount`.
    pub discounted_subtotal: Money,
    /// Delivery contribution actually added (zero for pickup).
    pub delivery: Money,
    /// `discounted_subtotal + delivery`.
    pub total: Money,
}

impl CartSummary {
    /// Prices the whole cart.
    ///
    /// `delivery_charge` is the externally computed fee; it only counts
    /// for [`Fulfilment::Delivery`].
    pub fn compute(
        cart: &Cart,
        catalog: &Catalog,
        coupon: Option<&Coupon>,
        fulfilment: Fulfilment,
        delivery_charge: Money,
    ) -> Self {
        let lines = resolve_cart(cart, catalog);
        let skipped_lines = cart.items.len() - lines.len();
        let item_count = lines.iter().map(|l| l.quantity).sum();
        let subtotal: Money = lines.iter().map(|l| l.line_total).sum();
        let discounted_subtotal = apply_discount(subtotal, coupon);

        let charge = fulfilment.is_delivery().then_some(delivery_charge);
        let total = grand_total(discounted_subtotal, charge);

        CartSummary {
            line_count: lines.len(),
            lines,
            skipped_lines,
            item_count,
            subtotal,
            discount: subtotal - discounted_subtotal,
            discounted_subtotal,
            delivery: total - discounted_subtotal,
            total,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
