//! # Cart
//!
//! The cart as plain data: an ordered list of lines that reference the
//! catalog by id. Prices are never stored on a line; they are resolved
//! against the current catalog snapshot every time totals are computed, so
//! a menu change shows up in the cart immediately (or drops a stale line).
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Operations                                   │
//! │                                                                         │
//! │  User Action              Operation                 Change              │
//! │  ───────────              ─────────                 ──────              │
//! │                                                                         │
//! │  Add from menu ─────────► add_item() ─────────────► push or merge       │
//! │  Tap "+" ───────────────► increment(key) ─────────► qty += 1            │
//! │  Tap "-" ───────────────► decrement(key) ─────────► qty -= 1, 0 removes │
//! │  Swipe away ────────────► remove(key) ────────────► line removed        │
//! │  Order placed ──────────► clear() ────────────────► items.clear()       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ownership of the live cart belongs to the session store; this module
//! only defines the value and its invariants.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Item
// =============================================================================

/// Options chosen within one addon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonSelection {
    pub addon_id: String,
    #[serde(default)]
    pub option_ids: Vec<String>,
}

impl AddonSelection {
    pub fn new<I, S>(addon_id: impl Into<String>, option_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AddonSelection {
            addon_id: addon_id.into(),
            option_ids: option_ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// One line of the cart.
///
/// ## Invariants
/// - `quantity` is at least 1 while the line is in a cart
/// - `key` is stable for the lifetime of the line (UI identity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub key: String,
    pub food_id: String,
    pub variation_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub addons: Vec<AddonSelection>,
}

impl CartItem {
    /// Creates a line with a fresh UUID v4 key and no add-ons.
    pub fn new(food_id: impl Into<String>, variation_id: impl Into<String>, quantity: u32) -> Self {
        CartItem {
            key: Uuid::new_v4().to_string(),
            food_id: food_id.into(),
            variation_id: variation_id.into(),
            quantity,
            addons: Vec::new(),
        }
    }

    /// Adds an addon selection to the line.
    pub fn with_addon(mut self, selection: AddonSelection) -> Self {
        self.addons.push(selection);
        self
    }

    /// True when both lines describe the same dish with the same choices.
    pub fn same_configuration(&self, other: &CartItem) -> bool {
        self.food_id == other.food_id
            && self.variation_id == other.variation_id
            && self.addons == other.addons
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines with the same configuration are merged (quantity grows)
/// - Quantity never drops below 1; decrementing a single item removes it
/// - At most `MAX_CART_ITEMS` lines, `MAX_ITEM_QUANTITY` per line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Restaurant the lines were picked from.
    #[serde(default)]
    pub restaurant_id: Option<String>,

    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Creates an empty cart bound to a restaurant.
    pub fn for_restaurant(restaurant_id: impl Into<String>) -> Self {
        Cart {
            restaurant_id: Some(restaurant_id.into()),
            items: Vec::new(),
        }
    }

    /// Adds a line, or grows the quantity of an identical line.
    ///
    /// Returns the key of the line that now holds the item.
    pub fn add_item(&mut self, item: CartItem) -> CoreResult<String> {
        if item.quantity == 0 {
            return Err(CoreError::QuantityTooSmall);
        }

        if let Some(existing) = self.items.iter_mut().find(|i| i.same_configuration(&item)) {
            let new_qty = existing.quantity.saturating_add(item.quantity);
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            existing.quantity = new_qty;
            return Ok(existing.key.clone());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        if item.quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: item.quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let key = item.key.clone();
        self.items.push(item);
        Ok(key)
    }

    /// Increases a line's quantity by one and returns the new quantity.
    pub fn increment(&mut self, key: &str) -> CoreResult<u32> {
        let item = self.item_mut(key)?;
        if item.quantity >= MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: item.quantity + 1,
                max: MAX_ITEM_QUANTITY,
            });
        }
        item.quantity += 1;
        Ok(item.quantity)
    }

    /// Decreases a line's quantity by one.
    ///
    /// Returns the new quantity, or `None` when the line reached zero and
    /// was removed.
    pub fn decrement(&mut self, key: &str) -> CoreResult<Option<u32>> {
        let item = self.item_mut(key)?;
        if item.quantity > 1 {
            item.quantity -= 1;
            return Ok(Some(item.quantity));
        }
        self.remove(key)?;
        Ok(None)
    }

    /// Removes a line by key.
    pub fn remove(&mut self, key: &str) -> CoreResult<CartItem> {
        let position = self
            .items
            .iter()
            .position(|i| i.key == key)
            .ok_or_else(|| CoreError::CartItemNotFound(key.to_string()))?;
        Ok(self.items.remove(position))
    }

    /// Empties the cart and forgets the restaurant.
    pub fn clear(&mut self) {
        self.items.clear();
        self.restaurant_id = None;
    }

    pub fn item(&self, key: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.key == key)
    }

    fn item_mut(&mut self, key: &str) -> CoreResult<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|i| i.key == key)
            .ok_or_else(|| CoreError::CartItemNotFound(key.to_string()))
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities over all lines (the badge count).
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn burger(qty: u32) -> CartItem {
        CartItem::new("F1", "V1", qty).with_addon(AddonSelection::new("A1", ["O1"]))
    }

    #[test]
    fn test_add_item() {
        let mut cart = Cart::for_restaurant("R1");
        let key = cart.add_item(burger(2)).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.item(&key).unwrap().food_id, "F1");
    }

    #[test]
    fn test_identical_configuration_merges() {
        let mut cart = Cart::new();
        let first = cart.add_item(burger(2)).unwrap();
        let second = cart.add_item(burger(3)).unwrap();

        assert_eq!(first, second);
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_different_addons_are_separate_lines() {
        let mut cart = Cart::new();
        cart.add_item(burger(1)).unwrap();
        cart.add_item(CartItem::new("F1", "V1", 1)).unwrap();
        assert_eq!(cart.line_count(), 2);
    }

    #[test]
    fn test_increment_and_decrement() {
        let mut cart = Cart::new();
        let key = cart.add_item(burger(1)).unwrap();

        assert_eq!(cart.increment(&key).unwrap(), 2);
        assert_eq!(cart.decrement(&key).unwrap(), Some(1));
        assert_eq!(cart.decrement(&key).unwrap(), None);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.increment("nope"),
            Err(CoreError::CartItemNotFound(_))
        ));
        assert!(cart.remove("nope").is_err());
    }

    #[test]
    fn test_quantity_limits() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add_item(burger(0)),
            Err(CoreError::QuantityTooSmall)
        ));

        let key = cart.add_item(burger(MAX_ITEM_QUANTITY)).unwrap();
        assert!(matches!(
            cart.increment(&key),
            Err(CoreError::QuantityTooLarge { .. })
        ));
        assert!(cart.add_item(burger(1)).is_err());
    }

    #[test]
    fn test_cart_size_limit() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(CartItem::new(format!("F{}", i), "V1", 1)).unwrap();
        }
        assert!(matches!(
            cart.add_item(CartItem::new("extra", "V1", 1)),
            Err(CoreError::CartTooLarge { .. })
        ));
    }

    #[test]
    fn test_clear_forgets_restaurant() {
        let mut cart = Cart::for_restaurant("R1");
        cart.add_item(burger(1)).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.restaurant_id.is_none());
    }
}
