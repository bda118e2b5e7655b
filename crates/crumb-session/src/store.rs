//! # Cart Store
//!
//! The single owner of the cart. Screens read snapshots and subscribe to
//! changes; every mutation goes through here.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Store                                      │
//! │                                                                         │
//! │   food screen ──add──►  ┌──────────────────┐                            │
//! │   cart screen ──±──►    │   CartStore      │                            │
//! │   checkout ───clear──►  │ watch::Sender    │──► watch::Receiver<Cart>   │
//! │                         │   <Cart>         │        (cart screen,       │
//! │                         └──────────────────┘         badge, checkout)   │
//! │                                                                         │
//! │   Failed mutations leave the cart untouched and notify nobody.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crumb_core::validation::validate_cart_item;
use crumb_core::{Cart, CartItem, CoreResult};

use crate::error::SessionResult;

/// Shared, observable cart.
///
/// Cloning the store hands out another handle to the same cart.
#[derive(Debug, Clone)]
pub struct CartStore {
    tx: Arc<watch::Sender<Cart>>,
}

impl Default for CartStore {
    fn default() -> Self {
        CartStore::new(Cart::new())
    }
}

impl CartStore {
    pub fn new(initial: Cart) -> Self {
        let (tx, _) = watch::channel(initial);
        CartStore { tx: Arc::new(tx) }
    }

    /// Copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.tx.borrow().clone()
    }

    /// Receiver that wakes on every successful mutation.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.tx.subscribe()
    }

    /// Adds a line picked from `restaurant_id`.
    ///
    /// A cart holds lines from one restaurant only; adding from another one
    /// starts a fresh cart.
    pub fn add(&self, restaurant_id: &str, item: CartItem) -> SessionResult<String> {
        validate_cart_item(&item)?;

        let food_id = item.food_id.clone();
        let key = self.mutate(|cart| {
            if cart.restaurant_id.as_deref() != Some(restaurant_id) {
                if !cart.is_empty() {
                    info!(
                        previous = ?cart.restaurant_id,
                        restaurant_id,
                        "Cart belongs to another restaurant, starting over"
                    );
                }
                *cart = Cart::for_restaurant(restaurant_id);
            }
            cart.add_item(item)
        })?;

        info!(key = %key, food_id = %food_id, "Added item to cart");
        Ok(key)
    }

    /// Increases a line's quantity by one.
    pub fn increment(&self, key: &str) -> SessionResult<u32> {
        let quantity = self.mutate(|cart| cart.increment(key))?;
        debug!(key, quantity, "Incremented cart line");
        Ok(quantity)
    }

    /// Decreases a line's quantity by one, removing it at zero.
    pub fn decrement(&self, key: &str) -> SessionResult<Option<u32>> {
        let quantity = self.mutate(|cart| cart.decrement(key))?;
        match quantity {
            Some(q) => debug!(key, quantity = q, "Decremented cart line"),
            None => info!(key, "Removed cart line at zero quantity"),
        }
        Ok(quantity)
    }

    pub fn remove(&self, key: &str) -> SessionResult<CartItem> {
        let removed = self.mutate(|cart| cart.remove(key))?;
        info!(key, food_id = %removed.food_id, "Removed cart line");
        Ok(removed)
    }

    pub fn clear(&self) {
        self.tx.send_modify(Cart::clear);
        info!("Cart cleared");
    }

    /// Replaces the whole cart, e.g. when restoring a saved one.
    pub fn replace(&self, cart: Cart) {
        let lines = cart.line_count();
        self.tx.send_replace(cart);
        info!(lines, "Cart replaced");
    }

    /// Runs a fallible mutation, notifying subscribers only on success.
    fn mutate<T, F>(&self, op: F) -> CoreResult<T>
    where
        F: FnOnce(&mut Cart) -> CoreResult<T>,
    {
        let mut outcome = None;
        self.tx.send_if_modified(|cart| {
            let mut draft = cart.clone();
            let result = op(&mut draft);
            let modified = result.is_ok();
            if modified {
                *cart = draft;
            }
            outcome = Some(result);
            modified
        });

        outcome.expect("send_if_modified runs the closure exactly once")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use crumb_core::{AddonSelection, CoreError};

    fn burger() -> CartItem {
        CartItem::new("F1", "V1", 1).with_addon(AddonSelection::new("A1", ["O1"]))
    }

    #[tokio::test]
    async fn test_add_notifies_subscribers() {
        let store = CartStore::default();
        let mut rx = store.subscribe();

        let key = store.add("R1", burger()).unwrap();

        assert!(rx.has_changed().unwrap());
        let cart = rx.borrow_and_update().clone();
        assert_eq!(cart.restaurant_id.as_deref(), Some("R1"));
        assert_eq!(cart.item(&key).map(|i| i.quantity), Some(1));
    }

    #[tokio::test]
    async fn test_identical_lines_merge() {
        let store = CartStore::default();
        let first = store.add("R1", burger()).unwrap();
        let second = store.add("R1", burger()).unwrap();

        assert_eq!(first, second);
        let cart = store.snapshot();
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
    }

    #[tokio::test]
    async fn test_other_restaurant_starts_over() {
        let store = CartStore::default();
        store.add("R1", burger()).unwrap();
        store.add("R2", CartItem::new("F9", "V9", 3)).unwrap();

        let cart = store.snapshot();
        assert_eq!(cart.restaurant_id.as_deref(), Some("R2"));
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 3);
    }

    #[tokio::test]
    async fn test_decrement_to_zero_removes_line() {
        let store = CartStore::default();
        let key = store.add("R1", burger()).unwrap();
        assert_eq!(store.increment(&key).unwrap(), 2);
        assert_eq!(store.decrement(&key).unwrap(), Some(1));
        assert_eq!(store.decrement(&key).unwrap(), None);
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_failed_mutation_does_not_notify() {
        let store = CartStore::default();
        let mut rx = store.subscribe();

        let err = store.increment("missing").unwrap_err();
        assert!(matches!(
            err,
            SessionError::Core(CoreError::CartItemNotFound(ref key)) if key == "missing"
        ));
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_invalid_item_rejected() {
        let store = CartStore::default();
        assert!(store.add("R1", CartItem::new("F1", "V1", 0)).is_err());
        assert!(store.snapshot().restaurant_id.is_none());
    }

    #[tokio::test]
    async fn test_clear_and_replace() {
        let store = CartStore::default();
        store.add("R1", burger()).unwrap();
        store.clear();
        assert!(store.snapshot().is_empty());
        assert!(store.snapshot().restaurant_id.is_none());

        let mut restored = Cart::for_restaurant("R3");
        restored.add_item(CartItem::new("F1", "V1", 2)).unwrap();
        store.replace(restored.clone());
        assert_eq!(store.snapshot(), restored);
    }

    #[tokio::test]
    async fn test_clones_share_the_cart() {
        let store = CartStore::default();
        let other = store.clone();
        let key = other.add("R1", burger()).unwrap();
        assert!(store.snapshot().item(&key).is_some());
    }

    #[tokio::test]
    async fn test_subscriber_wakes_on_change() {
        let store = CartStore::default();
        let mut rx = store.subscribe();

        let writer = store.clone();
        let handle = tokio::spawn(async move {
            writer.add("R1", CartItem::new("F1", "V1", 1)).unwrap();
        });

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().line_count(), 1);
        handle.await.unwrap();
    }
}
