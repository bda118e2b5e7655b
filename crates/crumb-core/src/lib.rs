//! # crumb-core: Pure Business Logic for the Cart Screen
//!
//! This crate holds everything the cart screen computes, as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Crumb Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Mobile client (cart screen)                  │   │
//! │  │    Cart lines ──► Totals ──► Closed advisory ──► Checkout        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartView                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 crumb-session (store, GraphQL, tasks)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ explicit inputs                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ crumb-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  money   │ │ catalog  │ │ pricing  │ │  availability    │  │   │
//! │  │   │  Money   │ │ Food     │ │ resolve  │ │  is_open         │  │   │
//! │  │   │          │ │ Addon    │ │ subtotal │ │  OpeningWindow   │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK READS • NO GLOBAL STATE • PURE FUNCTIONS    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic
//! - [`catalog`] - Foods, variations, addons, options
//! - [`cart`] - Cart lines and their invariants
//! - [`pricing`] - Line resolution, subtotal, coupon, delivery, grand total
//! - [`availability`] - Opening hours
//! - [`types`] - Coupon, fulfilment, coordinates, restaurant snapshot
//! - [`validation`] - Input checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use crumb_core::money::Money;
//! use crumb_core::pricing::{apply_discount, grand_total};
//! use crumb_core::types::Coupon;
//!
//! let subtotal = Money::from_cents(1100);
//! let coupon = Coupon::new("SAVE10", 10.0);
//!
//! let discounted = apply_discount(subtotal, Some(&coupon));
//! let total = grand_total(discounted, Some(Money::from_cents(300)));
//!
//! assert_eq!(total.to_decimal_string(), "12.90");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod availability;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use availability::{
    check_availability, is_open, Availability, ClosedReason, DayOfWeek, OpeningTime,
    OpeningWindow, RestaurantSchedule, TimeOfDay, WindowComparison,
};
pub use cart::{AddonSelection, Cart, CartItem};
pub use catalog::{Addon, AddonOption, Catalog, Category, Food, Variation};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{
    apply_discount, cart_subtotal, delivery_charge, grand_total, resolve_cart_item, CartSummary,
    ResolvedItem,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Prevents accidental over-ordering from a stuck "+" button.
pub const MAX_ITEM_QUANTITY: u32 = 999;
