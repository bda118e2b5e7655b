//! # Error Types
//!
//! Domain-specific error types for crumb-core.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  crumb-core errors (this file)                                         │
//! │  ├── CoreError        - Cart and catalog rule violations               │
//! │  └── ValidationError  - Input validation failures                      │
//! │  crumb-session errors (separate crate)                                 │
//! │  └── SessionError     - Config, upstream fetch, cancellation           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SessionError → screen state       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Non-fatal by construction
//! Pricing never returns an error: a cart line pointing at a food, variation,
//! addon or option that left the menu is skipped. `MissingCatalogReference`
//! exists so callers that want to report stale lines can name them.

use std::fmt;

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Kind of catalog entity a cart line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogEntity {
    Food,
    Variation,
    Addon,
    Option,
}

impl fmt::Display for CatalogEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogEntity::Food => "food",
            CatalogEntity::Variation => "variation",
            CatalogEntity::Addon => "addon",
            CatalogEntity::Option => "option",
        };
        f.write_str(name)
    }
}

/// Cart and catalog rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A cart line refers to something no longer in the catalog.
    ///
    /// ## When This Occurs
    /// - The menu was edited after the item was added to the cart
    /// - The cart was restored from storage against a newer menu
    #[error("Missing {kind} in catalog: {id}")]
    MissingCatalogReference { kind: CatalogEntity, id: String },

    /// No cart line has the given key.
    #[error("Cart item not found: {0}")]
    CartItemNotFound(String),

    /// Adding a new line would exceed `MAX_CART_ITEMS`.
    #[error("Cart cannot hold more than {max} lines")]
    CartTooLarge { max: usize },

    #[error("Quantity {requested} is above the per-line limit of {max}")]
    QuantityTooLarge { requested: u32, max: u32 },

    /// A line was added with quantity zero.
    #[error("Quantity must be at least 1")]
    QuantityTooSmall,

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Rejected input, named by field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    /// Inclusive bounds.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed time, unknown mode).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_reference_and_quantity_messages() {
        let err = CoreError::MissingCatalogReference {
            kind: CatalogEntity::Variation,
            id: "V9".to_string(),
        };
        assert_eq!(err.to_string(), "Missing variation in catalog: V9");

        let err = CoreError::QuantityTooLarge {
            requested: 1000,
            max: 999,
        };
        assert_eq!(err.to_string(), "Quantity 1000 is above the per-line limit of 999");
    }

    #[test]
    fn test_discount_range_message() {
        let err = ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 100,
        };
        assert_eq!(err.to_string(), "discount must be between 0 and 100");
    }

    #[test]
    fn test_missing_food_id_wraps_into_core_error() {
        let err: CoreError = ValidationError::Required {
            field: "food_id".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Invalid input: food_id is required");
    }
}
