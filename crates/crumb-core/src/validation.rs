//! # Validation Module
//!
//! Input checks for values that come from outside the core: coupons from
//! the coupon screen, quantities from the stepper, rates from config.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Mobile client                                                │
//! │  └── Stepper never goes below 1, coupon field trimmed                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Session / config (Rust)                                      │
//! │  └── THIS MODULE: reject bad quantities, discounts, rates              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Pricing                                                      │
//! │  └── Clamps and skips; never fails                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::cart::CartItem;
use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Coupon;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity: 1 to `MAX_ITEM_QUANTITY`.
///
/// ```rust
/// use crumb_core::validation::validate_quantity;
///
/// assert!(validate_quantity(2).is_ok());
/// assert!(validate_quantity(0).is_err());
/// ```
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY as i64,
        });
    }

    Ok(())
}

/// Validates a catalog price. Zero is allowed (free extras).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a coupon's discount percentage: 0 to 100.
pub fn validate_discount_percentage(pct: f64) -> ValidationResult<()> {
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a coupon handed over by the coupon screen.
pub fn validate_coupon(coupon: &Coupon) -> ValidationResult<()> {
    if coupon.code.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "coupon code".to_string(),
        });
    }
    validate_discount_percentage(coupon.discount)
}

/// Validates the per-kilometre delivery rate from configuration.
pub fn validate_delivery_rate(rate: Money) -> ValidationResult<()> {
    if rate.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "delivery rate".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Cart Validators
// =============================================================================

/// Validates a new cart line before it reaches the store.
pub fn validate_cart_item(item: &CartItem) -> ValidationResult<()> {
    if item.food_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "food id".to_string(),
        });
    }

    if item.variation_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "variation id".to_string(),
        });
    }

    validate_quantity(item.quantity)
}

/// Validates that one more line fits in the cart.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(550)).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_discount_percentage() {
        assert!(validate_discount_percentage(0.0).is_ok());
        assert!(validate_discount_percentage(12.5).is_ok());
        assert!(validate_discount_percentage(100.0).is_ok());
        assert!(validate_discount_percentage(100.5).is_err());
        assert!(validate_discount_percentage(-1.0).is_err());
        assert!(validate_discount_percentage(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_coupon() {
        assert!(validate_coupon(&Coupon::new("SAVE10", 10.0)).is_ok());
        assert_eq!(
            validate_coupon(&Coupon::new("  ", 10.0)),
            Err(ValidationError::Required {
                field: "coupon code".to_string()
            })
        );
        assert!(validate_coupon(&Coupon::new("GREEDY", 250.0)).is_err());
    }

    #[test]
    fn test_validate_cart_item() {
        assert!(validate_cart_item(&CartItem::new("F1", "V1", 1)).is_ok());
        assert!(validate_cart_item(&CartItem::new("", "V1", 1)).is_err());
        assert!(validate_cart_item(&CartItem::new("F1", " ", 1)).is_err());
        assert!(validate_cart_item(&CartItem::new("F1", "V1", 0)).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS - 1).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS).is_err());
    }

    #[test]
    fn test_validate_delivery_rate() {
        assert!(validate_delivery_rate(Money::from_cents(150)).is_ok());
        assert!(validate_delivery_rate(Money::from_cents(-150)).is_err());
    }
}
