//! # Money Module
//!
//! Provides the `Money` type for every price on the cart screen.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Variation 5.00 + Cheese 0.50 + Bacon 0.70, summed as floats:           │
//! │    5.0 + 0.5 + 0.7 = 6.2 (ok) ... but 0.1 + 0.2 = 0.30000000000000004   │
//! │    and a cart total drifts by a cent after enough lines.                │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    500 + 50 + 70 = 620 cents, exactly, for any number of lines.         │
//! │    Rounding happens once: when a percentage coupon is applied,          │
//! │    and formatting to two decimals happens only for display.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use crumb_core::money::Money;
//!
//! let burger = Money::from_cents(500);
//! let cheese = Money::from_cents(50);
//! let line = (burger + cheese) * 2_i64;
//! assert_eq!(line.to_decimal_string(), "11.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::DiscountRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// Variation.price ──┐
///                   ├──► ResolvedItem.unit_price ──► ResolvedItem.line_total
/// Option.price ─────┘
///
/// Σ line totals ──► subtotal ──► coupon ──► + delivery ──► grand total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use crumb_core::money::Money;
    ///
    /// let price = Money::from_cents(550);
    /// assert_eq!(price.cents(), 550);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts, only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -5.50.
    ///
    /// ```rust
    /// use crumb_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(5, 50).cents(), 550);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Converts a decimal amount from an upstream payload into cents,
    /// rounding to the nearest cent.
    ///
    /// Only for decoding wire data (the GraphQL API sends prices as JSON
    /// numbers). Arithmetic inside the core never goes through floats.
    ///
    /// ```rust
    /// use crumb_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(5.5).cents(), 550);
    /// assert_eq!(Money::from_decimal(0.1 + 0.2).cents(), 30);
    /// ```
    pub fn from_decimal(amount: f64) -> Self {
        Money((amount * 100.0).round() as i64)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion, always 0-99.
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a line quantity.
    ///
    /// ```rust
    /// use crumb_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(550);
    /// assert_eq!(unit_price.multiply_quantity(2).cents(), 1100);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0 * qty as i64)
    }

    /// Returns `rate` of this amount, rounded half away from zero to the cent.
    ///
    /// The percentage is applied unrounded; the result is rounded once.
    pub fn percentage_of(&self, rate: DiscountRate) -> Money {
        let part = self.0 as f64 * rate.percentage() / 100.0;
        Money(part.round() as i64)
    }

    /// Subtracts a percentage discount and returns what is left.
    ///
    /// ```rust
    /// use crumb_core::money::Money;
    /// use crumb_core::types::DiscountRate;
    ///
    /// let subtotal = Money::from_cents(1100);
    /// let rate = DiscountRate::from_percentage(10.0);
    /// assert_eq!(subtotal.apply_percentage_discount(rate).cents(), 990);
    /// ```
    pub fn apply_percentage_discount(&self, rate: DiscountRate) -> Money {
        *self - self.percentage_of(rate)
    }

    /// Formats the amount with exactly two decimals and no symbol, the way
    /// line totals and the grand total are shown on screen.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }

    /// Formats the amount behind a currency symbol, e.g. `$11.00`.
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        if self.0 < 0 {
            format!("-{}{}", symbol, self.abs().to_decimal_string())
        } else {
            format!("{}{}", symbol, self.to_decimal_string())
        }
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering; the screen formats through `format_with_symbol`
/// so the configured currency symbol is used.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
