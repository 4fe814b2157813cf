//! # Money Module
//!
//! Provides the `Money` type for menu prices.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Averaging three $0.10 items in floating point:                         │
//! │    (0.1 + 0.1 + 0.1) / 3 = 0.10000000000000002  ❌                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    (10 + 10 + 10) / 3 = 10 cents                                        │
//! │    Inexact means are rounded explicitly (half up)                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use menu_core::money::Money;
//!
//! let soup = Money::from_cents(550); // $5.50
//! let two_soups = soup * 2;          // $11.00
//! assert_eq!(two_soups.cents(), 1100);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for USD).
///
/// ## Where Money is Used
/// ```text
/// MenuItem.price_cents ──┬──► MenuStats.average_price / price_range
///                        │
///                        └──► ComboPricing.components_total ──► savings
/// MenuCombo.price_cents ─────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ```rust
    /// use menu_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is greater than zero.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is less than zero.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    ///
    /// ```rust
    /// use menu_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Arithmetic mean of a set of values, rounded half up to the cent.
    ///
    /// Returns zero for an empty set.
    ///
    /// ```rust
    /// use menu_core::money::Money;
    ///
    /// let prices = [Money::from_cents(100), Money::from_cents(200)];
    /// assert_eq!(Money::mean(prices).cents(), 150);
    ///
    /// // 1/3 cent rounds down, 2/3 rounds up
    /// let prices = [Money::from_cents(1), Money::from_cents(1), Money::from_cents(2)];
    /// assert_eq!(Money::mean(prices).cents(), 1);
    /// ```
    pub fn mean<I>(values: I) -> Money
    where
        I: IntoIterator<Item = Money>,
    {
        // i128 keeps large menus from overflowing the running total
        let (sum, count) = values
            .into_iter()
            .fold((0i128, 0i128), |(sum, count), m| (sum + m.0 as i128, count + 1));

        if count == 0 {
            return Money::zero();
        }

        let rounded = if sum >= 0 {
            (sum * 2 + count) / (count * 2)
        } else {
            (sum * 2 - count) / (count * 2)
        };
        Money(rounded as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-oriented formatting; the dashboard does its own localization.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
