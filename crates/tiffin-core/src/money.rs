//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    ₹10.50 is stored as 1050                                             │
//! │    Every rounding step is explicit and reproducible                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The original billing rule "round each monetary field to 2 decimals,
//! half-up, independently" becomes: every derived amount is produced by
//! [`Money::apply_rate`], which rounds to whole paise half-up. Sums of
//! already-rounded paise need no further rounding, so results never depend
//! on evaluation order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::types::RateBps;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (the smallest currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: negative intermediate values can appear while
///   subtracting discounts; [`Money::clamp_non_negative`] floors them.
/// - **Single-field tuple struct**: zero-cost abstraction over i64.
/// - **Transparent serde**: serializes as a bare integer on the wire, which
///   is what the API and the database store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    ///
    /// ## Example
    /// ```rust
    /// use tiffin_core::money::Money;
    ///
    /// let price = Money::from_paise(1050); // ₹10.50
    /// assert_eq!(price.paise(), 1050);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity to form a line total.
    ///
    /// ## Example
    /// ```rust
    /// use tiffin_core::money::Money;
    ///
    /// let unit = Money::from_paise(1000); // ₹10.00
    /// assert_eq!(unit.multiply_qty(3).paise(), 3000); // ₹30.00
    /// ```
    #[inline]
    pub const fn multiply_qty(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Applies a basis-point rate with half-up rounding to whole paise.
    ///
    /// ## Implementation
    /// Integer math in i128 to prevent overflow:
    /// `(amount * bps + 5000) / 10000`. The +5000 is the half-up step
    /// (5000/10000 = 0.5 paise).
    ///
    /// ## Example
    /// ```rust
    /// use tiffin_core::money::Money;
    /// use tiffin_core::types::RateBps;
    ///
    /// let taxable = Money::from_paise(4500);   // ₹45.00
    /// let cgst = taxable.apply_rate(RateBps::from_bps(250)); // 2.5%
    /// assert_eq!(cgst.paise(), 113);           // ₹1.13 (112.5 rounds up)
    /// ```
    pub fn apply_rate(&self, rate: RateBps) -> Money {
        let paise = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money(paise as i64)
    }

    /// Floors negative values at zero.
    ///
    /// Used for `taxable = max(0, subtotal - discount)`: a discount larger
    /// than the subtotal silently caps the taxable value at zero rather than
    /// being rejected.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Human-readable rupee format, for logs and debugging only.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
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

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise_and_rupees() {
        assert_eq!(Money::from_paise(1050).paise(), 1050);
        assert_eq!(Money::from_rupees(45).paise(), 4500);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_paise(1050)), "₹10.50");
        assert_eq!(format!("{}", Money::from_paise(500)), "₹5.00");
        assert_eq!(format!("{}", Money::from_paise(-550)), "-₹5.50");
        assert_eq!(format!("{}", Money::zero()), "₹0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!(a.multiply_qty(3).paise(), 3000);
    }

    #[test]
    fn test_apply_rate_exact() {
        // ₹10.00 at 10% = ₹1.00
        let amount = Money::from_paise(1000);
        assert_eq!(amount.apply_rate(RateBps::from_bps(1000)).paise(), 100);
    }

    #[test]
    fn test_apply_rate_rounds_half_up() {
        // ₹45.00 at 2.5% = 112.5 paise → 113
        let amount = Money::from_paise(4500);
        assert_eq!(amount.apply_rate(RateBps::from_bps(250)).paise(), 113);

        // ₹10.00 at 8.25% = 82.5 paise → 83
        assert_eq!(
            Money::from_paise(1000).apply_rate(RateBps::from_bps(825)).paise(),
            83
        );
    }

    #[test]
    fn test_apply_rate_rounds_down_below_half() {
        // ₹1.23 at 1% = 1.23 paise → 1
        let amount = Money::from_paise(123);
        assert_eq!(amount.apply_rate(RateBps::from_bps(100)).paise(), 1);
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(Money::from_paise(-250).clamp_non_negative().paise(), 0);
        assert_eq!(Money::from_paise(250).clamp_non_negative().paise(), 250);
        assert_eq!(Money::zero().clamp_non_negative().paise(), 0);
    }

    #[test]
    fn test_serde_transparent() {
        let m = Money::from_paise(4500);
        assert_eq!(serde_json::to_string(&m).unwrap(), "4500");
        let back: Money = serde_json::from_str("4500").unwrap();
        assert_eq!(back, m);
    }
}
