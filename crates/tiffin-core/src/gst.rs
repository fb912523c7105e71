//! # GST Computation Engine
//!
//! Pure totals math: subtotal + optional discount + tenant tax configuration
//! → a fully itemized breakdown.
//!
//! ## The Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal                                                               │
//! │     │                                                                   │
//! │     ├── discount (FLAT paise | PERCENT bps, rounded half-up)           │
//! │     ▼                                                                   │
//! │  taxable = max(0, subtotal - discountAmount)   ← over-discount clamps  │
//! │     │                                                                   │
//! │     ├── CGST_SGST mode: cgst + sgst on taxable, igst forced to 0       │
//! │     ├── IGST mode:      igst on taxable, cgst/sgst forced to 0         │
//! │     ▼                                                                   │
//! │  total = taxable + cgst + sgst + igst                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every derived field is rounded to whole paise independently (never on
//! running sums), so the result is reproducible regardless of evaluation
//! order. Tax is always computed on `taxable`, never on `subtotal`.
//!
//! This is a total function: there are no error conditions. The mode
//! override is unconditional — stored rates for the inactive family are
//! ignored, not validated.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Discount, GstMode, RateBps};

// =============================================================================
// Configuration & Output
// =============================================================================

/// A tenant's tax configuration, as read from its settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GstConfig {
    pub mode: GstMode,
    pub cgst_rate: RateBps,
    pub sgst_rate: RateBps,
    pub igst_rate: RateBps,
}

/// The itemized result of a totals computation. All fields are whole paise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GstTotals {
    pub subtotal: Money,
    pub discount_amount: Money,
    pub taxable: Money,
    pub cgst_amount: Money,
    pub sgst_amount: Money,
    pub igst_amount: Money,
    pub total: Money,
}

// =============================================================================
// Engine
// =============================================================================

/// Computes an itemized total for a subtotal under a tenant's GST config.
///
/// ## Example
/// ```rust
/// use tiffin_core::gst::{compute_totals, GstConfig};
/// use tiffin_core::money::Money;
/// use tiffin_core::types::{Discount, GstMode, RateBps};
///
/// let config = GstConfig {
///     mode: GstMode::CgstSgst,
///     cgst_rate: RateBps::from_bps(250),
///     sgst_rate: RateBps::from_bps(250),
///     igst_rate: RateBps::from_bps(500),
/// };
///
/// let totals = compute_totals(Money::from_paise(4500), None, &config);
/// assert_eq!(totals.cgst_amount.paise(), 113); // 2.5% of ₹45.00, half-up
/// assert_eq!(totals.igst_amount.paise(), 0);   // forced off in split mode
/// assert_eq!(
///     totals.total,
///     totals.taxable + totals.cgst_amount + totals.sgst_amount + totals.igst_amount
/// );
/// ```
pub fn compute_totals(subtotal: Money, discount: Option<Discount>, config: &GstConfig) -> GstTotals {
    let discount_amount = match discount {
        None => Money::zero(),
        Some(Discount::Flat(amount)) => amount,
        Some(Discount::Percent(bps)) => subtotal.apply_rate(RateBps::from_bps(bps)),
    };

    // A discount larger than the subtotal is not rejected; the taxable value
    // silently floors at zero.
    let taxable = (subtotal - discount_amount).clamp_non_negative();

    let (cgst_amount, sgst_amount, igst_amount) = match config.mode {
        GstMode::CgstSgst => (
            taxable.apply_rate(config.cgst_rate),
            taxable.apply_rate(config.sgst_rate),
            Money::zero(),
        ),
        GstMode::Igst => (
            Money::zero(),
            Money::zero(),
            taxable.apply_rate(config.igst_rate),
        ),
    };

    GstTotals {
        subtotal,
        discount_amount,
        taxable,
        cgst_amount,
        sgst_amount,
        igst_amount,
        total: taxable + cgst_amount + sgst_amount + igst_amount,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn split_config() -> GstConfig {
        GstConfig {
            mode: GstMode::CgstSgst,
            cgst_rate: RateBps::from_bps(250),
            sgst_rate: RateBps::from_bps(250),
            // Non-zero on purpose: must be ignored in split mode.
            igst_rate: RateBps::from_bps(500),
        }
    }

    fn interstate_config() -> GstConfig {
        GstConfig {
            mode: GstMode::Igst,
            cgst_rate: RateBps::from_bps(250),
            sgst_rate: RateBps::from_bps(250),
            igst_rate: RateBps::from_bps(500),
        }
    }

    fn assert_invariants(t: &GstTotals) {
        assert_eq!(
            t.total,
            t.taxable + t.cgst_amount + t.sgst_amount + t.igst_amount
        );
        assert_eq!(
            t.taxable,
            (t.subtotal - t.discount_amount).clamp_non_negative()
        );
        assert!(!t.taxable.is_negative());
    }

    #[test]
    fn test_no_discount_split_mode() {
        let t = compute_totals(Money::from_paise(4500), None, &split_config());
        assert_eq!(t.subtotal.paise(), 4500);
        assert_eq!(t.discount_amount.paise(), 0);
        assert_eq!(t.taxable.paise(), 4500);
        assert_eq!(t.cgst_amount.paise(), 113); // 112.5 rounds up
        assert_eq!(t.sgst_amount.paise(), 113);
        assert_eq!(t.igst_amount.paise(), 0);
        assert_eq!(t.total.paise(), 4726);
        assert_invariants(&t);
    }

    #[test]
    fn test_interstate_mode_forces_split_off() {
        let t = compute_totals(Money::from_paise(4500), None, &interstate_config());
        assert_eq!(t.cgst_amount.paise(), 0);
        assert_eq!(t.sgst_amount.paise(), 0);
        assert_eq!(t.igst_amount.paise(), 225); // 5% of ₹45.00
        assert_eq!(t.total.paise(), 4725);
        assert_invariants(&t);
    }

    #[test]
    fn test_flat_discount() {
        let t = compute_totals(
            Money::from_paise(10000),
            Some(Discount::Flat(Money::from_paise(1500))),
            &split_config(),
        );
        assert_eq!(t.discount_amount.paise(), 1500);
        assert_eq!(t.taxable.paise(), 8500);
        assert_invariants(&t);
    }

    #[test]
    fn test_percent_discount_rounds_half_up() {
        // 10% of ₹45.45 = 454.5 paise → 455
        let t = compute_totals(
            Money::from_paise(4545),
            Some(Discount::Percent(1000)),
            &split_config(),
        );
        assert_eq!(t.discount_amount.paise(), 455);
        assert_eq!(t.taxable.paise(), 4090);
        assert_invariants(&t);
    }

    #[test]
    fn test_over_discount_clamps_taxable_to_zero() {
        let t = compute_totals(
            Money::from_paise(1000),
            Some(Discount::Flat(Money::from_paise(5000))),
            &split_config(),
        );
        assert_eq!(t.discount_amount.paise(), 5000);
        assert_eq!(t.taxable.paise(), 0);
        assert_eq!(t.cgst_amount.paise(), 0);
        assert_eq!(t.sgst_amount.paise(), 0);
        assert_eq!(t.total.paise(), 0);
        assert_invariants(&t);
    }

    #[test]
    fn test_zero_subtotal() {
        let t = compute_totals(Money::zero(), None, &split_config());
        assert_eq!(t.total.paise(), 0);
        assert_invariants(&t);
    }

    #[test]
    fn test_tax_on_taxable_not_subtotal() {
        // ₹100.00 with a ₹50.00 flat discount at 2.5%+2.5%:
        // tax must be on ₹50.00 (125+125), not on ₹100.00 (250+250).
        let t = compute_totals(
            Money::from_paise(10000),
            Some(Discount::Flat(Money::from_paise(5000))),
            &split_config(),
        );
        assert_eq!(t.cgst_amount.paise(), 125);
        assert_eq!(t.sgst_amount.paise(), 125);
    }

    #[test]
    fn test_each_field_rounded_independently() {
        // Pick a taxable where cgst and sgst each round up. If rounding were
        // applied once to the combined tax, the result would differ by 1.
        let config = GstConfig {
            mode: GstMode::CgstSgst,
            cgst_rate: RateBps::from_bps(250),
            sgst_rate: RateBps::from_bps(250),
            igst_rate: RateBps::zero(),
        };
        let t = compute_totals(Money::from_paise(4500), None, &config);
        // 112.5 + 112.5: independent rounding gives 113 + 113 = 226,
        // combined-then-rounded would give 225.
        assert_eq!((t.cgst_amount + t.sgst_amount).paise(), 226);
    }

    #[test]
    fn test_invariants_across_grid() {
        let subtotals = [0i64, 1, 99, 100, 4500, 123_456, 10_000_000];
        let discounts = [
            None,
            Some(Discount::Flat(Money::from_paise(50))),
            Some(Discount::Flat(Money::from_paise(999_999_999))),
            Some(Discount::Percent(0)),
            Some(Discount::Percent(333)),
            Some(Discount::Percent(10_000)),
        ];
        for config in [split_config(), interstate_config()] {
            for s in subtotals {
                for d in discounts {
                    let t = compute_totals(Money::from_paise(s), d, &config);
                    assert_invariants(&t);
                    match config.mode {
                        GstMode::CgstSgst => assert!(t.igst_amount.is_zero()),
                        GstMode::Igst => {
                            assert!(t.cgst_amount.is_zero());
                            assert!(t.sgst_amount.is_zero());
                        }
                    }
                }
            }
        }
    }
}
