//! # Invoice Line Consolidation
//!
//! Pure aggregation step of table settlement: many order line items from
//! several open orders collapse into one invoice line per distinct
//! (name snapshot, unit price) pair.
//!
//! ```text
//! Order A: Tea x2 @ ₹10.00          ┐
//! Order B: Tea x1 @ ₹10.00          ├─►  Tea    x3 @ ₹10.00 = ₹30.00
//!          Samosa x1 @ ₹15.00       ┘    Samosa x1 @ ₹15.00 = ₹15.00
//! ```
//!
//! The unit price is part of the key, so a menu price change between two
//! orders on the same table produces separate lines instead of averaging.
//! Output order is deterministic (name, then price) regardless of input
//! order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::OrderItem;

/// One consolidated invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedLine {
    pub name_snapshot: String,
    pub unit_price: Money,
    pub qty: i64,
    pub line_total: Money,
}

/// Merges order items into invoice lines keyed by (name, unit price).
pub fn consolidate(items: &[OrderItem]) -> Vec<ConsolidatedLine> {
    let mut merged: BTreeMap<(String, i64), i64> = BTreeMap::new();
    for item in items {
        *merged
            .entry((item.name_snapshot.clone(), item.unit_price.paise()))
            .or_insert(0) += item.qty;
    }

    merged
        .into_iter()
        .map(|((name, price), qty)| {
            let unit_price = Money::from_paise(price);
            ConsolidatedLine {
                name_snapshot: name,
                unit_price,
                qty,
                line_total: unit_price.multiply_qty(qty),
            }
        })
        .collect()
}

/// Pre-tax subtotal over consolidated lines.
pub fn subtotal(lines: &[ConsolidatedLine]) -> Money {
    lines
        .iter()
        .fold(Money::zero(), |acc, line| acc + line.line_total)
}

// =============================================================================
// Unit Tests
// =============================================================================
