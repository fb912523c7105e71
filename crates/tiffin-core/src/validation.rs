//! # Validation Module
//!
//! Business-rule validation for incoming order and setup payloads.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (axum)                                          │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints (table_no, invoice_no)                         │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::OrderType;
use crate::{MAX_ITEM_QTY, MAX_ORDER_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a table number ("T1", "12", "PATIO-3").
///
/// ## Example
/// ```rust
/// use tiffin_core::validation::validate_table_no;
///
/// assert!(validate_table_no("T1").is_ok());
/// assert!(validate_table_no("").is_err());
/// ```
pub fn validate_table_no(table_no: &str) -> ValidationResult<()> {
    let table_no = table_no.trim();

    if table_no.is_empty() {
        return Err(ValidationError::Required {
            field: "tableNo".to_string(),
        });
    }

    if table_no.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "tableNo".to_string(),
            max: 20,
        });
    }

    Ok(())
}

/// Validates a line-item quantity.
pub fn validate_qty(qty: i64) -> ValidationResult<()> {
    if qty < 1 {
        return Err(ValidationError::OutOfRange {
            field: "qty".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    if qty > MAX_ITEM_QTY {
        return Err(ValidationError::OutOfRange {
            field: "qty".to_string(),
            reason: format!("must be at most {MAX_ITEM_QTY}"),
        });
    }

    Ok(())
}

/// Validates a unit price in paise. Zero is legal (complimentary items).
pub fn validate_unit_price(paise: i64) -> ValidationResult<()> {
    if paise < 0 {
        return Err(ValidationError::OutOfRange {
            field: "unitPrice".to_string(),
            reason: "must not be negative".to_string(),
        });
    }
    Ok(())
}

/// Validates an item name snapshot.
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "nameSnapshot".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "nameSnapshot".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a restaurant display name.
pub fn validate_restaurant_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates an invoice number prefix ("TIF", "BOM1"). Alphanumeric only so
/// the `<prefix>-<yyyymm>-<seq>` format stays parseable.
pub fn validate_invoice_prefix(prefix: &str) -> ValidationResult<()> {
    let prefix = prefix.trim();

    if prefix.is_empty() {
        return Err(ValidationError::Required {
            field: "invoicePrefix".to_string(),
        });
    }

    if prefix.len() > 10 {
        return Err(ValidationError::TooLong {
            field: "invoicePrefix".to_string(),
            max: 10,
        });
    }

    if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::OutOfRange {
            field: "invoicePrefix".to_string(),
            reason: "must be alphanumeric".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Order-Level Validators
// =============================================================================

/// Validates the shape of a new order: item count and the fields each order
/// type requires (dine-in needs a table, delivery needs an address).
pub fn validate_order_shape(
    order_type: OrderType,
    table_no: Option<&str>,
    delivery_address: Option<&str>,
    item_count: usize,
) -> ValidationResult<()> {
    if item_count == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if item_count > MAX_ORDER_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            reason: format!("must contain at most {MAX_ORDER_ITEMS} lines"),
        });
    }

    match order_type {
        OrderType::DineIn => match table_no {
            Some(t) => validate_table_no(t)?,
            None => {
                return Err(ValidationError::Required {
                    field: "tableNo".to_string(),
                })
            }
        },
        OrderType::Delivery => {
            if delivery_address.map_or(true, |a| a.trim().is_empty()) {
                return Err(ValidationError::Required {
                    field: "deliveryAddress".to_string(),
                });
            }
        }
        OrderType::Takeaway => {}
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
    fn test_table_no() {
        assert!(validate_table_no("T1").is_ok());
        assert!(validate_table_no("  PATIO-3  ").is_ok());
        assert!(validate_table_no("").is_err());
        assert!(validate_table_no("   ").is_err());
        assert!(validate_table_no(&"X".repeat(21)).is_err());
    }

    #[test]
    fn test_qty() {
        assert!(validate_qty(1).is_ok());
        assert!(validate_qty(MAX_ITEM_QTY).is_ok());
        assert!(validate_qty(0).is_err());
        assert!(validate_qty(-2).is_err());
        assert!(validate_qty(MAX_ITEM_QTY + 1).is_err());
    }

    #[test]
    fn test_unit_price() {
        assert!(validate_unit_price(0).is_ok());
        assert!(validate_unit_price(4500).is_ok());
        assert!(validate_unit_price(-1).is_err());
    }

    #[test]
    fn test_restaurant_name() {
        assert!(validate_restaurant_name("Demo Tiffin House").is_ok());
        assert!(validate_restaurant_name("  ").is_err());
        assert!(validate_restaurant_name(&"X".repeat(101)).is_err());
    }

    #[test]
    fn test_invoice_prefix() {
        assert!(validate_invoice_prefix("TIF").is_ok());
        assert!(validate_invoice_prefix("BOM1").is_ok());
        assert!(validate_invoice_prefix("").is_err());
        assert!(validate_invoice_prefix("TIF-X").is_err());
        assert!(validate_invoice_prefix("TOOLONGPREFIX").is_err());
    }

    #[test]
    fn test_dine_in_requires_table() {
        assert!(validate_order_shape(OrderType::DineIn, Some("T1"), None, 1).is_ok());
        assert!(validate_order_shape(OrderType::DineIn, None, None, 1).is_err());
    }

    #[test]
    fn test_delivery_requires_address() {
        assert!(validate_order_shape(OrderType::Delivery, None, Some("12 MG Road"), 1).is_ok());
        assert!(validate_order_shape(OrderType::Delivery, None, None, 1).is_err());
        assert!(validate_order_shape(OrderType::Delivery, None, Some("  "), 1).is_err());
    }

    #[test]
    fn test_takeaway_needs_neither() {
        assert!(validate_order_shape(OrderType::Takeaway, None, None, 1).is_ok());
    }

    #[test]
    fn test_empty_order_rejected() {
        assert!(validate_order_shape(OrderType::Takeaway, None, None, 0).is_err());
    }
}
