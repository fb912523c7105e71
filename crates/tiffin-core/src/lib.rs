//! # tiffin-core: Pure Business Logic for Tiffin
//!
//! This crate is the **heart** of Tiffin. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Tiffin Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (apps/server)                       │   │
//! │  │    orders ──► billing ──► kitchen stream ──► table setup       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tiffin-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │    gst    │  │ lifecycle │  │  billing  │  │   │
//! │  │   │   Money   │  │  totals   │  │  status   │  │  line     │  │   │
//! │  │   │  RateBps  │  │  engine   │  │  machine  │  │  merge    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                 │   │
//! │  │   │   token   │  │  events   │  │ validation│                 │   │
//! │  │   │ table QR  │  │ KdsEvent  │  │   rules   │                 │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   tiffin-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Restaurant, Order, Invoice, Payment, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`gst`] - GST totals engine (discount, taxable, mode-exclusive tax)
//! - [`lifecycle`] - Order status state machine
//! - [`billing`] - Invoice line consolidation for table settlement
//! - [`token`] - Deterministic public table tokens
//! - [`events`] - Kitchen notification event payloads
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use tiffin_core::gst::{compute_totals, GstConfig};
//! use tiffin_core::money::Money;
//! use tiffin_core::types::{GstMode, RateBps};
//!
//! let config = GstConfig {
//!     mode: GstMode::CgstSgst,
//!     cgst_rate: RateBps::from_bps(250), // 2.5%
//!     sgst_rate: RateBps::from_bps(250),
//!     igst_rate: RateBps::zero(),
//! };
//!
//! // ₹45.00 subtotal, no discount
//! let totals = compute_totals(Money::from_paise(4500), None, &config);
//! assert_eq!(totals.total.paise(), 4726); // 45.00 + 1.13 + 1.13
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod error;
pub mod events;
pub mod gst;
pub mod lifecycle;
pub mod money;
pub mod token;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tiffin_core::Money` instead of
// `use tiffin_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use events::KdsEvent;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed on a single order.
///
/// ## Business Reason
/// Prevents runaway payloads; a real table order is a handful of lines.
pub const MAX_ORDER_ITEMS: usize = 100;

/// Maximum quantity on a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QTY: i64 = 999;

/// Zero-padded width of the sequence part of an invoice number.
pub const INVOICE_SEQ_WIDTH: usize = 6;

/// Formats an invoice number from its parts: `<prefix>-<yyyymm>-<seq:06>`.
///
/// The period comes from the settlement timestamp; the sequence is the value
/// returned by the tenant's atomic counter increment. The sequence does NOT
/// reset per period, so numbers stay unique even across a month boundary.
///
/// ## Example
/// ```rust
/// use tiffin_core::format_invoice_no;
///
/// assert_eq!(format_invoice_no("TIF", 202608, 42), "TIF-202608-000042");
/// ```
pub fn format_invoice_no(prefix: &str, yyyymm: u32, seq: i64) -> String {
    format!("{prefix}-{yyyymm}-{seq:0width$}", width = INVOICE_SEQ_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_invoice_no() {
        assert_eq!(format_invoice_no("TIF", 202608, 1), "TIF-202608-000001");
        assert_eq!(format_invoice_no("BOM", 202612, 123456), "BOM-202612-123456");
        // Overflow past the pad width keeps all digits.
        assert_eq!(format_invoice_no("TIF", 202701, 1_234_567), "TIF-202701-1234567");
    }
}
