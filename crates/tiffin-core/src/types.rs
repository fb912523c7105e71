//! # Domain Types
//!
//! Core domain types used throughout Tiffin.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Restaurant    │   │     Order       │   │    Invoice      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  gst_mode       │   │  table_no       │   │  invoice_no     │       │
//! │  │  invoice_prefix │   │  status         │   │  gst amounts    │       │
//! │  │  invoice_seq    │   │  linked_invoice │   │  total          │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  OrderItem / InvoiceItem: snapshot copies (name + unit price frozen    │
//! │  at creation, immune to later menu edits). Invoice items are NOT       │
//! │  shared with order items — they are independent rows.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire vs storage representation
//! API enums render SCREAMING_SNAKE_CASE (`DINE_IN`, `CGST_SGST`); the
//! database stores snake_case text (`dine_in`, `cgst_sgst`) via the optional
//! `sqlx` feature derives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Rates
// =============================================================================

/// A percentage rate in basis points (1 bps = 0.01%).
///
/// 250 bps = 2.5% (a common CGST/SGST split half), 1800 bps = 18% IGST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct RateBps(u32);

impl RateBps {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        RateBps(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        RateBps(0)
    }
}

// =============================================================================
// GST Mode
// =============================================================================

/// Tax family applied by a tenant.
///
/// The two families are mutually exclusive on any invoice: split-tax tenants
/// never produce IGST amounts and interstate tenants never produce
/// CGST/SGST, regardless of what rates are stored for the inactive family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GstMode {
    /// Intra-state: tax split across two equal-rate components.
    CgstSgst,
    /// Interstate: a single integrated tax component.
    Igst,
}

// =============================================================================
// Discount
// =============================================================================

/// An optional invoice-level discount.
///
/// Serializes adjacently tagged to match the public API:
/// `{"type": "FLAT", "value": 500}` or `{"type": "PERCENT", "value": 1000}`.
/// Flat values are paise; percent values are basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Discount {
    #[serde(rename = "FLAT")]
    Flat(Money),
    #[serde(rename = "PERCENT")]
    Percent(u32),
}

impl Discount {
    /// The discriminant, for persistence.
    pub fn kind(&self) -> DiscountKind {
        match self {
            Discount::Flat(_) => DiscountKind::Flat,
            Discount::Percent(_) => DiscountKind::Percent,
        }
    }

    /// The raw stored value (paise for flat, bps for percent).
    pub fn raw_value(&self) -> i64 {
        match self {
            Discount::Flat(m) => m.paise(),
            Discount::Percent(bps) => *bps as i64,
        }
    }
}

/// Discount discriminant as stored on an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    Flat,
    Percent,
}

// =============================================================================
// Restaurant (tenant)
// =============================================================================

/// One restaurant business — the unit of data isolation.
///
/// `invoice_seq` is mutated only by the invoice sequence generator's atomic
/// increment; nothing else may write it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub gst_mode: GstMode,
    pub cgst_rate_bps: RateBps,
    pub sgst_rate_bps: RateBps,
    pub igst_rate_bps: RateBps,
    pub invoice_prefix: String,
    /// Monotonic invoice sequence counter (last issued value).
    pub invoice_seq: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The staff-editable subset of a tenant: identity plus the GST and invoice
/// numbering configuration. `invoice_seq` is deliberately absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantSettings {
    pub name: String,
    pub gst_mode: GstMode,
    pub cgst_rate_bps: RateBps,
    pub sgst_rate_bps: RateBps,
    pub igst_rate_bps: RateBps,
    pub invoice_prefix: String,
}

// =============================================================================
// Restaurant Table
// =============================================================================

/// A physical dining table with its permanent public ordering token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RestaurantTable {
    pub id: String,
    pub restaurant_id: String,
    pub table_no: String,
    /// Deterministic token (see [`crate::token`]); printed once on a QR code.
    pub public_token: String,
    pub capacity: i64,
    pub is_enabled: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order
// =============================================================================

/// How an order reaches the kitchen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    DineIn,
    Takeaway,
    Delivery,
}

/// Kitchen-facing order status. Transition rules live in
/// [`crate::lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Placed,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Placed
    }
}

/// An order header. Line items are stored separately ([`OrderItem`]).
///
/// Orders are never physically deleted; cancellation is a status. Once
/// `linked_invoice_id` is set the order is billed and can never be linked to
/// a second invoice — linkage, not status, marks it settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub restaurant_id: String,
    pub order_type: OrderType,
    /// Required for dine-in, absent otherwise.
    pub table_no: Option<String>,
    pub status: OrderStatus,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    /// Null while the order is open; set exactly once at settlement.
    pub linked_invoice_id: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A free-form item modifier ("extra cheese", "+₹0.20").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    pub name: String,
    pub price_delta: Money,
}

/// A line item on an order.
///
/// Uses the snapshot pattern: name and unit price are copied from the menu
/// at order time so later menu edits cannot retroactively change historical
/// orders or the invoices built from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub menu_item_id: String,
    /// Menu item name at order time (frozen).
    pub name_snapshot: String,
    /// Unit price in paise at order time (frozen).
    pub unit_price: Money,
    pub qty: i64,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub modifiers: Vec<Modifier>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Line total before tax (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_qty(self.qty)
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A tax invoice. Immutable after creation; only payments may be appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: String,
    pub restaurant_id: String,
    /// `<prefix>-<yyyymm>-<seq:06>`, unique per tenant, never reused.
    pub invoice_no: String,
    pub invoice_type: OrderType,
    pub table_no: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub subtotal: Money,
    pub discount_kind: Option<DiscountKind>,
    /// Paise for flat discounts, basis points for percent.
    pub discount_value: Option<i64>,
    pub discount_amount: Money,
    pub taxable: Money,
    /// GST configuration snapshot at billing time.
    pub gst_mode: GstMode,
    pub cgst_rate_bps: RateBps,
    pub sgst_rate_bps: RateBps,
    pub igst_rate_bps: RateBps,
    pub cgst_amount: Money,
    pub sgst_amount: Money,
    pub igst_amount: Money,
    pub total: Money,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A consolidated line on an invoice. Independent of the order items it was
/// built from; `line_total` equals `qty * unit_price` at creation and never
/// changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoiceItem {
    pub id: String,
    pub invoice_id: String,
    pub name_snapshot: String,
    pub unit_price: Money,
    pub qty: i64,
    pub line_total: Money,
}

// =============================================================================
// Payment
// =============================================================================

/// Accepted payment instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    Cash,
    Upi,
    Card,
}

/// A payment towards an invoice. An invoice can carry multiple payments for
/// partial settlement, though a single full payment is the common case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub invoice_id: String,
    pub mode: PaymentMode,
    pub amount: Money,
    /// External reference (UPI transaction id, card auth code).
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Placed).unwrap(),
            "\"PLACED\""
        );
        let s: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(s, OrderStatus::Cancelled);
    }

    #[test]
    fn test_gst_mode_wire_format() {
        assert_eq!(
            serde_json::to_string(&GstMode::CgstSgst).unwrap(),
            "\"CGST_SGST\""
        );
        assert_eq!(serde_json::to_string(&GstMode::Igst).unwrap(), "\"IGST\"");
    }

    #[test]
    fn test_discount_wire_format() {
        let flat = Discount::Flat(Money::from_paise(500));
        assert_eq!(
            serde_json::to_string(&flat).unwrap(),
            r#"{"type":"FLAT","value":500}"#
        );

        let pct: Discount = serde_json::from_str(r#"{"type":"PERCENT","value":1000}"#).unwrap();
        assert_eq!(pct, Discount::Percent(1000));
        assert_eq!(pct.kind(), DiscountKind::Percent);
        assert_eq!(pct.raw_value(), 1000);
    }

    #[test]
    fn test_order_item_line_total() {
        let item = OrderItem {
            id: "i1".into(),
            order_id: "o1".into(),
            menu_item_id: "m1".into(),
            name_snapshot: "Tea".into(),
            unit_price: Money::from_paise(1000),
            qty: 3,
            modifiers: vec![],
            notes: None,
            created_at: Utc::now(),
        };
        assert_eq!(item.line_total().paise(), 3000);
    }
}
