//! Table settlement: the order-to-invoice pipeline.
//!
//! ## The Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. load tenant settings            (TENANT_NOT_FOUND)                  │
//! │  2. fetch open orders on the table  (NO_OPEN_ORDERS_FOR_TABLE)         │
//! │  3. fetch all their items                                               │
//! │  4. consolidate lines + subtotal    (tiffin-core, pure)                │
//! │  5. compute GST totals              (tiffin-core, pure)                │
//! │  6. reserve invoice number          (atomic counter)                    │
//! │  7. one transaction: invoice + lines + payments + conditional claim    │
//! │       claim short? ──► SETTLEMENT_CONFLICT, nothing persisted          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Step 6 runs before step 7 on purpose: a settlement that loses the claim
//! race burns its reserved number. Gaps in issued numbers are fine;
//! duplicates never are.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use tiffin_core::billing::{consolidate, subtotal};
use tiffin_core::gst::{compute_totals, GstConfig};
use tiffin_core::types::{Discount, PaymentMode};
use tiffin_core::{CoreError, Invoice, InvoiceItem, Money, Payment};
use tiffin_db::DbError;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// =============================================================================
// Request / Response
// =============================================================================

/// The payment recorded at settlement. `amount` may be omitted and defaults
/// to the invoice total; an explicit amount is recorded as given, so a
/// partial payment leaves the balance visible on the invoice.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    pub mode: PaymentMode,
    pub amount: Option<Money>,
    pub reference: Option<String>,
}

/// Parameters for settling a table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleTableRequest {
    pub table_no: String,
    pub discount: Option<Discount>,
    pub payment: PaymentInput,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
}

/// A settled invoice: the id + print path the client needs immediately,
/// plus the full invoice detail so the receipt can render without a second
/// round trip.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettledInvoice {
    pub invoice_id: String,
    /// Where the print view fetches its data.
    pub print_path: String,
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
    pub payments: Vec<Payment>,
    pub settled_order_ids: Vec<String>,
}

// =============================================================================
// Service
// =============================================================================

/// Settles every open order on a table into one invoice.
pub async fn settle_table(
    state: &AppState,
    restaurant_id: &str,
    created_by: Option<String>,
    req: SettleTableRequest,
) -> ApiResult<SettledInvoice> {
    tiffin_core::validation::validate_table_no(&req.table_no)?;

    // 1. Tenant settings (tax snapshot source).
    let restaurant = state
        .db
        .restaurants()
        .get_by_id(restaurant_id)
        .await?
        .ok_or(CoreError::TenantNotFound)
        .map_err(ApiError::from)?;

    // 2. The settlement working set.
    let orders = state
        .db
        .orders()
        .open_for_table(restaurant_id, &req.table_no)
        .await?;
    if orders.is_empty() {
        return Err(CoreError::NoOpenOrdersForTable.into());
    }
    let order_ids: Vec<String> = orders.iter().map(|o| o.id.clone()).collect();

    // 3-5. Pure computation.
    let items = state.db.orders().items_for_orders(&order_ids).await?;
    let lines = consolidate(&items);
    let order_subtotal = subtotal(&lines);

    let config = GstConfig {
        mode: restaurant.gst_mode,
        cgst_rate: restaurant.cgst_rate_bps,
        sgst_rate: restaurant.sgst_rate_bps,
        igst_rate: restaurant.igst_rate_bps,
    };
    let totals = compute_totals(order_subtotal, req.discount, &config);

    // Validate the payment before reserving a number, so a bad amount does
    // not consume one. Partial payments are legal and recorded as given.
    let paid = req.payment.amount.unwrap_or(totals.total);
    if paid.paise() < 0 {
        return Err(ApiError::validation(format!(
            "payment amount {paid} must not be negative"
        )));
    }

    // 6. Reserve the number (burned on conflict, by design of the counter).
    let invoice_no = state
        .db
        .restaurants()
        .next_invoice_no(restaurant_id)
        .await
        .map_err(|e| match e {
            DbError::NotFound { .. } => CoreError::TenantNotFound.into(),
            other => ApiError::from(other),
        })?;

    let now = Utc::now();
    let invoice_id = Uuid::new_v4().to_string();

    let invoice = Invoice {
        id: invoice_id.clone(),
        restaurant_id: restaurant_id.to_string(),
        invoice_no,
        invoice_type: orders[0].order_type,
        table_no: Some(req.table_no.clone()),
        customer_name: req.customer_name,
        customer_phone: req.customer_phone,
        subtotal: totals.subtotal,
        discount_kind: req.discount.map(|d| d.kind()),
        discount_value: req.discount.map(|d| d.raw_value()),
        discount_amount: totals.discount_amount,
        taxable: totals.taxable,
        gst_mode: restaurant.gst_mode,
        cgst_rate_bps: restaurant.cgst_rate_bps,
        sgst_rate_bps: restaurant.sgst_rate_bps,
        igst_rate_bps: restaurant.igst_rate_bps,
        cgst_amount: totals.cgst_amount,
        sgst_amount: totals.sgst_amount,
        igst_amount: totals.igst_amount,
        total: totals.total,
        created_by,
        created_at: now,
    };

    let invoice_items: Vec<InvoiceItem> = lines
        .into_iter()
        .map(|line| InvoiceItem {
            id: Uuid::new_v4().to_string(),
            invoice_id: invoice_id.clone(),
            name_snapshot: line.name_snapshot,
            unit_price: line.unit_price,
            qty: line.qty,
            line_total: line.line_total,
        })
        .collect();

    let payments = vec![Payment {
        id: Uuid::new_v4().to_string(),
        invoice_id: invoice_id.clone(),
        mode: req.payment.mode,
        amount: paid,
        reference: req.payment.reference.clone(),
        created_at: now,
    }];

    // 7. The atomic write.
    state
        .db
        .invoices()
        .settle(&invoice, &invoice_items, &payments, &order_ids)
        .await
        .map_err(|e| match e {
            DbError::Conflict(_) => CoreError::SettlementConflict.into(),
            other => ApiError::from(other),
        })?;

    info!(
        restaurant_id,
        invoice_no = %invoice.invoice_no,
        table_no = %req.table_no,
        orders = order_ids.len(),
        total = %invoice.total,
        "Table settled"
    );

    Ok(SettledInvoice {
        invoice_id: invoice_id.clone(),
        print_path: format!("/api/billing/invoices/{invoice_id}"),
        invoice,
        items: invoice_items,
        payments,
        settled_order_ids: order_ids,
    })
}


// =============================================================================
// Integration Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtManager;
    use crate::bus::KdsBus;
    use crate::config::ServerConfig;
    use tiffin_core::types::{GstMode, OrderStatus, OrderType, RateBps};
    use tiffin_core::{Order, OrderItem, Restaurant};
    use tiffin_db::{Database, DbConfig};

    async fn test_state() -> AppState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        db.restaurants()
            .insert(&Restaurant {
                id: "r1".into(),
                name: "Demo".into(),
                gst_mode: GstMode::CgstSgst,
                cgst_rate_bps: RateBps::from_bps(250),
                sgst_rate_bps: RateBps::from_bps(250),
                igst_rate_bps: RateBps::from_bps(500),
                invoice_prefix: "TIF".into(),
                invoice_seq: 0,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        AppState::new(
            db,
            KdsBus::new(16),
            JwtManager::new("test-secret".into(), 3600),
            ServerConfig {
                http_port: 0,
                database_path: ":memory:".into(),
                jwt_secret: "test-secret".into(),
                jwt_lifetime_secs: 3600,
                kds_bus_capacity: 16,
            },
        )
    }

    async fn seed_order(state: &AppState, id: &str, table_no: &str, lines: &[(&str, i64, i64)]) {
        let now = Utc::now();
        let items: Vec<OrderItem> = lines
            .iter()
            .map(|(name, price, qty)| OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: id.into(),
                menu_item_id: format!("menu-{name}"),
                name_snapshot: name.to_string(),
                unit_price: Money::from_paise(*price),
                qty: *qty,
                modifiers: vec![],
                notes: None,
                created_at: now,
            })
            .collect();

        state
            .db
            .orders()
            .create(
                &Order {
                    id: id.into(),
                    restaurant_id: "r1".into(),
                    order_type: OrderType::DineIn,
                    table_no: Some(table_no.into()),
                    status: OrderStatus::Placed,
                    customer_name: None,
                    customer_phone: None,
                    delivery_address: None,
                    linked_invoice_id: None,
                    created_by: None,
                    created_at: now,
                    updated_at: now,
                },
                &items,
            )
            .await
            .unwrap();
    }

    fn cash() -> PaymentInput {
        PaymentInput {
            mode: PaymentMode::Cash,
            amount: None,
            reference: None,
        }
    }

    fn settle_req(table_no: &str) -> SettleTableRequest {
        SettleTableRequest {
            table_no: table_no.into(),
            discount: None,
            payment: cash(),
            customer_name: None,
            customer_phone: None,
        }
    }

    #[tokio::test]
    async fn test_settles_two_orders_with_consolidation() {
        let state = test_state().await;
        // Tea x2 + Tea x1 across two orders, one Samosa.
        seed_order(&state, "o1", "T1", &[("Tea", 1000, 2)]).await;
        seed_order(&state, "o2", "T1", &[("Tea", 1000, 1), ("Samosa", 1500, 1)]).await;

        let settled = settle_table(&state, "r1", Some("u1".into()), settle_req("T1"))
            .await
            .unwrap();

        // Lines merged by (name, price): Samosa x1, Tea x3.
        assert_eq!(settled.items.len(), 2);
        assert_eq!(settled.items[0].name_snapshot, "Samosa");
        assert_eq!(settled.items[1].name_snapshot, "Tea");
        assert_eq!(settled.items[1].qty, 3);

        // ₹45.00 at 2.5% + 2.5% = ₹47.26.
        assert_eq!(settled.invoice.subtotal.paise(), 4500);
        assert_eq!(settled.invoice.cgst_amount.paise(), 113);
        assert_eq!(settled.invoice.sgst_amount.paise(), 113);
        assert_eq!(settled.invoice.igst_amount.paise(), 0);
        assert_eq!(settled.invoice.total.paise(), 4726);

        assert!(settled.invoice.invoice_no.starts_with("TIF-"));
        assert_eq!(settled.payments[0].amount.paise(), 4726);
        assert_eq!(settled.settled_order_ids, vec!["o1", "o2"]);

        // The table is clear.
        let err = settle_table(&state, "r1", None, settle_req("T1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { code, .. } if code == "NO_OPEN_ORDERS_FOR_TABLE"));
    }

    #[tokio::test]
    async fn test_discount_applies_before_tax() {
        let state = test_state().await;
        seed_order(&state, "o1", "T1", &[("Thali", 10000, 1)]).await;

        let mut req = settle_req("T1");
        req.discount = Some(Discount::Flat(Money::from_paise(5000)));

        let settled = settle_table(&state, "r1", None, req).await.unwrap();
        assert_eq!(settled.invoice.discount_amount.paise(), 5000);
        assert_eq!(settled.invoice.taxable.paise(), 5000);
        assert_eq!(settled.invoice.cgst_amount.paise(), 125);
        assert_eq!(settled.invoice.total.paise(), 5250);
    }

    #[tokio::test]
    async fn test_empty_table_not_found() {
        let state = test_state().await;
        let err = settle_table(&state, "r1", None, settle_req("T9"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { code, .. } if code == "NO_OPEN_ORDERS_FOR_TABLE"));
    }

    #[tokio::test]
    async fn test_unknown_tenant() {
        let state = test_state().await;
        let err = settle_table(&state, "r-missing", None, settle_req("T1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { code, .. } if code == "TENANT_NOT_FOUND"));
    }

    fn stub_invoice(id: &str, invoice_no: &str) -> Invoice {
        Invoice {
            id: id.into(),
            restaurant_id: "r1".into(),
            invoice_no: invoice_no.into(),
            invoice_type: OrderType::DineIn,
            table_no: Some("T1".into()),
            customer_name: None,
            customer_phone: None,
            subtotal: Money::from_paise(1000),
            discount_kind: None,
            discount_value: None,
            discount_amount: Money::zero(),
            taxable: Money::from_paise(1000),
            gst_mode: GstMode::CgstSgst,
            cgst_rate_bps: RateBps::from_bps(250),
            sgst_rate_bps: RateBps::from_bps(250),
            igst_rate_bps: RateBps::from_bps(500),
            cgst_amount: Money::from_paise(25),
            sgst_amount: Money::from_paise(25),
            igst_amount: Money::zero(),
            total: Money::from_paise(1050),
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_lost_claim_race_is_conflict() {
        let state = test_state().await;
        seed_order(&state, "o1", "T1", &[("Tea", 1000, 1)]).await;

        // Simulate a concurrent settlement that claimed o1 between fetch and
        // write: settle it into another invoice first.
        state
            .db
            .invoices()
            .settle(
                &stub_invoice("inv-winner", "TIF-202608-000098"),
                &[],
                &[],
                &["o1".to_string()],
            )
            .await
            .unwrap();

        // open_for_table now skips o1, so drive the conflict path through the
        // repository directly with the stale set.
        let err = state
            .db
            .invoices()
            .settle(
                &stub_invoice("inv-x", "TIF-202608-000099"),
                &[],
                &[],
                &["o1".to_string()],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_partial_payment_recorded_as_given() {
        let state = test_state().await;
        seed_order(&state, "o1", "T1", &[("Tea", 1000, 1)]).await;

        // Total is 1050 (₹10.00 + 2.5% + 2.5%); a ₹5.00 payment settles the
        // table and the shortfall stays visible on the invoice.
        let mut req = settle_req("T1");
        req.payment = PaymentInput {
            mode: PaymentMode::Upi,
            amount: Some(Money::from_paise(500)),
            reference: Some("upi-123".into()),
        };
        let settled = settle_table(&state, "r1", None, req).await.unwrap();
        assert_eq!(settled.invoice.total.paise(), 1050);
        assert_eq!(settled.payments.len(), 1);
        assert_eq!(settled.payments[0].amount.paise(), 500);
        assert_eq!(settled.print_path, format!("/api/billing/invoices/{}", settled.invoice_id));
    }

    #[tokio::test]
    async fn test_negative_payment_rejected_before_any_write() {
        let state = test_state().await;
        seed_order(&state, "o1", "T1", &[("Tea", 1000, 1)]).await;

        let mut req = settle_req("T1");
        req.payment = PaymentInput {
            mode: PaymentMode::Cash,
            amount: Some(Money::from_paise(-100)),
            reference: None,
        };
        let err = settle_table(&state, "r1", None, req).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { .. }));

        // The rejection reserved nothing: the table settles normally and the
        // sequence starts at 1.
        let settled = settle_table(&state, "r1", None, settle_req("T1")).await.unwrap();
        assert!(settled.invoice.invoice_no.ends_with("-000001"));
    }
}
