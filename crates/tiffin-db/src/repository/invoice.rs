//! # Invoice Repository
//!
//! Invoice persistence and the settlement transaction.
//!
//! ## The Settlement Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Settlement Write (ONE transaction)                    │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    INSERT invoice                                                       │
//! │    INSERT invoice_items (consolidated lines)                            │
//! │    INSERT payments                                                      │
//! │    UPDATE orders SET linked_invoice_id = <invoice>                      │
//! │      WHERE restaurant_id = ? AND id IN (<fetched set>)                 │
//! │        AND linked_invoice_id IS NULL                                    │
//! │        AND status != 'cancelled'                                        │
//! │    ── rows_affected == len(fetched set)?                                │
//! │         yes → COMMIT                                                    │
//! │         no  → ROLLBACK, Conflict                                        │
//! │  END                                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The conditional UPDATE is the race fix: two settlements over the same
//! table can both fetch the same open orders, but only one can claim them.
//! The loser's UPDATE matches fewer rows than it fetched, the whole
//! transaction rolls back, and no order is ever double-billed.
//!
//! The invoice number was reserved BEFORE this transaction, so a rollback
//! burns it. Gaps over duplicates.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use tiffin_core::{Invoice, InvoiceItem, Payment};

const INVOICE_COLUMNS: &str = r#"
    SELECT id, restaurant_id, invoice_no, invoice_type, table_no,
           customer_name, customer_phone,
           subtotal, discount_kind, discount_value, discount_amount, taxable,
           gst_mode, cgst_rate_bps, sgst_rate_bps, igst_rate_bps,
           cgst_amount, sgst_amount, igst_amount, total,
           created_by, created_at
    FROM invoices
"#;

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Writes a settlement atomically: invoice, lines, payments, and the
    /// conditional claim of every order in `order_ids`.
    ///
    /// ## Errors
    /// `DbError::Conflict` when a concurrent settlement claimed any of the
    /// orders first. Nothing is persisted in that case.
    pub async fn settle(
        &self,
        invoice: &Invoice,
        items: &[InvoiceItem],
        payments: &[Payment],
        order_ids: &[String],
    ) -> DbResult<()> {
        debug!(
            invoice_no = %invoice.invoice_no,
            orders = order_ids.len(),
            lines = items.len(),
            "Writing settlement"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, restaurant_id, invoice_no, invoice_type, table_no,
                customer_name, customer_phone,
                subtotal, discount_kind, discount_value, discount_amount, taxable,
                gst_mode, cgst_rate_bps, sgst_rate_bps, igst_rate_bps,
                cgst_amount, sgst_amount, igst_amount, total,
                created_by, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7,
                ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16,
                ?17, ?18, ?19, ?20,
                ?21, ?22
            )
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.restaurant_id)
        .bind(&invoice.invoice_no)
        .bind(invoice.invoice_type)
        .bind(&invoice.table_no)
        .bind(&invoice.customer_name)
        .bind(&invoice.customer_phone)
        .bind(invoice.subtotal)
        .bind(invoice.discount_kind)
        .bind(invoice.discount_value)
        .bind(invoice.discount_amount)
        .bind(invoice.taxable)
        .bind(invoice.gst_mode)
        .bind(invoice.cgst_rate_bps)
        .bind(invoice.sgst_rate_bps)
        .bind(invoice.igst_rate_bps)
        .bind(invoice.cgst_amount)
        .bind(invoice.sgst_amount)
        .bind(invoice.igst_amount)
        .bind(invoice.total)
        .bind(&invoice.created_by)
        .bind(invoice.created_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (
                    id, invoice_id, name_snapshot, unit_price, qty, line_total
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&item.id)
            .bind(&item.invoice_id)
            .bind(&item.name_snapshot)
            .bind(item.unit_price)
            .bind(item.qty)
            .bind(item.line_total)
            .execute(&mut *tx)
            .await?;
        }

        for payment in payments {
            sqlx::query(
                r#"
                INSERT INTO payments (
                    id, invoice_id, mode, amount, reference, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&payment.id)
            .bind(&payment.invoice_id)
            .bind(payment.mode)
            .bind(payment.amount)
            .bind(&payment.reference)
            .bind(payment.created_at)
            .execute(&mut *tx)
            .await?;
        }

        // The conditional claim. Every fetched order must still be unbilled
        // and not cancelled, or the whole settlement aborts.
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("UPDATE orders SET linked_invoice_id = ");
        qb.push_bind(invoice.id.as_str());
        qb.push(" WHERE restaurant_id = ")
            .push_bind(invoice.restaurant_id.as_str());
        qb.push(" AND linked_invoice_id IS NULL AND status != 'cancelled' AND id IN (");
        let mut sep = qb.separated(", ");
        for id in order_ids {
            sep.push_bind(id.as_str());
        }
        qb.push(")");

        let claimed = qb.build().execute(&mut *tx).await?.rows_affected();

        if claimed != order_ids.len() as u64 {
            warn!(
                invoice_no = %invoice.invoice_no,
                expected = order_ids.len(),
                claimed,
                "Settlement lost race, rolling back"
            );
            // Dropping tx without commit rolls everything back.
            return Err(DbError::conflict(
                "an order on this table was settled concurrently",
            ));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets an invoice by ID, scoped to a restaurant.
    pub async fn get(&self, restaurant_id: &str, id: &str) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "{INVOICE_COLUMNS} WHERE restaurant_id = ?1 AND id = ?2"
        ))
        .bind(restaurant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    /// Lists invoices for a restaurant, newest first.
    pub async fn list(&self, restaurant_id: &str, limit: i64) -> DbResult<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "{INVOICE_COLUMNS} WHERE restaurant_id = ?1 ORDER BY created_at DESC LIMIT ?2"
        ))
        .bind(restaurant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    /// Gets the consolidated lines of an invoice.
    pub async fn get_items(&self, invoice_id: &str) -> DbResult<Vec<InvoiceItem>> {
        let items = sqlx::query_as::<_, InvoiceItem>(
            r#"
            SELECT id, invoice_id, name_snapshot, unit_price, qty, line_total
            FROM invoice_items
            WHERE invoice_id = ?1
            ORDER BY name_snapshot, unit_price
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets the payments recorded against an invoice.
    pub async fn get_payments(&self, invoice_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, invoice_id, mode, amount, reference, created_at
            FROM payments
            WHERE invoice_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
