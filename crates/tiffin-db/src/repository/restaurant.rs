//! # Restaurant Repository
//!
//! Tenant settings plus the invoice sequence generator.
//!
//! ## Invoice Sequencing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │             Atomic Invoice Number Generation                            │
//! │                                                                         │
//! │  Request A ──┐                                                          │
//! │              ├──► UPDATE restaurants                                    │
//! │  Request B ──┘    SET invoice_seq = invoice_seq + 1                     │
//! │                   WHERE id = ?                                          │
//! │                   RETURNING invoice_prefix, invoice_seq                 │
//! │                                                                         │
//! │  SQLite serializes the two UPDATEs: A gets seq=41, B gets seq=42.      │
//! │  No SELECT-then-UPDATE window, so no duplicates, ever.                 │
//! │                                                                         │
//! │  Number format: <prefix>-<yyyymm>-<seq:06>  e.g. TIF-202608-000042     │
//! │  The sequence never resets, including across month boundaries.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sequence is incremented BEFORE the settlement transaction commits, so
//! an aborted settlement leaves a gap in issued numbers. Gaps are acceptable;
//! duplicates are not.

use chrono::{Datelike, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tiffin_core::{format_invoice_no, Restaurant, RestaurantSettings};

/// Repository for restaurant (tenant) operations.
#[derive(Debug, Clone)]
pub struct RestaurantRepository {
    pool: SqlitePool,
}

impl RestaurantRepository {
    /// Creates a new RestaurantRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RestaurantRepository { pool }
    }

    /// Gets a restaurant by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Restaurant>> {
        let restaurant = sqlx::query_as::<_, Restaurant>(
            r#"
            SELECT
                id, name, gst_mode,
                cgst_rate_bps, sgst_rate_bps, igst_rate_bps,
                invoice_prefix, invoice_seq,
                created_at, updated_at
            FROM restaurants
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(restaurant)
    }

    /// Inserts a restaurant.
    pub async fn insert(&self, restaurant: &Restaurant) -> DbResult<()> {
        debug!(id = %restaurant.id, name = %restaurant.name, "Inserting restaurant");

        sqlx::query(
            r#"
            INSERT INTO restaurants (
                id, name, gst_mode,
                cgst_rate_bps, sgst_rate_bps, igst_rate_bps,
                invoice_prefix, invoice_seq,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&restaurant.id)
        .bind(&restaurant.name)
        .bind(restaurant.gst_mode)
        .bind(restaurant.cgst_rate_bps)
        .bind(restaurant.sgst_rate_bps)
        .bind(restaurant.igst_rate_bps)
        .bind(&restaurant.invoice_prefix)
        .bind(restaurant.invoice_seq)
        .bind(restaurant.created_at)
        .bind(restaurant.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a tenant's editable settings.
    ///
    /// `invoice_seq` is untouched: only [`Self::next_invoice_no`] writes it,
    /// so a settings save can never rewind or skip the sequence.
    ///
    /// ## Errors
    /// `DbError::NotFound` when the restaurant does not exist.
    pub async fn update_settings(
        &self,
        id: &str,
        settings: &RestaurantSettings,
    ) -> DbResult<Restaurant> {
        debug!(id, name = %settings.name, "Updating restaurant settings");

        let result = sqlx::query(
            r#"
            UPDATE restaurants
            SET name = ?2, gst_mode = ?3,
                cgst_rate_bps = ?4, sgst_rate_bps = ?5, igst_rate_bps = ?6,
                invoice_prefix = ?7, updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&settings.name)
        .bind(settings.gst_mode)
        .bind(settings.cgst_rate_bps)
        .bind(settings.sgst_rate_bps)
        .bind(settings.igst_rate_bps)
        .bind(&settings.invoice_prefix)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Restaurant", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Restaurant", id))
    }

    /// Reserves the next invoice number for a tenant.
    ///
    /// Single atomic increment-and-read. Concurrent callers each receive a
    /// distinct, dense sequence value; the database serializes the UPDATEs.
    ///
    /// ## Errors
    /// `DbError::NotFound` when the restaurant does not exist.
    pub async fn next_invoice_no(&self, restaurant_id: &str) -> DbResult<String> {
        let now = Utc::now();

        let row: Option<(String, i64)> = sqlx::query_as(
            r#"
            UPDATE restaurants
            SET invoice_seq = invoice_seq + 1, updated_at = ?2
            WHERE id = ?1
            RETURNING invoice_prefix, invoice_seq
            "#,
        )
        .bind(restaurant_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        let (prefix, seq) =
            row.ok_or_else(|| DbError::not_found("Restaurant", restaurant_id))?;

        let yyyymm = now.year() as u32 * 100 + now.month();
        let invoice_no = format_invoice_no(&prefix, yyyymm, seq);

        debug!(restaurant_id, %invoice_no, "Reserved invoice number");
        Ok(invoice_no)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use tiffin_core::types::{GstMode, RateBps};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn demo_restaurant(id: &str) -> Restaurant {
        let now = Utc::now();
        Restaurant {
            id: id.into(),
            name: "Demo Tiffin House".into(),
            gst_mode: GstMode::CgstSgst,
            cgst_rate_bps: RateBps::from_bps(250),
            sgst_rate_bps: RateBps::from_bps(250),
            igst_rate_bps: RateBps::from_bps(500),
            invoice_prefix: "TIF".into(),
            invoice_seq: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.restaurants();

        repo.insert(&demo_restaurant("r1")).await.unwrap();

        let found = repo.get_by_id("r1").await.unwrap().unwrap();
        assert_eq!(found.name, "Demo Tiffin House");
        assert_eq!(found.gst_mode, GstMode::CgstSgst);
        assert_eq!(found.invoice_seq, 0);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_settings_leaves_sequence_alone() {
        let db = test_db().await;
        let repo = db.restaurants();
        repo.insert(&demo_restaurant("r1")).await.unwrap();
        repo.next_invoice_no("r1").await.unwrap();

        let updated = repo
            .update_settings(
                "r1",
                &RestaurantSettings {
                    name: "Bombay Tiffin".into(),
                    gst_mode: GstMode::Igst,
                    cgst_rate_bps: RateBps::zero(),
                    sgst_rate_bps: RateBps::zero(),
                    igst_rate_bps: RateBps::from_bps(1800),
                    invoice_prefix: "BOM".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Bombay Tiffin");
        assert_eq!(updated.gst_mode, GstMode::Igst);
        assert_eq!(updated.igst_rate_bps, RateBps::from_bps(1800));
        assert_eq!(updated.invoice_seq, 1);

        // The new prefix takes effect on the next reserved number.
        let next = repo.next_invoice_no("r1").await.unwrap();
        assert!(next.starts_with("BOM-"));
        assert!(next.ends_with("-000002"));
    }

    #[tokio::test]
    async fn test_update_settings_unknown_tenant() {
        let db = test_db().await;
        let err = db
            .restaurants()
            .update_settings(
                "nope",
                &RestaurantSettings {
                    name: "Ghost".into(),
                    gst_mode: GstMode::CgstSgst,
                    cgst_rate_bps: RateBps::from_bps(250),
                    sgst_rate_bps: RateBps::from_bps(250),
                    igst_rate_bps: RateBps::zero(),
                    invoice_prefix: "GST".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_next_invoice_no_increments() {
        let db = test_db().await;
        let repo = db.restaurants();
        repo.insert(&demo_restaurant("r1")).await.unwrap();

        let a = repo.next_invoice_no("r1").await.unwrap();
        let b = repo.next_invoice_no("r1").await.unwrap();

        assert!(a.starts_with("TIF-"));
        assert!(a.ends_with("-000001"));
        assert!(b.ends_with("-000002"));
        assert_ne!(a, b);

        let r = repo.get_by_id("r1").await.unwrap().unwrap();
        assert_eq!(r.invoice_seq, 2);
    }

    #[tokio::test]
    async fn test_next_invoice_no_unknown_tenant() {
        let db = test_db().await;
        let err = db.restaurants().next_invoice_no("nope").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_dense_and_distinct() {
        let db = test_db().await;
        db.restaurants().insert(&demo_restaurant("r1")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let repo = db.restaurants();
            handles.push(tokio::spawn(async move {
                repo.next_invoice_no("r1").await.unwrap()
            }));
        }

        let mut numbers = Vec::new();
        for h in handles {
            numbers.push(h.await.unwrap());
        }

        numbers.sort();
        numbers.dedup();
        assert_eq!(numbers.len(), 10, "all invoice numbers must be distinct");

        // Dense: the counter landed exactly on 10.
        let r = db.restaurants().get_by_id("r1").await.unwrap().unwrap();
        assert_eq!(r.invoice_seq, 10);
    }

    #[tokio::test]
    async fn test_sequences_are_independent_per_tenant() {
        let db = test_db().await;
        let repo = db.restaurants();
        repo.insert(&demo_restaurant("r1")).await.unwrap();
        let mut other = demo_restaurant("r2");
        other.invoice_prefix = "BOM".into();
        repo.insert(&other).await.unwrap();

        repo.next_invoice_no("r1").await.unwrap();
        repo.next_invoice_no("r1").await.unwrap();
        let b = repo.next_invoice_no("r2").await.unwrap();

        assert!(b.starts_with("BOM-"));
        assert!(b.ends_with("-000001"));
    }
}
