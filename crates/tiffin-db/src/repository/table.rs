//! # Table Repository
//!
//! Physical dining tables and their public ordering tokens.
//!
//! ## Token Self-Heal
//! The canonical token is a pure function of (restaurant_id, table_no), so a
//! row that somehow lost or corrupted its token (partial import, manual edit)
//! can be repaired on read. `list` re-derives the token for every row and
//! persists it wherever the stored value diverges.
//!
//! "Regenerate" is a recompute, not a replacement: the canonical token is
//! derived again and overwrites whatever is stored. On a healthy row that is
//! a no-op, which is exactly what makes printed QR codes permanent.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tiffin_core::token::table_token;
use tiffin_core::RestaurantTable;

const SELECT_COLUMNS: &str = r#"
    SELECT id, restaurant_id, table_no, public_token, capacity, is_enabled, created_at
    FROM restaurant_tables
"#;

/// Repository for restaurant table operations.
#[derive(Debug, Clone)]
pub struct TableRepository {
    pool: SqlitePool,
}

impl TableRepository {
    /// Creates a new TableRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TableRepository { pool }
    }

    /// Creates a table with its deterministic public token.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` when the table number already exists for
    /// this restaurant.
    pub async fn create(
        &self,
        restaurant_id: &str,
        table_no: &str,
        capacity: i64,
    ) -> DbResult<RestaurantTable> {
        let table = RestaurantTable {
            id: Uuid::new_v4().to_string(),
            restaurant_id: restaurant_id.to_string(),
            table_no: table_no.to_string(),
            public_token: table_token(restaurant_id, table_no),
            capacity,
            is_enabled: true,
            created_at: Utc::now(),
        };

        debug!(restaurant_id, table_no, "Creating table");

        sqlx::query(
            r#"
            INSERT INTO restaurant_tables (
                id, restaurant_id, table_no, public_token, capacity, is_enabled, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&table.id)
        .bind(&table.restaurant_id)
        .bind(&table.table_no)
        .bind(&table.public_token)
        .bind(table.capacity)
        .bind(table.is_enabled)
        .bind(table.created_at)
        .execute(&self.pool)
        .await?;

        Ok(table)
    }

    /// Lists all tables for a restaurant, repairing divergent tokens in place.
    pub async fn list(&self, restaurant_id: &str) -> DbResult<Vec<RestaurantTable>> {
        let mut tables = sqlx::query_as::<_, RestaurantTable>(&format!(
            "{SELECT_COLUMNS} WHERE restaurant_id = ?1 ORDER BY table_no"
        ))
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await?;

        for table in tables.iter_mut() {
            let token = table_token(&table.restaurant_id, &table.table_no);
            if table.public_token != token {
                warn!(table_no = %table.table_no, "Stored token diverged from canonical, re-deriving");
                sqlx::query(
                    "UPDATE restaurant_tables SET public_token = ?2 WHERE id = ?1",
                )
                .bind(&table.id)
                .bind(&token)
                .execute(&self.pool)
                .await?;
                table.public_token = token;
            }
        }

        Ok(tables)
    }

    /// Gets a table by ID, scoped to a restaurant.
    pub async fn get_by_id(
        &self,
        restaurant_id: &str,
        id: &str,
    ) -> DbResult<Option<RestaurantTable>> {
        let table = sqlx::query_as::<_, RestaurantTable>(&format!(
            "{SELECT_COLUMNS} WHERE restaurant_id = ?1 AND id = ?2"
        ))
        .bind(restaurant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(table)
    }

    /// Resolves a public token to its table. Tenant-agnostic: the token is
    /// the guest's only credential, so this lookup IS the tenant resolution.
    pub async fn get_by_token(&self, token: &str) -> DbResult<Option<RestaurantTable>> {
        let table = sqlx::query_as::<_, RestaurantTable>(&format!(
            "{SELECT_COLUMNS} WHERE public_token = ?1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(table)
    }

    /// Recomputes a table's canonical token and overwrites the stored value.
    ///
    /// A no-op on a healthy row; repairs one that diverged. The token cannot
    /// actually change because it is a pure function of the table identity.
    pub async fn regenerate_token(
        &self,
        restaurant_id: &str,
        id: &str,
    ) -> DbResult<RestaurantTable> {
        let mut table = self
            .get_by_id(restaurant_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Table", id))?;

        let token = table_token(restaurant_id, &table.table_no);
        if table.public_token != token {
            warn!(table_no = %table.table_no, "Stored token diverged from canonical, overwriting");
        }

        sqlx::query(
            "UPDATE restaurant_tables SET public_token = ?3 WHERE restaurant_id = ?1 AND id = ?2",
        )
        .bind(restaurant_id)
        .bind(id)
        .bind(&token)
        .execute(&self.pool)
        .await?;

        table.public_token = token;
        Ok(table)
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
    use tiffin_core::Restaurant;

    async fn test_db_with_tenant(id: &str) -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        db.restaurants()
            .insert(&Restaurant {
                id: id.into(),
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
        db
    }

    #[tokio::test]
    async fn test_create_derives_deterministic_token() {
        let db = test_db_with_tenant("r1").await;
        let table = db.tables().create("r1", "T1", 4).await.unwrap();

        assert_eq!(table.public_token, table_token("r1", "T1"));
        assert_eq!(table.public_token.len(), 32);
    }

    #[tokio::test]
    async fn test_duplicate_table_no_rejected() {
        let db = test_db_with_tenant("r1").await;
        db.tables().create("r1", "T1", 4).await.unwrap();

        let err = db.tables().create("r1", "T1", 2).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_get_by_token() {
        let db = test_db_with_tenant("r1").await;
        let created = db.tables().create("r1", "T1", 4).await.unwrap();

        let found = db
            .tables()
            .get_by_token(&created.public_token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.restaurant_id, "r1");

        assert!(db.tables().get_by_token("bogus").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_self_heals_empty_token() {
        let db = test_db_with_tenant("r1").await;
        let created = db.tables().create("r1", "T1", 4).await.unwrap();

        // Simulate a damaged row.
        sqlx::query("UPDATE restaurant_tables SET public_token = '' WHERE id = ?1")
            .bind(&created.id)
            .execute(db.pool())
            .await
            .unwrap();

        let listed = db.tables().list("r1").await.unwrap();
        assert_eq!(listed[0].public_token, table_token("r1", "T1"));

        // And the repair was persisted.
        let found = db.tables().get_by_id("r1", &created.id).await.unwrap().unwrap();
        assert_eq!(found.public_token, table_token("r1", "T1"));
    }

    #[tokio::test]
    async fn test_list_self_heals_divergent_token() {
        let db = test_db_with_tenant("r1").await;
        let created = db.tables().create("r1", "T1", 4).await.unwrap();

        sqlx::query("UPDATE restaurant_tables SET public_token = 'tampered' WHERE id = ?1")
            .bind(&created.id)
            .execute(db.pool())
            .await
            .unwrap();

        let listed = db.tables().list("r1").await.unwrap();
        assert_eq!(listed[0].public_token, table_token("r1", "T1"));
        assert!(db.tables().get_by_token("tampered").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_regenerate_token_is_a_noop_on_healthy_row() {
        let db = test_db_with_tenant("r1").await;
        let created = db.tables().create("r1", "T1", 4).await.unwrap();

        let updated = db.tables().regenerate_token("r1", &created.id).await.unwrap();
        assert_eq!(updated.public_token, created.public_token);
    }

    #[tokio::test]
    async fn test_regenerate_token_repairs_divergent_row() {
        let db = test_db_with_tenant("r1").await;
        let created = db.tables().create("r1", "T1", 4).await.unwrap();

        sqlx::query("UPDATE restaurant_tables SET public_token = 'garbage' WHERE id = ?1")
            .bind(&created.id)
            .execute(db.pool())
            .await
            .unwrap();

        let updated = db.tables().regenerate_token("r1", &created.id).await.unwrap();
        assert_eq!(updated.public_token, table_token("r1", "T1"));
        assert!(db.tables().get_by_token("garbage").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_regenerate_token_wrong_tenant() {
        let db = test_db_with_tenant("r1").await;
        let created = db.tables().create("r1", "T1", 4).await.unwrap();

        let err = db
            .tables()
            .regenerate_token("r2", &created.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
