//! # Order Repository
//!
//! Database operations for orders and their line items.
//!
//! ## Order Lifecycle (storage view)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Storage Lifecycle                           │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── create() → order header + items in ONE transaction             │
//! │                                                                         │
//! │  2. EDIT (open orders only)                                            │
//! │     └── add_item() / remove_item()                                     │
//! │         Guarded: status not terminal AND linked_invoice_id IS NULL     │
//! │                                                                         │
//! │  3. PROGRESS                                                           │
//! │     └── update_status(from, to)                                        │
//! │         Optimistic: WHERE status = <from>; 0 rows = lost race          │
//! │                                                                         │
//! │  4. SETTLE (invoice repository)                                        │
//! │     └── linked_invoice_id set exactly once; order leaves the           │
//! │         "open for table" set forever                                   │
//! │                                                                         │
//! │  Orders are never DELETEd. Cancellation is a status.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every query is scoped by restaurant_id; a valid order id from another
//! tenant behaves exactly like a missing id.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use tiffin_core::{Order, OrderItem, OrderStatus};

const ORDER_COLUMNS: &str = r#"
    SELECT id, restaurant_id, order_type, table_no, status,
           customer_name, customer_phone, delivery_address,
           linked_invoice_id, created_by, created_at, updated_at
    FROM orders
"#;

const ITEM_COLUMNS: &str = r#"
    SELECT id, order_id, menu_item_id, name_snapshot, unit_price,
           qty, modifiers, notes, created_at
    FROM order_items
"#;

/// Filters for listing orders.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub table_no: Option<String>,
    pub limit: Option<i64>,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order header and its items in one transaction.
    pub async fn create(&self, order: &Order, items: &[OrderItem]) -> DbResult<()> {
        debug!(id = %order.id, items = items.len(), "Creating order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, restaurant_id, order_type, table_no, status,
                customer_name, customer_phone, delivery_address,
                linked_invoice_id, created_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&order.id)
        .bind(&order.restaurant_id)
        .bind(order.order_type)
        .bind(&order.table_no)
        .bind(order.status)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.delivery_address)
        .bind(&order.linked_invoice_id)
        .bind(&order.created_by)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            insert_item(&mut tx, item).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets an order by ID, scoped to a restaurant.
    pub async fn get(&self, restaurant_id: &str, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "{ORDER_COLUMNS} WHERE restaurant_id = ?1 AND id = ?2"
        ))
        .bind(restaurant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets all items for an order, oldest first.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "{ITEM_COLUMNS} WHERE order_id = ?1 ORDER BY created_at"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists orders for a restaurant, newest first, with optional filters.
    pub async fn list(&self, restaurant_id: &str, filter: &OrderFilter) -> DbResult<Vec<Order>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(ORDER_COLUMNS);
        qb.push(" WHERE restaurant_id = ").push_bind(restaurant_id);

        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(table_no) = &filter.table_no {
            qb.push(" AND table_no = ").push_bind(table_no.as_str());
        }

        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(filter.limit.unwrap_or(100));

        let orders = qb
            .build_query_as::<Order>()
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Applies a status change with an optimistic guard on the status the
    /// caller validated against.
    ///
    /// ## Errors
    /// `DbError::Conflict` when the row no longer holds `from` (a concurrent
    /// writer moved it first). The caller re-reads and re-validates.
    pub async fn update_status(
        &self,
        restaurant_id: &str,
        id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> DbResult<()> {
        debug!(id, ?from, ?to, "Updating order status");

        let result = sqlx::query(
            r#"
            UPDATE orders SET status = ?4, updated_at = ?5
            WHERE restaurant_id = ?1 AND id = ?2 AND status = ?3
            "#,
        )
        .bind(restaurant_id)
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict(format!(
                "order {id} left status {from:?} concurrently"
            )));
        }

        Ok(())
    }

    /// Adds an item to an open order.
    ///
    /// ## Errors
    /// `DbError::NotFound` when the order is missing for this tenant, in a
    /// terminal status, or already billed. Callers surface all three as the
    /// same error code.
    pub async fn add_item(
        &self,
        restaurant_id: &str,
        order_id: &str,
        item: &OrderItem,
    ) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        touch_open_order(&mut tx, restaurant_id, order_id).await?;
        insert_item(&mut tx, item).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Removes an item from an open order.
    pub async fn remove_item(
        &self,
        restaurant_id: &str,
        order_id: &str,
        item_id: &str,
    ) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        touch_open_order(&mut tx, restaurant_id, order_id).await?;

        let result = sqlx::query("DELETE FROM order_items WHERE id = ?1 AND order_id = ?2")
            .bind(item_id)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order item", item_id));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Fetches the open orders on a table: not cancelled, never billed,
    /// oldest first. This is the settlement working set.
    pub async fn open_for_table(
        &self,
        restaurant_id: &str,
        table_no: &str,
    ) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"{ORDER_COLUMNS}
            WHERE restaurant_id = ?1 AND table_no = ?2
              AND status != 'cancelled'
              AND linked_invoice_id IS NULL
            ORDER BY created_at"#
        ))
        .bind(restaurant_id)
        .bind(table_no)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Fetches items across a set of orders in one query.
    pub async fn items_for_orders(&self, order_ids: &[String]) -> DbResult<Vec<OrderItem>> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(ITEM_COLUMNS);
        qb.push(" WHERE order_id IN (");
        let mut sep = qb.separated(", ");
        for id in order_ids {
            sep.push_bind(id.as_str());
        }
        qb.push(") ORDER BY created_at");

        let items = qb
            .build_query_as::<OrderItem>()
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }
}

/// Guard write: bumps updated_at on an order that is still editable. Zero
/// rows affected means missing, terminal, or billed.
async fn touch_open_order(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    restaurant_id: &str,
    order_id: &str,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE orders SET updated_at = ?3
        WHERE restaurant_id = ?1 AND id = ?2
          AND status NOT IN ('completed', 'cancelled')
          AND linked_invoice_id IS NULL
        "#,
    )
    .bind(restaurant_id)
    .bind(order_id)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Open order", order_id));
    }

    Ok(())
}

async fn insert_item(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    item: &OrderItem,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_items (
            id, order_id, menu_item_id, name_snapshot, unit_price,
            qty, modifiers, notes, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&item.id)
    .bind(&item.order_id)
    .bind(&item.menu_item_id)
    .bind(&item.name_snapshot)
    .bind(item.unit_price)
    .bind(item.qty)
    .bind(sqlx::types::Json(&item.modifiers))
    .bind(&item.notes)
    .bind(item.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
