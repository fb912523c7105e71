//! Order endpoints: staff management plus the guest (table token) entry
//! point.
//!
//! Every write publishes to the kitchen bus after the database commit, so a
//! kitchen display never learns about an order the database could still
//! reject.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use tiffin_core::lifecycle::validate_transition;
use tiffin_core::types::{Modifier, OrderStatus, OrderType};
use tiffin_core::validation::{
    validate_item_name, validate_order_shape, validate_qty, validate_unit_price,
};
use tiffin_core::{CoreError, KdsEvent, Money, Order, OrderItem};
use tiffin_db::{DbError, OrderFilter};

use crate::auth::{Role, StaffAuth};
use crate::error::{ok, ApiError, ApiOk, ApiResult};
use crate::state::AppState;

// =============================================================================
// DTOs
// =============================================================================

/// One requested line on a new order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub menu_item_id: String,
    pub name_snapshot: String,
    pub unit_price: Money,
    pub qty: i64,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub order_type: OrderType,
    pub table_no: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub items: Vec<NewOrderItem>,
}

/// Guest order through a table QR code. The token carries both tenant and
/// table; the request may not choose either.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicOrderRequest {
    pub token: String,
    pub customer_name: Option<String>,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
    pub table_no: Option<String>,
    pub limit: Option<i64>,
}

/// An order with its line items, the shape every order endpoint returns.
#[derive(Debug, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Validates requested lines and freezes them into item rows.
fn build_items(order_id: &str, requested: &[NewOrderItem]) -> ApiResult<Vec<OrderItem>> {
    let now = Utc::now();
    let mut items = Vec::with_capacity(requested.len());

    for line in requested {
        validate_item_name(&line.name_snapshot)?;
        validate_qty(line.qty)?;
        validate_unit_price(line.unit_price.paise())?;

        items.push(OrderItem {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            menu_item_id: line.menu_item_id.clone(),
            name_snapshot: line.name_snapshot.trim().to_string(),
            unit_price: line.unit_price,
            qty: line.qty,
            modifiers: line.modifiers.clone(),
            notes: line.notes.clone(),
            created_at: now,
        });
    }

    Ok(items)
}

async fn load_order(state: &AppState, restaurant_id: &str, id: &str) -> ApiResult<Order> {
    state
        .db
        .orders()
        .get(restaurant_id, id)
        .await?
        .ok_or(CoreError::OrderNotFoundOrLocked)
        .map_err(ApiError::from)
}

// =============================================================================
// Staff Handlers
// =============================================================================

/// POST /api/orders
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    auth: StaffAuth,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<Json<ApiOk<OrderWithItems>>> {
    auth.require(&[Role::Owner, Role::Manager, Role::Cashier])?;

    validate_order_shape(
        req.order_type,
        req.table_no.as_deref(),
        req.delivery_address.as_deref(),
        req.items.len(),
    )?;

    let now = Utc::now();
    let order = Order {
        id: Uuid::new_v4().to_string(),
        restaurant_id: auth.restaurant_id.clone(),
        order_type: req.order_type,
        table_no: req.table_no.map(|t| t.trim().to_string()),
        status: OrderStatus::Placed,
        customer_name: req.customer_name,
        customer_phone: req.customer_phone,
        delivery_address: req.delivery_address,
        linked_invoice_id: None,
        created_by: Some(auth.user_id),
        created_at: now,
        updated_at: now,
    };
    let items = build_items(&order.id, &req.items)?;

    state.db.orders().create(&order, &items).await?;

    info!(
        restaurant_id = %order.restaurant_id,
        order_id = %order.id,
        items = items.len(),
        "Order created"
    );
    state.bus.publish(KdsEvent::OrderCreated {
        restaurant_id: order.restaurant_id.clone(),
        order_id: order.id.clone(),
    });

    Ok(ok(OrderWithItems { order, items }))
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    auth: StaffAuth,
    Query(query): Query<ListOrdersQuery>,
) -> ApiResult<Json<ApiOk<Vec<Order>>>> {
    let filter = OrderFilter {
        status: query.status,
        table_no: query.table_no,
        limit: query.limit,
    };
    let orders = state.db.orders().list(&auth.restaurant_id, &filter).await?;
    Ok(ok(orders))
}

/// GET /api/orders/:id
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    auth: StaffAuth,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiOk<OrderWithItems>>> {
    let order = load_order(&state, &auth.restaurant_id, &id).await?;
    let items = state.db.orders().get_items(&order.id).await?;
    Ok(ok(OrderWithItems { order, items }))
}

/// PATCH /api/orders/:id/status
///
/// The transition table validates against the status we read; the UPDATE
/// re-checks that status so a concurrent writer cannot slip a second
/// transition through.
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    auth: StaffAuth,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<ApiOk<Order>>> {
    let order = load_order(&state, &auth.restaurant_id, &id).await?;
    validate_transition(order.status, req.status)?;

    state
        .db
        .orders()
        .update_status(&auth.restaurant_id, &id, order.status, req.status)
        .await?;

    state.bus.publish(KdsEvent::OrderUpdated {
        restaurant_id: auth.restaurant_id.clone(),
        order_id: id.clone(),
        status: req.status,
    });

    let updated = load_order(&state, &auth.restaurant_id, &id).await?;
    Ok(ok(updated))
}

/// POST /api/orders/:id/items
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    auth: StaffAuth,
    Path(id): Path<String>,
    Json(line): Json<NewOrderItem>,
) -> ApiResult<Json<ApiOk<OrderWithItems>>> {
    auth.require(&[Role::Owner, Role::Manager, Role::Cashier])?;

    let items = build_items(&id, std::slice::from_ref(&line))?;
    state
        .db
        .orders()
        .add_item(&auth.restaurant_id, &id, &items[0])
        .await
        .map_err(order_edit_error)?;

    let order = load_order(&state, &auth.restaurant_id, &id).await?;
    let items = state.db.orders().get_items(&id).await?;

    state.bus.publish(KdsEvent::OrderUpdated {
        restaurant_id: auth.restaurant_id.clone(),
        order_id: id,
        status: order.status,
    });

    Ok(ok(OrderWithItems { order, items }))
}

/// DELETE /api/orders/:id/items/:item_id
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    auth: StaffAuth,
    Path((id, item_id)): Path<(String, String)>,
) -> ApiResult<Json<ApiOk<OrderWithItems>>> {
    auth.require(&[Role::Owner, Role::Manager, Role::Cashier])?;

    state
        .db
        .orders()
        .remove_item(&auth.restaurant_id, &id, &item_id)
        .await
        .map_err(order_edit_error)?;

    let order = load_order(&state, &auth.restaurant_id, &id).await?;
    let items = state.db.orders().get_items(&id).await?;

    state.bus.publish(KdsEvent::OrderUpdated {
        restaurant_id: auth.restaurant_id.clone(),
        order_id: id,
        status: order.status,
    });

    Ok(ok(OrderWithItems { order, items }))
}

/// Missing, terminal, and already-billed all surface as the same code so the
/// response never reveals whether an id exists in another tenant.
fn order_edit_error(err: DbError) -> ApiError {
    match err {
        DbError::NotFound { .. } => CoreError::OrderNotFoundOrLocked.into(),
        other => other.into(),
    }
}

// =============================================================================
// Guest Handler
// =============================================================================

/// POST /api/public/orders
///
/// No JWT: the table token is the whole credential. A disabled table rejects
/// identically to an unknown token.
pub async fn create_public_order(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PublicOrderRequest>,
) -> ApiResult<Json<ApiOk<OrderWithItems>>> {
    let table = state
        .db
        .tables()
        .get_by_token(&req.token)
        .await?
        .filter(|t| t.is_enabled)
        .ok_or(CoreError::TableNotFound)
        .map_err(ApiError::from)?;

    validate_order_shape(
        OrderType::DineIn,
        Some(&table.table_no),
        None,
        req.items.len(),
    )?;

    let now = Utc::now();
    let order = Order {
        id: Uuid::new_v4().to_string(),
        restaurant_id: table.restaurant_id.clone(),
        order_type: OrderType::DineIn,
        table_no: Some(table.table_no.clone()),
        status: OrderStatus::Placed,
        customer_name: req.customer_name,
        customer_phone: None,
        delivery_address: None,
        linked_invoice_id: None,
        created_by: None,
        created_at: now,
        updated_at: now,
    };
    let items = build_items(&order.id, &req.items)?;

    state.db.orders().create(&order, &items).await?;

    info!(
        restaurant_id = %order.restaurant_id,
        order_id = %order.id,
        table_no = %table.table_no,
        "Guest order created"
    );
    state.bus.publish(KdsEvent::OrderCreated {
        restaurant_id: order.restaurant_id.clone(),
        order_id: order.id.clone(),
    });

    Ok(ok(OrderWithItems { order, items }))
}
