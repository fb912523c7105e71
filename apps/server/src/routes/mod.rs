//! HTTP route tree.
//!
//! ```text
//! /health                                    liveness
//! /api/orders                                staff order management (JWT)
//! /api/public/orders                         guest ordering (table token)
//! /api/billing/*                             settlement + invoice reads (JWT)
//! /api/setup/restaurant                      tenant settings (JWT)
//! /api/setup/tables*                         table management (JWT)
//! /api/kds/stream                            kitchen display SSE (JWT)
//! ```

pub mod billing;
pub mod health;
pub mod orders;
pub mod restaurant;
pub mod stream;
pub mod tables;

use axum::routing::{delete, get, patch, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assembles the full router over shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        // Staff orders
        .route(
            "/api/orders",
            post(orders::create_order).get(orders::list_orders),
        )
        .route("/api/orders/:id", get(orders::get_order))
        .route("/api/orders/:id/status", patch(orders::update_status))
        .route("/api/orders/:id/items", post(orders::add_item))
        .route("/api/orders/:id/items/:item_id", delete(orders::remove_item))
        // Guest ordering
        .route("/api/public/orders", post(orders::create_public_order))
        // Billing
        .route("/api/billing/settle-table", post(billing::settle_table))
        .route("/api/billing/invoices", get(billing::list_invoices))
        .route("/api/billing/invoices/:id", get(billing::get_invoice))
        // Setup
        .route(
            "/api/setup/restaurant",
            get(restaurant::get_settings).put(restaurant::update_settings),
        )
        .route(
            "/api/setup/tables",
            post(tables::create_table).get(tables::list_tables),
        )
        .route(
            "/api/setup/tables/:id/regenerate-token",
            post(tables::regenerate_token),
        )
        // Kitchen display
        .route("/api/kds/stream", get(stream::kds_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
