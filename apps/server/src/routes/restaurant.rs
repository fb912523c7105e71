//! Restaurant settings endpoints.
//!
//! The tax mode, rates and invoice prefix read here are snapshotted onto
//! every invoice at settlement, so a settings change only affects bills
//! issued after it.

use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::info;

use tiffin_core::validation::{validate_invoice_prefix, validate_restaurant_name};
use tiffin_core::{CoreError, Restaurant, RestaurantSettings};
use tiffin_db::DbError;

use crate::auth::{Role, StaffAuth};
use crate::error::{ok, ApiError, ApiOk, ApiResult};
use crate::state::AppState;

/// GET /api/setup/restaurant
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    auth: StaffAuth,
) -> ApiResult<Json<ApiOk<Restaurant>>> {
    let restaurant = state
        .db
        .restaurants()
        .get_by_id(&auth.restaurant_id)
        .await?
        .ok_or(CoreError::TenantNotFound)?;

    Ok(ok(restaurant))
}

/// PUT /api/setup/restaurant
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    auth: StaffAuth,
    Json(req): Json<RestaurantSettings>,
) -> ApiResult<Json<ApiOk<Restaurant>>> {
    auth.require(&[Role::Owner, Role::Manager])?;
    validate_restaurant_name(&req.name)?;
    validate_invoice_prefix(&req.invoice_prefix)?;

    let settings = RestaurantSettings {
        name: req.name.trim().to_string(),
        invoice_prefix: req.invoice_prefix.trim().to_string(),
        gst_mode: req.gst_mode,
        cgst_rate_bps: req.cgst_rate_bps,
        sgst_rate_bps: req.sgst_rate_bps,
        igst_rate_bps: req.igst_rate_bps,
    };

    let restaurant = state
        .db
        .restaurants()
        .update_settings(&auth.restaurant_id, &settings)
        .await
        .map_err(|e| match e {
            DbError::NotFound { .. } => CoreError::TenantNotFound.into(),
            other => ApiError::from(other),
        })?;

    info!(
        restaurant_id = %auth.restaurant_id,
        gst_mode = ?restaurant.gst_mode,
        invoice_prefix = %restaurant.invoice_prefix,
        "Restaurant settings updated"
    );
    Ok(ok(restaurant))
}

// =============================================================================
// Unit Tests
// =============================================================================
