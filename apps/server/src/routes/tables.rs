//! Table setup endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use tiffin_core::validation::validate_table_no;
use tiffin_core::{CoreError, RestaurantTable};
use tiffin_db::DbError;

use crate::auth::{Role, StaffAuth};
use crate::error::{ok, ApiError, ApiOk, ApiResult};
use crate::state::AppState;

fn default_capacity() -> i64 {
    4
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableRequest {
    pub table_no: String,
    #[serde(default = "default_capacity")]
    pub capacity: i64,
}

/// POST /api/setup/tables
pub async fn create_table(
    State(state): State<Arc<AppState>>,
    auth: StaffAuth,
    Json(req): Json<CreateTableRequest>,
) -> ApiResult<Json<ApiOk<RestaurantTable>>> {
    auth.require(&[Role::Owner, Role::Manager])?;
    validate_table_no(&req.table_no)?;
    if req.capacity < 1 {
        return Err(ApiError::validation("capacity must be at least 1"));
    }

    let table = state
        .db
        .tables()
        .create(&auth.restaurant_id, req.table_no.trim(), req.capacity)
        .await?;

    info!(
        restaurant_id = %auth.restaurant_id,
        table_no = %table.table_no,
        "Table created"
    );
    Ok(ok(table))
}

/// GET /api/setup/tables
pub async fn list_tables(
    State(state): State<Arc<AppState>>,
    auth: StaffAuth,
) -> ApiResult<Json<ApiOk<Vec<RestaurantTable>>>> {
    let tables = state.db.tables().list(&auth.restaurant_id).await?;
    Ok(ok(tables))
}

/// POST /api/setup/tables/:id/regenerate-token
pub async fn regenerate_token(
    State(state): State<Arc<AppState>>,
    auth: StaffAuth,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiOk<RestaurantTable>>> {
    auth.require(&[Role::Owner, Role::Manager])?;

    let table = state
        .db
        .tables()
        .regenerate_token(&auth.restaurant_id, &id)
        .await
        .map_err(|e| match e {
            DbError::NotFound { .. } => CoreError::TableNotFound.into(),
            other => ApiError::from(other),
        })?;

    info!(
        restaurant_id = %auth.restaurant_id,
        table_no = %table.table_no,
        "Table token regenerated"
    );
    Ok(ok(table))
}
