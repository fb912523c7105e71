//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::error::{ok, ApiError, ApiOk, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// GET /health
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ApiOk<HealthStatus>>> {
    if !state.db.health_check().await {
        return Err(ApiError::Internal("database unreachable".to_string()));
    }
    Ok(ok(HealthStatus { status: "ok" }))
}
