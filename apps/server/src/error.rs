//! Error types and the response envelope for the HTTP API.
//!
//! Every response uses the same JSON envelope:
//!
//! ```text
//! success: {"ok": true,  "data": ...}
//! failure: {"ok": false, "error": {"code": "ORDER_NOT_FOUND_OR_LOCKED",
//!                                  "message": "..."}}
//! ```
//!
//! Error codes are machine-readable and stable; messages are for humans and
//! may change. Internal errors are logged with detail but surface as a
//! generic INTERNAL_ERROR so storage internals never leak to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use tiffin_core::{CoreError, ValidationError};
use tiffin_db::DbError;

// =============================================================================
// Success Envelope
// =============================================================================

/// The success half of the response envelope.
#[derive(Debug, Serialize)]
pub struct ApiOk<T> {
    pub ok: bool,
    pub data: T,
}

/// Wraps payload data in the success envelope.
pub fn ok<T: Serialize>(data: T) -> Json<ApiOk<T>> {
    Json(ApiOk { ok: true, data })
}

// =============================================================================
// Error Envelope
// =============================================================================

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    ok: bool,
    error: ErrorBody,
}

/// API errors, each carrying its wire code and HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400 with a specific code (VALIDATION_ERROR, INVALID_STATUS_TRANSITION).
    #[error("{message}")]
    BadRequest {
        code: &'static str,
        message: String,
    },

    /// 401 UNAUTHENTICATED
    #[error("{0}")]
    Unauthenticated(String),

    /// 403 FORBIDDEN
    #[error("{0}")]
    Forbidden(String),

    /// 404 with a specific code (TENANT_NOT_FOUND, TABLE_NOT_FOUND, ...).
    #[error("{message}")]
    NotFound {
        code: &'static str,
        message: String,
    },

    /// 409 with a specific code (SETTLEMENT_CONFLICT, CONFLICT).
    #[error("{message}")]
    Conflict {
        code: &'static str,
        message: String,
    },

    /// 500 INTERNAL_ERROR. Detail is logged, never sent.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            code: "VALIDATION_ERROR",
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest { code, .. } => code,
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound { code, .. } => code,
            ApiError::Conflict { code, .. } => code,
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match &self {
            ApiError::Internal(detail) => {
                error!(%detail, "Internal error");
                "internal error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorEnvelope {
            ok: false,
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::Validation(_) => ApiError::BadRequest {
                code: "VALIDATION_ERROR",
                message,
            },
            CoreError::InvalidStatusTransition { .. } => ApiError::BadRequest {
                code: "INVALID_STATUS_TRANSITION",
                message,
            },
            CoreError::TenantNotFound => ApiError::NotFound {
                code: "TENANT_NOT_FOUND",
                message,
            },
            CoreError::OrderNotFoundOrLocked => ApiError::NotFound {
                code: "ORDER_NOT_FOUND_OR_LOCKED",
                message,
            },
            CoreError::NoOpenOrdersForTable => ApiError::NotFound {
                code: "NO_OPEN_ORDERS_FOR_TABLE",
                message,
            },
            CoreError::TableNotFound => ApiError::NotFound {
                code: "TABLE_NOT_FOUND",
                message,
            },
            CoreError::SettlementConflict => ApiError::Conflict {
                code: "SETTLEMENT_CONFLICT",
                message,
            },
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Context-free fallback. Handlers that can attach a more specific code
/// (ORDER_NOT_FOUND_OR_LOCKED, SETTLEMENT_CONFLICT) map DbError themselves
/// before this runs.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound {
                code: "NOT_FOUND",
                message: err.to_string(),
            },
            DbError::UniqueViolation { .. } | DbError::Conflict(_) => ApiError::Conflict {
                code: "CONFLICT",
                message: err.to_string(),
            },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Result type for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tiffin_core::OrderStatus;

    #[test]
    fn test_core_error_mapping() {
        let err: ApiError = CoreError::SettlementConflict.into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "SETTLEMENT_CONFLICT");

        let err: ApiError = CoreError::InvalidStatusTransition {
            from: OrderStatus::Ready,
            to: OrderStatus::Placed,
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "INVALID_STATUS_TRANSITION");
    }

    #[test]
    fn test_db_error_fallback_mapping() {
        let err: ApiError = DbError::conflict("raced").into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "CONFLICT");

        let err: ApiError = DbError::Internal("disk on fire".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_success_envelope_shape() {
        let body = serde_json::to_value(&ApiOk { ok: true, data: 42 }).unwrap();
        assert_eq!(body, serde_json::json!({"ok": true, "data": 42}));
    }
}
