//! # Domain Errors
//!
//! Typed errors for the business layer, built with `thiserror`.
//!
//! Each variant maps to a stable machine-readable code via
//! [`CoreError::code`]; the HTTP layer turns the code into a status and a
//! response envelope. Keeping the mapping here means a new error variant
//! cannot silently ship without a code.

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Validation Errors
// =============================================================================

/// A structural validation failure on a single field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} exceeds maximum length of {max}")]
    TooLong { field: String, max: usize },

    #[error("{field} is out of range: {reason}")]
    OutOfRange { field: String, reason: String },

    #[error("{field} is invalid: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Domain Errors
// =============================================================================

/// Errors produced by domain operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A request failed structural validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The tenant id did not resolve to a restaurant.
    #[error("restaurant not found")]
    TenantNotFound,

    /// The order does not exist for this tenant, or is in a terminal status
    /// and may no longer be edited. The two cases are deliberately not
    /// distinguished on the wire.
    #[error("order not found or locked")]
    OrderNotFoundOrLocked,

    /// A status change that the lifecycle table forbids.
    #[error("invalid status transition: {from:?} -> {to:?}")]
    InvalidStatusTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Table settlement found nothing to bill.
    #[error("no open orders for table")]
    NoOpenOrdersForTable,

    /// The table does not exist for this tenant.
    #[error("table not found")]
    TableNotFound,

    /// A concurrent settlement claimed one of the orders first.
    #[error("settlement conflict: an order was settled concurrently")]
    SettlementConflict,
}

impl CoreError {
    /// Stable machine-readable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::TenantNotFound => "TENANT_NOT_FOUND",
            CoreError::OrderNotFoundOrLocked => "ORDER_NOT_FOUND_OR_LOCKED",
            CoreError::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            CoreError::NoOpenOrdersForTable => "NO_OPEN_ORDERS_FOR_TABLE",
            CoreError::TableNotFound => "TABLE_NOT_FOUND",
            CoreError::SettlementConflict => "SETTLEMENT_CONFLICT",
        }
    }
}

/// Convenience alias for domain results.
pub type CoreResult<T> = Result<T, CoreError>;
