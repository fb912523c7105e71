//! Billing endpoints: table settlement and invoice reads.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use tiffin_core::{Invoice, InvoiceItem, Payment};

use crate::auth::{Role, StaffAuth};
use crate::error::{ok, ApiError, ApiOk, ApiResult};
use crate::services::settlement::{self, SettleTableRequest, SettledInvoice};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInvoicesQuery {
    pub limit: Option<i64>,
}

/// An invoice with its lines and payments.
#[derive(Debug, Serialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
    pub payments: Vec<Payment>,
}

/// POST /api/billing/settle-table
pub async fn settle_table(
    State(state): State<Arc<AppState>>,
    auth: StaffAuth,
    Json(req): Json<SettleTableRequest>,
) -> ApiResult<Json<ApiOk<SettledInvoice>>> {
    auth.require(&[Role::Owner, Role::Manager, Role::Cashier])?;

    let settled =
        settlement::settle_table(&state, &auth.restaurant_id, Some(auth.user_id), req).await?;
    Ok(ok(settled))
}

/// GET /api/billing/invoices
pub async fn list_invoices(
    State(state): State<Arc<AppState>>,
    auth: StaffAuth,
    Query(query): Query<ListInvoicesQuery>,
) -> ApiResult<Json<ApiOk<Vec<Invoice>>>> {
    auth.require(&[Role::Owner, Role::Manager, Role::Cashier])?;

    let invoices = state
        .db
        .invoices()
        .list(&auth.restaurant_id, query.limit.unwrap_or(50))
        .await?;
    Ok(ok(invoices))
}

/// GET /api/billing/invoices/:id
pub async fn get_invoice(
    State(state): State<Arc<AppState>>,
    auth: StaffAuth,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiOk<InvoiceDetail>>> {
    auth.require(&[Role::Owner, Role::Manager, Role::Cashier])?;

    let invoice = state
        .db
        .invoices()
        .get(&auth.restaurant_id, &id)
        .await?
        .ok_or(ApiError::NotFound {
            code: "NOT_FOUND",
            message: format!("invoice {id} not found"),
        })?;

    let items = state.db.invoices().get_items(&invoice.id).await?;
    let payments = state.db.invoices().get_payments(&invoice.id).await?;

    Ok(ok(InvoiceDetail {
        invoice,
        items,
        payments,
    }))
}

// =============================================================================
// Unit Tests
// =============================================================================
