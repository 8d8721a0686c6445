//! Payment review (resolutions are audited by the payment store)
//!
//! GET  /api/admin/payments?status=&limit=&offset=
//! POST /api/admin/payments/{id}/approve  {notes?}
//! POST /api/admin/payments/{id}/reject   {notes}

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{Payment, PaymentStatus};

use crate::auth::AccountIdentity;
use crate::db;
use crate::db::payments::AdminPaymentRow;
use crate::state::AppState;

use super::super::ApiResult;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

/// Listing row plus the proof's public URL
#[derive(Serialize)]
pub struct AdminPaymentView {
    #[serde(flatten)]
    pub row: AdminPaymentRow,
    pub proof_url: Option<String>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<AdminPaymentView>> {
    let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None | Some("all") => None,
        Some(s) => Some(PaymentStatus::from_db(s).ok_or_else(|| {
            AppError::with_message(ErrorCode::ValidationFailed, format!("Unknown status: {s}"))
        })?),
    };
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);

    let rows = db::payments::list_for_admin(&state.pool, status, limit, offset).await?;
    let views = rows
        .into_iter()
        .map(|row| AdminPaymentView {
            proof_url: row.payment.proof_image.as_deref().map(|p| state.storage.url(p)),
            row,
        })
        .collect();
    Ok(Json(views))
}

#[derive(Debug, Deserialize, Default)]
pub struct ResolveRequest {
    pub notes: Option<String>,
}

/// The body is optional on approve, so parse it by hand
fn parse_body(body: &[u8]) -> Result<ResolveRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ResolveRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::with_message(ErrorCode::InvalidFormat, format!("Invalid JSON: {e}")))
}

pub async fn approve_payment(
    State(state): State<AppState>,
    Extension(admin): Extension<AccountIdentity>,
    Path(payment_id): Path<String>,
    body: Bytes,
) -> ApiResult<Payment> {
    let req = parse_body(&body)?;
    let payment = state
        .billing
        .approve(&payment_id, &admin.account_id, req.notes)
        .await?;
    Ok(Json(payment))
}

pub async fn reject_payment(
    State(state): State<AppState>,
    Extension(admin): Extension<AccountIdentity>,
    Path(payment_id): Path<String>,
    body: Bytes,
) -> ApiResult<Payment> {
    let req = parse_body(&body)?;
    let payment = state
        .billing
        .reject(&payment_id, &admin.account_id, req.notes.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(payment))
}
