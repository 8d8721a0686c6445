//! Payment intake for the signed-in account
//!
//! POST /api/payments/manual   multipart, field `proof`
//! POST /api/payments/paytech  returns the checkout redirect
//! GET  /api/payments          history, newest first

use axum::{Extension, Json, extract::Multipart, extract::State};
use shared::error::{AppError, ErrorCode};
use shared::models::Payment;

use crate::auth::AccountIdentity;
use crate::billing::{GatewayCheckout, ProofUpload};
use crate::db;
use crate::state::AppState;

use super::ApiResult;

const PROOF_FIELD: &str = "proof";

pub async fn submit_manual_payment(
    State(state): State<AppState>,
    Extension(identity): Extension<AccountIdentity>,
    multipart: Multipart,
) -> ApiResult<Payment> {
    let upload = read_proof(multipart).await?;
    let payment = state
        .billing
        .request_manual_payment(&identity.account_id, upload)
        .await?;
    Ok(Json(payment))
}

pub async fn start_paytech_payment(
    State(state): State<AppState>,
    Extension(identity): Extension<AccountIdentity>,
) -> ApiResult<GatewayCheckout> {
    let checkout = state
        .billing
        .request_gateway_payment(&identity.account_id)
        .await?;
    Ok(Json(checkout))
}

pub async fn list_payments(
    State(state): State<AppState>,
    Extension(identity): Extension<AccountIdentity>,
) -> ApiResult<Vec<Payment>> {
    let payments = db::payments::list_for_account(&state.pool, &identity.account_id).await?;
    Ok(Json(payments))
}

async fn read_proof(mut multipart: Multipart) -> Result<ProofUpload, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(PROOF_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(ProofUpload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }
    Err(AppError::with_message(
        ErrorCode::NoFileProvided,
        format!("Missing multipart field `{PROOF_FIELD}`"),
    ))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == http::StatusCode::PAYLOAD_TOO_LARGE {
        AppError::new(ErrorCode::FileTooLarge)
    } else {
        AppError::invalid_request(format!("Multipart error: {e}"))
    }
}
