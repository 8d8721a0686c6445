//! PayTech IPN
//!
//! POST /paytech/ipn: raw body (JSON or form) for signature verification

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use shared::error::AppError;

use crate::paytech::signature::SIGNATURE_HEADER;
use crate::state::AppState;

pub async fn handle_ipn(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

    match state.billing.handle_webhook(&body, signature).await {
        Ok(outcome) => {
            tracing::info!(outcome = outcome.as_str(), "PayTech IPN acknowledged");
            (StatusCode::OK, Json(serde_json::json!({ "status": "ok" }))).into_response()
        }
        // 403 bad signature, 500 store failure (PayTech redelivers on 5xx;
        // resolution is idempotent)
        Err(e) => AppError::from(e).into_response(),
    }
}
