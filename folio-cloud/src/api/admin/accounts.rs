//! PUT /api/admin/accounts/{id}/status: manual override, independent of payments

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Account, AccountStatus};

use crate::auth::AccountIdentity;
use crate::db;
use crate::state::AppState;
use crate::util::now_millis;

use super::super::ApiResult;

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_account_status(
    State(state): State<AppState>,
    Extension(admin): Extension<AccountIdentity>,
    Path(account_id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Account> {
    let status = AccountStatus::from_db(req.status.trim())
        .ok_or_else(|| AppError::new(ErrorCode::InvalidAccountStatus))?;
    if account_id == admin.account_id && status == AccountStatus::Suspended {
        return Err(AppError::with_message(
            ErrorCode::PermissionDenied,
            "Admins cannot suspend themselves",
        )
        .into());
    }

    let now = now_millis();
    if !db::accounts::update_status(&state.pool, &account_id, status, now).await? {
        return Err(AppError::new(ErrorCode::AccountNotFound).into());
    }
    db::audit::record(
        &state.pool,
        &account_id,
        Some(&admin.account_id),
        "account_status_changed",
        serde_json::json!({ "status": status.as_db() }),
        now,
    )
    .await;
    tracing::info!(account_id = %account_id, admin_id = %admin.account_id, status = status.as_db(), "Account status overridden");

    let account = db::accounts::find_by_id(&state.pool, &account_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AccountNotFound))?;
    Ok(Json(account))
}
