//! GET /api/me: dashboard overview

use axum::{Extension, Json, extract::State};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Account, Payment, Portfolio};

use crate::auth::AccountIdentity;
use crate::db;
use crate::state::AppState;

use super::ApiResult;

#[derive(Serialize)]
pub struct MeResponse {
    pub account: Account,
    pub portfolio: Option<Portfolio>,
    pub latest_payment: Option<Payment>,
    /// Activation fee shown on the payment screen
    pub activation_fee: i64,
    pub currency: String,
}

pub async fn get_me(
    State(state): State<AppState>,
    Extension(identity): Extension<AccountIdentity>,
) -> ApiResult<MeResponse> {
    let account = db::accounts::find_by_id(&state.pool, &identity.account_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AccountNotFound))?;
    let portfolio = db::portfolios::find_by_account(&state.pool, &account.id).await?;
    let latest_payment = db::payments::latest_for_account(&state.pool, &account.id).await?;
    let pricing = state.billing.pricing();

    Ok(Json(MeResponse {
        account,
        portfolio,
        latest_payment,
        activation_fee: pricing.amount,
        currency: pricing.currency.clone(),
    }))
}
