//! POST /api/admin/portfolios/{id}/publish

use axum::extract::{Path, State};
use axum::{Extension, Json};
use shared::error::{AppError, ErrorCode};
use shared::models::Portfolio;

use crate::auth::AccountIdentity;
use crate::db;
use crate::state::AppState;
use crate::util::now_millis;

use super::super::ApiResult;

pub async fn publish_portfolio(
    State(state): State<AppState>,
    Extension(admin): Extension<AccountIdentity>,
    Path(portfolio_id): Path<String>,
) -> ApiResult<Portfolio> {
    let now = now_millis();
    let portfolio = db::portfolios::publish(&state.pool, &portfolio_id, now)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PortfolioNotFound))?;

    db::audit::record(
        &state.pool,
        &portfolio.account_id,
        Some(&admin.account_id),
        "portfolio_published",
        serde_json::json!({ "portfolio_id": portfolio.id, "by": "admin" }),
        now,
    )
    .await;
    Ok(Json(portfolio))
}
