//! GET /api/public/portfolios/{slug}
//!
//! Servable iff the owner is active, the portfolio is published and not
//! past `expires_at`. Expired portfolios answer 410 so the page can say so.

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{AccountStatus, Portfolio, Visibility};

use crate::db;
use crate::state::AppState;

use super::ApiResult;

pub async fn get_public_portfolio(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Portfolio> {
    let slug = slug.to_lowercase();
    let portfolio = db::portfolios::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PortfolioNotFound))?;
    let owner = db::accounts::find_by_id(&state.pool, &portfolio.account_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PortfolioNotFound))?;

    let now = state.billing.now_millis();
    Ok(Json(public_view(portfolio, owner.status, now)?))
}

pub(crate) fn public_view(
    portfolio: Portfolio,
    owner_status: AccountStatus,
    now: i64,
) -> Result<Portfolio, AppError> {
    match portfolio.visibility(owner_status, now) {
        Visibility::Visible => Ok(portfolio),
        Visibility::Expired => Err(AppError::new(ErrorCode::PortfolioExpired)),
        // Not distinguishable from a missing page
        Visibility::Draft | Visibility::OwnerInactive => {
            Err(AppError::new(ErrorCode::PortfolioNotPublished))
        }
    }
}
