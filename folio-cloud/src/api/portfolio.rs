//! Portfolio editing and self-publication
//!
//! GET  /api/portfolio
//! PUT  /api/portfolio
//! POST /api/portfolio/publish: requires an active account, leaves `expires_at` alone

use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::Portfolio;

use crate::auth::AccountIdentity;
use crate::db;
use crate::state::AppState;
use crate::util::{non_empty, now_millis};

use super::ApiResult;

const TEMPLATES: &[&str] = &["classic", "modern", "minimal", "creative"];

pub async fn get_portfolio(
    State(state): State<AppState>,
    Extension(identity): Extension<AccountIdentity>,
) -> ApiResult<Portfolio> {
    let portfolio = db::portfolios::find_by_account(&state.pool, &identity.account_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PortfolioNotFound))?;
    Ok(Json(portfolio))
}

#[derive(Deserialize)]
pub struct UpdatePortfolioRequest {
    pub title: Option<String>,
    pub template: Option<String>,
    /// Sections: hero, about, skills, projects, contact, theme
    pub content: Option<serde_json::Value>,
}

pub async fn update_portfolio(
    State(state): State<AppState>,
    Extension(identity): Extension<AccountIdentity>,
    Json(req): Json<UpdatePortfolioRequest>,
) -> ApiResult<Portfolio> {
    let template = non_empty(req.template);
    if let Some(t) = template.as_deref()
        && !TEMPLATES.contains(&t)
    {
        return Err(AppError::with_message(
            ErrorCode::ValidationFailed,
            format!("Unknown template: {t}"),
        )
        .into());
    }
    if let Some(content) = &req.content
        && !content.is_object()
    {
        return Err(AppError::with_message(
            ErrorCode::InvalidFormat,
            "content must be a JSON object",
        )
        .into());
    }
    let title = non_empty(req.title);

    let update = db::portfolios::UpdateContent {
        title: title.as_deref(),
        template: template.as_deref(),
        content: req.content.as_ref(),
        now: now_millis(),
    };
    let portfolio = db::portfolios::update_content(&state.pool, &identity.account_id, &update)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PortfolioNotFound))?;
    Ok(Json(portfolio))
}

pub async fn publish_portfolio(
    State(state): State<AppState>,
    Extension(identity): Extension<AccountIdentity>,
) -> ApiResult<Portfolio> {
    if !identity.status.can_publish() {
        return Err(AppError::new(ErrorCode::AccountNotActive).into());
    }
    let portfolio = db::portfolios::find_by_account(&state.pool, &identity.account_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PortfolioNotFound))?;

    let now = now_millis();
    let published = db::portfolios::publish(&state.pool, &portfolio.id, now)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PortfolioNotFound))?;
    db::audit::record(
        &state.pool,
        &identity.account_id,
        Some(&identity.account_id),
        "portfolio_published",
        serde_json::json!({ "portfolio_id": published.id, "by": "owner" }),
        now,
    )
    .await;
    Ok(Json(published))
}
