//! Registration and login
//!
//! POST /api/register  create a pending account and its draft portfolio
//! POST /api/login     issue a JWT

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{Account, AccountRole, Portfolio, is_valid_slug, slugify};

use crate::auth::account_auth::create_token;
use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::util::{hash_password, new_id, now_millis, verify_password};

use super::ApiResult;

const MIN_PASSWORD_LEN: usize = 8;
const SLUG_ATTEMPTS: usize = 5;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Preferred public slug; derived from the name when absent
    pub slug: Option<String>,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub account: Account,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<Portfolio>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    let name = req.name.trim();
    let email = req.email.trim().to_lowercase();

    if name.is_empty() {
        return Err(AppError::with_message(ErrorCode::RequiredField, "Name is required").into());
    }
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::with_message(ErrorCode::InvalidFormat, "Invalid email").into());
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort).into());
    }
    if db::accounts::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::new(ErrorCode::EmailAlreadyRegistered).into());
    }

    let slug = choose_slug(&state, name, req.slug.as_deref()).await?;

    let hashed_password = hash_password(&req.password).map_err(|e| {
        tracing::error!(%e, "Password hash error");
        AppError::new(ErrorCode::InternalError)
    })?;

    let account_id = new_id();
    let now = now_millis();

    let mut tx = state.pool.begin().await?;
    db::accounts::create(
        &mut *tx,
        &db::accounts::CreateAccount {
            id: &account_id,
            name,
            email: &email,
            hashed_password: &hashed_password,
            role: AccountRole::User,
            now,
        },
    )
    .await
    .map_err(unique_violation_as(ErrorCode::EmailAlreadyRegistered))?;
    db::portfolios::create(
        &mut *tx,
        &db::portfolios::CreatePortfolio {
            id: &new_id(),
            account_id: &account_id,
            slug: &slug,
            title: name,
            now,
        },
    )
    .await
    .map_err(unique_violation_as(ErrorCode::SlugTaken))?;
    tx.commit().await?;

    db::audit::record(
        &state.pool,
        &account_id,
        None,
        "register",
        serde_json::json!({ "slug": slug }),
        now,
    )
    .await;
    tracing::info!(account_id = %account_id, slug = %slug, "Account registered");

    let account = db::accounts::find_by_id(&state.pool, &account_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AccountNotFound))?;
    let portfolio = db::portfolios::find_by_account(&state.pool, &account_id).await?;
    let token = issue_token(&account, &state.jwt_secret)?;

    Ok(Json(AuthResponse {
        token,
        account,
        portfolio,
    }))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let email = req.email.trim().to_lowercase();
    let account = db::accounts::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvalidCredentials))?;

    if !verify_password(&req.password, &account.hashed_password) {
        return Err(AppError::new(ErrorCode::InvalidCredentials).into());
    }
    if !account.status.can_login() {
        return Err(AppError::new(ErrorCode::AccountDisabled).into());
    }

    let token = issue_token(&account, &state.jwt_secret)?;
    db::audit::record(
        &state.pool,
        &account.id,
        Some(&account.id),
        "login",
        serde_json::Value::Null,
        now_millis(),
    )
    .await;

    Ok(Json(AuthResponse {
        token,
        account,
        portfolio: None,
    }))
}

fn issue_token(account: &Account, secret: &str) -> Result<String, AppError> {
    create_token(&account.id, &account.email, account.role, secret).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })
}

/// Requested slug if valid and free; otherwise derived from the name, with a
/// random suffix until free
async fn choose_slug(
    state: &AppState,
    name: &str,
    requested: Option<&str>,
) -> Result<String, ServiceError> {
    if let Some(requested) = requested.map(str::trim).filter(|s| !s.is_empty()) {
        let requested = requested.to_lowercase();
        if !is_valid_slug(&requested) {
            return Err(AppError::new(ErrorCode::InvalidSlug).into());
        }
        if db::portfolios::slug_exists(&state.pool, &requested).await? {
            return Err(AppError::new(ErrorCode::SlugTaken).into());
        }
        return Ok(requested);
    }

    let base = slugify(name).unwrap_or_else(|| "portfolio".to_string());
    if !db::portfolios::slug_exists(&state.pool, &base).await? {
        return Ok(base);
    }
    for _ in 0..SLUG_ATTEMPTS {
        let candidate = with_suffix(&base);
        if !db::portfolios::slug_exists(&state.pool, &candidate).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::new(ErrorCode::SlugTaken).into())
}

fn with_suffix(base: &str) -> String {
    use rand::Rng;
    let suffix: u32 = rand::thread_rng().gen_range(0..0x1_0000);
    let base: String = base.chars().take(55).collect();
    format!("{}-{suffix:04x}", base.trim_end_matches('-'))
}

/// A concurrent registration can still hit a unique index after the checks
fn unique_violation_as(code: ErrorCode) -> impl Fn(sqlx::Error) -> ServiceError {
    move |e| {
        let unique = e
            .as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation());
        if unique {
            AppError::new(code).into()
        } else {
            e.into()
        }
    }
}
