//! Account JWT authentication for the dashboard and admin API

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{AccountRole, AccountStatus};

use crate::db::accounts;
use crate::state::AppState;

/// JWT claims for account authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountClaims {
    /// Account ID
    pub sub: String,
    pub email: String,
    /// Role at issue time; the middleware re-reads it from the database
    pub role: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated account, inserted as a request extension
#[derive(Debug, Clone)]
pub struct AccountIdentity {
    pub account_id: String,
    pub role: AccountRole,
    pub status: AccountStatus,
}

impl AccountIdentity {
    pub fn is_admin(&self) -> bool {
        self.role == AccountRole::Admin
    }
}

const JWT_EXPIRY_HOURS: i64 = 24;

pub fn create_token(
    account_id: &str,
    email: &str,
    role: AccountRole,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = AccountClaims {
        sub: account_id.to_string(),
        email: email.to_string(),
        role: role.as_db().to_string(),
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_token(token: &str, secret: &str) -> Result<AccountClaims, AppError> {
    jsonwebtoken::decode::<AccountClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::new(ErrorCode::TokenExpired)
            }
            _ => AppError::new(ErrorCode::TokenInvalid),
        }
    })
}

/// Verify the bearer token and attach the caller's [`AccountIdentity`].
/// Suspended accounts are refused even with a valid token.
pub async fn account_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::not_authenticated().into_response())?
        .strip_prefix("Bearer ")
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::TokenInvalid, "Invalid Authorization format")
                .into_response()
        })?
        .to_string();

    let claims = decode_token(&token, &state.jwt_secret).map_err(IntoResponse::into_response)?;

    let account = accounts::find_by_id(&state.pool, &claims.sub)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to load account for token");
            AppError::new(ErrorCode::DatabaseError).into_response()
        })?
        .ok_or_else(|| AppError::new(ErrorCode::TokenInvalid).into_response())?;

    if !account.status.can_login() {
        return Err(AppError::new(ErrorCode::AccountSuspended).into_response());
    }

    request.extensions_mut().insert(AccountIdentity {
        account_id: account.id,
        role: account.role,
        status: account.status,
    });

    Ok(next.run(request).await)
}

/// Layered inside [`account_auth_middleware`]
pub async fn admin_only_middleware(request: Request, next: Next) -> Result<Response, Response> {
    let is_admin = request
        .extensions()
        .get::<AccountIdentity>()
        .is_some_and(AccountIdentity::is_admin);
    if !is_admin {
        return Err(AppError::new(ErrorCode::AdminRequired).into_response());
    }
    Ok(next.run(request).await)
}
