//! Audit log operations

use sqlx::PgPool;

/// Write an audit log entry
pub async fn log(
    pool: &PgPool,
    account_id: &str,
    actor_id: Option<&str>,
    action: &str,
    detail: Option<&serde_json::Value>,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO audit_logs (account_id, actor_id, action, detail, created_at) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(account_id)
    .bind(actor_id)
    .bind(action)
    .bind(detail.cloned())
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

/// Write an audit entry; failures are logged and swallowed
pub async fn record(
    pool: &PgPool,
    account_id: &str,
    actor_id: Option<&str>,
    action: &str,
    detail: serde_json::Value,
    now: i64,
) {
    if let Err(e) = log(pool, account_id, actor_id, action, Some(&detail), now).await {
        tracing::warn!(%e, account_id, action, "Failed to write audit log");
    }
}
