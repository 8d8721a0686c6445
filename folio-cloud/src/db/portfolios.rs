use shared::models::{Portfolio, PortfolioStatus};
use sqlx::{PgExecutor, PgPool};

pub struct CreatePortfolio<'a> {
    pub id: &'a str,
    pub account_id: &'a str,
    pub slug: &'a str,
    pub title: &'a str,
    pub now: i64,
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    portfolio: &CreatePortfolio<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO portfolios (id, account_id, slug, title, status, created_at, updated_at)
         VALUES ($1, $2, $3, $4, 'draft', $5, $5)",
    )
    .bind(portfolio.id)
    .bind(portfolio.account_id)
    .bind(portfolio.slug)
    .bind(portfolio.title)
    .bind(portfolio.now)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn find_by_account(
    pool: &PgPool,
    account_id: &str,
) -> Result<Option<Portfolio>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM portfolios WHERE account_id = $1")
        .bind(account_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Portfolio>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM portfolios WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn slug_exists(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM portfolios WHERE slug = $1)")
        .bind(slug)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

pub struct UpdateContent<'a> {
    pub title: Option<&'a str>,
    pub template: Option<&'a str>,
    pub content: Option<&'a serde_json::Value>,
    pub now: i64,
}

pub async fn update_content(
    pool: &PgPool,
    account_id: &str,
    update: &UpdateContent<'_>,
) -> Result<Option<Portfolio>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE portfolios SET
            title = COALESCE($1, title),
            template = COALESCE($2, template),
            content = COALESCE($3, content),
            updated_at = $4
         WHERE account_id = $5
         RETURNING *",
    )
    .bind(update.title)
    .bind(update.template)
    .bind(update.content.cloned())
    .bind(update.now)
    .bind(account_id)
    .fetch_optional(pool)
    .await
}

/// Publish without touching `expires_at` (user publish and admin publish).
/// `published_at` keeps its first value when already published.
pub async fn publish<'e>(
    executor: impl PgExecutor<'e>,
    portfolio_id: &str,
    now: i64,
) -> Result<Option<Portfolio>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE portfolios SET
            status = $1,
            published_at = CASE WHEN status = $1 THEN COALESCE(published_at, $2) ELSE $2 END,
            updated_at = $2
         WHERE id = $3
         RETURNING *",
    )
    .bind(PortfolioStatus::Published.as_db())
    .bind(now)
    .bind(portfolio_id)
    .fetch_optional(executor)
    .await
}

/// Admin-approval activation: publish and set `expires_at` unconditionally.
pub async fn publish_with_expiry<'e>(
    executor: impl PgExecutor<'e>,
    account_id: &str,
    expires_at: i64,
    now: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE portfolios SET status = $1, published_at = $2, expires_at = $3, updated_at = $2
         WHERE account_id = $4",
    )
    .bind(PortfolioStatus::Published.as_db())
    .bind(now)
    .bind(expires_at)
    .bind(account_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
