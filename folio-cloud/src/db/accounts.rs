use shared::models::{Account, AccountRole, AccountStatus};
use sqlx::{PgExecutor, PgPool};

pub struct CreateAccount<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub hashed_password: &'a str,
    pub role: AccountRole,
    pub now: i64,
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    account: &CreateAccount<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO accounts (id, name, email, hashed_password, role, status, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, 'pending', $6, $6)",
    )
    .bind(account.id)
    .bind(account.name)
    .bind(account.email)
    .bind(account.hashed_password)
    .bind(account.role.as_db())
    .bind(account.now)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM accounts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM accounts WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Set an account's status. Returns `false` when the account does not exist.
pub async fn update_status<'e>(
    executor: impl PgExecutor<'e>,
    account_id: &str,
    status: AccountStatus,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE accounts SET status = $1, updated_at = $2 WHERE id = $3")
        .bind(status.as_db())
        .bind(now)
        .bind(account_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
