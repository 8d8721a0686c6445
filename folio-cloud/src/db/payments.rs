//! Payment rows
//!
//! The two writes that matter for correctness are conditional:
//! `insert_pending` relies on the `payments_one_open_per_account` partial
//! unique index, and `transition_pending` only matches rows still `pending`.

use shared::models::{Payment, PaymentStatus, PaymentType};
use sqlx::{PgExecutor, PgPool};

pub struct InsertPayment<'a> {
    pub id: &'a str,
    pub account_id: &'a str,
    pub payment_type: PaymentType,
    pub amount: i64,
    pub currency: &'a str,
    pub proof_image: Option<&'a str>,
    pub ref_command: Option<&'a str>,
    pub token: Option<&'a str>,
    pub now: i64,
}

/// Insert a `pending` payment unless the account already has one that is
/// pending or approved. `None` means the insert was blocked.
pub async fn insert_pending<'e>(
    executor: impl PgExecutor<'e>,
    payment: &InsertPayment<'_>,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO payments (id, account_id, payment_type, status, amount, currency,
                               proof_image, ref_command, token, created_at, updated_at)
         VALUES ($1, $2, $3, 'pending', $4, $5, $6, $7, $8, $9, $9)
         ON CONFLICT (account_id) WHERE status IN ('pending', 'approved') DO NOTHING
         RETURNING *",
    )
    .bind(payment.id)
    .bind(payment.account_id)
    .bind(payment.payment_type.as_db())
    .bind(payment.amount)
    .bind(payment.currency)
    .bind(payment.proof_image)
    .bind(payment.ref_command)
    .bind(payment.token)
    .bind(payment.now)
    .fetch_optional(executor)
    .await
}

/// The account's pending or approved payment, if any
pub async fn find_open_for_account(
    pool: &PgPool,
    account_id: &str,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM payments
         WHERE account_id = $1 AND status IN ('pending', 'approved')
         ORDER BY created_at DESC
         LIMIT 1",
    )
    .bind(account_id)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payments WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_ref_command(
    pool: &PgPool,
    ref_command: &str,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payments WHERE ref_command = $1")
        .bind(ref_command)
        .fetch_optional(pool)
        .await
}

pub struct TransitionFields<'a> {
    pub to: PaymentStatus,
    pub verified_by: Option<&'a str>,
    pub payment_method: Option<&'a str>,
    pub admin_notes: Option<&'a str>,
    pub at: i64,
}

/// Move a payment out of `pending`. Returns the owning account id when this
/// call performed the transition, `None` when the row was not pending.
pub async fn transition_pending<'e>(
    executor: impl PgExecutor<'e>,
    payment_id: &str,
    fields: &TransitionFields<'_>,
) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as(
        "UPDATE payments SET
            status = $1,
            verified_by = COALESCE($2, verified_by),
            payment_method = COALESCE($3, payment_method),
            admin_notes = COALESCE($4, admin_notes),
            verified_at = $5,
            updated_at = $5
         WHERE id = $6 AND status = 'pending'
         RETURNING account_id",
    )
    .bind(fields.to.as_db())
    .bind(fields.verified_by)
    .bind(fields.payment_method)
    .bind(fields.admin_notes)
    .bind(fields.at)
    .bind(payment_id)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(|r| r.0))
}

pub async fn list_for_account(
    pool: &PgPool,
    account_id: &str,
) -> Result<Vec<Payment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payments WHERE account_id = $1 ORDER BY created_at DESC")
        .bind(account_id)
        .fetch_all(pool)
        .await
}

pub async fn latest_for_account(
    pool: &PgPool,
    account_id: &str,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM payments WHERE account_id = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(account_id)
    .fetch_optional(pool)
    .await
}

/// Admin listing joined with the payer's name and email
#[derive(sqlx::FromRow, serde::Serialize)]
pub struct AdminPaymentRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub payment: Payment,
    pub account_name: String,
    pub account_email: String,
}

pub async fn list_for_admin(
    pool: &PgPool,
    status: Option<PaymentStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<AdminPaymentRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT p.*, a.name AS account_name, a.email AS account_email
         FROM payments p
         JOIN accounts a ON a.id = p.account_id
         WHERE ($1::TEXT IS NULL OR p.status = $1)
         ORDER BY p.created_at DESC
         LIMIT $2 OFFSET $3",
    )
    .bind(status.map(|s| s.as_db()))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}
