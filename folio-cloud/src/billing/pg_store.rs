//! PostgreSQL-backed [`PaymentStore`]

use async_trait::async_trait;
use shared::models::{AccountStatus, Payment, PaymentStatus};
use sqlx::PgPool;

use super::store::{Activation, InsertOutcome, NewPayment, PaymentStore, StoreError, Transition};
use crate::db::{accounts, audit, payments, portfolios};

#[derive(Clone)]
pub struct PgPaymentStore {
    pool: PgPool,
}

impl PgPaymentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentStore for PgPaymentStore {
    async fn find_open_for_account(
        &self,
        account_id: &str,
    ) -> Result<Option<Payment>, StoreError> {
        Ok(payments::find_open_for_account(&self.pool, account_id).await?)
    }

    async fn insert_pending(&self, payment: NewPayment) -> Result<InsertOutcome, StoreError> {
        let row = payments::InsertPayment {
            id: &payment.id,
            account_id: &payment.account_id,
            payment_type: payment.payment_type,
            amount: payment.amount,
            currency: &payment.currency,
            proof_image: payment.proof_image.as_deref(),
            ref_command: payment.ref_command.as_deref(),
            token: payment.token.as_deref(),
            now: payment.created_at,
        };
        Ok(match payments::insert_pending(&self.pool, &row).await? {
            Some(inserted) => InsertOutcome::Inserted(inserted),
            None => InsertOutcome::Conflict,
        })
    }

    async fn find_by_id(&self, payment_id: &str) -> Result<Option<Payment>, StoreError> {
        Ok(payments::find_by_id(&self.pool, payment_id).await?)
    }

    async fn find_by_ref_command(
        &self,
        ref_command: &str,
    ) -> Result<Option<Payment>, StoreError> {
        Ok(payments::find_by_ref_command(&self.pool, ref_command).await?)
    }

    async fn try_transition(
        &self,
        payment_id: &str,
        transition: &Transition,
    ) -> Result<u64, StoreError> {
        let fields = payments::TransitionFields {
            to: transition.to,
            verified_by: transition.verified_by.as_deref(),
            payment_method: transition.payment_method.as_deref(),
            admin_notes: transition.admin_notes.as_deref(),
            at: transition.at,
        };

        let mut tx = self.pool.begin().await?;

        let Some(account_id) = payments::transition_pending(&mut *tx, payment_id, &fields).await?
        else {
            // Already terminal: nothing written
            tx.rollback().await?;
            return Ok(0);
        };

        match transition.activation {
            Activation::None => {}
            Activation::Account => {
                accounts::update_status(&mut *tx, &account_id, AccountStatus::Active, transition.at)
                    .await?;
            }
            Activation::AccountAndPortfolio { expires_at } => {
                accounts::update_status(&mut *tx, &account_id, AccountStatus::Active, transition.at)
                    .await?;
                let published =
                    portfolios::publish_with_expiry(&mut *tx, &account_id, expires_at, transition.at)
                        .await?;
                if published == 0 {
                    tracing::info!(account_id = %account_id, "Approved account has no portfolio to publish");
                }
            }
        }

        tx.commit().await?;

        // Covers admin and gateway resolutions alike; actor is None for IPNs
        let action = match transition.to {
            PaymentStatus::Approved => "payment_approved",
            _ => "payment_rejected",
        };
        audit::record(
            &self.pool,
            &account_id,
            transition.verified_by.as_deref(),
            action,
            serde_json::json!({
                "payment_id": payment_id,
                "notes": transition.admin_notes,
                "payment_method": transition.payment_method,
            }),
            transition.at,
        )
        .await;
        Ok(1)
    }
}
