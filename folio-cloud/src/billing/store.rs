//! Payment repository seam
//!
//! Everything the state machine needs from persistence. Both writes are
//! atomic at the store: `insert_pending` is a guarded insert and
//! `try_transition` a conditional update whose activation side effects are
//! committed together with it.

use async_trait::async_trait;
use shared::models::{Payment, PaymentStatus, PaymentType};

use crate::error::BoxError;

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct StoreError(BoxError);

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self(e.into())
    }
}

impl From<BoxError> for StoreError {
    fn from(e: BoxError) -> Self {
        Self(e)
    }
}

/// Row to insert as `pending`
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub id: String,
    pub account_id: String,
    pub payment_type: PaymentType,
    pub amount: i64,
    pub currency: String,
    pub proof_image: Option<String>,
    pub ref_command: Option<String>,
    pub token: Option<String>,
    pub created_at: i64,
}

impl NewPayment {
    /// The row as it reads back after a successful insert
    pub fn into_payment(self) -> Payment {
        Payment {
            id: self.id,
            account_id: self.account_id,
            payment_type: self.payment_type,
            status: PaymentStatus::Pending,
            amount: self.amount,
            currency: self.currency,
            proof_image: self.proof_image,
            ref_command: self.ref_command,
            token: self.token,
            payment_method: None,
            verified_by: None,
            verified_at: None,
            admin_notes: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(Payment),
    /// The account already holds a pending or approved payment
    Conflict,
}

/// Side effects committed with a transition to `approved`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    None,
    /// Account becomes `active` (gateway confirmation)
    Account,
    /// Account becomes `active`, its portfolio is published and
    /// `expires_at` is overwritten (admin approval)
    AccountAndPortfolio { expires_at: i64 },
}

/// A `pending -> terminal` transition
#[derive(Debug, Clone)]
pub struct Transition {
    pub to: PaymentStatus,
    pub verified_by: Option<String>,
    pub payment_method: Option<String>,
    pub admin_notes: Option<String>,
    pub at: i64,
    pub activation: Activation,
}

impl Transition {
    /// Apply the payment-row part of the transition. Optional fields only
    /// overwrite when set, matching the `COALESCE` in the SQL update.
    pub fn apply_to(&self, payment: &mut Payment) {
        payment.status = self.to;
        if let Some(v) = &self.verified_by {
            payment.verified_by = Some(v.clone());
        }
        if let Some(v) = &self.payment_method {
            payment.payment_method = Some(v.clone());
        }
        if let Some(v) = &self.admin_notes {
            payment.admin_notes = Some(v.clone());
        }
        payment.verified_at = Some(self.at);
        payment.updated_at = self.at;
    }
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// The account's payment in `pending` or `approved`, if any
    async fn find_open_for_account(&self, account_id: &str)
    -> Result<Option<Payment>, StoreError>;

    /// Insert unless the account already holds an open payment
    async fn insert_pending(&self, payment: NewPayment) -> Result<InsertOutcome, StoreError>;

    async fn find_by_id(&self, payment_id: &str) -> Result<Option<Payment>, StoreError>;

    async fn find_by_ref_command(&self, ref_command: &str)
    -> Result<Option<Payment>, StoreError>;

    /// Transition the payment if and only if it is still `pending`, applying
    /// `transition.activation` atomically with it. Returns the number of
    /// payments transitioned (0 or 1).
    async fn try_transition(
        &self,
        payment_id: &str,
        transition: &Transition,
    ) -> Result<u64, StoreError>;
}
