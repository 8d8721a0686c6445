//! Admin resolution of pending payments

use shared::models::{Payment, PaymentStatus};
use shared::util::ONE_YEAR_MILLIS;

use super::BillingService;
use super::error::ResolutionError;
use super::store::{Activation, Transition};
use crate::util::non_empty;

impl BillingService {
    /// Approve a pending payment: account goes active, portfolio is published
    /// and its expiry set to one year from now
    pub async fn approve(
        &self,
        payment_id: &str,
        admin_id: &str,
        notes: Option<String>,
    ) -> Result<Payment, ResolutionError> {
        let now = self.clock.now_millis();
        let transition = Transition {
            to: PaymentStatus::Approved,
            verified_by: Some(admin_id.to_string()),
            payment_method: None,
            admin_notes: non_empty(notes),
            at: now,
            activation: Activation::AccountAndPortfolio {
                expires_at: now + ONE_YEAR_MILLIS,
            },
        };
        let payment = self.resolve(payment_id, &transition).await?;
        tracing::info!(payment_id, admin_id, account_id = %payment.account_id, "Payment approved");
        Ok(payment)
    }

    /// Reject a pending payment. A reason is mandatory.
    pub async fn reject(
        &self,
        payment_id: &str,
        admin_id: &str,
        notes: &str,
    ) -> Result<Payment, ResolutionError> {
        let Some(reason) = non_empty(Some(notes.to_string())) else {
            return Err(ResolutionError::MissingNotes);
        };
        let transition = Transition {
            to: PaymentStatus::Rejected,
            verified_by: Some(admin_id.to_string()),
            payment_method: None,
            admin_notes: Some(reason),
            at: self.clock.now_millis(),
            activation: Activation::None,
        };
        let payment = self.resolve(payment_id, &transition).await?;
        tracing::info!(payment_id, admin_id, account_id = %payment.account_id, "Payment rejected");
        Ok(payment)
    }

    async fn resolve(
        &self,
        payment_id: &str,
        transition: &Transition,
    ) -> Result<Payment, ResolutionError> {
        let mut payment = self
            .store
            .find_by_id(payment_id)
            .await?
            .ok_or(ResolutionError::NotFound)?;
        if payment.status.is_terminal() {
            return Err(ResolutionError::AlreadyProcessed);
        }

        if self.store.try_transition(payment_id, transition).await? == 0 {
            return Err(ResolutionError::NotPending);
        }
        transition.apply_to(&mut payment);
        Ok(payment)
    }
}
