//! PayTech IPN resolution
//!
//! Once the signature checks out every event is acknowledged, matched or
//! not, so the gateway stops redelivering. Only store failures surface as
//! errors, and those are safe to retry since transitions are conditional.

use shared::models::{Payment, PaymentStatus};

use super::BillingService;
use super::error::WebhookError;
use super::store::{Activation, Transition};
use crate::paytech::ipn::{IpnEvent, IpnPayload};

/// How an authenticated IPN was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// `sale_complete` moved the payment to approved
    Approved,
    /// `sale_canceled` moved the payment to rejected
    Canceled,
    /// The payment was already terminal
    AlreadyResolved,
    /// No payment carries this `ref_command`
    Unmatched,
    /// `refund_complete` is recorded in the log only
    RefundRecorded,
    /// Event type not handled
    Ignored,
    /// Signed but unparseable; acknowledged so it is not redelivered
    Malformed,
}

impl WebhookOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Canceled => "canceled",
            Self::AlreadyResolved => "already_resolved",
            Self::Unmatched => "unmatched",
            Self::RefundRecorded => "refund_recorded",
            Self::Ignored => "ignored",
            Self::Malformed => "malformed",
        }
    }
}

impl BillingService {
    pub async fn handle_webhook(
        &self,
        raw: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookOutcome, WebhookError> {
        if let Err(reason) = self.gateway.verify_ipn(raw, signature) {
            tracing::warn!(reason, "Rejected PayTech IPN");
            return Err(WebhookError::InvalidSignature(reason));
        }

        let payload = match IpnPayload::parse(raw) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "Unparseable PayTech IPN");
                return Ok(WebhookOutcome::Malformed);
            }
        };

        let outcome = match payload.event() {
            IpnEvent::SaleComplete => self.on_sale_complete(&payload).await?,
            IpnEvent::SaleCanceled => self.on_sale_canceled(&payload).await?,
            IpnEvent::RefundComplete => {
                tracing::info!(
                    ref_command = payload.ref_command().unwrap_or_default(),
                    "PayTech refund completed"
                );
                WebhookOutcome::RefundRecorded
            }
            IpnEvent::Other(kind) => {
                tracing::debug!(event = %kind, "Ignoring PayTech IPN event");
                WebhookOutcome::Ignored
            }
        };
        Ok(outcome)
    }

    async fn on_sale_complete(&self, payload: &IpnPayload) -> Result<WebhookOutcome, WebhookError> {
        let Some(payment) = self.match_payment(payload).await? else {
            return Ok(WebhookOutcome::Unmatched);
        };
        if let Some(price) = payload.item_price()
            && price != payment.amount
        {
            tracing::warn!(payment_id = %payment.id, expected = payment.amount, reported = price, "IPN amount differs from payment");
        }

        let transition = Transition {
            to: PaymentStatus::Approved,
            verified_by: None,
            payment_method: payload.payment_method().map(str::to_string),
            admin_notes: None,
            at: self.clock.now_millis(),
            activation: Activation::Account,
        };
        if payment.status.is_terminal() || self.store.try_transition(&payment.id, &transition).await? == 0 {
            tracing::info!(payment_id = %payment.id, "Duplicate sale_complete, payment already resolved");
            return Ok(WebhookOutcome::AlreadyResolved);
        }
        tracing::info!(payment_id = %payment.id, account_id = %payment.account_id, "PayTech payment approved");
        Ok(WebhookOutcome::Approved)
    }

    async fn on_sale_canceled(&self, payload: &IpnPayload) -> Result<WebhookOutcome, WebhookError> {
        let Some(payment) = self.match_payment(payload).await? else {
            return Ok(WebhookOutcome::Unmatched);
        };
        let transition = Transition {
            to: PaymentStatus::Rejected,
            verified_by: None,
            payment_method: payload.payment_method().map(str::to_string),
            admin_notes: None,
            at: self.clock.now_millis(),
            activation: Activation::None,
        };
        if payment.status.is_terminal() || self.store.try_transition(&payment.id, &transition).await? == 0 {
            return Ok(WebhookOutcome::AlreadyResolved);
        }
        tracing::info!(payment_id = %payment.id, "PayTech payment canceled");
        Ok(WebhookOutcome::Canceled)
    }

    async fn match_payment(&self, payload: &IpnPayload) -> Result<Option<Payment>, WebhookError> {
        let Some(ref_command) = payload.ref_command() else {
            tracing::warn!(event = %payload.type_event, "PayTech IPN without ref_command");
            return Ok(None);
        };
        let found = self.store.find_by_ref_command(ref_command).await?;
        if found.is_none() {
            tracing::warn!(ref_command, event = %payload.type_event, "PayTech IPN for unknown ref_command");
        }
        Ok(found)
    }
}
