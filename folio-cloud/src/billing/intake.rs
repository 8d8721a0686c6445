//! Payment intake: manual proof upload and PayTech checkout

use shared::models::{Payment, PaymentStatus, PaymentType};

use super::BillingService;
use super::error::{IntakeError, ProofError};
use super::store::{InsertOutcome, NewPayment};
use crate::paytech::CheckoutRequest;
use crate::storage::proof_path;
use crate::util::new_id;

const PROOF_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp", "pdf"];

const ITEM_NAME: &str = "Portfolio activation";

/// Uploaded proof of payment
#[derive(Debug, Clone)]
pub struct ProofUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Opened checkout plus its pending payment
#[derive(Debug, Clone, serde::Serialize)]
pub struct GatewayCheckout {
    pub redirect_url: String,
    pub payment: Payment,
}

impl BillingService {
    /// Store the proof and open a pending manual payment
    pub async fn request_manual_payment(
        &self,
        account_id: &str,
        upload: ProofUpload,
    ) -> Result<Payment, IntakeError> {
        self.ensure_no_open_payment(account_id).await?;
        let ext = validate_proof(&upload, self.max_proof_size)?;

        let payment_id = new_id();
        let path = proof_path(account_id, &payment_id, &upload.bytes, &ext);
        let stored = self.storage.store(&path, &upload.bytes).await?;

        let new = NewPayment {
            id: payment_id,
            account_id: account_id.to_string(),
            payment_type: PaymentType::Manual,
            amount: self.pricing.amount,
            currency: self.pricing.currency.clone(),
            proof_image: Some(stored.clone()),
            ref_command: None,
            token: None,
            created_at: self.clock.now_millis(),
        };

        let outcome = match self.store.insert_pending(new).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.discard_proof(&stored).await;
                return Err(e.into());
            }
        };
        match outcome {
            InsertOutcome::Inserted(payment) => {
                tracing::info!(account_id, payment_id = %payment.id, "Manual payment submitted");
                Ok(payment)
            }
            InsertOutcome::Conflict => {
                self.discard_proof(&stored).await;
                Err(self.conflict_error(account_id).await)
            }
        }
    }

    /// Open a PayTech checkout; the payment row exists only once the gateway
    /// has confirmed the session
    pub async fn request_gateway_payment(
        &self,
        account_id: &str,
    ) -> Result<GatewayCheckout, IntakeError> {
        self.ensure_no_open_payment(account_id).await?;

        let payment_id = new_id();
        let ref_command = new_ref_command();
        let request = CheckoutRequest {
            ref_command: ref_command.clone(),
            amount: self.pricing.amount,
            currency: self.pricing.currency.clone(),
            item_name: ITEM_NAME.to_string(),
            custom_field: serde_json::json!({
                "account_id": account_id,
                "payment_id": payment_id,
            }),
        };

        let session = match self.gateway.create_session(&request).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(account_id, ref_command = %ref_command, error = %e, "PayTech checkout failed");
                return Err(e.into());
            }
        };

        let new = NewPayment {
            id: payment_id,
            account_id: account_id.to_string(),
            payment_type: PaymentType::Paytech,
            amount: self.pricing.amount,
            currency: self.pricing.currency.clone(),
            proof_image: None,
            ref_command: Some(ref_command.clone()),
            token: Some(session.token),
            created_at: self.clock.now_millis(),
        };

        match self.store.insert_pending(new).await? {
            InsertOutcome::Inserted(payment) => {
                tracing::info!(account_id, ref_command = %ref_command, "PayTech checkout opened");
                Ok(GatewayCheckout {
                    redirect_url: session.redirect_url,
                    payment,
                })
            }
            InsertOutcome::Conflict => {
                // The opened session has no row; an IPN for it is logged as unmatched
                tracing::warn!(account_id, ref_command = %ref_command, "Concurrent intake won, abandoning checkout");
                Err(self.conflict_error(account_id).await)
            }
        }
    }

    /// Guard shared by both intake channels
    async fn ensure_no_open_payment(&self, account_id: &str) -> Result<(), IntakeError> {
        match self.store.find_open_for_account(account_id).await? {
            Some(p) if p.status == PaymentStatus::Approved => Err(IntakeError::AlreadyApproved),
            Some(_) => Err(IntakeError::AlreadyPending),
            None => Ok(()),
        }
    }

    /// Name the payment that blocked a guarded insert
    async fn conflict_error(&self, account_id: &str) -> IntakeError {
        match self.store.find_open_for_account(account_id).await {
            Ok(Some(p)) if p.status == PaymentStatus::Approved => IntakeError::AlreadyApproved,
            _ => IntakeError::AlreadyPending,
        }
    }

    async fn discard_proof(&self, path: &str) {
        if let Err(e) = self.storage.delete(path).await {
            tracing::warn!(path, error = %e, "Failed to delete orphaned proof");
        }
    }
}

/// Returns the normalized extension
fn validate_proof(upload: &ProofUpload, max_size: usize) -> Result<String, ProofError> {
    if upload.bytes.is_empty() {
        return Err(ProofError::Empty);
    }
    if upload.bytes.len() > max_size {
        return Err(ProofError::TooLarge {
            size: upload.bytes.len(),
            max: max_size,
        });
    }
    let ext = std::path::Path::new(&upload.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !PROOF_FORMATS.contains(&ext.as_str()) {
        return Err(ProofError::UnsupportedFormat(ext));
    }
    Ok(ext)
}

/// Unique checkout correlation key, e.g. `FOLIO-3F2A...`
fn new_ref_command() -> String {
    format!(
        "FOLIO-{}",
        uuid::Uuid::new_v4().simple().to_string().to_uppercase()
    )
}
