//! Typed outcomes of the billing operations and their API mapping
//!
//! Conflicts and validation failures are expected and map to 4xx without
//! logging. Store failures are logged once, here, when converted.

use shared::error::{AppError, ErrorCode};

use super::store::StoreError;
use crate::paytech::GatewayError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    #[error("empty file")]
    Empty,
    #[error("file too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },
    #[error("unsupported format: {0:?}")]
    UnsupportedFormat(String),
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("a payment is already pending for this account")]
    AlreadyPending,
    #[error("this account already has an approved payment")]
    AlreadyApproved,
    #[error("invalid proof of payment: {0}")]
    InvalidProof(#[from] ProofError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("failed to store proof: {0}")]
    Storage(#[from] StorageError),
    #[error("payment store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("payment not found")]
    NotFound,
    #[error("payment has already been processed")]
    AlreadyProcessed,
    /// Lost a race: another resolver moved the payment first
    #[error("payment is no longer pending")]
    NotPending,
    #[error("a reason is required to reject a payment")]
    MissingNotes,
    #[error("payment store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("invalid IPN signature: {0}")]
    InvalidSignature(&'static str),
    #[error("payment store error: {0}")]
    Store(#[from] StoreError),
}

fn store_failure(e: &StoreError) -> AppError {
    tracing::error!(error = %e, "Payment store error");
    AppError::new(ErrorCode::DatabaseError)
}

impl From<IntakeError> for AppError {
    fn from(e: IntakeError) -> Self {
        match e {
            IntakeError::AlreadyPending => AppError::new(ErrorCode::PaymentAlreadyPending),
            IntakeError::AlreadyApproved => AppError::new(ErrorCode::PaymentAlreadyApproved),
            IntakeError::InvalidProof(ProofError::Empty) => AppError::new(ErrorCode::EmptyFile),
            IntakeError::InvalidProof(e @ ProofError::TooLarge { .. }) => {
                AppError::with_message(ErrorCode::FileTooLarge, e.to_string())
            }
            IntakeError::InvalidProof(e @ ProofError::UnsupportedFormat(_)) => {
                AppError::with_message(ErrorCode::UnsupportedFileFormat, e.to_string())
            }
            // Already logged where the call failed
            IntakeError::Gateway(_) => AppError::new(ErrorCode::PaymentGatewayError),
            IntakeError::Storage(e) => {
                tracing::error!(error = %e, "Proof storage error");
                AppError::new(ErrorCode::FileStorageFailed)
            }
            IntakeError::Store(e) => store_failure(&e),
        }
    }
}

impl From<ResolutionError> for AppError {
    fn from(e: ResolutionError) -> Self {
        match e {
            ResolutionError::NotFound => AppError::new(ErrorCode::PaymentNotFound),
            ResolutionError::AlreadyProcessed => {
                AppError::new(ErrorCode::PaymentAlreadyProcessed)
            }
            ResolutionError::NotPending => AppError::new(ErrorCode::PaymentNotPending),
            ResolutionError::MissingNotes => AppError::new(ErrorCode::RejectionReasonRequired),
            ResolutionError::Store(e) => store_failure(&e),
        }
    }
}

impl From<WebhookError> for AppError {
    fn from(e: WebhookError) -> Self {
        match e {
            WebhookError::InvalidSignature(_) => AppError::new(ErrorCode::InvalidWebhookSignature),
            WebhookError::Store(e) => store_failure(&e),
        }
    }
}
