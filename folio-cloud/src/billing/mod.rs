//! Payment state machine
//!
//! ```text
//!           intake (guarded)            resolution (conditional, idempotent)
//! [none] ──────────────────► pending ──┬──────────────► approved ──► activation
//!                                      └──────────────► rejected
//! ```
//!
//! - intake: manual proof upload, PayTech checkout
//! - resolution: admin approve/reject, PayTech IPN
//! - activation: account `active`; admin approval also publishes the portfolio
//!   for one year, gateway confirmation does not

pub mod clock;
pub mod error;
mod intake;
pub mod pg_store;
mod resolution;
pub mod store;
mod webhook;

#[cfg(test)]
pub(crate) mod memory;

use std::sync::Arc;

pub use clock::{Clock, SystemClock};
pub use error::{IntakeError, ProofError, ResolutionError, WebhookError};
pub use intake::{GatewayCheckout, ProofUpload};
pub use pg_store::PgPaymentStore;
pub use store::PaymentStore;
pub use webhook::WebhookOutcome;

use crate::paytech::PaymentGateway;
use crate::storage::FileStorage;

/// Fixed activation fee
#[derive(Debug, Clone)]
pub struct Pricing {
    pub amount: i64,
    pub currency: String,
}

pub struct BillingService {
    store: Arc<dyn PaymentStore>,
    gateway: Arc<dyn PaymentGateway>,
    storage: Arc<dyn FileStorage>,
    clock: Arc<dyn Clock>,
    pricing: Pricing,
    max_proof_size: usize,
}

impl BillingService {
    pub fn new(
        store: Arc<dyn PaymentStore>,
        gateway: Arc<dyn PaymentGateway>,
        storage: Arc<dyn FileStorage>,
        clock: Arc<dyn Clock>,
        pricing: Pricing,
        max_proof_size: usize,
    ) -> Self {
        Self {
            store,
            gateway,
            storage,
            clock,
            pricing,
            max_proof_size,
        }
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    /// Current time from the injected clock; also drives public expiry
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }
}
