//! In-memory collaborators for state machine tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use shared::models::{AccountStatus, Payment, PortfolioStatus};

use super::store::{Activation, InsertOutcome, NewPayment, PaymentStore, StoreError, Transition};
use crate::paytech::{CheckoutRequest, CheckoutSession, GatewayError, PaymentGateway, signature};
use crate::storage::{FileStorage, StorageError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioState {
    pub status: PortfolioStatus,
    pub published_at: Option<i64>,
    pub expires_at: Option<i64>,
}

#[derive(Default)]
struct State {
    payments: Vec<Payment>,
    accounts: HashMap<String, AccountStatus>,
    portfolios: HashMap<String, PortfolioState>,
}

/// Mirrors the Postgres store: guarded insert and conditional transition
/// happen under one lock. Reads yield after taking their snapshot so that
/// concurrent callers interleave between check and write.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    activations: AtomicUsize,
}

impl MemoryStore {
    /// Registered account: `pending`, with a draft portfolio
    pub fn add_account(&self, account_id: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .accounts
            .insert(account_id.to_string(), AccountStatus::Pending);
        state.portfolios.insert(
            account_id.to_string(),
            PortfolioState {
                status: PortfolioStatus::Draft,
                published_at: None,
                expires_at: None,
            },
        );
    }

    pub fn set_portfolio(&self, account_id: &str, portfolio: PortfolioState) {
        self.state
            .lock()
            .unwrap()
            .portfolios
            .insert(account_id.to_string(), portfolio);
    }

    pub fn set_account_status(&self, account_id: &str, status: AccountStatus) {
        self.state
            .lock()
            .unwrap()
            .accounts
            .insert(account_id.to_string(), status);
    }

    pub fn remove_portfolio(&self, account_id: &str) {
        self.state.lock().unwrap().portfolios.remove(account_id);
    }

    pub fn account_status(&self, account_id: &str) -> Option<AccountStatus> {
        self.state.lock().unwrap().accounts.get(account_id).copied()
    }

    pub fn portfolio(&self, account_id: &str) -> Option<PortfolioState> {
        self.state.lock().unwrap().portfolios.get(account_id).cloned()
    }

    pub fn payments(&self) -> Vec<Payment> {
        self.state.lock().unwrap().payments.clone()
    }

    pub fn payments_for(&self, account_id: &str) -> Vec<Payment> {
        self.payments()
            .into_iter()
            .filter(|p| p.account_id == account_id)
            .collect()
    }

    pub fn payment(&self, payment_id: &str) -> Option<Payment> {
        self.payments().into_iter().find(|p| p.id == payment_id)
    }

    /// Number of transitions that applied an activation
    pub fn activations(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn find_open_for_account(
        &self,
        account_id: &str,
    ) -> Result<Option<Payment>, StoreError> {
        let found = self
            .payments()
            .into_iter()
            .find(|p| p.account_id == account_id && p.status.blocks_new_intake());
        tokio::task::yield_now().await;
        Ok(found)
    }

    async fn insert_pending(&self, payment: NewPayment) -> Result<InsertOutcome, StoreError> {
        let mut state = self.state.lock().unwrap();
        let blocked = state
            .payments
            .iter()
            .any(|p| p.account_id == payment.account_id && p.status.blocks_new_intake());
        if blocked {
            return Ok(InsertOutcome::Conflict);
        }
        let row = payment.into_payment();
        state.payments.push(row.clone());
        Ok(InsertOutcome::Inserted(row))
    }

    async fn find_by_id(&self, payment_id: &str) -> Result<Option<Payment>, StoreError> {
        let found = self.payment(payment_id);
        tokio::task::yield_now().await;
        Ok(found)
    }

    async fn find_by_ref_command(
        &self,
        ref_command: &str,
    ) -> Result<Option<Payment>, StoreError> {
        let found = self
            .payments()
            .into_iter()
            .find(|p| p.ref_command.as_deref() == Some(ref_command));
        tokio::task::yield_now().await;
        Ok(found)
    }

    async fn try_transition(
        &self,
        payment_id: &str,
        transition: &Transition,
    ) -> Result<u64, StoreError> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        let Some(payment) = state
            .payments
            .iter_mut()
            .find(|p| p.id == payment_id && !p.status.is_terminal())
        else {
            return Ok(0);
        };
        transition.apply_to(payment);
        let account_id = payment.account_id.clone();

        match transition.activation {
            Activation::None => {}
            Activation::Account => {
                state.accounts.insert(account_id, AccountStatus::Active);
                self.activations.fetch_add(1, Ordering::SeqCst);
            }
            Activation::AccountAndPortfolio { expires_at } => {
                state.accounts.insert(account_id.clone(), AccountStatus::Active);
                if let Some(portfolio) = state.portfolios.get_mut(&account_id) {
                    portfolio.status = PortfolioStatus::Published;
                    portfolio.published_at = Some(transition.at);
                    portfolio.expires_at = Some(expires_at);
                }
                self.activations.fetch_add(1, Ordering::SeqCst);
            }
        }
        Ok(1)
    }
}

pub const GATEWAY_KEY: &str = "pk_test_folio";
pub const GATEWAY_SECRET: &str = "sk_test_folio";

/// Gateway double: hands out sessions unless told to fail, verifies IPNs
/// with the real signature scheme
#[derive(Default)]
pub struct StubGateway {
    pub fail: std::sync::atomic::AtomicBool,
    sessions: AtomicUsize,
}

impl StubGateway {
    pub fn failing() -> Self {
        Self {
            fail: true.into(),
            sessions: AtomicUsize::new(0),
        }
    }

    pub fn sessions(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        tokio::task::yield_now().await;
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Refused("Invalid API key".into()));
        }
        let n = self.sessions.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CheckoutSession {
            token: format!("tok_{n}"),
            redirect_url: format!(
                "https://paytech.sn/payment/checkout/{}",
                request.ref_command
            ),
        })
    }

    fn verify_ipn(&self, payload: &[u8], sig: Option<&str>) -> Result<(), &'static str> {
        signature::verify_ipn(payload, sig, GATEWAY_KEY, GATEWAY_SECRET)
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<_> = self.files.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl FileStorage for MemoryStorage {
    async fn store(&self, path: &str, bytes: &[u8]) -> Result<String, StorageError> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
        Ok(path.to_string())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.files.lock().unwrap().remove(path);
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("memory://{path}")
    }
}
