//! Admin API (JWT + admin role)

mod accounts;
mod payments;
mod portfolios;

pub use accounts::update_account_status;
pub use payments::{approve_payment, list_payments, reject_payment};
pub use portfolios::publish_portfolio;
