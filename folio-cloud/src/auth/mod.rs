//! Account authentication and request throttling

pub mod account_auth;
pub mod rate_limit;

pub use account_auth::AccountIdentity;
