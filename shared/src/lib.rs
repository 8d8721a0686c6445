//! Shared types for the Folio platform
//!
//! Error codes, the API response envelope and the account / portfolio /
//! payment models used by the cloud service and its clients.

pub mod error;
pub mod models;
pub mod util;
