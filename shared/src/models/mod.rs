//! Data models
//!
//! Shared between folio-cloud and the dashboard (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`;
//! status columns are TEXT and decoded through `TryFrom<String>`.
//! All IDs are UUID strings, all timestamps Unix milliseconds.

pub mod account;
pub mod payment;
pub mod portfolio;

// Re-exports
pub use account::*;
pub use payment::*;
pub use portfolio::*;

/// A TEXT column held a value no enum variant maps to
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
