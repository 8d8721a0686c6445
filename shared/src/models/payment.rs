//! Payment Model

use serde::{Deserialize, Serialize};

use super::UnknownVariant;

/// Payment status
///
/// `pending` is the only non-terminal state. `approved` and `rejected` are
/// immutable once set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl PaymentStatus {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// No transition leaves a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Counts against the one-open-payment-per-account rule
    pub fn blocks_new_intake(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

impl TryFrom<String> for PaymentStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_db(&value).ok_or_else(|| UnknownVariant::new("payment status", value))
    }
}

/// Payment channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    /// Proof-of-payment upload reviewed by an admin
    Manual,
    /// PayTech checkout confirmed by IPN
    Paytech,
}

impl PaymentType {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(Self::Manual),
            "paytech" => Some(Self::Paytech),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Paytech => "paytech",
        }
    }
}

impl TryFrom<String> for PaymentType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_db(&value).ok_or_else(|| UnknownVariant::new("payment type", value))
    }
}

/// One payment attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub account_id: String,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub payment_type: PaymentType,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub status: PaymentStatus,
    /// Whole currency units (XOF has no minor unit)
    pub amount: i64,
    pub currency: String,
    /// Stored path of the uploaded proof (manual only)
    pub proof_image: Option<String>,
    /// Gateway correlation key (paytech only)
    pub ref_command: Option<String>,
    /// Gateway checkout token (paytech only)
    pub token: Option<String>,
    /// Method reported by the gateway (e.g. "Orange Money", "Wave")
    pub payment_method: Option<String>,
    /// Admin who resolved the payment (manual resolution only)
    pub verified_by: Option<String>,
    pub verified_at: Option<i64>,
    pub admin_notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Approved.is_terminal());
        assert!(PaymentStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_blocks_new_intake() {
        assert!(PaymentStatus::Pending.blocks_new_intake());
        assert!(PaymentStatus::Approved.blocks_new_intake());
        assert!(!PaymentStatus::Rejected.blocks_new_intake());
    }

    #[test]
    fn test_type_db_values() {
        assert_eq!(PaymentType::Manual.as_db(), "manual");
        assert_eq!(PaymentType::from_db("paytech"), Some(PaymentType::Paytech));
        assert!(PaymentType::try_from("stripe".to_string()).is_err());
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&PaymentStatus::Approved).unwrap();
        assert_eq!(json, "\"approved\"");
        let status: PaymentStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(status, PaymentStatus::Rejected);
    }
}
