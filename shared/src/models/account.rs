//! Account Model

use serde::{Deserialize, Serialize};

use super::UnknownVariant;

/// Account lifecycle status
///
/// Created `pending` at registration, becomes `active` on the first approved
/// payment (or an admin override). Admins may suspend at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Pending,
    Active,
    Suspended,
}

impl AccountStatus {
    /// Parse from database string value (lowercase)
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "active" => Some(Self::Active),
            "suspended" => Some(Self::Suspended),
            _ => None,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }

    /// Can this account log in?
    pub fn can_login(&self) -> bool {
        !matches!(self, Self::Suspended)
    }

    /// Can this account publish its portfolio?
    pub fn can_publish(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl TryFrom<String> for AccountStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_db(&value).ok_or_else(|| UnknownVariant::new("account status", value))
    }
}

/// Account role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    #[default]
    User,
    Admin,
}

impl AccountRole {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl TryFrom<String> for AccountRole {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_db(&value).ok_or_else(|| UnknownVariant::new("account role", value))
    }
}

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub role: AccountRole,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub status: AccountStatus,
    pub created_at: i64,
    pub updated_at: i64,
}
