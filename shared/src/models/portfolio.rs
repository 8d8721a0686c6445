//! Portfolio Model

use serde::{Deserialize, Serialize};

use super::{AccountStatus, UnknownVariant};

/// Portfolio publication status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortfolioStatus {
    #[default]
    Draft,
    Published,
}

impl PortfolioStatus {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

impl TryFrom<String> for PortfolioStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_db(&value).ok_or_else(|| UnknownVariant::new("portfolio status", value))
    }
}

/// Why a portfolio can or cannot be served at its public address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Visible,
    /// Owning account is pending or suspended
    OwnerInactive,
    Draft,
    /// Still `published`, but `expires_at` has passed
    Expired,
}

/// Portfolio (one per account)
///
/// `content` holds the dashboard sections (hero, about, skills, projects,
/// contact, theme) as free-form JSON; the server never interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Portfolio {
    pub id: String,
    pub account_id: String,
    pub slug: String,
    pub title: String,
    pub template: String,
    pub content: serde_json::Value,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub status: PortfolioStatus,
    pub published_at: Option<i64>,
    pub expires_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Portfolio {
    /// Published with an `expires_at` in the past. Stays `published`.
    pub fn is_expired(&self, now: i64) -> bool {
        self.status == PortfolioStatus::Published && self.expires_at.is_some_and(|at| at <= now)
    }

    /// Evaluate the public visibility rule against the owner's status.
    ///
    /// Visible iff the owner is active, the portfolio is published and
    /// `expires_at` is unset or still in the future.
    pub fn visibility(&self, owner_status: AccountStatus, now: i64) -> Visibility {
        if owner_status != AccountStatus::Active {
            return Visibility::OwnerInactive;
        }
        if self.status != PortfolioStatus::Published {
            return Visibility::Draft;
        }
        if self.is_expired(now) {
            return Visibility::Expired;
        }
        Visibility::Visible
    }
}

/// Normalize a display name into a URL slug (`[a-z0-9-]`, 3..=60 chars).
///
/// Returns `None` when nothing usable remains.
pub fn slugify(input: &str) -> Option<String> {
    let mut slug = String::with_capacity(input.len());
    let mut last_dash = true;
    for c in input.trim().chars().flat_map(char::to_lowercase) {
        let mapped = match c {
            'a'..='z' | '0'..='9' => Some(c),
            'à' | 'á' | 'â' | 'ä' | 'ã' => Some('a'),
            'é' | 'è' | 'ê' | 'ë' => Some('e'),
            'î' | 'ï' | 'í' => Some('i'),
            'ô' | 'ö' | 'ó' => Some('o'),
            'ù' | 'û' | 'ü' | 'ú' => Some('u'),
            'ç' => Some('c'),
            _ => None,
        };
        match mapped {
            Some(ch) => {
                slug.push(ch);
                last_dash = false;
            }
            None if !last_dash => {
                slug.push('-');
                last_dash = true;
            }
            None => {}
        }
    }
    let slug: String = slug.trim_matches('-').chars().take(60).collect();
    let slug = slug.trim_end_matches('-').to_string();
    (slug.len() >= 3).then_some(slug)
}

/// Validate a user-chosen slug without rewriting it
pub fn is_valid_slug(slug: &str) -> bool {
    (3..=60).contains(&slug.len())
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portfolio(status: PortfolioStatus, expires_at: Option<i64>) -> Portfolio {
        Portfolio {
            id: "pf-1".to_string(),
            account_id: "acc-1".to_string(),
            slug: "awa-diop".to_string(),
            title: "Awa Diop".to_string(),
            template: "classic".to_string(),
            content: serde_json::json!({}),
            status,
            published_at: None,
            expires_at,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_visibility_requires_active_owner() {
        let p = portfolio(PortfolioStatus::Published, None);
        assert_eq!(
            p.visibility(AccountStatus::Pending, 100),
            Visibility::OwnerInactive
        );
        assert_eq!(
            p.visibility(AccountStatus::Suspended, 100),
            Visibility::OwnerInactive
        );
        assert_eq!(p.visibility(AccountStatus::Active, 100), Visibility::Visible);
    }

    #[test]
    fn test_visibility_draft() {
        let p = portfolio(PortfolioStatus::Draft, Some(1_000));
        assert_eq!(p.visibility(AccountStatus::Active, 100), Visibility::Draft);
    }

    #[test]
    fn test_published_but_expired_stays_published() {
        let p = portfolio(PortfolioStatus::Published, Some(1_000));
        assert!(!p.is_expired(999));
        assert!(p.is_expired(1_000));
        assert_eq!(p.visibility(AccountStatus::Active, 1_500), Visibility::Expired);
        assert_eq!(p.status, PortfolioStatus::Published);
    }

    #[test]
    fn test_draft_is_never_expired() {
        let p = portfolio(PortfolioStatus::Draft, Some(1_000));
        assert!(!p.is_expired(5_000));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Awa Diop").as_deref(), Some("awa-diop"));
        assert_eq!(slugify("  Élodie  N'Dour!! ").as_deref(), Some("elodie-n-dour"));
        assert_eq!(slugify("--Jean--Paul--").as_deref(), Some("jean-paul"));
        assert_eq!(slugify("!!"), None);
        assert_eq!(slugify("ab"), None);
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("awa-diop"));
        assert!(is_valid_slug("dev42"));
        assert!(!is_valid_slug("Awa"));
        assert!(!is_valid_slug("-awa"));
        assert!(!is_valid_slug("ab"));
        assert!(!is_valid_slug("awa_diop"));
    }
}
