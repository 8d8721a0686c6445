//! Cloud server configuration

use crate::error::BoxError;

/// Cloud server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for account authentication
    pub jwt_secret: String,
    /// PayTech API key
    pub paytech_api_key: String,
    /// PayTech API secret (also keys the IPN HMAC)
    pub paytech_api_secret: String,
    /// PayTech environment: "test" or "prod"
    pub paytech_env: String,
    /// PayTech API base URL
    pub paytech_base_url: String,
    /// Upper bound for a checkout-session request
    pub paytech_timeout_secs: u64,
    /// Public URL of this service (IPN callback is derived from it)
    pub public_base_url: String,
    /// Dashboard URL (checkout success/cancel redirects)
    pub frontend_url: String,
    /// Fixed activation fee, whole currency units
    pub activation_fee: i64,
    /// Activation fee currency
    pub activation_currency: String,
    /// Local directory for uploaded files
    pub upload_dir: String,
    /// Public URL prefix for uploaded files
    pub upload_base_url: String,
    /// Maximum proof-of-payment size in bytes
    pub max_proof_size: usize,
    /// Behind a proxy that sets `X-Forwarded-For`; rate limits key on it
    pub trust_proxy: bool,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".into())
            .trim_end_matches('/')
            .to_string();

        let paytech_env = std::env::var("PAYTECH_ENV").unwrap_or_else(|_| "test".into());
        if !matches!(paytech_env.as_str(), "test" | "prod") {
            return Err(format!("PAYTECH_ENV must be \"test\" or \"prod\", got {paytech_env}").into());
        }

        let activation_fee = parse_var("ACTIVATION_FEE", 5000_i64)?;
        if activation_fee <= 0 {
            return Err("ACTIVATION_FEE must be positive".into());
        }

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: parse_var("HTTP_PORT", 8080)?,
            environment: environment.clone(),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            paytech_api_key: Self::require_secret("PAYTECH_API_KEY", &environment)?,
            paytech_api_secret: Self::require_secret("PAYTECH_API_SECRET", &environment)?,
            paytech_env,
            paytech_base_url: std::env::var("PAYTECH_BASE_URL")
                .unwrap_or_else(|_| "https://paytech.sn/api".into())
                .trim_end_matches('/')
                .to_string(),
            paytech_timeout_secs: parse_var("PAYTECH_TIMEOUT_SECS", 15)?,
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into())
                .trim_end_matches('/')
                .to_string(),
            activation_fee,
            activation_currency: std::env::var("ACTIVATION_CURRENCY")
                .unwrap_or_else(|_| "XOF".into()),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "storage/uploads".into()),
            upload_base_url: std::env::var("UPLOAD_BASE_URL")
                .unwrap_or_else(|_| format!("{public_base_url}/uploads")),
            max_proof_size: parse_var("MAX_PROOF_SIZE", 5 * 1024 * 1024)?,
            trust_proxy: parse_var("TRUST_PROXY", false)?,
            public_base_url,
        })
    }

    /// IPN callback registered with each checkout session
    pub fn paytech_ipn_url(&self) -> String {
        format!("{}/paytech/ipn", self.public_base_url)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Parse an optional env var, falling back to `default` when unset.
/// A set-but-unparseable value is an error rather than a silent default.
fn parse_var<T>(name: &str, default: T) -> Result<T, BoxError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| format!("{name}: invalid value {raw:?}: {e}").into()),
        _ => Ok(default),
    }
}
