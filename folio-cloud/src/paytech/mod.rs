//! PayTech integration via REST API (no SDK dependency)
//!
//! - [`PaymentGateway`]: the seam the billing core talks to
//! - [`PayTechClient`]: reqwest implementation against `{base}/payment/request-payment`
//! - [`signature`]: IPN authenticity checks
//! - [`ipn`]: IPN payload parsing

pub mod ipn;
pub mod signature;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Checkout session to open at the gateway
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    /// Correlation key, echoed back in every IPN for this checkout
    pub ref_command: String,
    pub amount: i64,
    pub currency: String,
    pub item_name: String,
    /// Opaque data echoed back by the IPN
    pub custom_field: serde_json::Value,
}

/// Opened checkout session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub token: String,
    pub redirect_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway request timed out")]
    Timeout,
    #[error("gateway transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("gateway returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("gateway refused checkout: {0}")]
    Refused(String),
    #[error("invalid gateway response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Transport(e)
        }
    }
}

/// External payment gateway as seen by the billing core
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a checkout session. Only a definitive success returns `Ok`.
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Check that an IPN body really comes from the gateway
    fn verify_ipn(&self, payload: &[u8], signature: Option<&str>) -> Result<(), &'static str>;
}

/// PayTech REST client
pub struct PayTechClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    env: String,
    ipn_url: String,
    success_url: String,
    cancel_url: String,
}

#[derive(Serialize)]
struct RequestPaymentBody<'a> {
    item_name: &'a str,
    item_price: i64,
    currency: &'a str,
    ref_command: &'a str,
    command_name: String,
    env: &'a str,
    ipn_url: &'a str,
    success_url: &'a str,
    cancel_url: &'a str,
    /// PayTech expects a JSON-encoded string here
    custom_field: String,
}

#[derive(Deserialize)]
struct RequestPaymentResponse {
    #[serde(default)]
    success: serde_json::Value,
    token: Option<String>,
    redirect_url: Option<String>,
    #[serde(rename = "redirectUrl")]
    redirect_url_camel: Option<String>,
    message: Option<String>,
}

impl PayTechClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.paytech_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.paytech_base_url.clone(),
            api_key: config.paytech_api_key.clone(),
            api_secret: config.paytech_api_secret.clone(),
            env: config.paytech_env.clone(),
            ipn_url: config.paytech_ipn_url(),
            success_url: format!("{}/dashboard/payment/success", config.frontend_url),
            cancel_url: format!("{}/dashboard/payment/cancel", config.frontend_url),
        })
    }
}

#[async_trait]
impl PaymentGateway for PayTechClient {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let body = RequestPaymentBody {
            item_name: &request.item_name,
            item_price: request.amount,
            currency: &request.currency,
            ref_command: &request.ref_command,
            command_name: format!("{} ({})", request.item_name, request.ref_command),
            env: &self.env,
            ipn_url: &self.ipn_url,
            success_url: &self.success_url,
            cancel_url: &self.cancel_url,
            custom_field: request.custom_field.to_string(),
        };

        let resp = self
            .http
            .post(format!("{}/payment/request-payment", self.base_url))
            .header("API_KEY", &self.api_key)
            .header("API_SECRET", &self.api_secret)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: RequestPaymentResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        session_from_response(parsed)
    }

    fn verify_ipn(&self, payload: &[u8], signature: Option<&str>) -> Result<(), &'static str> {
        signature::verify_ipn(payload, signature, &self.api_key, &self.api_secret)
    }
}

/// PayTech reports success as `1` (sometimes `"1"` or `true`)
fn is_success_flag(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Number(n) => n.as_i64() == Some(1),
        serde_json::Value::String(s) => s == "1",
        serde_json::Value::Bool(b) => *b,
        _ => false,
    }
}

fn session_from_response(resp: RequestPaymentResponse) -> Result<CheckoutSession, GatewayError> {
    if !is_success_flag(&resp.success) {
        return Err(GatewayError::Refused(
            resp.message.unwrap_or_else(|| format!("success={}", resp.success)),
        ));
    }
    let redirect_url = resp
        .redirect_url
        .or(resp.redirect_url_camel)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| GatewayError::InvalidResponse("missing redirect_url".into()))?;
    let token = resp
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| GatewayError::InvalidResponse("missing token".into()))?;
    Ok(CheckoutSession {
        token,
        redirect_url,
    })
}
