//! IPN payload parsing
//!
//! PayTech posts either JSON or `application/x-www-form-urlencoded`; both are
//! normalized into [`IpnPayload`].

use serde::Deserialize;

/// Event kinds the billing core reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpnEvent {
    SaleComplete,
    SaleCanceled,
    RefundComplete,
    Other(String),
}

impl IpnEvent {
    pub fn from_type(value: &str) -> Self {
        match value {
            "sale_complete" => Self::SaleComplete,
            "sale_canceled" | "sale_cancelled" => Self::SaleCanceled,
            "refund_complete" => Self::RefundComplete,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IpnPayload {
    pub type_event: String,
    #[serde(default)]
    pub ref_command: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Number in JSON bodies, string in form bodies
    #[serde(default)]
    pub item_price: Option<serde_json::Value>,
    #[serde(default)]
    pub api_key_sha256: Option<String>,
    #[serde(default)]
    pub api_secret_sha256: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("unparseable IPN payload: {0}")]
pub struct IpnParseError(String);

impl IpnPayload {
    pub fn parse(body: &[u8]) -> Result<Self, IpnParseError> {
        let trimmed = body.trim_ascii_start();
        if trimmed.starts_with(b"{") {
            return serde_json::from_slice(trimmed).map_err(|e| IpnParseError(e.to_string()));
        }

        let fields: serde_json::Map<String, serde_json::Value> = url::form_urlencoded::parse(body)
            .map(|(k, v)| (k.into_owned(), serde_json::Value::String(v.into_owned())))
            .collect();
        if fields.is_empty() {
            return Err(IpnParseError("empty body".into()));
        }
        serde_json::from_value(serde_json::Value::Object(fields))
            .map_err(|e| IpnParseError(e.to_string()))
    }

    pub fn event(&self) -> IpnEvent {
        IpnEvent::from_type(self.type_event.trim())
    }

    /// Correlation key, trimmed; `None` when absent or blank
    pub fn ref_command(&self) -> Option<&str> {
        self.ref_command
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn payment_method(&self) -> Option<&str> {
        self.payment_method
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Price reported by the gateway, whole currency units
    pub fn item_price(&self) -> Option<i64> {
        match self.item_price.as_ref()? {
            serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            serde_json::Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
            }
            _ => None,
        }
    }
}
