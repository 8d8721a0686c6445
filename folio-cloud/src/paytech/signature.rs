//! IPN authenticity
//!
//! PayTech signs the raw IPN body with HMAC-SHA256 keyed by the API secret
//! (`X-PayTech-Signature`, hex). Older integrations carry no header and instead
//! embed `api_key_sha256` / `api_secret_sha256` in the payload itself.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use super::ipn::IpnPayload;

pub const SIGNATURE_HEADER: &str = "x-paytech-signature";

/// Hex HMAC-SHA256 of `payload` keyed by `secret`
#[cfg(test)]
pub(crate) fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

pub fn verify_hmac(payload: &[u8], signature: &str, secret: &str) -> Result<(), &'static str> {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(payload);
    let sig_bytes = hex::decode(signature.trim()).map_err(|_| "Invalid signature hex")?;
    mac.verify_slice(&sig_bytes)
        .map_err(|_| "IPN signature mismatch")
}

/// Fallback check: payload carries SHA-256 digests of both API credentials
pub fn verify_key_hashes(
    payload: &IpnPayload,
    api_key: &str,
    api_secret: &str,
) -> Result<(), &'static str> {
    let (Some(key_hash), Some(secret_hash)) = (
        payload.api_key_sha256.as_deref(),
        payload.api_secret_sha256.as_deref(),
    ) else {
        return Err("Missing IPN signature");
    };

    let key_ok = digest_matches(key_hash, api_key);
    let secret_ok = digest_matches(secret_hash, api_secret);
    if key_ok & secret_ok {
        Ok(())
    } else {
        Err("IPN credential hash mismatch")
    }
}

/// Header signature first, credential hashes otherwise
pub fn verify_ipn(
    payload: &[u8],
    signature: Option<&str>,
    api_key: &str,
    api_secret: &str,
) -> Result<(), &'static str> {
    match signature.filter(|s| !s.trim().is_empty()) {
        Some(sig) => verify_hmac(payload, sig, api_secret),
        None => {
            let parsed = IpnPayload::parse(payload).map_err(|_| "Missing IPN signature")?;
            verify_key_hashes(&parsed, api_key, api_secret)
        }
    }
}

fn digest_matches(expected_hex: &str, value: &str) -> bool {
    let Ok(expected) = hex::decode(expected_hex.trim()) else {
        return false;
    };
    let actual = Sha256::digest(value.as_bytes());
    expected.len() == actual.len()
        && expected
            .iter()
            .zip(actual.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "pk_test";
    const SECRET: &str = "sk_test";

    fn sha_hex(v: &str) -> String {
        hex::encode(Sha256::digest(v.as_bytes()))
    }

    #[test]
    fn test_valid_hmac_accepted() {
        let body = br#"{"type_event":"sale_complete","ref_command":"FOLIO-1"}"#;
        let sig = sign(body, SECRET);
        assert!(verify_ipn(body, Some(&sig), KEY, SECRET).is_ok());
    }

    #[test]
    fn test_tampered_body_rejected() {
        let body = br#"{"type_event":"sale_complete","ref_command":"FOLIO-1"}"#;
        let sig = sign(body, SECRET);
        let tampered = br#"{"type_event":"sale_complete","ref_command":"FOLIO-2"}"#;
        assert_eq!(
            verify_ipn(tampered, Some(&sig), KEY, SECRET),
            Err("IPN signature mismatch")
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let body = b"type_event=sale_complete";
        let sig = sign(body, "other");
        assert!(verify_hmac(body, &sig, SECRET).is_err());
    }

    #[test]
    fn test_non_hex_signature_rejected() {
        assert_eq!(
            verify_hmac(b"x", "not-hex!", SECRET),
            Err("Invalid signature hex")
        );
    }

    #[test]
    fn test_key_hash_fallback_accepted() {
        let body = format!(
            "type_event=sale_complete&ref_command=FOLIO-1&api_key_sha256={}&api_secret_sha256={}",
            sha_hex(KEY),
            sha_hex(SECRET)
        );
        assert!(verify_ipn(body.as_bytes(), None, KEY, SECRET).is_ok());
    }

    #[test]
    fn test_key_hash_fallback_mismatch() {
        let body = format!(
            r#"{{"type_event":"sale_complete","api_key_sha256":"{}","api_secret_sha256":"{}"}}"#,
            sha_hex(KEY),
            sha_hex("guess")
        );
        assert_eq!(
            verify_ipn(body.as_bytes(), None, KEY, SECRET),
            Err("IPN credential hash mismatch")
        );
    }

    #[test]
    fn test_unsigned_payload_rejected() {
        let body = br#"{"type_event":"sale_complete","ref_command":"FOLIO-1"}"#;
        assert_eq!(
            verify_ipn(body, None, KEY, SECRET),
            Err("Missing IPN signature")
        );
        assert_eq!(
            verify_ipn(body, Some("  "), KEY, SECRET),
            Err("Missing IPN signature")
        );
    }
}
