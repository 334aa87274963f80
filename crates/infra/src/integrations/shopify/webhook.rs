//! Inbound webhook verification and payload decoding
//!
//! Shopify signs each delivery with an HMAC-SHA256 digest of the raw body,
//! base64-encoded in the `X-Shopify-Hmac-SHA256` header. Verification is a
//! precondition: an invalid signature rejects the request before any core
//! logic runs.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use priceloom_domain::{constants, PriceloomError, Result};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verify a delivery signature against the shared secret.
pub fn verify_webhook_signature(secret: &str, body: &[u8], signature_b64: &str) -> Result<()> {
    if secret.is_empty() {
        return Err(PriceloomError::Signature("webhook secret is not configured".into()));
    }
    if signature_b64.is_empty() {
        return Err(PriceloomError::Signature("missing signature header".into()));
    }

    let provided = BASE64
        .decode(signature_b64)
        .map_err(|_| PriceloomError::Signature("signature is not valid base64".into()))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| PriceloomError::Signature("invalid webhook secret".into()))?;
    mac.update(body);
    mac.verify_slice(&provided)
        .map_err(|_| PriceloomError::Signature("digest mismatch".into()))
}

/// A `metafields/update` notification body.
#[derive(Debug, Clone, Deserialize)]
pub struct MetafieldNotification {
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub owner_id: Option<serde_json::Value>,
}

impl MetafieldNotification {
    /// True when the notification targets the base-price metafield.
    pub fn is_base_price(&self) -> bool {
        self.namespace == constants::BASE_PRICE_NAMESPACE && self.key == constants::BASE_PRICE_KEY
    }

    /// Owner product id as an opaque string, whether delivered numeric or
    /// stringly.
    pub fn owner_id_string(&self) -> Option<String> {
        match self.owner_id.as_ref()? {
            serde_json::Value::String(raw) => Some(raw.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// New metafield value rendered as a plain string.
    pub fn value_string(&self) -> String {
        match &self.value {
            serde_json::Value::String(raw) => raw.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        BASE64.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_a_valid_signature() {
        let body = br#"{"namespace":"custom","key":"base_price","value":"120.00"}"#;
        let signature = sign("topsecret", body);
        assert!(verify_webhook_signature("topsecret", body, &signature).is_ok());
    }

    #[test]
    fn rejects_a_tampered_body() {
        let body = br#"{"value":"120.00"}"#;
        let signature = sign("topsecret", body);
        let result = verify_webhook_signature("topsecret", br#"{"value":"999.00"}"#, &signature);
        assert!(matches!(result, Err(PriceloomError::Signature(_))));
    }

    #[test]
    fn rejects_wrong_secret_missing_header_and_bad_base64() {
        let body = b"payload";
        let signature = sign("secret-a", body);
        assert!(verify_webhook_signature("secret-b", body, &signature).is_err());
        assert!(verify_webhook_signature("secret-a", body, "").is_err());
        assert!(verify_webhook_signature("secret-a", body, "!!not-base64!!").is_err());
        assert!(verify_webhook_signature("", body, &signature).is_err());
    }

    #[test]
    fn decodes_numeric_owner_and_value() {
        let notification: MetafieldNotification = serde_json::from_str(
            r#"{"namespace":"custom","key":"base_price","value":149.9,"owner_id":632910392}"#,
        )
        .unwrap();

        assert!(notification.is_base_price());
        assert_eq!(notification.owner_id_string().as_deref(), Some("632910392"));
        assert_eq!(notification.value_string(), "149.9");
    }

    #[test]
    fn other_metafields_are_not_base_price() {
        let notification: MetafieldNotification = serde_json::from_str(
            r#"{"namespace":"custom","key":"color","value":"red","owner_id":1}"#,
        )
        .unwrap();
        assert!(!notification.is_base_price());
    }
}
