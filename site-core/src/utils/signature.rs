use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Generate the gateway checkout signature.
///
/// Format: HMAC-SHA256(gateway_order_id|gateway_payment_id, secret), hex-encoded.
pub fn checkout_signature(
    secret: &str,
    gateway_order_id: &str,
    gateway_payment_id: &str,
) -> Result<String, anyhow::Error> {
    let payload = format!("{}|{}", gateway_order_id, gateway_payment_id);
    hmac_hex(secret, &payload)
}

/// Verify a gateway checkout signature using constant-time comparison.
pub fn verify_checkout_signature(
    secret: &str,
    gateway_order_id: &str,
    gateway_payment_id: &str,
    signature: &str,
) -> Result<bool, anyhow::Error> {
    let expected = checkout_signature(secret, gateway_order_id, gateway_payment_id)?;
    Ok(constant_time_eq(&expected, signature))
}

/// Verify a gateway webhook signature (HMAC over the raw request body).
pub fn verify_webhook_signature(
    secret: &str,
    body: &str,
    signature: &str,
) -> Result<bool, anyhow::Error> {
    let expected = hmac_hex(secret, body)?;
    Ok(constant_time_eq(&expected, signature))
}

fn hmac_hex(secret: &str, payload: &str) -> Result<String, anyhow::Error> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("Invalid key length: {}", e))?;
    mac.update(payload.as_bytes());
    let result = mac.finalize();
    Ok(hex::encode(result.into_bytes()))
}

fn constant_time_eq(expected: &str, candidate: &str) -> bool {
    let expected_bytes = expected.as_bytes();
    let candidate_bytes = candidate.as_bytes();

    if expected_bytes.len() != candidate_bytes.len() {
        return false;
    }

    expected_bytes.ct_eq(candidate_bytes).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_signature_roundtrip() {
        let secret = "my_secret_key";
        let signature = checkout_signature(secret, "order_123", "pay_456").unwrap();
        assert!(!signature.is_empty());

        let is_valid =
            verify_checkout_signature(secret, "order_123", "pay_456", &signature).unwrap();
        assert!(is_valid);
    }

    #[test]
    fn test_tampered_payment_id_rejected() {
        let secret = "my_secret_key";
        let signature = checkout_signature(secret, "order_123", "pay_456").unwrap();

        let is_valid =
            verify_checkout_signature(secret, "order_123", "pay_457", &signature).unwrap();
        assert!(!is_valid);
    }

    #[test]
    fn test_wrong_length_signature_rejected() {
        let secret = "my_secret_key";
        let is_valid = verify_checkout_signature(secret, "order_123", "pay_456", "abc").unwrap();
        assert!(!is_valid);
    }

    #[test]
    fn test_webhook_signature() {
        let secret = "webhook_secret";
        let body = r#"{"event":"payment.captured"}"#;

        let expected = hmac_hex(secret, body).unwrap();
        assert!(verify_webhook_signature(secret, body, &expected).unwrap());

        let modified_body = r#"{"event":"payment.failed"}"#;
        assert!(!verify_webhook_signature(secret, modified_body, &expected).unwrap());
    }
}
