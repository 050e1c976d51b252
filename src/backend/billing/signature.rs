//! Stripe webhook signatures.
//!
//! The `Stripe-Signature` header looks like `t=1700000000,v1=<hex>[,v1=...]`.
//! Each `v1` is HMAC-SHA256 over `"{t}.{payload}"` keyed with the endpoint
//! secret. Timestamps older or newer than the tolerance are rejected.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::BillingError;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

fn mac(secret: &str, timestamp: i64, payload: &str) -> Result<HmacSha256, BillingError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BillingError::Signature(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    Ok(mac)
}

/// Hex `v1` signature for a payload
pub fn compute_signature(secret: &str, timestamp: i64, payload: &str) -> Result<String, BillingError> {
    Ok(hex::encode(mac(secret, timestamp, payload)?.finalize().into_bytes()))
}

/// Full header value, as Stripe would send it
pub fn signature_header(secret: &str, timestamp: i64, payload: &str) -> Result<String, BillingError> {
    Ok(format!("t={},v1={}", timestamp, compute_signature(secret, timestamp, payload)?))
}

/// Check `header` against `payload` at time `now` (unix seconds)
pub fn verify_signature(
    secret: &str,
    payload: &str,
    header: &str,
    now: i64,
) -> Result<(), BillingError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<Vec<u8>> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(value.parse().map_err(|_| {
                    BillingError::Signature("timestamp is not a number".to_string())
                })?);
            }
            Some(("v1", value)) => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| BillingError::Signature("missing timestamp".to_string()))?;
    if signatures.is_empty() {
        return Err(BillingError::Signature("missing v1 signature".to_string()));
    }
    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(BillingError::Signature("timestamp outside tolerance".to_string()));
    }

    let expected = mac(secret, timestamp, payload)?;
    let matched = signatures
        .iter()
        .any(|sig| expected.clone().verify_slice(sig).is_ok());
    if !matched {
        return Err(BillingError::Signature("no matching signature".to_string()));
    }
    Ok(())
}
