//! Delivery signatures.
//!
//! Every delivery carries `sha256=<hex>` where `<hex>` is the lowercase
//! HMAC-SHA256 of the raw payload keyed with the subscriber's secret. An
//! empty secret is a valid (empty) key.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Algorithm tag prefixed to every signature.
pub const SIGNATURE_ALGORITHM: &str = "sha256";

/// Default header carrying the signature on deliveries.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";

fn mac_for(secret: &[u8]) -> HmacSha256 {
    HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size")
}

/// Sign a payload for delivery.
///
/// Deterministic: the same payload and secret always yield the same token.
pub fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac = mac_for(secret.as_bytes());
    mac.update(payload);
    let digest = mac.finalize().into_bytes();
    format!("{}={}", SIGNATURE_ALGORITHM, hex::encode(digest))
}

/// Check a `sha256=<hex>` header value against a payload.
///
/// Uses the MAC's constant-time verification. Unknown algorithms, bad hex
/// and uppercase-tagged values are rejected.
pub fn verify_signature(payload: &[u8], secret: &str, header: &str) -> bool {
    let Some((algorithm, encoded)) = header.split_once('=') else {
        return false;
    };
    if algorithm != SIGNATURE_ALGORITHM {
        return false;
    }
    let Ok(expected) = hex::decode(encoded) else {
        return false;
    };

    let mut mac = mac_for(secret.as_bytes());
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}
