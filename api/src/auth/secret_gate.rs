//! Shared-secret gate
//!
//! A request is authorized iff its secret exactly matches one of the feed's
//! configured secrets. Secrets are compared as HMAC-SHA256 fingerprints so
//! the equality check runs in constant time, and every configured secret is
//! checked even after a match.

use hmac::digest::CtOutput;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// One SHA-256 block, so keying is infallible
const FINGERPRINT_KEY: [u8; 64] = *b"dataout-feed-secret-fingerprint:0123456789abcdef0123456789abcdef";

fn fingerprint(secret: &str) -> CtOutput<HmacSha256> {
    let mut mac = HmacSha256::new(&FINGERPRINT_KEY.into());
    mac.update(secret.as_bytes());
    mac.finalize()
}

/// Check a supplied secret against the configured set.
///
/// Case-sensitive, no trimming or other normalization.
pub fn authorize(configured: &[String], supplied: &str) -> bool {
    let supplied = fingerprint(supplied);

    configured
        .iter()
        .fold(false, |found, secret| found | (fingerprint(secret) == supplied))
}
