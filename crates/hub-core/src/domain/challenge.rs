//! Verification challenge tokens.
//!
//! A challenge is 32 bytes from the operating system CSPRNG rendered as
//! lowercase hex. It is held in memory for one handshake only and is never
//! derived from the callback URL.

use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use subtle::ConstantTimeEq;

/// Number of random bytes in a challenge.
pub const CHALLENGE_BYTES: usize = 32;

/// One-shot challenge token for intent verification.
#[derive(Clone, PartialEq, Eq)]
pub struct Challenge(String);

impl Challenge {
    /// Generate a fresh, unpredictable challenge.
    pub fn generate() -> Self {
        let mut bytes = [0u8; CHALLENGE_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Byte-for-byte comparison against a response body, in constant time.
    pub fn matches(&self, body: &[u8]) -> bool {
        self.0.as_bytes().ct_eq(body).into()
    }
}

// Keep tokens out of logs.
impl fmt::Debug for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Challenge(..)")
    }
}
