//! Confirmation codes for the signup flow.
//!
//! A code is generated on every signup request, emailed to the user in
//! plaintext and stored only as a SHA-256 digest together with an expiry.
//! Exchanging it for an access token clears it, so each code works once.

use rand::Rng;

use crate::hashing::sha256_hex;
use crate::types::Timestamp;

/// Length of a confirmation code (alphanumeric characters).
pub const CODE_LENGTH: usize = 12;

/// Default lifetime of a confirmation code.
pub const DEFAULT_CODE_TTL_HOURS: i64 = 24;

/// A freshly issued code.
pub struct IssuedCode {
    /// Sent to the user, never stored.
    pub plaintext: String,
    /// SHA-256 hex digest stored on the user row.
    pub hash: String,
}

pub fn generate_confirmation_code() -> IssuedCode {
    let plaintext: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(CODE_LENGTH)
        .map(char::from)
        .collect();
    let hash = hash_confirmation_code(&plaintext);
    IssuedCode { plaintext, hash }
}

pub fn hash_confirmation_code(code: &str) -> String {
    sha256_hex(code.trim().as_bytes())
}

/// Check a submitted code against the stored digest and expiry.
///
/// Returns `false` when no code is outstanding.
pub fn verify_confirmation_code(
    code: &str,
    stored_hash: Option<&str>,
    expires_at: Option<Timestamp>,
    now: Timestamp,
) -> bool {
    let (Some(stored_hash), Some(expires_at)) = (stored_hash, expires_at) else {
        return false;
    };
    if expires_at <= now {
        return false;
    }
    hash_confirmation_code(code) == stored_hash
}
