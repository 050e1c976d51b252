//! Password reset tokens.
//!
//! The plain token only ever leaves the server inside the reset email; the
//! store keeps its SHA-256 hex digest and an expiry.

use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

pub const RESET_TOKEN_LEN: usize = 48;

/// How long a reset link stays valid
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

pub fn generate_reset_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LEN)
        .map(char::from)
        .collect()
}

pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub fn reset_token_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(RESET_TOKEN_TTL_MINUTES)
}
