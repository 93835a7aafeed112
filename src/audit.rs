// src/audit.rs
//! Non-secret metadata stored next to an envelope
//!
//! Lets the UI show "which key is this" without decrypting anything.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the secret, for duplicate detection and audit
pub fn key_fingerprint(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Last four characters of the secret (fewer if it is shorter)
pub fn last4(secret: &str) -> String {
    let tail: Vec<char> = secret.chars().rev().take(4).collect();
    tail.into_iter().rev().collect()
}
