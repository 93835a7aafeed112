// src/key_ops.rs
//! Key generation utilities
//!
//! All randomness in the crate (salts, nonces, KEKs, key-id suffixes) comes
//! from the operating system CSPRNG through `fill_random`.

use chrono::Utc;
use rand::rngs::OsRng;
use rand::TryRngCore;
use zeroize::Zeroize;

use crate::aliases::KekBytes;
use crate::consts::GENERATED_KEK_LEN;
use crate::error::{CoreError, Result};

/// Fill `buf` from the OS random source
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CoreError::Randomness(e.to_string()))
}

/// Generate a new random 256-bit key-encryption-key
pub fn generate_kek() -> Result<KekBytes> {
    let mut raw = [0u8; GENERATED_KEK_LEN];
    fill_random(&mut raw)?;
    let kek = KekBytes::new(raw.to_vec());
    raw.zeroize();
    Ok(kek)
}

/// New key-id of the form `k2025_01_31_ab12`
pub fn generate_key_id() -> Result<String> {
    let mut suffix = [0u8; 2];
    fill_random(&mut suffix)?;
    Ok(format!(
        "k{}_{}",
        Utc::now().format("%Y_%m_%d"),
        hex::encode(suffix)
    ))
}
