// src/crypto/legacy.rs
//! Pre-envelope API-key values, for migration only
//!
//! Before versioned envelopes, the web application stored
//! `base64(iv[12] || tag[16] || ciphertext)` sealed with AES-256-GCM under a
//! single master key (`ENCRYPTION_KEY_BASE64`), with no key-id and no
//! associated data.
//!
//! [`SecretCipher::decrypt`](super::SecretCipher::decrypt) never falls back to
//! this decoder. Rows are moved onto v1 envelopes explicitly through
//! `db::migrate_legacy_secret` / `db::migrate_legacy_secrets`.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::aliases::{LegacyKey32, PlainText};
use crate::consts::{LEGACY_IV_LEN, LEGACY_TAG_LEN};
use crate::error::{CoreError, Result};
use crate::key_ops::fill_random;

/// AES-256-GCM codec for the old single-master-key values
pub struct LegacyGcm {
    key: LegacyKey32,
}

impl fmt::Debug for LegacyGcm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyGcm").field("key", &"[REDACTED]").finish()
    }
}

impl LegacyGcm {
    /// Raw 32-byte master key
    pub fn new(master_key: &[u8]) -> Result<Self> {
        let raw = <[u8; 32]>::try_from(master_key).map_err(|_| {
            CoreError::InvalidLegacyKey(format!("must be 32 bytes, got {}", master_key.len()))
        })?;
        Ok(Self {
            key: LegacyKey32::new(raw),
        })
    }

    /// Master key as configured for the web application (standard base64)
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let raw = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CoreError::InvalidLegacyKey(format!("not valid base64: {e}")))?;
        Self::new(&raw)
    }

    /// Open a legacy value.
    ///
    /// Bad base64 or a value too short to hold iv and tag is
    /// `UnrecognizedFormat`; a wrong key or tampered bytes is `DecryptionFailed`.
    pub fn decrypt(&self, blob: &str) -> Result<PlainText> {
        let buf = STANDARD
            .decode(blob.trim())
            .map_err(|e| CoreError::format(format!("legacy value is not valid base64: {e}")))?;
        if buf.len() < LEGACY_IV_LEN + LEGACY_TAG_LEN {
            return Err(CoreError::format(format!(
                "legacy value too short: {} bytes",
                buf.len()
            )));
        }

        let (iv, rest) = buf.split_at(LEGACY_IV_LEN);
        let (tag, ciphertext) = rest.split_at(LEGACY_TAG_LEN);

        // aes-gcm wants ciphertext || tag
        let mut sealed = Vec::with_capacity(rest.len());
        sealed.extend_from_slice(ciphertext);
        sealed.extend_from_slice(tag);

        let plaintext = self
            .aead()
            .decrypt(Nonce::from_slice(iv), sealed.as_slice())
            .map_err(|_| CoreError::DecryptionFailed)?;
        Ok(PlainText::new(plaintext))
    }

    /// Produce a value in the legacy layout. Only useful for fixtures and
    /// for checking a master key against existing rows.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String> {
        let mut iv = [0u8; LEGACY_IV_LEN];
        fill_random(&mut iv)?;

        let sealed = self
            .aead()
            .encrypt(Nonce::from_slice(&iv), plaintext)
            .map_err(|_| CoreError::SealFailed)?;
        let (ciphertext, tag) = sealed.split_at(sealed.len() - LEGACY_TAG_LEN);

        let mut out = Vec::with_capacity(LEGACY_IV_LEN + sealed.len());
        out.extend_from_slice(&iv);
        out.extend_from_slice(tag);
        out.extend_from_slice(ciphertext);
        Ok(STANDARD.encode(out))
    }

    fn aead(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.key.expose_secret()))
    }
}
