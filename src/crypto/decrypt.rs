// src/crypto/decrypt.rs
use std::fmt;

use chacha20poly1305::aead::{Aead, Payload};
use chacha20poly1305::XNonce;
use tracing::debug;

use super::kdf::derive_content_key;
use super::{aead, SecretCipher};
use crate::aliases::PlainText;
use crate::consts::{ENVELOPE_VERSION, MIN_KEK_LEN};
use crate::envelope::Envelope;
use crate::error::{CoreError, Result};
use crate::keyring::KeyRegistry;

/// Result of opening an envelope
pub struct DecryptedSecret {
    pub plaintext: PlainText,
    /// Key-id the envelope was sealed under
    pub key_id: String,
    /// True when `key_id` is no longer the registry's active key
    pub needs_rewrap: bool,
}

impl DecryptedSecret {
    pub fn as_bytes(&self) -> &[u8] {
        self.plaintext.expose_secret()
    }

    /// Plaintext as UTF-8, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }
}

impl fmt::Debug for DecryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptedSecret")
            .field("plaintext", &"[REDACTED]")
            .field("key_id", &self.key_id)
            .field("needs_rewrap", &self.needs_rewrap)
            .finish()
    }
}

impl<R: KeyRegistry> SecretCipher<R> {
    /// Parse and open a stored envelope
    pub fn decrypt(&self, blob: &str) -> Result<DecryptedSecret> {
        let envelope = Envelope::decode(blob)?;
        self.open(&envelope)
    }

    /// Open an already-parsed envelope.
    ///
    /// Fails with `KeyNotAvailable` when the registry cannot supply the KEK
    /// and `DecryptionFailed` on any authentication failure; no plaintext is
    /// ever returned in either case.
    pub fn open(&self, envelope: &Envelope) -> Result<DecryptedSecret> {
        if envelope.version != ENVELOPE_VERSION {
            return Err(CoreError::format(format!(
                "unsupported version v={}",
                envelope.version
            )));
        }

        let kek = match self.registry.resolve(&envelope.key_id) {
            Some(kek) if kek.len() >= MIN_KEK_LEN => kek,
            _ => {
                return Err(CoreError::KeyNotAvailable {
                    key_id: envelope.key_id.clone(),
                })
            }
        };

        let info = self.context.hkdf_info(envelope.version);
        let content_key = derive_content_key(kek, &envelope.salt, info.as_bytes())?;
        let aad = self
            .context
            .associated_data(envelope.version, &envelope.key_id);

        let plaintext = aead(&content_key)
            .decrypt(
                XNonce::from_slice(&envelope.nonce),
                Payload {
                    msg: &envelope.ciphertext,
                    aad: &aad,
                },
            )
            .map_err(|_| CoreError::DecryptionFailed)?;

        let needs_rewrap = envelope.key_id != self.registry.active_key_id();
        debug!(key_id = %envelope.key_id, needs_rewrap, "opened secret envelope");

        Ok(DecryptedSecret {
            plaintext: PlainText::new(plaintext),
            key_id: envelope.key_id.clone(),
            needs_rewrap,
        })
    }
}
