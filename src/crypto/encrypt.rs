// src/crypto/encrypt.rs
use chacha20poly1305::aead::{Aead, Payload};
use chacha20poly1305::XNonce;
use tracing::debug;

use super::kdf::derive_content_key;
use super::{aead, SecretCipher};
use crate::consts::{ENVELOPE_VERSION, MIN_KEK_LEN, NONCE_LEN, SALT_LEN};
use crate::envelope::Envelope;
use crate::error::{CoreError, Result};
use crate::key_ops::fill_random;
use crate::keyring::KeyRegistry;

impl<R: KeyRegistry> SecretCipher<R> {
    /// Seal `plaintext` and serialize the envelope for storage.
    ///
    /// `key_id` defaults to the registry's active key.
    pub fn encrypt(&self, plaintext: &[u8], key_id: Option<&str>) -> Result<String> {
        self.seal(plaintext, key_id)?.encode()
    }

    /// Same as [`encrypt`](Self::encrypt) but returns the structured envelope
    pub fn seal(&self, plaintext: &[u8], key_id: Option<&str>) -> Result<Envelope> {
        let key_id = key_id.unwrap_or_else(|| self.registry.active_key_id());

        // Resolve before touching the RNG or any primitive.
        let kek = match self.registry.resolve(key_id) {
            Some(kek) if kek.len() >= MIN_KEK_LEN => kek,
            _ => {
                return Err(CoreError::KeyNotFound {
                    key_id: key_id.to_owned(),
                })
            }
        };

        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        fill_random(&mut salt)?;
        fill_random(&mut nonce)?;

        let info = self.context.hkdf_info(ENVELOPE_VERSION);
        let content_key = derive_content_key(kek, &salt, info.as_bytes())?;
        let aad = self.context.associated_data(ENVELOPE_VERSION, key_id);

        let ciphertext = aead(&content_key)
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad: &aad,
                },
            )
            .map_err(|_| CoreError::SealFailed)?;

        debug!(key_id, "sealed secret envelope");

        Ok(Envelope {
            version: ENVELOPE_VERSION,
            key_id: key_id.to_owned(),
            salt,
            nonce,
            ciphertext,
        })
    }
}
