// src/crypto/mod.rs
//! Envelope encryption — no I/O except the rewrap write-back
//!
//! Each secret is sealed with its own content key, derived by HKDF-SHA256
//! from a registry KEK and a random salt, under XChaCha20-Poly1305 with the
//! format version and key-id bound in as associated data.
mod context;
mod decrypt;
mod encrypt;
mod kdf;
pub mod legacy;
mod rewrap;

use chacha20poly1305::aead::KeyInit;
use chacha20poly1305::{Key, XChaCha20Poly1305};

pub use context::AppContext;
pub use decrypt::DecryptedSecret;
pub use legacy::LegacyGcm;
pub use rewrap::RewrapOutcome;

use crate::aliases::ContentKey32;
use crate::config::Config;
use crate::error::Result;
use crate::keyring::{KeyRegistry, Keyring};

/// Encryptor, decryptor and rewrap coordinator over one key registry.
///
/// Stateless apart from the registry it borrows from; safe to share across
/// threads whenever `R` is.
#[derive(Debug, Clone)]
pub struct SecretCipher<R> {
    registry: R,
    context: AppContext,
}

impl<R: KeyRegistry> SecretCipher<R> {
    pub fn new(registry: R) -> Self {
        Self::with_context(registry, AppContext::default())
    }

    pub fn with_context(registry: R, context: AppContext) -> Self {
        Self { registry, context }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }
}

impl SecretCipher<Keyring> {
    /// Load the configured keyring file and application context
    pub fn from_config(config: &Config) -> Result<Self> {
        let keyring = Keyring::load(&config.keyring.path)?;
        Ok(Self::with_context(keyring, config.app_context()))
    }
}

fn aead(content_key: &ContentKey32) -> XChaCha20Poly1305 {
    XChaCha20Poly1305::new(Key::from_slice(content_key.expose_secret()))
}
