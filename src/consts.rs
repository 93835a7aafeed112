// src/consts.rs
//! Shared constants — envelope format and security parameters

/// The only envelope format this crate reads or writes
pub const ENVELOPE_VERSION: u8 = 1;

/// HKDF salt length, fresh per envelope
pub const SALT_LEN: usize = 16;

/// XChaCha20-Poly1305 extended nonce length
pub const NONCE_LEN: usize = 24;

/// Poly1305 tag appended to every ciphertext
pub const TAG_LEN: usize = 16;

/// Derived content key length (256-bit)
pub const CONTENT_KEY_LEN: usize = 32;

/// Shortest KEK accepted from the registry.
// Coarse strength guard only; says nothing about entropy.
pub const MIN_KEK_LEN: usize = 32;

/// Length of freshly generated KEKs
pub const GENERATED_KEK_LEN: usize = 32;

/// Application context used for HKDF info and associated data.
// Must stay "catai" to open envelopes already persisted by the web app.
pub const DEFAULT_APP_CONTEXT: &str = "catai";

/// Keyring file format version written by `KeyringFile::save`
pub const KEYRING_FILE_VERSION: u32 = 1;

/// Table holding per-user provider API keys
pub const SECRETS_TABLE: &str = "user_api_keys";

/// Pre-envelope value layout: `base64(iv || tag || ciphertext)`
pub const LEGACY_IV_LEN: usize = 12;
pub const LEGACY_TAG_LEN: usize = 16;
