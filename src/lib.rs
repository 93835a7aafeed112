// src/lib.rs
//! envelope-secret-vault — envelope encryption for secrets at rest
//!
//! Features:
//! - KEK keyring with active / retired keys
//! - Per-envelope HKDF-SHA256 content keys, XChaCha20-Poly1305 AEAD
//! - Lazy rewrap onto the active key as records are read
//! - SQLite storage for per-user provider API keys

pub mod aliases;
pub mod audit;
pub mod config;
pub mod consts;
pub mod crypto;
pub mod db;
pub mod envelope;
pub mod error;
pub mod key_ops;
pub mod keyring;
pub mod store;

// Re-export everything users need at the crate root
pub use aliases::{ContentKey32, KekBytes, PlainText};
pub use config::{load as load_config, Config};
pub use crypto::{AppContext, DecryptedSecret, LegacyGcm, RewrapOutcome, SecretCipher};
pub use envelope::Envelope;
pub use error::{CoreError, Result as CoreResult};
pub use keyring::{CachedKeyring, KeyRegistry, Keyring, KeyringFile};
pub use store::{RecordId, RecordLocator, SecretStore};
