// src/error.rs
//! Public error type for the entire crate

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Encrypt side: requested key-id is absent or its material is too short.
    #[error("key not found in registry: {key_id}")]
    KeyNotFound { key_id: String },

    /// Decrypt side: the envelope names a key the registry cannot supply.
    #[error("key not available for decryption: {key_id}")]
    KeyNotAvailable { key_id: String },

    #[error("unrecognized envelope format: {0}")]
    UnrecognizedFormat(String),

    #[error("envelope authentication failed")]
    DecryptionFailed,

    #[error("envelope sealing failed")]
    SealFailed,

    #[error("content key derivation failed")]
    KeyDerivation,

    #[error("secret value is empty")]
    EmptySecret,

    #[error("secure random generator failed: {0}")]
    Randomness(String),

    #[error("invalid keyring: {0}")]
    InvalidKeyring(String),

    #[error("invalid record locator: {0}")]
    InvalidLocator(String),

    /// Legacy master key is not 32 bytes of standard base64.
    #[error("invalid legacy master key: {0}")]
    InvalidLegacyKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Database error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// Failure reported by a non-SQLite `SecretStore`.
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CoreError {
    pub(crate) fn format(reason: impl Into<String>) -> Self {
        CoreError::UnrecognizedFormat(reason.into())
    }
}
