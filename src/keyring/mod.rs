// src/keyring/mod.rs
//! Key registry — where KEKs come from
//!
//! The cipher only ever sees the read contract in [`KeyRegistry`]. [`Keyring`]
//! is the in-memory snapshot implementation, loaded from the JSON keyring file
//! ([`KeyringFile`]) or built directly in tests. [`CachedKeyring`] serves
//! snapshots to long-running processes and picks up file changes.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::aliases::KekBytes;
use crate::error::Result;

mod cache;
mod file;

pub use cache::CachedKeyring;
pub use file::{KeyEntry, KeyStatus, KeyringFile};

/// Read-only view of the key-encryption-keys
pub trait KeyRegistry {
    /// Key-id used for every new encryption
    fn active_key_id(&self) -> &str;

    /// Raw KEK bytes for `key_id`, if the registry holds one
    fn resolve(&self, key_id: &str) -> Option<&[u8]>;
}

impl<T: KeyRegistry + ?Sized> KeyRegistry for &T {
    fn active_key_id(&self) -> &str {
        (**self).active_key_id()
    }

    fn resolve(&self, key_id: &str) -> Option<&[u8]> {
        (**self).resolve(key_id)
    }
}

impl<T: KeyRegistry + ?Sized> KeyRegistry for Arc<T> {
    fn active_key_id(&self) -> &str {
        (**self).active_key_id()
    }

    fn resolve(&self, key_id: &str) -> Option<&[u8]> {
        (**self).resolve(key_id)
    }
}

/// Immutable snapshot: active key-id plus every known KEK
pub struct Keyring {
    active_key_id: String,
    keys: HashMap<String, KekBytes>,
}

impl Keyring {
    /// Build a snapshot from raw key material.
    ///
    /// No validation happens here; a missing or short active key surfaces
    /// as `KeyNotFound` on the first encryption.
    pub fn new<I, K>(active_key_id: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<u8>)>,
        K: Into<String>,
    {
        Self {
            active_key_id: active_key_id.into(),
            keys: keys
                .into_iter()
                .map(|(kid, kek)| (kid.into(), KekBytes::new(kek)))
                .collect(),
        }
    }

    /// Parse and validate keyring JSON
    pub fn from_json(json: &str) -> Result<Self> {
        KeyringFile::from_json(json)?.to_keyring()
    }

    /// Read and validate the keyring file at `path`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        KeyringFile::load(path)?.to_keyring()
    }

    pub fn contains(&self, key_id: &str) -> bool {
        self.keys.contains_key(key_id)
    }

    /// Known key-ids, sorted
    pub fn key_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.keys.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyRegistry for Keyring {
    fn active_key_id(&self) -> &str {
        &self.active_key_id
    }

    fn resolve(&self, key_id: &str) -> Option<&[u8]> {
        self.keys.get(key_id).map(|kek| kek.expose_secret().as_slice())
    }
}

impl fmt::Debug for Keyring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keyring")
            .field("active_key_id", &self.active_key_id)
            .field("key_ids", &self.key_ids())
            .finish()
    }
}
