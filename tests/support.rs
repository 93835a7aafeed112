// tests/support.rs
//! Shared fixtures for the integration tests

#![allow(dead_code)] // each test binary uses a different subset

use std::sync::Mutex;

use envelope_secret_vault::error::Result;
use envelope_secret_vault::key_ops::fill_random;
use envelope_secret_vault::{Envelope, Keyring, RecordLocator, SecretCipher, SecretStore};

/// Initialize tracing only when the logging feature is enabled
#[cfg(feature = "logging")]
pub fn init_tracing() {
    use tracing_subscriber::prelude::*;
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[cfg(not(feature = "logging"))]
pub fn init_tracing() {}

pub fn random_kek() -> Vec<u8> {
    let mut kek = vec![0u8; 32];
    fill_random(&mut kek).expect("os rng");
    kek
}

/// `{active: "k1", keys: {k1, k2}}` with fresh random KEKs
pub fn two_key_ring() -> Keyring {
    Keyring::new("k1", [("k1", random_kek()), ("k2", random_kek())])
}

/// Same KEK material under a different active key, as after a rotation
pub fn rotated(from: &[(&str, Vec<u8>)], active: &str) -> Keyring {
    Keyring::new(
        active,
        from.iter().map(|(kid, kek)| (kid.to_string(), kek.clone())),
    )
}

pub fn cipher() -> SecretCipher<Keyring> {
    SecretCipher::new(two_key_ring())
}

/// Records every write it is asked to perform
#[derive(Default)]
pub struct CountingStore {
    pub writes: Mutex<Vec<(RecordLocator, String)>>,
    pub fail_with: Option<&'static str>,
}

impl CountingStore {
    pub fn failing(message: &'static str) -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
            fail_with: Some(message),
        }
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn last_write(&self) -> Option<(RecordLocator, String)> {
        self.writes.lock().unwrap().last().cloned()
    }
}

impl SecretStore for CountingStore {
    fn update_envelope(&self, locator: &RecordLocator, envelope: &str) -> Result<()> {
        if let Some(message) = self.fail_with {
            return Err(envelope_secret_vault::CoreError::Storage(message.into()));
        }
        self.writes
            .lock()
            .unwrap()
            .push((locator.clone(), envelope.to_owned()));
        Ok(())
    }
}

pub fn locator(id: i64) -> RecordLocator {
    RecordLocator::new("user_api_keys", "api_key_enc", "id", id).unwrap()
}

/// Decode, mutate, re-encode
pub fn tamper(blob: &str, edit: impl FnOnce(&mut Envelope)) -> String {
    let mut envelope = Envelope::decode(blob).unwrap();
    edit(&mut envelope);
    envelope.encode().unwrap()
}
