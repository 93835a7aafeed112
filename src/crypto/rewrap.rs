// src/crypto/rewrap.rs
//! Lazy key rotation ("read-repair")
//!
//! Envelopes are moved to the active key one record at a time, the next time
//! each record is read. There is no sweep: records never read again stay
//! under their original key.

use std::fmt;

use tracing::info;

use super::SecretCipher;
use crate::aliases::PlainText;
use crate::error::Result;
use crate::keyring::KeyRegistry;
use crate::store::{RecordLocator, SecretStore};

/// What a read-with-rewrap produced
pub struct RewrapOutcome {
    pub plaintext: PlainText,
    /// Envelope now stored for the record (the input one when not rewrapped)
    pub envelope: String,
    pub rewrapped: bool,
}

impl fmt::Debug for RewrapOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewrapOutcome")
            .field("plaintext", &"[REDACTED]")
            .field("envelope", &self.envelope)
            .field("rewrapped", &self.rewrapped)
            .finish()
    }
}

impl<R: KeyRegistry> SecretCipher<R> {
    /// Return the envelope that should be stored for `locator`, re-encrypting
    /// and persisting it first when it was sealed under a stale key.
    pub fn maybe_rewrap<S>(
        &self,
        store: &S,
        locator: &RecordLocator,
        envelope: &str,
    ) -> Result<String>
    where
        S: SecretStore + ?Sized,
    {
        Ok(self.read_and_maybe_rewrap(store, locator, envelope)?.envelope)
    }

    /// Like [`maybe_rewrap`](Self::maybe_rewrap) but also hands back the
    /// plaintext, so callers reading a secret need only one decrypt.
    pub fn read_and_maybe_rewrap<S>(
        &self,
        store: &S,
        locator: &RecordLocator,
        envelope: &str,
    ) -> Result<RewrapOutcome>
    where
        S: SecretStore + ?Sized,
    {
        // A failed decrypt propagates here; unauthenticated data is never rewrapped.
        let opened = self.decrypt(envelope)?;

        if !opened.needs_rewrap {
            return Ok(RewrapOutcome {
                plaintext: opened.plaintext,
                envelope: envelope.to_owned(),
                rewrapped: false,
            });
        }

        let fresh = self.encrypt(opened.plaintext.expose_secret(), None)?;
        store.update_envelope(locator, &fresh)?;

        info!(
            table = locator.table(),
            record = %locator.record_id(),
            from = %opened.key_id,
            to = self.registry.active_key_id(),
            "rewrapped stale secret"
        );

        Ok(RewrapOutcome {
            plaintext: opened.plaintext,
            envelope: fresh,
            rewrapped: true,
        })
    }
}
