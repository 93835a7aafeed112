// tests/rewrap_tests.rs
mod support;
use support::{cipher, init_tracing, locator, random_kek, rotated, CountingStore};

use envelope_secret_vault::error::CoreError;
use envelope_secret_vault::{Envelope, KeyRegistry, SecretCipher};

#[test]
fn test_current_envelope_is_left_alone() {
    init_tracing();
    let cipher = cipher();
    let store = CountingStore::default();
    let blob = cipher.encrypt(b"already current", None).unwrap();

    let out = cipher.maybe_rewrap(&store, &locator(1), &blob).unwrap();
    assert_eq!(out, blob);
    assert_eq!(store.write_count(), 0);
}

#[test]
fn test_stale_envelope_is_rewrapped_and_persisted() {
    init_tracing();
    let cipher = cipher();
    let store = CountingStore::default();
    let old = cipher.encrypt(b"sk-rotate-me", Some("k2")).unwrap();
    assert!(cipher.decrypt(&old).unwrap().needs_rewrap);

    let fresh = cipher.maybe_rewrap(&store, &locator(42), &old).unwrap();
    assert_ne!(fresh, old);
    assert_eq!(Envelope::decode(&fresh).unwrap().key_id, "k1");

    assert_eq!(store.write_count(), 1);
    let (written_at, written) = store.last_write().unwrap();
    assert_eq!(written_at, locator(42));
    assert_eq!(written, fresh);

    let opened = cipher.decrypt(&fresh).unwrap();
    assert!(!opened.needs_rewrap);
    assert_eq!(opened.as_bytes(), b"sk-rotate-me");
}

#[test]
fn test_read_and_maybe_rewrap_returns_plaintext() {
    let cipher = cipher();
    let store = CountingStore::default();

    let current = cipher.encrypt(b"one", Some("k1")).unwrap();
    let out = cipher
        .read_and_maybe_rewrap(&store, &locator(1), &current)
        .unwrap();
    assert!(!out.rewrapped);
    assert_eq!(out.plaintext.expose_secret().as_slice(), b"one");
    assert_eq!(out.envelope, current);

    let stale = cipher.encrypt(b"two", Some("k2")).unwrap();
    let out = cipher
        .read_and_maybe_rewrap(&store, &locator(2), &stale)
        .unwrap();
    assert!(out.rewrapped);
    assert_eq!(out.plaintext.expose_secret().as_slice(), b"two");
    assert_eq!(store.write_count(), 1);
    assert!(format!("{out:?}").contains("[REDACTED]"));
}

#[test]
fn test_failed_decrypt_writes_nothing() {
    let cipher = cipher();
    let store = CountingStore::default();
    let blob = cipher.encrypt(b"x", Some("k2")).unwrap();
    let bad = support::tamper(&blob, |e| e.ciphertext[0] ^= 1);

    assert!(matches!(
        cipher.maybe_rewrap(&store, &locator(1), &bad),
        Err(CoreError::DecryptionFailed)
    ));
    assert!(matches!(
        cipher.maybe_rewrap(&store, &locator(1), "not an envelope"),
        Err(CoreError::UnrecognizedFormat(_))
    ));
    assert_eq!(store.write_count(), 0);
}

#[test]
fn test_store_failure_propagates() {
    let cipher = cipher();
    let store = CountingStore::failing("database is locked");
    let stale = cipher.encrypt(b"x", Some("k2")).unwrap();

    let err = cipher.maybe_rewrap(&store, &locator(7), &stale).unwrap_err();
    assert!(matches!(err, CoreError::Storage(_)));
    assert!(err.to_string().contains("database is locked"));

    // Nothing to write for a current envelope, so the broken store is never hit.
    let current = cipher.encrypt(b"x", None).unwrap();
    assert_eq!(
        cipher.maybe_rewrap(&store, &locator(7), &current).unwrap(),
        current
    );
}

#[test]
fn test_rotation_moves_records_on_read() {
    init_tracing();
    let keys = vec![("k1", random_kek()), ("k2", random_kek())];
    let before = SecretCipher::new(rotated(&keys, "k1"));
    let after = SecretCipher::new(rotated(&keys, "k2"));
    let store = CountingStore::default();

    let blobs: Vec<String> = (0..3)
        .map(|i| before.encrypt(format!("secret-{i}").as_bytes(), None).unwrap())
        .collect();

    // Old envelopes still open after rotation, flagged stale.
    for blob in &blobs {
        assert!(after.decrypt(blob).unwrap().needs_rewrap);
    }

    // Only the records that are read get moved.
    let moved = after.maybe_rewrap(&store, &locator(0), &blobs[0]).unwrap();
    assert_eq!(store.write_count(), 1);
    assert_eq!(Envelope::decode(&moved).unwrap().key_id, after.registry().active_key_id());
    assert_eq!(after.decrypt(&moved).unwrap().as_bytes(), b"secret-0");

    // Reading it again is a no-op.
    assert_eq!(after.maybe_rewrap(&store, &locator(0), &moved).unwrap(), moved);
    assert_eq!(store.write_count(), 1);

    // The untouched ones still open under the retired key.
    assert_eq!(Envelope::decode(&blobs[2]).unwrap().key_id, "k1");
    assert_eq!(after.decrypt(&blobs[2]).unwrap().as_bytes(), b"secret-2");
}
