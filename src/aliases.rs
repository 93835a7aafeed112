// src/aliases.rs
//! secure-gate secret types used throughout envelope-secret-vault
//!
//! Everything that holds key material or recovered plaintext lives in one of
//! these wrappers so it is zeroized on drop and redacted from `Debug`.

pub use secure_gate::{dynamic_alias, fixed_alias};

// Fixed-size secrets
fixed_alias!(ContentKey32, 32); // HKDF-derived per-envelope key
fixed_alias!(LegacyKey32, 32); // pre-envelope AES-256-GCM master key

// Dynamic secrets
dynamic_alias!(KekBytes, Vec<u8>); // raw key-encryption-key from the keyring
dynamic_alias!(PlainText, Vec<u8>); // recovered secret
