// src/crypto/kdf.rs
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::aliases::ContentKey32;
use crate::consts::CONTENT_KEY_LEN;
use crate::error::{CoreError, Result};

/// HKDF-SHA256(ikm = KEK, salt, info) → 32-byte content key
pub(crate) fn derive_content_key(kek: &[u8], salt: &[u8], info: &[u8]) -> Result<ContentKey32> {
    let hk = Hkdf::<Sha256>::new(Some(salt), kek);
    let mut okm = [0u8; CONTENT_KEY_LEN];
    hk.expand(info, &mut okm)
        .map_err(|_| CoreError::KeyDerivation)?;
    let key = ContentKey32::new(okm);
    okm.zeroize();
    Ok(key)
}
