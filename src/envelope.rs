// src/envelope.rs
//! Envelope wire format
//!
//! ```text
//! {"v":1,"kid":"<key-id>","s":"<b64 salt>","n":"<b64 nonce>","ct":"<b64 ciphertext+tag>"}
//! ```
//!
//! Field names, their order and standard padded base64 are fixed: envelopes
//! already persisted by the web application must keep decoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::{ENVELOPE_VERSION, NONCE_LEN, SALT_LEN};
use crate::error::{CoreError, Result};

/// Everything needed to open a secret except the KEK itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub version: u8,
    pub key_id: String,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct WireV1 {
    v: u8,
    kid: String,
    s: String,
    n: String,
    ct: String,
}

impl Envelope {
    /// Serialize to the compact JSON form stored in the database
    pub fn encode(&self) -> Result<String> {
        let wire = WireV1 {
            v: self.version,
            kid: self.key_id.clone(),
            s: STANDARD.encode(self.salt),
            n: STANDARD.encode(self.nonce),
            ct: STANDARD.encode(&self.ciphertext),
        };
        Ok(serde_json::to_string(&wire)?)
    }

    /// Parse a stored envelope.
    ///
    /// Structural problems (not JSON, missing or unsupported `v`, bad base64,
    /// wrong salt/nonce length) are `UnrecognizedFormat`. No attempt is made
    /// to interpret unversioned blobs.
    pub fn decode(blob: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(blob)
            .map_err(|e| CoreError::format(format!("envelope is not valid JSON: {e}")))?;

        {
            let obj = value
                .as_object()
                .ok_or_else(|| CoreError::format("envelope is not a JSON object"))?;
            match obj.get("v") {
                None => return Err(CoreError::format("missing version tag")),
                Some(v) if v.as_u64() == Some(u64::from(ENVELOPE_VERSION)) => {}
                Some(v) => {
                    return Err(CoreError::format(format!("unsupported version v={v}")));
                }
            }
        }

        let wire: WireV1 = serde_json::from_value(value)
            .map_err(|e| CoreError::format(format!("malformed v1 envelope: {e}")))?;

        Ok(Envelope {
            version: wire.v,
            key_id: wire.kid,
            salt: decode_fixed(&wire.s, "salt")?,
            nonce: decode_fixed(&wire.n, "nonce")?,
            ciphertext: decode_b64(&wire.ct, "ciphertext")?,
        })
    }
}

fn decode_b64(encoded: &str, field: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .map_err(|e| CoreError::format(format!("{field} is not valid base64: {e}")))
}

fn decode_fixed<const N: usize>(encoded: &str, field: &str) -> Result<[u8; N]> {
    let bytes = decode_b64(encoded, field)?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
        CoreError::format(format!("{field} must be {N} bytes, got {}", bytes.len()))
    })
}
