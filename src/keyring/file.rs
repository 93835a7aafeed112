// src/keyring/file.rs
//! On-disk keyring format
//!
//! ```json
//! {
//!   "version": 1,
//!   "active_kid": "k2025_01_31_ab12",
//!   "keys": {
//!     "k2025_01_31_ab12": { "kek_b64": "...", "status": "active", "created_at": "..." }
//!   }
//! }
//! ```
//!
//! Keep this file readable by the service account only (mode 0600).

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use super::Keyring;
use crate::aliases::KekBytes;
use crate::consts::KEYRING_FILE_VERSION;
use crate::error::{CoreError, Result};
use crate::key_ops::{generate_kek, generate_key_id};

/// Lifecycle state of one KEK.
///
/// Only the `active_kid` entry is checked (it must be `Active`). Statuses
/// written by other tooling are kept verbatim in `Other` and survive a save.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KeyStatus {
    /// Used for new encryptions; exactly the `active_kid` entry
    Active,
    /// Superseded by a rotation, still used to open old envelopes
    Retired,
    #[default]
    Inactive,
    Other(String),
}

impl KeyStatus {
    pub fn as_str(&self) -> &str {
        match self {
            KeyStatus::Active => "active",
            KeyStatus::Retired => "retired",
            KeyStatus::Inactive => "inactive",
            KeyStatus::Other(status) => status,
        }
    }
}

impl From<String> for KeyStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "active" => KeyStatus::Active,
            "retired" => KeyStatus::Retired,
            "inactive" => KeyStatus::Inactive,
            _ => KeyStatus::Other(status),
        }
    }
}

impl From<KeyStatus> for String {
    fn from(status: KeyStatus) -> Self {
        match status {
            KeyStatus::Other(status) => status,
            known => known.as_str().to_owned(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct KeyEntry {
    pub kek_b64: String,
    #[serde(default)]
    pub status: KeyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retired_at: Option<String>,
    /// Fields written by other tooling, preserved on save
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl fmt::Debug for KeyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyEntry")
            .field("kek_b64", &"[REDACTED]")
            .field("status", &self.status)
            .field("created_at", &self.created_at)
            .field("created_by", &self.created_by)
            .field("retired_at", &self.retired_at)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyringFile {
    #[serde(default = "default_file_version")]
    pub version: u32,
    #[serde(default)]
    pub active_kid: String,
    #[serde(default)]
    pub keys: BTreeMap<String, KeyEntry>,
}

fn default_file_version() -> u32 {
    KEYRING_FILE_VERSION
}

impl Default for KeyringFile {
    fn default() -> Self {
        Self {
            version: KEYRING_FILE_VERSION,
            active_kid: String::new(),
            keys: BTreeMap::new(),
        }
    }
}

impl KeyringFile {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CoreError::InvalidKeyring(format!("cannot parse keyring: {e}")))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            CoreError::InvalidKeyring(format!("keyring not readable at {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// The active key must exist and be marked `active`
    pub fn validate(&self) -> Result<()> {
        if self.active_kid.is_empty() {
            return Err(CoreError::InvalidKeyring("active_kid is not set".into()));
        }
        let entry = self.keys.get(&self.active_kid).ok_or_else(|| {
            CoreError::InvalidKeyring(format!("active key {} has no entry", self.active_kid))
        })?;
        if entry.status != KeyStatus::Active {
            return Err(CoreError::InvalidKeyring(format!(
                "active key {} is not in 'active' status",
                self.active_kid
            )));
        }
        Ok(())
    }

    /// Validate and decode every KEK into a registry snapshot
    pub fn to_keyring(&self) -> Result<Keyring> {
        self.validate()?;
        let mut keys = Vec::with_capacity(self.keys.len());
        for (kid, entry) in &self.keys {
            let kek = STANDARD.decode(entry.kek_b64.trim()).map_err(|_| {
                CoreError::InvalidKeyring(format!("kek_b64 for {kid} is not valid base64"))
            })?;
            keys.push((kid.clone(), kek));
        }
        Ok(Keyring::new(self.active_kid.clone(), keys))
    }

    /// Generate a fresh KEK and make it the active key.
    ///
    /// The previously active entry is marked `retired` so envelopes sealed
    /// under it keep opening (and get rewrapped on their next read).
    pub fn add_key(&mut self, created_by: &str) -> Result<String> {
        let mut kid = generate_key_id()?;
        while self.keys.contains_key(&kid) {
            kid = generate_key_id()?;
        }

        let kek: KekBytes = generate_kek()?;
        let now = Utc::now().to_rfc3339();

        if let Some(previous) = self.keys.get_mut(&self.active_kid) {
            previous.status = KeyStatus::Retired;
            previous.retired_at = Some(now.clone());
        }

        self.keys.insert(
            kid.clone(),
            KeyEntry {
                kek_b64: STANDARD.encode(kek.expose_secret()),
                status: KeyStatus::Active,
                created_at: Some(now),
                created_by: Some(created_by.to_owned()),
                retired_at: None,
                extra: Map::new(),
            },
        );
        let previous = std::mem::replace(&mut self.active_kid, kid.clone());

        info!(new = %kid, previous = %previous, "keyring rotated");
        Ok(kid)
    }

    /// Write the keyring atomically (temp file + rename), owner-only on unix
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(self)?;
        let mut tmp = tempfile::Builder::new()
            .prefix(".keyring-")
            .tempfile_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600))?;
        }

        tmp.persist(path).map_err(|e| CoreError::Io(e.error))?;
        Ok(())
    }
}
