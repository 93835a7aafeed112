// src/keyring/cache.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use tracing::info;

use super::Keyring;
use crate::config::Config;
use crate::error::Result;

struct Loaded {
    keyring: Arc<Keyring>,
    modified: Option<SystemTime>,
}

/// Keyring loaded once per process and shared as cheap `Arc` snapshots.
///
/// With `reload_on_change` set, every snapshot request compares the file's
/// modification time against the one seen at load and re-reads the file when
/// it moved forward. A reload that fails is returned as an error; the
/// previous snapshot is kept for the next call.
pub struct CachedKeyring {
    path: PathBuf,
    reload_on_change: bool,
    state: Mutex<Option<Loaded>>,
}

impl CachedKeyring {
    pub fn new<P: Into<PathBuf>>(path: P, reload_on_change: bool) -> Self {
        Self {
            path: path.into(),
            reload_on_change,
            state: Mutex::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.keyring.path.clone(), config.keyring.reload_on_change)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current registry snapshot, loading or reloading as needed
    pub fn snapshot(&self) -> Result<Arc<Keyring>> {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(loaded) = guard.as_ref() {
            let stale = self.reload_on_change && file_modified(&self.path) > loaded.modified;
            if !stale {
                return Ok(Arc::clone(&loaded.keyring));
            }
        }

        let modified = file_modified(&self.path);
        let keyring = Arc::new(Keyring::load(&self.path)?);
        info!(
            path = %self.path.display(),
            active = %keyring.active_key_id,
            keys = keyring.len(),
            "keyring loaded"
        );
        *guard = Some(Loaded {
            keyring: Arc::clone(&keyring),
            modified,
        });
        Ok(keyring)
    }

    /// Drop the cached snapshot; the next call re-reads the file
    pub fn invalidate(&self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

fn file_modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
