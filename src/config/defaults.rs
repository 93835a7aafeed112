// src/config/defaults.rs
use std::path::PathBuf;

use crate::config::app::{CryptoConfig, KeyringConfig, Paths};
use crate::consts::DEFAULT_APP_CONTEXT;

pub const DEFAULT_CONFIG_FILE: &str = "esv-config.toml";

const APP_DIR: &str = "envelope-secret-vault";

pub fn default_keyring() -> KeyringConfig {
    KeyringConfig {
        path: dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join("keyring.json"))
            .unwrap_or_else(|| PathBuf::from(".secrets/keyring.json")),
        reload_on_change: false,
    }
}

pub fn default_paths() -> Paths {
    Paths {
        secrets_db: dirs::data_local_dir()
            .map(|dir| dir.join(APP_DIR).join("secrets.db"))
            .unwrap_or_else(|| PathBuf::from("data/secrets.db")),
    }
}

pub fn default_crypto() -> CryptoConfig {
    CryptoConfig {
        app_context: default_app_context(),
    }
}

pub fn default_app_context() -> String {
    DEFAULT_APP_CONTEXT.to_string()
}
