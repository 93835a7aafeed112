// src/config/app.rs
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::{env, fs};

use serde::Deserialize;
use tracing::warn;

use super::defaults::*;
use crate::crypto::AppContext;
use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_keyring")]
    pub keyring: KeyringConfig,
    #[serde(default = "default_paths")]
    pub paths: Paths,
    #[serde(default = "default_crypto")]
    pub crypto: CryptoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyringConfig {
    pub path: PathBuf,
    /// Re-read the keyring file when its mtime moves forward
    #[serde(default)]
    pub reload_on_change: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paths {
    pub secrets_db: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CryptoConfig {
    #[serde(default = "default_app_context")]
    pub app_context: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keyring: default_keyring(),
            paths: default_paths(),
            crypto: default_crypto(),
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// `ESV_KEYRING_PATH` and `ESV_SECRETS_DB` win over the file
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = env::var("ESV_KEYRING_PATH") {
            self.keyring.path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("ESV_SECRETS_DB") {
            self.paths.secrets_db = PathBuf::from(path);
        }
    }

    pub fn app_context(&self) -> AppContext {
        AppContext::new(self.crypto.app_context.clone())
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Process-wide config, read on first use.
///
/// The file comes from `ESV_CONFIG` (default `esv-config.toml`); when it is
/// missing the built-in defaults apply. A file that exists but does not
/// parse is an error.
pub fn load() -> Result<&'static Config> {
    if let Some(conf) = CONFIG.get() {
        return Ok(conf);
    }
    let conf = read_config()?;
    Ok(CONFIG.get_or_init(|| conf))
}

fn read_config() -> Result<Config> {
    let config_path = env::var("ESV_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

    let mut conf = if Path::new(&config_path).exists() {
        Config::from_toml_str(&fs::read_to_string(&config_path)?)?
    } else {
        warn!(path = %config_path, "config file not found, using built-in defaults");
        Config::default()
    };

    conf.apply_env_overrides();
    Ok(conf)
}
