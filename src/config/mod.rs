// src/config/mod.rs
//! Configuration system for envelope-secret-vault
//!
//! Central, lazy-loaded global config with TOML + env overrides.

pub use app::{load, Config, CryptoConfig, KeyringConfig, Paths};
pub use defaults::DEFAULT_CONFIG_FILE;

mod app;
mod defaults;
