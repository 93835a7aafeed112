// src/db/mod.rs
//! SQLite persistence for per-user provider secrets

pub mod secrets_db_conn;
pub mod secrets_db_ops;
pub mod sqlite_store;

pub use secrets_db_conn::{init_schema, open_default_secrets_db, open_secrets_db};
pub use secrets_db_ops::{
    delete_secret, list_secrets, load_secret, migrate_legacy_secret, migrate_legacy_secrets,
    revoke_secret, store_secret, SecretSummary,
};
