// src/db/secrets_db_conn.rs
use std::{fs, path::Path};

use rusqlite::Connection;

use crate::error::Result;

/// Open (creating if needed) the secrets database at `path`
pub fn open_secrets_db<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Open the database named by config (`ESV_SECRETS_DB` is applied there)
pub fn open_default_secrets_db() -> Result<Connection> {
    let config = crate::config::load()?;
    open_secrets_db(&config.paths.secrets_db)
}

/// Idempotent schema setup
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS user_api_keys (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id         INTEGER NOT NULL,
            provider        TEXT NOT NULL,
            api_key_enc     TEXT NOT NULL,
            key_fingerprint TEXT,
            last4           TEXT,
            status          TEXT NOT NULL DEFAULT 'active'
                            CHECK (status IN ('active', 'inactive', 'revoked')),
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE (user_id, provider)
        );

        CREATE INDEX IF NOT EXISTS idx_user_api_keys_user ON user_api_keys(user_id);
        CREATE INDEX IF NOT EXISTS idx_user_api_keys_status ON user_api_keys(status);
        "#,
    )?;
    Ok(())
}
