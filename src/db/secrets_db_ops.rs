//! Secrets table operations
//!
//! One encrypted API key per (user, provider). Writes always seal under the
//! active key; reads go through read-repair so rows sealed under a retired
//! key are moved to the active one as they are used.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{info, warn};

use crate::aliases::PlainText;
use crate::audit::{key_fingerprint, last4};
use crate::consts::SECRETS_TABLE;
use crate::crypto::{LegacyGcm, SecretCipher};
use crate::envelope::Envelope;
use crate::error::{CoreError, Result};
use crate::keyring::KeyRegistry;
use crate::store::RecordLocator;

/// Masked view of a stored secret; nothing here needs a KEK
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretSummary {
    pub id: i64,
    pub provider: String,
    pub last4: Option<String>,
    pub key_fingerprint: Option<String>,
    pub status: String,
    /// `None` when the stored value is not a v1 envelope
    pub key_id: Option<String>,
    /// Sealed under a key other than the active one
    pub stale: bool,
    /// Stored value does not parse as an envelope (legacy or corrupt)
    pub unreadable: bool,
    pub updated_at: String,
}

/// Encrypt and upsert a provider secret; returns the row id.
///
/// Surrounding whitespace is trimmed. Re-storing a provider replaces the
/// envelope and re-activates the row.
pub fn store_secret<R: KeyRegistry>(
    conn: &Connection,
    cipher: &SecretCipher<R>,
    user_id: i64,
    provider: &str,
    secret: &str,
) -> Result<i64> {
    let secret = secret.trim();
    if secret.is_empty() {
        return Err(CoreError::EmptySecret);
    }

    let envelope = cipher.encrypt(secret.as_bytes(), None)?;

    conn.execute(
        r#"
        INSERT INTO user_api_keys (user_id, provider, api_key_enc, key_fingerprint, last4, status)
        VALUES (?1, ?2, ?3, ?4, ?5, 'active')
        ON CONFLICT (user_id, provider) DO UPDATE SET
            api_key_enc     = excluded.api_key_enc,
            key_fingerprint = excluded.key_fingerprint,
            last4           = excluded.last4,
            status          = 'active',
            updated_at      = datetime('now')
        "#,
        params![
            user_id,
            provider,
            envelope,
            key_fingerprint(secret),
            last4(secret)
        ],
    )?;

    let id = conn.query_row(
        "SELECT id FROM user_api_keys WHERE user_id = ?1 AND provider = ?2",
        params![user_id, provider],
        |row| row.get(0),
    )?;
    Ok(id)
}

/// Decrypt the active secret for (user, provider), rewrapping it if stale.
///
/// `Ok(None)` when no active row exists.
pub fn load_secret<R: KeyRegistry>(
    conn: &Connection,
    cipher: &SecretCipher<R>,
    user_id: i64,
    provider: &str,
) -> Result<Option<PlainText>> {
    let row: Option<(i64, String)> = conn
        .query_row(
            "SELECT id, api_key_enc FROM user_api_keys
             WHERE user_id = ?1 AND provider = ?2 AND status = 'active'",
            params![user_id, provider],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((id, envelope)) = row else {
        return Ok(None);
    };

    let locator = RecordLocator::new(SECRETS_TABLE, "api_key_enc", "id", id)?;
    let outcome = cipher.read_and_maybe_rewrap(conn, &locator, &envelope)?;
    Ok(Some(outcome.plaintext))
}

/// Every secret row for a user, without decrypting.
///
/// A row whose value does not parse is still listed, flagged `unreadable`,
/// so it can be migrated or deleted.
pub fn list_secrets<R: KeyRegistry>(
    conn: &Connection,
    cipher: &SecretCipher<R>,
    user_id: i64,
) -> Result<Vec<SecretSummary>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, provider, api_key_enc, last4, key_fingerprint, status, updated_at
        FROM user_api_keys
        WHERE user_id = ?1
        ORDER BY provider
        "#,
    )?;

    let rows = stmt.query_map([user_id], |row| {
        Ok((
            row.get::<_, i64>(0)?,            // id
            row.get::<_, String>(1)?,         // provider
            row.get::<_, String>(2)?,         // api_key_enc
            row.get::<_, Option<String>>(3)?, // last4
            row.get::<_, Option<String>>(4)?, // key_fingerprint
            row.get::<_, String>(5)?,         // status
            row.get::<_, String>(6)?,         // updated_at
        ))
    })?;

    let active = cipher.registry().active_key_id();
    let mut summaries = Vec::new();
    for row in rows {
        let (id, provider, envelope, last4, key_fingerprint, status, updated_at) = row?;
        let key_id = match Envelope::decode(&envelope) {
            Ok(parsed) => Some(parsed.key_id),
            Err(e) => {
                warn!(id, provider = %provider, error = %e, "stored secret is not a v1 envelope");
                None
            }
        };
        summaries.push(SecretSummary {
            id,
            provider,
            last4,
            key_fingerprint,
            status,
            stale: key_id.as_deref().is_some_and(|kid| kid != active),
            unreadable: key_id.is_none(),
            key_id,
            updated_at,
        });
    }
    Ok(summaries)
}

/// Mark a secret revoked; it stays on disk but `load_secret` no longer returns it
pub fn revoke_secret(conn: &Connection, user_id: i64, provider: &str) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE user_api_keys SET status = 'revoked', updated_at = datetime('now')
         WHERE user_id = ?1 AND provider = ?2",
        params![user_id, provider],
    )?;
    Ok(changed > 0)
}

pub fn delete_secret(conn: &Connection, user_id: i64, provider: &str) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM user_api_keys WHERE user_id = ?1 AND provider = ?2",
        params![user_id, provider],
    )?;
    Ok(changed > 0)
}

/// Re-seal one pre-envelope value as a v1 envelope under the active key.
///
/// Returns `Ok(false)` when the row is missing or already holds a v1
/// envelope. Fingerprint and last4 are filled in from the recovered secret,
/// since legacy rows were written without them.
pub fn migrate_legacy_secret<R: KeyRegistry>(
    conn: &Connection,
    cipher: &SecretCipher<R>,
    legacy: &LegacyGcm,
    user_id: i64,
    provider: &str,
) -> Result<bool> {
    let row: Option<(i64, String)> = conn
        .query_row(
            "SELECT id, api_key_enc FROM user_api_keys WHERE user_id = ?1 AND provider = ?2",
            params![user_id, provider],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match row {
        Some((id, value)) => migrate_row(conn, cipher, legacy, id, &value),
        None => Ok(false),
    }
}

/// Migrate every legacy row in the table; returns how many were re-sealed.
///
/// Rows that fail to open under `legacy` are logged and left untouched.
pub fn migrate_legacy_secrets<R: KeyRegistry>(
    conn: &Connection,
    cipher: &SecretCipher<R>,
    legacy: &LegacyGcm,
) -> Result<usize> {
    let rows: Vec<(i64, String)> = {
        let mut stmt = conn.prepare("SELECT id, api_key_enc FROM user_api_keys ORDER BY id")?;
        let mapped = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        mapped.collect::<rusqlite::Result<_>>()?
    };

    let mut migrated = 0;
    for (id, value) in rows {
        match migrate_row(conn, cipher, legacy, id, &value) {
            Ok(true) => migrated += 1,
            Ok(false) => {}
            Err(e @ (CoreError::DecryptionFailed | CoreError::UnrecognizedFormat(_))) => {
                warn!(id, error = %e, "legacy value could not be opened; left as is");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(migrated)
}

fn migrate_row<R: KeyRegistry>(
    conn: &Connection,
    cipher: &SecretCipher<R>,
    legacy: &LegacyGcm,
    id: i64,
    value: &str,
) -> Result<bool> {
    if Envelope::decode(value).is_ok() {
        return Ok(false);
    }

    let plaintext = legacy.decrypt(value)?;
    let secret = std::str::from_utf8(plaintext.expose_secret())
        .map_err(|_| CoreError::format("legacy value is not UTF-8"))?;
    let envelope = cipher.encrypt(secret.as_bytes(), None)?;

    conn.execute(
        r#"
        UPDATE user_api_keys SET
            api_key_enc     = ?1,
            key_fingerprint = ?2,
            last4           = ?3,
            updated_at      = datetime('now')
        WHERE id = ?4
        "#,
        params![envelope, key_fingerprint(secret), last4(secret), id],
    )?;

    info!(id, to = cipher.registry().active_key_id(), "migrated legacy secret");
    Ok(true)
}
