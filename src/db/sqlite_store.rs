// src/db/sqlite_store.rs
use rusqlite::types::ToSqlOutput;
use rusqlite::{params, Connection, ToSql};

use crate::error::{CoreError, Result};
use crate::store::{RecordId, RecordLocator, SecretStore};

impl ToSql for RecordId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            RecordId::Int(id) => id.to_sql(),
            RecordId::Text(id) => id.to_sql(),
        }
    }
}

impl SecretStore for Connection {
    /// Parameterised single-row update.
    ///
    /// Runs under its own savepoint, so it nests inside a transaction the
    /// caller already has open. No matching row is `QueryReturnedNoRows`;
    /// more than one matching row is rolled back and reported as an invalid
    /// locator (the key column is not unique).
    fn update_envelope(&self, locator: &RecordLocator, envelope: &str) -> Result<()> {
        let sql = format!(
            r#"UPDATE "{}" SET "{}" = ?1 WHERE "{}" = ?2"#,
            locator.table(),
            locator.value_column(),
            locator.key_column()
        );

        self.execute_batch("SAVEPOINT esv_update_envelope")?;
        let outcome = match self.execute(&sql, params![envelope, locator.record_id()]) {
            Ok(1) => Ok(()),
            Ok(0) => Err(CoreError::Sql(rusqlite::Error::QueryReturnedNoRows)),
            Ok(n) => Err(CoreError::InvalidLocator(format!(
                "update on {}.{} matched {n} rows",
                locator.table(),
                locator.key_column()
            ))),
            Err(e) => Err(CoreError::Sql(e)),
        };

        match outcome {
            Ok(()) => self.execute_batch("RELEASE esv_update_envelope")?,
            Err(_) => self.execute_batch(
                "ROLLBACK TO esv_update_envelope; RELEASE esv_update_envelope",
            )?,
        }
        outcome
    }
}
