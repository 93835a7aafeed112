// src/store.rs
//! Storage collaborator used by the rewrap path
//!
//! The only write this crate ever issues is "set one column of one row,
//! identified by primary key". [`RecordLocator`] names that row; any backend
//! implementing [`SecretStore`] can carry it out. The SQLite implementation
//! lives in `crate::db::sqlite_store`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Single-row envelope write-back
pub trait SecretStore {
    /// Replace the stored envelope for exactly the row `locator` names
    fn update_envelope(&self, locator: &RecordLocator, envelope: &str) -> Result<()>;
}

impl<T: SecretStore + ?Sized> SecretStore for &T {
    fn update_envelope(&self, locator: &RecordLocator, envelope: &str) -> Result<()> {
        (**self).update_envelope(locator, envelope)
    }
}

/// Primary-key value of a stored record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{id}"),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_owned())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId::Text(id)
    }
}

/// Which stored envelope to replace: `UPDATE table SET value_column = ? WHERE key_column = record_id`.
///
/// Table and column names end up in SQL text, so they are restricted to
/// plain identifiers (`[A-Za-z_][A-Za-z0-9_]*`, at most 64 chars) on
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLocator {
    table: String,
    value_column: String,
    key_column: String,
    record_id: RecordId,
}

impl RecordLocator {
    pub fn new(
        table: impl Into<String>,
        value_column: impl Into<String>,
        key_column: impl Into<String>,
        record_id: impl Into<RecordId>,
    ) -> Result<Self> {
        let locator = Self {
            table: table.into(),
            value_column: value_column.into(),
            key_column: key_column.into(),
            record_id: record_id.into(),
        };
        check_identifier("table", &locator.table)?;
        check_identifier("value column", &locator.value_column)?;
        check_identifier("key column", &locator.key_column)?;
        Ok(locator)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn value_column(&self) -> &str {
        &self.value_column
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn record_id(&self) -> &RecordId {
        &self.record_id
    }
}

fn check_identifier(kind: &str, name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            name.len() <= 64 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidLocator(format!(
            "{kind} {name:?} is not a plain SQL identifier"
        )))
    }
}
