// src/crypto/context.rs
use crate::consts::DEFAULT_APP_CONTEXT;

/// Per-application domain separation.
///
/// Two applications sharing a KEK derive unrelated content keys because the
/// HKDF info differs, and cannot swap envelopes because the associated data
/// differs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppContext {
    app: String,
}

impl AppContext {
    pub fn new(app: impl Into<String>) -> Self {
        Self { app: app.into() }
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    /// `"{app}-secrets-v{version}"`
    pub fn hkdf_info(&self, version: u8) -> String {
        format!("{}-secrets-v{version}", self.app)
    }

    /// `"{app}|v{version}|{key_id}"`
    pub fn associated_data(&self, version: u8, key_id: &str) -> Vec<u8> {
        format!("{}|v{version}|{key_id}", self.app).into_bytes()
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new(DEFAULT_APP_CONTEXT)
    }
}
