//! Provider credentials
//!
//! The secret store hands the pipeline a small JSON document
//! (`{"api_key": "..."}`). How it gets there is outside this crate; we only
//! parse it and keep the key out of logs.

use crate::error::{IngestError, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable holding the JSON secret document
pub const SECRET_ENV: &str = "NINJA_SECRET";

/// Environment variable holding a bare API key
pub const API_KEY_ENV: &str = "NINJA_API_KEY";

#[derive(Clone, Deserialize)]
pub struct ApiCredentials {
    api_key: String,
}

impl ApiCredentials {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(IngestError::config("API key is empty"));
        }
        Ok(Self { api_key })
    }

    /// Parse the secret document supplied by the secret store
    pub fn from_json(secret: &str) -> Result<Self> {
        let parsed: ApiCredentials = serde_json::from_str(secret)
            .map_err(|e| IngestError::config(format!("Invalid API secret document: {}", e)))?;
        Self::new(parsed.api_key)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let secret = std::fs::read_to_string(path).map_err(|e| {
            IngestError::config(format!("Failed to read secret file '{}': {}", path.display(), e))
        })?;
        Self::from_json(&secret)
    }

    /// `NINJA_SECRET` first, then `NINJA_API_KEY`
    pub fn from_env() -> Result<Self> {
        if let Ok(secret) = std::env::var(SECRET_ENV) {
            return Self::from_json(&secret);
        }

        match std::env::var(API_KEY_ENV) {
            Ok(key) => Self::new(key),
            Err(_) => Err(IngestError::config(format!(
                "No API credentials: set {} or {}",
                SECRET_ENV, API_KEY_ENV
            ))),
        }
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
