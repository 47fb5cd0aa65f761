//! Pipeline configuration
//!
//! One explicit [`IngestConfig`] is built at startup and handed to the run
//! controller. Nothing in the pipeline reads process-wide settings after that.

use crate::error::{IngestError, Result};
use crate::storage::config::{is_account_id, StorageConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Provider Defaults
// ============================================================================

/// Airports endpoint of the provider API.
pub const DEFAULT_API_URL: &str = "https://api.api-ninjas.com/v1/airports";

/// Country filter sent with every page request.
pub const DEFAULT_COUNTRY: &str = "DE";

/// Number of records the provider returns on a full page.
///
/// A shorter page is taken to be the last one. The provider does not
/// advertise a total count, so this is an assumption about its paging, not a
/// guarantee from it.
pub const DEFAULT_PAGE_SIZE: usize = 30;

/// Default timeout for one page request in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Snapshot Defaults
// ============================================================================

/// Domain label that prefixes every snapshot name.
pub const DEFAULT_SNAPSHOT_LABEL: &str = "german_airports";

/// Directory receiving the local snapshot copy.
pub const DEFAULT_SNAPSHOT_DIR: &str = ".";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub snapshot: SnapshotConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub country: String,
    pub page_size: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    pub label: String,
    pub local_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("airport-ingest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_SNAPSHOT_LABEL.to_string(),
            local_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
        }
    }
}

impl IngestConfig {
    /// Load configuration from `.env`, the environment, and defaults
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = ApiConfig::default();
        let config = IngestConfig {
            api: ApiConfig {
                base_url: std::env::var("NINJA_API_URL").unwrap_or(defaults.base_url),
                country: std::env::var("NINJA_COUNTRY").unwrap_or(defaults.country),
                page_size: parse_env("NINJA_PAGE_SIZE")?.unwrap_or(defaults.page_size),
                timeout_secs: parse_env("NINJA_TIMEOUT_SECS")?.unwrap_or(defaults.timeout_secs),
                user_agent: defaults.user_agent,
            },
            storage: StorageConfig::from_env(),
            snapshot: SnapshotConfig {
                label: std::env::var("SNAPSHOT_LABEL")
                    .unwrap_or_else(|_| DEFAULT_SNAPSHOT_LABEL.to_string()),
                local_dir: std::env::var("SNAPSHOT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_SNAPSHOT_DIR)),
            },
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(IngestError::config("API base URL cannot be empty"));
        }

        if reqwest::Url::parse(&self.api.base_url).is_err() {
            return Err(IngestError::config(format!(
                "API base URL is not a valid URL: {}",
                self.api.base_url
            )));
        }

        if self.api.page_size == 0 {
            return Err(IngestError::config("Page size must be greater than 0"));
        }

        if self.api.timeout_secs == 0 {
            return Err(IngestError::config("Timeout must be greater than 0"));
        }

        if self.storage.bucket.trim().is_empty() {
            return Err(IngestError::config("Bucket name cannot be empty"));
        }

        if let Some(project) = self.storage.project.as_deref() {
            if !is_account_id(project) {
                return Err(IngestError::config(format!(
                    "Project scope must be a 12-digit account id, got '{}'",
                    project
                )));
            }
        }

        let label = &self.snapshot.label;
        if label.trim().is_empty() {
            return Err(IngestError::config("Snapshot label cannot be empty"));
        }

        if label.contains(['/', '\\']) || label.contains("..") {
            return Err(IngestError::config(format!(
                "Snapshot label must be a plain file name prefix, got '{}'",
                label
            )));
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| IngestError::config(format!("{} has an invalid value: '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}
