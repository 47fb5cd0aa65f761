use serde::{Deserialize, Serialize};
use std::env;

/// Default bucket holding the dated snapshots.
pub const DEFAULT_BUCKET: &str = "ninja";

/// Default region when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub bucket: String,
    /// Project scope: the 12-digit account id that must own the bucket
    pub project: Option<String>,
    pub endpoint: Option<String>,
    pub region: String,
    /// Static credentials; when absent the default AWS provider chain is used
    pub access_key: Option<String>,
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,
    pub path_style: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            project: None,
            endpoint: None,
            region: DEFAULT_REGION.to_string(),
            access_key: None,
            secret_key: None,
            path_style: false,
        }
    }
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self {
            bucket: env::var("SNAPSHOT_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
            project: env::var("SNAPSHOT_PROJECT").ok().filter(|p| !p.is_empty()),
            endpoint: env::var("S3_ENDPOINT").ok(),
            region: env::var("S3_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
            access_key: env::var("S3_ACCESS_KEY")
                .or_else(|_| env::var("AWS_ACCESS_KEY_ID"))
                .ok(),
            secret_key: env::var("S3_SECRET_KEY")
                .or_else(|_| env::var("AWS_SECRET_ACCESS_KEY"))
                .ok(),
            path_style: env::var("S3_PATH_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    /// The project scope, if any, as an S3 expected bucket owner.
    ///
    /// S3 only accepts a 12-digit account id there; anything else is `None`
    /// and rejected by [`crate::config::IngestConfig::validate`].
    pub fn expected_bucket_owner(&self) -> Option<&str> {
        self.project.as_deref().filter(|p| is_account_id(p))
    }
}

/// `true` for a 12-digit AWS account id
pub fn is_account_id(value: &str) -> bool {
    value.len() == 12 && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bucket() {
        let config = StorageConfig::default();
        assert_eq!(config.bucket, "ninja");
        assert_eq!(config.project, None);
        assert!(!config.path_style);
    }

    #[test]
    fn test_project_scope_must_be_an_account_id() {
        let mut config = StorageConfig {
            project: Some("123456789012".to_string()),
            ..StorageConfig::default()
        };
        assert_eq!(config.expected_bucket_owner(), Some("123456789012"));

        config.project = Some("data-platform".to_string());
        assert_eq!(config.expected_bucket_owner(), None);

        assert!(!is_account_id("12345678901"));
        assert!(!is_account_id("1234567890123"));
        assert!(!is_account_id("12345678901a"));
    }
}
