//! Remote object storage for snapshots
//!
//! [`ObjectStore`] is the seam the snapshot writer talks to. [`S3ObjectStore`]
//! targets S3-compatible services; [`memory::MemoryObjectStore`] keeps
//! objects in-process for tests and offline runs.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    Client,
};
use tracing::{debug, info, instrument};

pub mod config;
pub mod memory;

pub use config::StorageConfig;
pub use memory::MemoryObjectStore;

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub key: String,
    pub checksum: String,
    pub size: usize,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn bucket(&self) -> &str;

    /// Create or overwrite `key` with `body`
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<UploadResult>;

    fn object_uri(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket(), key)
    }
}

/// S3-compatible store.
///
/// A client is built for each call and dropped when the call returns.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    config: StorageConfig,
}

impl S3ObjectStore {
    pub fn new(config: StorageConfig) -> Self {
        debug!(bucket = %config.bucket, endpoint = ?config.endpoint, "Configured S3 object store");
        Self { config }
    }

    async fn client(&self) -> Client {
        let region = Region::new(self.config.region.clone());

        let mut builder = match (&self.config.access_key, &self.config.secret_key) {
            (Some(access_key), Some(secret_key)) => {
                let credentials =
                    Credentials::new(access_key, secret_key, None, None, "airport-ingest");
                aws_sdk_s3::Config::builder()
                    .credentials_provider(credentials)
                    .region(region)
            },
            _ => {
                let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
                    .region(region)
                    .load()
                    .await;
                aws_sdk_s3::config::Builder::from(&shared)
            },
        };

        builder = builder.force_path_style(self.config.path_style);
        if let Some(endpoint) = &self.config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Client::from_conf(builder.build())
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn bucket(&self) -> &str {
        &self.config.bucket
    }

    #[instrument(skip(self, body), fields(bucket = %self.config.bucket))]
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<UploadResult> {
        let checksum = airport_common::checksum::sha256_hex(&body);
        let size = body.len();

        debug!("Uploading {} bytes to {}", size, self.object_uri(key));

        let client = self.client().await;
        client
            .put_object()
            .bucket(&self.config.bucket)
            .set_expected_bucket_owner(self.config.expected_bucket_owner().map(str::to_string))
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .context("Failed to upload to S3")?;

        info!("Successfully uploaded to {}", self.object_uri(key));

        Ok(UploadResult {
            key: key.to_string(),
            checksum,
            size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_uri_uses_configured_bucket() {
        let store = S3ObjectStore::new(StorageConfig {
            endpoint: Some("http://localhost:9000".to_string()),
            path_style: true,
            ..StorageConfig::default()
        });
        assert_eq!(
            store.object_uri("german_airports_2024-03-06.json"),
            "s3://ninja/german_airports_2024-03-06.json"
        );
    }
}
