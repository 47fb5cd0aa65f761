//! Dated snapshots of a fetched collection
//!
//! A snapshot is written twice under the same name: newline-delimited JSON on
//! local disk and a JSON array in the object store. The name depends only on
//! the label and the logical date, so re-running a date overwrites both
//! copies instead of adding new ones.

use crate::config::SnapshotConfig;
use crate::error::{IngestError, Result, Sink};
use crate::record::{FetchedCollection, Record};
use crate::storage::ObjectStore;
use airport_common::LogicalDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{info, instrument};

const SNAPSHOT_CONTENT_TYPE: &str = "application/json";

/// `<label>_<YYYY-MM-DD>.json`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SnapshotName(String);

impl SnapshotName {
    pub fn new(label: &str, logical_date: LogicalDate) -> Self {
        Self(format!("{}_{}.json", label, logical_date))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SnapshotName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where both copies of a snapshot ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotLocation {
    pub name: SnapshotName,
    pub local_path: PathBuf,
    pub bucket: String,
    pub remote_uri: String,
    pub records: usize,
    pub remote_bytes: usize,
    pub sha256: String,
}

pub struct SnapshotWriter {
    config: SnapshotConfig,
    store: Arc<dyn ObjectStore>,
}

impl SnapshotWriter {
    pub fn new(config: SnapshotConfig, store: Arc<dyn ObjectStore>) -> Self {
        Self { config, store }
    }

    pub fn snapshot_name(&self, logical_date: LogicalDate) -> SnapshotName {
        SnapshotName::new(&self.config.label, logical_date)
    }

    /// Write `collection` to local disk, then to the object store.
    ///
    /// A failed local write skips the upload. A failed upload leaves the
    /// local file in place.
    #[instrument(skip(self, collection), fields(records = collection.len()))]
    pub async fn write(
        &self,
        collection: &FetchedCollection,
        logical_date: LogicalDate,
    ) -> Result<SnapshotLocation> {
        let name = self.snapshot_name(logical_date);
        let local_path = self.config.local_dir.join(name.as_str());

        write_ndjson(&local_path, collection.records())
            .await
            .map_err(|e| {
                IngestError::persistence(Sink::Local, local_path.display().to_string(), e)
            })?;

        info!(path = %local_path.display(), "Wrote local snapshot");

        let remote_uri = self.store.object_uri(name.as_str());
        let body = serde_json::to_vec(collection.records())
            .map_err(|e| IngestError::persistence(Sink::Remote, remote_uri.clone(), e))?;

        let upload = self
            .store
            .put_object(name.as_str(), body, SNAPSHOT_CONTENT_TYPE)
            .await
            .map_err(|e| {
                IngestError::persistence(Sink::Remote, remote_uri.clone(), format!("{:#}", e))
            })?;

        info!(uri = %remote_uri, bytes = upload.size, "Wrote remote snapshot");

        Ok(SnapshotLocation {
            name,
            local_path,
            bucket: self.store.bucket().to_string(),
            remote_uri,
            records: collection.len(),
            remote_bytes: upload.size,
            sha256: upload.checksum,
        })
    }
}

/// One record per line, truncating whatever the file held before
async fn write_ndjson(path: &Path, records: &[Record]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::new(file);

    for record in records {
        let line = serde_json::to_vec(record)?;
        writer.write_all(&line).await?;
        writer.write_all(b"\n").await?;
    }

    writer.flush().await?;
    writer.into_inner().sync_all().await
}
