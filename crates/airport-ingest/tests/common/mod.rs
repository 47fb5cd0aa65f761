//! Shared helpers for integration tests
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use airport_ingest::storage::UploadResult;
use airport_ingest::{
    ApiCredentials, EnrichedCollection, IngestConfig, Loader, LogicalDate, ObjectStore, Record,
};
use async_trait::async_trait;
use serde_json::json;
use std::path::Path;
use std::sync::Mutex;
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

pub const API_PATH: &str = "/v1/airports";
pub const API_KEY: &str = "test-api-key";

pub fn credentials() -> ApiCredentials {
    ApiCredentials::new(API_KEY).unwrap()
}

pub fn logical_date(raw: &str) -> LogicalDate {
    raw.parse().unwrap()
}

/// Config pointing at the mock provider and a temporary snapshot directory
pub fn config(server: &MockServer, snapshot_dir: &Path) -> IngestConfig {
    let mut config = IngestConfig::default();
    config.api.base_url = format!("{}{}", server.uri(), API_PATH);
    config.api.timeout_secs = 5;
    config.snapshot.local_dir = snapshot_dir.to_path_buf();
    config
}

/// `count` airport records with IATA codes prefixed by `prefix`
pub fn airports(prefix: &str, count: usize) -> Vec<serde_json::Value> {
    (0..count)
        .map(|i| {
            json!({
                "iata": format!("{}{:02}", prefix, i),
                "country": "DE",
                "elevation_ft": 100 + i,
            })
        })
        .collect()
}

/// Serve `body` for the page at `offset`, expecting exactly one request
pub async fn mount_page(server: &MockServer, offset: usize, body: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(header("X-Api-Key", API_KEY))
        .and(query_param("country", "DE"))
        .and(query_param("offset", offset.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

/// Fail the page at `offset` with `status`
pub async fn mount_failing_page(server: &MockServer, offset: usize, status: u16) {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("offset", offset.to_string()))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream unavailable"))
        .expect(1)
        .mount(server)
        .await;
}

pub fn iata_codes(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| r["iata"].as_str().unwrap().to_string())
        .collect()
}

/// Loader that remembers every collection it was handed
#[derive(Default)]
pub struct RecordingLoader {
    pub calls: Mutex<Vec<(LogicalDate, EnrichedCollection)>>,
}

impl RecordingLoader {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Loader for RecordingLoader {
    async fn load(
        &self,
        logical_date: LogicalDate,
        records: &EnrichedCollection,
    ) -> anyhow::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((logical_date, records.clone()));
        Ok(())
    }
}

/// Loader that always rejects the hand-off
pub struct RejectingLoader;

#[async_trait]
impl Loader for RejectingLoader {
    async fn load(&self, _: LogicalDate, _: &EnrichedCollection) -> anyhow::Result<()> {
        anyhow::bail!("warehouse table is locked")
    }
}

/// Object store whose uploads always fail
pub struct UnavailableStore;

#[async_trait]
impl ObjectStore for UnavailableStore {
    fn bucket(&self) -> &str {
        "ninja"
    }

    async fn put_object(&self, _: &str, _: Vec<u8>, _: &str) -> anyhow::Result<UploadResult> {
        anyhow::bail!("bucket unavailable")
    }
}
