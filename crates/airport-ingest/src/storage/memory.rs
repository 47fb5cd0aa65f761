use super::{ObjectStore, UploadResult};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// In-process object store keyed like a bucket
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    bucket: String,
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.lock().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, StoredObject>> {
        // A poisoned map still holds whole objects; keep serving it.
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<UploadResult> {
        let result = UploadResult {
            key: key.to_string(),
            checksum: airport_common::checksum::sha256_hex(&body),
            size: body.len(),
        };

        debug!(bucket = %self.bucket, key, size = result.size, "Stored object in memory");

        self.lock().insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );

        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_overwrites_existing_key() {
        let store = MemoryObjectStore::new("ninja");

        store
            .put_object("a.json", b"[1]".to_vec(), "application/json")
            .await
            .unwrap();
        let second = store
            .put_object("a.json", b"[2]".to_vec(), "application/json")
            .await
            .unwrap();

        assert_eq!(store.keys(), vec!["a.json".to_string()]);
        assert_eq!(store.get("a.json").unwrap().body, b"[2]".to_vec());
        assert_eq!(second.size, 3);
        assert_eq!(second.checksum, airport_common::checksum::sha256_hex(b"[2]"));
    }

    #[test]
    fn test_missing_object() {
        let store = MemoryObjectStore::new("ninja");
        assert!(store.get("missing.json").is_none());
        assert_eq!(store.object_uri("missing.json"), "s3://ninja/missing.json");
    }
}
